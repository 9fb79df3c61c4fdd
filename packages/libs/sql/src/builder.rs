//! 스코프 SELECT 빌더
//!
//! 목록 필터(행)와 읽기 허용 컬럼(열)을 받아 SQL을 생성합니다.
//! SeaQuery를 사용하여 SQL Injection을 방지합니다.

use sea_query::{Asterisk, PostgresQueryBuilder, Query, SelectStatement, Values};

use evd_core::permissions::{Filter, ResourceKind};
use evd_core::record::ID_FIELD;

use crate::condition::{to_condition, DynIden};

/// SELECT 쿼리 빌더
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
}

impl SelectBuilder {
    /// 테이블 이름으로 생성
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// 리소스 종류 이름을 테이블 이름으로 사용
    pub fn for_kind(kind: ResourceKind) -> Self {
        Self::new(kind.as_str())
    }

    /// 파라미터 바인딩 SQL 생성
    ///
    /// # Arguments
    /// * `scope` - QueryScoper가 만든 목록 필터
    /// * `allowed_columns` - 허용된 컬럼 목록 (None = 모든 컬럼)
    ///
    /// # Returns
    /// (SQL 문자열, 바인딩할 값들)
    pub fn build(&self, scope: &Filter, allowed_columns: Option<&[String]>) -> (String, Values) {
        self.statement(scope, allowed_columns)
            .build(PostgresQueryBuilder)
    }

    /// 값이 인라인된 SQL (로그/디버깅용)
    pub fn to_sql_string(&self, scope: &Filter, allowed_columns: Option<&[String]>) -> String {
        self.statement(scope, allowed_columns)
            .to_string(PostgresQueryBuilder)
    }

    fn statement(&self, scope: &Filter, allowed_columns: Option<&[String]>) -> SelectStatement {
        let mut query = Query::select();
        query.from(DynIden(self.table.clone()));

        match allowed_columns {
            None => {
                query.column(Asterisk);
            }
            Some(columns) => {
                // id는 항상 포함
                query.column(DynIden(ID_FIELD.to_string()));
                for column in columns.iter().filter(|c| c.as_str() != ID_FIELD) {
                    query.column(DynIden(column.clone()));
                }
            }
        }

        if !scope.is_all() {
            query.cond_where(to_condition(scope));
        }

        query
    }
}
