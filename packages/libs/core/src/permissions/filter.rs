//! 목록 조회 필터
//!
//! QueryScoper가 만드는 선언적 조건식입니다. 스토리지는 이를 자신의 쿼리로
//! 번역하거나 (`evd-sql`), 메모리에서 [`Filter::matches`]로 직접 평가합니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::window::DateRange;
use crate::record::Record;

/// 레코드 조건식
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Filter {
    /// 제한 없음 (identity)
    All,

    /// 어떤 레코드도 매칭하지 않음
    Nothing,

    /// `field == value`
    Eq { field: String, value: Value },

    /// `field != value` (필드가 없으면 매칭하지 않음)
    Ne { field: String, value: Value },

    /// `field IN (values)`
    In { field: String, values: Vec<Value> },

    /// 날짜 필드가 범위 안에 있음
    Date { field: String, range: DateRange },

    And { clauses: Vec<Filter> },

    Or { clauses: Vec<Filter> },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// 집합 포함 조건. 빈 집합은 `Nothing`이 됩니다.
    pub fn in_set<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Filter::Nothing;
        }
        Filter::In {
            field: field.into(),
            values,
        }
    }

    pub fn date(field: impl Into<String>, range: impl Into<DateRange>) -> Self {
        Filter::Date {
            field: field.into(),
            range: range.into(),
        }
    }

    /// AND 결합 (단순화 포함)
    pub fn and(clauses: impl IntoIterator<Item = Filter>) -> Self {
        let mut kept = Vec::new();
        for clause in clauses {
            match clause {
                Filter::All => {}
                Filter::Nothing => return Filter::Nothing,
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Filter::All,
            1 => kept.remove(0),
            _ => Filter::And { clauses: kept },
        }
    }

    /// OR 결합 (단순화 포함)
    pub fn or(clauses: impl IntoIterator<Item = Filter>) -> Self {
        let mut kept = Vec::new();
        for clause in clauses {
            match clause {
                Filter::Nothing => {}
                Filter::All => return Filter::All,
                other => kept.push(other),
            }
        }
        match kept.len() {
            0 => Filter::Nothing,
            1 => kept.remove(0),
            _ => Filter::Or { clauses: kept },
        }
    }

    /// identity 필터 여부
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// 메모리 평가
    ///
    /// 필요한 속성이 레코드에 없으면 해당 조건은 거짓입니다.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::All => true,
            Filter::Nothing => false,
            Filter::Eq { field, value } => record.get(field) == Some(value),
            Filter::Ne { field, value } => record.get(field).is_some_and(|v| v != value),
            Filter::In { field, values } => record.get(field).is_some_and(|v| values.contains(v)),
            Filter::Date { field, range } => record
                .date_field(field)
                .is_some_and(|date| range.contains(date)),
            Filter::And { clauses } => clauses.iter().all(|c| c.matches(record)),
            Filter::Or { clauses } => clauses.iter().any(|c| c.matches(record)),
        }
    }

    /// 조건식 트리 안에 `needle`과 같은 절이 있는지
    pub fn contains_clause(&self, needle: &Filter) -> bool {
        if self == needle {
            return true;
        }
        match self {
            Filter::And { clauses } | Filter::Or { clauses } => {
                clauses.iter().any(|c| c.contains_clause(needle))
            }
            _ => false,
        }
    }

    /// 주어진 필드에 대한 날짜 절을 모두 찾습니다.
    pub fn date_clauses<'a>(&'a self, field: &str, out: &mut Vec<&'a DateRange>) {
        match self {
            Filter::Date { field: f, range } if f == field => out.push(range),
            Filter::And { clauses } | Filter::Or { clauses } => {
                for clause in clauses {
                    clause.date_clauses(field, out);
                }
            }
            _ => {}
        }
    }
}
