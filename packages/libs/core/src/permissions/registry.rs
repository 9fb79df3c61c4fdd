//! 규칙 레지스트리
//!
//! (role, resourceKind, operation) → 규칙 함수 매핑의 단일 출처입니다.
//! 시작 시 카탈로그로부터 한 번 만들어지고 이후에는 읽기 전용입니다.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::catalog::{KindSchema, PolicyCatalog};
use super::context::PolicyContext;
use super::decision::Decision;
use super::rules::{rule_for, Rule, RuleInput};
use super::vocab::{Operation, ResourceKind, Role};
use crate::error::{Error, Result};
use crate::record::Record;

/// 레지스트리 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleKey {
    pub role: Role,
    pub kind: ResourceKind,
    pub operation: Operation,
}

/// 규칙 레지스트리
#[derive(Clone)]
pub struct RuleRegistry {
    schemas: BTreeMap<ResourceKind, KindSchema>,
    rules: HashMap<RuleKey, Rule>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("kinds", &self.schemas.keys().collect::<Vec<_>>())
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl RuleRegistry {
    /// 카탈로그로부터 생성
    ///
    /// 카탈로그에 없는 종류는 등록되지 않으며, 조회 시 `InvalidResourceKind`로 실패합니다.
    pub fn from_catalog(catalog: &PolicyCatalog) -> Result<Self> {
        let schemas = catalog.compile()?;

        let mut rules = HashMap::new();
        for kind in schemas.keys().copied() {
            for role in Role::ALL {
                for operation in Operation::ALL {
                    rules.insert(
                        RuleKey {
                            role,
                            kind,
                            operation,
                        },
                        rule_for(role, operation),
                    );
                }
            }
        }

        tracing::debug!(
            kinds = schemas.len(),
            rules = rules.len(),
            "policy rule registry built"
        );

        Ok(Self { schemas, rules })
    }

    /// 내장 카탈로그로 생성
    pub fn builtin() -> Result<Self> {
        Self::from_catalog(&PolicyCatalog::builtin()?)
    }

    /// YAML 카탈로그 파일로 생성
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading policy catalog");
        Self::from_catalog(&PolicyCatalog::from_yaml_file(path)?)
    }

    /// 리소스 스키마 조회
    pub fn schema(&self, kind: ResourceKind) -> Result<&KindSchema> {
        self.schemas.get(&kind).ok_or_else(|| invalid_kind(kind))
    }

    /// 규칙 조회
    pub fn rule(&self, role: Role, kind: ResourceKind, operation: Operation) -> Result<Rule> {
        self.rules
            .get(&RuleKey {
                role,
                kind,
                operation,
            })
            .copied()
            .ok_or_else(|| invalid_kind(kind))
    }

    /// 등록된 리소스 종류
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.schemas.keys().copied()
    }

    /// 규칙 평가
    ///
    /// `operation`은 컨텍스트의 작업과 무관하게 평가할 작업입니다
    /// (예: 수정 전 단건 읽기 확인).
    pub fn evaluate(
        &self,
        ctx: &PolicyContext,
        operation: Operation,
        record: Option<&Record>,
    ) -> Result<Decision> {
        let schema = self.schema(ctx.kind())?;
        let rule = self.rule(ctx.role(), ctx.kind(), operation)?;

        Ok(rule(&RuleInput {
            ctx,
            schema,
            operation,
            record,
        }))
    }
}

fn invalid_kind(kind: ResourceKind) -> Error {
    Error::InvalidResourceKind {
        kind: kind.to_string(),
    }
}
