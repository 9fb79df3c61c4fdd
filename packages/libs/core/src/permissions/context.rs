//! 정책 평가 컨텍스트
//!
//! 인증 계층이 넘겨준 액터 claims를 정규화하여 요청 하나 동안 쓰이는
//! 불변 [`PolicyContext`]를 만듭니다. role 문자열 비교는 여기서 한 번만 일어나고,
//! 엔진 내부는 [`Role`] 값만 다룹니다.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::vocab::{Operation, ResourceKind, Role};
use super::window::DateRange;
use crate::error::{Error, Result};

/// 인증 계층이 넘겨주는 원시 claims
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorClaims {
    /// 사용자 ID
    pub id: String,

    /// role 라벨 (대소문자/악센트/지역화 표기 혼재 가능)
    pub role: String,

    /// leader/coordinator가 배정된 이벤트
    #[serde(default)]
    pub assigned_event_ids: Option<Vec<String>>,

    /// staff/supplier가 연결된 이벤트
    #[serde(default)]
    pub associated_event_ids: Option<Vec<String>>,
}

impl ActorClaims {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            assigned_event_ids: None,
            associated_event_ids: None,
        }
    }

    pub fn with_assigned_events<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assigned_event_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_associated_events<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associated_event_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

/// 정규화된 액터
///
/// 없는 이벤트 집합은 빈 집합이며, "전체"를 뜻하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub role: Role,
    pub assigned_event_ids: BTreeSet<String>,
    pub associated_event_ids: BTreeSet<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            assigned_event_ids: BTreeSet::new(),
            associated_event_ids: BTreeSet::new(),
        }
    }

    /// claims에서 생성 (role 정규화 포함)
    pub fn from_claims(claims: &ActorClaims) -> Result<Self> {
        Ok(Self {
            id: claims.id.clone(),
            role: canonical_role(&claims.role)?,
            assigned_event_ids: to_set(claims.assigned_event_ids.as_deref()),
            associated_event_ids: to_set(claims.associated_event_ids.as_deref()),
        })
    }

    pub fn with_assigned_events<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assigned_event_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_associated_events<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associated_event_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// role에 따라 범위 판단에 쓰이는 이벤트 집합
    ///
    /// coordinator/leader는 배정 이벤트, staff/supplier는 연결 이벤트를 씁니다.
    pub fn scoped_event_ids(&self) -> &BTreeSet<String> {
        if self.role.is_member() {
            &self.associated_event_ids
        } else {
            &self.assigned_event_ids
        }
    }
}

fn to_set(ids: Option<&[String]>) -> BTreeSet<String> {
    ids.unwrap_or_default()
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// role 라벨 정규화
///
/// 앞뒤 공백 제거 → NFKD 분해 → 결합 문자 제거 → 소문자 변환 후
/// 영문 이름과 지역화 라벨을 모두 매칭합니다. 매칭이 없으면 `UnknownRole`.
pub fn canonical_role(raw: &str) -> Result<Role> {
    let folded: String = raw
        .trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    match folded.as_str() {
        "admin" | "administrator" | "administrador" => Ok(Role::Admin),
        "coordinator" | "coordinador" => Ok(Role::Coordinator),
        "leader" | "lider" => Ok(Role::Leader),
        "staff" | "personal" => Ok(Role::Staff),
        "supplier" | "proveedor" => Ok(Role::Supplier),
        _ => Err(Error::UnknownRole {
            role: raw.to_string(),
        }),
    }
}

/// 요청 하나에 대한 불변 평가 컨텍스트
#[derive(Debug, Clone)]
pub struct PolicyContext {
    actor: Actor,
    kind: ResourceKind,
    operation: Operation,
    now: DateTime<Utc>,
    requested_range: Option<DateRange>,
}

impl PolicyContext {
    /// 정규화된 액터로 생성. `now`는 현재 시각입니다.
    pub fn new(actor: Actor, kind: ResourceKind, operation: Operation) -> Self {
        Self {
            actor,
            kind,
            operation,
            now: Utc::now(),
            requested_range: None,
        }
    }

    /// 원시 claims에서 생성
    pub fn from_claims(
        claims: &ActorClaims,
        kind: ResourceKind,
        operation: Operation,
    ) -> Result<Self> {
        Ok(Self::new(Actor::from_claims(claims)?, kind, operation))
    }

    /// 평가 시각 지정
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// 호출자가 명시한 날짜 범위 (목록 조회)
    ///
    /// 경계가 하나도 없는 범위는 지정하지 않은 것으로 봅니다.
    pub fn with_requested_range(mut self, range: DateRange) -> Self {
        self.requested_range = (!range.is_unbounded()).then_some(range);
        self
    }

    /// 같은 액터/시각으로 다른 작업의 컨텍스트
    pub fn for_operation(&self, operation: Operation) -> Self {
        Self {
            operation,
            ..self.clone()
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn role(&self) -> Role {
        self.actor.role
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn requested_range(&self) -> Option<&DateRange> {
        self.requested_range.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_role_variants() {
        assert_eq!(canonical_role("admin").unwrap(), Role::Admin);
        assert_eq!(canonical_role("  ADMIN ").unwrap(), Role::Admin);
        assert_eq!(canonical_role("Coordinador").unwrap(), Role::Coordinator);
        assert_eq!(canonical_role("Líder").unwrap(), Role::Leader);
        assert_eq!(canonical_role("LIDER").unwrap(), Role::Leader);
        assert_eq!(canonical_role("Leader").unwrap(), Role::Leader);
        assert_eq!(canonical_role("Staff").unwrap(), Role::Staff);
        assert_eq!(canonical_role("Proveedor").unwrap(), Role::Supplier);
    }

    #[test]
    fn test_unknown_role_is_error() {
        for raw in ["", "root", "superadmin", "leaders"] {
            let err = canonical_role(raw).unwrap_err();
            assert!(matches!(err, Error::UnknownRole { .. }), "{raw}");
        }
    }

    #[test]
    fn test_absent_event_sets_are_empty() {
        let claims = ActorClaims::new("U1", "leader");
        let actor = Actor::from_claims(&claims).unwrap();

        assert!(actor.assigned_event_ids.is_empty());
        assert!(actor.associated_event_ids.is_empty());
    }

    #[test]
    fn test_claims_deserialize_camel_case() {
        let claims: ActorClaims = serde_json::from_value(serde_json::json!({
            "id": "U7",
            "role": "Supplier",
            "associatedEventIds": ["E1", " ", "E2"]
        }))
        .unwrap();
        let actor = Actor::from_claims(&claims).unwrap();

        assert_eq!(actor.role, Role::Supplier);
        assert_eq!(actor.scoped_event_ids().len(), 2);
        assert!(actor.assigned_event_ids.is_empty());
    }

    #[test]
    fn test_context_from_claims() {
        let claims = ActorClaims::new("U1", "Coordinator").with_assigned_events(["E1"]);
        let ctx = PolicyContext::from_claims(&claims, ResourceKind::Report, Operation::List)
            .unwrap()
            .with_requested_range(DateRange::default());

        assert_eq!(ctx.role(), Role::Coordinator);
        assert_eq!(ctx.kind(), ResourceKind::Report);
        assert!(ctx.requested_range().is_none());
        assert_eq!(ctx.for_operation(Operation::Read).operation(), Operation::Read);
    }

    #[test]
    fn test_context_rejects_unknown_role() {
        let claims = ActorClaims::new("U1", "gerente");
        let result = PolicyContext::from_claims(&claims, ResourceKind::Event, Operation::List);
        assert!(matches!(result, Err(Error::UnknownRole { .. })));
    }
}
