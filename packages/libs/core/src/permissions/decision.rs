//! 규칙 평가 결과

use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::Filter;

/// 거부 사유 (기계 판독용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// role이 이 작업을 할 수 없음
    RoleInsufficient,

    /// 레코드 날짜가 role의 시간 창 밖
    OutOfWindow,

    /// 작성자도 아니고 가시 범위에도 없음
    NotOwner,

    /// 레코드의 이벤트가 액터의 이벤트 집합에 없음
    EventNotAssigned,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::RoleInsufficient => "role_insufficient",
            DenyReason::OutOfWindow => "out_of_window",
            DenyReason::NotOwner => "not_owner",
            DenyReason::EventNotAssigned => "event_not_assigned",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 규칙 평가 결과
///
/// 단건 작업은 `Allow`/`Deny`, 목록 작업은 `Filter`를 돌려줍니다.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
    Filter(Filter),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Deny(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_reason_wire_names() {
        let json = serde_json::to_value(DenyReason::EventNotAssigned).unwrap();
        assert_eq!(json, "event_not_assigned");
        assert_eq!(DenyReason::RoleInsufficient.to_string(), "role_insufficient");
    }

    #[test]
    fn test_decision_helpers() {
        assert!(Decision::Allow.is_allowed());
        assert!(!Decision::Filter(Filter::All).is_allowed());
        assert_eq!(
            Decision::Deny(DenyReason::NotOwner).deny_reason(),
            Some(DenyReason::NotOwner)
        );
    }
}
