//! Role / ResourceKind / Operation 어휘
//!
//! 로직 없이 열거형만 정의합니다. 문자열 → Role 변환은 경계에서 한 번만
//! 수행되며 정규화 규칙은 `context` 모듈에 있습니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 사용자 Role
///
/// 액터는 정확히 하나의 role을 가집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Coordinator,
    Leader,
    Staff,
    Supplier,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Coordinator,
        Role::Leader,
        Role::Staff,
        Role::Supplier,
    ];

    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Coordinator => "coordinator",
            Role::Leader => "leader",
            Role::Staff => "staff",
            Role::Supplier => "supplier",
        }
    }

    /// 읽기 전용 role (staff, supplier)
    pub fn is_member(&self) -> bool {
        matches!(self, Role::Staff | Role::Supplier)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 관리 대상 리소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Event,
    EventType,
    Contract,
    Resource,
    ResourceType,
    Provider,
    ProviderType,
    Personnel,
    PersonnelType,
    Report,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 11] = [
        ResourceKind::Event,
        ResourceKind::EventType,
        ResourceKind::Contract,
        ResourceKind::Resource,
        ResourceKind::ResourceType,
        ResourceKind::Provider,
        ResourceKind::ProviderType,
        ResourceKind::Personnel,
        ResourceKind::PersonnelType,
        ResourceKind::Report,
        ResourceKind::User,
    ];

    /// 문자열로 변환 (URL 경로와 catalog 키에 사용)
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Event => "event",
            ResourceKind::EventType => "eventType",
            ResourceKind::Contract => "contract",
            ResourceKind::Resource => "resource",
            ResourceKind::ResourceType => "resourceType",
            ResourceKind::Provider => "provider",
            ResourceKind::ProviderType => "providerType",
            ResourceKind::Personnel => "personnel",
            ResourceKind::PersonnelType => "personnelType",
            ResourceKind::Report => "report",
            ResourceKind::User => "user",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    /// 대소문자, `-`/`_` 구분자를 무시하고 파싱합니다 (`event_type`, `EventType` 모두 허용).
    fn from_str(s: &str) -> Result<Self> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_lowercase() == folded)
            .ok_or_else(|| Error::InvalidResourceKind {
                kind: s.to_string(),
            })
    }
}

/// CRUD 작업 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Read,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// 쓰기 작업 여부 (create, update)
    pub fn is_write(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "list" => Ok(Operation::List),
            "read" => Ok(Operation::Read),
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            _ => Err(Error::UnknownOperation {
                operation: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_kind() {
        assert_eq!("event".parse::<ResourceKind>().unwrap(), ResourceKind::Event);
        assert_eq!(
            "eventType".parse::<ResourceKind>().unwrap(),
            ResourceKind::EventType
        );
        assert_eq!(
            "personnel_type".parse::<ResourceKind>().unwrap(),
            ResourceKind::PersonnelType
        );

        let err = "invoice".parse::<ResourceKind>().unwrap_err();
        assert!(matches!(err, Error::InvalidResourceKind { .. }));
    }

    #[test]
    fn test_resource_kind_serde_matches_as_str() {
        for kind in ResourceKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
        }
    }

    #[test]
    fn test_parse_operation() {
        assert_eq!("DELETE".parse::<Operation>().unwrap(), Operation::Delete);
        assert!(Operation::Update.is_write());
        assert!(!Operation::List.is_write());
        assert!(matches!(
            "select".parse::<Operation>(),
            Err(Error::UnknownOperation { .. })
        ));
    }
}
