//! 정책 카탈로그
//!
//! `policy/default.yaml` (또는 배포 환경의 교체 파일) 구조를 정의하고,
//! 규칙이 사용하는 [`KindSchema`]로 컴파일합니다.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::vocab::ResourceKind;
use crate::error::{Error, Result};

const BUILTIN_CATALOG: &str = include_str!("../../policy/default.yaml");

/// 필드 민감도 tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Public,
    Restricted,
    AdminOnly,
}

/// 카탈로그 파일의 루트 구조
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyCatalog {
    /// 리소스 종류별 선언
    #[serde(default)]
    pub kinds: BTreeMap<ResourceKind, KindSpec>,
}

/// 리소스 종류 하나에 대한 선언
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSpec {
    /// 이벤트 ID 속성 (`event` 자신은 `id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_field: Option<String>,

    /// 시간 창과 비교하는 날짜 속성
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_field: Option<String>,

    /// 분류 속성 (coordinator 가시 카테고리와 비교)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_field: Option<String>,

    #[serde(default)]
    pub coordinator_categories: Vec<String>,

    #[serde(default)]
    pub fields: FieldTiers,

    /// coordinator에게 숨길 restricted 필드 (재무 정보)
    #[serde(default)]
    pub coordinator_hidden: Vec<String>,

    /// leader가 수정할 수 있는 필드
    #[serde(default)]
    pub leader_writable: Vec<String>,
}

/// tier별 필드 목록
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTiers {
    #[serde(default)]
    pub public: Vec<String>,

    #[serde(default)]
    pub restricted: Vec<String>,

    #[serde(default)]
    pub admin_only: Vec<String>,
}

impl PolicyCatalog {
    /// 내장 카탈로그
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// YAML 문자열에서 파싱
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// YAML 파일에서 로드
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// 모든 종류를 검증하고 컴파일합니다.
    pub fn compile(&self) -> Result<BTreeMap<ResourceKind, KindSchema>> {
        self.kinds
            .iter()
            .map(|(kind, spec)| Ok((*kind, KindSchema::compile(*kind, spec)?)))
            .collect()
    }
}

/// 컴파일된 리소스 스키마
///
/// 규칙, redactor, 스토리지 어댑터가 공유하는 읽기 전용 정보입니다.
#[derive(Debug, Clone)]
pub struct KindSchema {
    kind: ResourceKind,
    event_field: Option<String>,
    date_field: Option<String>,
    category_field: Option<String>,
    coordinator_categories: BTreeSet<String>,
    tiers: HashMap<String, Tier>,
    coordinator_hidden: BTreeSet<String>,
    leader_writable: BTreeSet<String>,
}

impl KindSchema {
    /// 선언을 검증하며 스키마 생성
    ///
    /// - 한 필드는 정확히 하나의 tier에 속해야 합니다.
    /// - `coordinatorHidden`은 restricted tier의 부분집합이어야 합니다.
    /// - `leaderWritable`은 public tier의 부분집합이어야 합니다.
    /// - 규칙이 읽는 속성(event/date/category)은 분류되어 있어야 합니다.
    pub fn compile(kind: ResourceKind, spec: &KindSpec) -> Result<Self> {
        let mut tiers = HashMap::new();
        let declared = [
            (Tier::Public, &spec.fields.public),
            (Tier::Restricted, &spec.fields.restricted),
            (Tier::AdminOnly, &spec.fields.admin_only),
        ];
        for (tier, fields) in declared {
            for field in fields {
                if let Some(previous) = tiers.insert(field.clone(), tier) {
                    return Err(config_error(format!(
                        "{kind}: field '{field}' declared in both {previous:?} and {tier:?}"
                    )));
                }
            }
        }

        for field in &spec.coordinator_hidden {
            if tiers.get(field) != Some(&Tier::Restricted) {
                return Err(config_error(format!(
                    "{kind}: coordinatorHidden field '{field}' is not restricted"
                )));
            }
        }

        // leader가 쓴 값을 다시 읽을 수 있어야 함
        for field in &spec.leader_writable {
            if tiers.get(field) != Some(&Tier::Public) {
                return Err(config_error(format!(
                    "{kind}: leaderWritable field '{field}' is not public"
                )));
            }
        }

        let attributes = [
            ("eventField", &spec.event_field),
            ("dateField", &spec.date_field),
            ("categoryField", &spec.category_field),
        ];
        for (name, attribute) in attributes {
            if let Some(field) = attribute {
                if !tiers.contains_key(field) {
                    return Err(config_error(format!(
                        "{kind}: {name} '{field}' is not declared in any tier"
                    )));
                }
            }
        }

        Ok(Self {
            kind,
            event_field: spec.event_field.clone(),
            date_field: spec.date_field.clone(),
            category_field: spec.category_field.clone(),
            coordinator_categories: spec.coordinator_categories.iter().cloned().collect(),
            tiers,
            coordinator_hidden: spec.coordinator_hidden.iter().cloned().collect(),
            leader_writable: spec.leader_writable.iter().cloned().collect(),
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn event_field(&self) -> Option<&str> {
        self.event_field.as_deref()
    }

    pub fn date_field(&self) -> Option<&str> {
        self.date_field.as_deref()
    }

    pub fn category_field(&self) -> Option<&str> {
        self.category_field.as_deref()
    }

    pub fn coordinator_categories(&self) -> &BTreeSet<String> {
        &self.coordinator_categories
    }

    /// 이벤트 속성과 날짜 속성을 모두 가진 종류
    pub fn is_event_bearing(&self) -> bool {
        self.event_field.is_some() && self.date_field.is_some()
    }

    /// 필드의 tier (미분류 필드는 `None`)
    pub fn tier(&self, field: &str) -> Option<Tier> {
        self.tiers.get(field).copied()
    }

    pub fn is_coordinator_hidden(&self, field: &str) -> bool {
        self.coordinator_hidden.contains(field)
    }

    pub fn is_leader_writable(&self, field: &str) -> bool {
        self.leader_writable.contains(field)
    }

    /// tier 순서대로 정렬된 필드 목록
    pub fn fields_in(&self, tier: Tier) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .tiers
            .iter()
            .filter(|(_, t)| **t == tier)
            .map(|(f, _)| f.as_str())
            .collect();
        fields.sort_unstable();
        fields
    }
}

fn config_error(message: String) -> Error {
    Error::PolicyConfig { message }
}
