//! Bridge 앱 상태

use evd_core::permissions::RuleRegistry;

use crate::config::Config;
use crate::store::MemoryStore;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다. 레지스트리는 시작 시 한 번 만들어지고
/// 이후에는 읽기 전용입니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// 정책 규칙 레지스트리
    pub registry: RuleRegistry,

    /// 레코드 저장소
    pub store: MemoryStore,
}

impl AppState {
    /// 새 상태 생성 (설정된 카탈로그 또는 내장 카탈로그)
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let registry = match &config.policy_path {
            Some(path) => RuleRegistry::from_yaml_file(path)?,
            None => RuleRegistry::builtin()?,
        };
        Ok(Self::with_registry(config.clone(), registry))
    }

    pub fn with_registry(config: Config, registry: RuleRegistry) -> Self {
        Self {
            config,
            registry,
            store: MemoryStore::new(),
        }
    }
}
