//! Bridge 설정

use std::env;
use std::path::PathBuf;

/// Bridge 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// 정책 카탈로그 YAML 경로 (없으면 내장 카탈로그)
    pub policy_path: Option<PathBuf>,

    /// CORS 전체 허용 (개발용)
    pub permissive_cors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            policy_path: None,
            permissive_cors: false,
        }
    }
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("EVD_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,

            policy_path: env::var("EVD_POLICY_PATH")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),

            permissive_cors: env::var("EVD_PERMISSIVE_CORS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}
