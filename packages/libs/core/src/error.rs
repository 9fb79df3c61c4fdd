//! 공통 에러 타입
//!
//! 정책 엔진 전체에서 사용되는 에러 타입을 정의합니다.
//! 허용/거부는 에러가 아니라 [`crate::permissions::Decision`] 값으로 반환되며,
//! `AuthorizationDenied`는 `?` 전파를 원하는 호출자를 위한 변환 결과입니다.

use thiserror::Error;

use crate::permissions::DenyReason;

pub type Result<T> = std::result::Result<T, Error>;

/// Eventdesk 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Policy Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("unknown role: {role}")]
    UnknownRole { role: String },

    #[error("authorization denied: {reason}")]
    AuthorizationDenied { reason: DenyReason },

    #[error("invalid resource kind: {kind}")]
    InvalidResourceKind { kind: String },

    #[error("unknown operation: {operation}")]
    UnknownOperation { operation: String },

    #[error("invalid record: {message}")]
    InvalidRecord { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("policy config error: {message}")]
    PolicyConfig { message: String },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::UnknownOperation { .. } | Error::InvalidRecord { .. } => 400,

            // 401 Unauthorized
            Error::UnknownRole { .. } => 401,

            // 403 Forbidden
            Error::AuthorizationDenied { .. } => 403,

            // 404 Not Found
            Error::InvalidResourceKind { .. } => 404,

            // 500 Internal Server Error
            Error::PolicyConfig { .. } | Error::Yaml(_) | Error::Io(_) => 500,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnknownRole { .. } => "UNKNOWN_ROLE",
            Error::AuthorizationDenied { .. } => "AUTHORIZATION_DENIED",
            Error::InvalidResourceKind { .. } => "INVALID_RESOURCE_KIND",
            Error::UnknownOperation { .. } => "UNKNOWN_OPERATION",
            Error::InvalidRecord { .. } => "INVALID_RECORD",
            Error::PolicyConfig { .. } => "POLICY_CONFIG_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    /// 거부 사유 (AuthorizationDenied인 경우)
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Error::AuthorizationDenied { reason } => Some(*reason),
            _ => None,
        }
    }
}
