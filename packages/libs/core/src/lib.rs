//! evd-core: Eventdesk 권한 정책 엔진
//!
//! Bridge와 스토리지 어댑터가 공유하는 role 기반 권한 / 가시 범위 로직을 제공합니다.
//! HTTP, 저장소, 토큰 발급은 이 크레이트의 범위가 아니며, 엔진은 I/O 없이
//! 불변 입력(액터, 레코드, 현재 시각)만으로 판단합니다.
//!
//! # 모듈 구조
//!
//! - `permissions`: 정책 컨텍스트, 목록 범위, 접근 검사, 필드 축소, 규칙 레지스트리
//! - `record`: 스토리지 레코드 표현
//! - `error`: 공통 에러 타입

pub mod error;
pub mod permissions;
pub mod record;

pub use error::{Error, Result};
pub use record::Record;
