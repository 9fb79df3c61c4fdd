//! 역할 기반 권한 / 가시 범위 엔진
//!
//! # 개요
//!
//! 액터(role + ID + 배정/연결 이벤트)와 리소스 종류, 레코드를 받아
//! 목록 범위, 단건 허용 여부, 필드 축소를 결정합니다. 모든 판단은
//! [`RuleRegistry`]에 등록된 규칙 하나에서 나옵니다.
//!
//! # 모듈 구조
//!
//! - `vocab`: Role / ResourceKind / Operation
//! - `context`: 액터 정규화 및 평가 컨텍스트
//! - `catalog`: 리소스별 속성 / 필드 tier 카탈로그
//! - `window`: 시간 창 평가
//! - `filter`: 목록 조회 조건식
//! - `rules`: role별 규칙 함수
//! - `registry`: (role, kind, operation) → 규칙
//! - `scoper`: 목록 범위
//! - `checker`: 단건 접근 검사
//! - `redactor`: 필드 축소

mod catalog;
mod checker;
mod context;
mod decision;
mod filter;
mod redactor;
mod registry;
mod rules;
mod scoper;
mod vocab;
mod window;

pub use catalog::{FieldTiers, KindSchema, KindSpec, PolicyCatalog, Tier};
pub use checker::AccessChecker;
pub use context::{canonical_role, Actor, ActorClaims, PolicyContext};
pub use decision::{Decision, DenyReason};
pub use filter::Filter;
pub use redactor::{FieldRedactor, MEMBER_FIELDS};
pub use registry::{RuleKey, RuleRegistry};
pub use rules::{Rule, RuleInput};
pub use scoper::QueryScoper;
pub use vocab::{Operation, ResourceKind, Role};
pub use window::{
    in_window, window_for, DateRange, TimeWindow, COORDINATOR_REPORT_DAYS, LEADER_WINDOW_DAYS,
};
