//! evd-sql: 권한 필터 → SQL 변환 라이브러리
//!
//! `evd-core`의 목록 필터와 읽기 허용 컬럼을 PostgreSQL SELECT로 만듭니다.
//! SeaQuery를 사용하여 SQL Injection을 원천 차단합니다.
//!
//! # 모듈 구조
//!
//! - `builder`: 스코프 SELECT 빌더
//! - `condition`: Filter → WHERE 조건 변환

pub mod builder;
pub mod condition;

pub use builder::SelectBuilder;
pub use condition::to_condition;
