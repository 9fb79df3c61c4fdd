//! HTTP 핸들러

pub mod crud;
pub mod health;
