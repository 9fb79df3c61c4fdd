//! 목록 범위 (QueryScoper)
//!
//! 액터가 열람할 수 있는 레코드를 제한하는 [`Filter`]를 만듭니다.
//! 필터는 *어떤 행*을 다루며, *어떤 열*은 [`super::FieldRedactor`]가 담당합니다.

use super::context::PolicyContext;
use super::decision::Decision;
use super::filter::Filter;
use super::registry::RuleRegistry;
use super::vocab::Operation;
use crate::error::{Error, Result};

/// 목록 범위 계산기
#[derive(Debug, Clone, Copy)]
pub struct QueryScoper<'a> {
    registry: &'a RuleRegistry,
}

impl<'a> QueryScoper<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self { registry }
    }

    /// 목록 조회 필터
    ///
    /// admin은 identity 필터를 받습니다. coordinator의 보고서 기본 시간 창은
    /// 컨텍스트에 호출자 범위가 있으면 그 범위로 대체됩니다.
    pub fn scope(&self, ctx: &PolicyContext) -> Result<Filter> {
        match self.registry.evaluate(ctx, Operation::List, None)? {
            Decision::Filter(filter) => Ok(filter),
            Decision::Allow => Ok(Filter::All),
            Decision::Deny(reason) => Err(Error::AuthorizationDenied { reason }),
        }
    }
}
