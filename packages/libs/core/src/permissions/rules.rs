//! role별 규칙 함수
//!
//! 모든 규칙은 부작용 없는 순수 함수이며 [`super::registry::RuleRegistry`]에
//! (role, kind, operation) 단위로 한 번 등록됩니다.
//!
//! 공통 원칙:
//! - admin은 항상 허용
//! - 작성자(`createdBy == actor.id`)는 읽기/수정 허용, 삭제는 불가
//! - 삭제는 admin 전용
//! - 단건 읽기는 해당 role의 목록 범위와 같은 조건을 사용
//!   (coordinator 보고서의 기본 시간 창은 목록에만 적용)

use super::catalog::KindSchema;
use super::context::{canonical_role, PolicyContext};
use super::decision::{Decision, DenyReason};
use super::filter::Filter;
use super::vocab::{Operation, ResourceKind, Role};
use super::window::{window_for, TimeWindow};
use crate::record::{Record, ACTIVE_FIELD, CREATED_BY_FIELD, ROLE_FIELD};

/// 규칙 입력
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub ctx: &'a PolicyContext,
    pub schema: &'a KindSchema,
    /// 평가 중인 작업 (컨텍스트의 작업과 다를 수 있음)
    pub operation: Operation,
    pub record: Option<&'a Record>,
}

/// 규칙 함수
pub type Rule = fn(&RuleInput<'_>) -> Decision;

/// (role, operation)에 해당하는 규칙
pub(crate) fn rule_for(role: Role, operation: Operation) -> Rule {
    match (role, operation) {
        (Role::Admin, Operation::List) => admin_list,
        (Role::Admin, _) => allow,

        (_, Operation::List) => scoped_list,
        (Role::Coordinator, Operation::Read) => coordinator_read,
        (_, Operation::Read) => scoped_read,
        (_, Operation::Delete) => deny_role,

        (Role::Coordinator, Operation::Create) => allow,
        (Role::Coordinator, Operation::Update) => coordinator_update,

        (Role::Leader, Operation::Update) => leader_update,
        (Role::Leader, Operation::Create) => deny_role,

        (Role::Staff | Role::Supplier, _) => deny_role,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 공통
// ─────────────────────────────────────────────────────────────────────────────

fn allow(_: &RuleInput<'_>) -> Decision {
    Decision::Allow
}

fn deny_role(_: &RuleInput<'_>) -> Decision {
    Decision::Deny(DenyReason::RoleInsufficient)
}

fn admin_list(_: &RuleInput<'_>) -> Decision {
    Decision::Filter(Filter::All)
}

fn scoped_list(input: &RuleInput<'_>) -> Decision {
    Decision::Filter(scope_filter(input.ctx, input.schema, Operation::List))
}

fn scoped_read(input: &RuleInput<'_>) -> Decision {
    let Some(record) = input.record else {
        return Decision::Deny(DenyReason::NotOwner);
    };

    if is_owner(input, record) {
        return Decision::Allow;
    }

    within_scope(input, record)
}

fn coordinator_read(input: &RuleInput<'_>) -> Decision {
    let Some(record) = input.record else {
        return Decision::Deny(DenyReason::NotOwner);
    };

    if is_admin_user(input.schema, record) {
        return Decision::Deny(DenyReason::RoleInsufficient);
    }

    scoped_read(input)
}

fn coordinator_update(input: &RuleInput<'_>) -> Decision {
    let Some(record) = input.record else {
        return Decision::Deny(DenyReason::NotOwner);
    };

    // admin 계정은 작성자라도 수정 불가
    if is_admin_user(input.schema, record) {
        return Decision::Deny(DenyReason::RoleInsufficient);
    }

    if is_owner(input, record) {
        return Decision::Allow;
    }

    within_scope(input, record)
}

fn leader_update(input: &RuleInput<'_>) -> Decision {
    let Some(record) = input.record else {
        return Decision::Deny(DenyReason::NotOwner);
    };

    if is_owner(input, record) {
        return Decision::Allow;
    }

    if input.schema.event_field().is_none() {
        return Decision::Deny(DenyReason::RoleInsufficient);
    }

    within_scope(input, record)
}

fn within_scope(input: &RuleInput<'_>, record: &Record) -> Decision {
    if scope_filter(input.ctx, input.schema, input.operation).matches(record) {
        Decision::Allow
    } else {
        Decision::Deny(diagnose(input, record))
    }
}

/// 작성자 여부
///
/// coordinator에게 사용자 레코드의 가시성은 role 라벨만으로 정해지므로
/// 작성자 조건을 적용하지 않습니다.
fn is_owner(input: &RuleInput<'_>, record: &Record) -> bool {
    if input.ctx.role() == Role::Coordinator && input.schema.kind() == ResourceKind::User {
        return false;
    }
    let actor_id = input.ctx.actor().id.as_str();
    !actor_id.is_empty() && record.created_by() == Some(actor_id)
}

/// `user` 레코드가 admin 계정인지 (인식할 수 없는 role 라벨도 admin으로 간주)
fn is_admin_user(schema: &KindSchema, record: &Record) -> bool {
    if schema.kind() != ResourceKind::User {
        return false;
    }
    match record.get(ROLE_FIELD) {
        None => false,
        Some(value) => value
            .as_str()
            .map_or(true, |raw| canonical_role(raw).map_or(true, |r| r == Role::Admin)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 목록 범위
// ─────────────────────────────────────────────────────────────────────────────

/// 비-admin role의 범위 필터
///
/// 여러 절에 해당하면 OR로 결합합니다 (배타 선택 없음).
/// `operation`은 시간 창 선택에만 쓰입니다.
pub(crate) fn scope_filter(
    ctx: &PolicyContext,
    schema: &KindSchema,
    operation: Operation,
) -> Filter {
    let actor = ctx.actor();
    match actor.role {
        Role::Admin => Filter::All,

        // 저장된 role 값은 쓰기 시 정규화된 라벨
        Role::Coordinator if schema.kind() == ResourceKind::User => Filter::in_set(
            ROLE_FIELD,
            Role::ALL
                .into_iter()
                .filter(|role| *role != Role::Admin)
                .map(|role| role.as_str()),
        ),

        Role::Coordinator => {
            let mut visible = vec![Filter::eq(CREATED_BY_FIELD, actor.id.as_str())];

            if let Some(field) = schema.event_field() {
                visible.push(Filter::in_set(field, actor.assigned_event_ids.iter().cloned()));
            }

            let categories = schema.coordinator_categories();
            let category_clause = schema
                .category_field()
                .filter(|_| !categories.is_empty())
                .map(|field| Filter::in_set(field, categories.iter().cloned()));

            match category_clause {
                Some(clause) => visible.push(clause),
                None if schema.event_field().is_none() => {
                    visible.push(Filter::eq(ACTIVE_FIELD, true));
                }
                None => {}
            }

            Filter::and([Filter::or(visible), date_clause(ctx, schema, operation)])
        }

        Role::Leader => match schema.event_field() {
            Some(field) => Filter::and([
                Filter::in_set(field, actor.assigned_event_ids.iter().cloned()),
                date_clause(ctx, schema, operation),
            ]),
            None => Filter::eq(ACTIVE_FIELD, true),
        },

        Role::Staff | Role::Supplier => {
            let mut visible = vec![Filter::eq(CREATED_BY_FIELD, actor.id.as_str())];
            if let Some(field) = schema.event_field() {
                visible.push(Filter::in_set(field, actor.associated_event_ids.iter().cloned()));
            }
            Filter::or(visible)
        }
    }
}

/// 작업에 적용되는 시간 창
///
/// coordinator의 창은 목록 기본값이므로 단건 작업에는 적용되지 않습니다.
fn effective_window(
    ctx: &PolicyContext,
    schema: &KindSchema,
    operation: Operation,
) -> Option<TimeWindow> {
    if ctx.role() == Role::Coordinator && operation != Operation::List {
        return None;
    }
    window_for(ctx.role(), schema.kind(), schema.is_event_bearing(), ctx.now())
}

/// role의 시간 창 절
///
/// coordinator의 창은 기본값이므로 호출자가 범위를 명시하면 그 범위로 대체됩니다.
/// leader의 창은 항상 적용됩니다.
fn date_clause(ctx: &PolicyContext, schema: &KindSchema, operation: Operation) -> Filter {
    let Some(field) = schema.date_field() else {
        return Filter::All;
    };
    let Some(window) = effective_window(ctx, schema, operation) else {
        return Filter::All;
    };

    match ctx.requested_range() {
        Some(range) if ctx.role() == Role::Coordinator => Filter::date(field, *range),
        _ => Filter::date(field, window),
    }
}

/// 범위 밖 레코드의 거부 사유
fn diagnose(input: &RuleInput<'_>, record: &Record) -> DenyReason {
    let (ctx, schema) = (input.ctx, input.schema);
    let role = ctx.role();

    if role == Role::Coordinator && is_admin_user(schema, record) {
        return DenyReason::RoleInsufficient;
    }

    if let (Some(field), Some(window)) =
        (schema.date_field(), effective_window(ctx, schema, input.operation))
    {
        if !record.date_field(field).is_some_and(|date| window.contains(date)) {
            return DenyReason::OutOfWindow;
        }
    }

    if let Some(field) = schema.event_field() {
        let assigned = record
            .str_field(field)
            .is_some_and(|event| ctx.actor().scoped_event_ids().contains(event));
        if !assigned {
            return DenyReason::EventNotAssigned;
        }
    }

    if role == Role::Leader {
        return DenyReason::RoleInsufficient;
    }

    DenyReason::NotOwner
}
