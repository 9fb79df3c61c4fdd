//! 리소스 CRUD 핸들러
//!
//! 모든 요청은 같은 순서로 정책 엔진을 거칩니다.
//!
//! - 목록: scope 필터 (+ 호출자 날짜 범위) → 저장소 → 읽기 축소
//! - 단건: 레코드 로드 → 접근 검사 → 읽기 축소
//! - 쓰기: 접근 검사 → 쓰기 축소 → 저장 → 읽기 축소

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use ulid::Ulid;

use evd_core::permissions::{
    AccessChecker, Actor, ActorClaims, DateRange, FieldRedactor, Filter, Operation,
    PolicyContext, QueryScoper, ResourceKind,
};
use evd_core::record::{parse_date, CREATED_BY_FIELD, ID_FIELD};
use evd_core::Record;

use crate::error::{BridgeError, Result};
use crate::middleware::Claims;
use crate::state::AppState;

const CREATED_AT_FIELD: &str = "createdAt";
const UPDATED_AT_FIELD: &str = "updatedAt";

/// 목록 조회 쿼리 (`from`/`to`: RFC3339 또는 YYYY-MM-DD)
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl ListQuery {
    fn range(&self) -> Result<DateRange> {
        Ok(DateRange::new(
            parse_bound("from", self.from.as_deref())?,
            parse_bound("to", self.to.as_deref())?,
        ))
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<chrono::DateTime<Utc>>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date(raw).map(Some).ok_or_else(|| BridgeError::BadRequest {
            message: format!("invalid `{name}` date: {raw}"),
        }),
    }
}

/// GET /api/:kind
pub async fn list(
    State(state): State<Arc<AppState>>,
    Claims(claims): Claims,
    Path(kind): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let range = query.range()?;
    let ctx = context(&claims, &kind, Operation::List)?.with_requested_range(range);

    let scope = QueryScoper::new(&state.registry).scope(&ctx)?;
    let schema = state.registry.schema(ctx.kind())?;

    // 호출자 범위는 역할과 무관하게 좁히기만 함
    let filter = match (ctx.requested_range(), schema.date_field()) {
        (Some(range), Some(field)) => Filter::and([scope, Filter::date(field, *range)]),
        _ => scope,
    };

    let records = state.store.list(ctx.kind(), &filter);
    tracing::debug!(
        kind = %ctx.kind(),
        role = %ctx.role(),
        count = records.len(),
        "list scoped"
    );

    let visible =
        FieldRedactor::new(&state.registry).redact_all_for_read(ctx.kind(), ctx.role(), records)?;
    Ok(Json(json!({ "data": visible })))
}

/// GET /api/:kind/:id
pub async fn get(
    State(state): State<Arc<AppState>>,
    Claims(claims): Claims,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let ctx = context(&claims, &kind, Operation::Read)?;
    let record = load(&state, ctx.kind(), &id)?;
    enforce(&state, &ctx, Some(&record))?;

    let visible = FieldRedactor::new(&state.registry).redact_for_read(ctx.kind(), ctx.role(), &record)?;
    Ok(Json(json!({ "data": visible })))
}

/// POST /api/:kind
pub async fn create(
    State(state): State<Arc<AppState>>,
    Claims(claims): Claims,
    Path(kind): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(body) = body?;
    let ctx = context(&claims, &kind, Operation::Create)?;
    let payload = Record::from_value(body)?;
    enforce(&state, &ctx, None)?;

    let redactor = FieldRedactor::new(&state.registry);
    let mut record = redactor.redact_for_write(ctx.kind(), ctx.role(), &payload)?;

    let id = record
        .id()
        .map(str::to_string)
        .unwrap_or_else(|| Ulid::new().to_string());
    let now = Utc::now().to_rfc3339();
    record.insert(ID_FIELD, json!(id));
    if !record.contains(CREATED_BY_FIELD) {
        record.insert(CREATED_BY_FIELD, json!(ctx.actor().id));
    }
    record.insert(CREATED_AT_FIELD, json!(now));
    record.insert(UPDATED_AT_FIELD, json!(now));

    state.store.put(ctx.kind(), id.as_str(), record.clone());
    tracing::info!(kind = %ctx.kind(), id = %id, actor = %ctx.actor().id, "record created");

    let visible = redactor.redact_for_read(ctx.kind(), ctx.role(), &record)?;
    Ok((StatusCode::CREATED, Json(json!({ "data": visible }))))
}

/// PATCH /api/:kind/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    Claims(claims): Claims,
    Path((kind, id)): Path<(String, String)>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = body?;
    let ctx = context(&claims, &kind, Operation::Update)?;
    let payload = Record::from_value(body)?;
    let mut record = load(&state, ctx.kind(), &id)?;
    enforce(&state, &ctx, Some(&record))?;

    let redactor = FieldRedactor::new(&state.registry);
    let mut patch = redactor.redact_for_write(ctx.kind(), ctx.role(), &payload)?;
    // 저장소 키와 어긋나지 않도록 id는 경로 값으로 고정
    patch.remove(ID_FIELD);

    record.merge(patch);
    record.insert(UPDATED_AT_FIELD, json!(Utc::now().to_rfc3339()));
    state.store.put(ctx.kind(), id.as_str(), record.clone());

    let visible = redactor.redact_for_read(ctx.kind(), ctx.role(), &record)?;
    Ok(Json(json!({ "data": visible })))
}

/// DELETE /api/:kind/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Claims(claims): Claims,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let ctx = context(&claims, &kind, Operation::Delete)?;
    let record = load(&state, ctx.kind(), &id)?;
    enforce(&state, &ctx, Some(&record))?;

    state.store.remove(ctx.kind(), &id);
    tracing::info!(kind = %ctx.kind(), id = %id, actor = %ctx.actor().id, "record deleted");

    Ok(Json(json!({ "data": { "id": id } })))
}

/// 정책 컨텍스트 생성 (role 검증이 리소스 종류 검증보다 먼저)
fn context(claims: &ActorClaims, kind: &str, operation: Operation) -> Result<PolicyContext> {
    let actor = Actor::from_claims(claims)?;
    let kind: ResourceKind = kind.parse()?;
    Ok(PolicyContext::new(actor, kind, operation))
}

fn load(state: &AppState, kind: ResourceKind, id: &str) -> Result<Record> {
    state.store.get(kind, id).ok_or_else(|| BridgeError::NotFound {
        message: format!("{kind} {id} not found"),
    })
}

/// 접근 검사 (거부는 경고 로그 후 403)
fn enforce(state: &AppState, ctx: &PolicyContext, record: Option<&Record>) -> Result<()> {
    AccessChecker::new(&state.registry)
        .authorize(ctx, record)
        .map_err(|e| {
            if let Some(reason) = e.deny_reason() {
                tracing::warn!(
                    actor = %ctx.actor().id,
                    role = %ctx.role(),
                    kind = %ctx.kind(),
                    operation = %ctx.operation(),
                    reason = %reason,
                    "request denied"
                );
            }
            BridgeError::from(e)
        })
}
