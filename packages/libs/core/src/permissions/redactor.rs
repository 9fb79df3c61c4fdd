//! 필드 축소 (FieldRedactor)
//!
//! 읽기 결과와 쓰기 payload에서 role이 볼 수 없거나 쓸 수 없는 필드를 제거합니다.
//!
//! - coordinator / leader: tier 차감 방식
//! - staff / supplier: 고정 허용 목록 방식 (tier와 무관)
//!
//! 쓰기 payload의 금지 필드는 에러 없이 조용히 제거됩니다.
//! `user`의 `role` 값은 정규화된 라벨로 바뀌어 저장됩니다.

use serde_json::Value;

use super::catalog::{KindSchema, Tier};
use super::context::canonical_role;
use super::registry::RuleRegistry;
use super::vocab::{ResourceKind, Role};
use crate::error::{Error, Result};
use crate::record::{Record, ACTIVE_FIELD, CREATED_BY_FIELD, ID_FIELD, ROLE_FIELD, STATUS_FIELD};

/// staff/supplier 읽기 허용 목록
pub const MEMBER_FIELDS: [&str; 5] = [ID_FIELD, "title", "name", "date", STATUS_FIELD];

/// 시스템이 관리하는 필드 (admin 외에는 쓰기 불가)
const SYSTEM_FIELDS: [&str; 4] = [ID_FIELD, CREATED_BY_FIELD, "createdAt", "updatedAt"];

/// 필드 축소기
#[derive(Debug, Clone, Copy)]
pub struct FieldRedactor<'a> {
    registry: &'a RuleRegistry,
}

impl<'a> FieldRedactor<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self { registry }
    }

    /// 읽기 결과 축소 (projection이므로 멱등)
    pub fn redact_for_read(&self, kind: ResourceKind, role: Role, record: &Record) -> Result<Record> {
        let schema = self.registry.schema(kind)?;
        let mut redacted = record.clone();
        redacted.retain(|field| readable(schema, role, field));
        Ok(redacted)
    }

    /// 여러 레코드 읽기 결과 축소
    pub fn redact_all_for_read(
        &self,
        kind: ResourceKind,
        role: Role,
        records: Vec<Record>,
    ) -> Result<Vec<Record>> {
        let schema = self.registry.schema(kind)?;
        Ok(records
            .into_iter()
            .map(|mut record| {
                record.retain(|field| readable(schema, role, field));
                record
            })
            .collect())
    }

    /// 쓰기 payload 축소
    ///
    /// `user`의 role 라벨을 인식할 수 없으면 `InvalidRecord`입니다.
    pub fn redact_for_write(&self, kind: ResourceKind, role: Role, payload: &Record) -> Result<Record> {
        let schema = self.registry.schema(kind)?;
        let mut redacted = payload.clone();
        redacted.retain(|field| writable(schema, role, field));
        if kind == ResourceKind::User {
            canonicalize_role_label(&mut redacted)?;
        }
        Ok(redacted)
    }

    /// role이 읽을 수 있는 필드 목록 (스토리지 column 목록용)
    ///
    /// `None`은 모든 필드를 뜻합니다 (admin).
    pub fn readable_fields(&self, kind: ResourceKind, role: Role) -> Result<Option<Vec<String>>> {
        if role == Role::Admin {
            return Ok(None);
        }

        let schema = self.registry.schema(kind)?;
        let fields = [Tier::Public, Tier::Restricted, Tier::AdminOnly]
            .into_iter()
            .flat_map(|tier| schema.fields_in(tier))
            .filter(|field| readable(schema, role, field))
            .map(str::to_string)
            .collect();
        Ok(Some(fields))
    }
}

fn canonicalize_role_label(record: &mut Record) -> Result<()> {
    let Some(value) = record.get(ROLE_FIELD) else {
        return Ok(());
    };
    let role = value
        .as_str()
        .and_then(|raw| canonical_role(raw).ok())
        .ok_or_else(|| Error::InvalidRecord {
            message: format!("unrecognized role label: {value}"),
        })?;
    record.insert(ROLE_FIELD, Value::String(role.as_str().to_string()));
    Ok(())
}

fn readable(schema: &KindSchema, role: Role, field: &str) -> bool {
    match role {
        Role::Admin => true,
        Role::Coordinator => matches!(
            schema.tier(field),
            Some(Tier::Public | Tier::Restricted)
        ) && !schema.is_coordinator_hidden(field),
        Role::Leader => schema.tier(field) == Some(Tier::Public),
        Role::Staff | Role::Supplier => MEMBER_FIELDS.contains(&field),
    }
}

fn writable(schema: &KindSchema, role: Role, field: &str) -> bool {
    if role == Role::Admin {
        return true;
    }
    if SYSTEM_FIELDS.contains(&field) || field == ROLE_FIELD {
        return false;
    }

    match role {
        Role::Coordinator => {
            field != STATUS_FIELD && field != ACTIVE_FIELD && readable(schema, role, field)
        }
        Role::Leader => schema.is_leader_writable(field),
        Role::Admin | Role::Staff | Role::Supplier => false,
    }
}
