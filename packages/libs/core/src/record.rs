//! 레코드 (문서) 표현
//!
//! 스토리지가 돌려주는 JSON 객체를 감싸고, 규칙이 읽는 속성에 대한 접근자를 제공합니다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// 레코드 ID 필드
pub const ID_FIELD: &str = "id";

/// 작성자 필드
pub const CREATED_BY_FIELD: &str = "createdBy";

/// 활성 여부 필드
pub const ACTIVE_FIELD: &str = "active";

/// 상태 필드
pub const STATUS_FIELD: &str = "status";

/// 사용자 role 필드 (`user` 리소스)
pub const ROLE_FIELD: &str = "role";

/// 스토리지 레코드 또는 쓰기 payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// 빈 레코드
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON 값에서 생성 (객체만 허용)
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidRecord {
                message: format!("expected JSON object, got {}", json_type_name(&other)),
            }),
        }
    }

    /// 필드 설정 (builder)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 허용된 필드만 남깁니다.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|k, _| keep(k));
    }

    /// 다른 레코드의 필드를 덮어씁니다 (PATCH 의미).
    pub fn merge(&mut self, patch: Record) {
        for (k, v) in patch.0 {
            self.0.insert(k, v);
        }
    }

    /// 문자열 필드
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// 날짜 필드
    ///
    /// RFC 3339 타임스탬프 또는 `YYYY-MM-DD` (UTC 자정)를 허용합니다.
    pub fn date_field(&self, field: &str) -> Option<DateTime<Utc>> {
        self.str_field(field).and_then(parse_date)
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field(ID_FIELD)
    }

    pub fn created_by(&self) -> Option<&str> {
        self.str_field(CREATED_BY_FIELD)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

/// 날짜 문자열 파싱
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(Record::from_value(json!({"id": "r1"})).is_ok());

        let err = Record::from_value(json!(["r1"])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_date_field_formats() {
        let record = Record::new()
            .with("date", "2026-10-17")
            .with("startsAt", "2026-10-17T09:30:00+02:00")
            .with("bad", "next tuesday");

        assert_eq!(
            record.date_field("date"),
            Some(Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap())
        );
        assert_eq!(
            record.date_field("startsAt"),
            Some(Utc.with_ymd_and_hms(2026, 10, 17, 7, 30, 0).unwrap())
        );
        assert_eq!(record.date_field("bad"), None);
        assert_eq!(record.date_field("missing"), None);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut record = Record::new().with("name", "Stage").with("quantity", 2);
        record.merge(Record::new().with("quantity", 4));

        assert_eq!(record.get("quantity"), Some(&json!(4)));
        assert_eq!(record.str_field("name"), Some("Stage"));
    }
}
