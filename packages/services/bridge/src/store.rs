//! 인메모리 레코드 저장소
//!
//! 스토리지 협력자 역할을 합니다. 목록 조회는 정책 엔진이 만든 필터를
//! `Filter::matches`로 평가하며, 저장되는 payload는 이미 축소된 상태여야 합니다.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use evd_core::permissions::{Filter, ResourceKind};
use evd_core::Record;

type Tables = HashMap<ResourceKind, BTreeMap<String, Record>>;

/// 리소스 종류별 레코드 저장소 (id 순 정렬)
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 필터에 매칭하는 레코드 목록
    pub fn list(&self, kind: ResourceKind, filter: &Filter) -> Vec<Record> {
        self.read()
            .get(&kind)
            .map(|table| {
                table
                    .values()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, kind: ResourceKind, id: &str) -> Option<Record> {
        self.read().get(&kind).and_then(|table| table.get(id)).cloned()
    }

    /// 레코드 저장 (같은 id가 있으면 교체)
    pub fn put(&self, kind: ResourceKind, id: impl Into<String>, record: Record) {
        self.write()
            .entry(kind)
            .or_default()
            .insert(id.into(), record);
    }

    pub fn remove(&self, kind: ResourceKind, id: &str) -> Option<Record> {
        self.write().get_mut(&kind).and_then(|table| table.remove(id))
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        // 쓰기 중 panic이 나도 맵 자체는 일관된 상태
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_applies_filter() {
        let store = MemoryStore::new();
        store.put(ResourceKind::Event, "E1", Record::new().with("id", "E1").with("active", true));
        store.put(ResourceKind::Event, "E2", Record::new().with("id", "E2").with("active", false));

        let active = store.list(ResourceKind::Event, &Filter::eq("active", true));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), Some("E1"));

        assert_eq!(store.list(ResourceKind::Event, &Filter::All).len(), 2);
        assert!(store.list(ResourceKind::Report, &Filter::All).is_empty());
    }

    #[test]
    fn test_put_get_remove() {
        let store = MemoryStore::new();
        store.put(ResourceKind::User, "U1", Record::new().with("name", "Ana"));
        store.put(ResourceKind::User, "U1", Record::new().with("name", "Bea"));

        let user = store.get(ResourceKind::User, "U1").unwrap();
        assert_eq!(user.str_field("name"), Some("Bea"));

        assert!(store.remove(ResourceKind::User, "U1").is_some());
        assert!(store.get(ResourceKind::User, "U1").is_none());
        assert!(store.remove(ResourceKind::User, "U1").is_none());
    }
}
