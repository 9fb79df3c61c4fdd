//! 단건 접근 검사 (AccessChecker)
//!
//! 읽기/쓰기/삭제에 대한 허용 여부를 [`Decision`]으로 돌려줍니다.
//! 거부는 정상 반환값이며, `?` 전파가 필요한 호출자는 [`AccessChecker::authorize`]를 씁니다.

use super::context::PolicyContext;
use super::decision::{Decision, DenyReason};
use super::registry::RuleRegistry;
use super::vocab::Operation;
use crate::error::{Error, Result};
use crate::record::Record;

/// 단건 접근 검사기
#[derive(Debug, Clone, Copy)]
pub struct AccessChecker<'a> {
    registry: &'a RuleRegistry,
}

impl<'a> AccessChecker<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self { registry }
    }

    /// 읽기 판단
    pub fn check_read(&self, ctx: &PolicyContext, record: &Record) -> Result<Decision> {
        self.decide(ctx, Operation::Read, Some(record))
    }

    /// 쓰기 판단 (`None`이면 생성, `Some`이면 기존 레코드 수정)
    pub fn check_write(&self, ctx: &PolicyContext, record: Option<&Record>) -> Result<Decision> {
        let operation = match record {
            Some(_) => Operation::Update,
            None => Operation::Create,
        };
        self.decide(ctx, operation, record)
    }

    /// 삭제 판단
    pub fn check_delete(&self, ctx: &PolicyContext, record: &Record) -> Result<Decision> {
        self.decide(ctx, Operation::Delete, Some(record))
    }

    pub fn can_read(&self, ctx: &PolicyContext, record: &Record) -> Result<bool> {
        Ok(self.check_read(ctx, record)?.is_allowed())
    }

    pub fn can_write(&self, ctx: &PolicyContext, record: Option<&Record>) -> Result<bool> {
        Ok(self.check_write(ctx, record)?.is_allowed())
    }

    pub fn can_delete(&self, ctx: &PolicyContext, record: &Record) -> Result<bool> {
        Ok(self.check_delete(ctx, record)?.is_allowed())
    }

    /// 컨텍스트의 작업을 검사하고 거부면 `AuthorizationDenied`로 변환
    ///
    /// 목록 작업은 항상 통과합니다 (범위 제한은 QueryScoper 담당).
    pub fn authorize(&self, ctx: &PolicyContext, record: Option<&Record>) -> Result<()> {
        let decision = match (ctx.operation(), record) {
            (Operation::List, _) => Decision::Allow,
            (Operation::Create, _) => self.check_write(ctx, None)?,
            (Operation::Update, Some(record)) => self.check_write(ctx, Some(record))?,
            (Operation::Read, Some(record)) => self.check_read(ctx, record)?,
            (Operation::Delete, Some(record)) => self.check_delete(ctx, record)?,
            (operation, None) => {
                return Err(Error::InvalidRecord {
                    message: format!("{operation} requires a loaded record"),
                })
            }
        };

        match decision {
            Decision::Deny(reason) => Err(Error::AuthorizationDenied { reason }),
            _ => Ok(()),
        }
    }

    fn decide(
        &self,
        ctx: &PolicyContext,
        operation: Operation,
        record: Option<&Record>,
    ) -> Result<Decision> {
        let decision = self.registry.evaluate(ctx, operation, record)?;

        // 단건 검사에서 필터 결과는 레코드 매칭 여부로 환원
        Ok(match (decision, record) {
            (Decision::Filter(filter), Some(record)) if filter.matches(record) => Decision::Allow,
            (Decision::Filter(_), _) => Decision::Deny(DenyReason::NotOwner),
            (other, _) => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::context::Actor;
    use crate::permissions::vocab::{ResourceKind, Role};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn day(offset: i64) -> String {
        (now() + Duration::days(offset)).to_rfc3339()
    }

    fn ctx(actor: &Actor, kind: ResourceKind, operation: Operation) -> PolicyContext {
        PolicyContext::new(actor.clone(), kind, operation).with_now(now())
    }

    fn leader() -> Actor {
        Actor::new("L1", Role::Leader).with_assigned_events(["E1"])
    }

    #[test]
    fn test_leader_read_scenarios() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let ctx = ctx(&leader(), ResourceKind::Report, Operation::Read);

        let near = Record::new().with("eventId", "E1").with("date", day(2));
        let far = Record::new().with("eventId", "E1").with("date", day(10));
        let other = Record::new().with("eventId", "E2").with("date", day(0));

        assert!(checker.can_read(&ctx, &near).unwrap());
        assert_eq!(
            checker.check_read(&ctx, &far).unwrap(),
            Decision::Deny(DenyReason::OutOfWindow)
        );
        assert_eq!(
            checker.check_read(&ctx, &other).unwrap(),
            Decision::Deny(DenyReason::EventNotAssigned)
        );
    }

    #[test]
    fn test_leader_read_flips_when_now_moves() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let record = Record::new().with("id", "E1").with("date", day(0));

        let today = ctx(&leader(), ResourceKind::Event, Operation::Read);
        assert!(checker.can_read(&today, &record).unwrap());

        let later = today.clone().with_now(now() + Duration::days(4));
        assert!(!checker.can_read(&later, &record).unwrap());

        let earlier = today.with_now(now() - Duration::days(3));
        assert!(checker.can_read(&earlier, &record).unwrap());
    }

    #[test]
    fn test_only_admin_deletes() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let record = Record::new()
            .with("id", "R1")
            .with("eventId", "E1")
            .with("date", day(0))
            .with("createdBy", "U1");

        for kind in ResourceKind::ALL {
            for role in Role::ALL {
                let actor = Actor::new("U1", role).with_assigned_events(["E1"]);
                let allowed = checker
                    .can_delete(&ctx(&actor, kind, Operation::Delete), &record)
                    .unwrap();
                assert_eq!(allowed, role == Role::Admin, "{role} delete {kind}");
            }
        }
    }

    #[test]
    fn test_owner_reads_and_writes_but_cannot_delete() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let actor = Actor::new("C1", Role::Coordinator);
        let record = Record::new()
            .with("eventId", "E9")
            .with("date", day(-300))
            .with("reportType", "other")
            .with("createdBy", "C1");

        let read = ctx(&actor, ResourceKind::Report, Operation::Read);
        assert!(checker.can_read(&read, &record).unwrap());
        assert!(checker.can_write(&read, Some(&record)).unwrap());
        assert_eq!(
            checker.check_delete(&read, &record).unwrap(),
            Decision::Deny(DenyReason::RoleInsufficient)
        );
    }

    #[test]
    fn test_staff_reads_own_record_but_never_writes() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let staff = Actor::new("U1", Role::Staff);
        let record = Record::new()
            .with("createdBy", "U1")
            .with("internalNotes", "x");

        let ctx = ctx(&staff, ResourceKind::Contract, Operation::Read);
        assert!(checker.can_read(&ctx, &record).unwrap());
        assert!(!checker.can_write(&ctx, Some(&record)).unwrap());
        assert!(!checker.can_write(&ctx, None).unwrap());
    }

    #[test]
    fn test_coordinator_write_narrowing() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let actor = Actor::new("C1", Role::Coordinator).with_assigned_events(["E1"]);

        let ctx_user = ctx(&actor, ResourceKind::User, Operation::Update);
        let admin_user = Record::new().with("role", "Admin").with("createdBy", "C1");
        assert_eq!(
            checker.check_write(&ctx_user, Some(&admin_user)).unwrap(),
            Decision::Deny(DenyReason::RoleInsufficient)
        );
        let odd_label = Record::new().with("role", "superuser");
        assert!(!checker.can_write(&ctx_user, Some(&odd_label)).unwrap());
        let leader_user = Record::new().with("role", "leader");
        assert!(checker.can_write(&ctx_user, Some(&leader_user)).unwrap());

        let ctx_event = ctx(&actor, ResourceKind::Event, Operation::Create);
        assert!(checker.can_write(&ctx_event, None).unwrap());

        let foreign = Record::new().with("id", "E5").with("eventType", "private");
        assert_eq!(
            checker.check_write(&ctx_event, Some(&foreign)).unwrap(),
            Decision::Deny(DenyReason::EventNotAssigned)
        );
    }

    #[test]
    fn test_coordinator_never_sees_admin_users() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let scoper = crate::permissions::QueryScoper::new(&registry);
        let actor = Actor::new("C1", Role::Coordinator);

        let list = ctx(&actor, ResourceKind::User, Operation::List);
        let read = ctx(&actor, ResourceKind::User, Operation::Read);
        let scope = scoper.scope(&list).unwrap();

        for label in ["admin", "Admin", "ADMIN", "Administrador", "administrador"] {
            let user = Record::new()
                .with("id", "U9")
                .with("role", label)
                .with("active", true)
                .with("createdBy", "C1");
            assert!(!scope.matches(&user), "{label} listed");
            assert_eq!(
                checker.check_read(&read, &user).unwrap(),
                Decision::Deny(DenyReason::RoleInsufficient),
                "{label} readable"
            );
        }

        let staff = Record::new().with("id", "U2").with("role", "staff");
        assert!(scope.matches(&staff));
        assert!(checker.can_read(&read, &staff).unwrap());
    }

    #[test]
    fn test_coordinator_reads_report_older_than_list_default() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let actor = Actor::new("C1", Role::Coordinator).with_assigned_events(["E1"]);
        let old = Record::new()
            .with("eventId", "E1")
            .with("date", day(-200))
            .with("reportType", "other");

        let read = ctx(&actor, ResourceKind::Report, Operation::Read);
        assert!(checker.can_read(&read, &old).unwrap());
        assert!(checker.can_write(&read, Some(&old)).unwrap());

        let foreign = old.clone().with("eventId", "E7");
        assert_eq!(
            checker.check_read(&read, &foreign).unwrap(),
            Decision::Deny(DenyReason::EventNotAssigned)
        );
    }

    #[test]
    fn test_leader_write_rules() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);

        let create = ctx(&leader(), ResourceKind::Resource, Operation::Create);
        assert_eq!(
            checker.check_write(&create, None).unwrap(),
            Decision::Deny(DenyReason::RoleInsufficient)
        );

        let update = ctx(&leader(), ResourceKind::Resource, Operation::Update);
        let near = Record::new().with("eventId", "E1").with("date", day(-1));
        let far = Record::new().with("eventId", "E1").with("date", day(-5));
        assert!(checker.can_write(&update, Some(&near)).unwrap());
        assert_eq!(
            checker.check_write(&update, Some(&far)).unwrap(),
            Decision::Deny(DenyReason::OutOfWindow)
        );

        let provider = ctx(&leader(), ResourceKind::Provider, Operation::Update);
        let active = Record::new().with("active", true);
        assert_eq!(
            checker.check_write(&provider, Some(&active)).unwrap(),
            Decision::Deny(DenyReason::RoleInsufficient)
        );
    }

    #[test]
    fn test_authorize_maps_deny_to_error() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let record = Record::new().with("eventId", "E2").with("date", day(0));

        let read = ctx(&leader(), ResourceKind::Report, Operation::Read);
        let err = checker.authorize(&read, Some(&record)).unwrap_err();
        assert_eq!(err.deny_reason(), Some(DenyReason::EventNotAssigned));

        let list = ctx(&leader(), ResourceKind::Report, Operation::List);
        assert!(checker.authorize(&list, None).is_ok());

        let delete = ctx(&leader(), ResourceKind::Report, Operation::Delete);
        assert!(matches!(
            checker.authorize(&delete, None),
            Err(Error::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_admin_always_allowed() {
        let registry = RuleRegistry::builtin().unwrap();
        let checker = AccessChecker::new(&registry);
        let admin = Actor::new("A1", Role::Admin);
        let record = Record::new().with("eventId", "E404").with("date", "1999-01-01");

        for kind in ResourceKind::ALL {
            let ctx = ctx(&admin, kind, Operation::Read);
            assert!(checker.can_read(&ctx, &record).unwrap());
            assert!(checker.can_write(&ctx, Some(&record)).unwrap());
            assert!(checker.can_write(&ctx, None).unwrap());
            assert!(checker.can_delete(&ctx, &record).unwrap());
        }
    }
}
