//! 시간 창 (TimeWindow) 평가
//!
//! role별 날짜 오프셋은 이 모듈에만 선언됩니다. 창은 평가 시점의 `now`로부터
//! 매번 다시 계산되며 캐시되지 않습니다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::vocab::{ResourceKind, Role};

/// leader: 이벤트 날짜 기준 ±N일
pub const LEADER_WINDOW_DAYS: i64 = 3;

/// coordinator: 보고서 최근 N일
pub const COORDINATOR_REPORT_DAYS: i64 = 180;

/// 닫힌 시간 창 (`start ≤ end`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// 새 창 생성. 순서가 뒤집혀 있으면 정렬합니다.
    pub fn new(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// `center` 기준 ±`days`일
    pub fn around(center: DateTime<Utc>, days: i64) -> Self {
        let span = Duration::days(days.abs());
        Self::new(center - span, center + span)
    }

    /// `now`로부터 과거 `days`일
    pub fn trailing(now: DateTime<Utc>, days: i64) -> Self {
        Self::new(now - Duration::days(days.abs()), now)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        in_window(date, self)
    }
}

/// 열린 날짜 범위 (호출자가 지정한 필터, 각 경계는 생략 가능)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// 경계가 하나도 없는지
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }
}

impl From<TimeWindow> for DateRange {
    fn from(window: TimeWindow) -> Self {
        Self {
            from: Some(window.start),
            to: Some(window.end),
        }
    }
}

/// `window.start ≤ date ≤ window.end`
pub fn in_window(date: DateTime<Utc>, window: &TimeWindow) -> bool {
    window.start <= date && date <= window.end
}

/// role/리소스 조합의 기본 시간 창
///
/// 시간 제한이 없는 조합이면 `None`.
/// `event_bearing`은 해당 리소스가 이벤트 속성과 날짜 속성을 모두 갖는지 여부입니다.
pub fn window_for(
    role: Role,
    kind: ResourceKind,
    event_bearing: bool,
    now: DateTime<Utc>,
) -> Option<TimeWindow> {
    match (role, kind) {
        (Role::Leader, _) if event_bearing => Some(TimeWindow::around(now, LEADER_WINDOW_DAYS)),
        (Role::Coordinator, ResourceKind::Report) => {
            Some(TimeWindow::trailing(now, COORDINATOR_REPORT_DAYS))
        }
        _ => None,
    }
}
