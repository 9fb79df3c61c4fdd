//! Filter → WHERE 조건 변환
//!
//! 인메모리 `Filter::matches`와 같은 결과가 나오도록 변환합니다.
//! 값이 없는 컬럼(NULL)은 어떤 비교에도 매칭하지 않습니다.

use sea_query::{Cond, Condition, Expr, Iden, SimpleExpr};
use serde_json::Value as JsonValue;

use evd_core::permissions::{DateRange, Filter};

/// 동적 테이블/컬럼 식별자
#[derive(Debug, Clone)]
pub(crate) struct DynIden(pub(crate) String);

impl Iden for DynIden {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        // String에 쓰는 fmt::Write는 실패하지 않음
        let _ = write!(s, "{}", self.0);
    }
}

/// 필터를 WHERE 조건으로 변환
///
/// `Filter::All`은 빈 조건이 됩니다. 호출자는 [`Filter::is_all`]로 먼저
/// 걸러서 WHERE 절 자체를 생략하는 편이 좋습니다.
pub fn to_condition(filter: &Filter) -> Condition {
    match filter {
        Filter::All => Cond::all(),
        Filter::Nothing => Cond::all().add(Expr::cust("FALSE")),
        Filter::Eq { field, value } => Cond::all().add(eq_expr(field, value)),
        Filter::Ne { field, value } => Cond::all().add(ne_expr(field, value)),
        Filter::In { field, values } => {
            if values.is_empty() {
                return Cond::all().add(Expr::cust("FALSE"));
            }
            Cond::all().add(column(field).is_in(values.iter().map(json_to_value)))
        }
        Filter::Date { field, range } => date_condition(field, range),
        Filter::And { clauses } => clauses
            .iter()
            .filter(|clause| !clause.is_all())
            .fold(Cond::all(), |cond, clause| cond.add(to_condition(clause))),
        Filter::Or { clauses } => {
            if clauses.iter().any(Filter::is_all) {
                return Cond::all();
            }
            clauses
                .iter()
                .fold(Cond::any(), |cond, clause| cond.add(to_condition(clause)))
        }
    }
}

fn column(field: &str) -> Expr {
    Expr::col(DynIden(field.to_string()))
}

fn eq_expr(field: &str, value: &JsonValue) -> SimpleExpr {
    match value {
        JsonValue::Null => column(field).is_null(),
        _ => column(field).eq(json_to_value(value)),
    }
}

fn ne_expr(field: &str, value: &JsonValue) -> SimpleExpr {
    match value {
        JsonValue::Null => column(field).is_not_null(),
        _ => column(field).ne(json_to_value(value)),
    }
}

fn date_condition(field: &str, range: &DateRange) -> Condition {
    // 경계가 없어도 날짜 값 자체는 있어야 함
    let mut cond = Cond::all().add(column(field).is_not_null());
    if let Some(from) = range.from {
        cond = cond.add(column(field).gte(from));
    }
    if let Some(to) = range.to {
        cond = cond.add(column(field).lte(to));
    }
    cond
}

fn json_to_value(value: &JsonValue) -> sea_query::Value {
    match value {
        JsonValue::String(s) => s.clone().into(),
        JsonValue::Bool(b) => (*b).into(),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.into(),
            (None, Some(f)) => f.into(),
            (None, None) => n.to_string().into(),
        },
        other => other.clone().into(),
    }
}
