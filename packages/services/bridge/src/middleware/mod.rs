//! Bridge 미들웨어
//!
//! 요청 ID 부여와 액터 claims 추출을 정의합니다.

use axum::async_trait;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use evd_core::permissions::ActorClaims;

use crate::error::BridgeError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ASSIGNED_EVENTS_HEADER: &str = "x-assigned-events";
pub const ASSOCIATED_EVENTS_HEADER: &str = "x-associated-events";

#[derive(Clone, Debug)]
pub struct RequestId(#[allow(dead_code)] pub String);

tokio::task_local! {
    static REQUEST_ID: String;
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 요청 ID 부여 (클라이언트가 보낸 값이 있으면 그대로 사용)
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = header_str(req.headers(), REQUEST_ID_HEADER)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut resp = REQUEST_ID.scope(id.clone(), async move { next.run(req).await }).await;
    if let Ok(value) = HeaderValue::from_bytes(id.as_bytes()) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}

/// 요청 헤더에서 얻은 액터 claims
///
/// 세션 계층을 대신합니다. id/role 헤더가 없으면 401입니다.
/// role 문자열의 정규화는 정책 엔진이 담당합니다.
#[derive(Debug, Clone)]
pub struct Claims(pub ActorClaims);

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = BridgeError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claims_from_headers(&parts.headers).map(Claims)
    }
}

fn claims_from_headers(headers: &HeaderMap) -> Result<ActorClaims, BridgeError> {
    let id = header_str(headers, ACTOR_ID_HEADER).ok_or_else(|| BridgeError::Unauthorized {
        message: format!("missing {ACTOR_ID_HEADER} header"),
    })?;
    let role = header_str(headers, ACTOR_ROLE_HEADER).ok_or_else(|| BridgeError::Unauthorized {
        message: format!("missing {ACTOR_ROLE_HEADER} header"),
    })?;

    let mut claims = ActorClaims::new(id, role);
    claims.assigned_event_ids = header_list(headers, ASSIGNED_EVENTS_HEADER);
    claims.associated_event_ids = header_list(headers, ASSOCIATED_EVENTS_HEADER);
    Ok(claims)
}

/// 헤더 값 (UTF-8, 앞뒤 공백 제거)
///
/// role 라벨에 악센트가 올 수 있으므로 ASCII로 제한하지 않습니다.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn header_list(headers: &HeaderMap, name: &str) -> Option<Vec<String>> {
    header_str(headers, name).map(|v| {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_bytes(value.as_bytes()).unwrap());
        }
        headers
    }

    #[test]
    fn test_claims_from_headers() {
        let claims = claims_from_headers(&headers(&[
            (ACTOR_ID_HEADER, "L1"),
            (ACTOR_ROLE_HEADER, "Líder"),
            (ASSIGNED_EVENTS_HEADER, "E1, E2,,"),
        ]))
        .unwrap();

        assert_eq!(claims.id, "L1");
        assert_eq!(claims.role, "Líder");
        assert_eq!(
            claims.assigned_event_ids,
            Some(vec!["E1".to_string(), "E2".to_string()])
        );
        assert_eq!(claims.associated_event_ids, None);
    }

    #[test]
    fn test_non_utf8_role_is_missing() {
        let mut headers = headers(&[(ACTOR_ID_HEADER, "L1")]);
        headers.insert(ACTOR_ROLE_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());

        let err = claims_from_headers(&headers).unwrap_err();
        assert!(matches!(err, BridgeError::Unauthorized { .. }));
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        let err = claims_from_headers(&headers(&[(ACTOR_ROLE_HEADER, "admin")])).unwrap_err();
        assert!(matches!(err, BridgeError::Unauthorized { .. }));

        let err = claims_from_headers(&headers(&[(ACTOR_ID_HEADER, "A1")])).unwrap_err();
        assert!(matches!(err, BridgeError::Unauthorized { .. }));
    }
}
