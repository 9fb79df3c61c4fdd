//! Eventdesk Bridge
//!
//! `/api/:kind` 엔드포인트로 리소스 CRUD를 제공하며, 모든 요청은 정책 엔진
//! (scope → check → redact)을 거칩니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod middleware;
mod state;
mod store;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "evd_bridge=debug,evd_core=info,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Starting Bridge with config: {:?}", config);

    // 앱 상태 초기화
    let state = Arc::new(AppState::new(&config)?);

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Bridge listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Resource endpoints
        .route(
            "/api/:kind",
            get(handlers::crud::list).post(handlers::crud::create),
        )
        .route(
            "/api/:kind/:id",
            get(handlers::crud::get)
                .patch(handlers::crud::update)
                .delete(handlers::crud::delete),
        )
        // Health check
        .route("/health", get(handlers::health::health_check));

    if state.config.permissive_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::request_id))
        .with_state(state)
}
