//! Chronos API 서버.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chronos_api::{create_router, AppState};
use chronos_collector::{
    build_refresh_service, default_price_providers, open_store, MarketRefreshScheduler,
};
use chronos_core::{init_logging, AppConfig, LogConfig};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

/// CORS 레이어.
///
/// `CORS_ORIGINS`(쉼표 구분)가 있으면 해당 origin만, 없으면 모두 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::load_default().context("설정 로드 실패")?;

    init_logging(LogConfig::from_settings(&app_config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {e}"))?;

    info!("Starting Chronos API server...");

    let store = open_store(&app_config.database).await?;
    let (refresh, config) = build_refresh_service(&app_config, store, default_price_providers()?)?;

    // 전역 종료 토큰 (스케줄러에 전파)
    let shutdown_token = CancellationToken::new();

    let scheduler_handle = if config.scheduler.enabled {
        Some(MarketRefreshScheduler::new(refresh.clone(), &config).spawn(shutdown_token.clone()))
    } else {
        warn!("장중 갱신 스케줄러 비활성화됨 (scheduler.enabled = false)");
        None
    };

    let state = Arc::new(AppState::new(refresh, config));
    info!(version = %state.version, backend = state.store.backend(), "Application state initialized");

    let app = create_router(state).layer(cors_layer());

    let addr = app_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("{addr} 바인딩 실패"))?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    if let Some(handle) = scheduler_handle {
        match tokio::time::timeout(Duration::from_secs(10), handle).await {
            Ok(Ok(())) => info!("Scheduler stopped"),
            Ok(Err(e)) => error!(error = %e, "Scheduler task failed"),
            Err(_) => warn!("Scheduler stop timeout, forcing shutdown"),
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM을 받으면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
        _ = shutdown_token.cancelled() => {}
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
