//! 애플리케이션 공유 상태.
//!
//! 모든 핸들러는 `State<Arc<AppState>>`로 저장소와 갱신 서비스에 접근합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chronos_collector::{CollectorConfig, RefreshService};
use chronos_data::Store;
use chronos_strategy::CandidateEngine;

/// 애플리케이션 상태.
#[derive(Clone)]
pub struct AppState {
    /// 저장소 (PostgreSQL 또는 인메모리)
    pub store: Arc<dyn Store>,

    /// 가격 갱신 서비스 (Provider/시그널 레지스트리 포함)
    pub refresh: RefreshService,

    /// 갱신 기본값과 스케줄러 설정
    pub config: CollectorConfig,

    /// API 버전
    pub version: String,

    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(refresh: RefreshService, config: CollectorConfig) -> Self {
        Self {
            store: refresh.store().clone(),
            refresh,
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }

    pub fn candidate_engine(&self) -> CandidateEngine {
        CandidateEngine::new(self.store.clone())
    }

    /// 요청에 Provider가 없으면 설정 기본값을 사용합니다.
    pub fn provider_or_default(&self, provider: Option<String>) -> String {
        provider.unwrap_or_else(|| self.config.default_provider.clone())
    }

    /// 요청에 봉 간격이 없으면 설정 기본값을 사용합니다.
    pub fn interval_or_default(&self, interval: Option<String>) -> String {
        interval.unwrap_or_else(|| self.config.default_interval.clone())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("refresh", &self.refresh)
            .field("version", &self.version)
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// 테스트용 상태: 인메모리 저장소와 주어진 Provider 레지스트리.
#[cfg(test)]
pub(crate) fn create_test_state(providers: chronos_data::ProviderRegistry) -> AppState {
    use chronos_analytics::SignalProviderRegistry;
    use chronos_data::MemoryStore;

    let config = CollectorConfig {
        default_provider: "stub".to_string(),
        ..CollectorConfig::default()
    };
    let refresh = RefreshService::new(
        Arc::new(MemoryStore::new()),
        providers,
        SignalProviderRegistry::with_defaults(),
        "ta",
    );
    AppState::new(refresh, config)
}
