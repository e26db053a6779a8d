//! 바이너리 공통 초기화: 저장소와 레지스트리 구성.

use std::sync::Arc;

use chronos_analytics::SignalProviderRegistry;
use chronos_core::{AppConfig, DatabaseConfig};
use chronos_data::{MemoryStore, PgStore, ProviderRegistry, Store, YahooPriceProvider};
use tracing::{info, warn};

use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};
use crate::refresh::RefreshService;

/// 설정에 따라 PostgreSQL 또는 인메모리 저장소를 엽니다.
///
/// PostgreSQL이면 마이그레이션까지 실행합니다.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn Store>> {
    if config.use_memory {
        warn!("인메모리 저장소 사용: 재시작 시 데이터가 사라집니다");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(config).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

/// 기본 가격 Provider 레지스트리 (Yahoo Finance).
pub fn default_price_providers() -> Result<ProviderRegistry> {
    let yahoo = YahooPriceProvider::new()?;
    Ok(ProviderRegistry::new().with(Arc::new(yahoo)))
}

/// 설정과 저장소로 갱신 서비스를 구성합니다.
///
/// 설정된 기본 Provider 이름이 레지스트리에 없으면 설정 에러입니다.
pub fn build_refresh_service(
    app: &AppConfig,
    store: Arc<dyn Store>,
    providers: ProviderRegistry,
) -> Result<(RefreshService, CollectorConfig)> {
    let config = CollectorConfig::from_app_config(app)?;
    let signals = SignalProviderRegistry::with_defaults();

    providers
        .get(&config.default_provider)
        .map_err(|e| CollectorError::Config(e.to_string()))?;
    signals
        .get(&config.signal_provider)
        .map_err(|e| CollectorError::Config(e.to_string()))?;

    info!(
        backend = store.backend(),
        providers = ?providers.names(),
        signal_provider = %config.signal_provider,
        "갱신 서비스 구성 완료"
    );

    let service = RefreshService::new(store, providers, signals, config.signal_provider.clone());
    Ok((service, config))
}
