//! 가격 데이터 Provider.
//!
//! Provider는 이름으로 [`ProviderRegistry`]에 등록되고, 갱신 요청의
//! `provider` 값으로 조회됩니다. 레지스트리는 생성 후 주입되며 전역 상태는 없습니다.

mod stub;
mod yahoo;

pub use stub::StubProvider;
pub use yahoo::YahooPriceProvider;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chronos_core::OhlcvRow;

use crate::error::{DataError, Result};

/// 외부 가격 데이터 소스.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// 레지스트리 등록 이름. 저장 키의 `provider` 값으로도 쓰입니다.
    fn name(&self) -> &str;

    /// 정규화된 OHLCV 행을 조회합니다.
    ///
    /// 데이터가 없으면 빈 Vec을 반환하고, 네트워크/벤더 오류는 에러로 반환합니다.
    async fn fetch_ohlcv_rows(&self, ticker: &str, interval: &str) -> Result<Vec<OhlcvRow>>;
}

/// 이름 → Provider 매핑.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn PriceProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider를 등록합니다. 같은 이름이 있으면 교체합니다.
    pub fn register(&mut self, provider: Arc<dyn PriceProvider>) -> &mut Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    /// 빌더 형태 등록.
    pub fn with(mut self, provider: Arc<dyn PriceProvider>) -> Self {
        self.register(provider);
        self
    }

    /// 이름으로 Provider를 조회합니다.
    pub fn get(&self, name: &str) -> Result<Arc<dyn PriceProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| DataError::UnknownProvider {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// 등록된 이름 목록 (정렬됨).
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_unknown_lists_names() {
        let registry = ProviderRegistry::new()
            .with(Arc::new(StubProvider::new("stub")))
            .with(Arc::new(StubProvider::new("alt")));

        assert_eq!(registry.get("stub").unwrap().name(), "stub");
        assert_eq!(registry.names(), vec!["alt".to_string(), "stub".to_string()]);

        let err = registry.get("missing").err().unwrap();
        match err {
            DataError::UnknownProvider { name, available } => {
                assert_eq!(name, "missing");
                assert_eq!(available, "alt, stub");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StubProvider::new("stub")));
        registry.register(Arc::new(StubProvider::new("stub")));
        assert_eq!(registry.names().len(), 1);
    }
}
