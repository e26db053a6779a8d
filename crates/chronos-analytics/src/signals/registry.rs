//! 이름 기반 시그널 Provider 레지스트리.

use std::collections::HashMap;
use std::sync::Arc;

use super::{SignalProvider, TaSignalProvider};
use crate::indicators::{IndicatorError, IndicatorResult};

/// 이름 → 시그널 Provider 매핑. 생성 후 주입해서 사용합니다.
#[derive(Clone, Default)]
pub struct SignalProviderRegistry {
    providers: HashMap<String, Arc<dyn SignalProvider>>,
}

impl SignalProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기본 `ta` Provider가 등록된 레지스트리.
    pub fn with_defaults() -> Self {
        Self::new().with(Arc::new(TaSignalProvider::new()))
    }

    pub fn register(&mut self, provider: Arc<dyn SignalProvider>) -> &mut Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    pub fn with(mut self, provider: Arc<dyn SignalProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> IndicatorResult<Arc<dyn SignalProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| IndicatorError::UnknownProvider {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for SignalProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_register_ta() {
        let registry = SignalProviderRegistry::with_defaults();
        assert_eq!(registry.get("ta").unwrap().name(), "ta");

        let err = registry.get("pandas").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unknown signal provider 'pandas' (registered: ta)"
        );
    }
}
