use std::sync::{Arc, RwLock};

use tracing::info;

use super::pricing::{ConfigurationError, EstimateEngine, PricingConfig};

/// Shared holder for the active pricing snapshot.
///
/// Readers clone the `Arc` and keep using it for the rest of their calculation, so a
/// concurrent `replace` never exposes a half-updated table.
#[derive(Debug)]
pub struct PricingCatalog {
    current: RwLock<Arc<PricingConfig>>,
}

impl PricingCatalog {
    pub fn new(config: PricingConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(config)),
        })
    }

    pub fn standard() -> Self {
        Self {
            current: RwLock::new(Arc::new(PricingConfig::standard())),
        }
    }

    pub fn snapshot(&self) -> Arc<PricingConfig> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn engine(&self) -> EstimateEngine {
        EstimateEngine::from_snapshot(self.snapshot())
    }

    /// Validates `config` and swaps it in. The previous snapshot stays alive for
    /// callers still holding it.
    pub fn replace(&self, config: PricingConfig) -> Result<(), ConfigurationError> {
        config.validate()?;
        let next = Arc::new(config);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = next;
        info!("pricing catalog replaced");
        Ok(())
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
