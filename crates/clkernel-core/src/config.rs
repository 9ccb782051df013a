//! Kernel handle configuration.

/// Behaviour switches for a [`Kernel`](crate::Kernel) handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Memoize resolved properties per handle.
    pub cache_properties: bool,
    /// Always re-query `CL_KERNEL_REFERENCE_COUNT` instead of serving it from cache.
    pub refresh_reference_count: bool,
    /// Release the native kernel when the handle is dropped.
    pub release_on_drop: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            cache_properties: true,
            refresh_reference_count: false,
            release_on_drop: true,
        }
    }
}

impl KernelConfig {
    /// Every query goes to the native API.
    #[must_use]
    pub fn uncached() -> Self {
        Self {
            cache_properties: false,
            ..Self::default()
        }
    }

    /// Cache immutable properties but keep the reference count live.
    #[must_use]
    pub fn live_refcount() -> Self {
        Self {
            refresh_reference_count: true,
            ..Self::default()
        }
    }
}

/// Builder for KernelConfig.
#[derive(Debug, Default)]
pub struct KernelConfigBuilder {
    config: KernelConfig,
}

impl KernelConfigBuilder {
    /// Creates a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables property memoization.
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.config.cache_properties = enabled;
        self
    }

    /// Enables or disables live reference-count queries.
    #[must_use]
    pub fn with_refresh_reference_count(mut self, enabled: bool) -> Self {
        self.config.refresh_reference_count = enabled;
        self
    }

    /// Enables or disables release on drop.
    #[must_use]
    pub fn with_release_on_drop(mut self, enabled: bool) -> Self {
        self.config.release_on_drop = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> KernelConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KernelConfig::default();
        assert!(config.cache_properties);
        assert!(!config.refresh_reference_count);
        assert!(config.release_on_drop);
    }

    #[test]
    fn test_presets() {
        assert!(!KernelConfig::uncached().cache_properties);
        let live = KernelConfig::live_refcount();
        assert!(live.cache_properties);
        assert!(live.refresh_reference_count);
    }

    #[test]
    fn test_builder() {
        let config = KernelConfigBuilder::new()
            .with_cache(false)
            .with_release_on_drop(false)
            .build();
        assert!(!config.cache_properties);
        assert!(!config.release_on_drop);
        assert!(!config.refresh_reference_count);
    }
}
