use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSettings {
    pub environment: Environment,
    pub trace: TraceConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Log every intercepted operation at debug level
    pub operations: bool,
    /// Log each handler invocation at trace level
    pub handlers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Log plugin registrations at debug level
    pub log_registrations: bool,
    /// Log when a duplicate `once` registration is ignored
    pub warn_duplicate_names: bool,
}

impl HookSettings {
    pub fn from_env() -> Self {
        let environment = match env::var("HOOK_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("HOOK_TRACE_OPERATIONS") {
            self.trace.operations = v.parse().unwrap_or(self.trace.operations);
        }
        if let Ok(v) = env::var("HOOK_TRACE_HANDLERS") {
            self.trace.handlers = v.parse().unwrap_or(self.trace.handlers);
        }
        if let Ok(v) = env::var("HOOK_LOG_REGISTRATIONS") {
            self.registry.log_registrations = v.parse().unwrap_or(self.registry.log_registrations);
        }
        if let Ok(v) = env::var("HOOK_WARN_DUPLICATE_NAMES") {
            self.registry.warn_duplicate_names = v.parse().unwrap_or(self.registry.warn_duplicate_names);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            trace: TraceConfig {
                operations: true,
                handlers: true,
            },
            registry: RegistryConfig {
                log_registrations: true,
                warn_duplicate_names: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            trace: TraceConfig {
                operations: false,
                handlers: false,
            },
            registry: RegistryConfig {
                log_registrations: false,
                warn_duplicate_names: false,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<HookSettings> = Lazy::new(HookSettings::from_env);

// Convenience function for accessing config
pub fn config() -> &'static HookSettings {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = HookSettings::development();
        assert!(config.trace.operations);
        assert!(config.trace.handlers);
        assert!(config.registry.log_registrations);
    }

    #[test]
    fn test_default_production_config() {
        let config = HookSettings::production();
        assert!(!config.trace.operations);
        assert!(!config.registry.log_registrations);
    }
}
