use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Target triple for object output. `None` means the host. JIT execution always uses the
    /// host.
    pub target: Option<String>,
    pub opt_level: OptLevel,
    /// Run the Cranelift verifier on every function before it is emitted.
    pub verify: bool,
    /// Function executed by the JIT runner.
    pub entry: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            target: None,
            opt_level: OptLevel::None,
            verify: true,
            entry: "main".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_opt_level(mut self, opt_level: OptLevel) -> Self {
        self.opt_level = opt_level;
        self
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }
}

/// Cranelift's own `opt_level` setting. Lowering itself never optimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptLevel {
    #[default]
    None,
    Speed,
    SpeedAndSize,
}

impl OptLevel {
    pub fn as_setting(self) -> &'static str {
        match self {
            OptLevel::None => "none",
            OptLevel::Speed => "speed",
            OptLevel::SpeedAndSize => "speed_and_size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Cranelift IR text.
    Clif,
    /// Relocatable object file for the configured target.
    Object,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.target, None);
        assert_eq!(config.opt_level, OptLevel::None);
        assert!(config.verify);
        assert_eq!(config.entry, "main");
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: BackendConfig =
            serde_json::from_str(r#"{ "opt_level": "speed_and_size", "entry": "start" }"#)
                .unwrap();

        assert_eq!(
            config,
            BackendConfig::default()
                .with_opt_level(OptLevel::SpeedAndSize)
                .with_entry("start")
        );
    }

    #[test]
    fn test_opt_level_settings() {
        assert_eq!(OptLevel::None.as_setting(), "none");
        assert_eq!(OptLevel::Speed.as_setting(), "speed");
        assert_eq!(OptLevel::SpeedAndSize.as_setting(), "speed_and_size");
    }
}
