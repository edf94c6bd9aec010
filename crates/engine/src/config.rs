use std::path::PathBuf;

/// Default model identifier.
pub const DEFAULT_MODEL_NAME: &str = "alnnahwi/gemma-3-1b-arabic-gec-v1";

/// Default location of the local model snapshot.
pub const DEFAULT_MODEL_DIR: &str = "models/gemma-3-1b-arabic-gec-v1";

/// Default generation budget, independent of input length.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 100;

const DEFAULT_SEED: u64 = 299_792_458;

/// A malformed engine environment variable.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model identifier, reported by health checks and logs.
    pub model_name: String,
    /// Directory holding `config.json`, `tokenizer.json` and the
    /// safetensors weights.
    pub model_dir: PathBuf,
    /// Upper bound on generated tokens per attempt.
    pub max_new_tokens: usize,
    /// Skip accelerators entirely.
    pub force_cpu: bool,
    /// Seed for the logits processor (unused by greedy decoding but kept
    /// so sampling can be switched on without a config change).
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            force_cpu: false,
            seed: DEFAULT_SEED,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var          | Default                              |
    /// |------------------|--------------------------------------|
    /// | `MODEL_NAME`     | `alnnahwi/gemma-3-1b-arabic-gec-v1`  |
    /// | `MODEL_DIR`      | `models/gemma-3-1b-arabic-gec-v1`    |
    /// | `MAX_NEW_TOKENS` | `100`                                |
    /// | `FORCE_CPU`      | `false`                              |
    /// | `SEED`           | `299792458`                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let model_name = std::env::var("MODEL_NAME").unwrap_or(defaults.model_name);
        let model_dir = std::env::var("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        let max_new_tokens = match std::env::var("MAX_NEW_TOKENS") {
            Ok(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError {
                        var: "MAX_NEW_TOKENS",
                        expected: "a positive integer",
                        value,
                    })
                }
            },
            Err(_) => defaults.max_new_tokens,
        };

        let force_cpu = match std::env::var("FORCE_CPU") {
            Ok(value) => parse_bool(&value).ok_or(ConfigError {
                var: "FORCE_CPU",
                expected: "a boolean",
                value,
            })?,
            Err(_) => defaults.force_cpu,
        };

        let seed = match std::env::var("SEED") {
            Ok(value) => value.parse().map_err(|_| ConfigError {
                var: "SEED",
                expected: "a u64",
                value,
            })?,
            Err(_) => defaults.seed,
        };

        Ok(Self {
            model_name,
            model_dir,
            max_new_tokens,
            force_cpu,
            seed,
        })
    }
}

/// Parse the usual spellings of a boolean flag.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
