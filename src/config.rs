//! Configuration file for `iterbench run`
//!
//! Every field has a default, so an empty or partial TOML file is valid.
//!
//! # Example
//! ```
//! use iterbench::config::BenchConfig;
//!
//! let config: BenchConfig = toml::from_str(
//!     r#"
//!     [cache_flush]
//!     program = "true"
//!     args = []
//!     require_root = false
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.cache_flush.program, "true");
//! assert!(!config.executable.candidates.is_empty());
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BenchError;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub executable: ExecutableConfig,
    pub cache_flush: CacheFlushConfig,
}

/// Where to look for the file iterator when `--exe` is not given
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutableConfig {
    /// Probed in order; the first existing file is used
    #[serde(default = "default_candidates")]
    pub candidates: Vec<PathBuf>,
}

/// External command that empties the OS page cache
///
/// Omitted fields come from the platform default only while `program` is
/// the default one. Naming another program starts from no arguments, no
/// root requirement and a generic hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PartialCacheFlushConfig")]
pub struct CacheFlushConfig {
    pub program: String,
    pub args: Vec<String>,

    /// Check for an elevated effective user before the first run
    pub require_root: bool,

    /// Remediation shown when `program` is missing
    pub install_hint: String,
}

/// `[cache_flush]` as written in the file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialCacheFlushConfig {
    program: Option<String>,
    args: Option<Vec<String>>,
    require_root: Option<bool>,
    install_hint: Option<String>,
}

impl From<PartialCacheFlushConfig> for CacheFlushConfig {
    fn from(partial: PartialCacheFlushConfig) -> Self {
        let platform = CacheFlushConfig::default();
        let base = match partial.program {
            Some(program) if program != platform.program => CacheFlushConfig {
                install_hint: format!(
                    "check that {program} is installed and on PATH, or set cache_flush.program"
                ),
                program,
                args: Vec::new(),
                require_root: false,
            },
            _ => platform,
        };

        CacheFlushConfig {
            args: partial.args.unwrap_or(base.args),
            require_root: partial.require_root.unwrap_or(base.require_root),
            install_hint: partial.install_hint.unwrap_or(base.install_hint),
            program: base.program,
        }
    }
}

fn default_candidates() -> Vec<PathBuf> {
    [
        "FileIterator.exe",
        "x64/Release/FileIterator.exe",
        "FileIterator",
        "build/FileIterator",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

impl Default for ExecutableConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
        }
    }
}

impl Default for CacheFlushConfig {
    #[cfg(windows)]
    fn default() -> Self {
        Self {
            program: "rammap".to_string(),
            args: vec!["-Et".to_string()],
            require_root: false,
            install_hint: "please download it from \
                           https://docs.microsoft.com/en-us/sysinternals/downloads/rammap"
                .to_string(),
        }
    }

    #[cfg(target_os = "macos")]
    fn default() -> Self {
        Self {
            program: "purge".to_string(),
            args: Vec::new(),
            require_root: true,
            install_hint: "it ships with the Xcode command line tools".to_string(),
        }
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "sync && echo 3 > /proc/sys/vm/drop_caches".to_string(),
            ],
            require_root: true,
            install_hint: "a POSIX shell is required to write /proc/sys/vm/drop_caches"
                .to_string(),
        }
    }
}

impl BenchConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: BenchConfig = toml::from_str(&text)
            .map_err(|e| BenchError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.cache_flush.program.trim().is_empty() {
            return Err(BenchError::InvalidConfig(
                "cache_flush.program must not be empty".to_string(),
            ));
        }

        if self.executable.candidates.is_empty() {
            return Err(BenchError::InvalidConfig(
                "executable.candidates must list at least one path".to_string(),
            ));
        }

        Ok(())
    }
}
