//! Page-cache control before each timed run
//!
//! File contents must come from disk on every measured run, so the page
//! cache is emptied immediately before each one. Failing to do so is fatal:
//! a run against a warm cache is not a valid sample.

use std::process::{Command, Stdio};

use crate::config::CacheFlushConfig;
use crate::error::BenchError;

/// Windows status for "the requested operation requires elevation"
const ERROR_ELEVATION_REQUIRED: i32 = 740;

/// Anything able to bring the OS page cache into a cold state
pub trait CacheFlush {
    /// Fail early if flushing is known to be impossible
    fn preflight(&mut self) -> Result<(), BenchError> {
        Ok(())
    }

    /// Empty the page cache; blocks until done
    fn clear(&mut self) -> Result<(), BenchError>;
}

/// Flushes the cache by running an external, usually privileged, tool
#[derive(Debug, Clone)]
pub struct CommandFlusher {
    config: CacheFlushConfig,
}

impl CommandFlusher {
    pub fn new(config: CacheFlushConfig) -> Self {
        Self { config }
    }

    pub fn program(&self) -> &str {
        &self.config.program
    }

    fn classify_spawn_error(&self, err: std::io::Error) -> BenchError {
        let tool = self.config.program.clone();
        if err.kind() == std::io::ErrorKind::NotFound {
            BenchError::FlushToolNotFound {
                tool,
                hint: self.config.install_hint.clone(),
            }
        } else if err.raw_os_error() == Some(ERROR_ELEVATION_REQUIRED)
            || err.kind() == std::io::ErrorKind::PermissionDenied
        {
            BenchError::InsufficientPrivilege { tool }
        } else {
            BenchError::Spawn {
                program: tool,
                source: err,
            }
        }
    }
}

impl CacheFlush for CommandFlusher {
    fn preflight(&mut self) -> Result<(), BenchError> {
        if self.config.require_root && !is_elevated() {
            return Err(BenchError::InsufficientPrivilege {
                tool: self.config.program.clone(),
            });
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), BenchError> {
        tracing::debug!(program = %self.config.program, args = ?self.config.args, "flushing page cache");

        let status = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|e| self.classify_spawn_error(e))?;

        if !status.success() {
            tracing::warn!(
                "{} exited with {}; the page cache may not have been emptied",
                self.config.program,
                status
            );
        }
        Ok(())
    }
}

#[cfg(unix)]
fn is_elevated() -> bool {
    nix::unistd::Uid::effective().is_root()
}

// Elevation on Windows is only detectable when spawning the tool
#[cfg(not(unix))]
fn is_elevated() -> bool {
    true
}
