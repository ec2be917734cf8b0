//! Fire-and-forget module loading through `modprobe`.
//!
//! The child is spawned with its stdio on `/dev/null` and its handle is
//! dropped immediately. Finished children are collected by the event loop
//! on `SIGCHLD` (see `daemon::process::reap_children`); their exit status
//! is never looked at.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::{HotplugError, Result};
use crate::uevent::parser::MAX_MODULE_ALIAS_LENGTH;

/// Printable ASCII without spaces, not starting with `-`.
static ALIAS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[!-,.-~][!-~]*$").expect("alias pattern compiles"));

/// Anything that can start loading the module matching an alias.
pub trait ModuleLoader {
    /// Start loading the module for `alias` and return without waiting.
    /// `false` means nothing was started.
    fn trigger_load(&self, alias: &str) -> bool;
}

/// Whether `alias` can be passed to the module loader as a single operand.
#[must_use]
pub fn is_valid_alias(alias: &str) -> bool {
    alias.len() <= MAX_MODULE_ALIAS_LENGTH && ALIAS_PATTERN.is_match(alias)
}

/// Production loader: runs `<program> <alias>`.
#[derive(Debug, Clone)]
pub struct ModprobeLoader {
    program: PathBuf,
}

impl ModprobeLoader {
    /// Loader running `program`, looked up through `PATH` when bare.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Spawn the loader child. The handle is dropped on return.
    pub fn spawn(&self, alias: &str) -> Result<()> {
        Command::new(&self.program)
            .arg(alias)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|source| HotplugError::Spawn {
                program: self.program.display().to_string(),
                alias: alias.to_string(),
                source,
            })
    }
}

impl ModuleLoader for ModprobeLoader {
    fn trigger_load(&self, alias: &str) -> bool {
        is_valid_alias(alias) && self.spawn(alias).is_ok()
    }
}

/// Test double that remembers every alias it was asked to load.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLoader {
    calls: std::cell::RefCell<Vec<String>>,
    fail: bool,
}

#[cfg(test)]
impl RecordingLoader {
    pub(crate) fn failing() -> Self {
        Self {
            calls: std::cell::RefCell::default(),
            fail: true,
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

#[cfg(test)]
impl ModuleLoader for RecordingLoader {
    fn trigger_load(&self, alias: &str) -> bool {
        self.calls.borrow_mut().push(alias.to_string());
        !self.fail
    }
}

#[cfg(test)]
mod tests {
    use super::{ModprobeLoader, ModuleLoader, is_valid_alias};
    use crate::core::errors::HotplugError;
    use crate::uevent::parser::MAX_MODULE_ALIAS_LENGTH;

    #[test]
    fn real_aliases_are_valid() {
        assert!(is_valid_alias(
            "pci:v00008086d00001C3Asv00001028sd000004A3bc07sc80i00"
        ));
        assert!(is_valid_alias("platform:serial8250"));
        assert!(is_valid_alias("of:NuartT(null)Cns16550a"));
        assert!(is_valid_alias("usb:v046Dp0825d0012dcEFdsc02dp01ic01isc01ip00in00"));
    }

    #[test]
    fn option_like_and_blank_aliases_are_refused() {
        assert!(!is_valid_alias(""));
        assert!(!is_valid_alias("-r"));
        assert!(!is_valid_alias("--remove"));
        assert!(!is_valid_alias("pci:v1 extra"));
        assert!(!is_valid_alias("pci:v1\n"));
        assert!(!is_valid_alias("pci:v1\tx"));
    }

    #[test]
    fn overlong_alias_is_refused() {
        assert!(!is_valid_alias(&"a".repeat(MAX_MODULE_ALIAS_LENGTH + 1)));
        assert!(is_valid_alias(&"a".repeat(MAX_MODULE_ALIAS_LENGTH)));
    }

    #[test]
    fn missing_program_is_a_spawn_failure() {
        let loader = ModprobeLoader::new("/nonexistent/hotplugd-test/modprobe");
        let err = loader.spawn("pci:v1").expect_err("program does not exist");
        assert!(matches!(err, HotplugError::Spawn { .. }));
        assert!(!err.is_fatal());
        assert!(!loader.trigger_load("pci:v1"));
    }

    #[test]
    fn invalid_alias_is_refused_without_spawning() {
        let loader = ModprobeLoader::new("/nonexistent/hotplugd-test/modprobe");
        assert!(!loader.trigger_load("-v"));
    }

    #[test]
    fn spawn_returns_without_waiting() {
        let loader = ModprobeLoader::new("true");
        assert!(loader.trigger_load("platform:serial8250"));
    }
}
