//! Startup scan for devices that were present before the daemon attached.
//!
//! Walks the sysfs tree (symlinks not followed, entries sorted by name) and
//! hands the content of every regular file named `modalias` to the loader.
//! Under [`ColdplugPolicy::AbortScan`] the first `modalias` file that cannot
//! be opened or read ends the scan with [`HotplugError::ColdplugAborted`];
//! entries after it are never visited.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use walkdir::WalkDir;

use crate::core::config::ColdplugPolicy;
use crate::core::errors::{HotplugError, Result};
use crate::modules::loader::ModuleLoader;
use crate::uevent::parser::MAX_MODULE_ALIAS_LENGTH;

/// Name of the per-device alias file.
pub const MODULE_ALIAS_FILE_NAME: &str = "modalias";

/// Outcome of a completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColdplugReport {
    /// `modalias` files read successfully.
    pub visited: usize,
    /// Loads the loader accepted.
    pub triggered: usize,
    /// Entries dropped: unreadable (skip policy) or longer than the alias bound.
    pub skipped: usize,
}

enum AliasFile {
    Alias(String),
    Oversized,
}

/// Walk `root` and trigger a load for every `modalias` file found.
pub fn scan(
    root: &Path,
    loader: &dyn ModuleLoader,
    policy: ColdplugPolicy,
) -> Result<ColdplugReport> {
    let mut report = ColdplugReport::default();

    let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    for entry in walker {
        // Unreadable directories only hide their own subtree.
        let Ok(entry) = entry else {
            continue;
        };
        if entry.file_name() != MODULE_ALIAS_FILE_NAME || !entry.file_type().is_file() {
            continue;
        }

        let alias = match read_alias_file(entry.path()) {
            Ok(AliasFile::Alias(alias)) => alias,
            Ok(AliasFile::Oversized) => {
                report.skipped += 1;
                continue;
            }
            Err(source) => match policy {
                ColdplugPolicy::AbortScan => {
                    return Err(HotplugError::ColdplugAborted {
                        path: entry.path().to_path_buf(),
                        source,
                    });
                }
                ColdplugPolicy::SkipEntry => {
                    report.skipped += 1;
                    continue;
                }
            },
        };

        report.visited += 1;
        if loader.trigger_load(&alias) {
            report.triggered += 1;
        }
    }

    Ok(report)
}

/// Read one alias file. An empty file is a read failure, content longer
/// than the alias bound is rejected rather than truncated.
fn read_alias_file(path: &Path) -> io::Result<AliasFile> {
    let file = File::open(path)?;
    let mut content = Vec::with_capacity(128);
    file.take(MAX_MODULE_ALIAS_LENGTH as u64 + 1)
        .read_to_end(&mut content)?;

    if content.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "empty modalias file",
        ));
    }
    if content.last() == Some(&b'\n') {
        content.pop();
    }
    if content.len() > MAX_MODULE_ALIAS_LENGTH {
        return Ok(AliasFile::Oversized);
    }
    Ok(AliasFile::Alias(String::from_utf8_lossy(&content).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::{ColdplugReport, scan};
    use crate::core::config::ColdplugPolicy;
    use crate::core::errors::HotplugError;
    use crate::modules::loader::RecordingLoader;
    use crate::uevent::parser::MAX_MODULE_ALIAS_LENGTH;
    use std::fs;
    use std::path::Path;

    fn device(root: &Path, rel: &str, alias: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).expect("create device dir");
        fs::write(dir.join("modalias"), format!("{alias}\n")).expect("write modalias");
    }

    #[test]
    fn every_readable_entry_is_loaded_in_walk_order() {
        let root = tempfile::tempdir().expect("tempdir");
        device(root.path(), "devices/a", "pci:v0001");
        device(root.path(), "devices/b/child", "usb:v0002");
        device(root.path(), "devices/c", "platform:serial8250");
        fs::write(root.path().join("devices/a/uevent"), "DRIVER=x\n").expect("write");

        let loader = RecordingLoader::default();
        let report = scan(root.path(), &loader, ColdplugPolicy::AbortScan).expect("scan");

        assert_eq!(
            loader.calls(),
            vec!["pci:v0001", "usb:v0002", "platform:serial8250"]
        );
        assert_eq!(
            report,
            ColdplugReport {
                visited: 3,
                triggered: 3,
                skipped: 0
            }
        );
    }

    #[test]
    fn loader_failures_do_not_stop_the_scan() {
        let root = tempfile::tempdir().expect("tempdir");
        device(root.path(), "a", "x:1");
        device(root.path(), "b", "x:2");

        let loader = RecordingLoader::failing();
        let report = scan(root.path(), &loader, ColdplugPolicy::AbortScan).expect("scan");
        assert_eq!(loader.calls().len(), 2);
        assert_eq!(report.visited, 2);
        assert_eq!(report.triggered, 0);
    }

    #[test]
    fn similarly_named_files_and_directories_are_ignored() {
        let root = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(root.path().join("dev/modalias")).expect("dir named modalias");
        fs::write(root.path().join("dev/modalias.bak"), "x:1\n").expect("write");
        fs::write(root.path().join("dev/xmodalias"), "x:2\n").expect("write");

        let loader = RecordingLoader::default();
        let report = scan(root.path(), &loader, ColdplugPolicy::AbortScan).expect("scan");
        assert!(loader.calls().is_empty());
        assert_eq!(report, ColdplugReport::default());
    }

    #[test]
    fn first_unreadable_entry_aborts_the_scan() {
        let root = tempfile::tempdir().expect("tempdir");
        device(root.path(), "a", "x:1");
        fs::create_dir_all(root.path().join("b")).expect("dir");
        fs::write(root.path().join("b/modalias"), "").expect("empty modalias");
        device(root.path(), "c", "x:3");

        let loader = RecordingLoader::default();
        let err = scan(root.path(), &loader, ColdplugPolicy::AbortScan).expect_err("aborts");

        assert!(
            matches!(&err, HotplugError::ColdplugAborted { path, .. } if path.ends_with("b/modalias"))
        );
        assert_eq!(loader.calls(), vec!["x:1"]);
    }

    #[test]
    fn skip_policy_continues_past_unreadable_entries() {
        let root = tempfile::tempdir().expect("tempdir");
        device(root.path(), "a", "x:1");
        fs::create_dir_all(root.path().join("b")).expect("dir");
        fs::write(root.path().join("b/modalias"), "").expect("empty modalias");
        device(root.path(), "c", "x:3");

        let loader = RecordingLoader::default();
        let report = scan(root.path(), &loader, ColdplugPolicy::SkipEntry).expect("scan");
        assert_eq!(loader.calls(), vec!["x:1", "x:3"]);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn oversized_alias_is_skipped_not_truncated() {
        let root = tempfile::tempdir().expect("tempdir");
        device(root.path(), "a", &"a".repeat(MAX_MODULE_ALIAS_LENGTH + 1));
        device(root.path(), "b", "x:2");

        let loader = RecordingLoader::default();
        let report = scan(root.path(), &loader, ColdplugPolicy::AbortScan).expect("scan");
        assert_eq!(loader.calls(), vec!["x:2"]);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn alias_without_trailing_newline_is_kept_whole() {
        let root = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(root.path().join("a")).expect("dir");
        fs::write(root.path().join("a/modalias"), "of:Nfoo").expect("write");

        let loader = RecordingLoader::default();
        scan(root.path(), &loader, ColdplugPolicy::AbortScan).expect("scan");
        assert_eq!(loader.calls(), vec!["of:Nfoo"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let root = tempfile::tempdir().expect("tempdir");
        device(root.path(), "devices/a", "x:1");
        std::os::unix::fs::symlink(root.path().join("devices"), root.path().join("bus"))
            .expect("symlink");

        let loader = RecordingLoader::default();
        scan(root.path(), &loader, ColdplugPolicy::AbortScan).expect("scan");
        assert_eq!(loader.calls(), vec!["x:1"]);
    }

    #[test]
    fn missing_root_is_an_empty_scan() {
        let root = tempfile::tempdir().expect("tempdir");
        let loader = RecordingLoader::default();
        let report = scan(&root.path().join("absent"), &loader, ColdplugPolicy::AbortScan)
            .expect("scan");
        assert_eq!(report, ColdplugReport::default());
    }
}
