//! `unmount <path>`: one `umount(2)` call.

use std::path::Path;

use nix::mount::umount;

use crate::core::errors::{HotplugError, Result};

/// Unmount the filesystem mounted at `target`.
pub fn unmount(target: &Path) -> Result<()> {
    umount(target).map_err(|source| HotplugError::Syscall {
        call: "umount",
        path: target.to_path_buf(),
        source,
    })
}
