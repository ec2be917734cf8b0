//! `load-module <module-path>`: insert one module image with
//! `init_module(2)`. Dependencies are not resolved; the image is loaded with
//! empty parameters.

use std::path::Path;

use nix::kmod::init_module;

use crate::core::errors::{HotplugError, Result};

/// Read the module image at `path` and hand it to the kernel.
pub fn load_module(path: &Path) -> Result<()> {
    let image = std::fs::read(path).map_err(|source| HotplugError::io(path, source))?;
    init_module(&image, c"").map_err(|source| HotplugError::Syscall {
        call: "init_module",
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::load_module;
    use crate::core::errors::HotplugError;

    #[test]
    fn missing_image_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_module(&dir.path().join("absent.ko")).expect_err("no such file");
        assert!(matches!(err, HotplugError::Io { .. }));
    }
}
