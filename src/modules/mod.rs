//! Kernel module handling: fire-and-forget loading and the cold-plug scan.

pub mod coldplug;
pub mod loader;
