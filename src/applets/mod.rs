//! Single-syscall applets shipped next to the daemon.

pub mod load_module;
pub mod unmount;
