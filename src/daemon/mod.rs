//! Daemon subsystem: main event loop, signal handling, process helpers.

#[cfg(feature = "daemon")]
pub mod loop_main;
pub mod process;
#[cfg(feature = "daemon")]
pub mod signals;
