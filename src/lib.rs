//! hotplugd: minimal device hotplug daemon for embedded Linux.
//!
//! Listens for kernel uevents on a netlink socket and starts `modprobe` for
//! the module alias of every added device, after a one-time cold-plug scan
//! of sysfs for devices that were already present.

pub mod applets;
#[cfg(feature = "cli")]
pub mod cli_app;
pub mod core;
pub mod daemon;
pub mod logger;
pub mod modules;
pub mod uevent;
