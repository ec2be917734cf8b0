//! Process-level helpers: detaching from the terminal and collecting
//! finished loader children.

use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{Pid, daemon};

use crate::core::errors::{HotplugError, Result};

/// Detach from the controlling terminal: fork, new session, `chdir("/")`,
/// stdio on `/dev/null`.
pub fn daemonize() -> Result<()> {
    daemon(false, false).map_err(|source| HotplugError::Daemonize { source })
}

/// Collect every child that has already exited, without blocking and
/// without looking at how it exited. Returns the number collected.
pub fn reap_children() -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return reaped,
            Ok(_) => reaped += 1,
            Err(Errno::EINTR) => {}
            Err(_) => return reaped,
        }
    }
}
