//! The daemon's fixed wakeup set: uevent socket readiness, `SIGCHLD` and
//! `SIGTERM`.
//!
//! Signals are turned into readable self-pipes through `signal-hook`, so
//! the control thread consumes them synchronously from a single `poll(2)`
//! alongside the uevent socket. No work happens inside a signal handler.

use std::io::{ErrorKind, Read};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::net::UnixStream;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use signal_hook::SigId;
use signal_hook::consts::{SIGCHLD, SIGTERM};
use signal_hook::low_level::{pipe, unregister};

use crate::core::errors::{HotplugError, Result};

/// One consumed wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// `SIGTERM` arrived.
    Terminate,
    /// At least one child exited.
    ChildExited,
    /// The event source has something to read.
    Readable,
}

/// Blocks until the next wakeup for `source`.
pub trait Waiter<S> {
    /// Block until a signal arrives or `source` becomes readable.
    fn wait(&mut self, source: &S) -> Result<Wakeup>;
}

/// Pick the wakeup to deliver when several are pending: termination first,
/// then child exit, then readiness.
#[must_use]
pub const fn select_wakeup(terminate: bool, child: bool, readable: bool) -> Option<Wakeup> {
    if terminate {
        Some(Wakeup::Terminate)
    } else if child {
        Some(Wakeup::ChildExited)
    } else if readable {
        Some(Wakeup::Readable)
    } else {
        None
    }
}

/// Self-pipe for one signal. The write end belongs to the signal handler.
struct SignalPipe {
    read: UnixStream,
    id: SigId,
}

impl SignalPipe {
    fn register(signal: i32, name: &'static str) -> Result<Self> {
        let setup = |source| HotplugError::SignalSetup {
            signal: name,
            source,
        };
        let (read, write) = UnixStream::pair().map_err(setup)?;
        read.set_nonblocking(true).map_err(setup)?;
        write.set_nonblocking(true).map_err(setup)?;
        let id = pipe::register(signal, write).map_err(setup)?;
        Ok(Self { read, id })
    }

    /// Consume every pending notification.
    fn drain(&self) {
        let mut buf = [0_u8; 64];
        loop {
            match (&self.read).read(&mut buf) {
                Ok(0) => return,
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(_) => return,
            }
        }
    }

    fn fd(&self) -> BorrowedFd<'_> {
        self.read.as_fd()
    }
}

/// Installed signal handling, torn down on drop.
pub struct SignalSet {
    terminate: SignalPipe,
    child: SignalPipe,
}

impl SignalSet {
    /// Register the child-exit and termination handlers.
    pub fn install() -> Result<Self> {
        let child = SignalPipe::register(SIGCHLD, "SIGCHLD")?;
        let terminate = SignalPipe::register(SIGTERM, "SIGTERM")?;
        Ok(Self { terminate, child })
    }
}

fn is_ready(fd: &PollFd<'_>) -> bool {
    let wanted = PollFlags::POLLIN | PollFlags::POLLERR | PollFlags::POLLHUP;
    fd.revents().is_some_and(|revents| revents.intersects(wanted))
}

impl<S: AsFd> Waiter<S> for SignalSet {
    fn wait(&mut self, source: &S) -> Result<Wakeup> {
        loop {
            let mut fds = [
                PollFd::new(self.terminate.fd(), PollFlags::POLLIN),
                PollFd::new(self.child.fd(), PollFlags::POLLIN),
                PollFd::new(source.as_fd(), PollFlags::POLLIN),
            ];
            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) | Err(Errno::EINTR) => {}
                Err(source) => return Err(HotplugError::Wait { source }),
            }

            let wakeup = select_wakeup(is_ready(&fds[0]), is_ready(&fds[1]), is_ready(&fds[2]));
            match wakeup {
                Some(Wakeup::Terminate) => self.terminate.drain(),
                Some(Wakeup::ChildExited) => self.child.drain(),
                Some(Wakeup::Readable) | None => {}
            }
            if let Some(wakeup) = wakeup {
                return Ok(wakeup);
            }
        }
    }
}

impl Drop for SignalSet {
    fn drop(&mut self) {
        unregister(self.terminate.id);
        unregister(self.child.id);
    }
}
