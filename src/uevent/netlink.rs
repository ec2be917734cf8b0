//! Kernel uevent socket: `NETLINK_KOBJECT_UEVENT`, all multicast groups,
//! non-blocking.

use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};

use nix::errno::Errno;
use nix::sys::socket::{
    AddressFamily, MsgFlags, NetlinkAddr, SockFlag, SockProtocol, SockType, bind, recv, socket,
};
use nix::unistd::getpid;

use crate::core::errors::{HotplugError, Result};
use crate::uevent::EventSource;

/// Receive buffer size; one byte is held back so a message never fills it.
pub const RECEIVE_BUFFER_SIZE: usize = 8192;

/// Subscribe to every uevent multicast group.
const ALL_GROUPS: u32 = u32::MAX;

/// The daemon's single kernel-event socket.
#[derive(Debug)]
pub struct NetlinkSource {
    fd: OwnedFd,
    buffer: Box<[u8; RECEIVE_BUFFER_SIZE]>,
}

impl NetlinkSource {
    /// Create and bind the uevent socket.
    pub fn open() -> Result<Self> {
        let fd = socket(
            AddressFamily::Netlink,
            SockType::Datagram,
            SockFlag::SOCK_NONBLOCK | SockFlag::SOCK_CLOEXEC,
            SockProtocol::NetlinkKObjectUEvent,
        )
        .map_err(|source| HotplugError::Socket {
            stage: "socket",
            source,
        })?;

        let pid = u32::try_from(getpid().as_raw()).unwrap_or(0);
        let address = NetlinkAddr::new(pid, ALL_GROUPS);
        bind(fd.as_raw_fd(), &address).map_err(|source| HotplugError::Socket {
            stage: "bind",
            source,
        })?;

        Ok(Self {
            fd,
            buffer: Box::new([0; RECEIVE_BUFFER_SIZE]),
        })
    }
}

impl EventSource for NetlinkSource {
    fn receive(&mut self) -> Result<Option<&[u8]>> {
        let capacity = RECEIVE_BUFFER_SIZE - 1;
        loop {
            match recv(
                self.fd.as_raw_fd(),
                &mut self.buffer[..capacity],
                MsgFlags::empty(),
            ) {
                Ok(len) => return Ok(Some(&self.buffer[..len])),
                Err(Errno::EINTR) => {}
                Err(Errno::EAGAIN) => return Ok(None),
                Err(source) => return Err(HotplugError::Receive { source }),
            }
        }
    }
}

impl AsFd for NetlinkSource {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}
