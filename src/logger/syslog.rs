//! syslog sink: RFC 3164 datagrams to the local system logger socket.
//!
//! Like `syslog(3)`, every write retries the connection when the logger
//! socket is missing or a send fails, so records reach syslogd once it
//! comes up. Until then they go to stderr. Writes never report failure,
//! so the sink stays registered for the whole run.

use std::io::{self, Write};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::{LogRecord, LogSink};

const FACILITY: i32 = libc::LOG_USER;

enum Target {
    Socket(UnixDatagram),
    Stderr,
}

/// Sink writing to `/dev/log` (or a configured socket).
pub struct SyslogSink {
    socket_path: PathBuf,
    target: Target,
}

impl SyslogSink {
    /// Connect immediately, like `openlog(LOG_NDELAY)`. A missing socket is
    /// retried on the next write.
    #[must_use]
    pub fn open(socket_path: &Path) -> Self {
        let target = connect(socket_path).map_or(Target::Stderr, Target::Socket);
        Self {
            socket_path: socket_path.to_path_buf(),
            target,
        }
    }

    /// Whether records go to the system logger rather than stderr.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self.target, Target::Socket(_))
    }
}

fn connect(path: &Path) -> io::Result<UnixDatagram> {
    let socket = UnixDatagram::unbound()?;
    socket.connect(path)?;
    Ok(socket)
}

/// `<PRI>Mmm dd hh:mm:ss ident[pid]: message`
#[must_use]
pub fn format_datagram(record: &LogRecord) -> String {
    let priority = FACILITY | record.level.severity();
    let stamp = record.timestamp.with_timezone(&Local).format("%b %e %H:%M:%S");
    format!(
        "<{priority}>{stamp} {}[{}]: {}",
        record.identity, record.pid, record.message
    )
}

impl LogSink for SyslogSink {
    fn name(&self) -> &'static str {
        "syslog"
    }

    fn write(&mut self, record: &LogRecord) -> io::Result<()> {
        let datagram = format_datagram(record);
        if let Target::Socket(socket) = &self.target {
            if socket.send(datagram.as_bytes()).is_ok() {
                return Ok(());
            }
        }

        let resent = connect(&self.socket_path).and_then(|socket| {
            socket.send(datagram.as_bytes())?;
            Ok(socket)
        });
        match resent {
            Ok(socket) => self.target = Target::Socket(socket),
            Err(_) => {
                self.target = Target::Stderr;
                let _ = writeln!(
                    io::stderr().lock(),
                    "{}[{}]: {}",
                    record.identity,
                    record.pid,
                    record.message
                );
            }
        }
        Ok(())
    }
}
