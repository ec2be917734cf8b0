//! Kernel uevent message parser.
//!
//! A message is a device-path header terminated by `@`, followed by
//! NUL-separated `KEY=VALUE` records:
//!
//! ```text
//! add@/devices/pci0000:00/0000:00:1f.3\0ACTION=add\0MODALIAS=pci:v00008086d...\0
//! ```
//!
//! Only `ACTION` and `MODALIAS` are extracted. Parsing never fails; missing
//! fields come back as `None`.

use memchr::memchr;

/// Largest module alias accepted, in bytes.
pub const MAX_MODULE_ALIAS_LENGTH: usize = 1023;

/// Action value that triggers a module load.
pub const ACTION_ADD: &str = "add";

const ACTION_KEY: &[u8] = b"ACTION";
const MODALIAS_KEY: &[u8] = b"MODALIAS";

/// Fields extracted from one uevent message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEvent {
    /// Value of the last `ACTION` record.
    pub action: Option<String>,
    /// Value of the last `MODALIAS` record, unless that value was too long.
    pub modalias: Option<String>,
    /// The last `MODALIAS` record exceeded [`MAX_MODULE_ALIAS_LENGTH`].
    pub alias_rejected: bool,
}

impl ParsedEvent {
    /// Alias to hand to the loader: present only for `add` events.
    #[must_use]
    pub fn alias_to_load(&self) -> Option<&str> {
        match (self.action.as_deref(), self.modalias.as_deref()) {
            (Some(ACTION_ADD), Some(alias)) => Some(alias),
            _ => None,
        }
    }

    /// No `@` header was found, or no recognized record followed it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action.is_none() && self.modalias.is_none() && !self.alias_rejected
    }
}

/// Parse one received message. `buffer` is exactly the received bytes.
///
/// Duplicate keys resolve last-write-wins. An oversized `MODALIAS` value is
/// never truncated: it replaces any earlier alias with `None`.
#[must_use]
pub fn parse(buffer: &[u8]) -> ParsedEvent {
    let mut event = ParsedEvent::default();

    let Some(at) = memchr(b'@', buffer) else {
        return event;
    };

    for record in buffer[at + 1..].split(|&byte| byte == 0) {
        let Some(eq) = memchr(b'=', record) else {
            continue;
        };
        let (key, value) = (&record[..eq], &record[eq + 1..]);

        if key == ACTION_KEY {
            event.action = Some(String::from_utf8_lossy(value).into_owned());
        } else if key == MODALIAS_KEY {
            if value.len() > MAX_MODULE_ALIAS_LENGTH {
                event.modalias = None;
                event.alias_rejected = true;
            } else {
                event.modalias = Some(String::from_utf8_lossy(value).into_owned());
                event.alias_rejected = false;
            }
        }
    }

    event
}
