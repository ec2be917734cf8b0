//! Kernel uevents: the netlink source and the message parser.

pub mod netlink;
pub mod parser;

use crate::core::errors::Result;
use crate::modules::loader::ModuleLoader;

pub use parser::{ParsedEvent, parse};

/// Something the event loop can drain one message from.
pub trait EventSource {
    /// Non-blocking read of one message. `Ok(None)` means nothing was
    /// waiting; any error is fatal to the loop.
    fn receive(&mut self) -> Result<Option<&[u8]>>;
}

/// What handling one message amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Not an `add` event with an alias, or no `@` header at all.
    Ignored,
    /// The alias exceeded the length bound and was dropped.
    AliasRejected,
    /// The loader accepted the alias.
    Triggered(String),
    /// The loader could not be started for the alias.
    LoadFailed(String),
}

impl HandleOutcome {
    /// Only a load that was due and could not be started counts as failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::LoadFailed(_))
    }
}

/// Parse one message and load the module for an `add` event.
pub fn handle_event(message: &[u8], loader: &dyn ModuleLoader) -> HandleOutcome {
    let event = parse(message);
    match event.alias_to_load() {
        Some(alias) if loader.trigger_load(alias) => HandleOutcome::Triggered(alias.to_string()),
        Some(alias) => HandleOutcome::LoadFailed(alias.to_string()),
        None if event.alias_rejected => HandleOutcome::AliasRejected,
        None => HandleOutcome::Ignored,
    }
}
