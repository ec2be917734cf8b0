//! Daemon context and the main event loop.
//!
//! Lifecycle: [`Daemon::start`] → [`Daemon::run`] → [`Daemon::shutdown`].
//! The loop handles one wakeup per iteration and never processes more than
//! one uevent per readiness wakeup.

use crate::core::config::Config;
use crate::core::errors::{HotplugError, Result};
use crate::daemon::process;
use crate::daemon::signals::{SignalSet, Waiter, Wakeup};
use crate::logger::DualLogger;
use crate::modules::coldplug;
use crate::modules::loader::{ModprobeLoader, ModuleLoader};
use crate::uevent::netlink::NetlinkSource;
use crate::uevent::{EventSource, HandleOutcome, handle_event};

/// Lifecycle lines written to the system log.
pub const MSG_STARTED: &str = "hotplugd has started";
/// Logged once start-up is complete and the loop begins.
pub const MSG_WAITING: &str = "waiting for uevents";
/// Final line logged before the logger closes.
pub const MSG_SHUTTING_DOWN: &str = "shutting down";

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// `SIGTERM` was received.
    Terminated,
    /// The wait or a receive failed.
    Failed,
}

impl LoopExit {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Terminated => 0,
            Self::Failed => 1,
        }
    }
}

/// Drive `source` until termination or a fatal error.
///
/// `reap` is called on every child-exit wakeup and returns how many
/// children it collected.
pub fn run_event_loop<S, W>(
    source: &mut S,
    waiter: &mut W,
    loader: &dyn ModuleLoader,
    logger: &mut DualLogger,
    reap: fn() -> usize,
) -> LoopExit
where
    S: EventSource,
    W: Waiter<S>,
{
    loop {
        let wakeup = match waiter.wait(source) {
            Ok(wakeup) => wakeup,
            Err(err) => match report_failure(logger, &err) {
                Some(exit) => return exit,
                None => continue,
            },
        };

        match wakeup {
            Wakeup::Terminate => return LoopExit::Terminated,
            Wakeup::ChildExited => {
                let reaped = reap();
                if reaped > 0 {
                    logger.debug(format!("collected {reaped} finished loader process(es)"));
                }
            }
            Wakeup::Readable => match source.receive() {
                Ok(Some(message)) if !message.is_empty() => {
                    match handle_event(message, loader) {
                        HandleOutcome::Ignored => {}
                        HandleOutcome::AliasRejected => {
                            logger.debug("ignoring module alias longer than the length bound");
                        }
                        HandleOutcome::Triggered(alias) => {
                            logger.debug(format!("loading module for {alias}"));
                        }
                        HandleOutcome::LoadFailed(alias) => {
                            logger.debug(format!("could not start module loader for {alias}"));
                        }
                    }
                }
                // Spurious wakeup or empty datagram.
                Ok(_) => {}
                Err(err) => {
                    if let Some(exit) = report_failure(logger, &err) {
                        return exit;
                    }
                }
            },
        }
    }
}

/// Log `err` and decide whether the loop stops. Transient failures are
/// logged and the loop keeps waiting.
fn report_failure(logger: &mut DualLogger, err: &HotplugError) -> Option<LoopExit> {
    logger.error(err.to_string());
    err.is_fatal().then_some(LoopExit::Failed)
}

/// Everything the running daemon owns.
pub struct Daemon {
    source: NetlinkSource,
    signals: SignalSet,
    loader: ModprobeLoader,
    logger: DualLogger,
}

impl Daemon {
    /// Bring the daemon up: signal handling, uevent socket, daemonization,
    /// logging, cold-plug scan.
    ///
    /// Failures before daemonizing return without logging. Failures after
    /// it log the error and the shutdown line first.
    pub fn start(config: &Config) -> Result<Self> {
        let signals = SignalSet::install()?;
        let source = NetlinkSource::open()?;
        if config.daemonize {
            process::daemonize()?;
        }

        let mut daemon = Self {
            source,
            signals,
            loader: ModprobeLoader::new(&config.paths.modprobe),
            logger: DualLogger::open(&config.logging),
        };
        daemon.logger.info(MSG_STARTED);

        if config.coldplug.enabled {
            match coldplug::scan(
                &config.paths.sysfs_root,
                &daemon.loader,
                config.coldplug.on_entry_error,
            ) {
                Ok(report) => daemon.logger.debug(format!(
                    "cold-plug scan visited {} device(s), started {} load(s), skipped {}",
                    report.visited, report.triggered, report.skipped
                )),
                Err(err) => {
                    daemon.logger.error(err.to_string());
                    daemon.shutdown();
                    return Err(err);
                }
            }
        }

        daemon.logger.info(MSG_WAITING);
        Ok(daemon)
    }

    /// Run until `SIGTERM` or a fatal error.
    pub fn run(&mut self) -> LoopExit {
        run_event_loop(
            &mut self.source,
            &mut self.signals,
            &self.loader,
            &mut self.logger,
            process::reap_children,
        )
    }

    /// Log the final line and release the logger, socket and signal handlers.
    pub fn shutdown(mut self) {
        close_log(&mut self.logger);
    }
}

fn close_log(logger: &mut DualLogger) {
    logger.info(MSG_SHUTTING_DOWN);
    logger.close();
}
