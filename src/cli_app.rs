//! Command-line definitions and dispatch for the three binaries.
//!
//! Usage errors exit with status 1 rather than clap's default 2, so every
//! binary reports plain success/failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::applets::{load_module, unmount};

/// Minimal device hotplug daemon: loads kernel modules for new devices.
///
/// Takes no arguments. Reads `$HOTPLUGD_CONFIG` or /etc/hotplugd.toml when present.
#[derive(Parser, Debug)]
#[command(name = "hotplug-daemon", version, about)]
pub struct DaemonCli {}

/// Unmount the filesystem mounted at a path.
#[derive(Parser, Debug)]
#[command(name = "unmount", version, about)]
pub struct UnmountCli {
    /// Mount point to detach.
    pub path: PathBuf,
}

/// Load a single kernel module image, without its dependencies.
#[derive(Parser, Debug)]
#[command(name = "load-module", version, about)]
pub struct LoadModuleCli {
    /// Path to the `.ko` file.
    pub module_path: PathBuf,
}

/// Parse the process arguments, exiting 1 on a usage error and 0 after
/// printing help or version.
pub fn parse_or_exit<T: Parser>() -> T {
    match T::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = i32::from(err.use_stderr());
            let _ = err.print();
            std::process::exit(code);
        }
    }
}

fn report(program: &str, result: crate::core::errors::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{program}: {err}");
            ExitCode::FAILURE
        }
    }
}

/// `unmount <path>`.
pub fn run_unmount(cli: &UnmountCli) -> ExitCode {
    report("unmount", unmount::unmount(&cli.path))
}

/// `load-module <module-path>`.
pub fn run_load_module(cli: &LoadModuleCli) -> ExitCode {
    report("load-module", load_module::load_module(&cli.module_path))
}

/// `hotplug-daemon`: start, run until `SIGTERM`, shut down.
#[cfg(feature = "daemon")]
pub fn run_daemon(_cli: &DaemonCli) -> ExitCode {
    use crate::core::config::Config;
    use crate::daemon::loop_main::Daemon;

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => return report("hotplug-daemon", Err(err)),
    };
    let mut daemon = match Daemon::start(&config) {
        Ok(daemon) => daemon,
        Err(err) => return report("hotplug-daemon", Err(err)),
    };
    let exit = daemon.run();
    daemon.shutdown();
    ExitCode::from(exit.exit_code())
}

#[cfg(test)]
mod tests {
    use super::{DaemonCli, LoadModuleCli, UnmountCli};
    use clap::Parser;
    use clap::error::ErrorKind;

    #[test]
    fn daemon_rejects_any_argument() {
        assert!(DaemonCli::try_parse_from(["hotplug-daemon"]).is_ok());
        let err = DaemonCli::try_parse_from(["hotplug-daemon", "extra"]).expect_err("rejected");
        assert!(err.use_stderr());
    }

    #[test]
    fn unmount_needs_exactly_one_path() {
        let cli = UnmountCli::try_parse_from(["unmount", "/mnt/usb"]).expect("one path");
        assert_eq!(cli.path.to_str(), Some("/mnt/usb"));

        let err = UnmountCli::try_parse_from(["unmount"]).expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(UnmountCli::try_parse_from(["unmount", "/a", "/b"]).is_err());
    }

    #[test]
    fn load_module_needs_exactly_one_path() {
        assert!(LoadModuleCli::try_parse_from(["load-module", "/lib/modules/x.ko"]).is_ok());
        assert!(LoadModuleCli::try_parse_from(["load-module"]).is_err());
        assert!(LoadModuleCli::try_parse_from(["load-module", "a.ko", "b.ko"]).is_err());
    }

    #[test]
    fn help_is_not_a_usage_error() {
        let err = UnmountCli::try_parse_from(["unmount", "--help"]).expect_err("help");
        assert!(!err.use_stderr());
    }
}
