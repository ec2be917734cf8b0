//! `hotplug-daemon` entry point.

use std::process::ExitCode;

use hotplugd::cli_app::{DaemonCli, parse_or_exit, run_daemon};

fn main() -> ExitCode {
    let cli: DaemonCli = parse_or_exit();
    run_daemon(&cli)
}
