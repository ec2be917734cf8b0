//! `unmount <path>` entry point.

use std::process::ExitCode;

use hotplugd::cli_app::{UnmountCli, parse_or_exit, run_unmount};

fn main() -> ExitCode {
    let cli: UnmountCli = parse_or_exit();
    run_unmount(&cli)
}
