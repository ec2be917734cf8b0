//! `load-module <module-path>` entry point.

use std::process::ExitCode;

use hotplugd::cli_app::{LoadModuleCli, parse_or_exit, run_load_module};

fn main() -> ExitCode {
    let cli: LoadModuleCli = parse_or_exit();
    run_load_module(&cli)
}
