//! Shared helpers for driving the built binaries.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Captured result of one binary invocation.
pub struct CliResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

/// Run `binary` with `args` and `envs`, keeping a per-case log under the
/// cargo target tmp dir for post-mortem inspection.
pub fn run_case(binary: &str, case_name: &str, args: &[&str], envs: &[(&str, &str)]) -> CliResult {
    let output = Command::new(binary)
        .args(args)
        .env_remove("HOTPLUGD_CONFIG")
        .envs(envs.iter().copied())
        .output()
        .expect("binary should start");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let log_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("cli-cases");
    fs::create_dir_all(&log_dir).expect("create log dir");
    let log_path = log_dir.join(format!("{case_name}.log"));
    fs::write(
        &log_path,
        format!(
            "binary: {binary}\nargs: {args:?}\nstatus: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
            output.status
        ),
    )
    .expect("write case log");

    CliResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
