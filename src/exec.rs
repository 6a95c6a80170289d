use crate::errors::*;
use std::ffi::OsString;
use std::fs::File;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

pub const SHELL: &str = "bash";

/// Render a command line for logs.
pub fn display(program: &Path, args: &[OsString]) -> String {
    let words = std::iter::once(program.to_string_lossy().into_owned())
        .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>();
    shellwords::join(&words.iter().map(String::as_str).collect::<Vec<_>>())
}

/// Everything the pipeline needs from the operating system. Only one child
/// is ever running at a time and every call blocks until it exited.
pub trait Runner {
    /// Run with stdout and stderr attached to our terminal.
    fn run(&mut self, program: &Path, args: &[OsString]) -> Result<ExitStatus>;

    /// Run with stdout redirected into `output` (created or truncated).
    fn run_to_file(&mut self, program: &Path, args: &[OsString], output: &Path) -> Result<()>;

    /// Run a compound command line, pipes included, through the shell.
    fn run_shell(&mut self, cmdline: &str) -> Result<()>;
}

fn check(program: &Path, status: ExitStatus) -> Result<ExitStatus> {
    if status.success() {
        Ok(status)
    } else {
        bail!("Command {:?} failed: {}", program, status)
    }
}

#[derive(Debug, Default)]
pub struct System;

impl Runner for System {
    fn run(&mut self, program: &Path, args: &[OsString]) -> Result<ExitStatus> {
        debug!("Executing: {}", display(program, args));
        let status = Command::new(program)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to spawn {:?}", program))?;
        check(program, status)
    }

    fn run_to_file(&mut self, program: &Path, args: &[OsString], output: &Path) -> Result<()> {
        debug!("Executing: {} > {:?}", display(program, args), output);
        let file = File::create(output)
            .with_context(|| format!("Failed to create output file {:?}", output))?;
        let status = Command::new(program)
            .args(args)
            .stdout(Stdio::from(file))
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to spawn {:?}", program))?;
        check(program, status)?;
        Ok(())
    }

    fn run_shell(&mut self, cmdline: &str) -> Result<()> {
        debug!("Executing with {}: {}", SHELL, cmdline);
        let status = Command::new(SHELL)
            .arg("-c")
            .arg(cmdline)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to spawn {}", SHELL))?;
        check(Path::new(SHELL), status).context("Shell pipeline failed")?;
        Ok(())
    }
}
