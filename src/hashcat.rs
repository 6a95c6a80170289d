use crate::errors::*;
use crate::exec::Runner;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Seconds between hashcat status reports
pub const STATUS_TIMER: u32 = 30;

/// Invocations of the cracking binary for one hashlist and hash mode.
///
/// hashcat exits non-zero for outcomes we consider fine (exhausted wordlist,
/// all hashes already in the potfile, ...), so every invocation through this
/// type discards the error after logging it.
#[derive(Debug, Clone)]
pub struct Hashcat {
    bin: PathBuf,
    mode: String,
    hashlist: PathBuf,
}

impl Hashcat {
    pub fn new(bin: PathBuf, mode: String, hashlist: PathBuf) -> Hashcat {
        Hashcat {
            bin,
            mode,
            hashlist,
        }
    }

    fn status_args(args: &mut Vec<OsString>) {
        args.push("--status".into());
        args.push("--status-timer".into());
        args.push(STATUS_TIMER.to_string().into());
    }

    pub fn attack_args(&self, wordlist: &Path, rules: &[&Path]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-a".into(),
            "0".into(),
            "-m".into(),
            self.mode.clone().into(),
            self.hashlist.clone().into(),
            wordlist.into(),
        ];
        // hashcat stacks multiple rule files, every rule of the second file is
        // applied to every output of the first
        for rule in rules {
            args.push("-r".into());
            args.push((*rule).into());
        }
        Self::status_args(&mut args);
        args
    }

    pub fn show_args(&self, potfile: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-m".into(),
            self.mode.clone().into(),
            self.hashlist.clone().into(),
            "--show".into(),
        ];
        if let Some(potfile) = potfile {
            args.push("--potfile-path".into());
            args.push(potfile.into());
        }
        args
    }

    /// Dictionary attack, optionally mutated by one or more rule files.
    pub fn attack<R: Runner>(&self, runner: &mut R, wordlist: &Path, rules: &[&Path]) {
        let args = self.attack_args(wordlist, rules);
        if let Err(err) = runner.run(&self.bin, &args) {
            debug!("Ignoring hashcat result: {:#}", err);
        }
    }

    /// Write everything already cracked for the hashlist into `output`,
    /// looking it up in `potfile` instead of hashcat's default potfile if set.
    /// Returns false if hashcat did not exit cleanly.
    pub fn show<R: Runner>(
        &self,
        runner: &mut R,
        potfile: Option<&Path>,
        output: &Path,
    ) -> bool {
        let args = self.show_args(potfile);
        match runner.run_to_file(&self.bin, &args, output) {
            Ok(()) => true,
            Err(err) => {
                debug!("Ignoring hashcat result: {:#}", err);
                false
            }
        }
    }

    /// Attack with candidates streamed from the stdout of a shell command.
    pub fn attack_piped<R: Runner>(&self, runner: &mut R, producer: &str) {
        let cmdline = format!("{} | {}", producer, self.stdin_command());
        if let Err(err) = runner.run_shell(&cmdline) {
            debug!("Ignoring hashcat result: {:#}", err);
        }
    }

    fn stdin_command(&self) -> String {
        let mut words = vec![
            self.bin.to_string_lossy().into_owned(),
            "-a".to_string(),
            "0".to_string(),
            "-m".to_string(),
            self.mode.clone(),
            self.hashlist.to_string_lossy().into_owned(),
        ];
        let mut status = Vec::new();
        Self::status_args(&mut status);
        words.extend(status.iter().map(|a| a.to_string_lossy().into_owned()));
        shellwords::join(&words.iter().map(String::as_str).collect::<Vec<_>>())
    }
}
