//! Scripted stand-in for hashcat, docker and the shell.

use crate::errors::*;
use crate::exec::Runner;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Run(String, Vec<String>),
    ToFile(String, Vec<String>, PathBuf),
    Shell(String),
}

impl Call {
    pub fn program(&self) -> Option<&str> {
        match self {
            Call::Run(program, _) | Call::ToFile(program, _, _) => Some(program),
            Call::Shell(_) => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeHashcat {
    /// plaintext behind every hash that can be cracked at all
    pub secrets: HashMap<String, String>,
    /// hashcat's default potfile
    pub pot: BTreeMap<String, String>,
    /// words the scraper container writes
    pub scraped: Vec<String>,
    pub scraper_broken: bool,
    /// `--show` dies after its output file was truncated
    pub show_broken: bool,
    pub calls: Vec<Call>,
}

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn value_of<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(String::as_str)
}

fn hashes(hashlist: &str) -> Vec<String> {
    fs::read_to_string(hashlist)
        .unwrap_or_default()
        .lines()
        .filter_map(|l| l.rsplit_once(':'))
        .map(|(_, hash)| hash.to_string())
        .collect()
}

fn read_pot(path: &str) -> BTreeMap<String, String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter_map(|l| l.split_once(':'))
        .map(|(hash, plain)| (hash.to_string(), plain.to_string()))
        .collect()
}

impl FakeHashcat {
    pub fn secret(&mut self, hash: &str, plain: &str) {
        self.secrets.insert(hash.to_string(), plain.to_string());
    }

    pub fn crack(&mut self, hash: &str, plain: &str) {
        self.pot.insert(hash.to_string(), plain.to_string());
    }

    pub fn programs(&self) -> Vec<&str> {
        self.calls.iter().filter_map(Call::program).collect()
    }

    pub fn shell_calls(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Shell(cmdline) => Some(cmdline.as_str()),
                _ => None,
            })
            .collect()
    }

    fn scrape(&self, args: &[String]) -> Result<()> {
        if self.scraper_broken {
            bail!("exit status: 125");
        }
        let mount = value_of(args, "-v").context("Missing bind mount")?;
        let (host, _) = mount.split_once(":/output").context("Unexpected bind mount")?;
        let out = value_of(args, "-w").context("Missing scraper output")?;
        let out = out.strip_prefix("/output/").context("Output outside of mount")?;

        let mut content = self.scraped.join("\n");
        content.push('\n');
        fs::write(Path::new(host).join(out), content)?;
        Ok(())
    }

    fn attack(&mut self, args: &[String]) -> Result<()> {
        let hashlist = &args[4];
        let words = fs::read_to_string(&args[5]).unwrap_or_default();
        let words = words.lines().collect::<HashSet<_>>();

        let mut cracked = 0;
        for hash in hashes(hashlist) {
            if self.pot.contains_key(&hash) {
                continue;
            }
            if let Some(plain) = self.secrets.get(&hash) {
                if words.contains(plain.as_str()) {
                    self.pot.insert(hash, plain.clone());
                    cracked += 1;
                }
            }
        }

        if cracked == 0 {
            bail!("exit status: 1");
        }
        Ok(())
    }
}

impl Runner for FakeHashcat {
    fn run(&mut self, program: &Path, args: &[OsString]) -> Result<ExitStatus> {
        let args = strings(args);
        self.calls.push(Call::Run(name(program), args.clone()));

        if name(program) == "docker" {
            self.scrape(&args)?;
        } else if args.first().map(String::as_str) == Some("-a") {
            self.attack(&args)?;
        }
        Ok(ExitStatus::default())
    }

    fn run_to_file(&mut self, program: &Path, args: &[OsString], output: &Path) -> Result<()> {
        let args = strings(args);
        self.calls.push(Call::ToFile(
            name(program),
            args.clone(),
            output.to_path_buf(),
        ));
        if self.show_broken {
            fs::write(output, "")?;
            bail!("signal: 9 (SIGKILL)");
        }

        let pot = match value_of(&args, "--potfile-path") {
            Some(path) => read_pot(path),
            None => self.pot.clone(),
        };

        let mut out = String::new();
        for hash in hashes(&args[2]) {
            if let Some(plain) = pot.get(&hash) {
                out.push_str(&format!("{}:{}\n", hash, plain));
            }
        }
        fs::write(output, out)?;
        Ok(())
    }

    fn run_shell(&mut self, cmdline: &str) -> Result<()> {
        self.calls.push(Call::Shell(cmdline.to_string()));
        Ok(())
    }
}
