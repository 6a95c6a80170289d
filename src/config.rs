use crate::errors::*;
use crate::exec::SHELL;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCRAPER_IMAGE: &str = "ghcr.io/digininja/cewl";

fn default_scraper_image() -> String {
    DEFAULT_SCRAPER_IMAGE.to_string()
}

/// Default locations read from `config.json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub hashcat_path: PathBuf,
    pub wordlist: PathBuf,
    pub potfile: PathBuf,
    pub clem_rule: PathBuf,
    pub rules_full: PathBuf,
    pub passphrases: PathBuf,
    pub passphrase_rule1: PathBuf,
    pub passphrase_rule2: PathBuf,
    pub dictionary: PathBuf,
    pub cache_dir: PathBuf,
    /// compressed wordlists streamed into hashcat with --enable-additional-wordlists
    #[serde(default)]
    pub bulk_wordlists: Vec<PathBuf>,
    #[serde(default = "default_scraper_image")]
    pub scraper_image: String,
}

impl Config {
    pub fn parse(s: &str) -> Result<Config> {
        let config = serde_json::from_str(s).context("Failed to decode config file")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Config> {
        let buf = fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file {:?}", path))?;
        let mut config = Config::parse(&buf)?;

        fs::create_dir_all(&config.cache_dir)
            .with_context(|| format!("Failed to create cache directory {:?}", config.cache_dir))?;
        // the cache dir is bind mounted into the scraper container
        config.cache_dir = fs::canonicalize(&config.cache_dir)
            .with_context(|| format!("Failed to resolve cache directory {:?}", config.cache_dir))?;

        Ok(config)
    }
}

/// Everything a run needs, with command line overrides applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub hashcat: PathBuf,
    pub mode: String,
    pub hashlist: PathBuf,
    pub wordlist: PathBuf,
    pub potfile: PathBuf,
    pub clem_rule: PathBuf,
    pub rules_full: PathBuf,
    pub passphrases: PathBuf,
    pub passphrase_rules: [PathBuf; 2],
    pub dictionary: PathBuf,
    pub cache_dir: PathBuf,
    pub scrape_url: Option<String>,
    pub scrape_output: String,
    pub scraper_image: String,
    pub bulk_wordlists: Vec<PathBuf>,
    pub enable_bulk_wordlists: bool,
    pub stats_every_stage: bool,
}

impl Settings {
    pub fn input_files(&self) -> Vec<&Path> {
        vec![
            self.hashlist.as_path(),
            &self.wordlist,
            &self.potfile,
            &self.clem_rule,
            &self.rules_full,
            &self.passphrases,
            &self.passphrase_rules[0],
            &self.passphrase_rules[1],
            &self.dictionary,
        ]
    }

    /// Make sure every tool and file the planned stages depend on is there.
    pub fn validate(&self) -> Result<()> {
        let hashcat = which::which(&self.hashcat)
            .with_context(|| format!("Hashcat not found at {:?}", self.hashcat))?;
        info!("Hashcat is installed: {:?}", hashcat);

        // docker is only used by the scrape step, which is skipped without a url
        if self.scrape_url.is_some() {
            let docker = which::which("docker").context("Docker is not installed")?;
            info!("Docker is installed: {:?}", docker);
        }

        if self.enable_bulk_wordlists {
            which::which(SHELL)
                .with_context(|| format!("{} is required for additional wordlists", SHELL))?;
        }

        validate_files(&self.input_files())
    }
}

pub fn validate_files(files: &[&Path]) -> Result<()> {
    for file in files {
        if !file.exists() {
            bail!("File {:?} does not exist", file);
        }
    }
    debug!("All provided files exist");
    Ok(())
}
