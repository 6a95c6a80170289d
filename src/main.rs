mod batch;
mod config;
mod errors;
mod exec;
mod feedback;
mod hashcat;
mod pipeline;
mod stats;
mod text;
#[cfg(test)]
mod testing;

use crate::batch::Batch;
use crate::config::{Config, Settings};
use crate::errors::*;
use crate::exec::System;
use crate::feedback::{Silent, Verbose};
use crate::pipeline::{Pipeline, Report};
use clap::{ArgAction, Parser};
use env_logger::Env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about = "Run a fixed chain of hashcat attacks and track what every step cracked")]
pub struct Args {
    /// Verbose logs (can be used multiple times, maximum: 4)
    #[arg(short, long, action(ArgAction::Count))]
    verbose: u8,
    /// Do not print progress bar
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
    /// Path to the config file with default paths
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    /// Path to the hashlist file (user:hash format)
    #[arg(long)]
    hashlist: PathBuf,
    /// Hashcat mode to use
    #[arg(long)]
    mode: String,
    /// Path to the wordlist file
    #[arg(long)]
    wordlist: Option<PathBuf>,
    /// Path to the potfile with previously cracked hashes
    #[arg(long)]
    potfile: Option<PathBuf>,
    /// Path to clem9669_large.rule
    #[arg(long = "clemrule")]
    clem_rule: Option<PathBuf>,
    /// Path to rules_full.rule
    #[arg(long = "rulesfull")]
    rules_full: Option<PathBuf>,
    /// URL to scrape a wordlist from with CeWL
    #[arg(long)]
    url: Option<String>,
    /// Output file for the CeWL wordlist
    #[arg(long = "cewlwordlist", default_value = "cewl_wordlist.txt")]
    cewl_wordlist: String,
    /// Path to the hashcat binary
    #[arg(long)]
    hashcat: Option<PathBuf>,
    /// Path to the passphrases wordlist
    #[arg(long)]
    passphrases: Option<PathBuf>,
    /// Path to passphrase-rule1.rule
    #[arg(long = "passphraserule1")]
    passphrase_rule1: Option<PathBuf>,
    /// Path to passphrase-rule2.rule
    #[arg(long = "passphraserule2")]
    passphrase_rule2: Option<PathBuf>,
    /// Enable processing of additional wordlists
    #[arg(long)]
    enable_additional_wordlists: bool,
    /// Path to the dictionary file
    #[arg(long)]
    dictionary: Option<PathBuf>,
    /// Record stats after every step, including passphrases and dictionary
    #[arg(long)]
    stats_every_stage: bool,
}

impl Args {
    fn into_settings(self, config: Config) -> Settings {
        Settings {
            hashcat: self.hashcat.unwrap_or(config.hashcat_path),
            mode: self.mode,
            hashlist: self.hashlist,
            wordlist: self.wordlist.unwrap_or(config.wordlist),
            potfile: self.potfile.unwrap_or(config.potfile),
            clem_rule: self.clem_rule.unwrap_or(config.clem_rule),
            rules_full: self.rules_full.unwrap_or(config.rules_full),
            passphrases: self.passphrases.unwrap_or(config.passphrases),
            passphrase_rules: [
                self.passphrase_rule1.unwrap_or(config.passphrase_rule1),
                self.passphrase_rule2.unwrap_or(config.passphrase_rule2),
            ],
            dictionary: self.dictionary.unwrap_or(config.dictionary),
            cache_dir: config.cache_dir,
            scrape_url: self.url.filter(|url| !url.is_empty()),
            scrape_output: self.cewl_wordlist,
            scraper_image: config.scraper_image,
            bulk_wordlists: config.bulk_wordlists,
            enable_bulk_wordlists: self.enable_additional_wordlists,
            stats_every_stage: self.stats_every_stage,
        }
    }
}

#[inline]
fn dispatch(pipeline: &mut Pipeline<System>, quiet: bool) -> Report {
    if quiet {
        pipeline.run::<Silent>()
    } else {
        pipeline.run::<Verbose>()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::init_from_env(Env::default().default_filter_or(log_level));

    let config = Config::load(&args.config).context("Error loading config")?;
    debug!("Loaded configuration: {:?}", config);

    let quiet = args.quiet || !io::stderr().is_terminal();
    let settings = args.into_settings(config);
    info!("Validating environment");
    settings.validate()?;

    let batch = Batch::start(settings.cache_dir.clone());
    let mut pipeline = Pipeline::new(&settings, System, batch);
    let report = dispatch(&mut pipeline, quiet);

    println!(
        "All steps completed ({} ok, {} failed), stats written to {:?}",
        report.completed.len(),
        report.failed.len(),
        pipeline.batch().stats()
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;

    fn defaults() -> Config {
        Config {
            hashcat_path: PathBuf::from("/opt/hashcat/hashcat.bin"),
            wordlist: PathBuf::from("/lists/rockyou.txt"),
            potfile: PathBuf::from("/lists/hashcat.potfile"),
            clem_rule: PathBuf::from("/rules/clem9669_large.rule"),
            rules_full: PathBuf::from("/rules/rules_full.rule"),
            passphrases: PathBuf::from("/lists/passphrases.txt"),
            passphrase_rule1: PathBuf::from("/rules/passphrase-rule1.rule"),
            passphrase_rule2: PathBuf::from("/rules/passphrase-rule2.rule"),
            dictionary: PathBuf::from("/lists/dictionary.txt"),
            cache_dir: PathBuf::from("/cache"),
            bulk_wordlists: vec![PathBuf::from("/wl/all_in_one.txt.7z")],
            scraper_image: config::DEFAULT_SCRAPER_IMAGE.to_string(),
        }
    }

    #[test]
    fn required_flags() {
        assert!(Args::try_parse_from(["crackpipe"]).is_err());
        assert!(Args::try_parse_from(["crackpipe", "--hashlist", "h.txt"]).is_err());
        assert!(Args::try_parse_from(["crackpipe", "--mode", "1000"]).is_err());
        assert!(Args::try_parse_from(["crackpipe", "--hashlist", "h.txt", "--mode", "1000"]).is_ok());
    }

    #[test]
    fn defaults_from_config() {
        let args =
            Args::try_parse_from(["crackpipe", "--hashlist", "h.txt", "--mode", "1000"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.json"));
        let settings = args.into_settings(defaults());
        assert_eq!(settings.hashcat, PathBuf::from("/opt/hashcat/hashcat.bin"));
        assert_eq!(settings.wordlist, PathBuf::from("/lists/rockyou.txt"));
        assert_eq!(settings.scrape_url, None);
        assert_eq!(settings.scrape_output, "cewl_wordlist.txt");
        assert!(!settings.enable_bulk_wordlists);
        assert!(!settings.stats_every_stage);
        assert_eq!(settings.bulk_wordlists.len(), 1);
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "crackpipe",
            "--hashlist",
            "h.txt",
            "--mode",
            "1000",
            "--hashcat",
            "hashcat",
            "--wordlist",
            "w.txt",
            "--potfile",
            "p.pot",
            "--clemrule",
            "c.rule",
            "--rulesfull",
            "r.rule",
            "--passphrases",
            "pp.txt",
            "--passphraserule1",
            "pp1.rule",
            "--passphraserule2",
            "pp2.rule",
            "--dictionary",
            "d.txt",
            "--url",
            "https://example.com",
            "--cewlwordlist",
            "site.txt",
            "--enable-additional-wordlists",
            "--stats-every-stage",
        ])
        .unwrap();
        let settings = args.into_settings(defaults());
        assert_eq!(settings.hashcat, PathBuf::from("hashcat"));
        assert_eq!(settings.mode, "1000");
        assert_eq!(
            settings.input_files(),
            vec![
                Path::new("h.txt"),
                Path::new("w.txt"),
                Path::new("p.pot"),
                Path::new("c.rule"),
                Path::new("r.rule"),
                Path::new("pp.txt"),
                Path::new("pp1.rule"),
                Path::new("pp2.rule"),
                Path::new("d.txt"),
            ]
        );
        assert_eq!(settings.scrape_url.as_deref(), Some("https://example.com"));
        assert_eq!(settings.scrape_output, "site.txt");
        assert!(settings.enable_bulk_wordlists);
        assert!(settings.stats_every_stage);
        assert_eq!(settings.cache_dir, PathBuf::from("/cache"));
    }

    #[test]
    fn empty_url_disables_scraping() {
        let args = Args::try_parse_from([
            "crackpipe",
            "--hashlist",
            "h.txt",
            "--mode",
            "1000",
            "--url",
            "",
        ])
        .unwrap();
        assert_eq!(args.into_settings(defaults()).scrape_url, None);
    }
}
