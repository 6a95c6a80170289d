use crate::batch::Batch;
use crate::config::Settings;
use crate::errors::*;
use crate::exec::Runner;
use crate::feedback::Feedback;
use crate::hashcat::Hashcat;
use crate::stats;
use crate::text;
use std::ffi::OsString;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Baseline,
    RetryCracked,
    RetryPotfile,
    Wordlist,
    WordlistRules,
    Usernames,
    Scrape,
    Passphrases,
    BulkWordlists,
    Dictionary,
    FinalRetry,
}

impl Stage {
    pub const ALL: [Stage; 11] = [
        Stage::Baseline,
        Stage::RetryCracked,
        Stage::RetryPotfile,
        Stage::Wordlist,
        Stage::WordlistRules,
        Stage::Usernames,
        Stage::Scrape,
        Stage::Passphrases,
        Stage::BulkWordlists,
        Stage::Dictionary,
        Stage::FinalRetry,
    ];

    pub fn number(self) -> usize {
        Stage::ALL
            .iter()
            .position(|s| *s == self)
            .map(|idx| idx + 1)
            .unwrap_or_default()
    }

    pub fn describe(self) -> &'static str {
        match self {
            Stage::Baseline => "Counting already cracked passwords",
            Stage::RetryCracked => "Retrying cracked passwords with rules_full",
            Stage::RetryPotfile => "Retrying passwords from custom potfile with rules_full",
            Stage::Wordlist => "Running wordlist",
            Stage::WordlistRules => "Running wordlist with clem9669_large",
            Stage::Usernames => "Running usernames with rules_full",
            Stage::Scrape => "Running scraped wordlist with rules_full",
            Stage::Passphrases => "Running passphrases with two rules",
            Stage::BulkWordlists => "Running additional wordlists",
            Stage::Dictionary => "Running dictionary with rules_full",
            Stage::FinalRetry => "Retrying cracked passwords with rules_full",
        }
    }

    /// Passphrases and dictionary never got a stats entry, keep it that way
    /// unless uniform stats are requested.
    pub fn records_progress(self) -> bool {
        !matches!(self, Stage::Passphrases | Stage::Dictionary)
    }
}

/// Where the requery stages take already cracked plaintexts from
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cracked {
    DefaultPotfile,
    CustomPotfile,
}

impl Cracked {
    fn stems(self) -> (&'static str, &'static str) {
        match self {
            Cracked::DefaultPotfile => ("temp_cracked_passwords", "cracked_passwords"),
            Cracked::CustomPotfile => (
                "temp_custom_potfile_cracked_passwords",
                "custom_potfile_cracked_passwords",
            ),
        }
    }
}

/// Pick a decompressor by file extension, anything unknown is read as is.
pub fn decompress_command(archive: &Path) -> Vec<String> {
    let ext = archive
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let cmd: &[&str] = match ext.as_str() {
        "7z" => &["7z", "x", "-so"],
        "bz2" => &["bzip2", "-dc"],
        "gz" => &["gzip", "-dc"],
        "xz" => &["xz", "-dc"],
        "zst" => &["zstd", "-dc"],
        _ => &["cat"],
    };
    let mut cmd = cmd.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    cmd.push(archive.to_string_lossy().into_owned());
    cmd
}

#[derive(Debug, Default)]
pub struct Report {
    pub completed: Vec<Stage>,
    pub failed: Vec<(Stage, Error)>,
}

pub struct Pipeline<'a, R> {
    settings: &'a Settings,
    runner: R,
    hashcat: Hashcat,
    batch: Batch,
}

impl<'a, R: Runner> Pipeline<'a, R> {
    pub fn new(settings: &'a Settings, runner: R, batch: Batch) -> Pipeline<'a, R> {
        let hashcat = Hashcat::new(
            settings.hashcat.clone(),
            settings.mode.clone(),
            settings.hashlist.clone(),
        );
        Pipeline {
            settings,
            runner,
            hashcat,
            batch,
        }
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    #[cfg(test)]
    pub fn into_runner(self) -> R {
        self.runner
    }

    pub fn plan(&self) -> Vec<Stage> {
        Stage::ALL
            .iter()
            .copied()
            .filter(|stage| match stage {
                Stage::Scrape => self.settings.scrape_url.is_some(),
                Stage::BulkWordlists => self.settings.enable_bulk_wordlists,
                _ => true,
            })
            .collect()
    }

    /// Run every planned stage in order. A failing stage is reported and
    /// the next one starts anyway.
    pub fn run<F: Feedback>(&mut self) -> Report {
        let plan = self.plan();
        info!(
            "Starting batch {} with {} steps in {:?}",
            self.batch.tag(),
            plan.len(),
            self.batch.dir()
        );

        let feedback = F::new(plan.len());
        let mut report = Report::default();
        for stage in plan {
            feedback.begin(stage);
            let result = feedback.suspend(|| self.execute(stage));
            feedback.done(stage, &result);
            match result {
                Ok(()) => report.completed.push(stage),
                Err(err) => report.failed.push((stage, err)),
            }
        }
        feedback.finish();

        report
    }

    fn execute(&mut self, stage: Stage) -> Result<()> {
        let result = self.attack(stage);

        if stage.records_progress() || self.settings.stats_every_stage {
            let label = stage.number().to_string();
            if let Err(err) = stats::record_stage_delta(
                &self.hashcat,
                &mut self.runner,
                &self.batch.cumulative(),
                &self.batch.stats(),
                &label,
            ) {
                warn!("Failed to record stats for step {}: {:#}", label, err);
            }
        }

        result
    }

    fn attack(&mut self, stage: Stage) -> Result<()> {
        let settings = self.settings;
        match stage {
            Stage::Baseline => (),
            Stage::RetryCracked | Stage::FinalRetry => {
                self.requery_and_retry(Cracked::DefaultPotfile)?
            }
            Stage::RetryPotfile => self.requery_and_retry(Cracked::CustomPotfile)?,
            Stage::Wordlist => self
                .hashcat
                .attack(&mut self.runner, &settings.wordlist, &[]),
            Stage::WordlistRules => self.hashcat.attack(
                &mut self.runner,
                &settings.wordlist,
                &[settings.clem_rule.as_path()],
            ),
            Stage::Usernames => self.usernames()?,
            Stage::Scrape => self.scrape()?,
            Stage::Passphrases => self.hashcat.attack(
                &mut self.runner,
                &settings.passphrases,
                &[
                    settings.passphrase_rules[0].as_path(),
                    settings.passphrase_rules[1].as_path(),
                ],
            ),
            Stage::BulkWordlists => self.bulk_wordlists(),
            Stage::Dictionary => self.hashcat.attack(
                &mut self.runner,
                &settings.dictionary,
                &[settings.rules_full.as_path()],
            ),
        }
        Ok(())
    }

    /// Look up what is already cracked, write the plaintexts one per line and
    /// feed them back into hashcat with the full ruleset.
    fn requery_and_retry(&mut self, source: Cracked) -> Result<()> {
        let settings = self.settings;
        let (temp, candidates) = source.stems();
        let temp = self.batch.file(temp);
        let candidates = self.batch.file(candidates);

        let potfile = match source {
            Cracked::DefaultPotfile => None,
            Cracked::CustomPotfile => Some(settings.potfile.as_path()),
        };
        self.hashcat.show(&mut self.runner, potfile, &temp);

        let secrets =
            text::extract_secrets(&temp).context("Error processing cracked passwords")?;
        info!("Retrying {} cracked passwords from {:?}", secrets.len(), temp);
        text::write_lines(&candidates, &secrets)
            .context("Error writing cracked passwords to file")?;

        self.hashcat
            .attack(&mut self.runner, &candidates, &[settings.rules_full.as_path()]);
        Ok(())
    }

    fn usernames(&mut self) -> Result<()> {
        let settings = self.settings;
        let usernames =
            text::extract_identities(&settings.hashlist).context("Error extracting usernames")?;

        let path = self.batch.file("usernames");
        text::write_lines(&path, &usernames).context("Error writing usernames to file")?;
        debug!("Wrote {} usernames to {:?}", usernames.len(), path);

        self.hashcat
            .attack(&mut self.runner, &path, &[settings.rules_full.as_path()]);
        Ok(())
    }

    fn scrape_args(&self, url: &str, output: &str) -> Vec<OsString> {
        let mount = format!("{}:/output", self.batch.dir().display());
        let target = format!("/output/{}", output);
        let args = [
            "run",
            "--rm",
            "-v",
            mount.as_str(),
            self.settings.scraper_image.as_str(),
            "-w",
            target.as_str(),
            url,
            "--with-numbers",
            "--meta",
            "--email",
        ];
        args.iter().map(OsString::from).collect()
    }

    fn scrape(&mut self) -> Result<()> {
        let settings = self.settings;
        let url = settings
            .scrape_url
            .as_deref()
            .context("No url to scrape configured")?;

        let output = self.batch.tagged(&settings.scrape_output);
        let args = self.scrape_args(url, &output);
        if let Err(err) = self.runner.run(Path::new("docker"), &args) {
            warn!("Scraper reported an error: {:#}", err);
        }

        let scraped = self.batch.dir().join(&output);
        let cleaned = text::clean_wordlist(&scraped, self.batch.dir(), self.batch.tag())
            .context("Failed to clean scraped wordlist")?;
        info!("Scraped wordlist cleaned: {:?}", cleaned);

        self.hashcat
            .attack(&mut self.runner, &cleaned, &[settings.rules_full.as_path()]);
        Ok(())
    }

    fn bulk_wordlists(&mut self) {
        let settings = self.settings;
        if settings.bulk_wordlists.is_empty() {
            warn!("Additional wordlists are enabled but none are configured");
        }

        for archive in &settings.bulk_wordlists {
            let producer = decompress_command(archive);
            let producer =
                shellwords::join(&producer.iter().map(String::as_str).collect::<Vec<_>>());
            self.hashcat.attack_piped(&mut self.runner, &producer);
        }
    }
}
