use crate::errors::*;
use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const DOMAIN_SEPARATOR: char = '\\';

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open file {:?}", path))?;
    Ok(BufReader::new(file))
}

/// Collect the identity column of a `user:hash` or `DOMAIN\user:hash` hashlist.
///
/// Everything after the first domain separator is kept, lines without an
/// identity are skipped and the order of the hashlist is preserved.
pub fn extract_identities(hashlist: &Path) -> Result<Vec<String>> {
    let mut identities = Vec::new();

    // usernames are not guaranteed to be valid utf-8
    for line in open(hashlist)?.split(b'\n') {
        let line = line.with_context(|| format!("Failed to read file {:?}", hashlist))?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end_matches('\r');

        let identity = line.split(':').next().unwrap_or_default();
        let identity = match identity.split_once(DOMAIN_SEPARATOR) {
            Some((_domain, user)) => user,
            None => identity,
        };
        if identity.is_empty() {
            continue;
        }
        identities.push(identity.to_string());
    }

    Ok(identities)
}

/// Collect the unique plaintexts out of hashcat `--show` output.
///
/// The plaintext is the last colon delimited field. Lines without a colon
/// and plaintexts that are blank after trimming are ignored.
pub fn extract_secrets(path: &Path) -> Result<Vec<String>> {
    let mut secrets = BTreeSet::new();

    for line in open(path)?.lines() {
        let line = line.with_context(|| format!("Failed to read file {:?}", path))?;
        let Some((_, secret)) = line.rsplit_once(':') else {
            continue;
        };

        let secret = secret.trim();
        if !secret.is_empty() {
            secrets.insert(secret.to_string());
        }
    }

    Ok(secrets.into_iter().collect())
}

pub fn strip_non_ascii(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

/// Write a copy of `input` into `output_dir` with all non-ascii characters
/// removed. Lines that end up empty are dropped.
pub fn clean_wordlist(input: &Path, output_dir: &Path, tag: &str) -> Result<PathBuf> {
    let reader = open(input)?;

    let output = output_dir.join(format!("cleaned_wordlist_{}.txt", tag));
    let file = File::create(&output)
        .with_context(|| format!("Failed to create output file {:?}", output))?;
    let mut writer = BufWriter::new(file);

    // scraped pages are not guaranteed to be valid utf-8
    for line in reader.split(b'\n') {
        let line = line.with_context(|| format!("Failed to read file {:?}", input))?;
        let line = String::from_utf8_lossy(&line);
        let cleaned = strip_non_ascii(line.trim_end_matches('\r'));
        if cleaned.is_empty() {
            continue;
        }
        writeln!(writer, "{}", cleaned)
            .with_context(|| format!("Failed to write to file {:?}", output))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush file {:?}", output))?;
    Ok(output)
}

fn write_all<S: AsRef<str>>(file: File, path: &Path, lines: &[S]) -> Result<()> {
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line.as_ref())
            .with_context(|| format!("Failed to write to file {:?}", path))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush file {:?}", path))
}

/// Create or truncate `path` and write one entry per line.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create file {:?}", path))?;
    write_all(file, path, lines)
}

/// Append one entry per line, creating `path` if needed.
pub fn append_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open or create file {:?}", path))?;
    write_all(file, path, lines)
}
