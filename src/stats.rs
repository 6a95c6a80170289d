use crate::errors::*;
use crate::exec::Runner;
use crate::hashcat::Hashcat;
use crate::text;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Number of lines in `path`. A missing or unreadable file counts as empty
/// so the very first query of a batch has something to compare against.
pub fn count_lines(path: &Path) -> usize {
    match File::open(path) {
        Ok(file) => BufReader::new(file).split(b'\n').map_while(|l| l.ok()).count(),
        Err(err) => {
            trace!("Counting {:?} as empty: {}", path, err);
            0
        }
    }
}

pub fn stage_message(delta: i64, label: &str) -> String {
    format!("Extracted {} new passwords for step {}.", delta, label)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Query hashcat into a sibling file and move it over `cumulative` only if
/// the query succeeded and lost nothing. Returns the line count afterwards.
fn refresh_cumulative<R: Runner>(
    hashcat: &Hashcat,
    runner: &mut R,
    cumulative: &Path,
    before: usize,
) -> Result<usize> {
    let partial = partial_path(cumulative);
    let ok = hashcat.show(runner, None, &partial);
    let fresh = count_lines(&partial);

    if ok && fresh >= before {
        fs::rename(&partial, cumulative)
            .with_context(|| format!("Failed to move {:?} to {:?}", partial, cumulative))?;
        return Ok(fresh);
    }

    if ok {
        warn!("Keeping {:?}, hashcat reported {} of {} lines", cumulative, fresh, before);
    } else {
        warn!("Keeping {:?}, hashcat query failed", cumulative);
    }
    if let Err(err) = fs::remove_file(&partial) {
        trace!("Failed to remove {:?}: {}", partial, err);
    }
    Ok(before)
}

/// Refresh the cumulative `--show` output and append how much it grew to
/// the stats log. The cumulative file never shrinks.
pub fn record_stage_delta<R: Runner>(
    hashcat: &Hashcat,
    runner: &mut R,
    cumulative: &Path,
    stats_log: &Path,
    label: &str,
) -> Result<i64> {
    let before = count_lines(cumulative);
    let after = refresh_cumulative(hashcat, runner, cumulative, before)?;

    let delta = after as i64 - before as i64;
    info!("Extracted {} new passwords (step {}, {} total)", delta, label, after);

    text::append_lines(stats_log, &[stage_message(delta, label)])
        .context("Failed to write stats log")?;
    Ok(delta)
}
