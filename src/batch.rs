use std::path::{Path, PathBuf};

pub const TAG_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Working files of a single run, all tagged with the time the run started.
/// Nothing in here is ever deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    dir: PathBuf,
    tag: String,
}

impl Batch {
    pub fn new(dir: PathBuf, tag: String) -> Batch {
        Batch { dir, tag }
    }

    pub fn start(dir: PathBuf) -> Batch {
        let tag = chrono::Local::now().format(TAG_FORMAT).to_string();
        Batch::new(dir, tag)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// `<dir>/<stem>_<tag>.txt`
    pub fn file(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.txt", stem, self.tag))
    }

    /// Insert the tag in front of the extension of a user supplied filename.
    pub fn tagged(&self, filename: &str) -> String {
        let path = Path::new(filename);
        match (path.file_stem(), path.extension()) {
            (Some(stem), Some(ext)) => format!(
                "{}_{}.{}",
                stem.to_string_lossy(),
                self.tag,
                ext.to_string_lossy()
            ),
            _ => format!("{}_{}", filename, self.tag),
        }
    }

    pub fn cumulative(&self) -> PathBuf {
        self.file("cumulative_cracked")
    }

    pub fn stats(&self) -> PathBuf {
        self.file("cumulative_cracked_stats")
    }
}
