use color_eyre::Result;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// File holding paths entered in the upload prompt
pub const UPLOAD_HISTORY_FILE: &str = "upload_history.txt";
/// Default log file written when debug mode is on
pub const LOG_FILE: &str = "storeviz.log";

/// Registry of known cache files
const CACHE_FILES: &[&str] = &[UPLOAD_HISTORY_FILE, LOG_FILE];

/// Manages cache directory and cache file operations
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(app_name: &str) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine cache directory"))?
            .join(app_name);

        Ok(Self { cache_dir })
    }

    /// Create a CacheManager rooted at a custom directory (primarily for testing)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_file(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Clear all registered cache files
    pub fn clear_all(&self) -> Result<()> {
        for filename in CACHE_FILES {
            let file_path = self.cache_file(filename);
            if file_path.exists() {
                if let Err(e) = fs::remove_file(&file_path) {
                    tracing::warn!("could not remove cache file {}: {}", filename, e);
                }
            }
        }

        Ok(())
    }

    /// Load the upload history, oldest first. Missing file means empty history.
    pub fn load_history(&self) -> Result<Vec<String>> {
        let history_file = self.cache_file(UPLOAD_HISTORY_FILE);
        if !history_file.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&history_file)?);
        let mut history = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                history.push(line);
            }
        }
        Ok(history)
    }

    /// Save the most recent `limit` history entries
    pub fn save_history(&self, history: &[String], limit: usize) -> Result<()> {
        self.ensure_cache_dir()?;
        let mut file = fs::File::create(self.cache_file(UPLOAD_HISTORY_FILE))?;

        let start = history.len().saturating_sub(limit);
        for entry in history.iter().skip(start) {
            writeln!(file, "{}", entry)?;
        }
        Ok(())
    }
}

/// Append an entry unless it repeats the most recent one
pub fn add_to_history(history: &mut Vec<String>, entry: String) {
    if history.last() == Some(&entry) {
        return;
    }
    history.push(entry);
}
