//! Line-delimited list file persistence

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::validate::is_valid_entry;
use crate::error::{Error, Result};

/// Outcome of [`ListFile::add`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Entries appended to the file
    pub added: usize,
    /// Entries skipped because they were already present
    pub duplicates: usize,
    /// Entries rejected by validation, in input order
    pub invalid: Vec<String>,
}

impl AddReport {
    /// Whether the input contained anything to process
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.duplicates == 0 && self.invalid.is_empty()
    }
}

/// Outcome of [`ListFile::save_dropping_invalid`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Entries written
    pub saved: usize,
    /// Invalid entries left out
    pub dropped: Vec<String>,
}

/// A domain/IP list stored as one entry per line
#[derive(Debug, Clone)]
pub struct ListFile {
    path: PathBuf,
}

impl ListFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw file contents, creating an empty file (and its
    /// directory) if it does not exist yet
    pub fn load(&self) -> Result<String> {
        self.ensure_parent()?;

        if !self.path.exists() {
            std::fs::write(&self.path, "")?;
            info!("Created empty list {}", self.path.display());
            return Ok(String::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        debug!("Loaded {} bytes from {}", content.len(), self.path.display());
        Ok(content)
    }

    /// Non-blank, trimmed lines currently stored; a missing file is empty
    pub fn entries(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(non_blank_lines(&content).map(str::to_string).collect())
    }

    /// Add newline-separated entries from `input`
    ///
    /// Invalid entries are skipped and listed in the report, exact
    /// duplicates are skipped and counted. The file is rewritten only
    /// when at least one entry was added.
    pub fn add(&self, input: &str) -> Result<AddReport> {
        let mut entries = self.entries()?;
        let mut seen: HashSet<String> = entries.iter().cloned().collect();
        let mut report = AddReport::default();

        for candidate in non_blank_lines(input) {
            if !is_valid_entry(candidate) {
                warn!("Rejected invalid entry: {}", candidate);
                report.invalid.push(candidate.to_string());
                continue;
            }

            if seen.insert(candidate.to_string()) {
                entries.push(candidate.to_string());
                report.added += 1;
            } else {
                report.duplicates += 1;
            }
        }

        if report.added > 0 {
            self.write(&entries.join("\n"))?;
            info!(
                "Added {} entries to {} ({} duplicates, {} invalid)",
                report.added,
                self.path.display(),
                report.duplicates,
                report.invalid.len()
            );
        }

        Ok(report)
    }

    /// Persist edited content verbatim
    ///
    /// Fails with `InvalidEntry` naming the first bad line if any line does
    /// not validate; use [`invalid_lines`] first to ask the user, then
    /// [`ListFile::save_dropping_invalid`].
    pub fn save(&self, content: &str) -> Result<usize> {
        if let Some(bad) = invalid_lines(content).into_iter().next() {
            return Err(Error::invalid_entry(bad));
        }

        self.write(content)?;
        let saved = non_blank_lines(content).count();
        info!("Saved {} entries to {}", saved, self.path.display());
        Ok(saved)
    }

    /// Persist only the valid lines of `content`, joined by `\n`
    pub fn save_dropping_invalid(&self, content: &str) -> Result<SaveReport> {
        let (valid, dropped): (Vec<&str>, Vec<&str>) =
            non_blank_lines(content).partition(|line| is_valid_entry(line));

        self.write(&valid.join("\n"))?;
        info!(
            "Saved {} entries to {}, dropped {} invalid",
            valid.len(),
            self.path.display(),
            dropped.len()
        );

        Ok(SaveReport {
            saved: valid.len(),
            dropped: dropped.into_iter().map(str::to_string).collect(),
        })
    }

    /// Truncate the list to empty
    pub fn clear(&self) -> Result<()> {
        self.write("")?;
        info!("Cleared {}", self.path.display());
        Ok(())
    }

    fn write(&self, content: &str) -> Result<()> {
        self.ensure_parent()?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                std::fs::create_dir_all(dir)?;
                info!("Created directory {}", dir.display());
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Non-blank lines of `content` that fail validation, trimmed
pub fn invalid_lines(content: &str) -> Vec<String> {
    non_blank_lines(content)
        .filter(|line| !is_valid_entry(line))
        .map(str::to_string)
        .collect()
}

fn non_blank_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().map(str::trim).filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_list() -> (tempfile::TempDir, ListFile) {
        let dir = tempfile::tempdir().unwrap();
        let list = ListFile::new(dir.path().join("lists").join("list-general.txt"));
        (dir, list)
    }

    #[test]
    fn test_load_creates_file_and_directory() {
        let (_dir, list) = temp_list();
        assert!(!list.path().exists());

        let content = list.load().unwrap();
        assert!(content.is_empty());
        assert!(list.path().exists());
    }

    #[test]
    fn test_add_reports_counts() {
        let (_dir, list) = temp_list();
        let report = list.add("example.com\n\n  discord.gg  \nbad entry\nexample.com").unwrap();

        assert_eq!(report.added, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.invalid, vec!["bad entry".to_string()]);
        assert_eq!(list.entries().unwrap(), vec!["example.com", "discord.gg"]);
    }

    #[test]
    fn test_add_nothing_leaves_file_untouched() {
        let (_dir, list) = temp_list();
        list.load().unwrap();
        std::fs::write(list.path(), "a.com\n\n").unwrap();

        let report = list.add("   \n").unwrap();
        assert!(report.is_empty());
        assert_eq!(std::fs::read_to_string(list.path()).unwrap(), "a.com\n\n");
    }

    #[test]
    fn test_save_rejects_invalid() {
        let (_dir, list) = temp_list();
        match list.save("a.com\nnope\n") {
            Err(Error::InvalidEntry { entry }) => assert_eq!(entry, "nope"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!list.path().exists());
    }

    #[test]
    fn test_save_dropping_invalid() {
        let (_dir, list) = temp_list();
        let report = list.save_dropping_invalid("a.com\nnope\n  b.org \n").unwrap();

        assert_eq!(report.saved, 2);
        assert_eq!(report.dropped, vec!["nope".to_string()]);
        assert_eq!(std::fs::read_to_string(list.path()).unwrap(), "a.com\nb.org");
    }

    #[test]
    fn test_clear() {
        let (_dir, list) = temp_list();
        list.add("a.com\nb.com").unwrap();
        list.clear().unwrap();
        assert!(list.entries().unwrap().is_empty());
        assert_eq!(list.load().unwrap(), "");
    }

    #[test]
    fn test_invalid_lines() {
        assert!(invalid_lines("a.com\n\n1.2.3.4\n").is_empty());
        assert_eq!(invalid_lines("a.com\nfoo\n bar baz \n"), vec!["foo", "bar baz"]);
    }
}
