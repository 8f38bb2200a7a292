//! Domain list management
//!
//! zapret reads two plain-text lists:
//! - the general list: domains the bypass is applied to
//! - the exclude list: domains left untouched
//!
//! Each file holds one domain or IPv4 address per line. Lines are kept in
//! file order; duplicates are only checked when entries are added.

mod store;
mod validate;

pub use store::{invalid_lines, AddReport, ListFile, SaveReport};
pub use validate::is_valid_entry;

use std::path::Path;

/// Which list a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    General,
    Exclude,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::General, ListKind::Exclude];

    /// Location relative to the base directory
    pub fn relative_path(&self) -> &'static str {
        match self {
            ListKind::General => "lists/list-general.txt",
            ListKind::Exclude => "lists/list-exclude.txt",
        }
    }

    /// Tab label
    pub fn label(&self) -> &'static str {
        match self {
            ListKind::General => "General list",
            ListKind::Exclude => "Exclusions",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ListKind::General => "General domain list",
            ListKind::Exclude => "Exclusion list",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ListKind::General => "Domains for standard filtering (one per line)",
            ListKind::Exclude => "Domains to exclude from filtering (one per line)",
        }
    }

    /// Open this list under `base_dir`
    pub fn open(&self, base_dir: &Path) -> ListFile {
        ListFile::new(base_dir.join(self.relative_path()))
    }
}
