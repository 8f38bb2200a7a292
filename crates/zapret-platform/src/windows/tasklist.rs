//! Parsing of `tasklist /FO CSV /NH` output

use crate::traits::ProcessEntry;

/// Parse CSV rows of the form `"winws.exe","1234","Console","1","10,240 K"`
///
/// Lines that are not quoted rows (such as the "INFO: No tasks are running"
/// notice) and rows with an unparseable PID are skipped.
pub fn parse_tasklist_csv(output: &str) -> Vec<ProcessEntry> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('"'))
        .filter_map(|line| {
            let mut fields = line.trim_matches('"').split("\",\"");
            let image = fields.next()?.to_string();
            let pid = fields.next()?.parse().ok()?;
            Some(ProcessEntry { image, pid })
        })
        .collect()
}
