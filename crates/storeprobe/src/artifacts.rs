//! Files the suite leaves behind in the output directory.
//!
//! - [`CredentialStore`]: the last successfully registered user, consumed by
//!   the login scenarios (possibly of a later run)
//! - [`BugLog`]: append-only Markdown record of application defects
//! - [`write_product_names`]: product names found by the keyword search

use crate::result::ProbeResult;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const BUG_LOG_HEADER: &str =
    "# Detected bugs (automated tests)\n\n*Bugs recorded when tests catch application errors.*\n";

pub(crate) fn ensure_parent(path: &Path) -> ProbeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Credentials of a user the suite registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

impl RegisteredUser {
    /// Create a credential record
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// JSON file holding the last registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store backed by `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the stored credentials
    pub fn save(&self, user: &RegisteredUser) -> ProbeResult<()> {
        ensure_parent(&self.path)?;
        fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        info!(target: "storeprobe::artifacts", "saved credentials for {} to {}", user.email, self.path.display());
        Ok(())
    }

    /// Stored credentials; `None` when nothing has been saved yet
    pub fn load(&self) -> ProbeResult<Option<RegisteredUser>> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// BUG LOG
// =============================================================================

/// One detected application defect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugReport {
    /// When the defect was observed
    pub timestamp: DateTime<Local>,
    /// Scenario that observed it
    pub test_id: String,
    /// One-line summary
    pub summary: String,
    /// Context such as URL or scenario description, in insertion order
    pub details: Vec<(String, String)>,
}

impl BugReport {
    /// Report stamped with the current local time
    #[must_use]
    pub fn new(test_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            test_id: test_id.into(),
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    /// Add a context line
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Override the timestamp
    #[must_use]
    pub const fn at(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Markdown block appended to the log. Blank detail values are omitted.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut lines = vec![
            String::new(),
            "---".to_string(),
            format!("## Bug – {}", self.timestamp.format("%Y-%m-%d %H:%M:%S")),
            format!("- **Test:** `{}`", self.test_id),
            format!("- **Summary:** {}", self.summary),
        ];
        lines.extend(
            self.details
                .iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .map(|(key, value)| format!("- **{key}:** {value}")),
        );
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Append-only Markdown bug log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugLog {
    path: PathBuf,
}

impl BugLog {
    /// Log backed by `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a report, writing the header first if the log is new or empty
    pub fn record(&self, report: &BugReport) -> ProbeResult<()> {
        ensure_parent(&self.path)?;
        let needs_header = fs::metadata(&self.path).map_or(true, |meta| meta.len() == 0);
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if needs_header {
            file.write_all(BUG_LOG_HEADER.as_bytes())?;
        }
        file.write_all(report.to_markdown().as_bytes())?;
        warn!(target: "storeprobe::artifacts", "bug recorded by {}: {}", report.test_id, report.summary);
        Ok(())
    }
}

// =============================================================================
// PRODUCT NAMES
// =============================================================================

/// Write one product name per line, replacing the file
pub fn write_product_names<S: AsRef<str>>(path: &Path, names: &[S]) -> ProbeResult<()> {
    ensure_parent(path)?;
    let mut body = String::new();
    for name in names {
        body.push_str(name.as_ref().trim());
        body.push('\n');
    }
    fs::write(path, body)?;
    info!(target: "storeprobe::artifacts", "wrote {} product names to {}", names.len(), path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    mod credential_tests {
        use super::*;

        #[test]
        fn test_missing_file_is_none() {
            let dir = tempfile::tempdir().unwrap();
            let store = CredentialStore::new(dir.path().join("user.json"));
            assert_eq!(store.load().unwrap(), None);
        }

        #[test]
        fn test_save_then_load_overwrites() {
            let dir = tempfile::tempdir().unwrap();
            let store = CredentialStore::new(dir.path().join("nested/out/user.json"));
            store.save(&RegisteredUser::new("a@example.com", "one")).unwrap();
            store.save(&RegisteredUser::new("b@example.com", "two")).unwrap();
            let user = store.load().unwrap().unwrap();
            assert_eq!(user, RegisteredUser::new("b@example.com", "two"));
        }

        #[test]
        fn test_corrupt_file_is_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("user.json");
            fs::write(&path, "{not json").unwrap();
            assert!(CredentialStore::new(path).load().is_err());
        }
    }

    mod bug_log_tests {
        use super::*;

        fn fixed_time() -> DateTime<Local> {
            Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
        }

        #[test]
        fn test_markdown_block() {
            let report = BugReport::new("register_forbidden_characters", "Internal error page")
                .at(fixed_time())
                .detail("URL", "https://shop.test/errorpage.htm")
                .detail("Note", "   ");
            let md = report.to_markdown();
            assert!(md.contains("## Bug – 2026-03-14 09:26:53"));
            assert!(md.contains("- **Test:** `register_forbidden_characters`"));
            assert!(md.contains("- **URL:** https://shop.test/errorpage.htm"));
            assert!(!md.contains("Note"));
        }

        #[test]
        fn test_header_written_once() {
            let dir = tempfile::tempdir().unwrap();
            let log = BugLog::new(dir.path().join("bugs.md"));
            log.record(&BugReport::new("a", "first")).unwrap();
            log.record(&BugReport::new("b", "second")).unwrap();
            let content = fs::read_to_string(log.path()).unwrap();
            assert_eq!(content.matches("# Detected bugs").count(), 1);
            assert!(content.starts_with("# Detected bugs (automated tests)"));
            let first = content.find("first").unwrap();
            let second = content.find("second").unwrap();
            assert!(first < second);
        }

        #[test]
        fn test_header_written_for_empty_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("bugs.md");
            fs::write(&path, "").unwrap();
            BugLog::new(&path).record(&BugReport::new("a", "s")).unwrap();
            assert!(fs::read_to_string(&path).unwrap().starts_with("# Detected bugs"));
        }
    }

    mod product_name_tests {
        use super::*;

        #[test]
        fn test_names_one_per_line() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("out/names.txt");
            write_product_names(&path, &[" Build your own computer ", "Build your own cheap computer"]).unwrap();
            assert_eq!(
                fs::read_to_string(&path).unwrap(),
                "Build your own computer\nBuild your own cheap computer\n"
            );
            write_product_names::<&str>(&path, &[]).unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), "");
        }
    }
}
