use crate::utils::error::Result;
use chrono::{DateTime, Local, TimeZone};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Append-only progress log. Each line is `<timestamp> : <message>`.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, message: &str) -> Result<()> {
        self.log_at(Local::now(), message)
    }

    pub fn log_at<Tz: TimeZone>(&self, at: DateTime<Tz>, message: &str) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        tracing::info!("📝 {}", message);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_line(&at, message))?;
        Ok(())
    }
}

pub fn format_line<Tz: TimeZone>(at: &DateTime<Tz>, message: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{} : {}", at.format(TIMESTAMP_FORMAT), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_format_line_uses_month_abbreviation() {
        let at = Utc.with_ymd_and_hms(2023, 9, 2, 18, 53, 26).unwrap();
        assert_eq!(
            format_line(&at, "Process Complete."),
            "2023-Sep-02-18:53:26 : Process Complete."
        );
    }

    #[test]
    fn test_log_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log = ProgressLog::new(temp_dir.path().join("logs").join("progress.txt"));

        let at = Utc.with_ymd_and_hms(2024, 1, 5, 7, 8, 9).unwrap();
        log.log_at(at, "first").unwrap();
        log.log_at(at, "second").unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "2024-Jan-05-07:08:09 : first\n2024-Jan-05-07:08:09 : second\n"
        );
    }
}
