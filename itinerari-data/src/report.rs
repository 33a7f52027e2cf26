//! `Report.txt` file sink.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::File;
use chrono::{Local, NaiveDateTime};
use itinerari_core::{ReportError, ReportSink};

/// File name of the report inside the output directory.
pub const REPORT_FILE_NAME: &str = "Report.txt";

/// Lines written at the top of every report, before the timestamp.
pub const REPORT_BANNER: [&str; 4] = [
    "=====================================",
    "         REPORT DELLE ATTIVITA'       ",
    "=====================================",
    "",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only report file, flushed after every line.
#[derive(Debug)]
pub struct ReportFile {
    path: Utf8PathBuf,
    file: File,
}

impl ReportFile {
    /// Create `{output_dir}/Report.txt`, replacing any previous report, and
    /// write the header stamped with the current local time.
    ///
    /// # Errors
    /// Returns [`ReportError::Create`] when the directory or file cannot be
    /// created and [`ReportError::Write`] when the header cannot be written.
    pub fn create(output_dir: &Utf8Path) -> Result<Self, ReportError> {
        Self::create_at(output_dir, Local::now().naive_local())
    }

    /// Like [`ReportFile::create`] with an explicit generation time.
    ///
    /// # Errors
    /// See [`ReportFile::create`].
    pub fn create_at(output_dir: &Utf8Path, generated: NaiveDateTime) -> Result<Self, ReportError> {
        let path = output_dir.join(REPORT_FILE_NAME);
        let file = itinerari_fs::ensure_dir(output_dir)
            .and_then(|()| itinerari_fs::create_truncated(&path))
            .map_err(|source| ReportError::Create {
                path: path.to_string(),
                source,
            })?;
        let mut report = Self { path, file };
        for line in REPORT_BANNER {
            report.append(line)?;
        }
        report.append(&format!(
            "Report generato il: {}",
            generated.format(TIMESTAMP_FORMAT)
        ))?;
        Ok(report)
    }

    /// Location of the report.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl ReportSink for ReportFile {
    fn append(&mut self, line: &str) -> Result<(), ReportError> {
        writeln!(self.file, "{line}")
            .and_then(|()| self.file.flush())
            .map_err(|source| ReportError::Write { source })
    }
}
