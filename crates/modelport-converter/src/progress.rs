//! Progress reporting for a batch run.

use std::io::Write;
use std::path::Path;

use crate::error::ConversionError;
use crate::models::ConversionEntry;
use crate::report::BatchReport;

/// Receives progress events from the converter.
pub trait ProgressReporter: Send {
    /// The batch is about to run in `dir`.
    fn directory(&mut self, dir: &Path);

    /// An entry is about to be converted.
    fn entry(&mut self, entry: &ConversionEntry);

    /// An entry failed and the batch carries on with the next one.
    fn entry_failed(&mut self, _entry: &ConversionEntry, _error: &ConversionError) {}

    /// The batch completed.
    fn done(&mut self, report: &BatchReport);
}

/// Writes the plain-text progress stream:
///
/// ```text
/// /path/to/models
///
/// house.skp >>> house.glb
/// shed.skp >>> shed.glb
///
/// Done.
/// ```
pub struct ConsoleReporter<W: Write + Send> {
    out: W,
}

impl ConsoleReporter<std::io::Stdout> {
    /// Reporter writing to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    /// Reporter writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the reporter and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

// Write failures (closed pipe) must not abort a running batch.
impl<W: Write + Send> ProgressReporter for ConsoleReporter<W> {
    fn directory(&mut self, dir: &Path) {
        let _ = writeln!(self.out, "{}\n", dir.display());
    }

    fn entry(&mut self, entry: &ConversionEntry) {
        let _ = writeln!(self.out, "{} >>> {}", entry.source_name, entry.output_name);
    }

    fn entry_failed(&mut self, entry: &ConversionEntry, error: &ConversionError) {
        let _ = self.out.flush();
        eprintln!("✗ {}: {}", entry.source_name, error);
    }

    fn done(&mut self, _report: &BatchReport) {
        let _ = writeln!(self.out, "\nDone.");
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversionJob;
    use std::path::PathBuf;

    #[test]
    fn test_console_stream() {
        let job = ConversionJob::from_names(
            PathBuf::from("/models"),
            ".skp",
            "obj",
            ["house.skp"],
        );
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.directory(&job.source_directory);
        reporter.entry(&job.entries[0]);
        reporter.done(&BatchReport::new(&job, "dry-run"));

        let text = String::from_utf8(reporter.into_inner()).expect("utf8");
        assert_eq!(text, "/models\n\nhouse.skp >>> house.obj\n\nDone.\n");
    }
}
