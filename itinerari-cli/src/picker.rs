//! Interactive fallback for paths missing from the configuration.

use std::io::{self, BufRead, Write};

use camino::{Utf8Path, Utf8PathBuf};

/// Asks the operator for the paths a run needs.
///
/// `Ok(None)` means the operator cancelled the selection.
pub(crate) trait PathPicker {
    /// Choose the directory receiving `Report.txt` and `logging.log`.
    fn pick_output_dir(&mut self, initial: &Utf8Path) -> io::Result<Option<Utf8PathBuf>>;
    /// Choose the XML export to audit.
    fn pick_xml_file(&mut self, initial: &Utf8Path) -> io::Result<Option<Utf8PathBuf>>;
}

/// Line-oriented prompt over any reader/writer pair.
pub(crate) struct PromptPicker<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub(crate) const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<Utf8PathBuf>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        let trimmed = answer.trim();
        Ok((!trimmed.is_empty()).then(|| Utf8PathBuf::from(trimmed)))
    }
}

impl<R: BufRead, W: Write> PathPicker for PromptPicker<R, W> {
    fn pick_output_dir(&mut self, initial: &Utf8Path) -> io::Result<Option<Utf8PathBuf>> {
        self.ask(&format!(
            "Inserisci percorso directory di output (default: {initial}): "
        ))
    }

    fn pick_xml_file(&mut self, initial: &Utf8Path) -> io::Result<Option<Utf8PathBuf>> {
        self.ask(&format!("Inserisci percorso file XML (default: {initial}): "))
    }
}
