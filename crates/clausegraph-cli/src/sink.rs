//! JSON result sink writing to a file or stdout.

use crate::error::CliError;
use clausegraph_extractor::{ResultDocument, ResultSink};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Where serialized results go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    /// Standard output
    Stdout,
    /// A file, created or truncated
    File(PathBuf),
}

/// Writes each result as one JSON document.
#[derive(Debug, Clone)]
pub struct JsonSink {
    target: SinkTarget,
    pretty: bool,
}

impl JsonSink {
    /// Create a sink.
    pub fn new(target: SinkTarget, pretty: bool) -> Self {
        Self { target, pretty }
    }

    /// Sink for an optional output path, stdout when `None`.
    pub fn for_output(output: Option<PathBuf>, pretty: bool) -> Self {
        let target = output.map(SinkTarget::File).unwrap_or(SinkTarget::Stdout);
        Self::new(target, pretty)
    }

    /// Configured target.
    pub fn target(&self) -> &SinkTarget {
        &self.target
    }
}

impl ResultSink for JsonSink {
    type Error = CliError;

    fn persist(&mut self, document: &ResultDocument) -> Result<(), CliError> {
        let json = if self.pretty {
            document.to_json_pretty()?
        } else {
            document.to_json()?
        };

        match &self.target {
            SinkTarget::Stdout => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", json)?;
                stdout.flush()?;
            }
            SinkTarget::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, format!("{}\n", json))?;
            }
        }
        Ok(())
    }
}
