//! JSON output adapter.

use anyhow::Result;
use focus_qa_core::{PerImageResult, ResultOutput};
use std::io::{self, Write};
use std::sync::Mutex;

use super::OutputFormat;

/// JSON output adapter.
///
/// In JSON Lines mode every result is written immediately. In JSON mode
/// results are buffered and `flush` writes them as one array.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    format: OutputFormat,
    pretty: bool,
    pending: Mutex<Vec<PerImageResult>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout(format: OutputFormat, pretty: bool) -> Self {
        Self::new(Box::new(io::stdout()), format, pretty)
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
            pretty,
            pending: Mutex::new(Vec::new()),
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_line(&self, json: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }

    /// Writes the buffered results as a JSON array.
    fn write_array(&self) -> Result<()> {
        let results = std::mem::take(
            &mut *self
                .pending
                .lock()
                .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?,
        );
        let json = if self.pretty {
            serde_json::to_string_pretty(&results)?
        } else {
            serde_json::to_string(&results)?
        };
        self.write_line(&json)
    }
}

impl ResultOutput for JsonOutput {
    fn write(&self, result: &PerImageResult) -> Result<()> {
        match self.format {
            OutputFormat::Jsonl => self.write_line(&serde_json::to_string(result)?),
            OutputFormat::Json => {
                self.pending
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
                    .push(result.clone());
                Ok(())
            }
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        if self.format == OutputFormat::Json {
            self.write_array()?;
        }
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use focus_qa_core::{AlgorithmKind, ScoreOutcome};
    use std::sync::Arc;

    /// Writer that shares its buffer with the test.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn result(path: &str) -> PerImageResult {
        PerImageResult {
            path: path.into(),
            timestamp: None,
            algorithm: AlgorithmKind::Composite,
            strategy: None,
            calibrated: false,
            threshold: 30.0,
            outcome: ScoreOutcome::Error {
                message: "kernel error: empty".into(),
            },
        }
    }

    #[test]
    fn test_jsonl_writes_one_line_per_result() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()), OutputFormat::Jsonl, false);

        output.write(&result("a.png")).unwrap();
        output.write(&result("b.png")).unwrap();
        output.flush().unwrap();

        let text = buf.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["path"], "a.png");
        assert_eq!(first["status"], "error");
    }

    #[test]
    fn test_json_buffers_until_flush() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()), OutputFormat::Json, false);

        output.write(&result("a.png")).unwrap();
        assert!(buf.contents().is_empty());
        output.flush().unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&buf.contents()).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_json_empty_batch_is_empty_array() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()), OutputFormat::Json, true);
        output.flush().unwrap();
        assert_eq!(buf.contents().trim(), "[]");
    }
}
