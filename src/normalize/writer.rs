use crate::types::Normalized;
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;

/// Writes normalized output as JSON Lines, one record per line
pub struct RecordWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        RecordWriter { writer, written: 0 }
    }

    /// Fan out and write every record of one normalized result
    pub fn write_normalized(&mut self, normalized: Normalized) -> Result<()> {
        for record in normalized.into_items() {
            self.write_record(&record)?;
        }
        Ok(())
    }

    pub fn write_record(&mut self, record: &Value) -> Result<()> {
        let json = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(self.writer, "{}", json).context("Failed to write record")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_writes_one_line_per_item() {
        let mut writer = RecordWriter::new(Vec::new());
        writer
            .write_normalized(Normalized::Items(vec![json!({"a": 1}), json!({"a": 2})]))
            .unwrap();
        writer
            .write_normalized(Normalized::Single(json!({"success": true})))
            .unwrap();

        assert_eq!(writer.written(), 3);
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, "{\"a\":1}\n{\"a\":2}\n{\"success\":true}\n");
    }
}
