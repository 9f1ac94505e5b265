//! # APS Nodes - Autodesk Platform Services workflow steps
//!
//! Workflow nodes over the APS REST APIs (Object Storage Service, Data
//! Management, Model Derivative) and the response normalization layer that
//! turns their heterogeneous payloads into flat records.
//!
//! ## Modules
//!
//! - **normalize**: flatten JSON:API entities and shape responses into items
//! - **nodes**: resource/operation dispatch onto caller-supplied APS clients
//! - **credentials**: OAuth2 credential profiles and token lookup
//!
//! ## Quick Start
//!
//! ```rust
//! use aps_nodes::{normalize, Normalized};
//! use serde_json::json;
//!
//! let raw = json!({
//!     "content": {
//!         "data": {
//!             "id": "urn:1",
//!             "type": "folders",
//!             "attributes": {"name": "Root"},
//!             "links": {"self": {"href": "https://x/f/1"}}
//!         }
//!     }
//! });
//!
//! let out = normalize(raw, false, true);
//! assert_eq!(
//!     out,
//!     Normalized::Single(json!({
//!         "id": "urn:1",
//!         "type": "folders",
//!         "href": "https://x/f/1",
//!         "name": "Root"
//!     }))
//! );
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::{BufRead, Write};

pub mod credentials;
pub mod error;
pub mod nodes;
pub mod normalize;
pub mod types;

// Re-export commonly used types for convenience
pub use credentials::{CredentialProfile, CredentialResolver, StaticCredentials};
pub use error::{ApiError, NodeError};
pub use nodes::{ApsNode, ClientFactory, InputItem, NodeRunner, NodeSettings, OutputItem};
pub use normalize::{flatten, flatten_entity, normalize, Normalizer, Payload, RecordWriter};
pub use types::{success_marker, NormalizeOptions, Normalized, Record};

/// Normalize a stream of newline-delimited raw payloads.
///
/// Blank lines are skipped. Returns the number of records written.
pub fn normalize_json<R: BufRead, W: Write>(
    reader: R,
    writer: &mut RecordWriter<W>,
    options: NormalizeOptions,
) -> Result<usize> {
    let normalizer = Normalizer::new(options);
    let before = writer.written();

    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse JSON on line {}", number + 1))?;

        writer.write_normalized(normalizer.normalize(value))?;
    }

    Ok(writer.written() - before)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_json_stream() {
        let input = concat!(
            "{\"content\": {\"data\": [{\"id\": \"a\", \"type\": \"hubs\"}, {\"id\": \"b\", \"type\": \"hubs\"}]}}\n",
            "\n",
            "null\n",
            "{\"items\": [{\"objectKey\": \"x\"}]}\n",
        );

        let mut writer = RecordWriter::new(Vec::new());
        let count = normalize_json(input.as_bytes(), &mut writer, NormalizeOptions::default()).unwrap();
        assert_eq!(count, 4);

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "{\"id\":\"a\",\"type\":\"hubs\"}");
        assert_eq!(lines[2], "{\"success\":true}");
        assert_eq!(lines[3], "{\"objectKey\":\"x\"}");
    }

    #[test]
    fn test_normalize_json_reports_bad_line() {
        let mut writer = RecordWriter::new(Vec::new());
        let err = normalize_json("{}\nnot json\n".as_bytes(), &mut writer, NormalizeOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
