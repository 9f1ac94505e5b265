//! Response normalization - turn heterogeneous APS payloads into flat records
//!
//! APS answers in several shapes: JSON:API documents (`data` holding one
//! resource or a list), OSS listings (`items`), bare arrays and plain
//! objects, sometimes wrapped in an SDK `{ content, response }` envelope.
//! This module classifies the shape once and flattens every resource into
//! a single-level record.

pub mod flatten;
pub mod normalizer;
pub mod payload;
pub mod writer;

pub use flatten::{flatten, flatten_entity, is_json_api, resolve_href};
pub use normalizer::{normalize, Normalizer};
pub use payload::Payload;
pub use writer::RecordWriter;
