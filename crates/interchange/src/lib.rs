//! tokensync-interchange: baseline snapshot types and ingestion.
//!
//! A baseline is a complete point-in-time export of a design token graph,
//! keyed by `collection:mode:variableId`. This crate normalizes the wire
//! shapes the design tool has produced over time into one [`TokenEntry`]
//! representation, so downstream consumers (the differ, the reconciler,
//! the migration propagator) never branch on shape.
//!
//! It also carries the byte-level contract of the snapshot transport:
//! splitting large payloads into ordered chunks and rejoining them.

pub mod chunk;
pub mod deserialize;
pub mod types;

pub use chunk::{join_chunks, split_chunks, ChunkConfig, ChunkError, ChunkedPayload};
pub use deserialize::{from_json_str, parse_baseline, to_baseline_json, InterchangeError};
pub use types::*;
