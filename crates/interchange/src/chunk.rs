//! Transport chunking for size-limited storage.
//!
//! Serialized snapshots can exceed what a single storage slot accepts. A
//! payload is split into ordered chunks of at most `chunk_size` characters,
//! stored under `<prefix>_chunk_<i>` with the count under
//! `<prefix>_chunk_count`, and rejoined by in-order concatenation before
//! JSON parsing.

/// Historical chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 90_000;

/// Chunking parameters. The key prefix is always explicit; nothing here
/// reads ambient configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub key_prefix: String,
}

impl ChunkConfig {
    pub fn new(key_prefix: impl Into<String>) -> Self {
        ChunkConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            key_prefix: key_prefix.into(),
        }
    }

    pub fn chunk_key(&self, index: usize) -> String {
        format!("{}_chunk_{}", self.key_prefix, index)
    }

    pub fn count_key(&self) -> String {
        format!("{}_chunk_count", self.key_prefix)
    }
}

/// Errors when reassembling a chunked payload from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("missing chunk count under '{0}'")]
    MissingCount(String),
    #[error("invalid chunk count '{value}' under '{key}'")]
    InvalidCount { key: String, value: String },
    #[error("missing chunk {index} of {count} under '{key}'")]
    MissingChunk {
        key: String,
        index: usize,
        count: usize,
    },
}

/// An ordered sequence of chunks plus the metadata stored alongside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedPayload {
    pub chunks: Vec<String>,
}

impl ChunkedPayload {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Rejoin the chunks into the original payload.
    pub fn join(&self) -> String {
        join_chunks(&self.chunks)
    }

    /// Key/value pairs to write to storage, count entry last.
    pub fn storage_entries(&self, config: &ChunkConfig) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (config.chunk_key(i), c.clone()))
            .collect();
        entries.push((config.count_key(), self.chunk_count().to_string()));
        entries
    }

    /// Read a chunked payload back through a storage lookup.
    pub fn from_storage<F>(config: &ChunkConfig, lookup: F) -> Result<Self, ChunkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let count_key = config.count_key();
        let raw_count =
            lookup(&count_key).ok_or_else(|| ChunkError::MissingCount(count_key.clone()))?;
        let count: usize = raw_count
            .trim()
            .parse()
            .map_err(|_| ChunkError::InvalidCount {
                key: count_key.clone(),
                value: raw_count.clone(),
            })?;

        // The count comes from storage, so chunks are only allocated as
        // they are found.
        let mut chunks = Vec::new();
        for index in 0..count {
            let key = config.chunk_key(index);
            let chunk = lookup(&key).ok_or(ChunkError::MissingChunk { key, index, count })?;
            chunks.push(chunk);
        }
        Ok(ChunkedPayload { chunks })
    }
}

/// Split a payload into chunks of at most `chunk_size` characters.
///
/// Boundaries fall on character boundaries, never inside a UTF-8 code
/// point. An empty payload yields a single empty chunk so the stored count
/// is never zero. A `chunk_size` of zero is treated as one.
pub fn split_chunks(payload: &str, chunk_size: usize) -> ChunkedPayload {
    let size = chunk_size.max(1);
    if payload.is_empty() {
        return ChunkedPayload {
            chunks: vec![String::new()],
        };
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars_in_chunk = 0;
    for (offset, _) in payload.char_indices() {
        if chars_in_chunk == size {
            chunks.push(payload[start..offset].to_string());
            start = offset;
            chars_in_chunk = 0;
        }
        chars_in_chunk += 1;
    }
    chunks.push(payload[start..].to_string());

    ChunkedPayload { chunks }
}

/// Concatenate chunks in order.
pub fn join_chunks<S: AsRef<str>>(chunks: &[S]) -> String {
    let total = chunks.iter().map(|c| c.as_ref().len()).sum();
    let mut out = String::with_capacity(total);
    for chunk in chunks {
        out.push_str(chunk.as_ref());
    }
    out
}
