//! Audio chunks and the per-session chunk buffer

/// An opaque, time-ordered increment of encoded audio data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    data: Vec<u8>,
}

impl AudioChunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for AudioChunk {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for AudioChunk {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

/// Append-only, arrival-ordered sequence of chunks for one recording session.
///
/// Consumed exactly once by [`ChunkBuffer::concat`].
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    chunks: Vec<AudioChunk>,
    total_bytes: usize,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Empty chunks carry no data and are dropped.
    /// Returns whether the chunk was kept.
    pub fn push(&mut self, chunk: AudioChunk) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    /// Number of chunks kept so far
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total bytes across all kept chunks
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Concatenate all chunks in arrival order
    pub fn concat(self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.total_bytes);
        for chunk in self.chunks {
            data.extend_from_slice(chunk.data());
        }
        data
    }
}
