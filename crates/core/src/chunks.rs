//! 片段編輯器：將多段文字組合成單一檔案。 / Chunk composer: builds a buffer out of independent fragments.

use thiserror::Error;

/// Smallest number of fragments a chunk set may hold.
pub const MIN_CHUNKS: usize = 1;
/// Largest number of fragments a chunk set may hold.
pub const MAX_CHUNKS: usize = 20;

const SEPARATOR: &str = "\n\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk count must be between 1 and 20, got {0}")]
    CountOutOfRange(usize),
    #[error("no chunks to stitch")]
    NothingToStitch,
}

/// 固定數量的文字片段集合。 / Ordered, fixed-size set of text fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSet {
    fragments: Vec<String>,
}

impl ChunkSet {
    /// 建立 `count` 個空白片段（1 到 20）。 / Allocates `count` empty fragments; `count` must be in 1..=20.
    pub fn create(count: usize) -> Result<Self, ChunkError> {
        if !(MIN_CHUNKS..=MAX_CHUNKS).contains(&count) {
            return Err(ChunkError::CountOutOfRange(count));
        }
        Ok(Self {
            fragments: vec![String::new(); count],
        })
    }

    /// Builds a set from existing fragments, applying the same count bounds.
    pub fn from_fragments<I, S>(fragments: I) -> Result<Self, ChunkError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fragments: Vec<String> = fragments.into_iter().map(Into::into).collect();
        if !(MIN_CHUNKS..=MAX_CHUNKS).contains(&fragments.len()) {
            return Err(ChunkError::CountOutOfRange(fragments.len()));
        }
        Ok(Self { fragments })
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fragments.get(index).map(String::as_str)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut String> {
        self.fragments.get_mut(index)
    }

    /// Overwrites fragment `index`; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, text: impl Into<String>) {
        if let Some(fragment) = self.fragments.get_mut(index) {
            *fragment = text.into();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(String::as_str)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.fragments.iter_mut()
    }

    /// 修剪並串接非空片段，以空白行分隔。 / Trims every fragment, drops empty ones and joins the rest with a blank line.
    pub fn stitch(&self) -> Result<String, ChunkError> {
        let parts: Vec<&str> = self
            .fragments
            .iter()
            .map(|fragment| fragment.trim())
            .filter(|fragment| !fragment.is_empty())
            .collect();
        if parts.is_empty() {
            return Err(ChunkError::NothingToStitch);
        }
        Ok(parts.join(SEPARATOR))
    }
}
