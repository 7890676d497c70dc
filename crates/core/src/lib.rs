pub mod chunks;
pub mod document;
pub mod editor;
pub mod language;
pub mod output;

pub use chunks::{ChunkError, ChunkSet, MAX_CHUNKS, MIN_CHUNKS};
pub use document::{line_count, Document, DocumentError, LineEnding};
pub use editor::{char_to_byte, Caret, Selection};
pub use language::{Language, UnknownLanguage};
pub use output::{OutputLog, OutputSink, Waker};
