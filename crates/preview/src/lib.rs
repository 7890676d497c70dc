//! HTML 即時預覽。 / Debounced HTML live preview.

mod debounce;
mod renderer;

pub use debounce::Debouncer;
pub use renderer::{PreviewError, PreviewRenderer, PreviewSurface, TextEchoSurface};
