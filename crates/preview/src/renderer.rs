use std::time::{Duration, Instant};

use ika_core::Language;
use thiserror::Error;
use tracing::debug;

use crate::debounce::Debouncer;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("preview engine rejected the document: {0}")]
    Engine(String),
}

/// 顯示預覽內容的介面。 / Something that can display a markup document.
pub trait PreviewSurface {
    fn load_html(&mut self, html: &str) -> Result<(), PreviewError>;

    /// `true` when markup is rendered, `false` for a plain-text echo.
    fn is_rendered(&self) -> bool;
}

/// 無 HTML 引擎時的退化版本：直接顯示原始標記。 /
/// Degraded fallback used when no embeddable HTML engine exists: echoes the raw markup.
#[derive(Debug, Clone, Default)]
pub struct TextEchoSurface {
    text: String,
}

impl TextEchoSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the echoed markup.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl PreviewSurface for TextEchoSurface {
    fn load_html(&mut self, html: &str) -> Result<(), PreviewError> {
        self.text.clear();
        self.text.push_str(html);
        Ok(())
    }

    fn is_rendered(&self) -> bool {
        false
    }
}

/// 防抖的預覽更新器。 / Feeds the buffer into a surface after a quiet period.
#[derive(Debug)]
pub struct PreviewRenderer<S> {
    surface: S,
    debouncer: Debouncer,
}

impl<S: PreviewSurface> PreviewRenderer<S> {
    pub fn new(surface: S, delay: Duration) -> Self {
        Self {
            surface,
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.debouncer.set_delay(delay);
    }

    /// The preview pane is only shown for markup buffers.
    pub fn visible(language: Language) -> bool {
        language.has_preview()
    }

    /// 編輯後呼叫：僅在 HTML 模式下排程。 / Called after every edit; schedules a render for markup buffers only.
    pub fn on_edit(&mut self, language: Language, now: Instant) {
        if language.has_preview() {
            self.debouncer.schedule(now);
        } else {
            self.debouncer.cancel();
        }
    }

    /// Time until the pending render, used to ask the UI for a timely repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    /// Renders if a scheduled render is due. Returns whether a render happened.
    pub fn tick(&mut self, language: Language, text: &str, now: Instant) -> bool {
        if !self.debouncer.poll(now) || !language.has_preview() {
            return false;
        }
        self.render_now(text);
        true
    }

    /// Renders immediately, cancelling any pending render. Failures are swallowed.
    pub fn render_now(&mut self, text: &str) {
        self.debouncer.cancel();
        if let Err(err) = self.surface.load_html(text) {
            debug!(%err, "preview render failed");
        }
    }
}
