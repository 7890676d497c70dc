//! 輸出記錄：背景執行緒送入，UI 執行緒收取。 / Output log fed from background threads and drained on the UI thread.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Callback used to wake the UI loop after a line was queued.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// 可跨執行緒傳遞的輸出端。 / Cloneable producer half handed to background workers.
#[derive(Clone)]
pub struct OutputSink {
    tx: Sender<String>,
    waker: Option<Waker>,
}

impl OutputSink {
    /// Creates a detached sink together with its receiving end.
    pub fn channel() -> (Self, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx, waker: None }, rx)
    }

    /// Queues raw text. Returns `false` once the consumer is gone.
    pub fn send(&self, text: impl Into<String>) -> bool {
        let delivered = self.tx.send(text.into()).is_ok();
        if delivered {
            if let Some(waker) = &self.waker {
                waker();
            }
        }
        delivered
    }

    /// Queues `text` terminated by a newline.
    pub fn line(&self, text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        if text.ends_with('\n') {
            self.send(text)
        } else {
            self.send(format!("{text}\n"))
        }
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("waker", &self.waker.is_some())
            .finish()
    }
}

/// 單執行緒擁有的輸出文字。 / Output pane text, owned by the UI thread.
pub struct OutputLog {
    text: String,
    tx: Sender<String>,
    rx: Receiver<String>,
    waker: Option<Waker>,
}

impl Default for OutputLog {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputLog {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            text: String::new(),
            tx,
            rx,
            waker: None,
        }
    }

    /// Installs a callback every sink created afterwards pokes on send.
    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    pub fn sink(&self) -> OutputSink {
        OutputSink {
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        }
    }

    /// Appends directly from the owning thread, after anything already queued.
    pub fn append(&mut self, text: impl AsRef<str>) {
        self.drain();
        self.text.push_str(text.as_ref());
    }

    /// Appends `text` plus a trailing newline when it lacks one.
    pub fn append_line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        self.append(text);
        if !text.ends_with('\n') {
            self.text.push('\n');
        }
    }

    /// 取出佇列中的輸出並依到達順序附加。 / Moves queued output into the log in arrival order; returns how many chunks were taken.
    pub fn drain(&mut self) -> usize {
        let mut taken = 0;
        while let Ok(chunk) = self.rx.try_recv() {
            self.text.push_str(&chunk);
            taken += 1;
        }
        taken
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    pub fn clear(&mut self) {
        self.drain();
        self.text.clear();
    }
}

impl fmt::Debug for OutputLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputLog")
            .field("len", &self.text.len())
            .finish()
    }
}
