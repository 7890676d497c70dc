//! 程式執行：外部直譯器與瀏覽器。 / Running buffers through an interpreter or the browser.

mod executor;
mod runner;

pub use executor::{RunError, RunExecutor, RunSpec, StreamHandle};
pub use runner::{
    Launcher, RunOutcome, Runner, RunnerConfig, RunnerError, SystemLauncher, NOTHING_TO_RUN,
    OPENED_IN_BROWSER,
};
