//! 依語言分派「執行」指令。 / Dispatches the Run command by buffer language.
//!
//! Python buffers go through an external interpreter whose output is streamed
//! into the output log; HTML buffers are written to disk and opened in the
//! system browser.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ika_core::{Language, OutputSink};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::executor::{RunError, RunExecutor, RunSpec};

/// Message logged when the buffer is blank.
pub const NOTHING_TO_RUN: &str = "Nothing to run.";
/// Message logged after the browser was asked to open the page.
pub const OPENED_IN_BROWSER: &str = "Opened HTML in browser.";

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to write run file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot build a file URL for {0}")]
    InvalidPath(PathBuf),
    #[error("failed to open browser: {0}")]
    Browser(#[source] io::Error),
}

/// What a run request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    NothingToRun,
    /// The interpreter was started; output keeps arriving through the sink.
    Started { script: PathBuf },
    LaunchFailed,
    BrowserOpened { url: String },
}

/// 外部啟動的抽象。 / The side effects a run performs, abstracted for tests.
pub trait Launcher {
    fn spawn_interpreter(&self, spec: &RunSpec, sink: OutputSink) -> Result<(), RunError>;
    fn open_browser(&self, url: &str) -> io::Result<()>;
}

/// Real processes and the real browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher {
    blocking: bool,
}

impl SystemLauncher {
    /// Returns immediately after spawning; used by the GUI.
    pub fn detached() -> Self {
        Self { blocking: false }
    }

    /// Waits for the interpreter to exit; used by the command line.
    pub fn blocking() -> Self {
        Self { blocking: true }
    }
}

impl Launcher for SystemLauncher {
    fn spawn_interpreter(&self, spec: &RunSpec, sink: OutputSink) -> Result<(), RunError> {
        let handle = RunExecutor::spawn_streaming(spec, sink)?;
        if self.blocking {
            handle.wait()?;
        } else {
            handle.detach();
        }
        Ok(())
    }

    fn open_browser(&self, url: &str) -> io::Result<()> {
        webbrowser::open(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub interpreter: String,
    pub working_dir: PathBuf,
}

impl RunnerConfig {
    pub fn new(interpreter: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            working_dir: working_dir.into(),
        }
    }

    /// 暫存檔位置。 / Fixed temp file for `language` inside the working directory.
    pub fn temp_path(&self, language: Language) -> PathBuf {
        self.working_dir.join(language.temp_file_name())
    }
}

#[derive(Debug)]
pub struct Runner<L> {
    config: RunnerConfig,
    launcher: L,
}

impl<L: Launcher> Runner<L> {
    pub fn new(config: RunnerConfig, launcher: L) -> Self {
        Self { config, launcher }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// 執行目前的緩衝區。 / Runs `text` as a program in `language`.
    pub fn run(
        &self,
        language: Language,
        text: &str,
        sink: &OutputSink,
    ) -> Result<RunOutcome, RunnerError> {
        let code = text.trim();
        if code.is_empty() {
            sink.line(NOTHING_TO_RUN);
            return Ok(RunOutcome::NothingToRun);
        }

        let path = self.config.temp_path(language);
        fs::write(&path, code).map_err(|source| RunnerError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(%language, path = %path.display(), "wrote run file");

        match language {
            Language::Python => Ok(self.run_python(language, path, sink)),
            Language::Html => self.open_html(&path, sink),
        }
    }

    fn run_python(&self, language: Language, script: PathBuf, sink: &OutputSink) -> RunOutcome {
        // The child starts inside the working directory, so the bare file name resolves.
        let spec = RunSpec::new(self.config.interpreter.clone())
            .push_arg(language.temp_file_name())
            .with_working_dir(&self.config.working_dir)
            .with_env("PYTHONUNBUFFERED", "1");
        match self.launcher.spawn_interpreter(&spec, sink.clone()) {
            Ok(()) => {
                info!(interpreter = %self.config.interpreter, "started python run");
                RunOutcome::Started { script }
            }
            Err(err) => {
                warn!(%err, "python launch failed");
                sink.line(format!("[Python Error] {err}"));
                RunOutcome::LaunchFailed
            }
        }
    }

    fn open_html(&self, page: &Path, sink: &OutputSink) -> Result<RunOutcome, RunnerError> {
        let absolute = std::path::absolute(page).map_err(|source| RunnerError::Io {
            path: page.to_path_buf(),
            source,
        })?;
        let url = Url::from_file_path(&absolute)
            .map_err(|()| RunnerError::InvalidPath(absolute.clone()))?
            .to_string();
        self.launcher
            .open_browser(&url)
            .map_err(RunnerError::Browser)?;
        sink.line(OPENED_IN_BROWSER);
        info!(%url, "opened html run in browser");
        Ok(RunOutcome::BrowserOpened { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingLauncher {
        spawned: RefCell<Vec<RunSpec>>,
        opened: RefCell<Vec<String>>,
        fail_spawn: bool,
    }

    impl Launcher for RecordingLauncher {
        fn spawn_interpreter(&self, spec: &RunSpec, sink: OutputSink) -> Result<(), RunError> {
            self.spawned.borrow_mut().push(spec.clone());
            if self.fail_spawn {
                return Err(RunError::Spawn {
                    program: spec.program.clone(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
                });
            }
            sink.line("hello from fake");
            Ok(())
        }

        fn open_browser(&self, url: &str) -> io::Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    fn runner(dir: &Path, launcher: RecordingLauncher) -> Runner<RecordingLauncher> {
        Runner::new(RunnerConfig::new("python3", dir), launcher)
    }

    #[test]
    fn blank_buffer_is_not_run() {
        let dir = tempdir().unwrap();
        let runner = runner(dir.path(), RecordingLauncher::default());
        let (sink, rx) = OutputSink::channel();

        let outcome = runner.run(Language::Python, "  \n\t ", &sink).unwrap();
        assert_eq!(outcome, RunOutcome::NothingToRun);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), ["Nothing to run.\n"]);
        assert!(runner.launcher().spawned.borrow().is_empty());
        assert!(!dir.path().join("__run_temp__.py").exists());
    }

    #[test]
    fn python_run_writes_trimmed_script_and_spawns_interpreter() {
        let dir = tempdir().unwrap();
        let runner = runner(dir.path(), RecordingLauncher::default());
        let (sink, rx) = OutputSink::channel();

        let outcome = runner
            .run(Language::Python, "\n\nprint('hi')\n\n", &sink)
            .unwrap();
        let script = dir.path().join("__run_temp__.py");
        assert_eq!(outcome, RunOutcome::Started { script: script.clone() });
        assert_eq!(fs::read_to_string(&script).unwrap(), "print('hi')");

        let spawned = runner.launcher().spawned.borrow();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].program, "python3");
        assert_eq!(spawned[0].args, ["__run_temp__.py"]);
        assert_eq!(spawned[0].working_dir.as_deref(), Some(dir.path()));
        assert_eq!(spawned[0].env["PYTHONUNBUFFERED"], "1");
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), ["hello from fake\n"]);
    }

    #[test]
    fn launch_failure_is_reported_in_output() {
        let dir = tempdir().unwrap();
        let launcher = RecordingLauncher {
            fail_spawn: true,
            ..RecordingLauncher::default()
        };
        let runner = runner(dir.path(), launcher);
        let (sink, rx) = OutputSink::channel();

        let outcome = runner.run(Language::Python, "print(1)", &sink).unwrap();
        assert_eq!(outcome, RunOutcome::LaunchFailed);
        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[Python Error] "));
    }

    #[test]
    fn html_run_opens_browser_once_without_interpreter() {
        let dir = tempdir().unwrap();
        let runner = runner(dir.path(), RecordingLauncher::default());
        let (sink, rx) = OutputSink::channel();

        let outcome = runner
            .run(Language::Html, "  <h1>Hi</h1>  ", &sink)
            .unwrap();
        assert!(runner.launcher().spawned.borrow().is_empty());
        let opened = runner.launcher().opened.borrow();
        assert_eq!(opened.len(), 1);
        assert!(opened[0].starts_with("file://"));
        assert!(opened[0].ends_with("__run_temp__.html"));
        assert_eq!(
            outcome,
            RunOutcome::BrowserOpened {
                url: opened[0].clone()
            }
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("__run_temp__.html")).unwrap(),
            "<h1>Hi</h1>"
        );
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), ["Opened HTML in browser.\n"]);
    }

    #[test]
    fn unwritable_run_dir_propagates_io_error() {
        let dir = tempdir().unwrap();
        let runner = runner(&dir.path().join("missing"), RecordingLauncher::default());
        let (sink, _rx) = OutputSink::channel();
        assert!(matches!(
            runner.run(Language::Python, "print(1)", &sink),
            Err(RunnerError::Io { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn system_launcher_streams_real_interpreter_output() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(RunnerConfig::new("sh", dir.path()), SystemLauncher::blocking());
        let (sink, rx) = OutputSink::channel();

        let outcome = runner
            .run(Language::Python, "echo first\necho oops 1>&2\necho second", &sink)
            .unwrap();
        assert!(matches!(outcome, RunOutcome::Started { .. }));
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            ["first\n", "oops\n", "second\n"]
        );
    }

    /// Spells `path` relative to the test process's working directory.
    #[cfg(unix)]
    fn relative_to_cwd(path: &Path) -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        let mut relative = PathBuf::new();
        for _ in cwd.components().skip(1) {
            relative.push("..");
        }
        relative.join(path.strip_prefix("/").unwrap())
    }

    #[cfg(unix)]
    #[test]
    fn relative_run_dir_finds_the_script() {
        let dir = tempdir().unwrap();
        let relative = relative_to_cwd(dir.path());
        assert!(relative.is_relative());
        let runner = Runner::new(RunnerConfig::new("sh", &relative), SystemLauncher::blocking());
        let (sink, rx) = OutputSink::channel();

        let outcome = runner.run(Language::Python, "echo hello", &sink).unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Started {
                script: relative.join("__run_temp__.py")
            }
        );
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), ["hello\n"]);
    }

    #[test]
    fn system_launcher_reports_missing_interpreter() {
        let dir = tempdir().unwrap();
        let runner = Runner::new(
            RunnerConfig::new("ika-no-such-interpreter", dir.path()),
            SystemLauncher::blocking(),
        );
        let (sink, rx) = OutputSink::channel();
        let outcome = runner.run(Language::Python, "print(1)", &sink).unwrap();
        assert_eq!(outcome, RunOutcome::LaunchFailed);
        let text: String = rx.try_iter().collect();
        assert!(text.starts_with("[Python Error] failed to spawn ika-no-such-interpreter"));
    }
}
