//! 外部程式的串流執行。 / Streaming execution of external programs.
//!
//! stdout and stderr share one pipe, so a single reader thread forwards the
//! lines into an [`OutputSink`] in the order the process wrote them.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use ika_core::OutputSink;
use os_pipe::{PipeReader, PipeWriter};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that may surface while launching or supervising a process.
/// （啟動或監看進程時可能發生的錯誤。）
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create output pipe: {0}")]
    Pipe(std::io::Error),
    #[error("failed to wait for process: {0}")]
    Wait(std::io::Error),
}

/// Command description handed to [`RunExecutor`].
/// （指令設定資料結構。）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl RunSpec {
    /// Creates a new command pointing at the given program.
    /// （以指定的程式建立指令設定。）
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    /// Appends an argument to the command.
    /// （為指令加入一個參數。）
    pub fn push_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Registers an environment variable override.
    /// （設定環境變數覆寫值。）
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets the working directory.
    /// （設定指令執行的工作目錄。）
    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    fn command(&self, output: PipeWriter) -> Result<Command, RunError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.stdin(Stdio::null());
        command.stdout(output.try_clone().map_err(RunError::Pipe)?);
        command.stderr(output);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        Ok(command)
    }
}

/// A running process whose output is being pumped into a sink.
/// （輸出正被轉送中的執行中進程。）
#[derive(Debug)]
pub struct StreamHandle {
    child: Child,
    pump: Option<JoinHandle<()>>,
}

impl StreamHandle {
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Blocks until the process exits and its output is drained.
    pub fn wait(mut self) -> Result<ExitStatus, RunError> {
        let status = self.child.wait().map_err(RunError::Wait)?;
        if let Some(pump) = self.pump.take() {
            if pump.join().is_err() {
                warn!("output pump thread panicked");
            }
        }
        debug!(%status, "process finished");
        Ok(status)
    }

    /// Hands the process to a supervisor thread that reaps it on exit.
    /// No timeout applies: the process runs to completion or indefinitely.
    pub fn detach(self) {
        let pid = self.id();
        thread::spawn(move || match self.wait() {
            Ok(status) => debug!(pid, %status, "detached process exited"),
            Err(err) => warn!(pid, %err, "detached process could not be reaped"),
        });
    }
}

/// Launches commands described by a [`RunSpec`].
/// （依照設定執行指令的主要元件。）
pub struct RunExecutor;

impl RunExecutor {
    /// 啟動進程並逐行轉送 stdout/stderr。 / Spawns the command and forwards every stdout/stderr line into `sink`.
    pub fn spawn_streaming(spec: &RunSpec, sink: OutputSink) -> Result<StreamHandle, RunError> {
        let (reader, writer) = os_pipe::pipe().map_err(RunError::Pipe)?;
        let mut command = spec.command(writer)?;
        let child = command.spawn().map_err(|source| RunError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        // The reader only sees EOF once every write end outside the child is closed.
        drop(command);
        debug!(program = %spec.program, pid = child.id(), "spawned process");

        Ok(StreamHandle {
            child,
            pump: Some(spawn_pump(reader, sink)),
        })
    }
}

fn spawn_pump(stream: PipeReader, sink: OutputSink) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if !sink.send(String::from_utf8_lossy(&line).into_owned()) {
                        break;
                    }
                }
                Err(err) => {
                    warn!(%err, "failed to read process output");
                    break;
                }
            }
        }
    })
}
