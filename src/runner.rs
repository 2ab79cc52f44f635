//! External command execution.
//!
//! The workflow never spawns processes directly: it hands an argv to a
//! [`CommandRunner`] and inspects the [`CommandOutcome`]. Output is captured
//! line by line and decoded leniently so one bad byte sequence never loses
//! the rest of a failing command's diagnostics.
use log::*;
use std::{
    fmt,
    io::ErrorKind,
    path::PathBuf,
    process::{Command, Output},
};

use crate::error::{ReleaseError, Result};

const BANNER_WIDTH: usize = 25;

/// One line of captured process output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// Line decoded as UTF-8.
    Text(String),
    /// Line that is not valid UTF-8, kept as raw bytes.
    Raw(Vec<u8>),
}

impl OutputLine {
    fn decode(bytes: &[u8]) -> Self {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => OutputLine::Text(text),
            Err(err) => OutputLine::Raw(err.into_bytes()),
        }
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputLine::Text(text) => write!(f, "{text}"),
            OutputLine::Raw(bytes) => write!(f, "b\"{}\"", bytes.escape_ascii()),
        }
    }
}

/// Splits captured output into decoded lines.
///
/// Lines end at `\n`; a `\r` right before it is dropped. A lone `\r` is not
/// a line break and stays inside the line. A trailing newline does not
/// produce an empty final line.
pub fn decode_lines(bytes: &[u8]) -> Vec<OutputLine> {
    if bytes.is_empty() {
        return vec![];
    }

    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);

    bytes
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .map(OutputLine::decode)
        .collect()
}

/// Captured result of one finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<OutputLine>,
    pub stderr: Vec<OutputLine>,
}

impl CommandOutcome {
    /// Outcome of a command that exited with status 0 and printed `stdout`.
    pub fn success(stdout: &str) -> Self {
        Self {
            exit_code: Some(0),
            stdout: decode_lines(stdout.as_bytes()),
            stderr: vec![],
        }
    }

    /// Outcome of a command that exited with `code` and printed `stderr`.
    pub fn failure(code: i32, stderr: &str) -> Self {
        Self {
            exit_code: Some(code),
            stdout: vec![],
            stderr: decode_lines(stderr.as_bytes()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Decoded stdout with every line newline terminated.
    pub fn stdout_text(&self) -> String {
        self.stdout.iter().map(|line| format!("{line}\n")).collect()
    }

    fn exit_code_display(&self) -> String {
        match self.exit_code {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }
}

impl From<Output> for CommandOutcome {
    fn from(output: Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: decode_lines(&output.stdout),
            stderr: decode_lines(&output.stderr),
        }
    }
}

/// Runs external commands to completion.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Runs `argv` and waits for it to exit.
    ///
    /// A non-zero exit is not an error: it is reported through
    /// [`CommandOutcome::succeeded`]. Errors are reserved for commands that
    /// could not be started at all, most notably
    /// [`ReleaseError::ExecutableNotFound`].
    fn run(&self, argv: &[String]) -> Result<CommandOutcome>;
}

/// [`CommandRunner`] spawning real processes.
#[derive(Debug, Default, Clone)]
pub struct SystemCommandRunner {
    current_dir: Option<PathBuf>,
}

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every command inside `dir` instead of the process's working
    /// directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: Some(dir.into()),
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutcome> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ReleaseError::invalid_config("empty command"))?;

        debug!("running {argv:?}");

        let mut command = Command::new(program);
        command.args(args);

        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let output = match command.output() {
            Ok(output) => output,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                error!("Executable \"{program}\" was not found!");
                error!("Full command: {argv:?}");
                return Err(ReleaseError::executable_not_found(argv));
            }
            Err(err) => return Err(err.into()),
        };

        let outcome = CommandOutcome::from(output);

        if !outcome.succeeded() {
            for line in failure_report(argv, &outcome) {
                error!("{line}");
            }
        }

        Ok(outcome)
    }
}

/// Diagnostic lines describing a failed command.
pub fn failure_report(argv: &[String], outcome: &CommandOutcome) -> Vec<String> {
    let code = outcome.exit_code_display();
    let mut report = vec![
        format!("Command {argv:?}"),
        format!("Failed with exit code {code}"),
    ];

    report.extend(stream_report("stdout", &outcome.stdout));
    report.extend(stream_report("stderr", &outcome.stderr));
    report.push(format!("Command {argv:?} failed with exit code {code}"));

    report
}

fn stream_report(name: &str, lines: &[OutputLine]) -> Vec<String> {
    if lines.is_empty() {
        let mut label = name.to_string();
        label[..1].make_ascii_uppercase();
        return vec![format!("{label}: <empty>")];
    }

    let start = "*".repeat(BANNER_WIDTH);
    let end = "*".repeat(BANNER_WIDTH + 1);

    let mut report = vec![format!("{start} start {name} {start}")];
    report.extend(lines.iter().map(|line| line.to_string()));
    report.push(format!("{end} end {name} {end}"));
    report
}
