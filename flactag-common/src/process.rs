//! External command-line tool invocation
//!
//! The tag-editing binaries are opaque collaborators: a program and its
//! arguments go in, an exit status and captured output come out. Everything
//! that spawns a tool goes through [`ToolRunner`] so the callers can be
//! exercised against a recording fake.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::Command;

/// Captured result of one tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    /// Raw standard output
    pub stdout: Vec<u8>,
    /// Raw standard error
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Successful exit with the given stdout
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// Failed exit with the given code and stderr
    pub fn failure(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// True when the tool exited with status 0
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Standard error decoded lossily, trimmed
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// One external tool invocation: a program and its argument list
///
/// Arguments go to the process as-is, never through a shell. Alongside the
/// argument list a printable command line is kept for logs, with paths and
/// free text quoted by [`quote_arg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
    command_line: String,
}

impl ToolCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            command_line: program.to_string(),
        }
    }

    /// Literal flag, logged unquoted
    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.into());
        self.push_display(arg);
        self
    }

    /// Free-text argument, logged quoted
    pub fn text(mut self, text: &str) -> Self {
        self.args.push(text.into());
        self.push_display(&quote_arg(text));
        self
    }

    /// Path argument, logged quoted
    pub fn path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_owned());
        self.push_display(&quote_path(path));
        self
    }

    /// `<flag><path>` as a single argument, e.g. `--import-tags-from=<tmp>`
    pub fn flag_path(mut self, flag: &str, path: &Path) -> Self {
        let mut arg = OsString::from(flag);
        arg.push(path.as_os_str());
        self.args.push(arg);
        self.push_display(&format!("{}{}", flag, quote_path(path)));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Printable form for logs; not meant to be fed to a shell
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    fn push_display(&mut self, part: &str) {
        self.command_line.push(' ');
        self.command_line.push_str(part);
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line)
    }
}

/// Runs one tool invocation to completion
///
/// `Err` means the program could not be launched at all; a non-zero exit is
/// reported through [`ToolOutput::code`].
pub trait ToolRunner {
    fn run(&self, command: &ToolCommand) -> std::io::Result<ToolOutput>;
}

impl<R: ToolRunner + ?Sized> ToolRunner for &R {
    fn run(&self, command: &ToolCommand) -> std::io::Result<ToolOutput> {
        (**self).run(command)
    }
}

/// Spawns the program directly with its argument list, blocking until exit
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, command: &ToolCommand) -> std::io::Result<ToolOutput> {
        let output = Command::new(command.program())
            .args(command.args())
            .output()?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Quote a path for a logged command line
///
/// Double quotes, unless the path itself contains a double quote, in which
/// case single quotes. Display only: the spawned process gets the raw path.
pub fn quote_path(path: &Path) -> String {
    quote_arg(&path.to_string_lossy())
}

/// Quote a single argument with the same policy as [`quote_path`]
pub fn quote_arg(arg: &str) -> String {
    if arg.contains('"') {
        format!("'{}'", arg)
    } else {
        format!("\"{}\"", arg)
    }
}
