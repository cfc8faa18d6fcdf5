//! Recording stand-in for the external tag tools
//!
//! Answers each invocation by matching its logged command line against a list
//! of `(substring, output)` rules, first match wins, default success with
//! empty output. Every command line is recorded. When a `metaflac` import
//! runs, the temp tag file it names is read and kept, since the store deletes
//! it right after the call.

use flactag_common::{ToolCommand, ToolOutput, ToolRunner};
use std::cell::RefCell;

const IMPORT_FLAG: &str = "--import-tags-from=";

#[derive(Default)]
pub struct FakeRunner {
    responses: Vec<(String, Response)>,
    calls: RefCell<Vec<String>>,
    imported: RefCell<Vec<String>>,
}

enum Response {
    Output(ToolOutput),
    LaunchError,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer command lines containing `pattern` with `output`
    pub fn respond(mut self, pattern: &str, output: ToolOutput) -> Self {
        self.responses
            .push((pattern.to_string(), Response::Output(output)));
        self
    }

    /// Fail to launch command lines containing `pattern`
    pub fn fail_launch(mut self, pattern: &str) -> Self {
        self.responses
            .push((pattern.to_string(), Response::LaunchError));
        self
    }

    /// Every command line run so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Command lines containing `pattern`
    pub fn calls_matching(&self, pattern: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.contains(pattern))
            .collect()
    }

    /// Contents of each temp tag file handed to an import, in call order
    pub fn imported(&self) -> Vec<String> {
        self.imported.borrow().clone()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, command: &ToolCommand) -> std::io::Result<ToolOutput> {
        let command_line = command.command_line();
        self.calls.borrow_mut().push(command_line.to_string());

        if let Some(path) = import_path(command) {
            self.imported
                .borrow_mut()
                .push(std::fs::read_to_string(path)?);
        }

        for (pattern, response) in &self.responses {
            if command_line.contains(pattern.as_str()) {
                return match response {
                    Response::Output(output) => Ok(output.clone()),
                    Response::LaunchError => Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "command not found",
                    )),
                };
            }
        }

        Ok(ToolOutput::success(Vec::new()))
    }
}

/// Temp file path handed to an import, straight from the argument list
fn import_path(command: &ToolCommand) -> Option<&str> {
    command
        .args()
        .iter()
        .find_map(|arg| arg.to_str()?.strip_prefix(IMPORT_FLAG))
}
