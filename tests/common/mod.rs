//! Common test utilities: a recording process runner.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use levitate_fetch::{RunError, Runner};

/// One recorded external-tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub quiet: bool,
}

impl Call {
    /// The invocation as one shell-ish line, for compact assertions.
    pub fn line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Records invocations instead of spawning processes.
///
/// An optional effect hook simulates each tool's filesystem side effects
/// (curl writes the file, clone creates the directory, tar populates the
/// staging area), so strategies observe the world they expect.
pub struct StubRunner {
    pub calls: RefCell<Vec<Call>>,
    missing_tools: HashSet<String>,
    failing_programs: HashSet<String>,
    effect: Box<dyn Fn(&Call)>,
}

impl StubRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            missing_tools: HashSet::new(),
            failing_programs: HashSet::new(),
            effect: Box::new(|_| {}),
        }
    }

    pub fn with_effect(effect: impl Fn(&Call) + 'static) -> Self {
        Self {
            effect: Box::new(effect),
            ..Self::new()
        }
    }

    /// Make `has_tool` report `tool` as absent.
    pub fn without_tool(mut self, tool: &str) -> Self {
        self.missing_tools.insert(tool.to_string());
        self
    }

    /// Make every invocation of `program` fail after its effect ran.
    pub fn failing(mut self, program: &str) -> Self {
        self.failing_programs.insert(program.to_string());
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Call::line).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        quiet: bool,
    ) -> Result<(), RunError> {
        let call = Call {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            cwd: cwd.map(Path::to_path_buf),
            quiet,
        };
        (self.effect)(&call);
        self.calls.borrow_mut().push(call);

        if self.failing_programs.contains(program) {
            return Err(RunError::Exit {
                program: program.to_string(),
                code: Some(1),
            });
        }
        Ok(())
    }
}

impl Runner for StubRunner {
    fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), RunError> {
        self.record(program, args, cwd, false)
    }

    fn run_quiet(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), RunError> {
        self.record(program, args, cwd, true)
    }

    fn has_tool(&self, program: &str) -> bool {
        !self.missing_tools.contains(program)
    }
}
