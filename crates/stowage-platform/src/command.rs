use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Output, Stdio};

#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    program: String,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            inner: StdCommand::new(&program),
            program,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    /// Feed the child's stdin from the file at `path`.
    pub fn stdin_file(mut self, path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::Redirect {
            cmd: self.program.clone(),
            stream: "stdin",
            source: e,
        })?;
        self.inner.stdin(Stdio::from(file));
        Ok(self)
    }

    /// Truncate or create the file at `path` and send the child's stdout there.
    pub fn stdout_file(mut self, path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::Redirect {
            cmd: self.program.clone(),
            stream: "stdout",
            source: e,
        })?;
        self.inner.stdout(Stdio::from(file));
        Ok(self)
    }

    pub fn program(&self) -> &str { &self.program }

    pub fn output(&mut self) -> Result<Output> {
        self.inner.stderr(Stdio::piped());
        self.inner.output().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::CommandNotFound {
                cmd: self.program.clone(),
            },
            _ => Error::CommandFailed {
                cmd: self.program.clone(),
                source: e,
            },
        })
    }
}

/// A single external tool call: program, arguments and optional file
/// redirections for stdin and stdout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<PathBuf>,
    pub stdout: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    pub fn stdout(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    /// Build the process command with redirections opened.
    pub fn to_command(&self) -> Result<Command> {
        let mut cmd = Command::new(&self.program).args(&self.args);
        if let Some(path) = &self.stdin {
            cmd = cmd.stdin_file(path)?;
        }
        if let Some(path) = &self.stdout {
            cmd = cmd.stdout_file(path)?;
        }
        Ok(cmd)
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status and diagnostics of a finished tool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool { self.code == Some(0) }

    /// Human-readable reason for a failed run.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        match (self.code, stderr.is_empty()) {
            (Some(code), true) => format!("exit status {code}"),
            (Some(code), false) => format!("exit status {code}: {stderr}"),
            (None, true) => "terminated by signal".to_string(),
            (None, false) => format!("terminated by signal: {stderr}"),
        }
    }
}

impl From<Output> for ToolOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs an [`Invocation`] to completion.
///
/// Everything that executes an external tool goes through this trait, so a
/// test can substitute a scripted runner.
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput>;
}

/// Runs invocations as child processes and blocks until they exit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
        tracing::debug!(command = %invocation, "running external tool");
        let output = invocation.to_command()?.output()?;
        let output = ToolOutput::from(output);
        if !output.success() {
            tracing::debug!(command = %invocation, reason = %output.diagnostic(), "external tool failed");
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new() {
        let cmd = Command::new("zstd");
        assert_eq!(cmd.program(), "zstd");
    }

    #[test]
    fn test_command_args_iter() {
        let cmd = Command::new("gzip").args(["-9", "-c"]);
        let args: Vec<_> = cmd.inner.get_args().collect();
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_command_stdin_missing_file() {
        let result = Command::new("gzip").stdin_file(Path::new("/nonexistent/input"));
        assert!(matches!(
            result,
            Err(Error::Redirect { stream: "stdin", .. })
        ));
    }

    #[test]
    fn test_command_not_found() {
        let mut cmd = Command::new("stowage_nonexistent_binary_12345");
        assert!(matches!(
            cmd.output(),
            Err(Error::CommandNotFound { .. })
        ));
    }

    #[test]
    fn test_invocation_builder() {
        let inv = Invocation::new("zstd")
            .arg("-19")
            .args(["-T0", "-c"])
            .stdin("in.sql")
            .stdout("out.sql.zst");
        assert_eq!(inv.args, vec!["-19", "-T0", "-c"]);
        assert_eq!(inv.stdin.as_deref(), Some(Path::new("in.sql")));
        assert_eq!(inv.to_string(), "zstd -19 -T0 -c");
    }

    #[test]
    fn test_tool_output_diagnostic() {
        let out = ToolOutput {
            code: Some(1),
            stderr: "zstd: error 70 : Write error\n".into(),
        };
        assert!(!out.success());
        assert_eq!(out.diagnostic(), "exit status 1: zstd: error 70 : Write error");

        let ok = ToolOutput {
            code: Some(0),
            stderr: String::new(),
        };
        assert!(ok.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, b"payload").unwrap();

        let inv = Invocation::new("cat").stdin(&input).stdout(&output);
        let result = SystemRunner.run(&inv).unwrap();
        assert!(result.success());
        assert_eq!(std::fs::read(&output).unwrap(), b"payload");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_failure() {
        let result = SystemRunner.run(&Invocation::new("false")).unwrap();
        assert!(!result.success());
        assert_eq!(result.code, Some(1));
    }
}
