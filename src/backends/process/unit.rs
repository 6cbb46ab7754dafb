// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};

use crate::config::UnitConfig;
use crate::errors::{UnitFactoryError, UnitFailure};
use crate::observability::messages::unit::{ProcessExited, ProcessSpawned, StdinClosedEarly};
use crate::observability::messages::StructuredLog;
use crate::streams::{pump_lines, RecordSink, RecordSource};
use crate::traits::Unit;

/// Runs an external program as a unit.
///
/// Each execution spawns a fresh child, so one `ProcessUnit` can back any
/// number of nodes or runs.
#[derive(Debug, Clone)]
pub struct ProcessUnit {
    program: String,
    args: Vec<String>,
}

impl ProcessUnit {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
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

    /// Build from a `type: process` pipeline entry. `command` is required.
    pub fn from_config(config: &UnitConfig) -> Result<Self, UnitFactoryError> {
        let program = config
            .command
            .as_deref()
            .filter(|command| !command.trim().is_empty())
            .ok_or_else(|| UnitFactoryError::MissingField {
                unit_id: config.id.clone(),
                kind: config.kind,
                field: "command",
            })?;
        Ok(Self::new(program).args(config.args.iter().cloned()))
    }

    /// Program and arguments as one line, for diagnostics.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Unit for ProcessUnit {
    async fn execute(
        &self,
        input: RecordSource,
        output: RecordSink,
        errors: RecordSink,
    ) -> Result<(), UnitFailure> {
        let command = self.command_line();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| UnitFailure::Spawn {
                command: command.clone(),
                source,
            })?;

        ProcessSpawned {
            command: &command,
            pid: child.id(),
        }
        .log();

        let (stdin, stdout, stderr) = match (child.stdin.take(), child.stdout.take(), child.stderr.take()) {
            (Some(stdin), Some(stdout), Some(stderr)) => (stdin, stdout, stderr),
            _ => {
                return Err(UnitFailure::io(
                    format!("capturing standard streams of `{}`", command),
                    io::Error::new(io::ErrorKind::Other, "standard stream was not piped"),
                ))
            }
        };

        // stdin, stdout and stderr must all make progress at once or the
        // child can block on a full pipe
        let (fed, forwarded, diagnosed, status) = tokio::join!(
            feed_stdin(stdin, input, &command),
            pump_lines(stdout, &output, true),
            pump_lines(stderr, &errors, true),
            child.wait(),
        );

        let status = status
            .map_err(|source| UnitFailure::io(format!("waiting for `{}`", command), source))?;

        ProcessExited {
            command: &command,
            status,
            records_out: forwarded.as_ref().map(|stats| stats.forwarded).unwrap_or(0),
        }
        .log();

        if !status.success() {
            return Err(UnitFailure::ProcessExit { command, status });
        }

        fed.map_err(|source| UnitFailure::io(format!("writing stdin of `{}`", command), source))?;
        for pumped in [forwarded, diagnosed] {
            let stats = pumped
                .map_err(|source| UnitFailure::io(format!("reading output of `{}`", command), source))?;
            if stats.sink_closed {
                return Err(UnitFailure::SinkClosed);
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// Write every input record to the child's stdin, then close it.
///
/// A child that stops reading (exits, or closes stdin) is not an error: the
/// rest of the input is drained so the upstream never blocks on us.
async fn feed_stdin(mut stdin: ChildStdin, mut input: RecordSource, command: &str) -> io::Result<()> {
    while let Some(mut record) = input.recv().await {
        record.push('\n');
        if let Err(error) = stdin.write_all(record.as_bytes()).await {
            let discarded = input.drain().await;
            if error.kind() == io::ErrorKind::BrokenPipe {
                tracing::debug!("{}", StdinClosedEarly { command, discarded });
                return Ok(());
            }
            return Err(error);
        }
    }

    match stdin.shutdown().await {
        Err(error) if error.kind() != io::ErrorKind::BrokenPipe => Err(error),
        _ => Ok(()),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::streams::Record;

    async fn run(
        unit: &ProcessUnit,
        input: RecordSource,
    ) -> (Result<(), UnitFailure>, Vec<Record>, Vec<Record>) {
        let (output, collected) = RecordSink::collector(64);
        let (errors, diagnostics) = RecordSink::collector(64);
        let result = unit.execute(input, output, errors).await;
        (result, collected.await.unwrap(), diagnostics.await.unwrap())
    }

    #[test]
    fn test_command_line_joins_program_and_args() {
        let unit = ProcessUnit::new("ping").args(["-c", "3"]).arg("localhost");
        assert_eq!(unit.command_line(), "ping -c 3 localhost");
    }

    #[test]
    fn test_from_config_requires_command() {
        let mut config = UnitConfig {
            id: "ping".to_string(),
            kind: crate::config::UnitKind::Process,
            transform: None,
            count: None,
            delay_ms: None,
            command: None,
            args: vec!["-c".to_string(), "3".to_string()],
            pipe_to: vec![],
        };
        assert!(matches!(
            ProcessUnit::from_config(&config),
            Err(UnitFactoryError::MissingField { field: "command", .. })
        ));

        config.command = Some("ping".to_string());
        let unit = ProcessUnit::from_config(&config).unwrap();
        assert_eq!(unit.command_line(), "ping -c 3");
    }

    #[tokio::test]
    async fn test_program_ignoring_stdin_still_runs() {
        let unit = ProcessUnit::new("echo").arg("testing");
        let (result, output, errors) =
            run(&unit, RecordSource::from_records(["This is a Test!"])).await;

        assert!(result.is_ok());
        assert_eq!(output, vec!["testing"]);
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_cat_passes_records_through() {
        let unit = ProcessUnit::new("cat");
        let (result, output, _) = run(&unit, RecordSource::from_records(["Hello", "", "World"])).await;

        assert!(result.is_ok());
        assert_eq!(output, vec!["Hello", "", "World"]);
    }

    #[tokio::test]
    async fn test_awk_transforms_each_line() {
        let unit = ProcessUnit::new("awk").arg("{print toupper($0)}");
        let (result, output, _) = run(&unit, RecordSource::from_records(["Hello", "World"])).await;

        assert!(result.is_ok());
        assert_eq!(output, vec!["HELLO", "WORLD"]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_keeps_output_and_errors() {
        let unit = ProcessUnit::new("sh").args(["-c", "echo partial; echo oops >&2; exit 3"]);
        let (result, output, errors) = run(&unit, RecordSource::empty()).await;

        match result {
            Err(UnitFailure::ProcessExit { status, .. }) => assert_eq!(status.code(), Some(3)),
            other => panic!("Expected ProcessExit, got {:?}", other),
        }
        assert_eq!(output, vec!["partial"]);
        assert_eq!(errors, vec!["oops"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_output() {
        let unit = ProcessUnit::new("sh").args([
            "-c",
            "printf 'ok\\n\\377\\n'; sleep 0.2; echo after; echo done >&2",
        ]);
        let (result, output, errors) = run(&unit, RecordSource::empty()).await;

        assert!(result.is_ok(), "{:?}", result);
        assert_eq!(output, vec!["ok", "\u{FFFD}", "after"]);
        assert_eq!(errors, vec!["done"]);
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let unit = ProcessUnit::new("the-pipetree-no-such-program");
        let (result, output, _) = run(&unit, RecordSource::empty()).await;

        assert!(matches!(result, Err(UnitFailure::Spawn { .. })));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_input_is_drained_when_program_stops_reading() {
        let records: Vec<String> = (0..20_000).map(|n| n.to_string()).collect();
        let unit = ProcessUnit::new("true");
        let (result, output, _) = run(&unit, RecordSource::from_records(records)).await;

        assert!(result.is_ok());
        assert!(output.is_empty());
    }
}
