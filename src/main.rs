// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use the_pipetree::config::consts::IO_CHANNEL_CAPACITY;
use the_pipetree::config::{load_and_validate_config, RootInput, RuntimeBuilder};
use the_pipetree::engine::Node;
use the_pipetree::observability::messages::config::{FailureReported, InputReadFailed};
use the_pipetree::streams::{finish_pump, RecordSink, RecordSource};

const STDIN_GRACE: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "the-pipetree", version, about = "Run a tree of line-oriented units with fan-out")]
struct Cli {
    /// Pipeline definition (YAML)
    pipeline: PathBuf,

    /// Feed standard input to the root unit
    #[arg(long)]
    stdin: bool,

    /// Validate and print the pipeline without running it
    #[arg(long)]
    check: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    // stdout carries pipeline output only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("the_pipetree=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new().context("starting the async runtime")?;
    let code = runtime.block_on(run(cli));
    // a stdin reader blocked on a terminal must not hold up exit
    runtime.shutdown_timeout(Duration::from_millis(100));
    code
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_and_validate_config(&cli.pipeline)
        .with_context(|| format!("loading pipeline {}", cli.pipeline.display()))?;
    let pipeline = RuntimeBuilder::from_config(&config)?;

    if cli.check {
        print_tree(pipeline.root(), 0);
        return Ok(ExitCode::SUCCESS);
    }

    let (input, stdin_pump) = if cli.stdin || pipeline.root_input() == RootInput::Stdin {
        let (source, pump) = RecordSource::from_reader(tokio::io::stdin(), IO_CHANNEL_CAPACITY);
        (source, Some(pump))
    } else {
        (RecordSource::empty(), None)
    };
    let (output, stdout_writer) = RecordSink::to_writer(tokio::io::stdout(), IO_CHANNEL_CAPACITY);
    let (errors, stderr_writer) = RecordSink::to_writer(tokio::io::stderr(), IO_CHANNEL_CAPACITY);

    let result = pipeline.run(input, output, errors).await;

    // a pump still blocked after the grace period is waiting on a terminal
    // the root no longer reads from
    let stdin_result = match stdin_pump {
        Some(pump) => finish_pump(pump, STDIN_GRACE).await,
        None => Ok(()),
    };
    stdout_writer.await?.context("writing pipeline output")?;
    stderr_writer.await?.context("writing pipeline errors")?;

    if let Err(read_error) = &stdin_result {
        error!("{}", InputReadFailed { error: read_error });
    }

    match result {
        Ok(()) if stdin_result.is_ok() => Ok(ExitCode::SUCCESS),
        Ok(()) => Ok(ExitCode::FAILURE),
        Err(failure) => {
            for (node, unit_failure) in failure.unit_failures() {
                error!(
                    "{}",
                    FailureReported {
                        node,
                        failure: unit_failure,
                    }
                );
            }
            error!("{}", failure);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_tree(node: &Node, depth: usize) {
    println!("{}{} ({})", "  ".repeat(depth), node.label(), node.unit_name());
    for child in node.edges() {
        print_tree(&child, depth + 1);
    }
}
