//! Dispatch of CLI commands onto the pipeline and action handlers.

use std::sync::Arc;
use std::time::Instant;

use pinesync_core::actions::{CreateEmbedInput, CreateIndexInput, DeleteIndexInput};
use pinesync_core::{ActionHandler, ActionOutcome, CacheWriter, RunArguments};
use pinesync_domain::{IndexSpec, Result, ServerlessSpec, VectorRecord};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cache_writer::JsonLinesCacheWriter;
use crate::cli::Command;
use crate::logging::{error_label, log_command_execution};
use crate::AppContext;

/// Result of one command: printed as JSON, `success` drives the exit code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReport {
    pub command: &'static str,
    pub success: bool,
    pub result: Value,
}

impl CommandReport {
    fn new(command: &'static str, success: bool, result: impl Serialize) -> Result<Self> {
        let result = serde_json::to_value(result).map_err(|e| {
            pinesync_domain::ConnectorError::Internal(format!("result encoding failed: {e}"))
        })?;
        Ok(Self { command, success, result })
    }

    fn from_outcome<O: Serialize>(command: &'static str, outcome: &ActionOutcome<O>) -> Result<Self> {
        Self::new(command, outcome.is_success(), outcome)
    }
}

/// Run `command` against `context`.
///
/// # Errors
/// Only cancellation and configuration problems are returned as `Err`;
/// remote failures come back as an unsuccessful report.
pub async fn execute(
    context: &AppContext,
    command: Command,
    cancel: &CancellationToken,
) -> Result<CommandReport> {
    let name = command.name();
    let started = Instant::now();
    let report = dispatch(context, command, cancel).await;

    match &report {
        Ok(report) => log_command_execution(name, started.elapsed(), report.success),
        Err(err) => {
            warn!(command = name, error_type = error_label(err), error = %err, "command_aborted");
            log_command_execution(name, started.elapsed(), false);
        }
    }
    report
}

async fn dispatch(
    context: &AppContext,
    command: Command,
    cancel: &CancellationToken,
) -> Result<CommandReport> {
    let name = command.name();
    match command {
        Command::Sync { namespace, page_limit, output } => {
            let writer: Arc<dyn CacheWriter> = match output {
                Some(path) => Arc::new(JsonLinesCacheWriter::append_to(&path)?),
                None => Arc::new(JsonLinesCacheWriter::stdout()),
            };
            let mut args = RunArguments::new();
            args.namespace = namespace;
            args.page_limit = page_limit;

            let report = context.sync_pipeline(writer).run(args, cancel).await;
            if cancel.is_cancelled() {
                return Err(pinesync_domain::ConnectorError::Cancelled);
            }
            CommandReport::new(name, report.is_success(), &report)
        }
        Command::TestConnection => {
            let result = context.connection_test_handler().test_connection(cancel).await?;
            CommandReport::new(name, result.success, &result)
        }
        Command::CreateIndex { name: index, dimension, metric, cloud, region } => {
            let mut input = CreateIndexInput::new(index, dimension, metric);
            input.spec =
                Some(IndexSpec { serverless: Some(ServerlessSpec { cloud, region }), pod: None });
            let outcome = context.create_index_handler().handle(input, cancel).await?;
            CommandReport::from_outcome(name, &outcome)
        }
        Command::DeleteIndex { name: index } => {
            let outcome =
                context.delete_index_handler().handle(DeleteIndexInput { name: index }, cancel).await?;
            CommandReport::from_outcome(name, &outcome)
        }
        Command::UpsertVector { id, values, namespace } => {
            let mut vector = VectorRecord::new(id, values);
            vector.namespace = namespace;
            let outcome = context.upsert_vector_handler().handle(vector, cancel).await?;
            CommandReport::from_outcome(name, &outcome)
        }
        Command::Embed { texts, model } => {
            let mut input = CreateEmbedInput::from_texts(texts);
            input.model = model;
            let outcome = context.create_embed_handler().handle(input, cancel).await?;
            CommandReport::from_outcome(name, &outcome)
        }
    }
}
