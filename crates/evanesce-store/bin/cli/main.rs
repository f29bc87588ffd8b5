mod cli;

use crate::cli::{Command, CLI};
use anyhow::Context;
use clap::Parser;
use evanesce_generator::{RandomGenerator, RandomSettings};
use evanesce_storage::RedisRepository;
use evanesce_store::{
    CreatePasteRequest, PasteError, PasteId, PasteService, PasteStore, StoreSettings,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct CreatedPaste {
    id: PasteId,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = CLI::parse();
    init_tracing(config.log_json);

    let id_settings = RandomSettings::builder().length(config.id_length).build();
    let generator = RandomGenerator::new(id_settings)?;

    info!(
        key_prefix = %config.key_prefix,
        id_length = generator.length(),
        "starting evanesce"
    );

    let repository = RedisRepository::connect(&config.redis_url, config.key_prefix.clone())
        .await
        .context("failed to connect to Redis")?;
    let settings = StoreSettings::builder()
        .max_attempts(config.max_attempts)
        .operation_timeout(Duration::from_millis(config.timeout_ms))
        .build();
    let store = PasteService::with_settings(repository, generator, settings);

    match config.command {
        Command::Create {
            content,
            expires_in,
            max_views,
        } => create(&store, content, expires_in, max_views).await,
        Command::Read { id, json } => read(&store, &id, json).await,
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Interprets a numeric argument as JSON so the store validates it exactly
/// like a client-supplied value; anything that is not JSON is passed on as a
/// string and rejected there.
fn number_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

async fn create<S: PasteStore>(
    store: &S,
    content: Option<String>,
    expires_in: Option<String>,
    max_views: Option<String>,
) -> anyhow::Result<ExitCode> {
    let content = match content {
        Some(content) => content,
        None => std::io::read_to_string(std::io::stdin())
            .context("failed to read paste content from stdin")?,
    };

    let request = CreatePasteRequest {
        content: Some(Value::String(content)),
        expires_in: expires_in.as_deref().map(number_arg),
        max_views: max_views.as_deref().map(number_arg),
    };

    match store.create(request).await {
        Ok(id) => {
            println!("{}", serde_json::to_string(&CreatedPaste { id })?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report(e)),
    }
}

async fn read<S: PasteStore>(store: &S, id: &str, json: bool) -> anyhow::Result<ExitCode> {
    match store.read(id).await {
        Ok(Some(paste)) if json => {
            println!("{}", serde_json::to_string(&paste)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(Some(paste)) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(paste.content.as_bytes())?;
            stdout.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            eprintln!("paste not found");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Ok(report(e)),
    }
}

/// Prints the user-facing message; storage details only go to the log.
fn report(err: PasteError) -> ExitCode {
    if let PasteError::Storage(source) = &err {
        debug!(error = %source, "storage failure");
    }
    eprintln!("{err}");
    ExitCode::FAILURE
}
