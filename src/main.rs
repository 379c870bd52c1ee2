use std::borrow::Cow;
use std::io::{Read, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rkey_rewrite::config::{self, LogFormat};
use rkey_rewrite::TokenPayload;

mod cli;

fn main() -> anyhow::Result<ExitCode> {
    let cfg = config::load()?;
    init_tracing(cfg.log_format);

    let args = cli::Cli::parse();

    match args.command {
        cli::Commands::Apply {
            input,
            payload,
            private_rkey,
            group_rkey,
            force,
        } => {
            let file = payload.as_deref().map(load_payload).transpose()?;
            let tokens = cfg.resolve_tokens(file, private_rkey, group_rkey);
            run_apply(input.as_deref(), &tokens, force)?;
            Ok(ExitCode::SUCCESS)
        }
        cli::Commands::Check { input } => {
            let text = read_input(input.as_deref())?;
            let applies = rkey_rewrite::should_apply(&text);
            println!("{}", applies);
            Ok(if applies {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn init_tracing(format: LogFormat) {
    // stdout carries the rewritten payload, so logs go to stderr.
    let (text_layer, json_layer) = match format {
        LogFormat::Text => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "rkey_rewrite=info".into()),
        ))
        .with(text_layer)
        .with(json_layer)
        .init();
}

fn run_apply(input: Option<&Path>, tokens: &TokenPayload, force: bool) -> anyhow::Result<()> {
    let text = read_input(input)?;

    if !tokens.has_token() {
        tracing::warn!("no rkey supplied (set RKEY_PRIVATE/RKEY_GROUP or pass --payload); payload passes through");
    }

    let output = rkey_rewrite::apply_gated(&text, tokens, force);

    tracing::info!(
        changed = matches!(output, Cow::Owned(_)),
        bytes = output.len(),
        "rkey rewrite finished"
    );

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("failed to write payload to stdout")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

fn load_payload(path: &Path) -> anyhow::Result<TokenPayload> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read token payload {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("token payload {} is not valid JSON", path.display()))
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read payload {}", p.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read payload from stdin")?;
            Ok(buf)
        }
    }
}
