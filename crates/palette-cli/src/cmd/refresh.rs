use super::load_config;
use crate::output::{print_json, print_palette};
use anyhow::Context;
use palette_core::config::NotifyPolicy;
use palette_core::env::Env;
use palette_core::refresh::{RefreshOutcome, Refresher, StageFailure};
use palette_core::writer;
use std::path::Path;

pub fn run(
    config_path: Option<&Path>,
    env: &Env,
    dry_run: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;

    let refresher = match dry_run {
        Some(dir) => {
            config.notify.policy = NotifyPolicy::Never;
            Refresher::from_config_with_writer(&config, env, writer::dry_run(&config, dir))
        }
        None => Refresher::from_config(&config, env),
    }
    .context("failed to set up palette refresh")?;

    let outcome = refresher.run();
    let response = outcome.response();

    match &outcome {
        RefreshOutcome::Completed {
            palette,
            receipt,
            notified,
        } => {
            if json {
                print_json(&serde_json::json!({
                    "status": "completed",
                    "palette": palette,
                    "receipt": receipt,
                    "notified": notified,
                    "response": response,
                }))?;
            } else {
                print_palette(palette);
                println!();
                match &receipt.commit {
                    Some(commit) => {
                        println!("Wrote {} via {} ({commit})", receipt.path, receipt.writer)
                    }
                    None => println!("Wrote {} via {}", receipt.path, receipt.writer),
                }
                if *notified {
                    println!("Notification sent.");
                }
            }
            Ok(())
        }
        RefreshOutcome::Failed(StageFailure {
            stage,
            error,
            receipt,
            ..
        }) => {
            if json {
                print_json(&serde_json::json!({
                    "status": "failed",
                    "stage": stage,
                    "error": error.to_string(),
                    "receipt": receipt,
                    "response": response,
                }))?;
            }
            if let Some(receipt) = receipt {
                eprintln!("note: {} was written before the failure", receipt.path);
            }
            anyhow::bail!("refresh failed at {}: {error}", stage.as_str())
        }
    }
}
