use super::load_config;
use crate::output::print_json;
use palette_core::env::Env;
use palette_core::notify::TwilioNotifier;
use palette_core::submission::notify_submission;
use std::path::Path;

pub fn run(config_path: Option<&Path>, env: &Env, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let notifier = TwilioNotifier::from_config(&config.notify, env)?;
    let response = notify_submission(&notifier, &config.notify.submission_message);

    if json {
        print_json(&response)?;
    }
    if !response.is_success() {
        anyhow::bail!("submission alert failed: {}", response.body);
    }
    if !json {
        println!("Submission alert sent.");
    }
    Ok(())
}
