use super::load_config;
use crate::output::print_json;
use palette_core::env::Env;
use palette_core::notify::{Notifier, TwilioNotifier};
use std::path::Path;

pub fn run(config_path: Option<&Path>, env: &Env, message: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let notifier = TwilioNotifier::from_config(&config.notify, env)?;
    let receipt = notifier.notify(message)?;

    if json {
        print_json(&receipt)?;
    } else {
        println!("Sent ({})", receipt.sid);
    }
    Ok(())
}
