use super::load_config;
use crate::output::{print_json, print_table};
use clap::Subcommand;
use palette_core::env::{self, Env};
use palette_core::probe;
use std::path::Path;

#[derive(Subcommand)]
pub enum RemoteSubcommand {
    /// Connect to the clone writer's remote and list its refs
    Check,
}

pub fn run(
    config_path: Option<&Path>,
    env: &Env,
    subcmd: RemoteSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        RemoteSubcommand::Check => check(config_path, env, json),
    }
}

fn check(config_path: Option<&Path>, env: &Env, json: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let url = probe::remote_url(&config, env)?;
    let info = probe::probe_remote(&url, env.get(env::GITHUB_TOKEN))?;

    if json {
        return print_json(&info);
    }

    println!("{} is reachable", info.url);
    if info.refs.is_empty() {
        println!("(no refs advertised)");
        return Ok(());
    }
    let rows = info
        .refs
        .iter()
        .map(|r| vec![r.name.clone(), r.oid.clone()])
        .collect();
    print_table(&["REF", "OID"], rows);
    Ok(())
}
