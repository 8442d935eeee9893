use super::load_config;
use palette_core::env::Env;
use std::path::Path;

pub fn run(config_path: Option<&Path>, env: Env, port: u16) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    for w in config.validate() {
        tracing::warn!(level = ?w.level, "{}", w.message);
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!("palette functions → http://localhost:{actual_port}/functions/palette-refresh");

        tokio::select! {
            res = palette_server::serve_on(config, env, listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
