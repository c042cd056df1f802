use anyhow::Result;
use rota_core::config::{Config, WarnLevel};

pub fn run(config: &Config, port: Option<u16>) -> Result<()> {
    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => tracing::error!("{}", w.message),
        }
    }
    config.check()?;

    let port = port.unwrap_or(config.server.port);
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        tokio::select! {
            res = rota_server::serve_on(config, listener) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
