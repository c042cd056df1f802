use crate::output::{print_json, print_table};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rota_core::config::Config;
use rota_core::error::RotaError;
use rota_core::rotation::{RedbRotationStore, RotationEntry, RotationStore};

pub fn run(config: &Config, server: Option<&str>, json: bool) -> Result<()> {
    let entries = match RedbRotationStore::open(&config.store.path) {
        Ok(store) => store.list()?,
        Err(RotaError::StoreLocked(path)) => {
            let url = match server {
                Some(url) => url.trim_end_matches('/').to_string(),
                None => format!("http://127.0.0.1:{}", config.server.port),
            };
            tracing::info!(db = %path.display(), %url, "database locked, asking the running server");
            fetch_remote(config, &url).with_context(|| {
                format!(
                    "{} is held by a running server and {url}/roster could not be read \
                     (pass --server to point at it)",
                    path.display()
                )
            })?
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("Nobody in the rotation yet. Add someone with `/knowledgesharing log @user`.");
        return Ok(());
    }

    let now = Utc::now();
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            let (date, waiting) = match DateTime::<Utc>::from_timestamp_millis(e.last_delivered) {
                Some(dt) => (
                    dt.format("%Y-%m-%d").to_string(),
                    format!("{}d", (now - dt).num_days()),
                ),
                None => ("invalid".to_string(), "-".to_string()),
            };
            vec![e.user.clone(), date, waiting]
        })
        .collect();
    print_table(&["USER", "LAST DELIVERED", "WAITING"], &rows);
    Ok(())
}

/// Read the roster from `GET {base}/roster` using the slash-command token.
fn fetch_remote(config: &Config, base: &str) -> Result<Vec<RotationEntry>> {
    let token = config.secret.source().unwrap_secret()?;
    let entries = ureq::get(&format!("{base}/roster"))
        .set("Authorization", &format!("Bearer {token}"))
        .call()?
        .into_json()?;
    Ok(entries)
}
