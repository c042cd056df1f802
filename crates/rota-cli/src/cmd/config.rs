use crate::output::print_json;
use anyhow::{bail, Result};
use clap::Subcommand;
use rota_core::config::{Config, SecretConfig, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (secrets redacted)
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(config: &Config, subcommand: ConfigSubcommand, json: bool) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show => show(config, json),
        ConfigSubcommand::Validate => validate(config, json),
    }
}

fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    config.secret = match config.secret {
        SecretConfig::Age { identity, .. } => SecretConfig::Age {
            ciphertext: "<redacted>".to_string(),
            identity,
        },
        SecretConfig::Plain { .. } => SecretConfig::Plain {
            token: "<redacted>".to_string(),
        },
        SecretConfig::Unset => SecretConfig::Unset,
    };
    config
}

fn show(config: &Config, json: bool) -> Result<()> {
    let config = redacted(config);
    if json {
        return print_json(&config);
    }
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

fn validate(config: &Config, json: bool) -> Result<()> {
    let warnings = config.validate();
    if json {
        print_json(&warnings)?;
    } else if warnings.is_empty() {
        println!("config ok");
    } else {
        for w in &warnings {
            let tag = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{tag}: {}", w.message);
        }
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        bail!("config has errors");
    }
    Ok(())
}
