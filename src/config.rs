use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Bucket whose newest pack is reported.
    pub bucket: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Latest pack SHA-1 service")]
pub struct Args {
    /// Host to bind to (overrides PACK_SHA1_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PACK_SHA1_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where object payloads live (overrides PACK_SHA1_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Metadata database URL (overrides PACK_SHA1_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Bucket binding (overrides PACK_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::merge(args, |name| env::var(name))?;
        Ok((cfg, migrate))
    }

    /// CLI values win over environment values, which win over defaults.
    pub fn merge<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|_| default.into());

        let env_port = match lookup("PACK_SHA1_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PACK_SHA1_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 8787,
            Err(err) => return Err(err).context("reading PACK_SHA1_PORT"),
        };

        Ok(Self {
            host: args.host.unwrap_or_else(|| var_or("PACK_SHA1_HOST", "0.0.0.0")),
            port: args.port.unwrap_or(env_port),
            storage_dir: args
                .storage_dir
                .unwrap_or_else(|| var_or("PACK_SHA1_STORAGE_DIR", "./data/objects")),
            database_url: args
                .database_url
                .unwrap_or_else(|| var_or("PACK_SHA1_DATABASE_URL", "sqlite://./data/meta/packs.db")),
            bucket: args.bucket.unwrap_or_else(|| var_or("PACK_BUCKET", "packs")),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_env_or_flags() {
        let cfg = AppConfig::merge(Args::default(), lookup(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:8787");
        assert_eq!(cfg.bucket, "packs");
        assert_eq!(cfg.database_url, "sqlite://./data/meta/packs.db");
    }

    #[test]
    fn flags_override_env() {
        let args = Args {
            port: Some(9000),
            bucket: Some("cli-bucket".into()),
            ..Args::default()
        };
        let cfg = AppConfig::merge(
            args,
            lookup(&[("PACK_SHA1_PORT", "7000"), ("PACK_BUCKET", "env-bucket")]),
        )
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.bucket, "cli-bucket");
    }

    #[test]
    fn env_fills_missing_flags() {
        let cfg = AppConfig::merge(
            Args::default(),
            lookup(&[("PACK_SHA1_HOST", "127.0.0.1"), ("PACK_BUCKET", "releases")]),
        )
        .unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.bucket, "releases");
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = AppConfig::merge(Args::default(), lookup(&[("PACK_SHA1_PORT", "eighty")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("PACK_SHA1_PORT"));
    }
}
