/*!
shared.rs - shared helpers for subcommands.

Focus:
  - GlobalOpts -> Settings
  - runtime / bootstrap / connect: build the client, optionally resolving
    the ambient organization
  - parse_params / load_param_file_into_map: KEY=VALUE and file parameters
  - redact_arguments: hide token values before echoing arguments
*/

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::{Map, Value};

use crate::choreo::{ChoreoClient, DEFAULT_BASE_URL};
use crate::config::Settings;
use crate::tools::{Dispatcher, PARAM_TOKEN};

/* ---- Global options ---- */

/// Connection settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Choreo API base URL
    #[arg(long = "base-url", env = "CHOREO_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Ambient bearer token (tools then accept calls without a 'token' argument)
    #[arg(long, env = "CHOREO_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Organization (handle, id or uuid) to resolve at startup; defaults to the first visible one
    #[arg(long, env = "CHOREO_ORG", global = true)]
    pub org: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "CHOREO_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout: u64,
}

impl GlobalOpts {
    pub fn settings(&self) -> Result<Settings> {
        Settings::new(
            &self.base_url,
            self.timeout,
            self.token.clone(),
            self.org.clone(),
        )
    }
}

/* ---- Runtime / bootstrap ---- */

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")
}

/// Build the client and resolve ambient values. Fails if a token is
/// configured but no organization can be resolved with it.
pub async fn bootstrap(settings: Settings) -> Result<Dispatcher> {
    let client = ChoreoClient::new(settings.base_url.clone(), settings.timeout)?;
    let settings = settings.bootstrap(&client).await?;
    Ok(Dispatcher::new(settings, client))
}

/// Dispatcher without ambient organization resolution.
pub fn connect(settings: Settings) -> Result<Dispatcher> {
    let client = ChoreoClient::new(settings.base_url.clone(), settings.timeout)?;
    Ok(Dispatcher::new(settings, client))
}

/* ---- Parameters ---- */

/// Parse repeated `KEY=VALUE` flags into a JSON argument object.
pub fn parse_params(raw: &[String]) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    for kv in raw {
        let Some((k, v)) = kv.split_once('=') else {
            bail!("invalid --param (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            bail!("invalid --param (empty key): {kv}");
        }
        out.insert(key.to_string(), Value::String(v.trim().to_string()));
    }
    Ok(out)
}

/// Merge a JSON or YAML parameter file into `provided`. Keys already present
/// (from `--param`) win. Values are passed through unchanged so that type
/// errors surface from argument extraction.
pub fn load_param_file_into_map(path: &str, provided: &mut Map<String, Value>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let Value::Object(obj) = value else {
        bail!("param file root must be an object");
    };

    for (k, v) in obj {
        provided.entry(k).or_insert(v);
    }
    Ok(())
}

/// Copy of `args` with the token value masked.
pub fn redact_arguments(args: &Map<String, Value>) -> Map<String, Value> {
    args.iter()
        .map(|(k, v)| {
            if k == PARAM_TOKEN {
                (k.clone(), Value::String("***".into()))
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

/* ---- Tests ---- */
