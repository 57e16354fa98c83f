use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::json;

use opsdash::{DashboardConfig, DashboardSession, Identity, RouteSignals, StaticMenuSource};
use opsdash_context::{FileStore, InMemoryDirectory, KeyValueStore, MemoryStore, TracingSink};
use opsdash_observability::LogFormat;

/// Evaluate role, tenant context and menu visibility for one route.
#[derive(Debug, Parser)]
#[command(name = "opsdash", version)]
struct Cli {
    /// Policy tables (JSON). Defaults to `$OPSDASH_CONFIG`, then built-ins.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Identity payload (JSON). Omit to evaluate while identity is loading.
    #[arg(long, global = true)]
    identity: Option<PathBuf>,

    /// Directory snapshot (JSON): organizations, business units, outlets.
    #[arg(long, global = true)]
    directory: Option<PathBuf>,

    /// File holding persisted fallbacks across invocations.
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Route target, path plus optional query string.
    #[arg(long, global = true, default_value = "/")]
    target: String,

    /// Route parameter as `name=value`; repeatable.
    #[arg(long = "param", global = true, value_parser = parse_param)]
    params: Vec<(String, String)>,

    #[arg(long, global = true, default_value = "json")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify the caller's role.
    Classify,
    /// Resolve the active context, visible business units and enabled modules.
    Context,
    /// Build the visible navigation menu.
    Menu {
        /// Role → menu definition (JSON).
        #[arg(long)]
        menu: PathBuf,
        /// Free-text menu search.
        #[arg(long, default_value = "")]
        query: String,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    opsdash_observability::init_with(cli.log_format);

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::from_env()?,
    };

    let output = match &cli.state {
        Some(path) => {
            let store = FileStore::open(path).with_context(|| format!("failed to open state {}", path.display()))?;
            run(&cli, config, store)?
        }
        None => run(&cli, config, MemoryStore::new())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run<S: KeyValueStore>(cli: &Cli, config: DashboardConfig, store: S) -> anyhow::Result<serde_json::Value> {
    let identity: Option<Identity> = cli.identity.as_deref().map(read_json::<Identity>).transpose()?;
    let directory: InMemoryDirectory = match &cli.directory {
        Some(path) => read_json(path)?,
        None => InMemoryDirectory::default(),
    };

    let route = cli
        .params
        .iter()
        .fold(RouteSignals::parse(&cli.target), |route, (name, value)| route.with_param(name, value));
    tracing::debug!(path = %route.path, "evaluating route");

    let mut session = DashboardSession::new(config, store, directory, TracingSink);

    let output = match &cli.command {
        Command::Classify => serde_json::to_value(session.classify_role(identity.as_ref(), &route))?,
        Command::Context => {
            let settled = identity.clone().unwrap_or_else(Identity::loading);
            let classification = session.classify_role(identity.as_ref(), &route);
            let context = session.resolve_context(&route, &settled, &classification);
            let business_units = session.visible_business_units(&context, &settled, &classification);
            let enabled_modules = session.enabled_modules(&context, &settled);
            json!({
                "classification": classification,
                "context": context,
                "businessUnits": business_units,
                "enabledModules": enabled_modules,
            })
        }
        Command::Menu { menu, query } => {
            let source: StaticMenuSource = read_json(menu)?;
            serde_json::to_value(session.view(identity.as_ref(), &route, &source, query))?
        }
    };
    Ok(output)
}
