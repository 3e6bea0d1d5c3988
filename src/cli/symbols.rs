//! Handlers for the symbol commands.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cli::{output, Cli, Commands};
use crate::domain::{RequestContext, Symbol, SymbolKey, SymbolUpdate};
use crate::error::{ConfigError, Error, Result};
use crate::infrastructure::bootstrap::{build_pipeline, Pipeline};
use crate::infrastructure::config::settings::Config;

const DEFAULT_CONFIG: &str = "config.toml";

/// Exit code when configuration or startup fails.
const EXIT_STARTUP: i32 = 2;

/// Run one command end to end and return the process exit code.
///
/// The command races Ctrl-C; either way the pipeline is shut down through the
/// coordinator before returning.
pub async fn run(cli: Cli) -> i32 {
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            output::error(&e);
            return EXIT_STARTUP;
        }
    };
    if let Err(e) = config.init_logging() {
        output::error(&e);
        return EXIT_STARTUP;
    }

    let pipeline = match build_pipeline(&config).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            output::error(&e);
            return EXIT_STARTUP;
        }
    };

    let ctx = RequestContext::new();
    debug!(request_id = ctx.request_id(), command = ?cli.command, "Running command");

    let outcome = tokio::select! {
        outcome = execute(&pipeline, &cli.command, &ctx) => outcome,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            ctx.cancel();
            // Ctrl-C is how `watch` is meant to end.
            if matches!(cli.command, Commands::Watch(_)) {
                Ok(())
            } else {
                Err(Error::Cancelled)
            }
        }
    };

    let command_code = match outcome {
        Ok(()) => 0,
        Err(e) => {
            output::error(&e);
            1
        }
    };

    let terminal = pipeline.shutdown.shutdown().await;
    if terminal.exit_code() != 0 {
        warn!(state = %terminal, "Shutdown did not complete cleanly");
        return terminal.exit_code();
    }
    command_code
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(DEFAULT_CONFIG)?,
        None => Config::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    Ok(config)
}

async fn execute(pipeline: &Pipeline, command: &Commands, ctx: &RequestContext) -> Result<()> {
    let symbols = &pipeline.symbols;
    match command {
        Commands::Get(arg) => {
            let key = SymbolKey::try_new(&arg.symbol)?;
            let symbol = symbols.resolve(&key, ctx).await?;
            pipeline.cache.set(&key, &symbol).await;
            output::json(&symbol)
        }
        Commands::Add(arg) => {
            let symbol: Symbol = read_json(&arg.file)?;
            symbols.add(&symbol, ctx).await?;
            output::ok(&format!("added {}", symbol.symbol));
            Ok(())
        }
        Commands::Update(arg) => {
            let update: SymbolUpdate = read_json(&arg.file)?;
            symbols.update(&update, ctx).await?;
            output::ok(&format!("updated {}", update.key()?));
            Ok(())
        }
        Commands::Delete(arg) => {
            let key = SymbolKey::try_new(&arg.symbol)?;
            symbols.delete(&key, ctx).await?;
            output::ok(&format!("deleted {key}"));
            Ok(())
        }
        Commands::List => {
            let all = symbols.list().await?;
            output::json(&all)
        }
        Commands::Watch(arg) => {
            let keys = arg
                .symbols
                .iter()
                .map(SymbolKey::try_new)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            watch(pipeline, &keys, Duration::from_secs(arg.interval_secs), ctx).await
        }
    }
}

/// Resolve `keys` every `interval` until `ctx` is cancelled.
///
/// Each resolved symbol is cached and printed as one JSON line. Lookup
/// failures are reported and the round continues.
async fn watch(
    pipeline: &Pipeline,
    keys: &[SymbolKey],
    interval: Duration,
    ctx: &RequestContext,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = ctx.cancelled() => return Ok(()),
            _ = ticker.tick() => {}
        }

        for key in keys {
            match pipeline.symbols.resolve(key, ctx).await {
                Ok(symbol) => {
                    pipeline.cache.set(key, &symbol).await;
                    output::json_line(&symbol)?;
                }
                Err(Error::Cancelled) => return Ok(()),
                Err(e @ Error::ShuttingDown { .. }) => return Err(e),
                Err(e) => {
                    warn!(symbol = %key, error = %e, "Watch lookup failed");
                    output::error(&e);
                }
            }
        }
        debug!(symbols = keys.len(), stats = ?pipeline.pool.stats(), "Watch round done");
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut content = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut content)?;
    } else {
        content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(ConfigError::Other(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        })?;
    }
    Ok(serde_json::from_str(&content)?)
}
