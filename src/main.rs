use std::sync::Arc;

mod catalog;
mod config;
mod decode;
mod error;
mod handler;
mod http;
mod logger;
mod server;
mod storage;

use config::{AppState, Config};
use server::{create_reusable_listener, start_server_loop, ShutdownSignal};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path_from_args(std::env::args().skip(1))?;
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!("Using {workers} worker threads");
    } else {
        tracing::info!("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::bootstrap(cfg)?);
    let listener = create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &state.config, &state.paths, state.catalog.len());

    let shutdown = ShutdownSignal::register()?;

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(start_server_loop(listener, state, shutdown))
        .await?;
    Ok(())
}

/// `-c <path>` / `--config <path>`, defaulting to `config`
fn config_path_from_args(mut args: impl Iterator<Item = String>) -> Result<String, String> {
    let mut path = config::DEFAULT_CONFIG_PATH.to_string();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                path = args
                    .next()
                    .ok_or_else(|| format!("{arg} requires a path"))?;
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    Ok(path)
}
