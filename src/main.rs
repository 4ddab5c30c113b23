use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod storage;

/// How long in-flight connections may run after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::Config::load_from(&path)?,
        None => config::Config::load()?,
    };

    logger::init(&cfg)?;

    // Build the runtime, sized by `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(cfg));

    let root = state.store.root();
    let existed = state.store.exists(root).await;
    if let Err(e) = state.store.ensure_root().await {
        logger::log_error(&format!("Cannot prepare storage root: {e}"));
        return Err(e.into());
    }
    if !existed {
        logger::log_root_created(root);
    }

    let listener = server::create_listener(addr)?;
    server::start_signal_handler(Arc::clone(&state.shutdown))?;

    logger::log_server_start(&addr, &state.config);

    let active_connections = Arc::new(AtomicUsize::new(0));

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            server::start_server_loop(listener, Arc::clone(&state), Arc::clone(&active_connections))
                .await;
            let open = server::drain_connections(&active_connections, SHUTDOWN_GRACE).await;
            if open > 0 {
                logger::log_warning(&format!("Exiting with {open} connection(s) still open"));
            }
        })
        .await;

    Ok(())
}
