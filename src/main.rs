use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::watch;

mod api;
mod config;
mod handler;
mod http;
mod logger;
mod server;
mod store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config::config_path_from_args(std::env::args().skip(1));
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker threads default to the CPU core count
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
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    if !state.store.path().is_file() {
        // Not fatal: queries answer 500 until the file appears
        logger::log_warning(&format!(
            "Database file not found: {}",
            state.store.path().display()
        ));
    }

    logger::log_server_start(&addr, &cfg);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    server::signal::start_signal_handler(shutdown_tx);

    server::start_server_loop(listener, state, Arc::new(AtomicUsize::new(0)), shutdown_rx).await;
    Ok(())
}
