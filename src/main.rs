use clap::Parser;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use stats_control::{config, logger, server, stats};

/// HTTP control server for query statistics
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (extension optional)
    #[arg(short, long, env = "STATSD_CONFIG", default_value = "config.toml")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let cfg = config::Config::load_from(&args.config)?;
    logger::init(&cfg.logging)?;

    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, &args.config))
}

async fn async_main(
    cfg: config::Config,
    config_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state_manager = config::create_state_manager(config_path, cfg.state.persist);
    if state_manager.is_enabled() {
        logger::log_info(&format!(
            "Runtime changes persisted to {}",
            state_manager.state_path().display()
        ));
    }

    let engine = Arc::new(stats::MemoryStats::new(
        cfg.stats.interval,
        cfg.stats.top_limit,
    ));
    let state = Arc::new(config::AppState::new(&cfg, engine, state_manager).await);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    logger::log_server_start(&addr, &cfg);

    let drain_timeout = Duration::from_secs(std::cmp::max(
        cfg.performance.read_timeout,
        cfg.performance.write_timeout,
    ));
    server::start_server_loop(
        listener,
        state,
        Arc::new(AtomicUsize::new(0)),
        Arc::clone(&signals.shutdown),
        drain_timeout,
    )
    .await
}
