//! framefeedd - frame ingestion daemon
//!
//! This daemon:
//! 1. Loads the feed configuration (sources, geometry, queue bound)
//! 2. Spawns one ingestion worker per valid source
//! 3. Drains the merged frame queue in arrival order
//! 4. Exits once every source is exhausted, or on Ctrl-C
//!
//! The consumer loop here is the hand-off point for an encoder pipeline; it
//! accounts for frames and drops them, which is all a standalone feed run
//! needs.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use framefeed::{FeedConfig, Supervisor};

#[derive(Parser)]
#[command(name = "framefeedd", version, about = "Multi-source raw frame ingestion daemon")]
struct Args {
    /// Path to the TOML feed configuration.
    #[arg(long, env = "FRAMEFEED_CONFIG")]
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = FeedConfig::load_from(&args.config)?;
    if cfg.sources.is_empty() {
        return Err(anyhow!(
            "no valid sources in {}",
            args.config.display()
        ));
    }

    log::info!(
        "framefeedd starting: {} source(s), queue capacity {}",
        cfg.sources.len(),
        cfg.queue_capacity
    );

    let (supervisor, consumer) = Supervisor::start(&cfg.sources, cfg.queue_capacity);
    if supervisor.worker_count() == 0 {
        supervisor.shutdown();
        return Err(anyhow!("no configured source could be constructed"));
    }

    let stop = supervisor.stop_flag();
    ctrlc::set_handler(move || {
        log::info!("shutdown requested");
        stop.store(true, Ordering::SeqCst);
    })?;

    let mut frames = 0u64;
    let mut bytes = 0u64;
    while let Some(frame) = consumer.pop() {
        frames += 1;
        bytes += frame.data().len() as u64;
        if frames % 100 == 0 {
            log::info!(
                "consumed {} frames ({} bytes), last {}x{} seq {} at {:?}",
                frames,
                bytes,
                frame.width(),
                frame.height(),
                frame.sequence(),
                frame.timestamp()
            );
        }
    }

    // Queue completed: every worker has signalled done and the buffer is
    // drained.
    supervisor.shutdown();
    log::info!("feed complete: {} frames, {} bytes", frames, bytes);
    Ok(())
}
