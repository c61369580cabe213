//! Live meter monitor over simulated plugin runtimes.

use super::common::ChainArgs;
use crate::meter_board::MeterBoard;
use crate::simulated::Simulator;
use clap::Args;
use rackline_config::{MemoryOrderStore, OrderStore};
use rackline_panel::ChainPanel;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct MonitorArgs {
    #[command(flatten)]
    chain: ChainArgs,

    /// Stop after this many seconds (runs until Ctrl+C when omitted)
    #[arg(short, long)]
    seconds: Option<f32>,

    /// Board refresh rate in Hz
    #[arg(short, long, default_value = "4")]
    rate: f32,

    /// Emission rate of the simulated plugins in Hz
    #[arg(long, default_value = "50")]
    sim_rate: f32,

    /// Use a throwaway in-memory order instead of the saved one
    #[arg(long)]
    ephemeral: bool,
}

pub fn run(args: MonitorArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.rate > 0.0 && args.rate.is_finite(),
        "--rate must be a positive number of Hz"
    );
    anyhow::ensure!(
        args.sim_rate > 0.0 && args.sim_rate.is_finite(),
        "--sim-rate must be a positive number of Hz"
    );
    if let Some(secs) = args.seconds {
        anyhow::ensure!(secs >= 0.0 && secs.is_finite(), "--seconds must not be negative");
    }

    let store: Arc<dyn OrderStore> = if args.ephemeral {
        Arc::new(MemoryOrderStore::new())
    } else {
        Arc::new(args.chain.open_store())
    };

    let mut sim = Simulator::new();
    let mut panel = ChainPanel::new(args.chain.chain, store, &sim.runtimes(), MeterBoard::new());

    println!("Monitoring {} ({})", args.chain.chain.label(), args.chain.chain);
    println!("Press Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    sim.start(args.sim_rate)?;

    let period = Duration::from_secs_f32(1.0 / args.rate);
    let deadline = args
        .seconds
        .map(|secs| Instant::now() + Duration::from_secs_f32(secs));
    let mut frames = 0u64;
    let mut samples = 0usize;

    loop {
        let report = panel.poll();
        samples += report.samples;
        frames += 1;

        if report.resorted {
            println!("(order changed)");
        }
        println!("{}", panel.presentation().render());

        let done = !running.load(Ordering::SeqCst)
            || deadline.is_some_and(|d| Instant::now() >= d);
        if done {
            break;
        }
        std::thread::sleep(period);
    }

    sim.stop();
    panel.teardown();
    tracing::info!(frames, samples, "monitor stopped");
    println!("Done!");
    Ok(())
}
