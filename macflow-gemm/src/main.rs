use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use macflow_gemm::*;

/// Runs a matrix multiply on a simulated MAC grid and checks it against the reference product.
#[derive(Parser, Debug)]
#[command(name = "macflow-gemm")]
struct Args {
    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid geometry preset (grid_2x2, grid_3x2, grid_4x4).
    #[arg(long)]
    preset: Option<String>,

    /// Tick budget.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Drain flow control (lossy, backpressured).
    #[arg(long)]
    drain_flow: Option<String>,
}

fn main() -> Result<()> {
    clilog::init_stderr_color_debug();
    let args = Args::parse();
    clilog::info!("macflow-gemm args:\n{:#?}", args);

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    if let Some(max_ticks) = args.max_ticks {
        config.max_ticks = max_ticks;
    }
    if let Some(drain_flow) = &args.drain_flow {
        config.drain_flow = drain_flow.parse()?;
    }

    let preset = config.preset()?;
    let (rows, cols, width) = preset.geometry();
    let (a, b) = config.matrices(preset)?;
    clilog::info!("{} ({}x{}, {}-bit words), {:?} drain, {:?}", preset, rows, cols, width, config.drain_flow, config.stimulus());

    let timer = clilog::stimer!("simulate");
    let run = preset.run(config.drain_flow, config.stimulus(), &a, &b)?;
    clilog::finish!(timer);

    let expected = a.matmul_wrapping(&b, width)?;
    println!("A =\n{a}B =\n{b}C =\n{}", run.result);
    println!(
        "{} rounds, {} transfers, {} words drained, {} dropped, {} ticks",
        run.rounds,
        run.transfers,
        run.drained,
        run.dropped.len(),
        run.ticks
    );

    if run.result != expected {
        bail!("result differs from the reference product:\n{expected}");
    }
    clilog::info!("result matches the reference product");
    Ok(())
}
