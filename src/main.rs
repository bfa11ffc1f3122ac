use anyhow::{bail, Context};
use clap::Parser;
use cpu_sched::{
    gantt,
    scheduler::{DisplayTerminal, LineControl, RunOutcome},
    ConfigFile,
};
use std::{fs, io, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "cpu-sched",
    about = "Simulate CPU scheduling policies tick by tick and draw the resulting Gantt chart."
)]
struct Args {
    /// Simulation file (`algorithm;quantum` header, then `id;color;arrival;duration;priority`)
    #[arg(default_value = "config_exemplo.txt")]
    config: PathBuf,

    /// Override the algorithm named in the file (FIFO, SRTF, PRIOP, RR)
    #[arg(long, value_name = "NAME")]
    algorithm: Option<String>,

    /// Override the quantum from the file
    #[arg(long, allow_negative_numbers = true)]
    quantum: Option<i64>,

    /// Pause after every tick and wait for enter on stdin
    #[arg(long, conflicts_with = "tui")]
    step: bool,

    /// Step through the run in a terminal UI
    #[arg(long)]
    tui: bool,

    /// Where to write the SVG Gantt chart
    #[arg(long, value_name = "PATH", default_value = "output/gantt.svg")]
    gantt: PathBuf,

    /// Also write the statistics as JSON to this path
    #[arg(long, value_name = "PATH")]
    stats_json: Option<PathBuf>,

    /// Skip the text timeline on stdout
    #[arg(long)]
    no_timeline: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ConfigFile::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(algorithm) = args.algorithm {
        config.policy_name = algorithm;
    }
    if let Some(quantum) = args.quantum {
        config.quantum = quantum;
    }

    println!("Loaded processes:");
    for process in &config.processes {
        println!(" - {process}");
    }

    let mut simulation = config
        .into_simulation()
        .context("invalid simulation setup")?;
    info!(policy = simulation.policy().name(), "running simulation");

    let outcome = if args.tui {
        let mut terminal = DisplayTerminal::new(simulation.policy().name())
            .context("failed to set up the terminal")?;
        simulation.run_stepped(&mut terminal)
    } else if args.step {
        let stdin = io::stdin();
        let mut control = LineControl::new(stdin.lock(), io::stdout());
        simulation.run_stepped(&mut control)
    } else {
        simulation.run();
        RunOutcome::Completed
    };

    if outcome == RunOutcome::Aborted {
        bail!("simulation aborted at tick {}", simulation.now());
    }

    if !args.no_timeline {
        println!();
        println!(
            "{}",
            gantt::render_text(simulation.processes(), simulation.trace())
        );
    }

    let report = simulation.report();
    println!();
    println!("{report}");

    gantt::write_svg(simulation.processes(), &args.gantt)
        .with_context(|| format!("writing {}", args.gantt.display()))?;

    if let Some(path) = args.stats_json {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "statistics written");
    }

    Ok(())
}
