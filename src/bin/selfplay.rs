use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use piezero::clock::SystemClock;
use piezero::oracle::MaterialOracle;
use piezero::selfplay::{generate_games, SelfPlayParams};
use std::io::{BufWriter, Write};

#[derive(Parser, Debug)]
#[command(name = "piezero-selfplay", about = "Generate MCTS self-play games and print training samples as JSON lines")]
struct Args {
    #[arg(long, default_value_t = 10)]
    games: usize,
    #[arg(long, default_value_t = 200)]
    max_plies: usize,
    /// Search time per move in seconds
    #[arg(long, default_value_t = 0.1)]
    time: f64,
    #[arg(long, default_value_t = 1.0)]
    c_puct: f64,
    #[arg(long, default_value_t = 1.0)]
    temperature: f32,
    #[arg(long, default_value_t = 20)]
    temperature_moves: usize,
    #[arg(long, default_value_t = 0.3)]
    dirichlet_alpha: f64,
    #[arg(long, default_value_t = 0.25)]
    dirichlet_epsilon: f64,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Worker threads (0 = rayon default)
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let a = Args::parse();
    if a.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(a.threads)
            .build_global()
            .context("configuring rayon thread pool")?;
    }
    let params = SelfPlayParams {
        games: a.games,
        max_plies: a.max_plies,
        time_budget_secs: a.time,
        c_puct: a.c_puct,
        temperature: a.temperature,
        temperature_moves: a.temperature_moves,
        dirichlet_alpha: a.dirichlet_alpha,
        dirichlet_epsilon: a.dirichlet_epsilon,
        seed: a.seed,
    };
    eprintln!("Generating {} games (time={}s, c_puct={}, tau={}, dir_eps={})", a.games, a.time, a.c_puct, a.temperature, a.dirichlet_epsilon);

    let bar = ProgressBar::new(a.games as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} games [{elapsed_precise}]")
            .context("progress template")?,
    );
    let games = generate_games(
        &params,
        |_| (MaterialOracle::default(), SystemClock::new()),
        |_| bar.inc(1),
    )?;
    bar.finish();

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0usize;
    for g in &games {
        for s in &g.samples {
            writeln!(out, "{}", serde_json::to_string(s)?)?;
            written += 1;
        }
    }
    out.flush()?;
    eprintln!("Wrote {} samples from {} games", written, games.len());
    Ok(())
}
