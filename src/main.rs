use anyhow::{Context, Result};
use clap::Parser;
use cozy_chess::Color;
use piezero::oracle::{MaterialOracle, PolicyValueOracle, UniformOracle};
use piezero::uci::UciEngine;
use piezero::{ChessPosition, GameOutcome, PositionState, SearchConfig, SearchEngine};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chess against the MCTS engine", long_about = None)]
struct Args {
    /// Operation mode: 'h' for human vs engine, 's' for self play, 'u' for UCI
    #[arg(long, default_value = "h")]
    mode: String,

    /// Your color: 'w' for white, 'b' for black
    #[arg(long, default_value = "w")]
    color: String,

    /// Thinking time per engine move in seconds
    #[arg(long)]
    time: Option<f64>,

    /// PUCT exploration constant
    #[arg(long)]
    c_puct: Option<f64>,

    /// Position evaluator: 'material' or 'uniform'
    #[arg(long, default_value = "material")]
    oracle: String,

    /// JSON search config; command line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print search statistics
    #[arg(long)]
    verbose: bool,

    /// Starting FEN position
    #[arg(long)]
    fen: Option<String>,
}

fn parse_color(color_str: &str) -> Result<Color> {
    match color_str.to_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => anyhow::bail!("Invalid color: use 'w' or 'b'"),
    }
}

fn load_config(args: &Args) -> Result<SearchConfig> {
    let mut cfg = match &args.config {
        Some(path) => SearchConfig::from_json_file(path)
            .with_context(|| format!("loading search config {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if let Some(t) = args.time { cfg.time_budget_secs = t; }
    if let Some(c) = args.c_puct { cfg.c_puct = c; }
    cfg.validate()?;
    Ok(cfg)
}

fn get_human_move(pos: &ChessPosition) -> Result<ChessPosition> {
    loop {
        print!("Enter your move (e.g., e2e4): ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            anyhow::bail!("stdin closed");
        }
        match pos.play_uci(input.trim()) {
            Ok(next) => return Ok(next),
            Err(e) => println!("{e}"),
        }
    }
}

fn announce_result(pos: &ChessPosition, outcome: GameOutcome) {
    let mover = if pos.side_to_move() == Color::White { "White" } else { "Black" };
    let other = if pos.side_to_move() == Color::White { "Black" } else { "White" };
    match outcome {
        GameOutcome::Loss => println!("\nCheckmate! {other} wins!"),
        GameOutcome::Win => println!("\n{mover} wins!"),
        GameOutcome::Draw => println!("\nGame is a draw!"),
    }
}

fn play<O: PolicyValueOracle<ChessPosition>>(args: &Args, config: SearchConfig, oracle: O) -> Result<()> {
    let mode = args.mode.chars().next().unwrap_or('h');
    if mode == 'u' {
        let mut uci = UciEngine::new(oracle, config);
        uci.run_loop()?;
        return Ok(());
    }
    let human_color = parse_color(&args.color)?;
    let c_puct = config.c_puct;
    let mut engine = SearchEngine::new(oracle, config);

    let mut pos = match &args.fen {
        Some(fen) => ChessPosition::from_fen(fen)?,
        None => ChessPosition::startpos(),
    };

    loop {
        if let Some(outcome) = pos.outcome() {
            println!("\n{}", pos.board());
            announce_result(&pos, outcome);
            break;
        }

        println!("\n{}'s turn", if pos.side_to_move() == Color::White { "White" } else { "Black" });
        println!("{}", pos.board());

        if mode == 'h' && pos.side_to_move() == human_color {
            pos = get_human_move(&pos)?;
            continue;
        }

        if args.verbose {
            println!("Thinking...");
        }
        let mv = engine.best_move(&pos)?;
        if args.verbose {
            if let (Some(tree), Some(r)) = (engine.tree(), engine.report()) {
                println!("{}", tree.statistics_string(tree.root(), c_puct, 10));
                println!(
                    "Simulations: {}, nodes: {}, Q: {:.3}, elapsed: {:.2}s",
                    r.simulations, r.nodes, r.root_value, r.elapsed.as_secs_f32()
                );
            }
        }
        println!("Computer plays: {}", pos.move_to_uci(mv));
        pos = pos.apply(mv);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;
    match args.oracle.as_str() {
        "uniform" => play(&args, config, UniformOracle),
        "material" => play(&args, config, MaterialOracle::default()),
        other => anyhow::bail!("Unknown oracle '{other}': use 'material' or 'uniform'"),
    }
}
