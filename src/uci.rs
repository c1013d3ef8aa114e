use std::io::{self, BufRead, Write};
use std::time::Duration;

use log::warn;

use crate::board::ChessPosition;
use crate::config::SearchConfig;
use crate::oracle::PolicyValueOracle;
use crate::search::SearchEngine;

/// Share of the remaining clock spent on one move when only wtime/btime are given.
const MOVES_TO_GO: u32 = 30;

pub struct UciEngine<O: PolicyValueOracle<ChessPosition>> {
    pos: ChessPosition,
    engine: SearchEngine<ChessPosition, O>,
}

impl<O: PolicyValueOracle<ChessPosition>> UciEngine<O> {
    pub fn new(oracle: O, config: SearchConfig) -> Self {
        Self { pos: ChessPosition::startpos(), engine: SearchEngine::new(oracle, config) }
    }

    pub fn position(&self) -> &ChessPosition { &self.pos }

    fn cmd_uci<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name PieZero MCTS")?;
        writeln!(out, "id author PieBot Team")?;
        writeln!(out, "uciok")
    }

    fn cmd_position(&mut self, args: &str) {
        // Supports: 'position startpos [moves ...]' and 'position fen <fen> [moves ...]'
        let mut tokens = args.split_whitespace();
        let base = match tokens.next() {
            Some("startpos") => Some(ChessPosition::startpos()),
            Some("fen") => {
                let fen_fields: Vec<&str> = tokens.by_ref().take_while(|&t| t != "moves").collect();
                match ChessPosition::from_fen(&fen_fields.join(" ")) {
                    Ok(p) => Some(p),
                    Err(e) => { warn!("{e}"); None }
                }
            }
            _ => None,
        };
        let Some(base) = base else { return };
        let moves: Vec<&str> = tokens.filter(|&t| t != "moves").collect();
        match base.play_uci_sequence(&moves) {
            Ok(p) => self.pos = p,
            Err(e) => warn!("ignoring position command: {e}"),
        }
    }

    fn parse_budget(&self, args: &str) -> Duration {
        let mut movetime = None;
        let mut clock_ms = None;
        let white = self.pos.side_to_move() == cozy_chess::Color::White;
        let mut tokens = args.split_whitespace();
        while let Some(tok) = tokens.next() {
            let value = |t: Option<&str>| t.and_then(|s| s.parse::<u64>().ok());
            match tok {
                "movetime" => movetime = value(tokens.next()),
                "wtime" if white => clock_ms = value(tokens.next()),
                "btime" if !white => clock_ms = value(tokens.next()),
                _ => {}
            }
        }
        match (movetime, clock_ms) {
            (Some(ms), _) => Duration::from_millis(ms),
            (None, Some(ms)) => Duration::from_millis(ms) / MOVES_TO_GO,
            (None, None) => self.engine.config().time_budget(),
        }
    }

    fn cmd_go<W: Write>(&mut self, args: &str, out: &mut W) -> io::Result<()> {
        let budget = self.parse_budget(args);
        match self.engine.search(&self.pos, budget) {
            Ok(mv) => {
                if let Some(r) = self.engine.report() {
                    writeln!(
                        out,
                        "info nodes {} time {} score cp {} string simulations {}",
                        r.nodes,
                        r.elapsed.as_millis(),
                        (r.root_value * 100.0).round() as i64,
                        r.simulations
                    )?;
                }
                writeln!(out, "bestmove {}", self.pos.move_to_uci(mv))
            }
            Err(e) => {
                warn!("search failed: {e}");
                writeln!(out, "bestmove 0000")
            }
        }
    }

    /// Handle one command line. Returns `false` on `quit`.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<bool> {
        let line = line.trim();
        match line {
            "" => {}
            "uci" => self.cmd_uci(out)?,
            "isready" => writeln!(out, "readyok")?,
            "ucinewgame" => self.pos = ChessPosition::startpos(),
            "quit" => return Ok(false),
            "stop" => {}
            "go" => self.cmd_go("", out)?,
            _ => {
                if let Some(rest) = line.strip_prefix("position ") {
                    self.cmd_position(rest);
                } else if let Some(rest) = line.strip_prefix("go ") {
                    self.cmd_go(rest, out)?;
                }
            }
        }
        out.flush()?;
        Ok(true)
    }

    pub fn run_loop(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        for line in stdin.lock().lines() {
            let line = line?;
            if !self.handle_line(&line, &mut stdout.lock())? { break; }
        }
        Ok(())
    }
}
