use cozy_chess::Color;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::ChessPosition;
use crate::clock::Clock;
use crate::codec::decode;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::oracle::PolicyValueOracle;
use crate::policy::{sample_from_policy, sparse_entries};
use crate::search::SearchEngine;
use crate::state::{GameOutcome, PositionState};

#[derive(Clone, Debug)]
pub struct SelfPlayParams {
    pub games: usize,
    pub max_plies: usize,
    pub time_budget_secs: f64,
    pub c_puct: f64,
    pub temperature: f32,          // visit-count temperature; 0 => most visited
    pub temperature_moves: usize,  // apply temperature for first N plies
    pub dirichlet_alpha: f64,
    pub dirichlet_epsilon: f64,    // root noise mixing; 0 disables
    pub seed: u64,
}

impl Default for SelfPlayParams {
    fn default() -> Self {
        Self {
            games: 1,
            max_plies: 200,
            time_budget_secs: 0.1,
            c_puct: 1.0,
            temperature: 1.0,
            temperature_moves: 20,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
            seed: 42,
        }
    }
}

/// One training position: root visit distribution and final result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub fen: String,
    /// Non-zero `(action index, probability)` pairs.
    pub policy: Vec<(usize, f32)>,
    /// Game result from the side to move: 1 win, -1 loss, 0 draw.
    pub outcome: f32,
}

#[derive(Clone, Debug)]
pub struct GameRecord {
    pub moves: Vec<String>,
    pub result: i8, // 1 white win, 0 draw, -1 black win
    pub samples: Vec<TrainingSample>,
}

fn white_result(stm: Color, outcome: GameOutcome) -> i8 {
    let stm_sign = if stm == Color::White { 1 } else { -1 };
    match outcome {
        GameOutcome::Win => stm_sign,
        GameOutcome::Loss => -stm_sign,
        GameOutcome::Draw => 0,
    }
}

/// Play one game of the engine against itself from the start position.
///
/// Games cut off at `max_plies` are scored as draws.
pub fn play_game<O, C>(params: &SelfPlayParams, game_index: usize, oracle: O, clock: C) -> Result<GameRecord, SearchError>
where
    O: PolicyValueOracle<ChessPosition>,
    C: Clock,
{
    let game_seed = params.seed ^ game_index as u64;
    let config = SearchConfig {
        c_puct: params.c_puct,
        time_budget_secs: params.time_budget_secs,
        dirichlet_alpha: params.dirichlet_alpha,
        dirichlet_epsilon: params.dirichlet_epsilon,
        seed: game_seed,
    };
    config.validate()?;
    let budget = config.time_budget();
    let mut engine = SearchEngine::with_clock(oracle, config, clock);
    let mut rng = SmallRng::seed_from_u64(game_seed.rotate_left(13));

    let mut pos = ChessPosition::startpos();
    let mut moves = Vec::new();
    let mut pending: Vec<(String, Color, Vec<(usize, f32)>)> = Vec::new();
    let result = loop {
        if let Some(outcome) = pos.outcome() {
            break white_result(pos.side_to_move(), outcome);
        }
        if moves.len() >= params.max_plies {
            break 0;
        }
        let best = engine.search(&pos, budget)?;
        let policy = match engine.policy_vector() {
            Ok(p) => Some(p),
            Err(SearchError::NoSimulations) => None,
            Err(e) => return Err(e),
        };
        let use_temp = params.temperature > 0.0 && moves.len() < params.temperature_moves;
        let mv = match &policy {
            Some(p) if use_temp => sample_from_policy(p, params.temperature, &mut rng)
                .and_then(|idx| decode(&pos, idx))
                .unwrap_or(best),
            _ => best,
        };
        if let Some(p) = policy {
            pending.push((pos.fen(), pos.side_to_move(), sparse_entries(&p)));
        }
        moves.push(pos.move_to_uci(mv));
        pos = pos.apply(mv);
    };

    let samples = pending
        .into_iter()
        .map(|(fen, stm, policy)| {
            let sign = if stm == Color::White { 1.0 } else { -1.0 };
            TrainingSample { fen, policy, outcome: sign * result as f32 }
        })
        .collect();
    info!("game {} finished: {} plies, result {}", game_index, moves.len(), result);
    Ok(GameRecord { moves, result, samples })
}

/// Play `params.games` games in parallel.
///
/// `factory` builds the oracle and clock for a game index; `on_game` is
/// called as each game completes. Records come back in game order.
pub fn generate_games<O, C, F, G>(params: &SelfPlayParams, factory: F, on_game: G) -> Result<Vec<GameRecord>, SearchError>
where
    O: PolicyValueOracle<ChessPosition>,
    C: Clock,
    F: Fn(usize) -> (O, C) + Sync,
    G: Fn(&GameRecord) + Sync,
{
    (0..params.games)
        .into_par_iter()
        .map(|gi| {
            let (oracle, clock) = factory(gi);
            let record = play_game(params, gi, oracle, clock)?;
            on_game(&record);
            Ok(record)
        })
        .collect()
}
