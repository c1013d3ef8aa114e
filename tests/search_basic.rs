use cozy_chess::Board;
use piezero::oracle::{material_eval_cp, MaterialOracle, UniformOracle};
use piezero::{ChessPosition, PositionState, SearchConfig, SearchEngine, StepClock};

fn search_uci<O: piezero::PolicyValueOracle<ChessPosition>>(fen: &str, oracle: O, sims: u32) -> String {
    let pos = ChessPosition::from_fen(fen).expect("valid fen");
    let (clock, budget) = StepClock::for_simulations(sims);
    let mut engine = SearchEngine::with_clock(oracle, SearchConfig::default(), clock);
    let mv = engine.search(&pos, budget).expect("search");
    pos.move_to_uci(mv)
}

#[test]
fn eval_material_startpos_is_zeroish() {
    let cp = material_eval_cp(&Board::default());
    assert!(cp.abs() < 5, "startpos material not near zero: {cp}");
}

#[test]
fn search_returns_legal_move_startpos() {
    let pos = ChessPosition::startpos();
    let (clock, budget) = StepClock::for_simulations(30);
    let mut engine = SearchEngine::with_clock(UniformOracle, SearchConfig::default(), clock);
    let mv = engine.search(&pos, budget).expect("search");
    assert!(pos.legal_moves().contains(&mv));
    assert_eq!(engine.report().unwrap().simulations, 30);
}

#[test]
fn search_prefers_winning_queen_capture() {
    // Qe2xd2 wins the black queen
    assert_eq!(search_uci("k7/8/8/8/8/8/3qQ3/7K w - - 0 1", MaterialOracle::default(), 100), "e2d2");
}

#[test]
fn forced_recapture_is_the_only_move() {
    // Kxg2 is the only legal reply to the queen check
    assert_eq!(search_uci("7k/8/8/8/8/8/6q1/7K w - - 0 1", MaterialOracle::default(), 0), "h1g2");
}

#[test]
fn best_move_uses_the_configured_budget() {
    let cfg = SearchConfig { time_budget_secs: 0.0105, ..SearchConfig::default() };
    let (clock, _) = StepClock::for_simulations(0);
    let mut engine = SearchEngine::with_clock(MaterialOracle::default(), cfg, clock);
    engine.best_move(&ChessPosition::startpos()).expect("search");
    // readings at 1..=10ms fall inside the 10.5ms budget
    assert_eq!(engine.report().unwrap().simulations, 10);
}
