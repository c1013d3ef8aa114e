use piezero::oracle::MaterialOracle;
use piezero::uci::UciEngine;
use piezero::SearchConfig;
use cozy_chess::Color;

fn engine() -> UciEngine<MaterialOracle> {
    let cfg = SearchConfig { time_budget_secs: 0.05, ..SearchConfig::default() };
    UciEngine::new(MaterialOracle::default(), cfg)
}

fn send(uci: &mut UciEngine<MaterialOracle>, line: &str) -> String {
    let mut out = Vec::new();
    uci.handle_line(line, &mut out).expect("io");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn apply_startpos_moves_sequence() {
    let mut uci = engine();
    send(&mut uci, "position startpos moves e2e4 e7e5 g1f3");
    assert_eq!(uci.position().side_to_move(), Color::Black, "expected black to move after 3 plies");
}

#[test]
fn fen_position_with_moves() {
    let mut uci = engine();
    send(&mut uci, "position fen r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1 moves e1g1");
    assert_eq!(uci.position().side_to_move(), Color::Black);
}

#[test]
fn handshake_and_go() {
    let mut uci = engine();
    assert!(send(&mut uci, "uci").contains("uciok"));
    assert_eq!(send(&mut uci, "isready").trim(), "readyok");
    send(&mut uci, "position fen k7/8/8/8/8/8/3qQ3/7K w - - 0 1");
    let reply = send(&mut uci, "go movetime 50");
    assert!(reply.lines().any(|l| l.starts_with("bestmove ")), "no bestmove in {reply:?}");
}

#[test]
fn quit_stops_the_loop() {
    let mut uci = engine();
    let mut out = Vec::new();
    assert!(!uci.handle_line("quit", &mut out).unwrap());
}

#[test]
fn info_line_reports_tree_nodes_and_simulations() {
    let mut uci = engine();
    send(&mut uci, "position startpos");
    let reply = send(&mut uci, "go movetime 30");
    let info = reply.lines().find(|l| l.starts_with("info ")).expect("info line");
    let nodes: usize = info.split_whitespace().nth(2).unwrap().parse().unwrap();
    // root plus its 20 children at least
    assert!(nodes >= 21, "{info}");
    assert!(info.contains(" string simulations "), "{info}");
}
