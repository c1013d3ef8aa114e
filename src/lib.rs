// PUCT Monte Carlo tree search for chess over a policy/value oracle
pub mod codec;
pub mod state;
pub mod board;
pub mod oracle;
pub mod tree;
pub mod clock;
pub mod config;
pub mod error;
pub mod search;
pub mod policy;
pub mod selfplay;
pub mod uci;

pub use board::ChessPosition;
pub use clock::{Clock, StepClock, SystemClock};
pub use codec::{decode, encode, ACTION_SPACE};
pub use config::SearchConfig;
pub use error::SearchError;
pub use oracle::{Evaluation, MaterialOracle, PolicyValueOracle, UniformOracle};
pub use policy::extract_policy_vector;
pub use search::{EngineState, SearchEngine, SearchReport};
pub use state::{GameOutcome, PositionState};
