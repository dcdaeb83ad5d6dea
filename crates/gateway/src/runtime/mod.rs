pub mod augment;
pub mod finalize;
pub mod intent;
pub mod prompt;
pub mod recovery;
pub mod rounds;
pub mod session;
pub mod session_lock;
pub mod turn;

pub use turn::{
    execute_turn, resolve_local_turn, run_turn, ModelSelection, TurnDeps, TurnError, TurnRequest,
    TurnResponse,
};
