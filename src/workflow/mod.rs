pub mod battle_ctx;
pub mod battle_flow;
pub mod compare_flow;
pub mod results_browser;

pub use battle_ctx::DocumentCtx;
pub use battle_flow::{BattleFlow, BattleRound, BattleState, BlindOutput, RevealedOutput};
pub use compare_flow::{CompareFlow, ComparisonOutcome, CostOutcome, ProviderOutcome};
pub use results_browser::{ResultsBrowser, ResultsPage};
