//! Toby swap protocol
//!
//! Route building, quoting, preflight checks and submission for the Toby
//! Swapper contract, which takes a protocol fee on every swap, converts it
//! into the burn token and forwards the rest through a Uniswap V2 router.

pub mod approval;
pub mod cache;
pub mod calculator;
pub mod constants;
pub mod path;
pub mod preflight;
pub mod quote;
pub mod service;
pub mod session;
pub mod state;
pub mod submit;
pub mod tx_builder;

// Re-exports
pub use approval::{approve_for_swap, plan_approval, ApprovalStep};
pub use cache::{AllowanceKey, BalanceKey, Poller};
pub use calculator::{deadline, fee_amount, min_output, net_amount};
pub use path::{build_candidate_paths, build_fee_path, RoutePath};
pub use preflight::{check_affordability, run_preflight, PreflightRequest};
pub use quote::{quote_swap, read_fee_bps, select_quote, QuoteOutcome};
pub use service::SwapService;
pub use session::{LatestValue, QuoteSession, QuoteTicket};
pub use state::{
    FeeLegQuote, PendingTransaction, PreflightResult, QuoteAttempt, QuoteRequest, SelectedQuote,
    SwapQuote, TxStage,
};
pub use submit::{failure_message, submit_swap, SubmissionReceipt, SubmissionTracker};
pub use tx_builder::{build_approve_tx, build_swap_tx, SwapBuildResult, SwapTxSummary};
