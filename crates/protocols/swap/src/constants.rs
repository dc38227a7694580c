//! Swap Constants
//!
//! Fee bounds, timing windows and approval amounts used by the swap flow.

/// Protocol fee bounds
pub mod fees {
    /// Largest `feeBps()` value trusted from the swap contract (5%)
    pub const MAX_FEE_BPS: u64 = 500;
}

/// Timing windows
pub mod timing {
    /// Swap deadline offset from submission time (10 minutes)
    pub const DEADLINE_WINDOW_SECS: u64 = 600;

    /// Debounce between amount edits and the quote they trigger
    pub const QUOTE_DEBOUNCE_MS: u64 = 300;
}

/// Approval amounts
pub mod approval {
    use alloy_primitives::U256;

    /// Unlimited allowance
    pub const MAX_APPROVAL: U256 = U256::MAX;
}

/// Precision used when reporting native shortfalls
pub const NATIVE_REPORT_PRECISION: usize = 6;
