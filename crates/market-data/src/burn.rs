//! Cumulative burn total

use alloy_primitives::{Address, U256};
use base_client::ChainReader;
use serde::{Deserialize, Serialize};
use toby_core::{format_amount, ChainError};

/// Decimal places shown for the burn total
const BURN_DISPLAY_PRECISION: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnTotal {
    pub raw: U256,
    pub decimals: u8,
    /// Human value, e.g. "1234567.89"
    pub formatted: String,
}

/// Read `totalBurned()` and scale by the burn token's decimals
pub async fn read_burn_total(
    reader: &dyn ChainReader,
    swapper: Address,
    burn_token: Address,
) -> Result<BurnTotal, ChainError> {
    let raw = reader.total_burned(swapper).await?;
    let decimals = reader.erc20_decimals(burn_token).await?;
    Ok(BurnTotal {
        raw,
        decimals,
        formatted: format_amount(raw, decimals, BURN_DISPLAY_PRECISION),
    })
}
