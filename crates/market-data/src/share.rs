//! Share text and intent links for social posts

use reqwest::Url;

const X_INTENT: &str = "https://twitter.com/intent/tweet";
const WARPCAST_INTENT: &str = "https://warpcast.com/~/compose";

/// Post text for a completed swap
pub fn swap_share_text(amount_in: &str, symbol_in: &str, amount_out: &str, symbol_out: &str) -> String {
    format!(
        "Just swapped {} {} for {} {} on Toby Swapper. Every swap burns $TOBY.",
        amount_in, symbol_in, amount_out, symbol_out
    )
}

/// Post text for the running burn total
pub fn burn_share_text(burned: &str) -> String {
    format!("{} $TOBY burned so far through Toby Swapper.", burned)
}

/// X (Twitter) compose link
pub fn x_intent_url(text: &str, link: &str) -> Option<String> {
    Url::parse_with_params(X_INTENT, &[("text", text), ("url", link)])
        .ok()
        .map(String::from)
}

/// Warpcast compose link with the app URL as an embed
pub fn warpcast_intent_url(text: &str, link: &str) -> Option<String> {
    Url::parse_with_params(WARPCAST_INTENT, &[("text", text), ("embeds[]", link)])
        .ok()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_text() {
        assert_eq!(
            swap_share_text("0.5", "ETH", "1000", "TOBY"),
            "Just swapped 0.5 ETH for 1000 TOBY on Toby Swapper. Every swap burns $TOBY."
        );
    }

    #[test]
    fn test_intent_urls_are_encoded() {
        let x = x_intent_url("1 $TOBY & more", "https://tobyswapper.xyz").unwrap();
        assert!(x.starts_with("https://twitter.com/intent/tweet?text=1+%24TOBY+%26+more"));
        assert!(x.contains("url=https%3A%2F%2Ftobyswapper.xyz"));

        let w = warpcast_intent_url("hi", "https://tobyswapper.xyz").unwrap();
        assert!(w.starts_with("https://warpcast.com/~/compose?text=hi&embeds%5B%5D="));
    }
}
