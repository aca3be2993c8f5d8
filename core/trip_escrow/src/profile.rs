//! Deterministic placeholder profile derived from a wallet address, used on
//! first wallet login before the user registers.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletProfile {
    pub wallet_address: String,
    pub username: String,
    pub age: u32,
}

/// `user-<first six chars after 0x>` and an age in `18..=58` taken from a
/// 31-multiplier rolling hash of the lowercased address.
///
/// Returns `None` for a blank address.
pub fn derive_wallet_profile(wallet_address: &str) -> Option<WalletProfile> {
    if wallet_address.trim().is_empty() {
        return None;
    }
    let clean = wallet_address.to_lowercase();
    let stem = clean.strip_prefix("0x").unwrap_or(&clean);
    let username = format!("user-{}", stem.chars().take(6).collect::<String>());

    let hash = clean
        .encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)));

    Some(WalletProfile {
        wallet_address: wallet_address.to_string(),
        username,
        age: 18 + hash % 41,
    })
}
