//! Approval token issuance.
//!
//! Tokens are advisory: nothing stores or verifies them. They only need to be
//! hard to predict and distinct between calls.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

pub const TOKEN_PREFIX: &str = "ML_APPROVED_";

/// Number of hex characters kept from the digest.
const TOKEN_HEX_LEN: usize = 16;

/// Issue a token for `trial_id` from the current time and a fresh random value.
pub fn generate_token(trial_id: &str) -> String {
    let now = Utc::now();
    let timestamp = now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9;
    let nonce: f64 = rand::thread_rng().gen_range(0.0..1.0);
    token_from_parts(trial_id, timestamp, nonce)
}

fn token_from_parts(trial_id: &str, timestamp: f64, nonce: f64) -> String {
    let unique = format!("{}_{}_{}", trial_id, timestamp, nonce);
    let digest = format!("{:x}", Sha256::digest(unique.as_bytes()));
    format!("{}{}", TOKEN_PREFIX, &digest[..TOKEN_HEX_LEN])
}
