//! Agency join code generation.

use rand::Rng;
use rand::distributions::Alphanumeric;

pub const JOIN_CODE_LEN: usize = 6;

/// Generate a random alphanumeric join code.
///
/// Uniqueness is enforced by the store's unique index, not by this
/// generator; a collision surfaces as a database error.
pub fn generate_join_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(JOIN_CODE_LEN)
        .map(char::from)
        .collect()
}
