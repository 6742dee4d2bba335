/// Length of a hex encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Prefix for environment variables overriding settings.
pub const ENV_PREFIX: &str = "SIGNED_REPLY";
/// Separator between nested setting names in environment variables.
pub const ENV_SEPARATOR: &str = "__";
