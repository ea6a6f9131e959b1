//! Environment-backed API key lookup.
//!
//! The provider's key lives in the environment variable named by
//! [`ProviderConfig::api_key_env`]. It is wrapped in a [`SecretString`] as
//! soon as it is read and only exposed when building request headers.

use parley_types::llm::ProviderConfig;
use secrecy::SecretString;

/// Read an API key from the environment variable `var`.
///
/// Unset, empty and non-Unicode values all count as absent.
pub fn read_env_secret(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val)),
        _ => None,
    }
}

/// Resolve the API key for `config`, if one is configured and present.
pub fn resolve_api_key(config: &ProviderConfig) -> Option<SecretString> {
    config.api_key_env.as_deref().and_then(read_env_secret)
}
