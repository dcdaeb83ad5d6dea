//! Shared helpers for the HTTP adapter.

use gm_domain::config::AuthConfig;
use gm_domain::error::{Error, Result};

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Where the Backboard API key was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Config,
    Env,
    Keychain,
}

/// Find the Backboard API key: `[assistant.auth] key`, then the `env` var,
/// then the OS keychain entry. Empty values count as unset.
pub fn resolve_api_key(auth: &AuthConfig) -> Result<(String, KeySource)> {
    if let Some(key) = auth.key.as_deref().filter(|k| !k.is_empty()) {
        tracing::warn!("assistant API key is stored in plaintext config");
        return Ok((key.to_string(), KeySource::Config));
    }

    let from_env = auth
        .env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .filter(|v| !v.is_empty());
    if let Some(key) = from_env {
        return Ok((key, KeySource::Env));
    }

    if let (Some(service), Some(account)) = (&auth.service, &auth.account) {
        return keyring::Entry::new(service, account)
            .and_then(|entry| entry.get_password())
            .map(|key| (key, KeySource::Keychain))
            .map_err(|e| Error::Auth(format!("keychain entry {service}/{account}: {e}")));
    }

    Err(Error::Auth(match &auth.env {
        Some(var) => format!("no assistant API key: {var} is not set"),
        None => "no assistant API key configured under [assistant.auth]".into(),
    }))
}
