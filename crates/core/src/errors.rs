//! Error types for the wmcs-contact core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type. There is deliberately no retry or recovery layer:
//! these tools run by hand, and any failure should surface unmodified.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Keystone(#[from] KeystoneError),

    #[error(transparent)]
    OptOut(#[from] OptOutError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Directory errors
// ---------------------------------------------------------------------------

/// Errors from LDAP directory lookups.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Underlying LDAP protocol or connection error.
    #[error("LDAP error: {0}")]
    Ldap(#[from] ldap3::LdapError),

    /// The requested group entry does not exist in the directory.
    #[error("directory group not found: {0}")]
    GroupNotFound(String),
}

// ---------------------------------------------------------------------------
// Keystone errors
// ---------------------------------------------------------------------------

/// Errors from the OpenStack Keystone identity API.
#[derive(Debug, Error)]
pub enum KeystoneError {
    /// HTTP-level transport error (network, timeout, TLS).
    #[error("Keystone HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("Keystone API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Authentication succeeded but no `X-Subject-Token` header came back.
    #[error("Keystone auth response missing X-Subject-Token header")]
    MissingToken,
}

// ---------------------------------------------------------------------------
// Opt-out source errors
// ---------------------------------------------------------------------------

/// Errors from the opt-out sources (wiki page fetch, sql subprocess).
#[derive(Debug, Error)]
pub enum OptOutError {
    /// HTTP error fetching the opt-out wiki page.
    #[error("opt-out page HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The sql client binary was not found.
    #[error("sql client not found: {0}")]
    BinaryNotFound(String),

    /// The sql client exited with a non-zero status.
    #[error("sql client failed (exit {exit_code}): {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },

    /// Generic I/O wrapper for subprocess plumbing.
    #[error("opt-out I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = DirectoryError::GroupNotFound("project-tools".into());
        assert_eq!(err.to_string(), "directory group not found: project-tools");

        let err = KeystoneError::Api {
            status: 401,
            body: "unauthorized".into(),
        };
        assert!(err.to_string().contains("401"));

        let err = OptOutError::CommandFailed {
            exit_code: 2,
            stderr: "unknown database".into(),
        };
        assert!(err.to_string().contains("exit 2"));
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let dir_err = DirectoryError::GroupNotFound("tools".into());
        let core_err: CoreError = dir_err.into();
        assert!(matches!(core_err, CoreError::Directory(_)));

        let ks_err = KeystoneError::MissingToken;
        let core_err: CoreError = ks_err.into();
        assert!(matches!(core_err, CoreError::Keystone(_)));
    }
}
