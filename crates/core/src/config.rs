//! TOML-based configuration for the contact list tools.
//!
//! Every field has a default matching the values the tools have always used
//! in the WMCS deployment, so running with no config file at all behaves
//! exactly like the historical hardcoded scripts. A config file only needs
//! to name the fields it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LDAP directory settings.
    #[serde(default)]
    pub ldap: LdapConfig,

    /// OpenStack Keystone API settings.
    #[serde(default)]
    pub keystone: KeystoneConfig,

    /// Opt-out source settings (wiki page and sql client).
    #[serde(default)]
    pub optout: OptOutConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration, falling back to built-in defaults when the file
    /// does not exist. The tools historically carried all of these values
    /// inline, so a missing config file is the normal case.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}

// ---------------------------------------------------------------------------
// LDAP
// ---------------------------------------------------------------------------

/// LDAP directory connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Directory server URL.
    #[serde(default = "default_ldap_url")]
    pub url: String,

    /// Base DN for all subtree searches.
    #[serde(default = "default_base_dn")]
    pub base_dn: String,

    /// cn of the group whose members make up the Toolforge user pool.
    #[serde(default = "default_toolforge_group")]
    pub toolforge_group: String,
}

fn default_ldap_url() -> String {
    "ldap://ldap-labs.eqiad.wikimedia.org".into()
}
fn default_base_dn() -> String {
    "dc=wikimedia,dc=org".into()
}
fn default_toolforge_group() -> String {
    "project-tools".into()
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            url: default_ldap_url(),
            base_dn: default_base_dn(),
            toolforge_group: default_toolforge_group(),
        }
    }
}

// ---------------------------------------------------------------------------
// Keystone
// ---------------------------------------------------------------------------

/// OpenStack Keystone API settings.
///
/// NOTE: the novaobserver username and password are not secret in the WMCS
/// environment. This data is provisioned as /etc/novaobserver.yaml on hosts
/// inside the Cloud VPS environment and lives in a public repository, which
/// is why a plain config field is acceptable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoneConfig {
    /// Keystone v3 endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Observer service account username.
    #[serde(default = "default_keystone_username")]
    pub username: String,

    /// Observer service account password (not secret, see above).
    #[serde(default = "default_keystone_password")]
    pub password: String,

    /// Project the session is scoped to.
    #[serde(default = "default_keystone_project")]
    pub project_id: String,

    /// User domain name.
    #[serde(default = "default_domain")]
    pub user_domain: String,

    /// Project domain name.
    #[serde(default = "default_domain")]
    pub project_domain: String,

    /// Request timeout in seconds. Kept short: the API lives on the same
    /// network as the hosts these tools run on.
    #[serde(default = "default_keystone_timeout")]
    pub timeout_secs: u64,
}

fn default_auth_url() -> String {
    "http://cloudcontrol1003.wikimedia.org:5000/v3".into()
}
fn default_keystone_username() -> String {
    "novaobserver".into()
}
fn default_keystone_password() -> String {
    "Fs6Dq2RtG8KwmM2Z".into()
}
fn default_keystone_project() -> String {
    "observer".into()
}
fn default_domain() -> String {
    "Default".into()
}
fn default_keystone_timeout() -> u64 {
    2
}

impl Default for KeystoneConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            username: default_keystone_username(),
            password: default_keystone_password(),
            project_id: default_keystone_project(),
            user_domain: default_domain(),
            project_domain: default_domain(),
            timeout_secs: default_keystone_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Opt-out sources
// ---------------------------------------------------------------------------

/// Settings for the two opt-out sources: the survey opt-out wiki page and
/// the `disablemail` preference query run through the local sql client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptOutConfig {
    /// URL returning the opt-out page's raw wikitext.
    #[serde(default = "default_wiki_page_url")]
    pub wiki_page_url: String,

    /// Literal line marking the start of the opt-out list.
    #[serde(default = "default_begin_marker")]
    pub begin_marker: String,

    /// Literal line marking the end of the opt-out list.
    #[serde(default = "default_end_marker")]
    pub end_marker: String,

    /// Path of the sql client executable.
    #[serde(default = "default_sql_command")]
    pub sql_command: String,

    /// Database the `disablemail` query runs against.
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_wiki_page_url() -> String {
    "https://wikitech.wikimedia.org/wiki/Annual_Toolforge_Survey/Opt_out?action=raw".into()
}
fn default_begin_marker() -> String {
    "<!-- BEGIN OPT-OUT LIST -->".into()
}
fn default_end_marker() -> String {
    "<!-- END OPT-OUT LIST -->".into()
}
fn default_sql_command() -> String {
    "/usr/local/bin/sql".into()
}
fn default_database() -> String {
    "labswiki".into()
}

impl Default for OptOutConfig {
    fn default() -> Self {
        Self {
            wiki_page_url: default_wiki_page_url(),
            begin_marker: default_begin_marker(),
            end_marker: default_end_marker(),
            sql_command: default_sql_command(),
            database: default_database(),
        }
    }
}
