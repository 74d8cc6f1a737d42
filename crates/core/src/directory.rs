//! LDAP directory client.
//!
//! The directory is the canonical source of email addresses because a
//! developer account can exist in LDAP without ever having been attached to
//! the wiki. All searches are subtree searches from the configured base DN
//! and request only the attributes they need (`cn`, `mail`, `member`).
//!
//! A small number of very old accounts are missing their `mail` attribute;
//! lookups treat those as "no account" rather than an error.

use ldap3::{Ldap, LdapConnAsync, Scope, SearchEntry};
pub use ldap3::ldap_escape;
use tracing::{debug, info, instrument};

use crate::config::LdapConfig;
use crate::errors::DirectoryError;
use crate::roster::Account;

/// Build an equality filter, escaping the value against filter injection.
///
/// Values sourced from outside the directory (in particular the opt-out
/// wiki page, which anyone can edit) must pass through here before being
/// used in a search.
pub fn eq_filter(attr: &str, value: &str) -> String {
    format!("({}={})", attr, ldap_escape(value))
}

/// Turn a group `member` DN into a lookup filter for that entry.
///
/// Mirrors the long-standing behavior of searching on the first RDN of the
/// member DN (e.g. `uid=bdavis,ou=people,...` becomes `(uid=bdavis)`).
pub fn member_dn_filter(dn: &str) -> String {
    let rdn = dn.split(',').next().unwrap_or(dn);
    match rdn.split_once('=') {
        Some((attr, value)) => eq_filter(attr, value),
        None => eq_filter("uid", rdn),
    }
}

/// Client for the LDAP directory holding developer accounts.
pub struct DirectoryClient {
    ldap: Ldap,
    base_dn: String,
}

impl DirectoryClient {
    /// Connect to the directory. The WMCS directory allows anonymous
    /// searches, so no bind is performed.
    pub async fn connect(config: &LdapConfig) -> Result<Self, DirectoryError> {
        let (conn, ldap) = LdapConnAsync::new(&config.url).await?;
        ldap3::drive!(conn);
        info!(url = %config.url, base_dn = %config.base_dn, "connected to LDAP");
        Ok(Self {
            ldap,
            base_dn: config.base_dn.clone(),
        })
    }

    /// Run a subtree search from the base DN, returning constructed entries.
    #[instrument(skip(self))]
    pub async fn search(
        &mut self,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<SearchEntry>, DirectoryError> {
        let (results, _res) = self
            .ldap
            .search(&self.base_dn, Scope::Subtree, filter, attrs)
            .await?
            .success()?;
        debug!(filter, count = results.len(), "directory search");
        Ok(results.into_iter().map(SearchEntry::construct).collect())
    }

    /// Member DNs of the named group.
    #[instrument(skip(self))]
    pub async fn group_member_dns(
        &mut self,
        group_cn: &str,
    ) -> Result<Vec<String>, DirectoryError> {
        let filter = eq_filter("cn", group_cn);
        let entries = self.search(&filter, &["member"]).await?;
        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::GroupNotFound(group_cn.to_string()))?;
        let members = entry.attrs.get("member").cloned().unwrap_or_default();
        info!(group = group_cn, members = members.len(), "resolved group membership");
        Ok(members)
    }

    /// Resolve the first entry matching `filter` to an [`Account`].
    ///
    /// Returns `None` when nothing matches or when the entry lacks a `cn`
    /// or `mail` attribute.
    async fn account_by_filter(
        &mut self,
        filter: &str,
    ) -> Result<Option<Account>, DirectoryError> {
        let entries = self.search(filter, &["cn", "mail"]).await?;
        let Some(entry) = entries.into_iter().next() else {
            return Ok(None);
        };
        let name = entry.attrs.get("cn").and_then(|v| v.first());
        let email = entry.attrs.get("mail").and_then(|v| v.first());
        match (name, email) {
            (Some(name), Some(email)) => Ok(Some(Account::new(name, email))),
            _ => {
                debug!(filter, "entry missing cn or mail, skipping");
                Ok(None)
            }
        }
    }

    /// Look up an account by its posix `uid` (Keystone user ids are shell
    /// names in this deployment).
    pub async fn account_by_uid(&mut self, uid: &str) -> Result<Option<Account>, DirectoryError> {
        let filter = eq_filter("uid", uid);
        self.account_by_filter(&filter).await
    }

    /// Look up an account from a group `member` DN.
    pub async fn account_by_member_dn(
        &mut self,
        dn: &str,
    ) -> Result<Option<Account>, DirectoryError> {
        let filter = member_dn_filter(dn);
        self.account_by_filter(&filter).await
    }

    /// Email address for the account with the given `cn`, if the entry
    /// exists and carries a `mail` attribute. The `cn` is wiki-sourced and
    /// is escaped before entering the filter.
    pub async fn mail_by_cn(&mut self, cn: &str) -> Result<Option<String>, DirectoryError> {
        let filter = eq_filter("cn", cn);
        let entries = self.search(&filter, &["mail"]).await?;
        Ok(entries
            .into_iter()
            .next()
            .and_then(|e| e.attrs.get("mail").and_then(|v| v.first()).cloned()))
    }
}
