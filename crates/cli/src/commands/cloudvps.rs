//! Cloud VPS project admin email list.
//!
//! Keystone supplies the pool of projectadmin role holders; the directory
//! supplies their names and email addresses; the `disablemail` query
//! removes accounts that opted out of email contact.

use anyhow::{Context, Result};
use tracing::info;

use wmcs_contact_core::optout::fetch_disablemail_users;
use wmcs_contact_core::{AppConfig, DirectoryClient, KeystoneClient, Roster};

pub async fn emails(config: &AppConfig) -> Result<()> {
    let keystone = KeystoneClient::authenticate(&config.keystone)
        .await
        .context("authenticating with Keystone")?;
    let admins = keystone
        .project_admins()
        .await
        .context("enumerating project admins")?;

    let mut directory = DirectoryClient::connect(&config.ldap)
        .await
        .context("connecting to LDAP")?;
    let mut roster = Roster::new();
    for uid in &admins {
        // Accounts missing a mail attribute resolve to None and are skipped.
        if let Some(account) = directory
            .account_by_uid(uid)
            .await
            .with_context(|| format!("looking up account '{}'", uid))?
        {
            roster.insert(account);
        }
    }
    info!(candidates = admins.len(), enriched = roster.len(), "enriched admin pool");

    let opted_out = fetch_disablemail_users(&config.optout)
        .await
        .context("querying disablemail opt-outs")?;
    roster.remove_all(&opted_out);

    for email in roster.emails() {
        println!("{}", email);
    }
    Ok(())
}
