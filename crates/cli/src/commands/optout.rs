//! Survey opt-out lists derived from the wiki page.
//!
//! The identifiers come from a hand-edited wiki page, so anything that
//! flows into a directory filter is escaped first.

use anyhow::{Context, Result};

use wmcs_contact_core::directory::ldap_escape;
use wmcs_contact_core::optout::fetch_opt_out_list;
use wmcs_contact_core::roster::sorted_unique_emails;
use wmcs_contact_core::{Account, AppConfig, DirectoryClient};

/// Sorted, deduplicated email addresses for the opted-out accounts.
pub async fn emails(config: &AppConfig) -> Result<()> {
    let users = fetch_opt_out_list(&config.optout)
        .await
        .context("fetching opt-out page")?;

    let mut directory = DirectoryClient::connect(&config.ldap)
        .await
        .context("connecting to LDAP")?;
    let mut accounts = Vec::new();
    for user in &users {
        if let Some(email) = directory
            .mail_by_cn(user)
            .await
            .with_context(|| format!("looking up account '{}'", user))?
        {
            accounts.push(Account::new(user.as_str(), email));
        }
    }

    for email in sorted_unique_emails(accounts) {
        println!("{}", email);
    }
    Ok(())
}

/// Opted-out identifiers as written on the page, escaped for filter use.
pub async fn users(config: &AppConfig) -> Result<()> {
    let users = fetch_opt_out_list(&config.optout)
        .await
        .context("fetching opt-out page")?;
    for user in users {
        println!("{}", ldap_escape(user.as_str()));
    }
    Ok(())
}
