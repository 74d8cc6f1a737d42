//! Toolforge member lists.
//!
//! Membership comes from the Toolforge project group in the directory; the
//! same enrichment and opt-out subtraction backs both the email and the
//! username variant.

use anyhow::{Context, Result};
use tracing::info;

use wmcs_contact_core::optout::fetch_disablemail_users;
use wmcs_contact_core::{AppConfig, DirectoryClient, Roster};

/// Resolve the Toolforge member roster with the opt-out set subtracted.
async fn member_roster(config: &AppConfig) -> Result<Roster> {
    let mut directory = DirectoryClient::connect(&config.ldap)
        .await
        .context("connecting to LDAP")?;
    let members = directory
        .group_member_dns(&config.ldap.toolforge_group)
        .await
        .with_context(|| format!("listing members of '{}'", config.ldap.toolforge_group))?;

    let mut roster = Roster::new();
    for dn in &members {
        if let Some(account) = directory
            .account_by_member_dn(dn)
            .await
            .with_context(|| format!("looking up member '{}'", dn))?
        {
            roster.insert(account);
        }
    }
    info!(members = members.len(), enriched = roster.len(), "enriched member pool");

    let opted_out = fetch_disablemail_users(&config.optout)
        .await
        .context("querying disablemail opt-outs")?;
    roster.remove_all(&opted_out);
    Ok(roster)
}

pub async fn emails(config: &AppConfig) -> Result<()> {
    let roster = member_roster(config).await?;
    for email in roster.emails() {
        println!("{}", email);
    }
    Ok(())
}

pub async fn users(config: &AppConfig) -> Result<()> {
    let roster = member_roster(config).await?;
    for name in roster.names() {
        println!("{}", name);
    }
    Ok(())
}
