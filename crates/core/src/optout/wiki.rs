//! Survey opt-out list, maintained as a delimited section of a wiki page.
//!
//! The page is fetched as raw wikitext and scanned line by line. Only lines
//! strictly between the literal begin and end marker lines count; the page
//! is otherwise free-form and anyone can edit it, so the extracted names
//! are untrusted input.

use tracing::{debug, instrument};

use crate::config::OptOutConfig;
use crate::errors::OptOutError;

/// Extract the opt-out identifiers from raw wikitext.
///
/// Lines between the `begin` marker line and the `end` marker line are
/// collected in encounter order; the markers themselves and everything
/// outside them are ignored. A page missing its end marker collects to the
/// end of input rather than failing; the markers are maintained by hand and
/// a truncated page should still produce a usable list.
pub fn parse_opt_out_list(wikitext: &str, begin: &str, end: &str) -> Vec<String> {
    let mut in_list = false;
    let mut users = Vec::new();
    for line in wikitext.lines() {
        if line == begin {
            in_list = true;
            continue;
        }
        if !in_list {
            continue;
        }
        if line == end {
            break;
        }
        users.push(line.to_string());
    }
    users
}

/// Fetch the opt-out page and parse its delimited list.
#[instrument(skip(config), fields(url = %config.wiki_page_url))]
pub async fn fetch_opt_out_list(config: &OptOutConfig) -> Result<Vec<String>, OptOutError> {
    let wikitext = reqwest::get(&config.wiki_page_url)
        .await?
        .error_for_status()?
        .text()
        .await?;
    let users = parse_opt_out_list(&wikitext, &config.begin_marker, &config.end_marker);
    debug!(count = users.len(), "parsed opt-out list");
    Ok(users)
}
