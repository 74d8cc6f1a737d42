//! `disablemail` opt-out query against the wiki database.
//!
//! Wiki accounts can disable email contact from other users; the preference
//! lives in the `user_properties` table. The query runs through the local
//! `sql` wrapper rather than a direct database connection, piped on stdin
//! the same way an operator would run it by hand.

use std::collections::HashSet;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::config::OptOutConfig;
use crate::errors::OptOutError;

/// Usernames of all wiki accounts that have opted out of email contact.
const DISABLEMAIL_QUERY: &str = "\
SELECT user_name
FROM user
WHERE user_id IN (
      SELECT up_user
      FROM user_properties
      WHERE up_property='disablemail'
        AND up_value=1
);";

/// Parse the sql client's stdout: one header line, then one username per
/// line. Blank lines are discarded.
pub fn parse_sql_output(stdout: &str) -> HashSet<String> {
    stdout
        .trim()
        .lines()
        .skip(1)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run the `disablemail` query and return the opted-out usernames.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn fetch_disablemail_users(
    config: &OptOutConfig,
) -> Result<HashSet<String>, OptOutError> {
    let mut child = Command::new(&config.sql_command)
        .arg(&config.database)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OptOutError::BinaryNotFound(config.sql_command.clone())
            } else {
                OptOutError::Io(e)
            }
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(DISABLEMAIL_QUERY.as_bytes()).await?;
    }
    // stdin is dropped here, closing the pipe so the client runs the query.

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        warn!(exit_code, %stderr, "sql client failed");
        return Err(OptOutError::CommandFailed { exit_code, stderr });
    }

    let users = parse_sql_output(&String::from_utf8_lossy(&output.stdout));
    debug!(count = users.len(), "fetched disablemail opt-outs");
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_line_dropped() {
        let users = parse_sql_output("user_name\nalice\nbob\n");
        assert_eq!(users.len(), 2);
        assert!(users.contains("alice"));
        assert!(users.contains("bob"));
        assert!(!users.contains("user_name"));
    }

    #[test]
    fn test_blank_lines_dropped() {
        let users = parse_sql_output("user_name\nalice\n\nbob\n\n");
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn test_header_only_output() {
        assert!(parse_sql_output("user_name\n").is_empty());
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_sql_output("").is_empty());
    }

    #[test]
    fn test_duplicate_usernames_collapse() {
        let users = parse_sql_output("user_name\nalice\nalice\n");
        assert_eq!(users.len(), 1);
    }
}
