//! In-memory bookkeeping for resolved accounts.
//!
//! A [`Roster`] accumulates enriched accounts keyed by account name,
//! preserving encounter order while refusing duplicates, and supports the
//! single set operation every list generator ends with: subtracting the
//! opt-out set before printing.

use std::collections::HashSet;

use tracing::debug;

/// A resolved directory account: canonical display name plus email address.
///
/// Entries missing either attribute in the directory never become an
/// `Account`; they are dropped during enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Canonical account name (the directory `cn`, which matches the wiki
    /// username for accounts attached to the wiki).
    pub name: String,
    /// Contact email address (the directory `mail` attribute).
    pub email: String,
}

impl Account {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Ordered, deduplicated collection of accounts keyed by name.
#[derive(Debug, Default)]
pub struct Roster {
    accounts: Vec<Account>,
    names: HashSet<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account. Returns `false` (and keeps the existing entry) if an
    /// account with the same name is already present.
    pub fn insert(&mut self, account: Account) -> bool {
        if !self.names.insert(account.name.clone()) {
            return false;
        }
        self.accounts.push(account);
        true
    }

    /// Remove every account whose name appears in the opt-out set.
    /// Returns the number of accounts removed.
    pub fn remove_all(&mut self, opted_out: &HashSet<String>) -> usize {
        let before = self.accounts.len();
        self.accounts.retain(|a| !opted_out.contains(&a.name));
        self.names.retain(|n| !opted_out.contains(n));
        let removed = before - self.accounts.len();
        debug!(removed, remaining = self.accounts.len(), "applied opt-out set");
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Email addresses in insertion order.
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.accounts.iter().map(|a| a.email.as_str())
    }

    /// Account names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accounts.iter().map(|a| a.name.as_str())
    }
}

/// Collapse a list of accounts to their email addresses, deduplicated and
/// lexicographically sorted.
pub fn sorted_unique_emails<I>(accounts: I) -> Vec<String>
where
    I: IntoIterator<Item = Account>,
{
    let unique: std::collections::BTreeSet<String> =
        accounts.into_iter().map(|a| a.email).collect();
    unique.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_difference() {
        let mut roster = Roster::new();
        roster.insert(Account::new("A", "a@example.org"));
        roster.insert(Account::new("B", "b@example.org"));
        roster.insert(Account::new("C", "c@example.org"));

        let opted_out: HashSet<String> = ["B".to_string()].into();
        assert_eq!(roster.remove_all(&opted_out), 1);

        let names: Vec<&str> = roster.names().collect();
        assert_eq!(names, vec!["A", "C"]);
        assert!(!roster.contains("B"));
    }

    #[test]
    fn test_duplicate_insert_ignored() {
        let mut roster = Roster::new();
        assert!(roster.insert(Account::new("A", "a@example.org")));
        assert!(!roster.insert(Account::new("A", "other@example.org")));
        assert_eq!(roster.len(), 1);

        // First insertion wins.
        let emails: Vec<&str> = roster.emails().collect();
        assert_eq!(emails, vec!["a@example.org"]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut roster = Roster::new();
        roster.insert(Account::new("zeta", "z@example.org"));
        roster.insert(Account::new("alpha", "a@example.org"));
        let names: Vec<&str> = roster.names().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_opt_out_of_absent_name_is_noop() {
        let mut roster = Roster::new();
        roster.insert(Account::new("A", "a@example.org"));
        let opted_out: HashSet<String> = ["X".to_string()].into();
        assert_eq!(roster.remove_all(&opted_out), 0);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_sorted_unique_emails() {
        let accounts = vec![
            Account::new("c", "carol@example.org"),
            Account::new("a", "alice@example.org"),
            Account::new("a2", "alice@example.org"),
            Account::new("b", "bob@example.org"),
        ];
        assert_eq!(
            sorted_unique_emails(accounts),
            vec![
                "alice@example.org".to_string(),
                "bob@example.org".to_string(),
                "carol@example.org".to_string(),
            ]
        );
    }
}
