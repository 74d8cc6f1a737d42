//! End-to-end pipeline tests over in-memory data.
//!
//! Exercises the shared extract-filter-print logic without any network:
//! candidates flow into a roster, the opt-out set is subtracted, and the
//! survivors come out in a deterministic order.

use std::collections::HashSet;

use wmcs_contact_core::directory::eq_filter;
use wmcs_contact_core::keystone::partition_role_users;
use wmcs_contact_core::optout::{parse_opt_out_list, parse_sql_output};
use wmcs_contact_core::roster::sorted_unique_emails;
use wmcs_contact_core::{Account, Roster};

const BEGIN: &str = "<!-- BEGIN OPT-OUT LIST -->";
const END: &str = "<!-- END OPT-OUT LIST -->";

#[test]
fn enrich_then_subtract_opt_outs() {
    // Candidate pool as it would arrive from a group membership lookup,
    // including a duplicate and an account that will opt out.
    let candidates = ["Alice", "Bob", "Alice", "Carol", "Dave"];

    let mut roster = Roster::new();
    for name in candidates {
        // Enrichment drops one account with no mail attribute.
        if name == "Dave" {
            continue;
        }
        roster.insert(Account::new(name, format!("{}@example.org", name.to_lowercase())));
    }
    assert_eq!(roster.len(), 3);

    let opted_out = parse_sql_output("user_name\nBob\n");
    roster.remove_all(&opted_out);

    let emails: Vec<&str> = roster.emails().collect();
    assert_eq!(emails, vec!["alice@example.org", "carol@example.org"]);
    let names: Vec<&str> = roster.names().collect();
    assert_eq!(names, vec!["Alice", "Carol"]);
}

#[test]
fn project_admin_pool_respects_role_precedence() {
    // One project where a user holds both observer and projectadmin: the
    // admin email list must not pick them up via projectadmin.
    let by_role = partition_role_users(vec![
        ("admin", vec![]),
        ("glanceadmin", vec![]),
        ("observer", vec!["shared".to_string()]),
        ("projectadmin", vec!["shared".to_string(), "admin1".to_string()]),
        ("user", vec![]),
    ]);
    let admins: Vec<String> = by_role
        .into_iter()
        .filter(|(role, _)| *role == "projectadmin")
        .flat_map(|(_, users)| users)
        .collect();
    assert_eq!(admins, vec!["admin1".to_string()]);
}

#[test]
fn wiki_opt_outs_to_sorted_unique_emails() {
    let page = format!("{}\nbeta\nalpha\nbeta\n{}\n", BEGIN, END);
    let users = parse_opt_out_list(&page, BEGIN, END);
    assert_eq!(users, vec!["beta", "alpha", "beta"]);

    // Enrichment keyed by cn; the duplicate resolves to the same email.
    let accounts: Vec<Account> = users
        .iter()
        .map(|u| Account::new(u.as_str(), format!("{}@example.org", u)))
        .collect();
    assert_eq!(
        sorted_unique_emails(accounts),
        vec!["alpha@example.org".to_string(), "beta@example.org".to_string()]
    );
}

#[test]
fn wiki_names_are_escaped_before_filter_use() {
    let page = format!("{}\nInno*cent\n{}\n", BEGIN, END);
    let users = parse_opt_out_list(&page, BEGIN, END);
    let filter = eq_filter("cn", &users[0]);
    assert_eq!(filter, "(cn=Inno\\2acent)");
}

#[test]
fn opted_out_identifier_never_survives() {
    // Set-difference property: anything in both the candidate pool and the
    // opt-out set is absent from the output.
    let mut roster = Roster::new();
    for name in ["A", "B", "C"] {
        roster.insert(Account::new(name, format!("{name}@example.org")));
    }
    let opted_out: HashSet<String> = ["B".to_string(), "Z".to_string()].into();
    roster.remove_all(&opted_out);
    assert!(roster.names().all(|n| !opted_out.contains(n)));
    assert_eq!(roster.len(), 2);
}
