//! Opt-out sources.
//!
//! Two independent ways an account can be excluded from a contact list:
//! listing themselves on the survey opt-out wiki page ([`wiki`]), or setting
//! the `disablemail` preference on their wiki account ([`db`]).

pub mod db;
pub mod wiki;

pub use db::{fetch_disablemail_users, parse_sql_output};
pub use wiki::{fetch_opt_out_list, parse_opt_out_list};
