//! wmcs-contact core library.
//!
//! Building blocks for the contact list generators: the LDAP directory
//! client used to enrich account identifiers with names and email
//! addresses, the Keystone client used to enumerate Cloud VPS projects and
//! role holders, the two opt-out sources, and the roster bookkeeping that
//! ties a pipeline together.

pub mod config;
pub mod directory;
pub mod errors;
pub mod keystone;
pub mod optout;
pub mod roster;

// Re-exports for convenience.
pub use config::AppConfig;
pub use directory::DirectoryClient;
pub use keystone::KeystoneClient;
pub use roster::{Account, Roster};
