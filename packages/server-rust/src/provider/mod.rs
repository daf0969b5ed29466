//! In-memory reference auth module and real callback handler.
//!
//! - [`basic`]: provider/config/context authenticating username and password
//!   from the message map
//! - [`identity`]: user-table callback handler that doubles as a security domain

pub mod basic;
pub mod identity;

pub use basic::{BasicAuthConfigProvider, BasicServerAuthConfig, BasicServerAuthContext};
pub use identity::IdentityCallbackHandler;
