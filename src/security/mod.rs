//! Target validation for redirect walks.
//!
//! A redirect chain can point anywhere, including at services on the
//! resolver's own network. When `--deny-private-targets` is set, every hop
//! is checked here before it is requested.

mod url_validation;

pub use url_validation::validate_url_safe;
