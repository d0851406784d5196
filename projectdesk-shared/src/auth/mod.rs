/// Authentication boundary, resource scoping and authorization
///
/// # Modules
///
/// - [`jwt`]: bearer token verification (the identity provider's tokens)
/// - [`principal`]: the authenticated user passed to every operation
/// - [`scope`]: visibility predicates (who can read what)
/// - [`policy`]: role × action decision table (who can write what)

pub mod jwt;
pub mod policy;
pub mod principal;
pub mod scope;

pub use principal::Principal;
