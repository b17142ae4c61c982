/// Router Module Index
///
/// Splits the HTTP surface by who may call it. Access control is applied per module
/// with router layers, so a handler can never be exposed without its guard.

/// JSON endpoints open to everyone (health, login, logout).
pub mod public;

/// JSON endpoints that need a token with a recognised role.
pub mod authenticated;

/// The browser path space, resolved by the session gate.
pub mod pages;
