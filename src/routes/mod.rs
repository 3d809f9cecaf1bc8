/// Router Module Index
///
/// Splits the session-aware routes by access requirement. The auth gate is
/// applied to the whole `authenticated` router at once, so a protected route
/// cannot be registered without it.

/// Routes open to anonymous and logged-in visitors alike.
pub mod public;

/// Routes that redirect anonymous visitors to the login page.
pub mod authenticated;
