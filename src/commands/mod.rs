pub mod locale;
pub mod serve;

// Re-export command functions for convenience
pub use locale::{locales, parse_key_value, resolve, set_locale, stats, translate};
pub use serve::serve;
