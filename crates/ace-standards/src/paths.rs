//! Lookup table location.

use std::path::PathBuf;

/// Environment variable naming a lookup table CSV that replaces the built-in one.
pub const LOOKUP_ENV_VAR: &str = "ACE_LOOKUP_PATH";

/// Origin label used in diagnostics for the built-in table.
pub const BUILTIN_ORIGIN: &str = "<builtin>/variables.csv";

/// Returns the lookup table override from the environment, if set and non-empty.
pub fn lookup_override() -> Option<PathBuf> {
    std::env::var_os(LOOKUP_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
