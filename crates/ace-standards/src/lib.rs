//! Variable lookup for ACE translation.
//!
//! Maps standardized variable names to the domain category path that owns
//! them (`management`, `weather@dailyWeather`, `management@events!planting`,
//! ...). The table is loaded once and passed by reference to whoever needs it.

pub mod category;
pub mod error;
pub mod lookup;
pub mod paths;

pub use category::{ROOT_FIELDS, is_date_variable, is_root_field, standardize_variable};
pub use error::StandardsError;
pub use lookup::{
    DomainLookup, builtin_lookup, load_default_lookup, load_lookup_csv, parse_lookup_csv,
};
pub use paths::LOOKUP_ENV_VAR;
