//! Category path helpers and the canonical root fields.
//!
//! A category path is a slash-free tag: a front category (`management`,
//! `weather`, `soil`, `initial_conditions`, `observed`), optionally followed
//! by `@collection` and, for management events, `!kind`:
//! `management@events!planting`, `initial_conditions@soilLayer`.

pub const MANAGEMENT: &str = "management";
pub const WEATHER: &str = "weather";
pub const SOIL: &str = "soil";
pub const INITIAL_CONDITIONS: &str = "initial_conditions";
pub const OBSERVED: &str = "observed";

/// Root identifiers: a sheet uniquely keyed by one of these is a forest root.
pub const ROOT_FIELDS: [&str; 4] = ["soil_id", "wst_id", "exper_id", "exname"];

pub fn is_root_field(variable: &str) -> bool {
    ROOT_FIELDS.contains(&variable)
}

/// Normalizes a raw lookup value: strips one leading `,`; empty means management.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix(',').unwrap_or(trimmed).trim();
    if stripped.is_empty() {
        MANAGEMENT.to_string()
    } else {
        stripped.to_string()
    }
}

/// The part of a path before `@`.
pub fn front(path: &str) -> &str {
    match path.split_once('@') {
        Some((head, _)) => head,
        None => path,
    }
}

/// The collection part between `@` and `!`, if any.
pub fn collection(path: &str) -> Option<&str> {
    let (_, tail) = path.split_once('@')?;
    Some(match tail.split_once('!') {
        Some((collection, _)) => collection,
        None => tail,
    })
}

/// The event kind after `!`, if any.
pub fn event_kind(path: &str) -> Option<&str> {
    path.split_once('!').map(|(_, kind)| kind)
}

/// Standard form of a variable name: lower case, no whitespace.
pub fn standardize_variable(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Variables ending in `date` or `dat` do not help decide a category.
pub fn is_date_variable(variable: &str) -> bool {
    variable.ends_with("date") || variable.ends_with("dat")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_raw_lookup_values() {
        assert_eq!(normalize(""), "management");
        assert_eq!(normalize(",weather"), "weather");
        assert_eq!(normalize(","), "management");
        assert_eq!(normalize("soil@soilLayer"), "soil@soilLayer");
    }

    #[test]
    fn splits_compound_paths() {
        let path = "management@events!planting";
        assert_eq!(front(path), "management");
        assert_eq!(collection(path), Some("events"));
        assert_eq!(event_kind(path), Some("planting"));

        assert_eq!(front("weather"), "weather");
        assert_eq!(collection("initial_conditions@soilLayer"), Some("soilLayer"));
        assert_eq!(event_kind("initial_conditions@soilLayer"), None);
    }

    #[test]
    fn standardizes_case_and_whitespace() {
        assert_eq!(standardize_variable(" WST_ID "), "wst_id");
        assert_eq!(standardize_variable("Soil Id"), "soilid");
        assert_eq!(standardize_variable("P\tDATE"), "pdate");
    }

    #[test]
    fn date_variables_and_root_fields() {
        assert!(is_date_variable("pdate"));
        assert!(is_date_variable("hadat"));
        assert!(!is_date_variable("dateline"));
        assert!(is_root_field("wst_id"));
        assert!(!is_root_field("WST_ID"));
    }
}
