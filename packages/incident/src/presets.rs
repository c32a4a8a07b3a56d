//! Filter preset registry.
//!
//! Each `.toml` file in `packages/incident/filters/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a preset means adding
//! a file and a line to the list below.

use serde::Deserialize;

use crate::filter::RecordFilter;

/// Preset TOMLs embedded at compile time.
const PRESET_TOMLS: &[(&str, &str)] = &[
    ("tow", include_str!("../filters/tow.toml")),
    ("auto", include_str!("../filters/auto.toml")),
    ("mental_case", include_str!("../filters/mental_case.toml")),
    ("low_severity", include_str!("../filters/low_severity.toml")),
    ("high_severity", include_str!("../filters/high_severity.toml")),
];

/// A named, reusable [`RecordFilter`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterPreset {
    /// Identifier used on the command line (e.g. `"tow"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What the preset selects.
    #[serde(default)]
    pub description: Option<String>,
    /// The filter itself.
    #[serde(default)]
    pub filter: RecordFilter,
}

/// Parses a preset from TOML.
///
/// # Errors
///
/// Returns the TOML error if the document is malformed or has unknown keys.
pub fn parse_preset_toml(toml_str: &str) -> Result<FilterPreset, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns every embedded preset.
///
/// # Panics
///
/// Panics if an embedded TOML is malformed (the files ship with the
/// binary, so this is caught by the tests below).
#[must_use]
pub fn all_presets() -> Vec<FilterPreset> {
    PRESET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_preset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a preset by id.
#[must_use]
pub fn find_preset(id: &str) -> Option<FilterPreset> {
    all_presets().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use callgrid_incident_models::Severity;

    use super::*;

    #[test]
    fn loads_all_presets() {
        assert_eq!(all_presets().len(), PRESET_TOMLS.len());
    }

    #[test]
    fn preset_ids_match_file_names() {
        for ((name, _), preset) in PRESET_TOMLS.iter().zip(all_presets()) {
            assert_eq!(*name, preset.id);
            assert!(!preset.name.is_empty(), "{name}: empty name");
        }
    }

    #[test]
    fn every_preset_requires_coordinates() {
        for preset in all_presets() {
            assert!(
                preset.filter.require_coordinate,
                "{} does not require coordinates",
                preset.id
            );
        }
    }

    #[test]
    fn tow_preset_whitelists_both_spellings() {
        let tow = find_preset("tow").unwrap();
        assert!(tow.filter.description_whitelist.contains("Private Tow"));
        assert!(tow.filter.description_whitelist.contains("TOWED VEHICLE"));
    }

    #[test]
    fn low_severity_preset() {
        let low = find_preset("low_severity").unwrap();
        let severities = low.filter.severities.unwrap();
        assert!(severities.contains(&Severity::NonEmergency));
        assert!(severities.contains(&Severity::Low));
        assert!(!severities.contains(&Severity::High));
        assert!(low.filter.description_blacklist.contains("911/NO  VOICE"));
    }

    #[test]
    fn unknown_preset() {
        assert!(find_preset("nope").is_none());
    }
}
