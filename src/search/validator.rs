//! Location validation and disambiguation.
//!
//! Resolves the city the extractor produced against the current inventory
//! snapshot in three steps: exact match (case- and accent-insensitive),
//! neighborhood-alias lookup, then Jaro-Winkler fuzzy match. An unresolved
//! city is a normal business outcome, not a pipeline error.

use crate::models::{InventoryCity, LocationValidation};
use std::collections::HashMap;
use strsim::jaro_winkler;
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Minimum Jaro-Winkler similarity for a fuzzy correction to be accepted
pub const FUZZY_ACCEPT_THRESHOLD: f64 = 0.85;

/// Fuzzy confidence band: similarity at the threshold maps to the floor,
/// perfect similarity to the ceiling
pub const FUZZY_CONFIDENCE_FLOOR: f64 = 60.0;
pub const FUZZY_CONFIDENCE_CEIL: f64 = 95.0;

/// Confidence when a neighborhood alias resolved to its parent city
pub const ALIAS_MATCH_CONFIDENCE: u8 = 90;

/// Confidence reported for a location that did not resolve at all
pub const UNMATCHED_CONFIDENCE: u8 = 10;

/// Maximum number of alternative cities offered for an unserviced location
pub const MAX_SUGGESTED_CITIES: usize = 3;

/// Built-in sub-locality names and the serviced city they belong to.
/// Keys are folded at construction, so accents here are cosmetic.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("el centro", "Cuenca"),
    ("centro histórico", "Cuenca"),
    ("el vergel", "Cuenca"),
    ("el ejido", "Cuenca"),
    ("el batán", "Cuenca"),
    ("totoracocha", "Cuenca"),
    ("yanuncay", "Cuenca"),
    ("monay", "Cuenca"),
    ("baños", "Cuenca"),
    ("ricaurte", "Cuenca"),
    ("san joaquín", "Cuenca"),
    ("challuabamba", "Cuenca"),
    ("misicata", "Cuenca"),
    ("bullcay", "Gualaceo"),
    ("san juan", "Gualaceo"),
];

/// Fold a name for comparison: NFD, strip combining marks, lowercase,
/// collapse whitespace. "Baños" and "banos" fold to the same string.
fn fold(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validates requested locations against an inventory snapshot
pub struct LocationValidator {
    /// Folded alias -> canonical parent city name
    aliases: HashMap<String, String>,
}

impl LocationValidator {
    /// Create a validator with the built-in neighborhood table
    pub fn new() -> Self {
        Self::with_aliases(
            DEFAULT_ALIASES
                .iter()
                .map(|(alias, city)| (alias.to_string(), city.to_string())),
        )
    }

    /// Create a validator with a custom neighborhood-to-city table
    pub fn with_aliases(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let aliases = pairs
            .into_iter()
            .map(|(alias, city)| (fold(&alias), city))
            .collect();
        Self { aliases }
    }

    /// Resolve the requested city against the inventory snapshot.
    ///
    /// Pure function of its inputs: same request + same snapshot always
    /// produces the same verdict.
    pub fn validate(
        &self,
        requested: Option<&str>,
        inventory: &[InventoryCity],
    ) -> LocationValidation {
        let requested = requested.map(str::trim).filter(|s| !s.is_empty());

        // No city requested: the search simply runs unscoped
        let Some(requested) = requested else {
            return LocationValidation {
                requested_location: String::new(),
                is_valid: true,
                matched_city: None,
                confidence: 100,
                suggested_cities: Vec::new(),
                message: None,
            };
        };

        if inventory.is_empty() {
            return LocationValidation {
                requested_location: requested.to_string(),
                is_valid: false,
                matched_city: None,
                confidence: 0,
                suggested_cities: Vec::new(),
                message: Some(
                    "No serviced cities are currently available. Please try again later."
                        .to_string(),
                ),
            };
        }

        let folded = fold(requested);

        // Exact match, case- and accent-insensitive
        if let Some(city) = inventory.iter().find(|c| fold(&c.name) == folded) {
            return LocationValidation {
                requested_location: requested.to_string(),
                is_valid: true,
                matched_city: Some(city.name.clone()),
                confidence: 100,
                suggested_cities: Vec::new(),
                message: None,
            };
        }

        // Neighborhood alias; only resolves if the parent has listings
        if let Some(parent) = self.aliases.get(&folded) {
            let parent_fold = fold(parent);
            if let Some(city) = inventory.iter().find(|c| fold(&c.name) == parent_fold) {
                return LocationValidation {
                    requested_location: requested.to_string(),
                    is_valid: true,
                    matched_city: Some(city.name.clone()),
                    confidence: ALIAS_MATCH_CONFIDENCE,
                    suggested_cities: Vec::new(),
                    message: Some(format!(
                        "\"{}\" is a neighborhood of {}; searching in {}.",
                        requested, city.name, city.name
                    )),
                };
            }
        }

        // Fuzzy match over the whole inventory. Ties on score prefer the
        // city with more listings, then alphabetical order.
        let mut scored: Vec<(f64, &InventoryCity)> = inventory
            .iter()
            .map(|city| (jaro_winkler(&folded, &fold(&city.name)), city))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.1.property_count.cmp(&a.1.property_count))
                .then_with(|| a.1.name.cmp(&b.1.name))
        });

        let (best_score, best_city) = scored[0];
        debug!(
            requested,
            best = %best_city.name,
            score = best_score,
            "fuzzy city match"
        );

        if best_score >= FUZZY_ACCEPT_THRESHOLD {
            return LocationValidation {
                requested_location: requested.to_string(),
                is_valid: true,
                matched_city: Some(best_city.name.clone()),
                confidence: fuzzy_confidence(best_score),
                suggested_cities: Vec::new(),
                message: Some(format!(
                    "No exact match for \"{}\"; interpreted as {}.",
                    requested, best_city.name
                )),
            };
        }

        let suggested = top_cities(inventory, MAX_SUGGESTED_CITIES);
        LocationValidation {
            requested_location: requested.to_string(),
            is_valid: false,
            matched_city: None,
            confidence: UNMATCHED_CONFIDENCE,
            suggested_cities: suggested.clone(),
            message: Some(format!(
                "We don't have listings in \"{}\" yet. Cities with listings: {}.",
                requested,
                suggested.join(", ")
            )),
        }
    }
}

impl Default for LocationValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an accepted similarity score into the fuzzy confidence band
fn fuzzy_confidence(score: f64) -> u8 {
    let span = (score - FUZZY_ACCEPT_THRESHOLD) / (1.0 - FUZZY_ACCEPT_THRESHOLD);
    (FUZZY_CONFIDENCE_FLOOR + span * (FUZZY_CONFIDENCE_CEIL - FUZZY_CONFIDENCE_FLOOR)).round()
        as u8
}

/// Top-k cities by property count descending, ties alphabetical
fn top_cities(inventory: &[InventoryCity], k: usize) -> Vec<String> {
    let mut cities: Vec<&InventoryCity> = inventory.iter().collect();
    cities.sort_by(|a, b| {
        b.property_count
            .cmp(&a.property_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    cities.into_iter().take(k).map(|c| c.name.clone()).collect()
}
