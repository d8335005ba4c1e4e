//! Pipeline entry point: normalize, extract, validate, assemble.

use crate::models::SearchResult;
use crate::search::error::SearchError;
use crate::search::extractor::extract_filters;
use crate::search::normalizer::normalize_query;
use crate::search::traits::{CompletionService, InventoryProvider};
use crate::search::validator::LocationValidator;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Interprets free-text property searches into structured filters.
///
/// Holds no per-request state; a single interpreter is shared across
/// concurrent request tasks. Dropping the returned future cancels the
/// in-flight completion call.
pub struct SearchInterpreter {
    completion: Arc<dyn CompletionService>,
    inventory: Arc<dyn InventoryProvider>,
    validator: LocationValidator,
}

impl SearchInterpreter {
    /// Create an interpreter with the built-in neighborhood alias table
    pub fn new(
        completion: Arc<dyn CompletionService>,
        inventory: Arc<dyn InventoryProvider>,
    ) -> Self {
        Self::with_validator(completion, inventory, LocationValidator::new())
    }

    /// Create an interpreter with a custom location validator
    pub fn with_validator(
        completion: Arc<dyn CompletionService>,
        inventory: Arc<dyn InventoryProvider>,
        validator: LocationValidator,
    ) -> Self {
        Self {
            completion,
            inventory,
            validator,
        }
    }

    /// Interpret one free-text query.
    ///
    /// Stage errors (blank input, extraction failure) produce a failed
    /// result. An unserviced city does not: the verdict is carried on
    /// `location_validation` and the remaining filters stay usable.
    pub async fn parse_search_query(&self, query: &str) -> SearchResult {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            debug!("blank query, skipping collaborator calls");
            return SearchResult::failure(SearchError::EmptyInput);
        }

        let cities = self.inventory.list_serviced_cities();
        debug!(city_count = cities.len(), query = %normalized, "interpreting query");

        let extracted = match extract_filters(self.completion.as_ref(), &normalized, &cities).await
        {
            Ok(extracted) => extracted,
            Err(err) => {
                warn!(error = %err, "extraction stage failed");
                return SearchResult::failure(err);
            }
        };

        let validation = self
            .validator
            .validate(extracted.filters.city.as_deref(), &cities);

        let mut filters = extracted.filters;
        // The canonical inventory name replaces whatever the model wrote;
        // an unmatched city clears the filter so the search runs unscoped
        filters.city = validation.matched_city.clone();

        // Location doubt can only lower the extractor's own certainty
        let confidence = extracted.confidence.min(validation.confidence);

        info!(
            city = filters.city.as_deref().unwrap_or("-"),
            location_valid = validation.is_valid,
            confidence,
            "query interpreted"
        );

        SearchResult {
            success: true,
            confidence,
            filters: Some(filters),
            location_validation: Some(validation),
            error: None,
        }
    }
}
