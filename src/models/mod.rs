use serde::{Deserialize, Serialize};

use crate::search::SearchError;

/// Property category recognized by the marketplace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyCategory {
    House,
    Apartment,
    Suite,
    Land,
    Commercial,
}

/// Whether the user is looking to buy or rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Sale,
    Rent,
}

/// A city with at least one active listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryCity {
    pub name: String,
    pub property_count: u32,
}

impl InventoryCity {
    pub fn new(name: impl Into<String>, property_count: u32) -> Self {
        Self {
            name: name.into(),
            property_count,
        }
    }
}

/// Structured filters extracted from a free-text query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    pub city: Option<String>,
    pub category: Option<PropertyCategory>,
    pub transaction_type: Option<TransactionType>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Extractor output: candidate filters plus the model's own certainty,
/// before any location validation has run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFilters {
    pub filters: SearchFilters,
    pub confidence: u8,
}

/// Verdict on the location the user asked for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationValidation {
    /// The city string as the extractor produced it ("" when none was requested)
    pub requested_location: String,
    pub is_valid: bool,
    /// Canonical inventory name when the location resolved
    pub matched_city: Option<String>,
    /// 0-100, how certain the match is
    pub confidence: u8,
    /// Alternatives to offer when the location did not resolve
    pub suggested_cities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Final pipeline output returned to the UI/API layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub success: bool,
    /// 0-100, capped at the extractor's raw confidence
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_validation: Option<LocationValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchError>,
}

impl SearchResult {
    /// Terminal failure before or during extraction
    pub fn failure(error: SearchError) -> Self {
        Self {
            success: false,
            confidence: 0,
            filters: None,
            location_validation: None,
            error: Some(error),
        }
    }
}
