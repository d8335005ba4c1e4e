//! LLM-backed filter extraction.
//!
//! Builds one prompt from the normalized query plus the serviced-city list,
//! makes a single completion call, and defensively parses the reply into
//! `ExtractedFilters`. A service error or an unparsable reply fails closed
//! as `ExtractionFailure`; there is no partial extraction from broken
//! replies.

use crate::models::{
    ExtractedFilters, InventoryCity, PropertyCategory, SearchFilters, TransactionType,
};
use crate::search::error::SearchError;
use crate::search::traits::CompletionService;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Wire shape the model is prompted for. Kept loose on purpose: fields may
/// come back missing, fenced in markdown, or with the wrong sign.
#[derive(Debug, Deserialize)]
struct RawExtraction {
    city: Option<String>,
    category: Option<String>,
    #[serde(rename = "transactionType", alias = "transaction_type")]
    transaction_type: Option<String>,
    bedrooms: Option<f64>,
    bathrooms: Option<f64>,
    #[serde(rename = "minPrice", alias = "min_price")]
    min_price: Option<f64>,
    #[serde(rename = "maxPrice", alias = "max_price")]
    max_price: Option<f64>,
    confidence: Option<Value>,
}

/// Run the extraction stage: one completion call, then parse.
pub async fn extract_filters(
    service: &dyn CompletionService,
    query: &str,
    cities: &[InventoryCity],
) -> Result<ExtractedFilters, SearchError> {
    let prompt = build_prompt(query, cities);
    debug!(provider = service.provider_name(), "requesting filter extraction");

    let reply = service.complete(&prompt).await.map_err(|e| {
        warn!(error = %e, "completion service call failed");
        SearchError::ExtractionFailure(format!("completion service error: {e}"))
    })?;

    parse_completion(&reply)
}

fn build_prompt(query: &str, cities: &[InventoryCity]) -> String {
    let city_names: Vec<&str> = cities.iter().map(|c| c.name.as_str()).collect();
    format!(
        "You extract structured real-estate search filters from user queries.\n\
         Serviced cities: {}.\n\n\
         Respond with JSON only, no markdown code blocks, exactly this shape:\n\
         {{\"city\": string or null, \
         \"category\": \"house\"|\"apartment\"|\"suite\"|\"land\"|\"commercial\" or null, \
         \"transactionType\": \"sale\"|\"rent\" or null, \
         \"bedrooms\": number or null, \"bathrooms\": number or null, \
         \"minPrice\": number or null, \"maxPrice\": number or null, \
         \"confidence\": number}}\n\n\
         Rules:\n\
         - confidence is 0-100: how certain you are about the extraction overall.\n\
         - Prices are USD; expand shorthand like \"150k\" to 150000.\n\
         - Queries may be written in Spanish or English.\n\
         - If the query names a location outside the serviced list, still return it as city.\n\n\
         Query: \"{}\"",
        city_names.join(", "),
        query
    )
}

fn parse_completion(reply: &str) -> Result<ExtractedFilters, SearchError> {
    let json = strip_fences(reply);
    let raw: RawExtraction = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, "completion reply did not parse");
        SearchError::ExtractionFailure(format!("malformed completion reply: {e}"))
    })?;

    let confidence = raw
        .confidence
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0).round() as u8)
        .unwrap_or(0);

    let mut min_price = parse_price(raw.min_price, "minPrice");
    let mut max_price = parse_price(raw.max_price, "maxPrice");
    // An inverted range is a user-input ambiguity, not a service failure
    if let (Some(lo), Some(hi)) = (min_price, max_price) {
        if lo > hi {
            warn!(min = lo, max = hi, "swapping inverted price range");
            min_price = Some(hi);
            max_price = Some(lo);
        }
    }

    let filters = SearchFilters {
        city: raw
            .city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        category: raw.category.as_deref().and_then(parse_category),
        transaction_type: raw.transaction_type.as_deref().and_then(parse_transaction),
        bedrooms: parse_count(raw.bedrooms, "bedrooms"),
        bathrooms: parse_count(raw.bathrooms, "bathrooms"),
        min_price,
        max_price,
    };

    Ok(ExtractedFilters { filters, confidence })
}

/// Strip ```json ... ``` fencing the model may add despite instructions
fn strip_fences(text: &str) -> &str {
    let text = text.trim();

    let inner = if text.contains("```json") {
        text.split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
    } else if text.contains("```") {
        text.split("```")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
    } else {
        text
    };

    inner.trim()
}

fn parse_category(raw: &str) -> Option<PropertyCategory> {
    match raw.trim().to_lowercase().as_str() {
        "house" | "casa" | "villa" => Some(PropertyCategory::House),
        "apartment" | "departamento" | "apartamento" | "depto" => {
            Some(PropertyCategory::Apartment)
        }
        "suite" => Some(PropertyCategory::Suite),
        "land" | "terreno" | "lote" => Some(PropertyCategory::Land),
        "commercial" | "local" | "oficina" => Some(PropertyCategory::Commercial),
        other => {
            warn!(category = other, "dropping unknown property category");
            None
        }
    }
}

fn parse_transaction(raw: &str) -> Option<TransactionType> {
    match raw.trim().to_lowercase().as_str() {
        "sale" | "venta" | "buy" => Some(TransactionType::Sale),
        "rent" | "arriendo" | "alquiler" | "renta" => Some(TransactionType::Rent),
        other => {
            warn!(transaction = other, "dropping unknown transaction type");
            None
        }
    }
}

fn parse_count(value: Option<f64>, field: &'static str) -> Option<u32> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Some(v.round() as u32),
        Some(v) => {
            warn!(field, value = v, "dropping invalid count");
            None
        }
        None => None,
    }
}

fn parse_price(value: Option<f64>, field: &'static str) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Some(v),
        Some(v) => {
            warn!(field, value = v, "dropping invalid price");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_reply() {
        let reply = r#"{"city": "cuenca", "category": "apartment", "transactionType": "sale",
            "bedrooms": 2, "bathrooms": null, "minPrice": null, "maxPrice": 150000,
            "confidence": 92}"#;

        let extracted = parse_completion(reply).unwrap();
        assert_eq!(extracted.confidence, 92);
        assert_eq!(extracted.filters.city.as_deref(), Some("cuenca"));
        assert_eq!(extracted.filters.category, Some(PropertyCategory::Apartment));
        assert_eq!(extracted.filters.transaction_type, Some(TransactionType::Sale));
        assert_eq!(extracted.filters.bedrooms, Some(2));
        assert_eq!(extracted.filters.bathrooms, None);
        assert_eq!(extracted.filters.max_price, Some(150000.0));
    }

    #[test]
    fn strips_markdown_fences() {
        let reply = "```json\n{\"city\": \"paute\", \"confidence\": 70}\n```";
        let extracted = parse_completion(reply).unwrap();
        assert_eq!(extracted.filters.city.as_deref(), Some("paute"));
        assert_eq!(extracted.confidence, 70);
    }

    #[test]
    fn confidence_defaults_to_zero_when_missing_or_non_numeric() {
        let extracted = parse_completion(r#"{"city": "cuenca"}"#).unwrap();
        assert_eq!(extracted.confidence, 0);

        let extracted = parse_completion(r#"{"city": "cuenca", "confidence": "high"}"#).unwrap();
        assert_eq!(extracted.confidence, 0);
    }

    #[test]
    fn confidence_is_clamped() {
        let extracted = parse_completion(r#"{"confidence": 250}"#).unwrap();
        assert_eq!(extracted.confidence, 100);

        let extracted = parse_completion(r#"{"confidence": -5}"#).unwrap();
        assert_eq!(extracted.confidence, 0);
    }

    #[test]
    fn inverted_price_range_is_swapped() {
        let reply = r#"{"minPrice": 200000, "maxPrice": 80000, "confidence": 60}"#;
        let extracted = parse_completion(reply).unwrap();
        assert_eq!(extracted.filters.min_price, Some(80000.0));
        assert_eq!(extracted.filters.max_price, Some(200000.0));
    }

    #[test]
    fn negative_numbers_are_dropped() {
        let reply = r#"{"bedrooms": -2, "minPrice": -1000, "confidence": 50}"#;
        let extracted = parse_completion(reply).unwrap();
        assert_eq!(extracted.filters.bedrooms, None);
        assert_eq!(extracted.filters.min_price, None);
    }

    #[test]
    fn spanish_tokens_are_accepted() {
        let reply = r#"{"category": "departamento", "transactionType": "arriendo", "confidence": 80}"#;
        let extracted = parse_completion(reply).unwrap();
        assert_eq!(extracted.filters.category, Some(PropertyCategory::Apartment));
        assert_eq!(extracted.filters.transaction_type, Some(TransactionType::Rent));
    }

    #[test]
    fn unknown_tokens_become_none() {
        let reply = r#"{"category": "castle", "transactionType": "barter", "confidence": 80}"#;
        let extracted = parse_completion(reply).unwrap();
        assert_eq!(extracted.filters.category, None);
        assert_eq!(extracted.filters.transaction_type, None);
    }

    #[test]
    fn blank_city_becomes_none() {
        let extracted = parse_completion(r#"{"city": "  ", "confidence": 40}"#).unwrap();
        assert_eq!(extracted.filters.city, None);
    }

    #[test]
    fn malformed_reply_fails_closed() {
        let err = parse_completion("I think you want a house in Cuenca!").unwrap_err();
        assert!(matches!(err, SearchError::ExtractionFailure(_)));
    }

    #[test]
    fn prompt_carries_city_grounding_and_query() {
        let cities = vec![
            InventoryCity::new("Cuenca", 40),
            InventoryCity::new("Paute", 3),
        ];
        let prompt = build_prompt("casa en cuenca", &cities);
        assert!(prompt.contains("Cuenca, Paute"));
        assert!(prompt.contains("casa en cuenca"));
        assert!(prompt.contains("confidence"));
    }
}
