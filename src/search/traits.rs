use crate::models::InventoryCity;
use anyhow::Result;
use async_trait::async_trait;

/// Completion-service collaborator used by the filter extractor.
/// Implementations wrap a concrete provider (Anthropic in production,
/// scripted replies in tests).
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send a prompt and return the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Get the name of the provider for logging
    fn provider_name(&self) -> &'static str;
}

/// Read-only snapshot of the cities that currently have listings.
/// Counts are small, so the whole list is returned at once.
pub trait InventoryProvider: Send + Sync {
    fn list_serviced_cities(&self) -> Vec<InventoryCity>;
}
