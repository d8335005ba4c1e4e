use inmo_search::search::{AnthropicCompletion, SearchInterpreter, StaticInventory};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 Inmo Search - Natural Language Query Interpreter");
    info!("===================================================");
    info!("");

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        anyhow::bail!("usage: inmo-search <free-text property query>");
    }

    let completion = Arc::new(AnthropicCompletion::from_env()?);
    let inventory = Arc::new(StaticInventory::sample());
    let interpreter = SearchInterpreter::new(completion, inventory);

    info!("Interpreting query: {}", query);
    info!("");

    let result = interpreter.parse_search_query(&query).await;

    if result.success {
        info!("✅ Query interpreted with confidence {}", result.confidence);
        if let Some(validation) = &result.location_validation {
            if let Some(message) = &validation.message {
                info!("   {}", message);
            }
        }
    } else {
        warn!("Interpretation failed: {:?}", result.error);
    }

    let json = serde_json::to_string_pretty(&result)?;
    println!("{}", json);

    tokio::fs::write("search_result.json", &json).await?;
    info!("💾 Saved result to search_result.json");

    Ok(())
}
