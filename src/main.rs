use std::sync::Arc;

use tracing::{info, Level};
use venue_scout::search::{FilterSet, HttpSearchGateway, MemoryUrl, SearchController};
use venue_scout::ListingType;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:3001/api".to_string());
    let query_string = std::env::args().nth(2).unwrap_or_default();

    info!("🎪 Venue Scout - marketplace search client");
    info!("API: {base_url}");

    let gateway = Arc::new(HttpSearchGateway::new(&base_url)?);
    let url = Arc::new(MemoryUrl::new(query_string));
    let mut controller =
        SearchController::new(FilterSet::for_type(ListingType::Space), gateway, url.clone());

    controller.init().await;

    if let Some(message) = controller.last_error() {
        anyhow::bail!("{message}");
    }

    let page = controller.results();
    info!(
        "\n✅ {} listings (page {}/{})\n",
        page.total, page.page, page.total_pages
    );

    for (i, listing) in page.results.iter().enumerate() {
        println!("{}. {}", i + 1, listing.title);
        if let (Some(city), Some(state)) = (&listing.city, &listing.state) {
            println!("   {city}, {state}");
        }
        if let Some(price) = listing.price {
            println!("   R$ {price:.2}");
        }
        if let Some(rating) = listing.rating {
            println!("   ★ {rating:.1}");
        }
        println!("   ID: {}", listing.id);
        println!();
    }

    println!(
        "Categories: {}",
        controller
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if let Some(share) = url.current().filter(|q| !q.is_empty()) {
        println!("Shareable query: ?{share}");
    }

    Ok(())
}
