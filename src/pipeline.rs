//! Source selection: SmartPing first, PingPocket second, mock signal last.
//!
//! Never fails. Each step degrades to the next one and the caller always
//! gets a `FetchResult` to emit.
use crate::adapter::to_club_licensee;
use crate::config::Config;
use crate::models::{ClubLicensee, FetchResult};
use crate::pingpocket::PingPocketScraper;
use crate::smartping::SmartPingClient;

pub async fn fetch_club_licensees(
    config: &Config,
    club_id: &str,
    api_key: Option<&str>,
) -> FetchResult {
    tracing::info!("Club ID: {}", club_id);

    match api_key {
        Some(key) => {
            if let Some(result) = try_smartping(config, club_id, key).await {
                return result;
            }
        }
        None => tracing::warn!("SmartPing API key not provided, skipping API"),
    }

    if let Some(result) = try_pingpocket(config, club_id).await {
        return result;
    }

    tracing::warn!("No licensees found from any source for club {}", club_id);
    FetchResult::no_data(club_id)
}

async fn try_smartping(config: &Config, club_id: &str, api_key: &str) -> Option<FetchResult> {
    tracing::info!("Querying SmartPing API...");

    let client = match SmartPingClient::new(config, api_key.to_string()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to initialize SmartPing client: {}", e);
            return None;
        }
    };

    let licensees = client.get_club_licensees(club_id).await;
    if licensees.is_empty() {
        tracing::warn!("No licensees found from SmartPing API");
        return None;
    }

    tracing::info!("✓ Found {} licensees from SmartPing API", licensees.len());

    let mut converted: Vec<ClubLicensee> = licensees.iter().map(to_club_licensee).collect();
    converted.sort_by(|a, b| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
    });

    Some(FetchResult::from_smartping(club_id, converted))
}

async fn try_pingpocket(config: &Config, club_id: &str) -> Option<FetchResult> {
    tracing::info!("Querying PingPocket roster page...");

    let scraper = match PingPocketScraper::new(config) {
        Ok(scraper) => scraper,
        Err(e) => {
            tracing::error!("Failed to initialize PingPocket scraper: {}", e);
            return None;
        }
    };

    let licensees = scraper.get_club_licensees_html(club_id).await;
    if licensees.is_empty() {
        tracing::warn!("No licensees found from HTML parsing");
        return None;
    }

    tracing::info!("✓ Found {} licensees from HTML parsing", licensees.len());
    Some(FetchResult::from_pingpocket(club_id, licensees))
}
