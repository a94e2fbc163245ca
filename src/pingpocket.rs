use crate::config::Config;
use crate::errors::AppError;
use crate::models::{ScrapedLicensee, PINGPOCKET_SOURCE_TAG};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

const CLIENT_USER_AGENT: &str = "Club-Pongiste-Libercourtois/1.0";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Element holding "LASTNAME Firstname".
const LABELS_SELECTOR: &str = "div.labels";
/// Element holding the points of the preceding labels block. The class
/// attribute must be exactly "counter pos".
const COUNTER_SELECTOR: &str = r#"small[class="counter pos"]"#;

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Scraper for the PingPocket club roster page, used when SmartPing is
/// unavailable.
#[derive(Clone)]
pub struct PingPocketScraper {
    client: Client,
    base_url: String,
}

impl PingPocketScraper {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));

        let client = Client::builder()
            .timeout(config.pingpocket_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::Network(format!("Failed to create PingPocket client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.pingpocket_base_url.clone(),
        })
    }

    /// Scrapes the roster of a club. Errors are logged and yield an empty list.
    pub async fn get_club_licensees_html(&self, club_id: &str) -> Vec<ScrapedLicensee> {
        match self.fetch_club_licensees(club_id).await {
            Ok(licensees) => licensees,
            Err(e) if e.is_network() => {
                tracing::error!("Error fetching HTML from PingPocket: {}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Error parsing HTML licensees: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_club_licensees(&self, club_id: &str) -> Result<Vec<ScrapedLicensee>, AppError> {
        let url = Url::parse_with_params(
            &format!(
                "{}/app/fftt/clubs/{}/licencies",
                self.base_url.trim_end_matches('/'),
                club_id
            ),
            &[("SORT", "ALPHABETIC")],
        )
        .map_err(|e| AppError::Network(format!("Failed to build PingPocket URL: {}", e)))?;

        tracing::info!("Fetching PingPocket roster: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::Network(format!("PingPocket request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "PingPocket returned status {}",
                status
            )));
        }

        let html = response.text().await?;
        let licensees = parse_licensees_html(&html, club_id)?;

        tracing::info!(
            "PingPocket page listed {} licensees for club {}",
            licensees.len(),
            club_id
        );
        Ok(licensees)
    }
}

/// Extracts name/points pairs from a PingPocket roster page.
///
/// Each `div.labels` block is paired with the first `small` whose class is
/// exactly "counter pos" and that follows it in document order, provided it comes before the next
/// labels block. Blocks whose text has fewer than two words are skipped.
pub fn parse_licensees_html(html: &str, club_id: &str) -> Result<Vec<ScrapedLicensee>, AppError> {
    let labels = selector(LABELS_SELECTOR)?;
    let counter = selector(COUNTER_SELECTOR)?;
    let document = Html::parse_document(html);

    let mut licensees = Vec::new();
    let mut pending: Option<(String, String)> = None;
    let mut pending_points: Option<i64> = None;

    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        if labels.matches(&element) {
            if let Some((last_name, first_name)) = pending.take() {
                licensees.push(scraped(last_name, first_name, pending_points, club_id));
            }
            pending = split_name(&element_text(&element));
            pending_points = None;
        } else if counter.matches(&element) && pending.is_some() && pending_points.is_none() {
            pending_points = Some(extract_points(&element_text(&element)));
        }
    }

    if let Some((last_name, first_name)) = pending {
        licensees.push(scraped(last_name, first_name, pending_points, club_id));
    }

    Ok(licensees)
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::Parse(format!("invalid selector {}: {:?}", css, e)))
}

fn scraped(
    last_name: String,
    first_name: String,
    points: Option<i64>,
    club_id: &str,
) -> ScrapedLicensee {
    ScrapedLicensee {
        last_name,
        first_name,
        points: points.unwrap_or(0),
        club: club_id.to_string(),
        source: PINGPOCKET_SOURCE_TAG.to_string(),
    }
}

/// Concatenated descendant text, as the DOM's `textContent`.
fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// "LASTNAME First Names" -> ("LASTNAME", "First Names").
pub fn split_name(text: &str) -> Option<(String, String)> {
    let mut parts = text.split_whitespace();
    let last_name = parts.next()?;
    let first_name = parts.collect::<Vec<_>>().join(" ");
    if first_name.is_empty() {
        return None;
    }
    Some((last_name.to_string(), first_name))
}

/// First run of digits in the text, 0 when there is none.
pub fn extract_points(text: &str) -> i64 {
    DIGITS
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"
<html><body>
  <ul>
    <li><div class="labels">DUPONT Jean Pierre</div><small class="counter pos">1234 pts</small></li>
    <li><div class="labels">CHER</div><small class="counter pos">999 pts</small></li>
    <li><div class="labels">MARTIN Léa</div><small class="counter neg">12</small></li>
    <li><div class="labels"><span>DURAND</span> <span>Paul</span></div><small class="counter pos">Points : 587</small></li>
  </ul>
</body></html>"#;

    #[test]
    fn test_parses_roster() {
        let licensees = parse_licensees_html(ROSTER, "07620112").unwrap();
        assert_eq!(licensees.len(), 3);

        assert_eq!(licensees[0].last_name, "DUPONT");
        assert_eq!(licensees[0].first_name, "Jean Pierre");
        assert_eq!(licensees[0].points, 1234);
        assert_eq!(licensees[0].club, "07620112");
        assert_eq!(licensees[0].source, "pingpocket_html");

        // Counter with another class does not count
        assert_eq!(licensees[1].last_name, "MARTIN");
        assert_eq!(licensees[1].points, 0);

        assert_eq!(licensees[2].last_name, "DURAND");
        assert_eq!(licensees[2].first_name, "Paul");
        assert_eq!(licensees[2].points, 587);
    }

    #[test]
    fn test_inline_markup_inside_a_word() {
        let html = r#"<div class="labels">DUP<b>ONT</b> Jean</div><small class="counter pos">900</small>"#;
        let licensees = parse_licensees_html(html, "1").unwrap();
        assert_eq!(licensees.len(), 1);
        assert_eq!(licensees[0].last_name, "DUPONT");
        assert_eq!(licensees[0].first_name, "Jean");
        assert_eq!(licensees[0].points, 900);
    }

    #[test]
    fn test_counter_class_must_match_exactly() {
        let html = r#"
            <div class="labels">ALPHA Anne</div><small class="counter pos big">111</small>
            <div class="labels">BETA Bruno</div><small class="pos counter">222</small>
            <div class="labels">GAMMA Gilles</div><small class="counter pos">333</small>"#;
        let points: Vec<i64> = parse_licensees_html(html, "1")
            .unwrap()
            .iter()
            .map(|l| l.points)
            .collect();
        assert_eq!(points, vec![0, 0, 333]);
    }

    #[test]
    fn test_points_beyond_i32_range() {
        assert_eq!(extract_points("3000000000 pts"), 3_000_000_000);
    }

    #[test]
    fn test_single_token_name_is_skipped() {
        let html = r#"<div class="labels">SOLO</div><small class="counter pos">700</small>"#;
        assert!(parse_licensees_html(html, "1").unwrap().is_empty());
    }

    #[test]
    fn test_counter_after_next_label_is_not_borrowed() {
        let html = r#"
            <div class="labels">ALPHA Anne</div>
            <div class="labels">BETA Bruno</div>
            <small class="counter pos">640</small>"#;
        let licensees = parse_licensees_html(html, "1").unwrap();
        assert_eq!(licensees.len(), 2);
        assert_eq!(licensees[0].points, 0);
        assert_eq!(licensees[1].points, 640);
    }

    #[test]
    fn test_page_without_labels() {
        let html = "<html><body><p>Club introuvable</p></body></html>";
        assert!(parse_licensees_html(html, "1").unwrap().is_empty());
    }

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("  LE GALL  Marie "),
            Some(("LE".to_string(), "GALL Marie".to_string()))
        );
        assert_eq!(split_name("SOLO"), None);
        assert_eq!(split_name(""), None);
    }

    #[test]
    fn test_extract_points() {
        assert_eq!(extract_points("1234 pts"), 1234);
        assert_eq!(extract_points("n°5 - 800"), 5);
        assert_eq!(extract_points("NC"), 0);
    }
}
