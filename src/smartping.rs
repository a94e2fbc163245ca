use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::Licensee;
use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::bytes::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

/// Endpoint listing the licensees of a club (SPID database).
const LICENSEES_ENDPOINT: &str = "xml_liste_joueur_o.php";

const CLIENT_USER_AGENT: &str = "Club-Pongiste-Libercourtois/1.0";
const XML_ACCEPT: &str = "application/xml, text/xml, */*";

static ENCODING_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("encoding declaration pattern is valid")
});

/// Client for the official FFTT SmartPing API.
#[derive(Clone)]
pub struct SmartPingClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SmartPingClient {
    /// Creates a client bound to one credential.
    ///
    /// The underlying HTTP session is reused for every call on this client.
    pub fn new(config: &Config, api_key: String) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(XML_ACCEPT));

        let client = Client::builder()
            .timeout(config.smartping_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create SmartPing client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.smartping_base_url.clone(),
            api_key,
        })
    }

    /// Gets all licensees of a club.
    ///
    /// Never fails: transport, status and parse errors are logged and
    /// produce an empty list.
    pub async fn get_club_licensees(&self, club_id: &str) -> Vec<Licensee> {
        match self.fetch_club_licensees(club_id).await {
            Ok(licensees) => licensees,
            Err(e) if e.is_network() => {
                tracing::error!("Error fetching data from SmartPing API: {}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Error parsing XML licensees: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_club_licensees(&self, club_id: &str) -> Result<Vec<Licensee>, AppError> {
        let url = Url::parse_with_params(
            &format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                LICENSEES_ENDPOINT
            ),
            &[
                ("serie", self.api_key.as_str()),
                ("club", club_id),
                ("type", "xml"),
            ],
        )
        .map_err(|e| AppError::Network(format!("Failed to build SmartPing URL: {}", e)))?;

        tracing::info!("Fetching SmartPing licensees for club {}", club_id);
        tracing::debug!(
            "SmartPing URL: {}/{}?serie=[REDACTED]&club={}&type=xml",
            self.base_url.trim_end_matches('/'),
            LICENSEES_ENDPOINT,
            club_id
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::Network(format!("SmartPing request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "SmartPing returned status {}",
                status
            )));
        }

        let body = response.bytes().await?;
        let xml = decode_body(&body);

        let licensees = parse_licensees_xml(&xml)
            .with_context(|| format!("SmartPing response for club {}", club_id))?;

        tracing::info!(
            "SmartPing returned {} licensees for club {}",
            licensees.len(),
            club_id
        );
        Ok(licensees)
    }
}

/// Decodes a response body using the encoding named in its XML declaration.
///
/// The federation serves ISO-8859-1; bodies without a declaration, or with
/// an unknown label, are read as UTF-8.
pub fn decode_body(body: &[u8]) -> String {
    let encoding = ENCODING_DECLARATION
        .captures(&body[..body.len().min(256)])
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::warn!("SmartPing body had invalid {} sequences", used.name());
    }
    text.into_owned()
}

/// Extracts one licensee per `<joueur>` element.
///
/// All-or-nothing: a malformed document, a non-integer numeric attribute or
/// an `<erreur>` element fails the whole document.
pub fn parse_licensees_xml(xml: &str) -> Result<Vec<Licensee>, AppError> {
    let mut reader = Reader::from_str(xml);
    let mut licensees = Vec::new();
    let mut remote_error: Option<String> = None;
    let mut in_error = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"joueur" => {
                licensees.push(Licensee::from_attributes(&attribute_map(&e)?)?);
            }
            Event::Start(e) if e.name().as_ref() == b"erreur" => {
                in_error = true;
                remote_error.get_or_insert_with(String::new);
            }
            Event::Empty(e) if e.name().as_ref() == b"erreur" => {
                remote_error.get_or_insert_with(String::new);
            }
            Event::End(e) if e.name().as_ref() == b"erreur" => in_error = false,
            Event::Text(t) if in_error => {
                if let Some(message) = remote_error.as_mut() {
                    message.push_str(t.unescape()?.trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(message) = remote_error {
        let message = if message.is_empty() {
            "Unknown FFTT error".to_string()
        } else {
            message
        };
        return Err(AppError::Remote(message));
    }

    Ok(licensees)
}

fn attribute_map(element: &BytesStart<'_>) -> Result<HashMap<String, String>, AppError> {
    let mut attrs = HashMap::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}
