use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============ SmartPing Models ============

/// A licensee as returned by the SmartPing `xml_liste_joueur_o.php` endpoint.
///
/// Every field is always present: attributes missing from the `<joueur>`
/// element take the documented default instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Licensee {
    /// License number.
    #[serde(rename = "licence")]
    pub licence: String,
    /// Last name.
    #[serde(rename = "nom")]
    pub last_name: String,
    /// First name.
    #[serde(rename = "prenom")]
    pub first_name: String,
    /// Club number.
    pub club: String,
    /// Club name.
    #[serde(rename = "nclub")]
    pub club_name: String,
    /// Current points.
    pub points: i64,
    /// Current ranking label.
    #[serde(rename = "classement")]
    pub ranking: String,
    /// Player level label.
    pub echelon: String,
    /// Place in the ranking.
    #[serde(rename = "place")]
    pub rank_position: i64,
    /// Nationality code.
    #[serde(rename = "natio")]
    pub nationality: String,
    /// Sex code (M/F).
    #[serde(rename = "sexe")]
    pub sex: String,
    /// License type (A/J/V).
    #[serde(rename = "type")]
    pub license_type: String,
    /// Medical certificate status.
    #[serde(rename = "certif")]
    pub certificate: String,
    /// License validity code.
    #[serde(rename = "valide")]
    pub validity: String,
    /// Mixed level label.
    pub echelon_mixte: String,
}

impl Default for Licensee {
    fn default() -> Self {
        Self {
            licence: String::new(),
            last_name: String::new(),
            first_name: String::new(),
            club: String::new(),
            club_name: String::new(),
            points: 0,
            ranking: String::new(),
            echelon: String::new(),
            rank_position: 0,
            nationality: "F".to_string(),
            sex: String::new(),
            license_type: "A".to_string(),
            certificate: String::new(),
            validity: String::new(),
            echelon_mixte: String::new(),
        }
    }
}

impl Licensee {
    /// Builds a licensee from the attributes of one `<joueur>` element.
    ///
    /// Missing attributes fall back to defaults. A `points` or `place`
    /// attribute that is present but not an integer is an error.
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let text = |name: &str, default: String| attrs.get(name).cloned().unwrap_or(default);

        Ok(Self {
            licence: text("licence", defaults.licence),
            last_name: text("nom", defaults.last_name),
            first_name: text("prenom", defaults.first_name),
            club: text("club", defaults.club),
            club_name: text("nclub", defaults.club_name),
            points: integer_attr(attrs, "points")?,
            ranking: text("classement", defaults.ranking),
            echelon: text("echelon", defaults.echelon),
            rank_position: integer_attr(attrs, "place")?,
            nationality: text("natio", defaults.nationality),
            sex: text("sexe", defaults.sex),
            license_type: text("type", defaults.license_type),
            certificate: text("certif", defaults.certificate),
            validity: text("valide", defaults.validity),
            echelon_mixte: text("echelon_mixte", defaults.echelon_mixte),
        })
    }
}

fn integer_attr(attrs: &HashMap<String, String>, name: &str) -> Result<i64, AppError> {
    match attrs.get(name) {
        None => Ok(0),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            AppError::Parse(format!("attribute '{}' is not an integer: {:?}", name, raw))
        }),
    }
}

// ============ PingPocket Models ============

pub const PINGPOCKET_SOURCE_TAG: &str = "pingpocket_html";

/// A reduced licensee scraped from the PingPocket roster page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedLicensee {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    pub points: i64,
    pub club: String,
    pub source: String,
}

// ============ Output Models ============

/// Age category used by the club website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Poussin,
    Benjamin,
    Minime,
    Cadet,
    Junior,
    Senior,
    Veteran,
    /// Kept in the age table; no derivation rule produces it.
    Surclasse,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Poussin,
        Category::Benjamin,
        Category::Minime,
        Category::Cadet,
        Category::Junior,
        Category::Senior,
        Category::Veteran,
        Category::Surclasse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Poussin => "poussin",
            Category::Benjamin => "benjamin",
            Category::Minime => "minime",
            Category::Cadet => "cadet",
            Category::Junior => "junior",
            Category::Senior => "senior",
            Category::Veteran => "veteran",
            Category::Surclasse => "surclasse",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == lower)
            .ok_or_else(|| AppError::Parse(format!("unknown category: {}", s)))
    }
}

/// Licensee in the shape expected by the club website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubLicensee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub age: u32,
    pub category: Category,
    /// Not provided by the federation.
    pub email: Option<String>,
    /// Not provided by the federation.
    pub phone: Option<String>,
    pub active: bool,
    pub points: i64,
    pub classement: String,
    pub echelon: String,
}

/// Where the emitted licensees came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "smartping")]
    SmartPing,
    #[serde(rename = "pingpocket_html")]
    PingPocketHtml,
    /// Nothing found; the consumer should fall back to mock data.
    #[serde(rename = "mock")]
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LicenseeList {
    SmartPing(Vec<ClubLicensee>),
    PingPocket(Vec<ScrapedLicensee>),
}

impl LicenseeList {
    pub fn len(&self) -> usize {
        match self {
            LicenseeList::SmartPing(list) => list.len(),
            LicenseeList::PingPocket(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub const NO_DATA_MESSAGE: &str = "No data found from external sources, will use mock data";

/// The single JSON document written to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub success: bool,
    pub licensees: LicenseeList,
    pub source: DataSource,
    pub club_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FetchResult {
    pub fn from_smartping(club_id: &str, licensees: Vec<ClubLicensee>) -> Self {
        Self {
            success: true,
            count: Some(licensees.len()),
            licensees: LicenseeList::SmartPing(licensees),
            source: DataSource::SmartPing,
            club_id: club_id.to_string(),
            message: None,
        }
    }

    pub fn from_pingpocket(club_id: &str, licensees: Vec<ScrapedLicensee>) -> Self {
        Self {
            success: true,
            count: Some(licensees.len()),
            licensees: LicenseeList::PingPocket(licensees),
            source: DataSource::PingPocketHtml,
            club_id: club_id.to_string(),
            message: None,
        }
    }

    pub fn no_data(club_id: &str) -> Self {
        Self {
            success: false,
            licensees: LicenseeList::SmartPing(Vec::new()),
            source: DataSource::Mock,
            club_id: club_id.to_string(),
            count: Some(0),
            message: Some(NO_DATA_MESSAGE.to_string()),
        }
    }
}
