//! Conversion from SmartPing licensees to the club website's format.
//!
//! Pure functions only: every input field already carries a safe default.
use crate::models::{Category, ClubLicensee, Licensee};

/// Echelon markers checked in order; the first substring match wins.
const ECHELON_MARKERS: [(&str, Category); 7] = [
    ("POU", Category::Poussin),
    ("BEN", Category::Benjamin),
    ("MIN", Category::Minime),
    ("CAD", Category::Cadet),
    ("JUN", Category::Junior),
    ("SEN", Category::Senior),
    ("VET", Category::Veteran),
];

/// Age assumed for an unrecognized category.
pub const DEFAULT_AGE: u32 = 25;

/// Derives the age category from the echelon label, or from points when the
/// label names no category.
pub fn category_from_echelon(echelon: &str, points: i64) -> Category {
    let echelon = echelon.to_uppercase();
    if let Some((_, category)) = ECHELON_MARKERS
        .iter()
        .find(|(marker, _)| echelon.contains(marker))
    {
        return *category;
    }

    if points < 500 {
        Category::Benjamin
    } else if points < 800 {
        Category::Minime
    } else if points < 1200 {
        Category::Senior
    } else {
        Category::Veteran
    }
}

/// Representative age for a category.
pub fn estimate_age(category: Category) -> u32 {
    match category {
        Category::Poussin => 8,
        Category::Benjamin => 10,
        Category::Minime => 13,
        Category::Cadet => 16,
        Category::Junior => 17,
        Category::Senior => 25,
        Category::Veteran => 50,
        Category::Surclasse => 65,
    }
}

/// Same table keyed by name; unknown names get [`DEFAULT_AGE`].
pub fn estimate_age_from_name(category: &str) -> u32 {
    category
        .parse::<Category>()
        .map(estimate_age)
        .unwrap_or(DEFAULT_AGE)
}

/// An empty validity code counts as active.
pub fn is_active(validity: &str) -> bool {
    validity.is_empty() || validity.to_uppercase() == "O"
}

pub fn to_club_licensee(licensee: &Licensee) -> ClubLicensee {
    let category = category_from_echelon(&licensee.echelon, licensee.points);

    ClubLicensee {
        id: licensee.licence.clone(),
        first_name: licensee.first_name.clone(),
        last_name: licensee.last_name.clone(),
        license_number: licensee.licence.clone(),
        age: estimate_age(category),
        category,
        email: None,
        phone: None,
        active: is_active(&licensee.validity),
        points: licensee.points,
        classement: licensee.ranking.clone(),
        echelon: licensee.echelon.clone(),
    }
}
