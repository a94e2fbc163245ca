/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use fftt_licensees::adapter::{category_from_echelon, estimate_age, is_active, to_club_licensee};
use fftt_licensees::models::{Category, Licensee};
use fftt_licensees::pingpocket::{extract_points, parse_licensees_html, split_name};
use fftt_licensees::smartping::parse_licensees_xml;
use proptest::prelude::*;

// Property: the adapter never panics and always lands in the enumeration
proptest! {
    #[test]
    fn adapter_never_panics(
        echelon in "\\PC*",
        validity in "\\PC{0,3}",
        points in any::<i64>()
    ) {
        let licensee = Licensee {
            echelon,
            validity,
            points,
            ..Licensee::default()
        };
        let converted = to_club_licensee(&licensee);
        prop_assert!(Category::ALL.contains(&converted.category));
        prop_assert_ne!(converted.category, Category::Surclasse);
        prop_assert_eq!(converted.age, estimate_age(converted.category));
        prop_assert!(converted.email.is_none() && converted.phone.is_none());
    }

    #[test]
    fn echelon_marker_ignores_points(points in any::<i64>(), prefix in "[0-9 ]{0,3}") {
        let echelon = format!("{}sen", prefix);
        prop_assert_eq!(category_from_echelon(&echelon, points), Category::Senior);
    }

    #[test]
    fn points_category_is_monotonic(a in -1000i64..5000, b in -1000i64..5000) {
        let rank = |c: Category| match c {
            Category::Benjamin => 0,
            Category::Minime => 1,
            Category::Senior => 2,
            Category::Veteran => 3,
            other => panic!("unexpected points category {:?}", other),
        };
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rank(category_from_echelon("", low)) <= rank(category_from_echelon("", high)));
    }
}

// Property: active flag
proptest! {
    #[test]
    fn only_o_or_empty_is_active(validity in "[A-Za-z]{1,2}") {
        let expected = validity.eq_ignore_ascii_case("o");
        prop_assert_eq!(is_active(&validity), expected);
    }
}

// Property: SmartPing parsing
proptest! {
    #[test]
    fn xml_yields_one_record_per_joueur(licences in prop::collection::vec("[0-9]{5,8}", 0..20)) {
        let body: String = licences
            .iter()
            .map(|l| format!(r#"<joueur licence="{}"/>"#, l))
            .collect();
        let xml = format!("<liste>{}</liste>", body);

        let parsed = parse_licensees_xml(&xml).unwrap();
        let parsed: Vec<String> = parsed.into_iter().map(|l| l.licence).collect();
        prop_assert_eq!(parsed, licences);
    }

    #[test]
    fn xml_parsing_never_panics(xml in "\\PC*") {
        let _ = parse_licensees_xml(&xml);
    }
}

// Property: PingPocket parsing
proptest! {
    #[test]
    fn split_name_keeps_every_word(words in prop::collection::vec("[A-Za-z]{1,8}", 1..5)) {
        let text = words.join(" ");
        match split_name(&text) {
            Some((last, first)) => {
                prop_assert!(words.len() >= 2);
                prop_assert_eq!(last, words[0].clone());
                prop_assert_eq!(first, words[1..].join(" "));
            }
            None => prop_assert_eq!(words.len(), 1),
        }
    }

    #[test]
    fn extract_points_reads_leading_number(points in 0i64..100_000, suffix in "[a-z ]{0,6}") {
        prop_assert_eq!(extract_points(&format!("{}{}", points, suffix)), points);
    }

    #[test]
    fn html_parsing_never_panics(html in "\\PC*") {
        let _ = parse_licensees_html(&html, "07620112");
    }
}
