// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for DNS Names and Logical Ids

use alb_mtls::domain::{DomainName, DomainNameError};
use alb_mtls::Stack;
use proptest::prelude::*;

fn label() -> impl Strategy<Value = String> {
    "[a-z0-9]([a-z0-9-]{0,20}[a-z0-9])?"
}

fn zone() -> impl Strategy<Value = String> {
    (label(), "[a-z]{2,6}").prop_map(|(name, tld)| format!("{}.{}", name, tld))
}

fn path_component() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _./-]{1,16}"
}

proptest! {
    /// Property: valid names are accepted and stored lowercase
    #[test]
    fn prop_case_insensitive(zone in zone()) {
        let lower = DomainName::new(zone.as_str()).expect("valid zone");
        let upper = DomainName::new(zone.to_ascii_uppercase()).expect("valid zone");
        prop_assert_eq!(&lower, &upper);
        prop_assert_eq!(lower.as_str(), zone.as_str());
    }

    /// Property: the absolute form parses back to the same name
    #[test]
    fn prop_absolute_roundtrip(zone in zone()) {
        let name = DomainName::new(zone).expect("valid zone");
        let absolute = name.to_absolute();
        prop_assert!(absolute.ends_with('.'));
        prop_assert_eq!(DomainName::new(absolute).expect("absolute form"), name);
    }

    /// Property: a subdomain sits inside its zone, one label deeper
    #[test]
    fn prop_subdomain_within_zone(zone in zone(), sub in label()) {
        let zone = DomainName::new(zone).expect("valid zone");
        let record = zone.subdomain(&sub).expect("valid label");

        prop_assert!(record.is_within(&zone));
        prop_assert!(!zone.is_within(&record));
        prop_assert_eq!(record.labels().len(), zone.labels().len() + 1);
        prop_assert_eq!(record.parent(), Some(zone));
    }

    /// Property: a name ending in the zone text but not on a label boundary is outside it
    #[test]
    fn prop_suffix_is_not_containment(zone in zone(), prefix in "[a-z]{1,8}") {
        let zone = DomainName::new(zone.as_str()).expect("valid zone");
        let lookalike = DomainName::new(format!("{}{}", prefix, zone)).expect("valid name");
        prop_assert!(!lookalike.is_within(&zone));
    }

    /// Property: underscores are rejected wherever they appear
    #[test]
    fn prop_underscore_rejected(head in "[a-z]{0,8}", tail in "[a-z]{0,8}", zone in zone()) {
        let result = DomainName::new(format!("{}_{}.{}", head, tail, zone));
        prop_assert_eq!(result, Err(DomainNameError::InvalidCharacter('_')));
    }

    /// Property: logical ids are plain alphanumerics
    #[test]
    fn prop_logical_id_alphanumeric(path in prop::collection::vec(path_component(), 1..5)) {
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        let id = Stack::logical_id(&path);
        prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()), "{}", id);
    }

    /// Property: a trailing Resource or Default component does not change the id
    #[test]
    fn prop_hidden_components_dropped(
        path in prop::collection::vec("[A-Za-z0-9]{1,12}", 1..4),
        hidden in prop_oneof![Just("Resource"), Just("Default")],
    ) {
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        let mut extended = path.clone();
        extended.push(hidden);
        prop_assert_eq!(Stack::logical_id(&extended), Stack::logical_id(&path));
    }
}
