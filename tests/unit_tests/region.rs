use regionfem::region::{NamedRegion, RegionError, RegionRegistry, Selector, TagSet};
use std::collections::BTreeSet;

fn overlapping_registry() -> RegionRegistry {
    let mut registry = RegionRegistry::with_domain_name("MyDomain");
    registry.register("LeftAndMid", [1, 2]).unwrap();
    registry.register("Mid", [2]).unwrap();
    registry.register("RightAndMid", [2, 3]).unwrap();
    registry
}

fn only(tags: &[usize]) -> TagSet {
    TagSet::Only(tags.iter().copied().collect())
}

#[test]
fn register_returns_region() {
    let mut registry = RegionRegistry::new();
    let region = registry.register("LeftAndMid", [2, 1, 2]).unwrap();
    assert_eq!(region.name(), "LeftAndMid");
    assert_eq!(region.tags(), &BTreeSet::from([1, 2]));
    assert!(region.contains(1));
    assert!(!region.contains(3));
    assert_eq!(registry.get("LeftAndMid"), Some(&region));
    assert_eq!(registry.len(), 1);
}

#[test]
fn lookup_named_regions() {
    let registry = overlapping_registry();
    assert_eq!(registry.lookup(&Selector::from("LeftAndMid")), Ok(only(&[1, 2])));
    assert_eq!(registry.lookup(&Selector::from("Mid")), Ok(only(&[2])));
    assert_eq!(registry.lookup(&Selector::from("RightAndMid")), Ok(only(&[2, 3])));
}

#[test]
fn lookup_tags_regions_and_everywhere() {
    let registry = overlapping_registry();
    assert_eq!(registry.lookup(&Selector::Tag(0)), Ok(only(&[0])));
    assert_eq!(registry.lookup(&Selector::from(3usize)), Ok(only(&[3])));
    assert_eq!(registry.lookup(&Selector::Everywhere), Ok(TagSet::All));

    // Regions can be used without being registered
    let region = NamedRegion::new("Outer", [1, 3]);
    assert_eq!(registry.lookup(&Selector::from(&region)), Ok(only(&[1, 3])));
}

#[test]
fn tag_sets() {
    assert!(TagSet::All.contains(0));
    assert!(TagSet::All.contains(42));
    assert!(only(&[2, 3]).contains(3));
    assert!(!only(&[2, 3]).contains(1));
    assert!(!only(&[]).contains(0));
}

#[test]
fn lookup_unregistered_name_fails_without_mutation() {
    let registry = overlapping_registry();
    let before = registry.clone();
    assert_eq!(
        registry.lookup(&Selector::from("Right")),
        Err(RegionError::InvalidRegion {
            name: "Right".to_string()
        })
    );
    assert_eq!(registry, before);
}

#[test]
fn duplicate_registration_fails_without_mutation() {
    let mut registry = overlapping_registry();
    let before = registry.clone();
    assert_eq!(
        registry.register("Mid", [1, 2, 3]),
        Err(RegionError::DuplicateRegion { name: "Mid".to_string() })
    );
    assert_eq!(registry, before);
    assert_eq!(registry.get("Mid").unwrap().tags(), &BTreeSet::from([2]));
}

#[test]
fn regions_are_listed_alphabetically() {
    let registry = overlapping_registry();
    let names: Vec<_> = registry.regions().map(|region| region.name()).collect();
    assert_eq!(names, vec!["LeftAndMid", "Mid", "RightAndMid"]);
}

#[test]
fn labels() {
    let registry = overlapping_registry();
    let mid = registry.get("Mid").unwrap().clone();
    assert_eq!(registry.label(&Selector::Everywhere), "MyDomain");
    assert_eq!(registry.label(&Selector::Tag(2)), "2");
    assert_eq!(registry.label(&Selector::from(mid)), "Mid");
    assert_eq!(registry.label(&Selector::from("RightAndMid")), "RightAndMid");

    assert_eq!(RegionRegistry::default().domain_name(), "everywhere");
    assert_eq!(RegionRegistry::new().label(&Selector::Everywhere), "everywhere");
}

#[test]
fn error_messages_name_the_region() {
    let err = RegionError::InvalidRegion { name: "Nowhere".to_string() };
    assert!(err.to_string().contains("Nowhere"));
    let err = RegionError::DuplicateRegion { name: "Mid".to_string() };
    assert!(err.to_string().contains("Mid"));
}
