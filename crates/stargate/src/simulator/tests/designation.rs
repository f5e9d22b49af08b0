use super::*;

#[test]
fn designation_has_stable_shape() {
    for raw in [0u32, 1, 100, 200, 65_535, u32::MAX] {
        let label = designation_string(Address(raw));
        let chars: Vec<char> = label.chars().collect();
        assert_eq!(chars.len(), 7, "{label}");
        assert_eq!(chars[0], 'P');
        assert!(chars[1].is_ascii_digit());
        assert!(chars[2].is_ascii_uppercase());
        assert_eq!(chars[3], '-');
        assert!(chars[4..].iter().all(char::is_ascii_digit));
        assert_eq!(designation_string(Address(raw)), label);
    }
}

#[test]
fn designation_varies_with_address() {
    let labels: std::collections::BTreeSet<String> = (0..64)
        .map(|raw| designation_string(Address(raw)))
        .collect();
    assert!(labels.len() > 60);
}

#[test]
fn unknown_address_gets_placeholder() {
    assert_eq!(designation_or_unknown(None), "unknown");
    assert_eq!(
        designation_or_unknown(Some(ADDRESS_A)),
        designation_string(ADDRESS_A)
    );
}

#[test]
fn reseed_depends_on_time() {
    assert_eq!(reseed(5, 10), reseed(5, 10));
    assert_ne!(reseed(5, 10), reseed(5, 11));
    assert_ne!(reseed(5, 10), reseed(6, 10));
}
