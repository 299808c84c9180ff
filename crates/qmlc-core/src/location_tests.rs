use crate::{LineIndex, Location};

#[test]
fn first_byte_is_one_one() {
    let index = LineIndex::new("Item {}");
    assert_eq!(index.location(0), Location::new(1, 1));
}

#[test]
fn locations_across_lines() {
    let source = "Item {\n    width: 5\n}";
    let index = LineIndex::new(source);

    assert_eq!(index.line_count(), 3);
    assert_eq!(index.location(5), Location::new(1, 6));
    assert_eq!(index.location(11), Location::new(2, 5));
    assert_eq!(index.location(7), Location::new(2, 1));
    assert_eq!(index.location(20), Location::new(3, 1));
}

#[test]
fn columns_count_characters() {
    let source = "ä: 1";
    let index = LineIndex::new(source);
    // ':' is byte 2 but the second character
    assert_eq!(index.location(2), Location::new(1, 2));
}

#[test]
fn offset_past_end_clamps() {
    let index = LineIndex::new("ab");
    assert_eq!(index.location(100), Location::new(1, 3));
}

#[test]
fn location_display() {
    insta::assert_snapshot!(Location::new(3, 14).to_string(), @"3:14");
    assert!(!Location::default().is_valid());
}
