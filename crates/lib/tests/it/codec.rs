//! Codec integration tests across the three formats.

use strata::{Document, Format, Value};

use crate::helpers::{key, sample_document};

#[test]
fn test_roundtrip_law_per_format() {
    let doc = sample_document();
    for format in [Format::Strata, Format::Json] {
        let encoded = format.encode(&doc);
        let decoded = format.decode(encoded.as_bytes()).unwrap();
        assert_eq!(decoded, doc, "decode(encode(doc)) must hold for {format}");
    }
}

#[test]
fn test_toml_roundtrip_without_null() {
    // TOML cannot spell null; everything else round-trips
    let mut doc = sample_document();
    doc.remove(&key("gap"));
    let encoded = Format::Toml.encode(&doc);
    assert_eq!(Format::Toml.decode(encoded.as_bytes()).unwrap(), doc);
}

#[test]
fn test_roundtrip_preserves_declaration_order() {
    let doc = Document::new()
        .with("zeta", 1)
        .with("alpha.b", 2)
        .with("alpha.a", 3)
        .with("mid", 4);

    // TOML is excluded from the top-level check: the format itself cannot
    // interleave a table between two scalars, so only within-table order is
    // comparable there.
    for format in [Format::Strata, Format::Json] {
        let decoded = format.decode(format.encode(&doc).as_bytes()).unwrap();
        let top: Vec<&str> = decoded.iter().map(|(k, _)| k).collect();
        assert_eq!(top, vec!["zeta", "alpha", "mid"], "top-level order for {format}");
    }

    for format in [Format::Strata, Format::Json, Format::Toml] {
        let decoded = format.decode(format.encode(&doc).as_bytes()).unwrap();
        let nested: Vec<&str> = decoded
            .get(&key("alpha"))
            .and_then(Value::as_map)
            .map(|m| m.iter().map(|(k, _)| k).collect())
            .unwrap_or_default();
        assert_eq!(nested, vec!["b", "a"], "nested order for {format}");
    }
}

#[test]
fn test_empty_document_roundtrips() {
    for format in [Format::Strata, Format::Json, Format::Toml] {
        let encoded = format.encode(&Document::new());
        let decoded = format.decode(encoded.as_bytes()).unwrap();
        assert!(decoded.is_empty(), "empty document for {format}");
    }
}

#[test]
fn test_parse_errors_carry_line_numbers() {
    let err = Format::Strata.decode(b"a: 1\na: 2\n").unwrap_err();
    assert_eq!(err.line(), Some(2));

    let err = Format::Json.decode(b"{\"a\": }").unwrap_err();
    assert_eq!(err.line(), Some(1));

    let err = Format::Toml.decode(b"a = 1\nb =\n").unwrap_err();
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_formats_agree_on_structure() {
    // the same document moved across formats keeps its meaning
    let doc = sample_document();
    let via_json = Format::Json
        .decode(Format::Json.encode(&doc).as_bytes())
        .unwrap();
    let via_text = Format::Strata
        .decode(Format::Strata.encode(&via_json).as_bytes())
        .unwrap();
    assert_eq!(via_text, doc);
}
