//! Corpus tests that parse all fixture stylesheets to ensure no panics
//! and that valid fixtures produce no errors.

use fontface_css::{parse, walk, Node, Rule, Walk};
use std::fs;
use std::path::{Path, PathBuf};

fn get_fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("test-fixtures")
}

fn collect_css_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "css") {
                files.push(path);
            } else if path.is_dir() {
                files.extend(collect_css_files(&path));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn test_parse_all_valid_fixtures() {
    let files = collect_css_files(&get_fixtures_dir().join("valid"));
    assert!(!files.is_empty(), "No valid fixtures found");

    for path in &files {
        let source = fs::read_to_string(path).unwrap();
        let result = parse(&source);
        assert!(
            result.errors.is_empty(),
            "{} produced errors: {:?}",
            path.display(),
            result.errors
        );
    }
}

#[test]
fn test_parse_all_invalid_fixtures() {
    let files = collect_css_files(&get_fixtures_dir().join("invalid"));
    assert!(!files.is_empty(), "No invalid fixtures found");

    for path in &files {
        let source = fs::read_to_string(path).unwrap();
        let result = parse(&source);
        assert!(
            !result.errors.is_empty(),
            "{} parsed without errors",
            path.display()
        );
        for error in &result.errors {
            assert!(
                usize::from(error.span.end) <= source.len(),
                "{}: error span {:?} is out of bounds",
                path.display(),
                error.span
            );
        }
    }
}

#[test]
fn test_google_fonts_shape() {
    let source = fs::read_to_string(get_fixtures_dir().join("valid/google-fonts-inter.css")).unwrap();
    let sheet = parse(&source).into_result().unwrap();

    assert_eq!(sheet.rules.len(), 3);
    for rule in &sheet.rules {
        let Rule::At(rule) = rule else {
            panic!("expected only at-rules");
        };
        assert_eq!(rule.name, "font-face");
    }

    let mut ranges = Vec::new();
    walk(&sheet, |node| {
        if let Node::Component(fontface_css::ValueNode::UnicodeRange(range)) = node {
            ranges.push(range.value.to_string());
        }
        Ok::<_, ()>(Walk::Continue)
    })
    .unwrap();
    assert_eq!(ranges.len(), 32);
    assert_eq!(ranges.first().map(String::as_str), Some("U+0460-052F"));
    assert_eq!(ranges.last().map(String::as_str), Some("U+FFFD"));
}

#[test]
fn test_byte_order_mark_fixture_spans() {
    let source = fs::read_to_string(get_fixtures_dir().join("valid/byte-order-mark.css")).unwrap();
    let result = parse(&source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let Rule::At(rule) = &result.stylesheet.rules[0] else {
        panic!("expected @font-face first");
    };
    assert_eq!(rule.name, "font-face");
    assert!(rule.span.text(&source).starts_with("@font-face {"));
}

#[test]
fn test_spans_slice_the_source() {
    let files = collect_css_files(&get_fixtures_dir().join("valid"));
    for path in &files {
        let source = fs::read_to_string(path).unwrap();
        let sheet = parse(&source).stylesheet;
        walk(&sheet, |node| {
            let span = node.span();
            assert!(span.start <= span.end);
            assert!(source.get(span.to_range()).is_some(), "{}: {span:?}", path.display());
            Ok::<_, ()>(Walk::Continue)
        })
        .unwrap();
    }
}

#[test]
fn test_garbage_does_not_panic() {
    for source in [
        "}}}}",
        "{{{{",
        "@",
        "@font-face",
        "@font-face {",
        "a { b: (; }",
        "a { b: url(; }",
        "'",
        "/*",
        "u+",
        "@font-face { unicode-range: U+; }",
        "a { --x: { ] }",
        "\u{0}\u{feff}",
    ] {
        let _ = parse(source);
    }
}
