//! Resolver integration tests: urls file handling and ordering.

use std::fs;

use adtsync_core::{resolver, ResolveError};
use tempfile::TempDir;

const BASE: &str = "https://host:1234/sap/bc/adt";

#[test]
fn missing_urls_file_is_reported() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("urls.txt");
    let err = resolver::resolve_items(BASE, &[], Some(&path)).unwrap_err();
    assert!(matches!(err, ResolveError::UrlsFileNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("urls.txt"));
}

#[test]
fn missing_urls_file_wins_over_invalid_base() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("urls.txt");
    let err = resolver::resolve_items("nonsense", &[], Some(&path)).unwrap_err();
    assert!(matches!(err, ResolveError::UrlsFileNotFound { .. }), "got: {err}");
}

#[test]
fn urls_file_skips_comments_and_blanks() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("urls.txt");
    fs::write(
        &path,
        "# classes\n\n  /oo/classes/ZCL_FOO/source/main  \n#/oo/classes/ZCL_SKIP/source/main\r\n/ddic/tables/ZTAB/source/main\n",
    )
    .expect("write");

    let urls = resolver::read_urls_file(&path).expect("read");
    assert_eq!(
        urls,
        vec![
            "/oo/classes/ZCL_FOO/source/main".to_string(),
            "/ddic/tables/ZTAB/source/main".to_string(),
        ]
    );
}

#[test]
fn urls_file_with_invalid_utf8_is_read_lossily() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("urls.txt");
    fs::write(&path, b"/oo/classes/ZCL_\xff/source/main\n").expect("write");

    let urls = resolver::read_urls_file(&path).expect("read");
    assert_eq!(urls.len(), 1);
    assert!(urls[0].contains('\u{fffd}'));
}

#[test]
fn explicit_locators_come_before_file_entries() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("urls.txt");
    fs::write(
        &path,
        "/ddic/tables/ZTAB/source/main\n/programs/programs/Z_TEST1/source/main\n",
    )
    .expect("write");

    let items = resolver::resolve_items(
        BASE,
        &["/programs/programs/Z_TEST1/source/main".to_string()],
        Some(&path),
    )
    .expect("resolve");

    let labels: Vec<_> = items.iter().map(|i| i.label.to_string()).collect();
    assert_eq!(labels, vec!["Z_TEST1", "ZTAB"]);
    assert_eq!(
        items[0].url.as_str(),
        "https://host:1234/sap/bc/adt/programs/programs/Z_TEST1/source/main"
    );
}

#[test]
fn same_locator_always_yields_same_label() {
    let locators = vec!["/oo/classes/ZCL_FOO/source/main?version=inactive".to_string()];
    let a = resolver::resolve_items(BASE, &locators, None).expect("a");
    let b = resolver::resolve_items(BASE, &locators, None).expect("b");
    assert_eq!(a, b);
    assert_eq!(a[0].label.0, "ZCL_FOO");
}

#[test]
fn empty_input_yields_no_items() {
    let items = resolver::resolve_items(BASE, &[], None).expect("resolve");
    assert!(items.is_empty());
}
