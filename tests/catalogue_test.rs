use altotext::batch::write_metadata;
use altotext::catalogue::{clean, parse_search_response, DateCertainty};
use std::fs;
use std::path::Path;

fn fixture(name: &str) -> String {
    fs::read_to_string(Path::new("tests/fixtures").join(name)).unwrap()
}

#[test]
fn test_full_record_is_cleaned() {
    let response = parse_search_response(&fixture("sru_found.xml")).unwrap();
    assert!(response.is_match());
    let record = response.into_record().unwrap();
    let data = clean(Some(&record));

    assert!(data.found);
    assert_eq!(
        data.ptr.as_deref(),
        Some("http://archivesetmanuscrits.bnf.fr/ark:/12148/cc77895z")
    );
    assert_eq!(data.title.as_deref(), Some("Livre des propriétés des choses"));
    assert_eq!(data.objectdesc.as_deref(), Some("Manuscrit"));
    assert_eq!(data.lang.as_deref(), Some("fre"));
    assert_eq!(data.pubplace_key.as_deref(), Some("FR"));
    assert_eq!(data.pubplace.as_deref(), Some("Paris"));
    assert_eq!(data.publisher.as_deref(), Some("Charles V"));
    assert_eq!(data.country.as_deref(), Some("FR"));
    assert_eq!(data.idno.as_deref(), Some("Français 16993"));

    assert_eq!(data.date.as_deref(), Some("1372"));
    assert_eq!(data.when.as_deref(), Some("1372"));
    assert_eq!(data.date_cert, Some(DateCertainty::High));
    assert_eq!(data.date_resp.as_deref(), Some("BNF"));
}

#[test]
fn test_authors_are_numbered_across_fields() {
    let record = parse_search_response(&fixture("sru_found.xml"))
        .unwrap()
        .into_record()
        .unwrap();
    let authors = clean(Some(&record)).authors.unwrap();

    assert_eq!(authors.len(), 3);

    assert_eq!(authors[0].xmlid, "Ba1");
    assert_eq!(authors[0].isni.as_deref(), Some("0000000121344736"));
    assert_eq!(authors[0].primary_name.as_deref(), Some("Barthélemy"));
    assert_eq!(authors[0].secondary_name.as_deref(), Some("l'Anglais"));
    assert_eq!(authors[0].namelink, None);

    assert_eq!(authors[1].xmlid, "Co2");
    assert_eq!(authors[1].namelink.as_deref(), Some("de"));
    assert_eq!(authors[1].secondary_name.as_deref(), Some("Jean"));
    assert_eq!(authors[1].isni, None);

    // A responsibility field with a role code only
    assert_eq!(authors[2].xmlid, "au3");
    assert_eq!(authors[2].primary_name, None);
    assert_eq!(authors[2].secondary_name, None);
}

#[test]
fn test_record_without_imprint() {
    let record = parse_search_response(&fixture("sru_no_210.xml"))
        .unwrap()
        .into_record()
        .unwrap();
    let data = clean(Some(&record));

    assert_eq!(data.title.as_deref(), Some("Chroniques"));
    assert_eq!(data.pubplace, None);
    assert_eq!(data.publisher, None);
    assert_eq!(data.lang, None);
    assert_eq!(data.date.as_deref(), Some("1480"));
    assert_eq!(data.date_cert, Some(DateCertainty::Medium));

    let authors = data.authors.unwrap();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].xmlid, "Ma1");
    assert_eq!(authors[0].namelink.as_deref(), Some("de la"));
    assert_eq!(authors[0].secondary_name.as_deref(), Some("Marie"));
}

#[test]
fn test_not_found_response() {
    let response = parse_search_response(&fixture("sru_not_found.xml")).unwrap();
    assert!(!response.is_match());
    assert_eq!(response.number_of_records, 0);

    let data = clean(response.into_record().as_ref());
    assert!(!data.found);
    assert_eq!(data.authors, None);
    assert_eq!(data.title, None);
    assert_eq!(data.date, None);
}

#[test]
fn test_garbage_response_is_an_error() {
    assert!(parse_search_response("<html><body>maintenance</body></html>").is_err());
}

#[test]
fn test_metadata_is_written_next_to_the_directory() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("btv1b84");
    fs::create_dir(&dir).unwrap();

    let record = parse_search_response(&fixture("sru_found.xml"))
        .unwrap()
        .into_record()
        .unwrap();
    let path = write_metadata(&dir, &clean(Some(&record))).unwrap();
    assert_eq!(path, root.path().join("btv1b84.metadata.json"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["found"], true);
    assert_eq!(json["date_cert"], "high");
    assert_eq!(json["authors"][1]["namelink"], "de");
    assert_eq!(json["pubplace"], "Paris");
}
