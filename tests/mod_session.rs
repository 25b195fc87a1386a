use std::io::Write;

use tabport::{
    CsvConfig, ImportSession, ImporterRegistry, ImportSource, SourceDescriptor,
};

fn temp_file_with(ext: &str, data: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(&format!(".{ext}")).tempfile().unwrap();
    f.write_all(data).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn registry_builds_a_csv_session_from_a_path() {
    let f = temp_file_with("csv", b"id,name,tweet_text,created_at\n1,alice,hello,2023-01-01\n");
    let reg = ImporterRegistry::with_default_handlers();
    let session = reg
        .open(ImportSource::from_path(f.path()), &SourceDescriptor::for_path(f.path()))
        .unwrap();
    assert_eq!(session.format_name(), "csv");
    let t = session.preview(10).unwrap();
    assert_eq!(t.columns, vec!["id", "name", "tweet_text", "created_at"]);
    assert_eq!(t.rows.len(), 1);
}

#[test]
fn preamble_file_previews_from_the_detected_header() {
    let data = b"Downloaded from the archive portal\nAll rows are unverified\nid,name,tweet_text,created_at\n1,alice,hello,2023-01-01\n2,bob,hi,2023-01-02\n";
    let f = temp_file_with("csv", data);
    let reg = ImporterRegistry::with_default_handlers();
    let session = reg
        .open(ImportSource::from_path(f.path()), &SourceDescriptor::for_path(f.path()))
        .unwrap();
    let t = session.preview(10).unwrap();
    assert_eq!(t.columns[0], "id");
    assert_eq!(t.rows.len(), 2);
}

#[test]
fn semicolon_file_detects_its_dialect() {
    let f = temp_file_with("csv", b"id;name;date\n1;a;2020-01-01\n");
    let session = ImportSession::Csv(tabport::CsvSession::new(ImportSource::from_path(f.path())));
    let t = session.preview(10).unwrap();
    assert_eq!(t.columns, vec!["id", "name", "date"]);
    assert_eq!(t.rows, vec![vec!["1", "a", "2020-01-01"]]);
}

#[test]
fn edited_configuration_rebuilds_without_touching_the_original() {
    let f = temp_file_with("csv", b"preamble text here\nid,name\n1,a\n");
    let original = tabport::CsvSession::new(ImportSource::from_path(f.path()));
    assert_eq!(original.config().skip_rows, 1);

    let edited = original.with_config(CsvConfig { skip_rows: 0, ..original.config().clone() });
    assert_eq!(original.config().skip_rows, 1);
    // With skip disabled, the preamble line becomes the header row.
    let t = edited.preview(10).unwrap();
    assert_eq!(t.columns.len(), 1);
}

#[test]
fn degraded_detection_is_reported_not_raised() {
    let session = tabport::CsvSession::new(ImportSource::from_bytes(Vec::new()));
    assert!(session.detection_degraded());
    assert_eq!(session.config(), &CsvConfig::default());
}

#[test]
fn json_routes_and_previews() {
    let f = temp_file_with("jsonl", b"{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"name\":\"b\"}\n");
    let reg = ImporterRegistry::with_default_handlers();
    let session = reg
        .open(ImportSource::from_path(f.path()), &SourceDescriptor::for_path(f.path()))
        .unwrap();
    assert_eq!(session.format_name(), "json");
    let t = session.preview(10).unwrap();
    assert_eq!(t.columns, vec!["id", "name"]);
    assert_eq!(t.rows.len(), 2);
}

#[test]
fn describe_is_ordered_and_complete() {
    let session = tabport::CsvSession::new(ImportSource::from_bytes(b"id,name\n1,a\n".to_vec()));
    let d = session.describe();
    let labels: Vec<&str> = d.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(labels, vec!["format", "source", "skip rows", "delimiter", "quote", "header row"]);
}

#[test]
fn unsupported_extension_surfaces_unsupported_format() {
    let reg = ImporterRegistry::with_default_handlers();
    let err = reg
        .open(ImportSource::from_bytes(Vec::new()), &SourceDescriptor::for_path("x.parquet"))
        .unwrap_err();
    assert!(matches!(err, tabport::ImportError::UnsupportedFormat(_)));
}
