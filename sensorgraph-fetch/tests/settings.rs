use reading::Field;
use sensorgraph_core::ReadingSource;
use sensorgraph_fetch::settings::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use sensorgraph_fetch::SourceSettings;
use std::path::PathBuf;

#[test]
fn default_is_listing_source() {
    let settings = SourceSettings::default();
    assert_eq!(settings.kind(), "listing");
    assert_eq!(settings.fields(), &[Field::Temperature, Field::Light]);
    match settings {
        SourceSettings::Listing {
            base_url,
            key_prefix,
            timeout_secs,
            ..
        } => {
            assert_eq!(base_url, DEFAULT_BASE_URL);
            assert_eq!(key_prefix, "environment");
            assert_eq!(timeout_secs, DEFAULT_TIMEOUT_SECS);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn listing_fills_optional_values() {
    let settings: SourceSettings = toml::from_str(
        r#"
kind = "listing"
base_url = "https://bucket.example"
workers = 2
"#,
    )
    .expect("parse");
    match settings {
        SourceSettings::Listing {
            base_url,
            max_keys,
            workers,
            ..
        } => {
            assert_eq!(base_url, "https://bucket.example");
            assert_eq!(max_keys, 1000);
            assert_eq!(workers, 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn rest_and_files_kinds_parse() {
    let rest: SourceSettings =
        toml::from_str("kind = \"rest\"\nurl = \"http://api\"\nfields = [\"pressure\"]").unwrap();
    assert_eq!(rest.kind(), "rest");
    assert_eq!(rest.fields(), &[Field::Pressure]);

    let files: SourceSettings =
        toml::from_str("kind = \"files\"\npaths = [\"a.jsonl\", \"dir\"]").unwrap();
    assert_eq!(
        files,
        SourceSettings::Files {
            paths: vec![PathBuf::from("a.jsonl"), PathBuf::from("dir")],
            fields: Field::ALL.to_vec(),
        }
    );
}

#[test]
fn unknown_kind_is_rejected() {
    assert!(toml::from_str::<SourceSettings>("kind = \"ftp\"").is_err());
    assert!(toml::from_str::<SourceSettings>("kind = \"rest\"").is_err());
}

#[test]
fn build_reports_configured_fields() {
    let settings = SourceSettings::Files {
        paths: Vec::new(),
        fields: vec![Field::Light],
    };
    assert_eq!(settings.build().fields(), &[Field::Light]);
}
