//! Additional tests for the CLI module and the string-parsed option types

use chataudit::cli::{Args, OutputFormat};
use chataudit::core::{UrlCategory, UrlRule};
use chataudit::core::classifier::MatchTarget;
use chataudit::markup::Encoding;
use chataudit::parser::Layout;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tempfile::NamedTempFile;

#[test]
fn test_layout_from_str_all_variants() {
    // Standard names
    assert_eq!(Layout::from_str("purview").unwrap(), Layout::Purview);
    assert_eq!(Layout::from_str("table").unwrap(), Layout::Table);
    assert_eq!(Layout::from_str("card").unwrap(), Layout::Card);
    assert_eq!(Layout::from_str("generic").unwrap(), Layout::Generic);

    // Aliases and case variations
    assert_eq!(Layout::from_str("DIV").unwrap(), Layout::Purview);
    assert_eq!(Layout::from_str("Rows").unwrap(), Layout::Table);
    assert_eq!(Layout::from_str("CARDS").unwrap(), Layout::Card);
    assert_eq!(Layout::from_str("fallback").unwrap(), Layout::Generic);
}

#[test]
fn test_layout_from_str_errors() {
    assert!(Layout::from_str("").is_err());
    assert!(Layout::from_str("slack").is_err());
}

#[test]
fn test_encoding_from_str() {
    assert_eq!(Encoding::from_str("UTF-8").unwrap(), Encoding::Utf8);
    assert_eq!(Encoding::from_str("cp1252").unwrap(), Encoding::Windows1252);
    assert_eq!(Encoding::from_str("latin1").unwrap(), Encoding::Latin1);
    assert!(Encoding::from_str("ebcdic").is_err());
}

#[test]
fn test_url_category_from_str() {
    assert_eq!(UrlCategory::from_str("SharePoint").unwrap(), UrlCategory::SharePoint);
    assert_eq!(UrlCategory::from_str("teams-meeting").unwrap(), UrlCategory::TeamsMeeting);
    assert_eq!(UrlCategory::from_str("Organizational Email").unwrap(), UrlCategory::OrganizationalEmail);
    assert!(UrlCategory::from_str("intranet").is_err());
}

#[test]
fn test_url_rule_from_str() {
    let host_rule = UrlRule::from_str("Wiki.Contoso.com=sharepoint").unwrap();
    assert_eq!(host_rule.pattern, "wiki.contoso.com");
    assert_eq!(host_rule.target, MatchTarget::Host);

    let url_rule = UrlRule::from_str("contoso.com/meet=teams").unwrap();
    assert_eq!(url_rule.target, MatchTarget::Url);
    assert_eq!(url_rule.category, UrlCategory::TeamsMeeting);

    assert!(UrlRule::from_str("=web").is_err());
    assert!(UrlRule::from_str("no-category").is_err());
    assert!(UrlRule::from_str("x.example=unknown").is_err());
}

#[test]
fn test_output_format_extension_and_display() {
    assert_eq!(OutputFormat::Csv.extension(), "csv");
    assert_eq!(OutputFormat::Json.extension(), "json");
    assert_eq!(OutputFormat::Jsonl.extension(), "jsonl");
    assert_eq!(OutputFormat::Jsonl.to_string(), "JSONL");
    assert_eq!(OutputFormat::default(), OutputFormat::Csv);
}

#[test]
fn test_output_format_library_roundtrip() {
    for format in [OutputFormat::Csv, OutputFormat::Json, OutputFormat::Jsonl] {
        let lib: chataudit::format::OutputFormat = format.into();
        assert_eq!(OutputFormat::from(lib), format);
    }
}

#[test]
fn test_ndjson_alias() {
    let args = Args::parse_from(["chataudit", "in.html", "-f", "ndjson"]);
    assert_eq!(args.resolved_format(), OutputFormat::Jsonl);
}

#[test]
fn test_config_file_then_flags() {
    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"{{"gap_threshold_secs": 120, "layout": "card", "max_sender_len": 40}}"#
    )
    .unwrap();

    let args = Args::parse_from([
        "chataudit",
        "in.html",
        "--config",
        config_file.path().to_str().unwrap(),
        "--gap-threshold",
        "30",
    ]);
    let config = args.pipeline_config().unwrap();
    assert_eq!(config.gap_threshold_secs, Some(30));
    assert_eq!(config.layout, Some(Layout::Card));
    assert_eq!(config.max_sender_len, 40);
}

#[test]
fn test_bad_config_file_is_json_error() {
    let mut config_file = NamedTempFile::new().unwrap();
    write!(config_file, "{{ not json").unwrap();

    let args = Args::parse_from(["chataudit", "in.html", "--config", config_file.path().to_str().unwrap()]);
    let err = args.pipeline_config().unwrap_err();
    assert!(err.to_string().contains("JSON"));
}

#[test]
fn test_resolved_output_keeps_directory() {
    let args = Args::parse_from(["chataudit", "/data/exports/march.html", "-f", "json"]);
    assert_eq!(args.resolved_output(), PathBuf::from("/data/exports/march_converted.json"));
}
