use super::*;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = PaletteConfig::default();
    assert!(!config.debug);
    assert_eq!(config.search.max_tabs, DEFAULT_MAX_TABS);
    assert_eq!(config.search.max_failures, DEFAULT_MAX_FAILURES);
    assert_eq!(config.search.max_matches_per_tab, DEFAULT_MAX_MATCHES_PER_TAB);
    assert_eq!(config.search.context_radius, DEFAULT_CONTEXT_RADIUS);
    assert_eq!(config.search.min_query_len, DEFAULT_MIN_QUERY_LEN);
    assert_eq!(config.filter.large_tab_threshold, DEFAULT_LARGE_TAB_THRESHOLD);
    assert_eq!(config.filter.unfiltered_cap, DEFAULT_UNFILTERED_CAP);
    assert_eq!(config.filter.filtered_cap, DEFAULT_FILTERED_CAP);
    assert_eq!(config.execute.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
    assert_eq!(
        config.execute.highlight_duration_ms,
        DEFAULT_HIGHLIGHT_DURATION_MS
    );
    assert_eq!(
        config.system_url_prefixes.len(),
        DEFAULT_SYSTEM_URL_PREFIXES.len()
    );
}

#[test]
fn test_default_values_match_documented_limits() {
    assert_eq!(DEFAULT_MAX_TABS, 20);
    assert_eq!(DEFAULT_MAX_FAILURES, 5);
    assert_eq!(DEFAULT_MAX_MATCHES_PER_TAB, 3);
    assert_eq!(DEFAULT_CONTEXT_RADIUS, 40);
    assert_eq!(DEFAULT_LARGE_TAB_THRESHOLD, 50);
    assert_eq!(DEFAULT_UNFILTERED_CAP, 10);
    assert_eq!(DEFAULT_FILTERED_CAP, 20);
    assert_eq!(
        ExecuteConfig::default().settle_delay(),
        Duration::from_millis(500)
    );
    assert_eq!(
        ExecuteConfig::default().highlight_duration(),
        Duration::from_secs(10)
    );
}

#[test]
fn test_empty_object_is_default() {
    let config = parse_config("{}").unwrap();
    assert_eq!(config, PaletteConfig::default());
}

#[test]
fn test_partial_config_keeps_other_defaults() {
    let json = r#"{
        "debug": true,
        "search": {"maxTabs": 5},
        "execute": {"settleDelayMs": 250}
    }"#;
    let config = parse_config(json).unwrap();
    assert!(config.debug);
    assert_eq!(config.search.max_tabs, 5);
    assert_eq!(config.search.max_failures, DEFAULT_MAX_FAILURES);
    assert_eq!(config.execute.settle_delay_ms, 250);
    assert_eq!(
        config.execute.highlight_duration_ms,
        DEFAULT_HIGHLIGHT_DURATION_MS
    );
    assert_eq!(config.filter, FilterConfig::default());
}

#[test]
fn test_unknown_fields_are_ignored() {
    let config = parse_config(r#"{"theme": "dark", "filter": {"color": 1}}"#).unwrap();
    assert_eq!(config, PaletteConfig::default());
}

#[test]
fn test_custom_system_prefixes_replace_defaults() {
    let config = parse_config(r#"{"systemUrlPrefixes": ["file://"]}"#).unwrap();
    assert_eq!(config.system_url_prefixes, vec!["file://".to_string()]);
}

#[test]
fn test_config_serialization_roundtrip_uses_camel_case() {
    let config = PaletteConfig::default().with_debug(true);
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"maxMatchesPerTab\":3"));
    assert!(json.contains("\"systemUrlPrefixes\""));
    let back: PaletteConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_invalid_json_is_config_error() {
    let err = parse_config("{not json").unwrap_err();
    assert!(matches!(err, crate::error::PaletteError::Config(_)));
    assert!(err.to_string().contains("single JSON object"));

    let err = parse_config(r#"{"search": {"maxTabs": "many"}}"#).unwrap_err();
    assert!(err.to_string().contains("field names"));
}

#[test]
fn test_zero_limits_are_rejected() {
    assert!(parse_config(r#"{"search": {"maxTabs": 0}}"#).is_err());
    assert!(parse_config(r#"{"search": {"minQueryLen": 0}}"#).is_err());
}

#[test]
fn test_load_config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.json");
    let config = load_config(path.to_str().unwrap());
    assert_eq!(config, PaletteConfig::default());
}

#[test]
fn test_load_config_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"debug": true, "filter": {{"filteredCap": 7}}}}"#).unwrap();
    let config = load_config(file.path().to_str().unwrap());
    assert!(config.debug);
    assert_eq!(config.filter.filtered_cap, 7);
}

#[test]
fn test_load_config_invalid_file_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[1, 2, 3]").unwrap();
    let config = load_config(file.path().to_str().unwrap());
    assert_eq!(config, PaletteConfig::default());
}
