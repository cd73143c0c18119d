use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_typeahead_defaults() {
    let settings = Settings::default();
    let config = settings.typeahead(TypeaheadConfig::for_ports());
    let defaults = TypeaheadConfig::default();

    assert_eq!(config.debounce, defaults.debounce);
    assert_eq!(config.timeout, defaults.timeout);
    assert_eq!(config.result_limit, defaults.result_limit);
}

#[test]
fn file_values_apply_and_bad_numbers_are_ignored() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
api_url = "https://schedules.example.com"
search_debounce_ms = "400"
search_timeout_ms = "soon"
state_path = "/tmp/filters.json"
"#,
    );

    assert_eq!(settings.api_url, "https://schedules.example.com");
    assert_eq!(settings.search_debounce_ms, 400);
    assert_eq!(settings.search_timeout_ms, 6000);
    assert_eq!(settings.state_path, Some(PathBuf::from("/tmp/filters.json")));
}

#[test]
fn unparseable_file_is_skipped() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "api_url = [");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env(&[
            ("SCHEDULES_API_URL", "http://plain:8000"),
            ("APP__API_URL", "http://prefixed:8000"),
            ("APP__SUGGESTION_LIMIT", "20"),
            ("APP__SEARCH_TIMEOUT_MS", "-1"),
        ]),
    );

    assert_eq!(settings.api_url, "http://prefixed:8000");
    assert_eq!(settings.suggestion_limit, 20);
    assert_eq!(settings.search_timeout_ms, 6000);
}

#[test]
fn cli_override_beats_settings() {
    let settings = Settings::default();
    let url = settings
        .api_url(Some("https://override.example.com/"))
        .expect("valid url");
    assert_eq!(url.host_str(), Some("override.example.com"));
}

#[test]
fn non_http_urls_are_rejected() {
    let settings = Settings {
        api_url: "ftp://files.example.com".into(),
        ..Settings::default()
    };
    assert!(settings.api_url(None).is_err());
    assert!(settings.api_url(Some("not a url")).is_err());
}

#[test]
fn zero_limit_is_raised_to_one() {
    let settings = Settings {
        suggestion_limit: 0,
        ..Settings::default()
    };
    assert_eq!(settings.typeahead(TypeaheadConfig::for_carriers()).result_limit, 1);
}
