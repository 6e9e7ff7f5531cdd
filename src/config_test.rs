use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key: &str| map.get(key).cloned()
}

fn required() -> Vec<(&'static str, &'static str)> {
    vec![
        ("SUPABASE_URL", "https://abc.supabase.co"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("GOOGLE_CLIENT_ID", "cid"),
        ("GOOGLE_CLIENT_SECRET", "secret"),
    ]
}

// =============================================================================
// Config::from_lookup
// =============================================================================

#[test]
fn from_lookup_all_required_uses_defaults() {
    let cfg = Config::from_lookup(lookup_from(&required())).unwrap();
    assert_eq!(cfg.backend_url, "https://abc.supabase.co");
    assert_eq!(cfg.backend_key, "anon");
    assert_eq!(cfg.google_client_id, "cid");
    assert_eq!(cfg.google_client_secret, "secret");
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(!cfg.revoke_on_logout);
    assert!(!cfg.verify_claims);
    assert!(!cfg.cookie_secure, "redirect target is plain http");
}

#[test]
fn from_lookup_parses_optional_overrides() {
    let mut pairs = required();
    pairs.extend([
        ("PORT", "9000"),
        ("REVOKE_ON_LOGOUT", "yes"),
        ("VERIFY_ID_TOKEN_CLAIMS", "1"),
        ("COOKIE_SECURE", "on"),
    ]);
    let cfg = Config::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(cfg.port, 9000);
    assert!(cfg.revoke_on_logout);
    assert!(cfg.verify_claims);
    assert!(cfg.cookie_secure);
}

#[test]
fn from_lookup_reports_every_missing_variable() {
    let err = Config::from_lookup(lookup_from(&[("SUPABASE_URL", "https://x")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing(vec!["SUPABASE_ANON_KEY", "GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"]));
    assert!(err.to_string().contains("GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET"));
}

#[test]
fn from_lookup_treats_empty_as_missing() {
    let mut pairs = required();
    pairs[3] = ("GOOGLE_CLIENT_SECRET", "  ");
    let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert_eq!(err, ConfigError::Missing(vec!["GOOGLE_CLIENT_SECRET"]));
}

#[test]
fn from_lookup_nothing_set() {
    let err = Config::from_lookup(|_| None).unwrap_err();
    assert_eq!(err, ConfigError::Missing(REQUIRED_VARS.to_vec()));
}

#[test]
fn from_lookup_rejects_bad_port() {
    let mut pairs = required();
    pairs.push(("PORT", "eighty"));
    let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert_eq!(err, ConfigError::Port("eighty".into()));
}

#[test]
fn from_lookup_ignores_unparsable_flag() {
    let mut pairs = required();
    pairs.push(("REVOKE_ON_LOGOUT", "maybe"));
    assert!(!Config::from_lookup(lookup_from(&pairs)).unwrap().revoke_on_logout);
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_variants() {
    for val in ["1", "true", "YES", " On "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
    for val in ["0", "False", "no", "off"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
    assert_eq!(parse_bool(""), None);
    assert_eq!(parse_bool("maybe"), None);
}
