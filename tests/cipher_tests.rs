//! Tests for the envelope-encryption engine.

mod support;

use std::collections::HashSet;

use coffer::core::cipher::{CipherEngine, MasterKey};
use coffer::error::ErrorKind;
use proptest::prelude::*;

#[test]
fn test_roundtrip() {
    let engine = support::engine();
    let encrypted = engine.encrypt("postgres://localhost/app", "project-1").unwrap();
    let decrypted = engine.decrypt(&encrypted, "project-1").unwrap();
    assert_eq!(decrypted.as_str(), "postgres://localhost/app");
}

#[test]
fn test_key_isolation_between_projects() {
    let engine = support::engine();
    let encrypted = engine.encrypt("shared plaintext", "project-1").unwrap();

    let err = engine.decrypt(&encrypted, "project-2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn test_key_isolation_between_master_keys() {
    let encrypted = support::engine().encrypt("secret", "project-1").unwrap();
    let err = support::other_engine()
        .decrypt(&encrypted, "project-1")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn test_iv_freshness_across_many_calls() {
    let engine = support::engine();
    let mut seen = HashSet::new();
    for _ in 0..1000 {
        let encrypted = engine.encrypt("identical plaintext", "project-1").unwrap();
        assert!(seen.insert(encrypted.iv), "IV reused across encrypt calls");
    }
}

#[test]
fn test_master_key_must_be_64_hex_chars() {
    assert!(CipherEngine::from_hex("").is_err());
    assert!(CipherEngine::from_hex("abcd").is_err());
    assert!(CipherEngine::from_hex(&"ab".repeat(33)).is_err());
    assert!(CipherEngine::from_hex(&"xy".repeat(32)).is_err());
    assert!(CipherEngine::from_hex(&"ab".repeat(32)).is_ok());
}

#[test]
fn test_engine_accepts_raw_key_material() {
    let engine = CipherEngine::new(MasterKey::from_bytes([9u8; 32]));
    let encrypted = engine.encrypt("value", "p").unwrap();
    assert_eq!(engine.decrypt(&encrypted, "p").unwrap().as_str(), "value");
}

proptest! {
    #[test]
    fn prop_roundtrip_any_plaintext(plaintext in ".*", project in "[a-z0-9-]{1,32}") {
        let engine = support::engine();
        let encrypted = engine.encrypt(&plaintext, &project).unwrap();
        let decrypted = engine.decrypt(&encrypted, &project).unwrap();
        prop_assert_eq!(decrypted.as_str(), plaintext.as_str());
    }

    #[test]
    fn prop_distinct_projects_never_decrypt(
        plaintext in ".*",
        a in "[a-z0-9-]{1,16}",
        b in "[a-z0-9-]{1,16}",
    ) {
        prop_assume!(a != b);
        let engine = support::engine();
        let encrypted = engine.encrypt(&plaintext, &a).unwrap();
        prop_assert!(engine.decrypt(&encrypted, &b).is_err());
    }
}
