use std::collections::HashMap;
use std::fs::{remove_file, write};
use memsim::config::SimConfig;

#[test]
fn test_defaults() {
    let c = SimConfig::default();
    assert_eq!(c.total_size, 1024);
    assert_eq!(c.frames, 4);
    assert_eq!(c.addr.to_string(), "127.0.0.1:3000");
    assert!(c.validate().is_ok());
}

#[test]
fn test_file_with_partial_fields() {
    let path = std::env::temp_dir().join("memsim_config_test.json");
    write(&path, r#"{ "total_size": 512 }"#).unwrap();
    let c = SimConfig::from_file(&path).unwrap();
    assert_eq!(c.total_size, 512);
    assert_eq!(c.frames, 4);
    remove_file(&path).unwrap();
}

#[test]
fn test_zero_frames_rejected() {
    let path = std::env::temp_dir().join("memsim_config_zero.json");
    write(&path, r#"{ "frames": 0 }"#).unwrap();
    assert!(SimConfig::from_file(&path).is_err());
    remove_file(&path).unwrap();
}

#[test]
fn test_overrides() {
    let vars: HashMap<&str, &str> = [("MEMSIM_FRAMES", "3"), ("MEMSIM_ADDR", "0.0.0.0:8080")]
        .into_iter()
        .collect();
    let c = SimConfig::default()
        .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(c.frames, 3);
    assert_eq!(c.total_size, 1024);
    assert_eq!(c.addr.port(), 8080);

    let bad = SimConfig::default().apply_overrides(|k| {
        (k == "MEMSIM_TOTAL_SIZE").then(|| "lots".to_string())
    });
    assert!(bad.is_err());
}
