use super::*;
use std::env;
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

// The file tests change the process cwd; serialize them.
static CWD_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn defaults_match_the_documented_values() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 4000);
    assert_eq!(settings.broker.ring_buffer_size, 100);
    assert_eq!(settings.broker.subscriber_queue_size, 512);
    assert_eq!(settings.broker.heartbeat_interval_ms, 30_000);
}

#[test]
fn load_config_from_file_overrides_defaults() {
    // Run load_config from a temp cwd so it picks up config/default.toml
    // written there.
    let _guard = CWD_LOCK.lock().unwrap();
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 4100

        [broker]
        ring_buffer_size = 16
        subscriber_queue_size = 32
        heartbeat_interval_ms = 1000
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config().expect("load_config failed");
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 4100);
    assert_eq!(cfg.broker.ring_buffer_size, 16);
    assert_eq!(cfg.broker.subscriber_queue_size, 32);
    assert_eq!(cfg.broker.heartbeat_interval_ms, 1000);

    env::set_current_dir(orig).expect("restore cwd");
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let _guard = CWD_LOCK.lock().unwrap();
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    fs::write("config/default.toml", "[server]\nport = 5000\n").expect("write config file");

    let cfg = load_config().expect("load_config failed");
    assert_eq!(cfg.server.port, 5000);
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.broker.subscriber_queue_size, 512);

    env::set_current_dir(orig).expect("restore cwd");
}
