use pretty_assertions::assert_eq;
use std::time::Duration;

use shelfmark::{config::Config, lookup::Endpoints};

#[test]
fn defaults_point_at_the_public_services() {
    let config = Config::default();
    assert_eq!(config.endpoints(), Endpoints::default());
    assert_eq!(config.lookup_timeout(), Duration::from_secs(8));
    assert_eq!(config.server_port, 3000);
    assert_eq!(config.server_address, None);
}

#[test]
fn endpoint_trailing_slashes_are_dropped() {
    let config = Config {
        open_library_url: "http://127.0.0.1:8080/".into(),
        covers_url: "http://127.0.0.1:8081//".into(),
        ..Config::default()
    };
    let endpoints = config.endpoints();
    assert_eq!(endpoints.open_library, "http://127.0.0.1:8080");
    assert_eq!(endpoints.covers, "http://127.0.0.1:8081");
    assert_eq!(
        endpoints.open_library_isbn("9780141439518"),
        "http://127.0.0.1:8080/isbn/9780141439518.json"
    );
}

#[test]
fn absolute_data_path_is_kept() {
    let config = Config {
        data_file: "/tmp/books.json".into(),
        ..Config::default()
    };
    assert_eq!(config.data_path(), std::path::PathBuf::from("/tmp/books.json"));
}

#[test]
fn default_config_prints_as_toml() {
    let printed = Config::default_as_string().unwrap();
    assert!(printed.contains("server_port = 3000"));
    assert!(printed.contains("lookup_timeout_secs = 8"));
    assert!(printed.contains("[display.title]"));
    assert!(!printed.contains("server_address"));
}
