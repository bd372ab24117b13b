use xchain_swap::chain::url_wrapper::{SafeUrl, SafeUrlError};

const KEYED: &str = "https://bsc-testnet.nodereal.io/v1/{}";

#[test]
fn test_keyed_endpoint_is_redacted() {
    let url = SafeUrl::new(KEYED, "secret123").unwrap();
    assert_eq!(url.redacted(), "https://bsc-testnet.nodereal.io/v1/****");
    assert_eq!(format!("{}", url), url.redacted());

    let debug = format!("{:?}", url);
    assert!(debug.contains("SafeUrl"));
    assert!(!debug.contains("secret123"));
}

#[test]
fn test_keyed_endpoint_as_url() {
    let url = SafeUrl::new(KEYED, "secret123").unwrap();
    assert_eq!(url.as_url().unwrap().as_str(), "https://bsc-testnet.nodereal.io/v1/secret123");
}

#[test]
fn test_placeholder_count_enforced() {
    assert!(matches!(
        SafeUrl::new("https://rpc.example.com/{}/{}", "k"),
        Err(SafeUrlError::InvalidPlaceholderCount(2))
    ));
    assert!(matches!(
        SafeUrl::new("https://rpc.example.com/", "k"),
        Err(SafeUrlError::InvalidPlaceholderCount(0))
    ));
}

#[test]
fn test_invalid_url() {
    assert!(matches!(SafeUrl::new("not a url {}", "k"), Err(SafeUrlError::InvalidUrl(_))));
    assert!(matches!(SafeUrl::public("174.138.18.77:8545"), Err(SafeUrlError::InvalidUrl(_))));
}

#[test]
fn test_public_endpoint_shown_as_is() {
    let url = SafeUrl::public("https://data-seed-prebsc-1-s1.binance.org:8545/").unwrap();
    assert_eq!(url.redacted(), "https://data-seed-prebsc-1-s1.binance.org:8545/");
    assert_eq!(url.as_url().unwrap().port(), Some(8545));
    assert!(!format!("{:?}", url).contains("****"));
}

#[test]
fn test_public_endpoint_is_normalized() {
    let url = SafeUrl::public("http://174.138.18.77:8545").unwrap();
    assert_eq!(url.to_string(), "http://174.138.18.77:8545/");
}
