//! RPC endpoint wrapper that keeps API keys out of logs.
//!
//! Endpoints are stored as a template with a `{}` placeholder plus the key, or as a
//! plain URL for public nodes. `Display` and `Debug` only ever show the redacted form.

use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum SafeUrlError {
    #[error("URL template must contain exactly one {{}} placeholder, found {0}")]
    InvalidPlaceholderCount(usize),

    #[error("Invalid URL after formatting: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A JSON-RPC endpoint whose API key never shows up in logs.
///
/// # Examples
/// ```
/// # use xchain_swap::chain::url_wrapper::SafeUrl;
/// let url = SafeUrl::new("https://bsc-testnet.example.com/v1/{}", "secret123")?;
/// assert_eq!(format!("{}", url), "https://bsc-testnet.example.com/v1/****");
/// assert_eq!(url.as_url()?.as_str(), "https://bsc-testnet.example.com/v1/secret123");
/// # Ok::<(), xchain_swap::chain::url_wrapper::SafeUrlError>(())
/// ```
#[derive(Clone)]
pub struct SafeUrl {
    url_template: String,
    /// `None` for endpoints that need no key
    api_key: Option<String>,
}

impl SafeUrl {
    /// Builds an endpoint from a template holding exactly one `{}` placeholder.
    pub fn new(url_template: &str, api_key: &str) -> Result<Self, SafeUrlError> {
        let placeholder_count = url_template.matches("{}").count();
        if placeholder_count != 1 {
            return Err(SafeUrlError::InvalidPlaceholderCount(placeholder_count));
        }
        url_template.replace("{}", api_key).parse::<Url>()?;

        Ok(Self {
            url_template: url_template.to_string(),
            api_key: Some(api_key.to_string()),
        })
    }

    /// Wraps an endpoint that carries no API key (e.g. a public testnet node).
    ///
    /// # Examples
    /// ```
    /// # use xchain_swap::chain::url_wrapper::SafeUrl;
    /// let url = SafeUrl::public("http://174.138.18.77:8545")?;
    /// assert_eq!(url.redacted(), "http://174.138.18.77:8545/");
    /// # Ok::<(), xchain_swap::chain::url_wrapper::SafeUrlError>(())
    /// ```
    pub fn public(url: &str) -> Result<Self, SafeUrlError> {
        let parsed = url.parse::<Url>()?;
        Ok(Self {
            url_template: parsed.to_string(),
            api_key: None,
        })
    }

    /// The full URL, key included. Only hand this to the transport.
    pub fn as_url(&self) -> Result<Url, SafeUrlError> {
        let formatted = match &self.api_key {
            Some(key) => self.url_template.replace("{}", key),
            None => self.url_template.clone(),
        };
        Ok(formatted.parse()?)
    }

    pub fn redacted(&self) -> String {
        match self.api_key {
            Some(_) => self.url_template.replace("{}", "****"),
            None => self.url_template.clone(),
        }
    }
}

impl std::fmt::Display for SafeUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl std::fmt::Debug for SafeUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeUrl")
            .field("url", &self.redacted())
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .finish()
    }
}

/// RPC endpoints are always held as `SafeUrl`.
pub type RpcUrl = SafeUrl;
