//! Provider configuration: credentials and API endpoint

const SPOTINST_TOKEN: &str = "SPOTINST_TOKEN";
const SPOTINST_ACCOUNT: &str = "SPOTINST_ACCOUNT";
const SPOTINST_BASE_URL: &str = "SPOTINST_BASE_URL";

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.spotinst.io";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty when set")]
    Empty(&'static str),

    #[error("invalid base URL '{0}': expected an http(s) URL")]
    InvalidBaseUrl(String),

    #[error("invalid account '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidAccount(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API token, sent as a bearer token
    pub token: Option<String>,
    /// Account the requests act on
    pub account: Option<String>,
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token: None,
            account: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Read the configuration from `SPOTINST_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            token: lookup(SPOTINST_TOKEN),
            account: lookup(SPOTINST_ACCOUNT),
            base_url: lookup(SPOTINST_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Fields set in `overrides` win; the rest are kept
    pub fn merge(self, overrides: ConfigOverrides) -> Self {
        Self {
            token: overrides.token.or(self.token),
            account: overrides.account.or(self.account),
            base_url: overrides.base_url.unwrap_or(self.base_url),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.as_deref() == Some("") {
            return Err(ConfigError::Empty("token"));
        }
        if let Some(account) = &self.account {
            if account.is_empty() {
                return Err(ConfigError::Empty("account"));
            }
            // Goes into the query string unescaped
            if !account
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(ConfigError::InvalidAccount(account.clone()));
            }
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }

    /// URL of a collection, or of one object when `id` is given
    pub fn request_url(&self, path: &str, id: Option<&str>) -> String {
        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        if let Some(id) = id {
            url.push('/');
            url.push_str(id);
        }
        if let Some(account) = &self.account {
            url.push_str("?accountId=");
            url.push_str(account);
        }
        url
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

/// Command-line overrides of [`ProviderConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub token: Option<String>,
    pub account: Option<String>,
    pub base_url: Option<String>,
}
