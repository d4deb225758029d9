//! HTTP client for the Moneypex POS product export and import endpoints.

mod export;
mod import;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Client, Url};

use crate::error::TransferError;

pub const DEFAULT_BASE_URL: &str = "https://pos.moneypex.com/";

const EXPORT_PATH: &str = "Product/ExportProducts";
const IMPORT_PATH: &str = "Product/ImportProduct";
const INDEX_PATH: &str = "Product/Index";

/// Filter parameters the export endpoint expects, all sent empty.
const EXPORT_FILTERS: [&str; 4] = ["SupplierId", "CategoryId", "SearchFilter_Name", "ProductTypeId"];

/// Client for the Moneypex product export and import endpoints.
///
/// Authenticates with the merchant's session cookie, sent on every request.
/// Redirects are not followed: an expired session answers with a redirect to
/// the login page, which surfaces as [`TransferError::Status`] instead of an
/// HTML page masquerading as an export. Nothing is retried.
pub struct MoneypexClient {
    client: Client,
    base_url: Url,
}

impl MoneypexClient {
    /// Creates a client pointed at `base_url` with the given session and
    /// timeouts. `timeout_secs` bounds each whole request.
    ///
    /// # Errors
    ///
    /// - [`TransferError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`TransferError::InvalidSession`] if the cookie has characters not
    ///   allowed in a header.
    /// - [`TransferError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        session_cookie: &str,
        timeout_secs: u64,
        connect_timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, TransferError> {
        // One trailing slash so `join` appends to the base path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| TransferError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(TransferError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: "scheme must be http or https".into(),
            });
        }

        let mut cookie =
            HeaderValue::from_str(session_cookie).map_err(|_| TransferError::InvalidSession)?;
        cookie.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`MoneypexClient::new`].
    pub fn from_app_config(config: &mpxsync_core::AppConfig) -> Result<Self, TransferError> {
        Self::new(
            &config.moneypex_base_url,
            &config.moneypex_session_cookie,
            config.request_timeout_secs,
            config.connect_timeout_secs,
            &config.user_agent,
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Export endpoint URL with the empty filter query the vendor expects.
    fn export_url(&self) -> Result<Url, TransferError> {
        let mut url = self.endpoint(EXPORT_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            for filter in EXPORT_FILTERS {
                query.append_pair(filter, "");
            }
        }
        Ok(url)
    }

    fn import_url(&self) -> Result<Url, TransferError> {
        self.endpoint(IMPORT_PATH)
    }

    fn referer(&self, path: &str) -> Result<String, TransferError> {
        self.endpoint(path).map(String::from)
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransferError> {
        self.base_url
            .join(path)
            .map_err(|e| TransferError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
