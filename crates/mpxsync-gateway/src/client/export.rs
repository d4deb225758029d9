use reqwest::header::{ACCEPT, REFERER};

use super::{MoneypexClient, INDEX_PATH};
use crate::error::{Operation, TransferError};

const EXPORT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

impl MoneypexClient {
    /// Downloads the merchant's product export workbook.
    ///
    /// # Errors
    ///
    /// - [`TransferError::Status`] on any non-2xx response, carrying the status.
    /// - [`TransferError::Http`] on network failure or timeout.
    pub async fn fetch_export(&self) -> Result<Vec<u8>, TransferError> {
        let url = self.export_url()?;
        let referer = self.referer(INDEX_PATH)?;

        tracing::debug!(url = %url, "fetching product export");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, EXPORT_ACCEPT)
            .header(REFERER, referer)
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "product export rejected");
            return Err(TransferError::Status {
                operation: Operation::Fetch,
                status: status.as_u16(),
                body: None,
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(bytes = bytes.len(), "fetched product export");
        Ok(bytes.to_vec())
    }
}
