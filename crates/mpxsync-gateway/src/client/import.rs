use reqwest::header::{ACCEPT, REFERER};
use reqwest::multipart::{Form, Part};

use super::{MoneypexClient, IMPORT_PATH};
use crate::error::{Operation, TransferError};

pub const IMPORT_FILE_FIELD: &str = "File";
pub const IMPORT_FILE_NAME: &str = "ProductImport.xlsx";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Upload error bodies are cut to this many characters before being kept.
const MAX_ERROR_BODY_CHARS: usize = 4096;

impl MoneypexClient {
    /// Uploads a rebuilt product workbook to the vendor's import endpoint.
    ///
    /// The workbook goes in a multipart `File` part named
    /// `ProductImport.xlsx`, next to the `isAddForSync=true` flag.
    ///
    /// # Errors
    ///
    /// - [`TransferError::Status`] on any non-2xx response, carrying the
    ///   status and the response body text.
    /// - [`TransferError::Http`] on network failure or timeout.
    pub async fn upload_workbook(&self, workbook: Vec<u8>) -> Result<(), TransferError> {
        let url = self.import_url()?;
        let referer = self.referer(IMPORT_PATH)?;
        let size = workbook.len();

        let file = Part::bytes(workbook)
            .file_name(IMPORT_FILE_NAME)
            .mime_str(XLSX_MIME)?;
        let form = Form::new()
            .part(IMPORT_FILE_FIELD, file)
            .text("isAddForSync", "true");

        tracing::debug!(url = %url, bytes = size, "uploading product workbook");
        let response = self
            .client
            .post(url)
            .header(ACCEPT, "*/*")
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, referer)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::error!(status = status.as_u16(), body = %body, "product import rejected");
            return Err(TransferError::Status {
                operation: Operation::Upload,
                status: status.as_u16(),
                body: Some(body),
            });
        }

        tracing::info!(bytes = size, "product workbook uploaded");
        Ok(())
    }
}
