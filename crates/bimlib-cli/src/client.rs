// HTTP client for the catalog service

use std::fs::File;
use std::time::Duration;

use bimlib_core::{
    ErrorBody, HealthReport, ModelFormat, ModelView, UploadResponse, MODEL_FIELD,
};
use reqwest::blocking::{multipart, Client, Response};
use serde::de::DeserializeOwned;

use crate::progress::{ProgressFn, ProgressReader};
use crate::widget::{MetadataForm, SelectedFile, TransportError, UploadTransport};

/// Default catalog address when neither `--server` nor `BIMLIB_API_URL` is set.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    http: Client,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        // Large models can take a while; no overall request timeout.
        let http = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a record's `filePath`.
    pub fn file_url(&self, file_path: &str) -> String {
        format!("{}{}", self.base_url, file_path)
    }

    pub fn list_models(&self) -> Result<Vec<ModelView>, TransportError> {
        let resp = self.http.get(self.url("/api/models")).send()?;
        read_json(resp)
    }

    pub fn get_model(&self, id: &str) -> Result<ModelView, TransportError> {
        let resp = self.http.get(self.url(&format!("/api/models/{}", id))).send()?;
        read_json(resp)
    }

    pub fn health(&self) -> Result<HealthReport, TransportError> {
        let resp = self.http.get(self.url("/health")).send()?;
        read_json(resp)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl UploadTransport for CatalogClient {
    fn upload(
        &self,
        file: &SelectedFile,
        form: &MetadataForm,
        on_progress: ProgressFn,
    ) -> Result<UploadResponse, TransportError> {
        let handle = File::open(&file.path).map_err(|source| TransportError::Io {
            path: file.path.clone(),
            source,
        })?;

        let content_type = ModelFormat::from_file_name(&file.name)
            .map(ModelFormat::content_type)
            .unwrap_or("application/octet-stream");

        let reader = ProgressReader::new(handle, file.size, on_progress);
        let part = multipart::Part::reader_with_length(reader, file.size)
            .file_name(file.name.clone())
            .mime_str(content_type)?;

        let body = multipart::Form::new()
            .part(MODEL_FIELD, part)
            .text("name", form.name.clone())
            .text("category", form.category.clone())
            .text("description", form.description.clone())
            .text("materials", form.materials.clone())
            .text("specifications", form.specifications.clone());

        let resp = self
            .http
            .post(self.url("/api/upload"))
            .multipart(body)
            .send()?;
        read_json(resp)
    }
}

/// Decodes a success body, or turns an error status into [`TransportError::Http`]
/// carrying the server's `error` text when it sent one.
fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp.json::<ErrorBody>().ok().map(|body| body.error);
        return Err(TransportError::Http {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp.json()?)
}
