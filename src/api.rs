use std::sync::Arc;

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use web_sys::FormData;

use crate::error::ApiError;
use crate::models::{IndexListing, Note, SubjectMap, UploadOutcome};

/// Called with every transport failure before it is returned to the caller.
pub type NetworkHook = Arc<dyn Fn(&ApiError) + Send + Sync>;

pub fn subjects_path() -> String {
    "/api/subjects".to_string()
}

pub fn indices_path(subject: &str, class_name: &str) -> String {
    format!(
        "/api/indices/{}/{}",
        urlencoding::encode(subject),
        urlencoding::encode(class_name)
    )
}

pub fn note_path(id: u64) -> String {
    format!("/api/note/{id}")
}

pub fn upload_path() -> String {
    "/upload".to_string()
}

/// Thin wrapper every component talks to the server through.
#[derive(Clone)]
pub struct ApiClient {
    base: String,
    on_network_error: NetworkHook,
}

impl ApiClient {
    pub fn new(base: impl Into<String>, on_network_error: NetworkHook) -> Self {
        Self {
            base: base.into(),
            on_network_error,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    pub async fn subjects(&self) -> Result<SubjectMap, ApiError> {
        self.get_json(&subjects_path()).await
    }

    pub async fn indices(&self, subject: &str, class_name: &str) -> Result<IndexListing, ApiError> {
        self.get_json(&indices_path(subject, class_name)).await
    }

    pub async fn note(&self, id: u64) -> Result<Note, ApiError> {
        self.get_json(&note_path(id)).await
    }

    /// Posts the multipart form and resolves to the new note's id, if the server sent one.
    pub async fn upload(&self, form: &FormData) -> Result<Option<u64>, ApiError> {
        let request = Request::post(&self.url(&upload_path()))
            .body(form.clone())
            .map_err(|err| ApiError::Body(err.to_string()))?;
        let response = self.dispatch(request.send()).await?;
        let outcome: UploadOutcome = decode(response).await?;
        accept_upload(outcome)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder: RequestBuilder = Request::get(&self.url(path));
        let response = self.dispatch(builder.send()).await?;
        decode(response).await
    }

    async fn dispatch(
        &self,
        pending: impl std::future::Future<Output = Result<Response, gloo_net::Error>>,
    ) -> Result<Response, ApiError> {
        let response = match pending.await {
            Ok(response) => response,
            Err(err) => {
                let err = ApiError::Network(err.to_string());
                log::error!("Fetch error: {err}");
                (self.on_network_error)(&err);
                return Err(err);
            }
        };
        if !response.ok() {
            return Err(ApiError::Status(response.status()));
        }
        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

pub fn accept_upload(outcome: UploadOutcome) -> Result<Option<u64>, ApiError> {
    if outcome.success {
        Ok(outcome.note_id)
    } else {
        Err(ApiError::Rejected(
            outcome
                .error
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "Upload failed".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_path_percent_encodes_segments() {
        assert_eq!(
            indices_path("Computer Science", "Data/Structures & Algos"),
            "/api/indices/Computer%20Science/Data%2FStructures%20%26%20Algos"
        );
    }

    #[test]
    fn note_path_uses_numeric_id() {
        assert_eq!(note_path(42), "/api/note/42");
        assert_eq!(subjects_path(), "/api/subjects");
        assert_eq!(upload_path(), "/upload");
    }

    #[test]
    fn client_joins_base_without_double_slash() {
        let client = ApiClient::new("https://notes.example/", Arc::new(|_: &ApiError| {}));
        assert_eq!(client.url("/upload"), "https://notes.example/upload");
    }

    #[test]
    fn successful_upload_yields_note_id() {
        let outcome = UploadOutcome {
            success: true,
            error: None,
            note_id: Some(12),
        };
        assert_eq!(accept_upload(outcome), Ok(Some(12)));
    }

    #[test]
    fn rejected_upload_surfaces_server_message() {
        let outcome: UploadOutcome =
            serde_json::from_str(r#"{"success": false, "error": "X"}"#).unwrap();
        assert_eq!(accept_upload(outcome), Err(ApiError::Rejected("X".to_string())));
    }

    #[test]
    fn rejected_upload_without_message_uses_default() {
        let outcome: UploadOutcome = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(
            accept_upload(outcome).unwrap_err().to_string(),
            "Upload failed"
        );
    }
}
