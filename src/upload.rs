use std::fmt;

use web_sys::{FormData, HtmlFormElement};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::validate::{validate_file, FileRejection};

pub const UPLOAD_SUCCESS: &str = "Note uploaded and analyzed successfully!";
pub const BUSY_LABEL: &str = " Uploading...";
pub const IDLE_LABEL: &str = " Upload & Analyze";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub subject: String,
    pub class_name: String,
    pub index_key: String,
    pub file: Option<FileMeta>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormRejection {
    MissingSubject,
    MissingClass,
    MissingFile,
    InvalidFile(FileRejection),
}

impl fmt::Display for FormRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormRejection::MissingSubject => f.write_str("Please select a subject"),
            FormRejection::MissingClass => f.write_str("Please select a class"),
            FormRejection::MissingFile => f.write_str("Please select a file to upload"),
            FormRejection::InvalidFile(rejection) => write!(f, "{rejection}"),
        }
    }
}

impl UploadForm {
    /// Checks subject, class, file presence, then file validity, stopping at the first failure.
    pub fn check(&self, config: &ClientConfig) -> Result<(), FormRejection> {
        if self.subject.is_empty() {
            return Err(FormRejection::MissingSubject);
        }
        if self.class_name.is_empty() {
            return Err(FormRejection::MissingClass);
        }
        let Some(file) = &self.file else {
            return Err(FormRejection::MissingFile);
        };
        validate_file(config, &file.name, file.size).map_err(FormRejection::InvalidFile)
    }
}

pub fn failure_message(err: &ApiError) -> String {
    format!("Error uploading note: {err}")
}

/// What the modal does once the POST settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Close the modal, announce success, reload after the delay.
    Uploaded { reload_after_ms: u32 },
    Failed(String),
}

pub fn completion(result: &Result<Option<u64>, ApiError>, reload_delay_ms: u32) -> Completion {
    match result {
        Ok(_) => Completion::Uploaded {
            reload_after_ms: reload_delay_ms,
        },
        Err(err) => Completion::Failed(failure_message(err)),
    }
}

/// Posts the form element's fields, with the cascade selections taking precedence.
pub async fn submit(
    api: &ApiClient,
    element: &HtmlFormElement,
    form: &UploadForm,
) -> Result<Option<u64>, ApiError> {
    let data = FormData::new_with_form(element).map_err(|err| ApiError::Body(format!("{err:?}")))?;
    for (name, value) in [
        ("subject", &form.subject),
        ("class_name", &form.class_name),
        ("index_key", &form.index_key),
    ] {
        data.set_with_str(name, value)
            .map_err(|err| ApiError::Body(format!("{err:?}")))?;
    }
    api.upload(&data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::accept_upload;
    use crate::models::UploadOutcome;

    fn complete() -> UploadForm {
        UploadForm {
            subject: "Physics".into(),
            class_name: "Optics".into(),
            index_key: String::new(),
            file: Some(FileMeta {
                name: "lenses.md".into(),
                size: 2048,
            }),
        }
    }

    #[test]
    fn complete_form_passes() {
        assert_eq!(complete().check(&ClientConfig::default()), Ok(()));
    }

    #[test]
    fn empty_subject_is_reported_first() {
        let form = UploadForm {
            file: None,
            class_name: String::new(),
            subject: String::new(),
            ..complete()
        };
        let err = form.check(&ClientConfig::default()).unwrap_err();
        assert_eq!(err, FormRejection::MissingSubject);
        assert_eq!(err.to_string(), "Please select a subject");
    }

    #[test]
    fn checks_run_in_order() {
        let config = ClientConfig::default();
        let mut form = complete();
        form.class_name.clear();
        form.file = None;
        assert_eq!(form.check(&config), Err(FormRejection::MissingClass));

        form.class_name = "Optics".into();
        assert_eq!(
            form.check(&config).unwrap_err().to_string(),
            "Please select a file to upload"
        );

        form.file = Some(FileMeta {
            name: "slides.pptx".into(),
            size: 1,
        });
        assert!(matches!(
            form.check(&config),
            Err(FormRejection::InvalidFile(FileRejection::Extension { .. }))
        ));
    }

    #[test]
    fn failure_message_wraps_error_text() {
        assert_eq!(
            failure_message(&ApiError::Rejected("X".into())),
            "Error uploading note: X"
        );
        assert_eq!(
            failure_message(&ApiError::Status(413)),
            "Error uploading note: HTTP error! status: 413"
        );
    }

    #[test]
    fn accepted_upload_closes_and_schedules_reload() {
        let outcome: UploadOutcome = serde_json::from_str(r#"{"success": true, "note_id": 12}"#).unwrap();
        let result = accept_upload(outcome);
        assert_eq!(
            completion(&result, 1500),
            Completion::Uploaded {
                reload_after_ms: 1500
            }
        );
    }

    #[test]
    fn rejected_upload_reports_server_message() {
        let outcome: UploadOutcome =
            serde_json::from_str(r#"{"success": false, "error": "X"}"#).unwrap();
        let result = accept_upload(outcome);
        assert_eq!(
            completion(&result, 1500),
            Completion::Failed("Error uploading note: X".to_string())
        );
    }
}
