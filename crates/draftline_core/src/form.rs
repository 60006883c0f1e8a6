//! Submission forms and their validation.
//!
//! Validation runs before any request is built, so a rejected form never
//! reaches the network and never produces a `DisplayResult`.

use std::str::FromStr;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::AccumulateMode;

/// Multipart field carrying pasted text instead of a primary document.
pub const PASTED_TEXT_FIELD: &str = "material_doc";
pub const SUPPORT_FILES_FIELD: &str = "support_files";

/// A user-selected file, held only until the request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    PersonalStatement,
    EssayRevision,
    Resume,
    RecommendationLetter,
    /// Search-and-analyze flow shown in two columns.
    SectionalAnalysis,
}

impl DocumentKind {
    pub fn all() -> [DocumentKind; 5] {
        [
            DocumentKind::PersonalStatement,
            DocumentKind::EssayRevision,
            DocumentKind::Resume,
            DocumentKind::RecommendationLetter,
            DocumentKind::SectionalAnalysis,
        ]
    }

    /// Multipart field name of the primary document.
    pub fn primary_field(&self) -> &'static str {
        match self {
            DocumentKind::PersonalStatement | DocumentKind::SectionalAnalysis => "material_file",
            DocumentKind::EssayRevision => "original_essay_file",
            DocumentKind::Resume => "resume_material",
            DocumentKind::RecommendationLetter => "recommendation_material",
        }
    }

    pub fn accumulate_mode(&self) -> AccumulateMode {
        match self {
            DocumentKind::SectionalAnalysis => AccumulateMode::Sectional,
            _ => AccumulateMode::Flat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PersonalStatement => "personal-statement",
            DocumentKind::EssayRevision => "essay-revision",
            DocumentKind::Resume => "resume",
            DocumentKind::RecommendationLetter => "recommendation-letter",
            DocumentKind::SectionalAnalysis => "sectional-analysis",
        }
    }

}

impl FromStr for DocumentKind {
    type Err = UnknownName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                UnknownName::new(
                    "document kind",
                    value,
                    "personal-statement, essay-revision, resume, recommendation-letter, \
                     sectional-analysis",
                )
            })
    }
}

/// A name that matches none of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} {value:?}, expected one of {expected}")]
pub struct UnknownName {
    pub what: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl UnknownName {
    pub fn new(what: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            what,
            value: value.to_string(),
            expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("provide a document file or paste the text")]
    MissingPrimaryInput,
    #[error("provide either a document file or pasted text, not both")]
    ConflictingPrimaryInput,
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// Raw form state as the user filled it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub kind: DocumentKind,
    pub primary_file: Option<UploadedFile>,
    pub pasted_text: Option<String>,
    pub support_files: Vec<UploadedFile>,
    pub instructions: Option<String>,
    pub custom_role: Option<String>,
    pub custom_task: Option<String>,
    pub custom_output_format: Option<String>,
}

impl SubmissionForm {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            primary_file: None,
            pasted_text: None,
            support_files: Vec::new(),
            instructions: None,
            custom_role: None,
            custom_task: None,
            custom_output_format: None,
        }
    }

    /// Checks that exactly one primary input is present.
    pub fn validate(self) -> Result<ValidatedSubmission, ValidationError> {
        let pasted = self.pasted_text.filter(|text| !text.trim().is_empty());
        let primary = match (self.primary_file, pasted) {
            (Some(_), Some(_)) => return Err(ValidationError::ConflictingPrimaryInput),
            (None, None) => return Err(ValidationError::MissingPrimaryInput),
            (Some(file), None) => PrimaryInput::File(file),
            (None, Some(text)) => PrimaryInput::Pasted(text),
        };
        Ok(ValidatedSubmission {
            kind: self.kind,
            primary,
            support_files: self.support_files,
            instructions: non_blank(self.instructions),
            custom_role: non_blank(self.custom_role),
            custom_task: non_blank(self.custom_task),
            custom_output_format: non_blank(self.custom_output_format),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryInput {
    File(UploadedFile),
    Pasted(String),
}

/// A form that passed validation and can be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub kind: DocumentKind,
    pub primary: PrimaryInput,
    pub support_files: Vec<UploadedFile>,
    pub instructions: Option<String>,
    pub custom_role: Option<String>,
    pub custom_task: Option<String>,
    pub custom_output_format: Option<String>,
}

impl ValidatedSubmission {
    /// Text parts of the multipart body.
    ///
    /// `material_doc` is always present: empty when the primary input is a file.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let pasted = match &self.primary {
            PrimaryInput::Pasted(text) => text.clone(),
            PrimaryInput::File(_) => String::new(),
        };
        let mut fields = vec![(PASTED_TEXT_FIELD, pasted)];
        let optional = [
            ("instructions", &self.instructions),
            ("custom_role_prompt", &self.custom_role),
            ("custom_task_prompt", &self.custom_task),
            ("custom_output_format_prompt", &self.custom_output_format),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name, value.clone()));
            }
        }
        fields
    }

    /// File parts of the multipart body, primary document first.
    pub fn file_fields(&self) -> Vec<(&'static str, &UploadedFile)> {
        let mut files = Vec::with_capacity(1 + self.support_files.len());
        if let PrimaryInput::File(file) = &self.primary {
            files.push((self.kind.primary_field(), file));
        }
        files.extend(
            self.support_files
                .iter()
                .map(|file| (SUPPORT_FILES_FIELD, file)),
        );
        files
    }
}

/// Simple flows posted as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonFlow {
    BasicQuery,
    PsRevision,
    PsFinalDraft,
}

impl JsonFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonFlow::BasicQuery => "query",
            JsonFlow::PsRevision => "ps-revision",
            JsonFlow::PsFinalDraft => "ps-final-draft",
        }
    }

    fn text_field(&self) -> &'static str {
        match self {
            JsonFlow::BasicQuery => "query",
            JsonFlow::PsRevision | JsonFlow::PsFinalDraft => "ps_content",
        }
    }
}

impl FromStr for JsonFlow {
    type Err = UnknownName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [JsonFlow::BasicQuery, JsonFlow::PsRevision, JsonFlow::PsFinalDraft]
            .into_iter()
            .find(|flow| flow.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownName::new("flow", value, "query, ps-revision, ps-final-draft"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSubmission {
    pub flow: JsonFlow,
    pub text: String,
    pub instructions: Option<String>,
}

impl JsonSubmission {
    pub fn new(flow: JsonFlow, text: impl Into<String>) -> Self {
        Self {
            flow,
            text: text.into(),
            instructions: None,
        }
    }

    pub fn validate(self) -> Result<JsonSubmission, ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyField(self.flow.text_field()));
        }
        Ok(JsonSubmission {
            instructions: non_blank(self.instructions),
            ..self
        })
    }

    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.flow.text_field().to_string(), json!(self.text));
        if let Some(instructions) = &self.instructions {
            body.insert("instructions".to_string(), json!(instructions));
        }
        Value::Object(body)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
