use std::time::Duration;

use bytes::Bytes;
use draftline_core::{
    AccumulateMode, DocumentKind, JsonFlow, JsonSubmission, ValidatedSubmission,
};
use draftline_logging::{draft_debug, draft_info, draft_warn};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;

use crate::{FailureKind, StreamError};

/// Endpoint path per flow, joined onto [`ClientSettings::base_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub personal_statement: String,
    pub essay_revision: String,
    pub resume: String,
    pub recommendation_letter: String,
    pub sectional_analysis: String,
    pub basic_query: String,
    pub ps_revision: String,
    pub ps_final_draft: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            personal_statement: "/api/personal-statement/stream".to_string(),
            essay_revision: "/api/essay-revision/stream".to_string(),
            resume: "/api/resume/stream".to_string(),
            recommendation_letter: "/api/recommendation-letter/stream".to_string(),
            sectional_analysis: "/api/sectional-analysis/stream".to_string(),
            basic_query: "/api/query".to_string(),
            ps_revision: "/api/ps-revision".to_string(),
            ps_final_draft: "/api/ps-final-draft".to_string(),
        }
    }
}

impl Endpoints {
    pub fn for_document(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::PersonalStatement => &self.personal_statement,
            DocumentKind::EssayRevision => &self.essay_revision,
            DocumentKind::Resume => &self.resume,
            DocumentKind::RecommendationLetter => &self.recommendation_letter,
            DocumentKind::SectionalAnalysis => &self.sectional_analysis,
        }
    }

    pub fn for_flow(&self, flow: JsonFlow) -> &str {
        match flow {
            JsonFlow::BasicQuery => &self.basic_query,
            JsonFlow::PsRevision => &self.ps_revision,
            JsonFlow::PsFinalDraft => &self.ps_final_draft,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_key: String,
    pub api_key_header: String,
    pub connect_timeout: Duration,
    /// Whole-request limit for streamed generations; `None` lets them run.
    pub stream_timeout: Option<Duration>,
    /// Whole-request limit for synchronous JSON calls.
    pub sync_timeout: Duration,
    pub endpoints: Endpoints,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: String::new(),
            api_key_header: "X-API-Key".to_string(),
            connect_timeout: Duration::from_secs(10),
            stream_timeout: None,
            sync_timeout: Duration::from_secs(30),
            endpoints: Endpoints::default(),
        }
    }
}

/// What a generation task sends to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Form(ValidatedSubmission),
    Json(JsonSubmission),
}

impl GenerationRequest {
    pub fn label(&self) -> &'static str {
        match self {
            GenerationRequest::Form(form) => form.kind.as_str(),
            GenerationRequest::Json(json) => json.flow.as_str(),
        }
    }

    pub fn accumulate_mode(&self) -> AccumulateMode {
        match self {
            GenerationRequest::Form(form) => form.kind.accumulate_mode(),
            GenerationRequest::Json(_) => AccumulateMode::Flat,
        }
    }
}

/// A response whose headers were accepted and whose body is still arriving.
pub struct OpenedStream {
    pub content_type: Option<String>,
    pub chunks: BoxStream<'static, Result<Bytes, StreamError>>,
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the body stream once a 2xx status arrived.
    async fn open(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<OpenedStream, StreamError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: ClientSettings) -> Result<Self, StreamError> {
        let client = build_client(&settings)?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Posts a JSON flow to its synchronous endpoint and returns the JSON body.
    pub async fn post_json(
        &self,
        submission: &JsonSubmission,
    ) -> Result<serde_json::Value, StreamError> {
        let url = self.endpoint_url(self.settings.endpoints.for_flow(submission.flow))?;
        draft_info!("POST {} (sync {})", url, submission.flow.as_str());
        let response = self
            .client
            .post(url)
            .header(self.settings.api_key_header.as_str(), self.settings.api_key.as_str())
            .timeout(self.settings.sync_timeout)
            .json(&submission.to_body())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| StreamError::new(FailureKind::Decode, err.to_string()))
    }

    fn endpoint_url(&self, path: &str) -> Result<reqwest::Url, StreamError> {
        let joined = format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        reqwest::Url::parse(&joined)
            .map_err(|err| StreamError::new(FailureKind::InvalidUrl, format!("{joined}: {err}")))
    }

    fn request_for(
        &self,
        request: &GenerationRequest,
    ) -> Result<reqwest::RequestBuilder, StreamError> {
        let path = match request {
            GenerationRequest::Form(form) => self.settings.endpoints.for_document(form.kind),
            GenerationRequest::Json(json) => self.settings.endpoints.for_flow(json.flow),
        };
        let url = self.endpoint_url(path)?;
        draft_info!("POST {} ({})", url, request.label());

        let mut builder = self
            .client
            .post(url)
            .header(self.settings.api_key_header.as_str(), self.settings.api_key.as_str());
        if let Some(timeout) = self.settings.stream_timeout {
            builder = builder.timeout(timeout);
        }
        let builder = match request {
            GenerationRequest::Form(form) => builder.multipart(multipart_body(form)?),
            GenerationRequest::Json(json) => builder.json(&json.to_body()),
        };
        Ok(builder)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn open(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<OpenedStream, StreamError> {
        let builder = self.request_for(request)?;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamError::cancelled()),
            sent = builder.send() => sent.map_err(map_reqwest_error)?,
        };
        let response = ensure_success(response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        draft_debug!("stream opened, content type {:?}", content_type);

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error))
            .boxed();
        Ok(OpenedStream {
            content_type,
            chunks,
        })
    }
}

fn build_client(settings: &ClientSettings) -> Result<reqwest::Client, StreamError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .build()
        .map_err(|err| StreamError::new(FailureKind::Network, err.to_string()))
}

fn multipart_body(submission: &ValidatedSubmission) -> Result<Form, StreamError> {
    let mut form = Form::new();
    for (name, value) in submission.text_fields() {
        form = form.text(name, value);
    }
    for (name, file) in submission.file_fields() {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|err| {
                StreamError::new(
                    FailureKind::InvalidRequest,
                    format!("{}: {err}", file.file_name),
                )
            })?;
        form = form.part(name, part);
    }
    Ok(form)
}

/// Non-2xx responses become an error carrying the status and the body text.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    draft_warn!("backend answered {}: {}", status, body);
    Err(StreamError::new(FailureKind::HttpStatus(status.as_u16()), body))
}

fn map_reqwest_error(err: reqwest::Error) -> StreamError {
    if err.is_timeout() {
        return StreamError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return StreamError::new(FailureKind::InvalidRequest, err.to_string());
    }
    if err.is_decode() || err.is_body() {
        return StreamError::new(FailureKind::Decode, err.to_string());
    }
    StreamError::new(FailureKind::Network, err.to_string())
}
