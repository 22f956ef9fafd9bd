use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use url::Url;

use crate::{ClientError, FailureKind, JobCommand, StatusReport};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-exchange bound; a call that exceeds it fails with `Timeout`.
    pub request_timeout: Duration,
    pub max_body_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// The remote job service's control surface.
///
/// One request per call, no retries. Success means "accepted"; the effect is
/// only visible through a later [`RemoteJobClient::get_status`].
#[async_trait::async_trait]
pub trait RemoteJobClient: Send + Sync {
    async fn init(&self, download_dir: &str) -> Result<(), ClientError>;

    async fn confirm_login(&self) -> Result<(), ClientError>;

    /// `companies` must already be trimmed and non-empty.
    async fn process(&self, companies: &[String]) -> Result<(), ClientError>;

    async fn stop(&self) -> Result<(), ClientError>;

    async fn get_status(&self) -> Result<StatusReport, ClientError>;
}

/// Dispatches a [`JobCommand`] to the matching client call.
pub async fn send_command(
    client: &dyn RemoteJobClient,
    command: &JobCommand,
) -> Result<(), ClientError> {
    match command {
        JobCommand::Init { download_dir } => client.init(download_dir).await,
        JobCommand::ConfirmLogin => client.confirm_login().await,
        JobCommand::Process { companies } => client.process(companies).await,
        JobCommand::Stop => client.stop().await,
    }
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
    #[serde(default)]
    logs: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    http: reqwest::Client,
    base: Url,
    settings: ClientSettings,
}

impl ReqwestJobClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be a base url", settings.base_url),
            ));
        }
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            http,
            base,
            settings,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, name: &str) -> Result<Url, ClientError> {
        self.base
            .join(name)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn post(&self, name: &str, body: Option<serde_json::Value>) -> Result<(), ClientError> {
        let mut request = self.http.post(self.endpoint(name)?);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        ensure_success(&response)?;
        Ok(())
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, ClientError> {
        let max_bytes = self.settings.max_body_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "status body too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "status body too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl RemoteJobClient for ReqwestJobClient {
    async fn init(&self, download_dir: &str) -> Result<(), ClientError> {
        self.post(
            "init",
            Some(serde_json::json!({ "download_dir": download_dir })),
        )
        .await
    }

    async fn confirm_login(&self) -> Result<(), ClientError> {
        self.post("confirm-login", None).await
    }

    async fn process(&self, companies: &[String]) -> Result<(), ClientError> {
        self.post("process", Some(serde_json::json!({ "companies": companies })))
            .await
    }

    async fn stop(&self) -> Result<(), ClientError> {
        self.post("stop", None).await
    }

    async fn get_status(&self) -> Result<StatusReport, ClientError> {
        let response = self
            .http
            .get(self.endpoint("status")?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(&response)?;

        let bytes = self.read_body(response).await?;
        let body: StatusBody = serde_json::from_slice(&bytes)
            .map_err(|err| ClientError::new(FailureKind::MalformedResponse, err.to_string()))?;

        Ok(StatusReport {
            status: body.status,
            logs: body.logs.unwrap_or_default(),
        })
    }
}

fn ensure_success(response: &reqwest::Response) -> Result<(), ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
