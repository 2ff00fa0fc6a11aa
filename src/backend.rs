use crate::config::BackendConfig;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Instrument, debug, info, warn};

/// One reply produced by the conversational backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

/// Pluggable backend receiving the text a session sends.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn deliver(&self, sender: &str, text: &str) -> anyhow::Result<Vec<BotMessage>>;
}

/// Stub backend that echoes every message back to its sender.
#[derive(Clone, Default)]
pub struct StubChatBackend;

#[async_trait]
impl ChatBackend for StubChatBackend {
    async fn deliver(&self, sender: &str, text: &str) -> anyhow::Result<Vec<BotMessage>> {
        Ok(vec![BotMessage {
            recipient_id: Some(sender.to_string()),
            text: Some(text.to_string()),
            ..BotMessage::default()
        }])
    }
}

#[derive(Debug, Serialize)]
struct RestWebhookRequest<'a> {
    sender: &'a str,
    message: &'a str,
}

/// Backend speaking the REST channel of a Rasa-compatible server.
#[derive(Clone)]
pub struct RasaRestBackend {
    endpoint: url::Url,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl RasaRestBackend {
    pub const WEBHOOK_PATH: &'static str = "/webhooks/rest/webhook";

    pub fn new(cfg: &BackendConfig) -> anyhow::Result<Self> {
        let base: url::Url = cfg
            .base_url
            .parse()
            .with_context(|| format!("invalid backend url {:?}", cfg.base_url))?;
        let endpoint = base.join(Self::WEBHOOK_PATH)?;
        let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            endpoint,
            auth_token: cfg.auth_token.clone(),
            client,
        })
    }
}

#[async_trait]
impl ChatBackend for RasaRestBackend {
    async fn deliver(&self, sender: &str, text: &str) -> anyhow::Result<Vec<BotMessage>> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&RestWebhookRequest {
                sender,
                message: text,
            });
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        let resp = request
            .send()
            .await
            .with_context(|| format!("backend request to {} failed", self.endpoint))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("backend status {status}"));
        }
        Ok(resp.json::<Vec<BotMessage>>().await?)
    }
}

/// Host wrapper that forwards a session's notifications to the backend.
#[derive(Clone)]
pub struct BackendHost {
    backend: Arc<dyn ChatBackend>,
}

impl BackendHost {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Deliver `messages` one after another, in order. The first failure is
    /// returned and nothing after it is sent.
    pub async fn forward(
        &self,
        sender: &str,
        messages: Vec<String>,
    ) -> anyhow::Result<Vec<BotMessage>> {
        let span = tracing::info_span!("backend_forward", %sender, count = messages.len());
        async {
            let mut replies = Vec::new();
            for (index, message) in messages.iter().enumerate() {
                debug!(index, %message, "delivering notification");
                match self.backend.deliver(sender, message).await {
                    Ok(mut batch) => replies.append(&mut batch),
                    Err(err) => {
                        warn!(index, ?err, "backend delivery failed");
                        return Err(err);
                    }
                }
            }
            Ok(replies)
        }
        .instrument(span)
        .await
    }
}

/// Build a backend from config. Defaults to the echo stub.
pub fn backend_from_config(cfg: Option<&BackendConfig>) -> Arc<dyn ChatBackend> {
    let Some(cfg) = cfg else {
        info!("CHAT_BACKEND_URL not set; using stub chat backend");
        return Arc::new(StubChatBackend);
    };
    match RasaRestBackend::new(cfg) {
        Ok(backend) => {
            info!(url = %backend.endpoint, "using REST chat backend");
            Arc::new(backend)
        }
        Err(err) => {
            warn!(?err, "configured CHAT_BACKEND_URL but failed to init REST backend; using stub");
            Arc::new(StubChatBackend)
        }
    }
}
