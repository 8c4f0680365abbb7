//! Hand-off of a captured stream to the external media player.
//!
//! The player listens for a single plain-text POST carrying the protocol tag,
//! the URL, the MIME type and the encoded request headers, one per line.
//! Delivery is best effort: nothing waits for or inspects the reply.

use tracing::{debug, warn};

use crate::error::CatcherError;
use crate::registry::CapturedRequest;
use crate::settings::Settings;
use crate::Result;

pub const PROTOCOL_TAG: &str = "streamcatcher/0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPayload {
    body: String,
}

impl PlayerPayload {
    pub fn new(captured: &CapturedRequest) -> Self {
        let body = [
            PROTOCOL_TAG,
            captured.url.as_str(),
            captured.mime_type.as_str(),
            captured.header_params.as_str(),
        ]
        .join("\n");
        Self { body }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Payload length in UTF-16 code units, which is what the player expects
    /// in the request path.
    pub fn length(&self) -> usize {
        self.body.encode_utf16().count()
    }

    /// `http://{host}:{port}/{length}` for the configured player.
    pub fn target_url(&self, settings: &Settings) -> String {
        format!(
            "http://{}:{}/{}",
            settings.player_host(),
            settings.player_port(),
            self.length()
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerClient {
    client: reqwest::Client,
}

impl PlayerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the payload and wait until the request has gone out.
    pub async fn deliver(&self, captured: &CapturedRequest, settings: &Settings) -> Result<()> {
        let payload = PlayerPayload::new(captured);
        let target = payload.target_url(settings);
        debug!("Delivering {} to {}", captured.url, target);

        self.client
            .post(&target)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(payload.body)
            .send()
            .await
            .map_err(|e| CatcherError::Network(format!("Player delivery to {} failed: {}", target, e)))?;
        Ok(())
    }

    /// Fire-and-forget delivery on a background task.
    pub fn beacon(&self, captured: CapturedRequest, settings: Settings) {
        let player = self.clone();
        tokio::spawn(async move {
            if let Err(e) = player.deliver(&captured, &settings).await {
                warn!("{}", e);
            }
        });
    }
}
