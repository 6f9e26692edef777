//! Decoding of MusicGPT webhook callbacks.
//!
//! MusicGPT has sent more than one callback shape over time: a per-job
//! form (`conversion_id`) and a per-submission form carrying both
//! `conversion_id_1` and `conversion_id_2`. Both decode into one
//! [`WebhookNotice`] per job id.

use saints_core::provider::WebhookNotice;
use serde::Deserialize;

/// Raw webhook body. Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub conversion_id: Option<String>,
    #[serde(default, alias = "jobId")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub conversion_id_1: Option<String>,
    #[serde(default)]
    pub conversion_id_2: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "conversionKind", alias = "conversionType")]
    pub conversion_type: Option<String>,
}

impl WebhookPayload {
    /// Split into one notice per referenced job.
    ///
    /// Only conversion ids name jobs; a submission-level `task_id` is
    /// ignored.
    pub fn into_notices(self) -> Vec<WebhookNotice> {
        let mut ids: Vec<String> = Vec::new();
        for id in [
            self.conversion_id,
            self.job_id,
            self.conversion_id_1,
            self.conversion_id_2,
        ]
        .into_iter()
        .flatten()
        {
            if !id.is_empty() && !ids.contains(&id) {
                ids.push(id);
            }
        }

        ids.into_iter()
            .map(|job_id| WebhookNotice {
                job_id,
                status: self.status.clone(),
                conversion_kind: self.conversion_type.clone(),
            })
            .collect()
    }
}

/// Decode a raw webhook body into job notices.
///
/// Malformed bodies yield no notices rather than an error: the callback
/// is acknowledged regardless and there is nothing to act on.
pub fn parse_webhook(body: &[u8]) -> Vec<WebhookNotice> {
    match serde_json::from_slice::<WebhookPayload>(body) {
        Ok(payload) => payload.into_notices(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding undecodable MusicGPT webhook");
            Vec::new()
        }
    }
}
