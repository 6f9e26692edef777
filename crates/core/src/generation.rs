//! Submission validation, display naming, and webhook status vocabulary.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Path the provider calls back on, relative to the public base URL.
pub const WEBHOOK_PATH: &str = "/api/webhook/musicgpt";

/// Upper bound on prompt length accepted from clients, in characters.
pub const MAX_PROMPT_LEN: usize = 2_000;

/// Upper bound on lyrics length accepted from clients, in characters.
pub const MAX_LYRICS_LEN: usize = 10_000;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check the client-supplied fields of a generation request.
///
/// The prompt may be empty when lyrics are supplied; one of the two must
/// carry content.
pub fn validate_submission(
    prompt: &str,
    style: &str,
    lyrics: &str,
    client_task_id: &str,
    credential: &str,
) -> Result<(), CoreError> {
    if client_task_id.trim().is_empty() {
        return Err(CoreError::Validation("clientTaskId is required".into()));
    }
    if credential.trim().is_empty() {
        return Err(CoreError::Validation("credential is required".into()));
    }
    if style.trim().is_empty() {
        return Err(CoreError::Validation("style is required".into()));
    }
    if prompt.trim().is_empty() && lyrics.trim().is_empty() {
        return Err(CoreError::Validation(
            "either prompt or lyrics must be provided".into(),
        ));
    }
    if prompt.chars().count() > MAX_PROMPT_LEN {
        return Err(CoreError::Validation(format!(
            "prompt exceeds {MAX_PROMPT_LEN} characters"
        )));
    }
    if lyrics.chars().count() > MAX_LYRICS_LEN {
        return Err(CoreError::Validation(format!(
            "lyrics exceed {MAX_LYRICS_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Title used when the client does not supply one.
pub fn default_title(style: &str) -> String {
    format!("{} Song", style.trim())
}

/// Display title for one variant of a submission.
///
/// Single-job submissions keep the base title unchanged.
pub fn variant_title(base: &str, variant: u32, total: usize) -> String {
    if total > 1 {
        format!("{base} (Version {variant})")
    } else {
        base.to_string()
    }
}

// ---------------------------------------------------------------------------
// Webhook status vocabulary
// ---------------------------------------------------------------------------

/// What a webhook's `status` field claims about a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookStatus {
    Succeeded,
    Failed,
    /// Progress pings and anything unrecognised.
    Other,
}

impl WebhookStatus {
    pub fn parse(status: Option<&str>) -> Self {
        let Some(status) = status else {
            return WebhookStatus::Other;
        };
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "success" | "succeeded" => WebhookStatus::Succeeded,
            "failed" | "failure" | "error" | "cancelled" | "canceled" => WebhookStatus::Failed,
            _ => WebhookStatus::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn valid_submission_passes() {
        assert!(validate_submission("a storm", "Blues", "", "abc", "key").is_ok());
    }

    #[test]
    fn lyrics_alone_are_enough() {
        assert!(validate_submission("", "Blues", "la la la", "abc", "key").is_ok());
    }

    #[test]
    fn missing_client_task_id_rejected() {
        let err = validate_submission("p", "Blues", "", "  ", "key").unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("clientTaskId"));
    }

    #[test]
    fn missing_credential_rejected() {
        let err = validate_submission("p", "Blues", "", "abc", "").unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("credential"));
    }

    #[test]
    fn empty_prompt_and_lyrics_rejected() {
        assert_matches!(
            validate_submission("", "Blues", " ", "abc", "key"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn oversized_prompt_rejected() {
        let prompt = "x".repeat(MAX_PROMPT_LEN + 1);
        assert_matches!(
            validate_submission(&prompt, "Blues", "", "abc", "key"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn length_limits_count_characters_not_bytes() {
        // Each 'é' is two bytes in UTF-8.
        let at_limit = "é".repeat(MAX_LYRICS_LEN);
        assert!(validate_submission("", "Chanson", &at_limit, "abc", "key").is_ok());

        let over = "é".repeat(MAX_LYRICS_LEN + 1);
        assert_matches!(
            validate_submission("", "Chanson", &over, "abc", "key"),
            Err(CoreError::Validation(msg)) if msg.contains("characters")
        );
    }

    #[test]
    fn titles() {
        assert_eq!(default_title("Gospel"), "Gospel Song");
        assert_eq!(variant_title("Hymn", 1, 1), "Hymn");
        assert_eq!(variant_title("Hymn", 2, 2), "Hymn (Version 2)");
    }

    #[test]
    fn webhook_status_vocabulary() {
        assert_eq!(WebhookStatus::parse(Some("completed")), WebhookStatus::Succeeded);
        assert_eq!(WebhookStatus::parse(Some("COMPLETED")), WebhookStatus::Succeeded);
        assert_eq!(WebhookStatus::parse(Some("failed")), WebhookStatus::Failed);
        assert_eq!(WebhookStatus::parse(Some("processing")), WebhookStatus::Other);
        assert_eq!(WebhookStatus::parse(None), WebhookStatus::Other);
    }
}
