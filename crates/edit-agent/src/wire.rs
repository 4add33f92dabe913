use serde::{Deserialize, Serialize};

/// Content of a user message: the instruction plus a snapshot of the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    pub instructions: String,
    pub html: String,
    pub css: String,
}

/// Payload the model must answer with. Extra fields are ignored; a missing
/// or mistyped `html`/`css` is a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResponse {
    pub html: String,
    pub css: String,
}

/// Strips an optional ```json fenced wrapper from a model reply. Already
/// bare payloads pass through unchanged, so the operation is idempotent.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // The opening fence line may carry an info string such as "json".
    match body.split_once('\n') {
        Some((info, remainder)) if info.trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            remainder.trim()
        }
        _ => body.trim(),
    }
}

pub fn parse_edit_response(reply: &str) -> Result<EditResponse, serde_json::Error> {
    serde_json::from_str(strip_code_fence(reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_fenced_payloads_parse_identically() {
        let bare = r#"{"html":"x","css":"y"}"#;
        let fenced = "```json\n{\"html\":\"x\",\"css\":\"y\"}\n```";
        let expected = EditResponse {
            html: "x".to_string(),
            css: "y".to_string(),
        };
        assert_eq!(parse_edit_response(bare).unwrap(), expected);
        assert_eq!(parse_edit_response(fenced).unwrap(), expected);
    }

    #[test]
    fn fence_without_info_string_is_stripped() {
        let reply = "```\n{\"html\":\"a\",\"css\":\"b\"}\n```";
        let parsed = parse_edit_response(reply).unwrap();
        assert_eq!(parsed.html, "a");
        assert_eq!(parsed.css, "b");
    }

    #[test]
    fn strip_is_idempotent() {
        let fenced = "```json\n{\"html\":\"x\",\"css\":\"y\"}\n```";
        let once = strip_code_fence(fenced);
        assert_eq!(strip_code_fence(once), once);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let reply = r#"{"html":"x","css":"y","note":"ok"}"#;
        assert!(parse_edit_response(reply).is_ok());
    }

    #[test]
    fn missing_or_mistyped_fields_fail() {
        assert!(parse_edit_response(r#"{"html":"x"}"#).is_err());
        assert!(parse_edit_response(r#"{"html":1,"css":"y"}"#).is_err());
        assert!(parse_edit_response("not json").is_err());
    }
}
