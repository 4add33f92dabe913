use std::time::Duration;

use tracing::{debug, error, info, warn};

use page_core::PageDocument;

use crate::engine::{EngineHandle, EngineOptions};
use crate::error::EditError;
use crate::transcript::Transcript;
use crate::wire::{parse_edit_response, EditRequest, EditResponse};

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub system_prompt: String,
    pub options: EngineOptions,
    pub request_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.trim().to_string(),
            options: EngineOptions::default(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Where the controller is within an edit cycle. The phase field is the
/// mutual-exclusion invariant: every entry point checks it before doing
/// anything, so a second submission while a cycle is in flight is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    AwaitingModel,
    Parsing,
    Applying,
}

/// What a call to [`EditCycleController::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The reply parsed and the page was mutated.
    Applied(EditResponse),
    /// Whitespace-only instruction; nothing was sent.
    Empty,
    /// A cycle was already in flight; nothing was sent.
    Busy,
}

/// Drives one instruction through capture, completion, parse, and apply.
/// Owns the transcript and the engine handle; constructed once at startup
/// and borrowed by whatever front-end dispatches submissions.
pub struct EditCycleController {
    engine: EngineHandle,
    config: ControllerConfig,
    transcript: Transcript,
    phase: CyclePhase,
    last_error: Option<String>,
}

impl EditCycleController {
    pub fn new(engine: EngineHandle, config: ControllerConfig) -> Self {
        let transcript = Transcript::with_system_prompt(&config.system_prompt);
        Self {
            engine,
            config,
            transcript,
            phase: CyclePhase::Idle,
            last_error: None,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True when the engine is loaded and no cycle is in flight.
    pub fn is_ready(&self) -> bool {
        self.engine.is_available() && self.phase == CyclePhase::Idle
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Runs one edit cycle against `page`. Failures restore the transcript
    /// and settle back in `Idle`, so the caller may simply try again.
    pub async fn submit(
        &mut self,
        instruction: &str,
        page: &mut PageDocument,
    ) -> Result<SubmitOutcome, EditError> {
        if self.phase != CyclePhase::Idle {
            warn!(phase = ?self.phase, "submission ignored while a cycle is in flight");
            return Ok(SubmitOutcome::Busy);
        }
        let engine = self.engine.engine().map_err(|err| {
            error!(%err, "submission rejected");
            err
        })?;

        let instruction = instruction.trim();
        if instruction.is_empty() {
            debug!("ignoring empty instruction");
            return Ok(SubmitOutcome::Empty);
        }

        let request = EditRequest {
            instructions: instruction.to_string(),
            html: page.capture_html(),
            css: page.capture_css(),
        };
        let content = serde_json::to_string(&request).map_err(EditError::RequestEncode)?;
        self.transcript.push_user(content);
        self.phase = CyclePhase::AwaitingModel;
        info!(instruction, "edit cycle started");

        let call = engine.chat(self.transcript.messages(), &self.config.options);
        let reply = match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                error!(%err, "engine call failed");
                return Err(self.fail(EditError::EngineCall(err)));
            }
            Err(_) => {
                error!(timeout = ?self.config.request_timeout, "engine call timed out");
                return Err(self.fail(EditError::Timeout(self.config.request_timeout)));
            }
        };

        self.phase = CyclePhase::Parsing;
        let response = match parse_edit_response(&reply.text) {
            Ok(response) => response,
            Err(err) => {
                error!(%err, raw = %reply.text, "model reply was not a valid edit response");
                return Err(self.fail(EditError::ResponseParse(err)));
            }
        };
        self.transcript.push_assistant(reply.text);

        self.phase = CyclePhase::Applying;
        page.apply_edit(&response.html, &response.css);
        self.phase = CyclePhase::Idle;
        self.last_error = None;
        info!("edit cycle applied");
        Ok(SubmitOutcome::Applied(response))
    }

    /// Rolls the dangling user entry back and returns to `Idle` so the
    /// transcript stays balanced for subsequent calls.
    fn fail(&mut self, err: EditError) -> EditError {
        self.transcript.rollback_user();
        self.phase = CyclePhase::Idle;
        self.last_error = Some(err.to_string());
        err
    }

    #[cfg(test)]
    pub(crate) fn force_phase(&mut self, phase: CyclePhase) {
        self.phase = phase;
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"
You are an expert web developer helping the user change the current website.

Each user message will be a JSON object of the form:
{
    "instructions": User's instructions for what to change,
    "html": Current body HTML code,
    "css": Current CSS code
}

Your response must be a JSON object of the form:
{
    "html": New complete body HTML code based on the requested changes,
    "css": New complete CSS code based on the requested changes
}

Do not return anything else.
"#;
