//! Edit-cycle orchestration for the page editor workspace. The crate owns
//! the conversation transcript, the JSON wire contract with the language
//! model, and the controller that turns a user instruction into a page
//! mutation via a single chat-completion round trip.

pub mod controller;
pub mod engine;
pub mod error;
pub mod transcript;
pub mod wire;

pub use controller::{ControllerConfig, CyclePhase, EditCycleController, SubmitOutcome};
pub use engine::{
    ChatEngine, ChatReply, ChatUsage, EngineConfig, EngineHandle, EngineLoader, EngineOptions,
};
pub use error::EditError;
pub use transcript::{ChatMessage, Role, Transcript};
pub use wire::{parse_edit_response, strip_code_fence, EditRequest, EditResponse};

/// Model identifier handed to the engine loader by default.
pub const DEFAULT_MODEL_ID: &str = "Qwen2.5-Coder-1.5B-Instruct-q4f16_1-MLC";
