//! Headless front-end for the page editor: reads natural-language edit
//! instructions from stdin, drives the edit-cycle controller against an
//! in-memory demo page, and prints the resulting page state.

mod repl;

use std::io::Write as _;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use edit_agent::{
    ChatEngine, ControllerConfig, EditCycleController, EngineConfig, EngineHandle, EngineLoader,
    SubmitOutcome,
};
use engine_router::{EngineRouter, RoutingPolicy, ScriptedEngine};
use page_core::{PageDocument, StyleSheet};

use repl::{parse_command, Command};

/// Loader for the platform model runtime. No runtime ships with this
/// workspace yet, so loading reports the platform as unsupported and the
/// shell only becomes interactive through the scripted provider.
struct PlatformEngineLoader;

#[async_trait]
impl EngineLoader for PlatformEngineLoader {
    async fn load(&self, _config: &EngineConfig) -> Result<Arc<dyn ChatEngine>> {
        Err(anyhow!(
            "no compatible local model runtime is available on this platform"
        ))
    }
}

fn demo_page() -> PageDocument {
    let mut page = PageDocument::new(
        "<h1>Hello</h1>\n<p>Type an instruction to change this page.</p>",
    );
    page.add_stylesheet(StyleSheet::new(
        "base",
        vec![
            "body { font-family: sans-serif; }".to_string(),
            "h1 { color: navy; }".to_string(),
        ],
    ));
    page.add_stylesheet(StyleSheet::cross_origin("cdn-theme"));
    page
}

fn demo_script() -> ScriptedEngine {
    ScriptedEngine::with_replies([
        r#"{"html":"<h1>Hello</h1>\n<p>Edited by the scripted engine.</p>","css":"h1{color:crimson}"}"#
            .to_string(),
        "```json\n{\"html\":\"<h1>Hello again</h1>\",\"css\":\"h1{font-style:italic}\"}\n```"
            .to_string(),
    ])
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let offline = std::env::args().any(|arg| arg == "--offline");

    // One-time engine setup; a load failure leaves the handle unavailable
    // and the shell refuses submissions until restarted.
    let handle = EngineHandle::load(&PlatformEngineLoader, EngineConfig::default()).await;
    let config = handle.config().clone();

    let mut router = EngineRouter::new(handle);
    if offline {
        router = router.with_scripted(Arc::new(demo_script()));
    }

    let policy = RoutingPolicy {
        offline_only: offline,
        ..RoutingPolicy::default()
    };
    let engine = match router.route(policy) {
        Ok(engine) => EngineHandle::from_engine(engine, config),
        Err(err) => {
            error!(%err, "no engine provider available; input stays disabled");
            EngineHandle::unavailable(config)
        }
    };

    let mut controller = EditCycleController::new(engine, ControllerConfig::default());
    let mut page = demo_page();

    info!(ready = controller.is_ready(), "page editor shell started");
    println!("{}", page.capture_html());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if controller.is_ready() {
            print!("edit> ");
        } else {
            print!("   (input disabled) ");
        }
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Quit => break,
            Command::ShowPage => println!("{}", page.capture_html()),
            Command::ShowCss => println!("{}", page.capture_css()),
            Command::ShowEvents => {
                for event in page.events() {
                    println!("#{} {}", event.sequence, event.mutation.description());
                }
            }
            Command::ShowTranscript => {
                for message in controller.transcript().messages() {
                    println!("[{:?}] {}", message.role, message.content);
                }
            }
            Command::Instruction(instruction) => {
                match controller.submit(&instruction, &mut page).await {
                    Ok(SubmitOutcome::Applied(_)) => {
                        println!("{}", page.capture_html());
                    }
                    Ok(SubmitOutcome::Empty) => {}
                    Ok(SubmitOutcome::Busy) => {
                        warn!("a cycle is already in flight");
                    }
                    // Failures are logged by the controller; the prompt
                    // simply becomes available again.
                    Err(_) => {}
                }
            }
        }
    }

    Ok(())
}
