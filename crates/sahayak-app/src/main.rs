//! Sahayak application binary - composition root.
//!
//! 1. Parse CLI args and load configuration from TOML
//! 2. Initialise tracing
//! 3. Build the auth gate selected by config
//! 4. Build the answer service (HTTP backend, or the offline mock)
//! 5. Run the interactive chat, or a one-shot subcommand

mod cli;
mod commands;
mod repl;

use std::sync::Arc;

use clap::Parser;

use sahayak_chat::ChatController;
use sahayak_client::{AnswerService, HttpBackendClient, MockAnswerService};
use sahayak_core::config::{AuthMode, ChatConfig, SahayakConfig};
use sahayak_core::{build_auth_gate, AuthGate, AuthState};

use cli::{CliArgs, Command};
use repl::ChatDefaults;

/// Log sign-in changes pushed by the auth gate.
async fn watch_auth(auth: Arc<dyn AuthGate>) {
    let mut changes = auth.subscribe();
    while changes.changed().await.is_ok() {
        match &*changes.borrow_and_update() {
            AuthState::Authenticated(identity) => {
                tracing::info!(uid = %identity.uid, role = %identity.role, "Signed in");
            }
            AuthState::Anonymous => tracing::info!("Signed out"),
        }
    }
}

async fn run_chat<S: AnswerService + 'static>(
    chat: ChatConfig,
    service: S,
    auth: Arc<dyn AuthGate>,
    defaults: ChatDefaults,
    require_sign_in: bool,
) -> std::io::Result<()> {
    let controller = ChatController::new(chat, Arc::new(service));
    repl::run(controller, auth, defaults, require_sign_in).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = SahayakConfig::load_or_default(&config_file);

    // Tracing.
    let filter = args.resolve_log_filter(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Sahayak v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    config.backend.base_url = args.resolve_backend_url(&config.backend.base_url);
    if let Some(language) = &args.language {
        config.chat.language = language.clone();
    }

    let chat = match args.command() {
        Command::Chat => config.chat,
        Command::Features => {
            commands::print_features();
            return Ok(());
        }
        Command::Backend(command) => {
            let client = HttpBackendClient::new(&config.backend)?;
            commands::run(command, &client, &config.chat.language).await?;
            return Ok(());
        }
    };

    // Auth.
    let auth = build_auth_gate(&config.auth)?;
    let require_sign_in = config.auth.mode == AuthMode::Mock;
    let defaults = ChatDefaults {
        role: chat.user_role.clone(),
        language: chat.language.clone(),
        language_pinned: args.language.is_some(),
    };
    let auth_watcher = tokio::spawn(watch_auth(Arc::clone(&auth)));

    let result = if args.offline {
        tracing::info!("Offline mode: answers come from the local echo service");
        run_chat(chat, MockAnswerService::new(), Arc::clone(&auth), defaults, require_sign_in).await
    } else {
        let client = HttpBackendClient::new(&config.backend)?;
        tracing::info!(url = %client.base_url(), "Answer service ready");
        run_chat(chat, client, Arc::clone(&auth), defaults, require_sign_in).await
    };

    auth_watcher.abort();
    tracing::info!("Sahayak stopped");
    result?;
    Ok(())
}
