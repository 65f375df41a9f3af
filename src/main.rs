//! # Main Entry Point
//!
//! Initializes the application:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix, SQLite ledger
//! - Application: Classifier, Engine, Router, Composer
//!
//! The core is single-threaded and event-driven: each inbound room message is
//! classified and acted upon before the handler returns.

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipState, StrippedRoomMemberEvent},
        message::SyncRoomMessageEvent,
    },
};
use std::fs;
use std::sync::Arc;

use crate::application::router::{BotContext, MessageRouter};
use crate::domain::config::AppConfig;
use crate::domain::traits::{ChatProvider, LedgerStore};
use crate::domain::types::IncomingMessage;
use crate::infrastructure::matrix::{MatrixService, bridge_attachment, snapshot_directory};
use crate::infrastructure::store::SqliteLedger;

#[derive(Parser, Debug)]
#[command(name = "headmaster", about = "House points moderation bot")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "data/config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config_content =
        fs::read_to_string(&cli.config).with_context(|| format!("Failed to read {}", cli.config))?;
    let config: AppConfig =
        serde_yaml::from_str(&config_content).context("Failed to parse config file")?;

    // 2. Logging Setup
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn",
        )
    });

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();

    tracing::info!("Starting headmaster...");

    // 3. Open the ledger
    let store: Arc<SqliteLedger> =
        Arc::new(SqliteLedger::open(&config.bot.db_path).context("Failed to open ledger store")?);

    // 4. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("Logged in as {}", config.services.matrix.username);

    let start_time = std::time::SystemTime::now();

    // 5. First-Run Check
    // Once the initial sync has populated the room list, welcome the school
    // if this ledger has never run before, and stamp the run time either way.
    let startup_client = client.clone();
    let startup_store = store.clone();
    let startup_config = config.clone();
    tokio::spawn(async move {
        let timeout = std::time::Duration::from_secs(60);
        let start = std::time::Instant::now();

        loop {
            if start.elapsed() > timeout {
                tracing::warn!("First-run check timed out: no joined rooms found after 60s.");
                break;
            }

            let rooms = startup_client.joined_rooms();
            if rooms.is_empty() {
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                continue;
            }

            let home = rooms
                .iter()
                .find(|r| {
                    startup_config.bot.home_channel.as_deref() == Some(r.room_id().as_str())
                })
                .or_else(|| rooms.first())
                .cloned();

            match startup_store.get_info("lastrun").await {
                Ok(None) => {
                    if let Some(room) = home {
                        let chat = MatrixService::new(room);
                        if let Err(e) = chat
                            .send_message(crate::strings::messages::WELCOME_BANNER)
                            .await
                        {
                            tracing::error!("Failed to send welcome banner: {e}");
                        }
                    }
                }
                Ok(Some(_)) => {}
                Err(e) => tracing::error!("First-run check failed: {e}"),
            }

            let now = chrono::Utc::now().to_rfc3339();
            if let Err(e) = startup_store.set_info("lastrun", &now).await {
                tracing::error!("Failed to stamp run time: {e}");
            }
            break;
        }
    });

    // 6. Event Loop
    let loop_config = config.clone();
    let loop_store = store.clone();

    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let config = loop_config.clone();
        let store = loop_store.clone();

        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };

            // Ignore events older than start_time
            let ts = original_msg.origin_server_ts;
            let event_time =
                std::time::UNIX_EPOCH + std::time::Duration::from_millis(ts.get().into());
            if event_time < start_time {
                return;
            }

            let matrix_sdk::ruma::events::room::message::MessageType::Text(text_content) =
                &original_msg.content.msgtype
            else {
                return;
            };
            let body = text_content.body.clone();
            tracing::debug!("Received message from {}: {}", original_msg.sender, body);

            let channel = room.room_id().as_str().to_string();
            let is_github_channel = config.bot.github_channel.as_deref() == Some(channel.as_str());

            let msg = IncomingMessage {
                kind: "message".to_string(),
                text: body.clone(),
                channel,
                sender: original_msg.sender.to_string(),
                attachments: if is_github_channel {
                    vec![bridge_attachment(&body)]
                } else {
                    Vec::new()
                },
            };

            let ctx = BotContext {
                bot_user_id: room.own_user_id().to_string(),
                bot_name: config.bot.name.clone(),
                trigger_word: config.bot.trigger_word.clone(),
                github_channel: config.bot.github_channel.clone(),
                system_user: config.bot.system_user.clone(),
                directory: snapshot_directory(&room).await,
                store: store.clone() as Arc<dyn LedgerStore>,
            };

            let chat = MatrixService::new(room);
            let router = MessageRouter::new(ctx);
            if let Err(e) = router.route(&chat, &msg).await {
                tracing::error!("Failed to route message: {e}");
            }
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            let _ = room.join().await;
        }
    });

    // 7. Sync forever
    client.sync(SyncSettings::default()).await?;

    Ok(())
}
