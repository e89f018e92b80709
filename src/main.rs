use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    config::SyncSettings,
    event_handler::Ctx,
    ruma::events::room::message::{MessageType, OriginalSyncRoomMessageEvent},
    Room,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ranklist_bot::client::{connect, RoomSink};
use ranklist_bot::config::{BotConfig, Cli};
use ranklist_bot::fetch::ReportClient;
use ranklist_bot::report::ReportResponder;
use ranklist_bot::responder::{OutboundSink, ResponderContext};
use ranklist_bot::responder_manager::ResponderManager;
use ranklist_bot::responders::boxoffice::BoxOfficeSource;
use ranklist_bot::responders::hotsearch::HotSearchSource;
use ranklist_bot::responders::pingpong::PingPongResponder;
use ranklist_bot::responders::weather::WeatherSource;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ranklist_bot=info,matrix_sdk=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Ranklist Bot");

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BotConfig::load(&cli)?;

    let report_client = Arc::new(ReportClient::new(&config.api_base, config.timeout)?);

    let mut manager = ResponderManager::new();
    manager.register(Arc::new(PingPongResponder::new()));
    manager.register(Arc::new(ReportResponder::new(
        BoxOfficeSource,
        report_client.clone(),
    )));
    manager.register(Arc::new(ReportResponder::new(
        HotSearchSource,
        report_client.clone(),
    )));
    manager.register(Arc::new(ReportResponder::new(WeatherSource, report_client)));
    info!("✓ {} responders registered", manager.count());

    info!("Connecting to homeserver: {}", config.homeserver);
    let client = connect(&config).await?;

    // Register event handler for room messages
    client.add_event_handler_context(Arc::new(manager));
    client.add_event_handler(on_room_message);

    info!("Starting sync loop...");

    // Start syncing
    client
        .sync(SyncSettings::default())
        .await
        .context("Sync loop failed")?;

    Ok(())
}

/// Event handler for room messages
async fn on_room_message(
    event: OriginalSyncRoomMessageEvent,
    room: Room,
    manager: Ctx<Arc<ResponderManager>>,
) {
    // Get the sender's user ID
    let sender = &event.sender;

    // Ignore messages from ourselves to prevent echo loops
    if sender == room.own_user_id() {
        return;
    }

    // Extract message content
    let MessageType::Text(text_content) = &event.content.msgtype else {
        // Only text commands are handled
        return;
    };

    let room_id = room.room_id().to_owned();
    let sink = Arc::new(RoomSink::new(room));
    let context = ResponderContext {
        sender: sender.to_string(),
        message_body: text_content.body.clone(),
        outbound: sink.clone(),
    };

    info!(
        room_id = %room_id,
        sender = %context.sender,
        "Received message"
    );

    match manager.process_message(&context).await {
        Ok(Some(reply)) => {
            if let Err(e) = sink.send(reply).await {
                error!(
                    room_id = %room_id,
                    error = %e,
                    "✗ Failed to deliver reply"
                );
            }
        }
        Ok(None) => {}
        Err(e) => {
            error!(
                room_id = %room_id,
                error = %e,
                "✗ Responder pipeline failed"
            );
        }
    }
}
