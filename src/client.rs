use anyhow::{Context, Result};
use async_trait::async_trait;
use matrix_sdk::{
    room::Room, ruma::events::room::message::RoomMessageEventContent, Client,
};
use tracing::info;

use crate::config::BotConfig;
use crate::responder::{OutboundMessage, OutboundSink, RenderMode};

/// Build a Matrix client and log in with password auth
pub async fn connect(config: &BotConfig) -> Result<Client> {
    let client = Client::builder()
        .homeserver_url(&config.homeserver)
        .build()
        .await
        .context("Failed to create Matrix client")?;

    info!("Logging in as: {}", config.username);
    client
        .matrix_auth()
        .login_username(&config.username, &config.password)
        .initial_device_display_name("Ranklist Bot")
        .await
        .context("Failed to login")?;

    info!("✓ Successfully logged in");
    Ok(client)
}

/// Outbound sink delivering messages into a Matrix room.
pub struct RoomSink {
    room: Room,
}

impl RoomSink {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl OutboundSink for RoomSink {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        let content = match message.render {
            RenderMode::Plain => RoomMessageEventContent::text_plain(message.body),
            RenderMode::Markdown => RoomMessageEventContent::text_markdown(message.body),
        };

        self.room
            .send(content)
            .await
            .context("Failed to send message to room")?;
        Ok(())
    }
}
