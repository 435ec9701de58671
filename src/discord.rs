//! Discord gateway integration.
//!
//! Bridges [serenity] message events to the [`CommandHandler`] and renders its [`Reply`] as a
//! message embed in the channel the command came from.

use crate::command::{BotIdentity, IncomingMessage};
use crate::error::Error;
use crate::handler::CommandHandler;
use crate::reply::Reply;
use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::client::{Context, EventHandler};
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::Client;

/// Guild and direct messages, with content, are all the bot reads.
pub const INTENTS: GatewayIntents = GatewayIntents::GUILD_MESSAGES
    .union(GatewayIntents::DIRECT_MESSAGES)
    .union(GatewayIntents::MESSAGE_CONTENT);

/// Resolve the bot's own user. Must be called before the gateway client is built so that the
/// [`CommandHandler`] is complete before the first message arrives.
pub async fn identity(http: &Http) -> Result<BotIdentity, Error> {
    let user = http.get_current_user().await?;
    Ok(BotIdentity::new(user.id.get(), user.name.clone()))
}

pub async fn client(token: &str, handler: CommandHandler) -> Result<Client, Error> {
    Ok(Client::builder(token, INTENTS)
        .event_handler(DiscordHandler { handler })
        .await?)
}

pub fn embed(reply: &Reply) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&reply.title)
        .colour(reply.colour)
        .fields(
            reply
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.value.clone(), f.inline)),
        )
        .footer(CreateEmbedFooter::new(&reply.footer));
    if let Some(description) = &reply.description {
        embed = embed.description(description);
    }
    if let Some(url) = &reply.url {
        embed = embed.url(url);
    }
    embed
}

struct DiscordHandler {
    handler: CommandHandler,
}

#[serenity::async_trait]
impl EventHandler for DiscordHandler {
    async fn message(&self, ctx: Context, msg: Message) {
        let incoming = IncomingMessage {
            author_id: msg.author.id.get(),
            channel_id: msg.channel_id.get(),
            content: msg.content,
        };
        let Some(reply) = self.handler.handle(&incoming).await else {
            return;
        };
        let message = CreateMessage::new().embed(embed(&reply));
        if let Err(err) = msg.channel_id.send_message(&ctx.http, message).await {
            tracing::warn!(
                "could not send reply to channel {}: {err}",
                incoming.channel_id
            );
        }
    }

    async fn ready(&self, _: Context, ready: Ready) {
        tracing::info!(
            "connected as {} in {} guilds",
            ready.user.name,
            ready.guilds.len()
        );
    }
}
