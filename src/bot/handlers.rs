//! Update handlers bridging Telegram messages and the turn orchestrator.

use std::sync::Arc;

use log::{debug, error, info};
use teloxide::{
    payloads::SendMessageSetters,
    prelude::*,
    types::{ChatAction, ForceReply, ParseMode, User},
    utils::html,
};

use crate::error::Result;
use crate::orchestrator::{Event, Reply};

use super::photo::download_largest;
use super::{Command, Orchestrator};

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    orchestrator: Arc<Orchestrator>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    info!("Received {cmd:?} command from user {}", user.id);

    let reply = orchestrator.handle(user.id.0, cmd.into()).await;
    send_reply(&bot, &msg, user, reply).await
}

pub async fn handle_text(bot: Bot, msg: Message, orchestrator: Arc<Orchestrator>) -> Result<()> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };
    info!(
        "Received message from user {} in chat {}: {}",
        user.id, msg.chat.id, text
    );

    broadcast_typing(&bot, &msg).await;
    let reply = orchestrator
        .handle(user.id.0, Event::Text(text.to_string()))
        .await;
    send_reply(&bot, &msg, user, reply).await
}

pub async fn handle_photo(bot: Bot, msg: Message, orchestrator: Arc<Orchestrator>) -> Result<()> {
    let (Some(user), Some(sizes)) = (msg.from.as_ref(), msg.photo()) else {
        return Ok(());
    };
    info!(
        "Received photo from user {} in chat {}",
        user.id, msg.chat.id
    );

    broadcast_typing(&bot, &msg).await;
    let reply = match download_largest(&bot, sizes).await {
        Ok(Some(bytes)) => orchestrator.handle(user.id.0, Event::Image(bytes)).await,
        Ok(None) => return Ok(()),
        Err(e) => {
            error!("Failed to download photo from user {}: {e}", user.id);
            Reply::Text(e.user_message())
        }
    };
    send_reply(&bot, &msg, user, reply).await
}

async fn send_reply(bot: &Bot, msg: &Message, user: &User, reply: Reply) -> Result<()> {
    match reply {
        Reply::Greeting => {
            bot.send_message(msg.chat.id, greeting(user))
                .parse_mode(ParseMode::Html)
                .reply_markup(ForceReply::new().selective())
                .await?;
            info!("Greeted user {} in chat {}", user.id, msg.chat.id);
        }
        Reply::Text(text) => {
            bot.send_message(msg.chat.id, &text).await?;
            info!("Replied to user {} in chat {}: {}", user.id, msg.chat.id, text);
        }
    }
    Ok(())
}

async fn broadcast_typing(bot: &Bot, msg: &Message) {
    if let Err(e) = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await {
        debug!("Failed to broadcast typing indicator: {e}");
    }
}

fn greeting(user: &User) -> String {
    format!(
        "Hi {}! Welcome to the Plant Care AI Assistant bot!",
        html::user_mention(user.id, &user.full_name())
    )
}
