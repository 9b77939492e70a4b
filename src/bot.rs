//! Telegram bot runtime: configuration, command registration and update dispatch.

mod handlers;
mod photo;

use std::sync::Arc;

use log::{debug, info};
use teloxide::{
    dispatching::{Dispatcher, HandlerExt, UpdateFilterExt, UpdateHandler},
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    types::MessageEntityKind,
    utils::command::BotCommands,
};

use crate::chat::ChatClient;
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::orchestrator::{Event, TurnOrchestrator};
use crate::prediction::PredictionClient;
use crate::session::InMemorySessionStore;

pub(crate) type Orchestrator =
    TurnOrchestrator<InMemorySessionStore, PredictionClient, ChatClient>;

/// Commands registered with Telegram.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "start a new conversation.")]
    Start,
    #[command(description = "show how to use the bot.")]
    Help,
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        match command {
            Command::Start => Event::Init,
            Command::Help => Event::Help,
        }
    }
}

/// Run the Telegram bot until interrupted.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing gateway clients");
    let http = reqwest::Client::new();
    let orchestrator: Arc<Orchestrator> = Arc::new(TurnOrchestrator::new(
        Arc::new(InMemorySessionStore::new()),
        PredictionClient::new(http.clone(), config.prediction_url),
        ChatClient::new(http, config.chat_url, config.chat_model),
    ));

    let bot = Bot::new(config.bot_token);

    debug!("Registering bot commands");
    bot.set_my_commands(Command::bot_commands()).await?;
    info!("Commands registered successfully");

    info!("Starting dispatcher with long polling");
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![orchestrator])
        .default_handler(|update| async move {
            debug!("Unhandled update: {update:?}");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in update handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Dispatcher stopped");
    Ok(())
}

fn schema() -> UpdateHandler<BotError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handlers::handle_command),
        )
        .branch(dptree::filter(|msg: Message| is_photo(&msg)).endpoint(handlers::handle_photo))
        .branch(
            dptree::filter(|msg: Message| is_plain_text(&msg)).endpoint(handlers::handle_text),
        )
}

fn is_photo(msg: &Message) -> bool {
    msg.photo().is_some_and(|sizes| !sizes.is_empty())
}

/// Text that Telegram did not mark as a bot command. A leading `/` alone does
/// not make a command; only a `bot_command` entity at offset 0 does.
fn is_plain_text(msg: &Message) -> bool {
    msg.text().is_some() && !starts_with_command(msg)
}

fn starts_with_command(msg: &Message) -> bool {
    msg.entities().is_some_and(|entities| {
        entities
            .iter()
            .any(|entity| entity.offset == 0 && entity.kind == MessageEntityKind::BotCommand)
    })
}
