//! Telegram-facing surface: dispatcher wiring, transfer orchestration,
//! menus, and status editing.

mod menu;
mod render;
mod status;
mod transfer;

pub use status::{StatusMessage, StatusSink};

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::info;

use crate::AppContext;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    #[command(description = "show the welcome card")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
}

async fn handle_command(bot: Bot, msg: Message, command: Command) -> ResponseResult<()> {
    match command {
        Command::Start => menu::send_start(&bot, msg.chat.id).await,
        Command::Help => menu::send_help(&bot, msg.chat.id).await,
    }
}

/// Run the dispatcher until the process is stopped.
pub async fn run(bot: Bot, ctx: Arc<AppContext>) {
    info!("starting Telegram dispatcher");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            Update::filter_message()
                .filter(transfer::has_attachment)
                .endpoint(transfer::handle_attachment),
        )
        .branch(Update::filter_callback_query().endpoint(menu::handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
