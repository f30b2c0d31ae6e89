//! Static start/help content and the buttons that switch between them.

use teloxide::payloads::{EditMessageCaptionSetters, SendMessageSetters, SendPhotoSetters};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MaybeInaccessibleMessage,
    ParseMode,
};
use url::Url;

use super::status::disabled_preview;

pub const CALLBACK_HELP: &str = "help";
pub const CALLBACK_BACK: &str = "back_to_start";

const START_IMAGE_URL: &str = "https://keephere.ru/get/7NAjlJ_uBto/o/photo.jpg";

const START_CAPTION: &str = "<b>Welcome to the GoFile Uploader Bot!</b>\n\n\
Send me any file (video, audio, or document) and I will upload it to GoFile \
and hand back a share link.\n\n\
⚡ Max file size: 4 GB\n\
✅ Fast &amp; free";

const HELP_TEXT: &str = "📚 <b>GoFile Uploader Bot Help</b>\n\n\
1. <b>Upload files</b>\n\
   • Maximum file size: 4 GB\n\
   • Supported types: videos, audios, documents\n\n\
2. <b>Process</b>\n\
   • Download and upload progress is shown with a live progress bar\n\
   • You get the download link once the upload completes\n\n\
3. <b>Privacy</b>\n\
   • Uploads are reachable only through the link you share\n\n\
⚠️ Large files take longer; keep a stable connection during the transfer. \
GoFile removes files after long inactivity per its own policy.";

fn start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::callback("🤖 How to Use", CALLBACK_HELP)]])
}

fn help_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::callback("🔙 Back", CALLBACK_BACK)]])
}

/// Photo card with the welcome caption and the help button.
pub async fn send_start(bot: &Bot, chat_id: ChatId) -> ResponseResult<()> {
    let photo = InputFile::url(Url::parse(START_IMAGE_URL).expect("static start image URL"));
    bot.send_photo(chat_id, photo)
        .caption(START_CAPTION)
        .parse_mode(ParseMode::Html)
        .reply_markup(start_keyboard())
        .await?;
    Ok(())
}

pub async fn send_help(bot: &Bot, chat_id: ChatId) -> ResponseResult<()> {
    bot.send_message(chat_id, HELP_TEXT)
        .parse_mode(ParseMode::Html)
        .link_preview_options(disabled_preview())
        .await?;
    Ok(())
}

/// `help` / `back_to_start` button presses on the menu message.
pub async fn handle_callback(bot: Bot, query: CallbackQuery) -> ResponseResult<()> {
    bot.answer_callback_query(query.id.clone()).await?;

    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Some(message) = query
        .message
        .as_ref()
        .and_then(MaybeInaccessibleMessage::regular_message)
    else {
        return Ok(());
    };

    match data {
        CALLBACK_HELP => {
            bot.edit_message_caption(message.chat.id, message.id)
                .caption(HELP_TEXT)
                .parse_mode(ParseMode::Html)
                .reply_markup(help_keyboard())
                .await?;
        }
        CALLBACK_BACK => {
            // The original menu flow: drop the help card, post the start
            // card fresh.
            bot.delete_message(message.chat.id, message.id).await?;
            send_start(&bot, message.chat.id).await?;
        }
        _ => {}
    }

    Ok(())
}
