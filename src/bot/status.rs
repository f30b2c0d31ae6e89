//! The single status message edited in place through one transfer.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::payloads::{EditMessageTextSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardMarkup, LinkPreviewOptions, MessageId, ParseMode, ReplyParameters,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::ProgressSample;

/// Where progress renders land. Implementations swallow their own delivery
/// failures: an unavailable display never aborts a transfer.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn update(&self, text: &str);
}

pub fn disabled_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

pub struct StatusMessage {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl StatusMessage {
    /// Reply to `msg` and keep the handle for later in-place edits.
    pub async fn reply_to(bot: Bot, msg: &Message, text: &str) -> Result<Self, teloxide::RequestError> {
        let sent = bot
            .send_message(msg.chat.id, text)
            .parse_mode(ParseMode::Html)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;

        Ok(Self {
            bot,
            chat_id: sent.chat.id,
            message_id: sent.id,
        })
    }

    /// State-transition edit; failures propagate to the caller.
    pub async fn set_text(&self, text: &str) -> Result<(), teloxide::RequestError> {
        self.bot
            .edit_message_text(self.chat_id, self.message_id, text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(disabled_preview())
            .await?;
        Ok(())
    }

    pub async fn set_text_with_keyboard(
        &self,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<(), teloxide::RequestError> {
        self.bot
            .edit_message_text(self.chat_id, self.message_id, text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(disabled_preview())
            .reply_markup(keyboard)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StatusSink for StatusMessage {
    async fn update(&self, text: &str) {
        // Progress ticks are best effort; Telegram throttling or a deleted
        // status message must not fail the transfer.
        if let Err(err) = self.set_text(text).await {
            debug!(error = %err, "status edit dropped");
        }
    }
}

/// Drains progress samples into the sink, coalescing to the newest sample
/// so a slow edit can never build a backlog. Ends when the sender side of
/// the channel is gone.
pub fn spawn_progress_editor<R>(
    sink: Arc<dyn StatusSink>,
    mut samples: mpsc::UnboundedReceiver<ProgressSample>,
    render: R,
) -> JoinHandle<()>
where
    R: Fn(&ProgressSample) -> String + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(sample) = samples.recv().await {
            let mut latest = sample;
            while let Ok(newer) = samples.try_recv() {
                latest = newer;
            }
            sink.update(&render(&latest)).await;
        }
    })
}
