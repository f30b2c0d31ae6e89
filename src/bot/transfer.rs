//! End-to-end handling of one inbound attachment: size gate, download from
//! Telegram into the spool, relay to GoFile, final render, cleanup.

use std::sync::Arc;

use futures::StreamExt;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{info, warn};
use url::Url;

use crate::AppContext;
use crate::bot::render::{self, TransferPhase};
use crate::bot::status::{StatusMessage, StatusSink, spawn_progress_editor};
use crate::core::{
    ProgressCallback, ProgressSample, ProgressTracker, RelayError, Result, TransferTask,
    exceeds_size_limit,
};

/// File metadata pulled from a document, video, or audio message.
struct Attachment {
    file_id: String,
    file_name: String,
    size: u64,
}

impl Attachment {
    fn from_message(msg: &Message) -> Option<Self> {
        if let Some(doc) = msg.document() {
            return Some(Self {
                file_id: doc.file.id.clone(),
                file_name: declared_name(doc.file_name.as_deref(), &doc.file.unique_id),
                size: u64::from(doc.file.size),
            });
        }
        if let Some(video) = msg.video() {
            return Some(Self {
                file_id: video.file.id.clone(),
                file_name: declared_name(video.file_name.as_deref(), &video.file.unique_id),
                size: u64::from(video.file.size),
            });
        }
        if let Some(audio) = msg.audio() {
            return Some(Self {
                file_id: audio.file.id.clone(),
                file_name: declared_name(audio.file_name.as_deref(), &audio.file.unique_id),
                size: u64::from(audio.file.size),
            });
        }
        None
    }
}

// Telegram allows nameless attachments; fall back to the stable file id.
fn declared_name(file_name: Option<&str>, unique_id: &str) -> String {
    match file_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("file-{unique_id}"),
    }
}

pub(super) fn has_attachment(msg: Message) -> bool {
    msg.document().is_some() || msg.video().is_some() || msg.audio().is_some()
}

pub(super) async fn handle_attachment(
    bot: Bot,
    msg: Message,
    ctx: Arc<AppContext>,
) -> ResponseResult<()> {
    let Some(attachment) = Attachment::from_message(&msg) else {
        return Ok(());
    };

    let status = Arc::new(
        StatusMessage::reply_to(
            bot.clone(),
            &msg,
            &render::processing(&attachment.file_name, attachment.size),
        )
        .await?,
    );

    // Declared-size gate; nothing touches the disk before this passes.
    if exceeds_size_limit(attachment.size) {
        info!(file = %attachment.file_name, size = attachment.size, "attachment over the size limit");
        status
            .set_text(&render::size_limit_exceeded(attachment.size))
            .await?;
        return Ok(());
    }

    let task = match TransferTask::create(&attachment.file_name, attachment.size) {
        Ok(task) => task,
        Err(err) => {
            warn!(error = %err, "could not create spool file");
            status.set_text(&render::failed(&err)).await?;
            return Ok(());
        }
    };

    info!(
        task = %task.id,
        file = %task.file_name,
        size = task.total_size,
        created = %task.created_at,
        "transfer accepted"
    );

    let outcome = relay(&bot, &ctx, &task, Arc::clone(&status), &attachment.file_id).await;

    match &outcome {
        Ok(link) => {
            status
                .set_text_with_keyboard(
                    &render::completed(&task.file_name, task.total_size, link),
                    completion_keyboard(link),
                )
                .await?;
            info!(task = %task.id, %link, elapsed = ?task.elapsed(), "transfer completed");
        }
        Err(err) => {
            warn!(task = %task.id, error = %err, "transfer failed");
            status.set_text(&render::failed(err)).await?;
        }
    }

    // The spool is dropped-and-deleted on any early return above; this is
    // the eager path that also surfaces removal errors.
    if let Err(err) = task.finish() {
        warn!(error = %err, "spool cleanup failed");
    }

    Ok(())
}

/// Download leg then upload leg, strictly sequential. Any error is terminal
/// for this transfer.
async fn relay(
    bot: &Bot,
    ctx: &AppContext,
    task: &TransferTask,
    status: Arc<StatusMessage>,
    file_id: &str,
) -> Result<Url> {
    download_from_telegram(bot, task, Arc::clone(&status), file_id).await?;

    status
        .set_text(&render::uploading(&task.file_name, task.total_size))
        .await?;

    let (tracker, editor) = progress_leg(task, status, TransferPhase::Uploading);
    let outcome = ctx
        .gofile
        .upload(task.spool_path(), &task.file_name, Some(tracker))
        .await;

    // The tracker (and with it the sample sender) died with the upload
    // body; wait for the editor so no stale tick lands after the final edit.
    let _ = editor.await;

    outcome
}

async fn download_from_telegram(
    bot: &Bot,
    task: &TransferTask,
    status: Arc<StatusMessage>,
    file_id: &str,
) -> Result<()> {
    let file = bot.get_file(file_id.to_string()).await?;

    let (tracker, editor) = progress_leg(task, status, TransferPhase::Downloading);
    let outcome = write_stream(bot, &file.path, task, &tracker).await;

    drop(tracker);
    let _ = editor.await;

    outcome
}

async fn write_stream(
    bot: &Bot,
    remote_path: &str,
    task: &TransferTask,
    tracker: &ProgressTracker,
) -> Result<()> {
    let mut spool = File::create(task.spool_path()).await?;
    let mut stream = bot.download_file_stream(remote_path);
    let mut received: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        received += chunk.len() as u64;

        // Declared sizes are metadata; hold the ceiling against what
        // actually arrives.
        if exceeds_size_limit(received) {
            return Err(RelayError::SizeLimit { size: received });
        }

        spool.write_all(&chunk).await?;
        tracker.record_bytes(chunk.len() as u64);
    }

    spool.flush().await?;
    Ok(())
}

/// Tracker + editor-task pair for one transfer leg. The editor ends when
/// the tracker is dropped.
fn progress_leg(
    task: &TransferTask,
    status: Arc<StatusMessage>,
    phase: TransferPhase,
) -> (Arc<ProgressTracker>, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let file_name = task.file_name.clone();
    let editor = spawn_progress_editor(status as Arc<dyn StatusSink>, rx, move |sample| {
        render::progress(phase, &file_name, sample)
    });

    let callback: ProgressCallback = Arc::new(move |sample: ProgressSample| {
        let _ = tx.send(sample);
    });
    let tracker = Arc::new(ProgressTracker::new(task.total_size, callback));

    (tracker, editor)
}

fn completion_keyboard(link: &Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::url("📥 Download Now", link.clone())]])
}
