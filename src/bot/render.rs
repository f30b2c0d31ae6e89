//! User-visible message texts, rendered as Telegram HTML.

use teloxide::utils::html;
use url::Url;

use crate::core::{
    MAX_FILE_SIZE, ProgressSample, RelayError, format_eta, format_size, format_speed, render_bar,
};

/// Transfer leg shown in the progress headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Downloading,
    Uploading,
}

impl TransferPhase {
    fn headline(self) -> &'static str {
        match self {
            Self::Downloading => "⬇️ Downloading...",
            Self::Uploading => "⬆️ Uploading...",
        }
    }
}

fn file_header(file_name: &str, size: u64) -> String {
    format!(
        "📂 <b>File:</b> <code>{}</code>\n📦 <b>Size:</b> <code>{}</code>",
        html::escape(file_name),
        format_size(size)
    )
}

pub fn processing(file_name: &str, size: u64) -> String {
    format!(
        "📥 <b>Processing File</b>\n\n{}\n\n⚙️ Starting download...",
        file_header(file_name, size)
    )
}

pub fn size_limit_exceeded(size: u64) -> String {
    format!(
        "❌ File too large: <code>{}</code>. The limit is {}.",
        format_size(size),
        format_size(MAX_FILE_SIZE)
    )
}

pub fn progress(phase: TransferPhase, file_name: &str, sample: &ProgressSample) -> String {
    let eta = sample
        .eta()
        .map(format_eta)
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "{}\n\n<b>{}</b>\n{} <code>{:.2}%</code>\n⚡ <b>Speed:</b> <code>{}</code>\n⏱️ <b>ETA:</b> <code>{}</code>",
        file_header(file_name, sample.total_bytes),
        phase.headline(),
        render_bar(sample.percentage()),
        sample.percentage(),
        format_speed(sample.speed()),
        eta,
    )
}

pub fn uploading(file_name: &str, size: u64) -> String {
    format!(
        "📤 <b>Uploading to GoFile</b>\n\n{}\n\n⏳ Please wait...",
        file_header(file_name, size)
    )
}

pub fn completed(file_name: &str, size: u64, link: &Url) -> String {
    format!(
        "✅ <b>Upload Complete!</b>\n\n{}\n\n🔗 <b>Download Link:</b> {}",
        file_header(file_name, size),
        link
    )
}

/// Failure text carrying the error description verbatim.
pub fn failed(error: &RelayError) -> String {
    format!("❌ Upload failed: <code>{}</code>", html::escape(&error.to_string()))
}
