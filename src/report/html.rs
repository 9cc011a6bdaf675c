use crate::domain::model::{UpdateResult, UpdateStatus};
use crate::utils::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One before/after pair on the comparison page.
#[derive(Debug, Clone)]
pub struct ChangedEntry {
    pub name: String,
    pub location: String,
    /// Replaced reference; `None` when it was corrupt.
    pub before: Option<Vec<u8>>,
    pub after: Vec<u8>,
}

impl ChangedEntry {
    /// Builds the entry for a `Changed` result, reading the candidate from disk.
    pub async fn from_result(result: &UpdateResult) -> Result<Option<Self>> {
        if result.status != UpdateStatus::Changed {
            return Ok(None);
        }
        let after = tokio::fs::read(&result.candidate_image_path).await?;
        Ok(Some(Self {
            name: result.name.clone(),
            location: result.location.clone(),
            before: result.replaced_reference.clone(),
            after,
        }))
    }
}

pub fn render(entries: &[ChangedEntry]) -> String {
    let pairs: String = entries.iter().map(render_pair).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Image Comparison</title>
    <style>
        body {{font-family: Arial, sans-serif; margin: 20px;}}
        .container {{display: flex; flex-wrap: wrap; justify-content: space-around;}}
        .image-pair {{margin-bottom: 20px;}}
        img {{max-width: 100%; max-height: 200px;}}
        .missing {{display: inline-block; width: 300px; color: #a00;}}
        .caption {{text-align: center;}}
    </style>
</head>
<body>
    <h2>Image Comparison</h2>
    <div class="container">
{}    </div>
</body>
</html>
"#,
        pairs
    )
}

fn render_pair(entry: &ChangedEntry) -> String {
    let before = match &entry.before {
        Some(bytes) => image_tag(bytes, "Old Image"),
        None => r#"<span class="missing">Previous image was unreadable</span>"#.to_string(),
    };
    format!(
        "        <div class=\"image-pair\">\n            {}\n            {}\n            <p class=\"caption\">{} ({})</p>\n        </div>\n",
        before,
        image_tag(&entry.after, "New Image"),
        escape(&entry.name),
        escape(&entry.location)
    )
}

fn image_tag(bytes: &[u8], alt: &str) -> String {
    let mime = image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg");
    format!(
        r#"<img src="data:{};base64,{}" alt="{}">"#,
        mime,
        STANDARD.encode(bytes),
        alt
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Writes the comparison page when at least one location changed.
pub async fn write_report(path: &Path, results: &[UpdateResult]) -> Result<Option<PathBuf>> {
    let mut entries = Vec::new();
    for result in results {
        if let Some(entry) = ChangedEntry::from_result(result).await? {
            entries.push(entry);
        }
    }

    if entries.is_empty() {
        tracing::debug!("No changed locations, skipping HTML report");
        return Ok(None);
    }

    tokio::fs::write(path, render(&entries)).await?;
    tracing::info!("🖼️  Comparison page with {} entries written to {}", entries.len(), path.display());
    Ok(Some(path.to_path_buf()))
}

/// Opens `path` with the OS default handler. Failures are only logged.
pub fn open_in_browser(path: &Path) {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };

    match command.arg(path).spawn() {
        Ok(_) => tracing::debug!("Opened {}", path.display()),
        Err(e) => tracing::warn!("Could not open {}: {}", path.display(), e),
    }
}
