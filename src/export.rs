//! Note export (plain text / Markdown files) and share links.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::html::{self, Token};
use crate::store::{Note, NoteId, UNTITLED_NOTE};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    PlainText,
    Markdown,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::PlainText, ExportFormat::Markdown]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::PlainText => "Plain text (.txt)",
            ExportFormat::Markdown => "Markdown (.md)",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::PlainText => "txt",
            ExportFormat::Markdown => "md",
        }
    }
}

pub fn render(note: &Note, format: ExportFormat) -> String {
    match format {
        ExportFormat::PlainText => html::visible_text(&note.content),
        ExportFormat::Markdown => to_markdown(&note.content),
    }
}

/// Convert note HTML into Markdown.
///
/// Handles `h2`/`h3`, paragraphs, bold/italic, unordered list items and line
/// breaks; any other markup is dropped and only its text kept.
pub fn to_markdown(content: &str) -> String {
    let mut out = String::new();

    for token in html::visible_tokens(content) {
        match token {
            Token::Text(text) => out.push_str(&html::decode_entities(text)),
            Token::Tag(tag) => match (tag.name.as_str(), tag.closing) {
                ("h2", false) => out.push_str("## "),
                ("h3", false) => out.push_str("### "),
                ("b" | "strong", _) => out.push_str("**"),
                ("i" | "em", _) => out.push_str("*"),
                ("li", false) => out.push_str("- "),
                ("li", true) | ("br", _) => out.push('\n'),
                ("ul" | "ol", true) => out.push('\n'),
                ("p" | "div", true) => out.push_str("\n\n"),
                ("iframe", false) => {
                    if let Some(src) = tag.attr("src") {
                        out.push_str(&format!("<{}>", src));
                    }
                }
                (_, true) if tag.is_heading().is_some() => out.push_str("\n\n"),
                _ => {}
            },
        }
    }

    tidy_markdown(&out)
}

fn trailing_spaces_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+\n").expect("static regex"))
}

fn blank_runs_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"))
}

fn tidy_markdown(text: &str) -> String {
    let text = trailing_spaces_regex().replace_all(text, "\n");
    let text = blank_runs_regex().replace_all(&text, "\n\n");
    text.trim_start().to_string()
}

/// File name derived from the note title: path-hostile characters become `_`.
pub fn file_name(title: &str, format: ExportFormat) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim();
    let stem = if cleaned.is_empty() { UNTITLED_NOTE } else { cleaned };
    format!("{}.{}", stem, format.extension())
}

/// Write the exported note into `dir`, creating it if needed.
pub fn write(note: &Note, format: ExportFormat, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(file_name(&note.title, format));
    fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, render(note, format)).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    log::info!("exported note {} to {}", note.id, path.display());
    Ok(path)
}

pub fn share_link(base_url: &str, id: &NoteId) -> String {
    format!("{}/share/{}", base_url.trim_end_matches('/'), id)
}

pub fn copy_to_clipboard(text: &str) -> Result<(), ExportError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| ExportError::Clipboard(e.to_string()))
}
