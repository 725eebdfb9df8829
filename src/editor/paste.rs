use std::sync::OnceLock;

use regex::Regex;

use super::FormatCommand;

fn video_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:https?://)?(?:www\.|m\.)?(?:youtu\.be/|youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/))([A-Za-z0-9_-]{11})(?:[?&#][^\s]*)?$",
        )
        .expect("static regex")
    })
}

/// The 11-character video id if `text` is a single short-form video link.
pub fn video_id(text: &str) -> Option<&str> {
    video_link_regex()
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn video_embed_html(id: &str) -> String {
    format!(
        "<div class=\"video-embed\" data-video-id=\"{id}\"><iframe src=\"https://www.youtube.com/embed/{id}\" title=\"YouTube video player\" frameborder=\"0\" allowfullscreen></iframe></div>"
    )
}

/// Decide what a paste inserts: an embed for video links, escaped plain text otherwise.
pub fn paste_command(clipboard_text: &str) -> Option<FormatCommand> {
    if clipboard_text.is_empty() {
        return None;
    }
    match video_id(clipboard_text) {
        Some(id) => Some(FormatCommand::InsertHtml(video_embed_html(id))),
        None => Some(FormatCommand::InsertText(clipboard_text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link() {
        assert_eq!(video_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_long_links() {
        assert_eq!(video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(video_id("youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=10"), Some("dQw4w9WgXcQ"));
        assert_eq!(video_id("https://youtube.com/shorts/abcdefghijk"), Some("abcdefghijk"));
        assert_eq!(video_id("  https://www.youtube.com/embed/dQw4w9WgXcQ  "), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_rejects_other_text() {
        assert_eq!(video_id("https://youtu.be/short"), None);
        assert_eq!(video_id("watch https://youtu.be/dQw4w9WgXcQ now"), None);
        assert_eq!(video_id("https://vimeo.com/123456789"), None);
    }

    #[test]
    fn test_paste_video_inserts_embed() {
        let Some(FormatCommand::InsertHtml(html)) = paste_command("https://youtu.be/dQw4w9WgXcQ") else {
            panic!("expected embed");
        };
        assert!(html.contains("data-video-id=\"dQw4w9WgXcQ\""));
        assert!(html.contains("https://www.youtube.com/embed/dQw4w9WgXcQ"));
    }

    #[test]
    fn test_paste_text_is_plain() {
        assert_eq!(
            paste_command("hello **world**"),
            Some(FormatCommand::InsertText("hello **world**".to_string()))
        );
        assert_eq!(paste_command(""), None);
    }
}
