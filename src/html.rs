//! Small HTML helpers for note content: tokenizing, text extraction and escaping.
//!
//! Note bodies are a narrow subset of HTML (paragraphs, headings, lists, inline
//! emphasis, embeds), so a flat tag/text tokenizer is all the structure needed.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Text(&'a str),
    Tag(Tag<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag<'a> {
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
    raw: &'a str,
}

impl<'a> Tag<'a> {
    fn parse(raw: &'a str) -> Self {
        let closing = raw.starts_with('/');
        let body = raw.trim_start_matches('/');
        let name: String = body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '!' || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();
        Self {
            name,
            closing,
            self_closing: raw.trim_end().ends_with('/'),
            raw,
        }
    }

    pub fn is_open(&self, name: &str) -> bool {
        !self.closing && self.name == name
    }

    pub fn is_close(&self, name: &str) -> bool {
        self.closing && self.name == name
    }

    pub fn is_heading(&self) -> Option<u8> {
        let mut chars = self.name.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('h'), Some(d @ '1'..='6'), None) => d.to_digit(10).map(|d| d as u8),
            _ => None,
        }
    }

    /// Value of a quoted attribute, e.g. `src` in `<iframe src="...">`.
    pub fn attr(&self, key: &str) -> Option<&'a str> {
        let mut rest = self.raw;
        loop {
            let pos = rest.find(key)?;
            let before_ok = pos == 0
                || rest[..pos]
                    .chars()
                    .next_back()
                    .map(|c| c.is_whitespace())
                    .unwrap_or(true);
            let after = rest[pos + key.len()..].trim_start();
            if before_ok {
                if let Some(after_eq) = after.strip_prefix('=') {
                    let after_eq = after_eq.trim_start();
                    let quote = after_eq.chars().next()?;
                    if quote == '"' || quote == '\'' {
                        let value = &after_eq[1..];
                        let end = value.find(quote)?;
                        return Some(&value[..end]);
                    }
                }
            }
            rest = &rest[pos + key.len()..];
        }
    }
}

/// Split `html` into text runs and tags. A `<` that does not start a tag is kept as text.
pub fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            tokens.push(Token::Text(rest));
            break;
        };

        let starts_tag = rest[lt + 1..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
            .unwrap_or(false);
        let close = rest[lt..].find('>');

        match (starts_tag, close) {
            (true, Some(gt)) => {
                if lt > 0 {
                    tokens.push(Token::Text(&rest[..lt]));
                }
                let raw = &rest[lt + 1..lt + gt];
                tokens.push(Token::Tag(Tag::parse(raw)));
                rest = &rest[lt + gt + 1..];
            }
            _ => {
                tokens.push(Token::Text(&rest[..lt + 1]));
                rest = &rest[lt + 1..];
            }
        }
    }

    tokens
}

/// Tokens with `<script>`/`<style>` elements and comments removed.
pub fn visible_tokens(html: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut skipping: Option<String> = None;

    for token in tokenize(html) {
        if let Some(name) = &skipping {
            if let Token::Tag(tag) = &token {
                if tag.is_close(name) {
                    skipping = None;
                }
            }
            continue;
        }
        match &token {
            Token::Tag(tag) if !tag.closing && (tag.name == "script" || tag.name == "style") => {
                if !tag.self_closing {
                    skipping = Some(tag.name.clone());
                }
            }
            Token::Tag(tag) if tag.name.starts_with('!') => {}
            _ => out.push(token),
        }
    }

    out
}

/// Concatenated text of the document, like a DOM `textContent` read.
pub fn strip_html(html: &str) -> String {
    visible_tokens(html)
        .into_iter()
        .filter_map(|token| match token {
            Token::Text(text) => Some(decode_entities(text)),
            Token::Tag(_) => None,
        })
        .collect()
}

/// Plain-text preview of the first `len` characters of the content.
pub fn snippet(html: &str, len: usize) -> String {
    strip_html(html).chars().take(len).collect()
}

/// Text as a reader sees it: block boundaries become line breaks.
pub fn visible_text(html: &str) -> String {
    let mut out = String::new();
    for token in visible_tokens(html) {
        match token {
            Token::Text(text) => out.push_str(&decode_entities(text)),
            Token::Tag(tag) => {
                let breaks_line = tag.name == "br"
                    || (tag.closing
                        && (matches!(tag.name.as_str(), "p" | "div" | "li" | "ul" | "ol")
                            || tag.is_heading().is_some()));
                if breaks_line && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }
    out.trim_end().to_string()
}

pub fn escape(text: &str) -> String {
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

/// Wrap each non-empty line of plain text in a paragraph.
pub fn paragraphs(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", escape(line)))
        .collect()
}

/// Byte spans of every tag (including its angle brackets) in `html`.
fn tag_spans(html: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for token in tokenize(html) {
        let len = match &token {
            Token::Text(text) => text.len(),
            Token::Tag(tag) => tag.raw.len() + 2,
        };
        if matches!(token, Token::Tag(_)) {
            spans.push(offset..offset + len);
        }
        offset += len;
    }
    spans
}

/// Shrink `range` so that neither end falls on or inside a tag.
///
/// Returns `None` when no text is left between the two ends.
pub fn text_bounds(html: &str, range: Range<usize>) -> Option<Range<usize>> {
    let spans = tag_spans(html);
    let (mut start, mut end) = (range.start, range.end.min(html.len()));

    while let Some(span) = spans.iter().find(|span| span.contains(&start)) {
        start = span.end;
    }
    while end > start {
        match spans.iter().find(|span| span.contains(&(end - 1))) {
            Some(span) => end = span.start,
            None => break,
        }
    }

    (start < end).then_some(start..end)
}

fn is_void(tag: &Tag<'_>) -> bool {
    tag.self_closing
        || tag.name.starts_with('!')
        || matches!(tag.name.as_str(), "br" | "hr" | "img" | "input" | "meta" | "link")
}

/// Tags in `fragment` left unmatched inside it: stray closing tags first, then
/// opening tags still open at its end, so that re-emitting them after replaced
/// text keeps the surrounding document balanced.
pub fn dangling_tags(fragment: &str) -> String {
    let mut closers = Vec::new();
    let mut open: Vec<&Tag<'_>> = Vec::new();
    let tokens = tokenize(fragment);

    for token in &tokens {
        let Token::Tag(tag) = token else { continue };
        if is_void(tag) {
            continue;
        }
        if !tag.closing {
            open.push(tag);
        } else if let Some(pos) = open.iter().rposition(|o| o.name == tag.name) {
            open.truncate(pos);
        } else {
            closers.push(format!("</{}>", tag.name));
        }
    }

    let mut out = closers.concat();
    for tag in open {
        out.push('<');
        out.push_str(tag.raw);
        out.push('>');
    }
    out
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let semi = after.find(';').filter(|&i| i <= 10);

        let decoded = semi.and_then(|semi| decode_entity(&after[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_drops_markup() {
        assert_eq!(strip_html("<p>Hello</p>"), "Hello");
        assert_eq!(strip_html("<h2>A</h2><p>b <b>c</b></p>"), "Ab c");
    }

    #[test]
    fn test_script_and_style_are_dropped() {
        let html = "<style>p { color: red }</style><p>Hi</p><script>alert('x')</script>";
        assert_eq!(strip_html(html), "Hi");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(strip_html("<p>a &amp; b &lt;c&gt; &#65;&#x42;</p>"), "a & b <c> AB");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        assert_eq!(strip_html("<p>1 < 2</p>"), "1 < 2");
    }

    #[test]
    fn test_snippet_counts_chars() {
        let body = format!("<p>{}</p>", "é".repeat(150));
        assert_eq!(snippet(&body, 100).chars().count(), 100);
        assert_eq!(snippet("<p>short</p>", 100), "short");
    }

    #[test]
    fn test_visible_text_breaks_blocks() {
        let html = "<h2>Title</h2><p>One</p><ul><li>a</li><li>b</li></ul>";
        assert_eq!(visible_text(html), "Title\nOne\na\nb");
    }

    #[test]
    fn test_escape_and_paragraphs() {
        assert_eq!(escape("<b>&"), "&lt;b&gt;&amp;");
        assert_eq!(paragraphs("one\n\n two \n"), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_tag_attr() {
        let tokens = tokenize(r#"<iframe class="x" src="https://e/1"></iframe>"#);
        let Token::Tag(tag) = &tokens[0] else { panic!("expected tag") };
        assert_eq!(tag.name, "iframe");
        assert_eq!(tag.attr("src"), Some("https://e/1"));
        assert_eq!(tag.attr("missing"), None);
    }

    #[test]
    fn test_text_bounds_skip_cut_tags() {
        let html = "<p>Hello <b>big</b> world</p>";
        assert_eq!(text_bounds(html, 9..15), Some(12..15));
        assert_eq!(text_bounds(html, 10..20), Some(12..20));
        assert_eq!(text_bounds(html, 12..22), Some(12..22));
        assert_eq!(text_bounds(html, 15..19), None);
        assert_eq!(text_bounds(html, 0..3), None);
    }

    #[test]
    fn test_dangling_tags() {
        assert_eq!(dangling_tags("big</b> wor"), "</b>");
        assert_eq!(dangling_tags("g <i class=\"x\">wor"), "<i class=\"x\">");
        assert_eq!(dangling_tags("a <b>b</b><br> c"), "");
        assert_eq!(dangling_tags("x</b> y <em>z"), "</b><em>");
    }
}
