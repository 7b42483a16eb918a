use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use regex::Regex;

const BULLET: &str = "• ";

static BOLD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").ok());

/// A run of text inside one line of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSpan {
    pub text: String,
    pub bold: bool,
}

impl MarkupSpan {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
        }
    }

    fn bold(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: true,
        }
    }
}

/// One line of a message, split on newline characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupLine {
    pub bullet: bool,
    pub spans: Vec<MarkupSpan>,
}

impl MarkupLine {
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML rendition of a message: `<br>` line breaks, `<li>` bullets and
/// `<strong>` emphasis. The message text itself is escaped first.
pub fn format_message(text: &str) -> String {
    let joined = lines(text)
        .map(|line| {
            let line = escape_html(line);
            match line.split_once(BULLET) {
                Some((before, item)) => format!("{}<li>{}</li>", before, item),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("<br>");

    match BOLD.as_ref() {
        Some(bold) => bold.replace_all(&joined, "<strong>$1</strong>").into_owned(),
        None => joined,
    }
}

fn parse_spans(text: &str, out: &mut Vec<MarkupSpan>) {
    let Some(bold) = BOLD.as_ref() else {
        out.push(MarkupSpan::plain(text));
        return;
    };

    let mut last = 0;
    for caps in bold.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(MarkupSpan::plain(&text[last..whole.start()]));
        }
        if !inner.as_str().is_empty() {
            out.push(MarkupSpan::bold(inner.as_str()));
        }
        last = whole.end();
    }
    if last < text.len() {
        out.push(MarkupSpan::plain(&text[last..]));
    }
}

/// Structured form of [`format_message`] for terminal renderers.
pub fn parse_markup(text: &str) -> Vec<MarkupLine> {
    lines(text)
        .map(|line| {
            let mut spans = Vec::new();
            match line.split_once(BULLET) {
                Some((before, item)) => {
                    parse_spans(before.trim_end(), &mut spans);
                    parse_spans(item, &mut spans);
                    MarkupLine {
                        bullet: true,
                        spans,
                    }
                }
                None => {
                    parse_spans(line, &mut spans);
                    MarkupLine {
                        bullet: false,
                        spans,
                    }
                }
            }
        })
        .collect()
}

/// Badge text for an agent label.
pub fn format_agent_name(agent: Option<&str>) -> String {
    match agent {
        None | Some("") => "🤖 AI Assistant".to_string(),
        Some("OrchestratorAgent") => "🧠 Orchestrator".to_string(),
        Some("StrategyAgent") => "📊 Strategy".to_string(),
        Some("CreativeAgent") => "🎨 Creative".to_string(),
        Some("ProductionAgent") => "⚙️ Production".to_string(),
        Some("MediaAgent") => "📣 Media".to_string(),
        Some(other) => format!("🤖 {}", other),
    }
}

/// `0x1234...abcd` form of a wallet address.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Reformat a backend timestamp (RFC 3339 or naive ISO 8601). Unparseable
/// input is returned as-is.
pub fn format_timestamp(raw: &str, format: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc).format(format).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(format).to_string();
    }
    raw.to_string()
}

/// Local `HH:MM` shown under a message.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}
