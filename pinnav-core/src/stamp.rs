// Version/update-time stamp in the page footer

use chrono::{Local, NaiveDateTime};

pub const DEFAULT_LABEL: &str = "静态导航页面";
pub const DEFAULT_VERSION: &str = "1.0";

/// Rewrites every `<label> v<version>... |` span (on one line) to
/// `<label> v<version> (更新时间: <at>) |`. Returns the new text and the
/// number of spans rewritten.
pub fn stamp_version(text: &str, label: &str, version: &str, at: NaiveDateTime) -> (String, usize) {
    let marker = format!("{} v", label);
    let stamp = format!(
        "{} v{} (更新时间: {}) |",
        label,
        version,
        at.format("%Y-%m-%d %H:%M:%S")
    );

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut replaced = 0;

    while let Some(found) = text[cursor..].find(&marker) {
        let start = cursor + found;
        match stamped_span_end(text, start + marker.len()) {
            Some(end) => {
                out.push_str(&text[cursor..start]);
                out.push_str(&stamp);
                cursor = end;
                replaced += 1;
            }
            None => {
                let skip = start + marker.len();
                out.push_str(&text[cursor..skip]);
                cursor = skip;
            }
        }
    }
    out.push_str(&text[cursor..]);

    (out, replaced)
}

/// Current local time, the clock used for page stamps.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// `version_at` must start with the version number; returns the index just
/// past the closing `|` on the same line.
fn stamped_span_end(text: &str, version_at: usize) -> Option<usize> {
    let rest = &text[version_at..];
    let digits = rest
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'.')
        .count();
    if digits == 0 {
        return None;
    }

    let tail = &rest[digits..];
    let line_end = tail.find('\n').unwrap_or(tail.len());
    tail[..line_end]
        .find('|')
        .map(|pipe| version_at + digits + pipe + 1)
}
