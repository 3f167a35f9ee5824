//! Host page with a single navigation data slot.
//!
//! The slot is the script declaration `const|let|var <name> = { ... };`. Its
//! object literal is delimited with a brace matcher that skips JS strings and
//! comments, so the rest of the page is carried over byte for byte. Pages
//! without a declaration get one after their first `<script>` tag, or in a
//! new script block before `</body>`.

use crate::error::{PinnavError, Result as PinnavResult, TemplateError};
use crate::model::NavigationMap;
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

pub const DEFAULT_SLOT: &str = "navigationData";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Const,
    Let,
    Var,
}

impl Declaration {
    pub fn keyword(&self) -> &'static str {
        match self {
            Declaration::Const => "const",
            Declaration::Let => "let",
            Declaration::Var => "var",
        }
    }

    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "const" => Some(Declaration::Const),
            "let" => Some(Declaration::Let),
            "var" => Some(Declaration::Var),
            _ => None,
        }
    }
}

/// Where the slot sits in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Replaces an existing declaration, keeping its keyword
    Declaration(Declaration),
    /// Inserted right after the first `<script>` tag
    AfterScriptTag,
    /// Inserted as a new script block before `</body>`
    BeforeBodyEnd,
}

#[derive(Debug, Clone)]
pub struct HostPage<'a> {
    source: &'a str,
    slot: String,
    span: Range<usize>,
    placement: Placement,
}

impl<'a> HostPage<'a> {
    pub fn parse(source: &'a str, slot: &str) -> Result<Self, TemplateError> {
        let scripts = script_elements(source);
        let (span, placement) = match find_declaration(source, &scripts, slot)? {
            Some((span, declaration)) => (span, Placement::Declaration(declaration)),
            None => {
                if let Some(script) = scripts.iter().find(|script| !script.external) {
                    let at = script.body.start;
                    (at..at, Placement::AfterScriptTag)
                } else if let Some(at) = source.to_ascii_lowercase().find("</body>") {
                    (at..at, Placement::BeforeBodyEnd)
                } else {
                    return Err(TemplateError::SlotNotFound(slot.to_string()));
                }
            }
        };
        debug!(slot, ?placement, start = span.start, end = span.end, "located data slot");

        Ok(Self {
            source,
            slot: slot.to_string(),
            span,
            placement,
        })
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Byte range of the page the slot occupies (empty for insertions).
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The page with the slot filled with `map`; nothing else changes.
    pub fn render(&self, map: &NavigationMap) -> Result<String, TemplateError> {
        self.render_with(map, |text| text.to_string())
    }

    /// Like [`HostPage::render`], but the page text before and after the slot
    /// goes through `edit` first. The data itself is never edited.
    pub fn render_with<F>(&self, map: &NavigationMap, mut edit: F) -> Result<String, TemplateError>
    where
        F: FnMut(&str) -> String,
    {
        let json = map.to_json_pretty()?;
        let slot = match self.placement {
            Placement::Declaration(declaration) => {
                format!("{} {} = {};", declaration.keyword(), self.slot, json)
            }
            Placement::AfterScriptTag => format!("\nconst {} = {};\n", self.slot, json),
            Placement::BeforeBodyEnd => {
                format!("\n<script>\nconst {} = {};\n</script>\n", self.slot, json)
            }
        };

        let head = edit(&self.source[..self.span.start]);
        let tail = edit(&self.source[self.span.end..]);

        let mut page = String::with_capacity(head.len() + slot.len() + tail.len());
        page.push_str(&head);
        page.push_str(&slot);
        page.push_str(&tail);
        Ok(page)
    }
}

/// Parse `page` and fill its slot in one go.
pub fn inject(page: &str, slot: &str, map: &NavigationMap) -> Result<String, TemplateError> {
    HostPage::parse(page, slot)?.render(map)
}

/// Write a rendered page to `path` through a temp file in the same
/// directory, so a failed write leaves the previous page in place.
pub fn write_page(path: &Path, content: &str) -> PinnavResult<()> {
    let write_error = |source: std::io::Error| PinnavError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(content.as_bytes()).map_err(write_error)?;
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }
    file.persist(path).map_err(|err| write_error(err.error))?;

    debug!(path = %path.display(), bytes = content.len(), "wrote page");
    Ok(())
}

/// A `<script>` element found outside HTML comments.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScriptElement {
    /// From just past the opening tag to `</script` (or the end of the page)
    body: Range<usize>,
    /// Has a `src` attribute, so the browser ignores its body
    external: bool,
}

fn script_elements(source: &str) -> Vec<ScriptElement> {
    let lower = source.to_ascii_lowercase();
    let mut elements = Vec::new();
    let mut i = 0;

    while let Some(found) = lower[i..].find('<') {
        let at = i + found;
        let rest = &lower[at..];

        if rest.starts_with("<!--") {
            match rest.find("-->") {
                Some(close) => {
                    i = at + close + "-->".len();
                    continue;
                }
                None => break,
            }
        }

        let is_script_tag = rest
            .strip_prefix("<script")
            .and_then(|after| after.chars().next())
            .is_some_and(|c| c == '>' || c == '/' || c.is_ascii_whitespace());
        if !is_script_tag {
            i = at + 1;
            continue;
        }

        let Some(tag_end) = rest.find('>') else {
            break;
        };
        let attributes = &rest["<script".len()..tag_end];
        let body_start = at + tag_end + 1;
        let body_end = lower[body_start..]
            .find("</script")
            .map_or(lower.len(), |close| body_start + close);

        elements.push(ScriptElement {
            body: body_start..body_end,
            external: attributes
                .split(|c: char| c.is_ascii_whitespace())
                .any(|attr| attr == "src" || attr.starts_with("src=")),
        });
        i = body_end;
    }

    elements
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// When a JS string or comment starts at `i`, the index just past it
/// (`bytes.len()` if it never ends).
fn skip_string_or_comment(bytes: &[u8], i: usize) -> Option<usize> {
    match (bytes[i], bytes.get(i + 1)) {
        (quote @ (b'"' | b'\'' | b'`'), _) => {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j] != quote {
                if bytes[j] == b'\\' {
                    j += 1;
                }
                j += 1;
            }
            Some((j + 1).min(bytes.len()))
        }
        (b'/', Some(b'/')) => Some(
            bytes[i..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |newline| i + newline),
        ),
        (b'/', Some(b'*')) => Some(
            bytes[i + 2..]
                .windows(2)
                .position(|pair| pair == b"*/")
                .map_or(bytes.len(), |close| i + 2 + close + 2),
        ),
        _ => None,
    }
}

/// Finds `<keyword> <slot> = {...}` in the code of the inline scripts and
/// returns its span (with a trailing `;` when present) and keyword.
fn find_declaration(
    source: &str,
    scripts: &[ScriptElement],
    slot: &str,
) -> Result<Option<(Range<usize>, Declaration)>, TemplateError> {
    for script in scripts.iter().filter(|script| !script.external) {
        let bytes = &source.as_bytes()[..script.body.end];
        let mut i = script.body.start;

        while i < bytes.len() {
            if let Some(next) = skip_string_or_comment(bytes, i) {
                i = next;
                continue;
            }
            if !is_ident_byte(bytes[i]) {
                i += 1;
                continue;
            }

            let at = i;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            if &source[at..i] != slot {
                continue;
            }
            if let Some(found) = declaration_at(source, bytes, at, slot)? {
                return Ok(Some(found));
            }
        }
    }

    Ok(None)
}

/// Checks the identifier at `at` is declared with a keyword and initialized
/// with an object literal that closes within `bytes`.
fn declaration_at(
    source: &str,
    bytes: &[u8],
    at: usize,
    slot: &str,
) -> Result<Option<(Range<usize>, Declaration)>, TemplateError> {
    let before = source[..at].trim_end();
    let word_start = before
        .bytes()
        .rposition(|b| !is_ident_byte(b))
        .map_or(0, |i| i + 1);
    let Some(declaration) = Declaration::from_keyword(&before[word_start..]) else {
        return Ok(None);
    };

    let eq = skip_whitespace(bytes, at + slot.len());
    if bytes.get(eq) != Some(&b'=') {
        return Ok(None);
    }
    let open = skip_whitespace(bytes, eq + 1);
    if bytes.get(open) != Some(&b'{') {
        return Ok(None);
    }

    let close = find_object_end(bytes, open).ok_or_else(|| TemplateError::Unterminated {
        slot: slot.to_string(),
        offset: word_start,
    })?;

    let mut span_end = close;
    let mut cursor = close;
    while cursor < bytes.len() && (bytes[cursor] == b' ' || bytes[cursor] == b'\t') {
        cursor += 1;
    }
    if bytes.get(cursor) == Some(&b';') {
        span_end = cursor + 1;
    }

    Ok(Some((word_start..span_end, declaration)))
}

/// Index just past the `}` closing the object literal opened at `open`.
fn find_object_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        if let Some(next) = skip_string_or_comment(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}
