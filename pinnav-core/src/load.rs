// Loading of pintree bookmark exports

use crate::error::LoadError;
use crate::model::{Document, MISSING_URL, Node, NodeIssue, NodeIssueKind, UNTITLED_FOLDER, UNTITLED_LINK};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Read and parse a bookmark export from disk
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_document(&text)?;
    debug!(
        path = %path.display(),
        roots = document.roots.len(),
        skipped = document.issues.len(),
        "loaded bookmark document"
    );
    Ok(document)
}

/// Parse a bookmark export. The root must be a JSON list; malformed entries
/// are skipped and reported in [`Document::issues`].
pub fn parse_document(text: &str) -> Result<Document, LoadError> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        if err.to_string().starts_with("recursion limit exceeded") {
            LoadError::TooDeep {
                line: err.line(),
                column: err.column(),
            }
        } else {
            LoadError::Json(err)
        }
    })?;
    document_from_value(&value)
}

pub fn document_from_value(value: &Value) -> Result<Document, LoadError> {
    let entries = match value {
        Value::Array(entries) => entries,
        other => return Err(LoadError::RootNotList(json_kind(other))),
    };

    let mut issues = Vec::new();
    // The root list is handled as an untitled folder at the bottom of the stack.
    let mut stack = vec![PendingFolder::new(String::new(), String::new(), entries)];

    loop {
        let Some(frame) = stack.last_mut() else {
            break;
        };

        let Some((path, entry)) = frame.next_entry() else {
            let Some(done) = stack.pop() else {
                break;
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(Node::Folder {
                    title: done.title,
                    children: done.children,
                }),
                None => {
                    return Ok(Document {
                        roots: done.children,
                        issues,
                    });
                }
            }
            continue;
        };

        match classify(entry, &path) {
            Ok(Entry::Link(node)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.children.push(node);
                }
            }
            Ok(Entry::Folder { title, entries }) => {
                stack.push(PendingFolder::new(title, format!("{}/children", path), entries));
            }
            Err(kind) => {
                warn!(path = %path, reason = %kind.describe(), "skipping malformed bookmark node");
                issues.push(NodeIssue { path, kind });
            }
        }
    }

    Ok(Document {
        roots: Vec::new(),
        issues,
    })
}

struct PendingFolder<'a> {
    title: String,
    prefix: String,
    entries: &'a [Value],
    next: usize,
    children: Vec<Node>,
}

impl<'a> PendingFolder<'a> {
    fn new(title: String, prefix: String, entries: &'a [Value]) -> Self {
        Self {
            title,
            prefix,
            entries,
            next: 0,
            children: Vec::with_capacity(entries.len()),
        }
    }

    fn next_entry(&mut self) -> Option<(String, &'a Value)> {
        let entries: &'a [Value] = self.entries;
        let entry = entries.get(self.next)?;
        let path = format!("{}/{}", self.prefix, self.next);
        self.next += 1;
        Some((path, entry))
    }
}

enum Entry<'a> {
    Link(Node),
    Folder { title: String, entries: &'a [Value] },
}

fn classify<'a>(entry: &'a Value, path: &str) -> Result<Entry<'a>, NodeIssueKind> {
    let Value::Object(fields) = entry else {
        return Err(NodeIssueKind::NotAnObject);
    };

    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or(NodeIssueKind::MissingType)?;

    match kind {
        "folder" => {
            let title = string_field(fields, "title").unwrap_or(UNTITLED_FOLDER);
            let entries: &'a [Value] = match fields.get("children") {
                Some(Value::Array(children)) => children.as_slice(),
                Some(other) => {
                    debug!(path = %path, found = json_kind(other), "folder children is not a list, treating as empty");
                    &[]
                }
                None => &[],
            };
            Ok(Entry::Folder {
                title: title.to_string(),
                entries,
            })
        }
        "link" => Ok(Entry::Link(Node::Link {
            title: string_field(fields, "title").unwrap_or(UNTITLED_LINK).to_string(),
            url: string_field(fields, "url").unwrap_or(MISSING_URL).to_string(),
            icon: string_field(fields, "icon").map(String::from),
        })),
        other => Err(NodeIssueKind::UnknownType(other.to_string())),
    }
}

fn string_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
