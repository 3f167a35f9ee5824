use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const UNTITLED_FOLDER: &str = "未命名文件夹";
pub const UNTITLED_LINK: &str = "未命名链接";
pub const MISSING_URL: &str = "#";

/// A node of a bookmark export, after field defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Folder {
        title: String,
        children: Vec<Node>,
    },
    Link {
        title: String,
        url: String,
        icon: Option<String>,
    },
}

impl Node {
    pub fn folder(title: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Folder {
            title: title.into(),
            children,
        }
    }

    pub fn link(title: impl Into<String>, url: impl Into<String>, icon: Option<&str>) -> Self {
        Node::Link {
            title: title.into(),
            url: url.into(),
            icon: icon.map(String::from),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Node::Folder { title, .. } | Node::Link { title, .. } => title,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Node::Folder { .. })
    }

    /// Number of links in this subtree, this node included.
    pub fn link_count(&self) -> usize {
        count_links(std::slice::from_ref(self))
    }
}

/// Counts every link reachable from `nodes` without recursing on the call stack.
pub fn count_links(nodes: &[Node]) -> usize {
    let mut stack: Vec<&Node> = nodes.iter().collect();
    let mut count = 0;
    while let Some(node) = stack.pop() {
        match node {
            Node::Link { .. } => count += 1,
            Node::Folder { children, .. } => stack.extend(children.iter()),
        }
    }
    count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "link")]
    Link,
}

/// Display-ready projection of a link node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub title: String,
    pub url: String,
    pub icon: String,
}

impl LinkRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            kind: RecordKind::Link,
            title: title.into(),
            url: url.into(),
            icon: icon.into(),
        }
    }
}

pub type Subcategories = IndexMap<String, Vec<LinkRecord>>;

/// Category -> subcategory -> links, in first-encountered order.
///
/// Only the flattener builds one; everything else reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationMap(IndexMap<String, Subcategories>);

impl NavigationMap {
    pub(crate) fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Adds a category, merging into an existing one with the same name.
    pub(crate) fn merge_category(&mut self, name: &str, subcategories: Subcategories) {
        let target = self.0.entry(name.to_string()).or_default();
        for (key, links) in subcategories {
            target.entry(key).or_default().extend(links);
        }
    }

    pub(crate) fn push_link(&mut self, category: &str, subcategory: &str, record: LinkRecord) {
        self.0
            .entry(category.to_string())
            .or_default()
            .entry(subcategory.to_string())
            .or_default()
            .push(record);
    }

    pub fn get(&self, category: &str) -> Option<&Subcategories> {
        self.0.get(category)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Subcategories> {
        self.0.iter()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn category_count(&self) -> usize {
        self.0.len()
    }

    pub fn subcategory_count(&self) -> usize {
        self.0.values().map(IndexMap::len).sum()
    }

    pub fn link_count(&self) -> usize {
        self.0
            .values()
            .flat_map(IndexMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<IndexMap<String, Subcategories>> for NavigationMap {
    fn from(map: IndexMap<String, Subcategories>) -> Self {
        Self(map)
    }
}

impl<'a> IntoIterator for &'a NavigationMap {
    type Item = (&'a String, &'a Subcategories);
    type IntoIter = indexmap::map::Iter<'a, String, Subcategories>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeIssueKind {
    NotAnObject,
    MissingType,
    UnknownType(String),
}

impl NodeIssueKind {
    pub fn describe(&self) -> String {
        match self {
            NodeIssueKind::NotAnObject => "entry is not an object".to_string(),
            NodeIssueKind::MissingType => "missing 'type' field".to_string(),
            NodeIssueKind::UnknownType(kind) => format!("unknown type '{}'", kind),
        }
    }
}

/// A node the loader skipped, located by its JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeIssue {
    pub path: String,
    pub kind: NodeIssueKind,
}

/// A parsed bookmark export.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub roots: Vec<Node>,
    pub issues: Vec<NodeIssue>,
}

impl Document {
    pub fn new(roots: Vec<Node>) -> Self {
        Self {
            roots,
            issues: Vec::new(),
        }
    }

    pub fn link_count(&self) -> usize {
        count_links(&self.roots)
    }
}
