use crate::error::ConfigError;
use crate::icon::DEFAULT_ICON;
use crate::model::Node;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONTAINERS: [&str; 2] = ["Other bookmarks", "其他书签"];
pub const DEFAULT_CATEGORY: &str = "默认分类";
pub const FALLBACK_CATEGORY: &str = "深层扫描结果";
pub const FALLBACK_ROOT: &str = "根目录";
pub const FALLBACK_SEPARATOR: &str = " - ";

/// One way of choosing which nodes become categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum RootSelection {
    /// Use the children of the first top-level folder with one of these titles
    Container { names: Vec<String> },
    /// Use the children of the only top-level node, when it is a folder
    SingleRoot,
    /// Use every top-level node
    AllTopLevel,
}

impl RootSelection {
    pub fn container<S: AsRef<str>>(names: &[S]) -> Self {
        RootSelection::Container {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        }
    }

    /// Returns the effective roots, or `None` when this strategy does not apply.
    pub fn select<'a>(&self, roots: &'a [Node]) -> Option<&'a [Node]> {
        match self {
            RootSelection::Container { names } => roots.iter().find_map(|node| match node {
                Node::Folder { title, children } if names.iter().any(|n| n == title) => {
                    Some(children.as_slice())
                }
                _ => None,
            }),
            RootSelection::SingleRoot => match roots {
                [Node::Folder { children, .. }] => Some(children.as_slice()),
                _ => None,
            },
            RootSelection::AllTopLevel => Some(roots),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RootSelection::Container { .. } => "container",
            RootSelection::SingleRoot => "single-root",
            RootSelection::AllTopLevel => "all-top-level",
        }
    }
}

/// How links below a category are assigned to subcategory buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketKeying {
    /// Everything under a direct subfolder goes to that subfolder's bucket
    #[default]
    Subfolder,
    /// Each link goes to the bucket of its immediate parent folder
    NearestFolder,
}

impl BucketKeying {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "subfolder" => Some(BucketKeying::Subfolder),
            "nearest" | "nearest-folder" => Some(BucketKeying::NearestFolder),
            _ => None,
        }
    }
}

/// What to do with link icons that are remote image URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteIcons {
    #[default]
    Keep,
    /// Treat `http(s)://` icons as missing and run the keyword heuristic
    Resolve,
}

/// Options for a flatten run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FlattenOptions {
    /// Tried in order, first applicable strategy wins
    pub selection: Vec<RootSelection>,
    pub keying: BucketKeying,
    pub remote_icons: RemoteIcons,
    /// Category for links found among the effective roots
    pub default_category: String,
    /// Bucket for links sitting directly in a category folder
    pub default_subcategory: String,
    /// Category holding the result of the fallback scan
    pub fallback_category: String,
    /// Fallback bucket for links outside any folder
    pub fallback_root: String,
    pub fallback_separator: String,
    pub default_icon: String,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            selection: vec![
                RootSelection::container(&DEFAULT_CONTAINERS),
                RootSelection::AllTopLevel,
            ],
            keying: BucketKeying::default(),
            remote_icons: RemoteIcons::default(),
            default_category: DEFAULT_CATEGORY.to_string(),
            default_subcategory: DEFAULT_CATEGORY.to_string(),
            fallback_category: FALLBACK_CATEGORY.to_string(),
            fallback_root: FALLBACK_ROOT.to_string(),
            fallback_separator: FALLBACK_SEPARATOR.to_string(),
            default_icon: DEFAULT_ICON.to_string(),
        }
    }
}

impl FlattenOptions {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load options from a JSON file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn with_selection(mut self, selection: Vec<RootSelection>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_keying(mut self, keying: BucketKeying) -> Self {
        self.keying = keying;
        self
    }

    pub fn with_remote_icons(mut self, remote_icons: RemoteIcons) -> Self {
        self.remote_icons = remote_icons;
        self
    }
}
