//! Flattening of a bookmark tree into a two-level navigation map.
//!
//! The normal pass picks the effective roots with the configured
//! [`RootSelection`] strategies, turns every root folder into a category and
//! buckets the links below it by folder title. When that yields no link at
//! all, a fallback scan walks the whole tree instead and files everything
//! under one labeled category, so callers can tell the result is degraded.

use crate::config::{BucketKeying, FlattenOptions, RootSelection};
use crate::error::Result;
use crate::icon::resolve_icon;
use crate::load::load_document;
use crate::model::{LinkRecord, NavigationMap, Node, Subcategories};
use serde::Serialize;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlattenStatus {
    /// Links were found through the normal pass
    Complete,
    /// Only the fallback scan found links
    Degraded,
    /// The tree holds no links at all
    NoData,
}

impl FlattenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlattenStatus::Complete => "complete",
            FlattenStatus::Degraded => "degraded",
            FlattenStatus::NoData => "no data",
        }
    }
}

/// Result of [`flatten`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    pub map: NavigationMap,
    pub status: FlattenStatus,
    /// Root selection strategy that applied, `None` for fallback results
    pub strategy: Option<&'static str>,
}

impl Flattened {
    pub fn is_complete(&self) -> bool {
        self.status == FlattenStatus::Complete
    }
}

/// Flatten `roots` into a navigation map.
pub fn flatten(roots: &[Node], options: &FlattenOptions) -> Flattened {
    let (strategy, effective) = select_roots(roots, &options.selection);
    debug!(
        strategy = strategy.unwrap_or("none"),
        effective_roots = effective.len(),
        "selected effective roots"
    );

    let map = build_categories(effective, options);
    if map.link_count() > 0 {
        info!(
            categories = map.category_count(),
            subcategories = map.subcategory_count(),
            links = map.link_count(),
            "flattened bookmark tree"
        );
        return Flattened {
            map,
            status: FlattenStatus::Complete,
            strategy,
        };
    }

    warn!(
        categories = map.category_count(),
        "normal pass produced no links, scanning the whole tree"
    );
    let map = fallback_scan(roots, options);
    let status = if map.link_count() > 0 {
        FlattenStatus::Degraded
    } else {
        FlattenStatus::NoData
    };
    warn!(
        status = status.as_str(),
        links = map.link_count(),
        "fallback scan finished"
    );

    Flattened {
        map,
        status,
        strategy: None,
    }
}

/// Load a bookmark export from disk and flatten it.
pub fn flatten_file(path: &Path, options: &FlattenOptions) -> Result<Flattened> {
    let document = load_document(path)?;
    if !document.issues.is_empty() {
        warn!(
            path = %path.display(),
            skipped = document.issues.len(),
            "some bookmark nodes were skipped"
        );
    }
    Ok(flatten(&document.roots, options))
}

/// Returns the first applicable strategy's name and the roots it selected.
pub fn select_roots<'a>(
    roots: &'a [Node],
    selection: &[RootSelection],
) -> (Option<&'static str>, &'a [Node]) {
    selection
        .iter()
        .find_map(|strategy| strategy.select(roots).map(|chosen| (Some(strategy.name()), chosen)))
        .unwrap_or((None, &[][..]))
}

/// Turn effective roots into categories: folders by title, loose links under
/// the default category.
pub fn build_categories(roots: &[Node], options: &FlattenOptions) -> NavigationMap {
    let mut map = NavigationMap::new();

    for node in roots {
        match node {
            Node::Folder { title, children } => {
                map.merge_category(title, process_category(children, options));
            }
            Node::Link { title, url, icon } => {
                map.push_link(
                    &options.default_category,
                    &options.default_subcategory,
                    link_record(title, url, icon.as_deref(), options),
                );
            }
        }
    }

    map
}

/// Bucket every link below a category folder. Buckets are created on their
/// first link, so link-less folders leave no trace.
pub fn process_category(children: &[Node], options: &FlattenOptions) -> Subcategories {
    let mut buckets = Subcategories::new();

    // `None` marks nodes sitting directly in the category folder.
    let mut stack: Vec<(&Node, Option<&str>)> =
        children.iter().rev().map(|node| (node, None)).collect();

    while let Some((node, bucket)) = stack.pop() {
        match node {
            Node::Link { title, url, icon } => {
                let key = bucket.unwrap_or(options.default_subcategory.as_str());
                buckets
                    .entry(key.to_string())
                    .or_default()
                    .push(link_record(title, url, icon.as_deref(), options));
            }
            Node::Folder { title, children } => {
                let key = match (options.keying, bucket) {
                    (BucketKeying::Subfolder, Some(outer)) => outer,
                    _ => title.as_str(),
                };
                stack.extend(children.iter().rev().map(|child| (child, Some(key))));
            }
        }
    }

    buckets
}

/// Scan the entire tree, ignoring root selection, keying each link by the
/// path of folders enclosing it.
pub fn fallback_scan(roots: &[Node], options: &FlattenOptions) -> NavigationMap {
    let mut buckets = Subcategories::new();
    let mut stack: Vec<(&Node, Option<Rc<str>>)> =
        roots.iter().rev().map(|node| (node, None)).collect();

    while let Some((node, path)) = stack.pop() {
        match node {
            Node::Link { title, url, icon } => {
                let key = path.as_deref().unwrap_or(options.fallback_root.as_str());
                buckets
                    .entry(key.to_string())
                    .or_default()
                    .push(link_record(title, url, icon.as_deref(), options));
            }
            Node::Folder { title, children } => {
                let folder_path: Rc<str> = match &path {
                    Some(parent) => format!("{}{}{}", parent, options.fallback_separator, title).into(),
                    None => title.as_str().into(),
                };
                stack.extend(
                    children
                        .iter()
                        .rev()
                        .map(|child| (child, Some(Rc::clone(&folder_path)))),
                );
            }
        }
    }

    let mut map = NavigationMap::new();
    map.merge_category(&options.fallback_category, buckets);
    map
}

fn link_record(title: &str, url: &str, icon: Option<&str>, options: &FlattenOptions) -> LinkRecord {
    LinkRecord::new(
        title,
        url,
        resolve_icon(icon, url, options.remote_icons, &options.default_icon),
    )
}
