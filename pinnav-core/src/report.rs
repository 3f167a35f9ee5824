// Summaries of flatten results and bookmark tree structure

use crate::flatten::{FlattenStatus, Flattened};
use crate::model::{Document, Node};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationStats {
    pub categories: usize,
    pub subcategories: usize,
    pub links: usize,
    pub status: FlattenStatus,
}

impl NavigationStats {
    pub fn from_flattened(flattened: &Flattened) -> Self {
        Self {
            categories: flattened.map.category_count(),
            subcategories: flattened.map.subcategory_count(),
            links: flattened.map.link_count(),
            status: flattened.status,
        }
    }
}

/// Counts per category, as printed after a conversion.
pub fn generate_summary_report(flattened: &Flattened) -> String {
    let stats = NavigationStats::from_flattened(flattened);
    let mut report = String::new();

    report.push_str(RULE);
    report.push('\n');
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Status: {}\n", stats.status.as_str()));
    if let Some(strategy) = flattened.strategy {
        report.push_str(&format!("  Root selection: {}\n", strategy));
    }
    report.push_str(&format!("  Categories: {}\n", stats.categories));
    report.push_str(&format!("  Subcategories: {}\n", stats.subcategories));
    report.push_str(&format!("  Links: {}\n", stats.links));
    report.push('\n');
    report.push_str(RULE);
    report.push('\n');

    for (category, subcategories) in &flattened.map {
        let links: usize = subcategories.values().map(Vec::len).sum();
        report.push_str(&format!("## {}\n", category));
        report.push_str(&format!(
            "  {} subcategories, {} links\n",
            subcategories.len(),
            links
        ));
        for (name, bucket) in subcategories {
            report.push_str(&format!("    {} ({})\n", name, bucket.len()));
        }
        report.push('\n');
    }

    report
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    pub title: String,
    /// Direct children
    pub items: usize,
    /// Folders anywhere below this one
    pub folders: usize,
    /// Links anywhere below this one
    pub links: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostCount {
    pub host: String,
    pub links: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub depth: usize,
    pub title: String,
    pub direct_links: usize,
}

/// Structure of a bookmark document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeAnalysis {
    pub folders: usize,
    pub links: usize,
    /// Deepest folder nesting, top-level folders count as 1
    pub max_depth: usize,
    pub skipped_nodes: usize,
    pub top_level: Vec<FolderSummary>,
    pub hosts: Vec<HostCount>,
    pub outline: Vec<OutlineEntry>,
}

/// Walk the whole document and collect structure statistics. `max_hosts`
/// bounds the host table.
pub fn analyze_tree(document: &Document, max_hosts: usize) -> TreeAnalysis {
    let mut folders = 0;
    let mut links = 0;
    let mut max_depth = 0;
    let mut outline = Vec::new();
    let mut by_host: HashMap<String, usize> = HashMap::new();

    let mut stack: Vec<(&Node, usize)> = document.roots.iter().rev().map(|n| (n, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        match node {
            Node::Link { url, .. } => {
                links += 1;
                if let Ok(parsed) = Url::parse(url)
                    && let Some(host) = parsed.host_str()
                {
                    *by_host.entry(host.to_string()).or_default() += 1;
                }
            }
            Node::Folder { title, children } => {
                folders += 1;
                max_depth = max_depth.max(depth);
                outline.push(OutlineEntry {
                    depth,
                    title: title.clone(),
                    direct_links: children.iter().filter(|c| !c.is_folder()).count(),
                });
                stack.extend(children.iter().rev().map(|child| (child, depth + 1)));
            }
        }
    }

    let top_level = document
        .roots
        .iter()
        .filter_map(|node| match node {
            Node::Folder { title, children } => Some(summarize_folder(title, children)),
            Node::Link { .. } => None,
        })
        .collect();

    let mut hosts: Vec<HostCount> = by_host
        .into_iter()
        .map(|(host, links)| HostCount { host, links })
        .collect();
    hosts.sort_by(|a, b| b.links.cmp(&a.links).then_with(|| a.host.cmp(&b.host)));
    hosts.truncate(max_hosts);

    TreeAnalysis {
        folders,
        links,
        max_depth,
        skipped_nodes: document.issues.len(),
        top_level,
        hosts,
        outline,
    }
}

fn summarize_folder(title: &str, children: &[Node]) -> FolderSummary {
    let mut folders = 0;
    let mut links = 0;
    let mut stack: Vec<&Node> = children.iter().collect();
    while let Some(node) = stack.pop() {
        match node {
            Node::Link { .. } => links += 1,
            Node::Folder { children, .. } => {
                folders += 1;
                stack.extend(children.iter());
            }
        }
    }

    FolderSummary {
        title: title.to_string(),
        items: children.len(),
        folders,
        links,
    }
}

pub fn generate_analysis_report(analysis: &TreeAnalysis, show_tree: bool) -> String {
    let mut report = String::new();

    report.push_str(RULE);
    report.push('\n');
    report.push_str("# Structure:\n");
    report.push_str(&format!("  Folders: {}\n", analysis.folders));
    report.push_str(&format!("  Links: {}\n", analysis.links));
    report.push_str(&format!("  Max depth: {}\n", analysis.max_depth));
    if analysis.skipped_nodes > 0 {
        report.push_str(&format!("  Skipped nodes: {}\n", analysis.skipped_nodes));
    }
    report.push('\n');

    if show_tree && !analysis.outline.is_empty() {
        report.push_str(RULE);
        report.push('\n');
        for entry in &analysis.outline {
            let indent = "  ".repeat(entry.depth - 1);
            if entry.direct_links > 0 {
                report.push_str(&format!(
                    "{}📁 {} ({} links)\n",
                    indent, entry.title, entry.direct_links
                ));
            } else {
                report.push_str(&format!("{}📁 {}\n", indent, entry.title));
            }
        }
        report.push('\n');
    }

    if !analysis.top_level.is_empty() {
        report.push_str(RULE);
        report.push('\n');
        report.push_str("# Top-level folders:\n");
        for folder in &analysis.top_level {
            report.push_str(&format!(
                "  - {}: {} items, {} subfolders, {} links\n",
                folder.title, folder.items, folder.folders, folder.links
            ));
        }
        report.push('\n');
    }

    if !analysis.hosts.is_empty() {
        report.push_str(RULE);
        report.push('\n');
        report.push_str("# Top hosts:\n");
        for host in &analysis.hosts {
            report.push_str(&format!("  {:>4}  {}\n", host.links, host.host));
        }
        report.push('\n');
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
