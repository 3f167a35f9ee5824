// Tests for bookmark tree flattening

use pinnav_core::config::{BucketKeying, FlattenOptions, RootSelection};
use pinnav_core::flatten::{FlattenStatus, flatten, process_category, select_roots};
use pinnav_core::model::{Node, count_links};
use serde_json::json;

fn link(title: &str) -> Node {
    Node::link(title, format!("https://example.org/{}", title), Some("⭐"))
}

fn folder(title: &str, children: Vec<Node>) -> Node {
    Node::folder(title, children)
}

fn keys<V>(map: &indexmap::IndexMap<String, V>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

fn titles(nodes: &[pinnav_core::LinkRecord]) -> Vec<&str> {
    nodes.iter().map(|l| l.title.as_str()).collect()
}

// ============================================================================
// Root Selection Tests
// ============================================================================

#[test]
fn test_container_level_is_discarded() {
    let roots = vec![folder(
        "Other bookmarks",
        vec![folder("Work", vec![link("A")])],
    )];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(result.status, FlattenStatus::Complete);
    assert_eq!(result.strategy, Some("container"));
    assert_eq!(
        serde_json::to_value(&result.map).unwrap(),
        json!({
            "Work": {
                "默认分类": [
                    {"type": "link", "title": "A", "url": "https://example.org/A", "icon": "⭐"}
                ]
            }
        })
    );
}

#[test]
fn test_container_matches_localized_title() {
    let roots = vec![
        folder("Bookmarks bar", vec![link("ignored")]),
        folder("其他书签", vec![folder("资源", vec![link("x")])]),
    ];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(result.map.category_names().collect::<Vec<_>>(), vec!["资源"]);
    assert_eq!(result.map.link_count(), 1);
}

#[test]
fn test_first_matching_container_wins() {
    let roots = vec![
        folder("Other bookmarks", vec![folder("First", vec![link("a")])]),
        folder("Other bookmarks", vec![folder("Second", vec![link("b")])]),
    ];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(result.map.category_names().collect::<Vec<_>>(), vec!["First"]);
}

#[test]
fn test_without_container_all_top_level_nodes_are_roots() {
    let roots = vec![
        folder("Work", vec![link("a")]),
        folder("Play", vec![link("b")]),
    ];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(result.strategy, Some("all-top-level"));
    assert_eq!(
        result.map.category_names().collect::<Vec<_>>(),
        vec!["Work", "Play"]
    );
}

#[test]
fn test_all_top_level_strategy_keeps_container_as_category() {
    let roots = vec![folder(
        "Other bookmarks",
        vec![folder("Work", vec![link("a")])],
    )];
    let options = FlattenOptions::default().with_selection(vec![RootSelection::AllTopLevel]);

    let result = flatten(&roots, &options);

    let category = result.map.get("Other bookmarks").unwrap();
    assert_eq!(keys(category), vec!["Work"]);
}

#[test]
fn test_single_root_strategy() {
    let roots = vec![folder(
        "Bookmarks",
        vec![folder("资源", vec![link("a")]), folder("JustFun", vec![link("b")])],
    )];
    let options = FlattenOptions::default()
        .with_selection(vec![RootSelection::SingleRoot, RootSelection::AllTopLevel]);

    let result = flatten(&roots, &options);

    assert_eq!(result.strategy, Some("single-root"));
    assert_eq!(
        result.map.category_names().collect::<Vec<_>>(),
        vec!["资源", "JustFun"]
    );
}

#[test]
fn test_single_root_does_not_apply_to_several_roots() {
    let roots = vec![folder("A", vec![]), folder("B", vec![])];
    let (strategy, chosen) = select_roots(&roots, &[RootSelection::SingleRoot]);

    assert_eq!(strategy, None);
    assert!(chosen.is_empty());
}

#[test]
fn test_custom_container_names() {
    let roots = vec![
        folder("Other bookmarks", vec![folder("Nope", vec![link("a")])]),
        folder("Toolbar", vec![folder("Yes", vec![link("b")])]),
    ];
    let options = FlattenOptions::default().with_selection(vec![
        RootSelection::container(&["Toolbar"]),
        RootSelection::AllTopLevel,
    ]);

    let result = flatten(&roots, &options);

    assert_eq!(result.map.category_names().collect::<Vec<_>>(), vec!["Yes"]);
}

#[test]
fn test_root_links_go_to_default_category() {
    let roots = vec![folder(
        "Other bookmarks",
        vec![link("loose"), folder("Work", vec![link("a")]), link("loose2")],
    )];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(
        result.map.category_names().collect::<Vec<_>>(),
        vec!["默认分类", "Work"]
    );
    let default = result.map.get("默认分类").unwrap();
    assert_eq!(keys(default), vec!["默认分类"]);
    assert_eq!(titles(&default["默认分类"]), vec!["loose", "loose2"]);
}

// ============================================================================
// Subcategory Bucketing Tests
// ============================================================================

#[test]
fn test_nested_folders_collapse_into_subfolder_bucket() {
    let roots = vec![folder(
        "Work",
        vec![
            folder(
                "Dev",
                vec![link("a"), folder("Deep", vec![link("b"), folder("Deeper", vec![link("c")])])],
            ),
            link("d"),
        ],
    )];

    let result = flatten(&roots, &FlattenOptions::default());
    let work = result.map.get("Work").unwrap();

    assert_eq!(keys(work), vec!["Dev", "默认分类"]);
    assert_eq!(titles(&work["Dev"]), vec!["a", "b", "c"]);
    assert_eq!(titles(&work["默认分类"]), vec!["d"]);
}

#[test]
fn test_bucket_keys_are_plain_titles() {
    let roots = vec![folder(
        "Work",
        vec![folder("Dev", vec![folder("Rust", vec![link("a")])])],
    )];
    let options = FlattenOptions::default().with_keying(BucketKeying::NearestFolder);

    let result = flatten(&roots, &options);

    assert_eq!(keys(result.map.get("Work").unwrap()), vec!["Rust"]);
}

#[test]
fn test_same_title_at_different_depths_merges() {
    let roots = vec![folder(
        "Work",
        vec![
            folder("Tools", vec![link("a"), link("b")]),
            folder("Misc", vec![link("m"), folder("Tools", vec![link("c")])]),
        ],
    )];
    let options = FlattenOptions::default().with_keying(BucketKeying::NearestFolder);

    let result = flatten(&roots, &options);
    let work = result.map.get("Work").unwrap();

    assert_eq!(keys(work), vec!["Tools", "Misc"]);
    assert_eq!(titles(&work["Tools"]), vec!["a", "b", "c"]);
    assert_eq!(titles(&work["Misc"]), vec!["m"]);
}

#[test]
fn test_sibling_folders_with_same_title_merge() {
    let roots = vec![folder(
        "Work",
        vec![
            folder("Tools", vec![link("a")]),
            folder("Docs", vec![link("d")]),
            folder("Tools", vec![folder("More", vec![link("b")])]),
        ],
    )];

    let result = flatten(&roots, &FlattenOptions::default());
    let work = result.map.get("Work").unwrap();

    assert_eq!(keys(work), vec!["Tools", "Docs"]);
    assert_eq!(titles(&work["Tools"]), vec!["a", "b"]);
}

#[test]
fn test_duplicate_categories_merge() {
    let roots = vec![
        folder("Work", vec![folder("Tools", vec![link("a")])]),
        folder("Play", vec![link("p")]),
        folder("Work", vec![folder("Tools", vec![link("b")]), folder("Docs", vec![link("d")])]),
    ];

    let result = flatten(&roots, &FlattenOptions::default());
    let work = result.map.get("Work").unwrap();

    assert_eq!(
        result.map.category_names().collect::<Vec<_>>(),
        vec!["Work", "Play"]
    );
    assert_eq!(keys(work), vec!["Tools", "Docs"]);
    assert_eq!(titles(&work["Tools"]), vec!["a", "b"]);
}

#[test]
fn test_empty_folder_produces_no_bucket() {
    let roots = vec![
        folder("Work", vec![folder("Empty", vec![folder("Emptier", vec![])])]),
        folder("Links", vec![link("a")]),
    ];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(result.status, FlattenStatus::Complete);
    assert!(result.map.get("Work").unwrap().is_empty());
    assert_eq!(result.map.subcategory_count(), 1);
}

#[test]
fn test_bucket_order_follows_first_link() {
    let children = vec![
        folder("Later", vec![folder("Inner", vec![])]),
        folder("First", vec![link("a")]),
        folder("Later", vec![link("b")]),
    ];

    let buckets = process_category(&children, &FlattenOptions::default());

    assert_eq!(keys(&buckets), vec!["First", "Later"]);
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let mut inner = link("bottom");
    for depth in 0..2_000 {
        inner = folder(&format!("level-{}", depth), vec![inner]);
    }
    let roots = vec![folder("Deep", vec![inner])];

    let collapsed = flatten(&roots, &FlattenOptions::default());
    assert_eq!(keys(collapsed.map.get("Deep").unwrap()), vec!["level-1999"]);

    let nearest = flatten(
        &roots,
        &FlattenOptions::default().with_keying(BucketKeying::NearestFolder),
    );
    assert_eq!(keys(nearest.map.get("Deep").unwrap()), vec!["level-0"]);
}

// ============================================================================
// Icon Tests
// ============================================================================

#[test]
fn test_missing_icon_resolved_from_url() {
    let roots = vec![folder(
        "Dev",
        vec![
            Node::link("repo", "https://github.com/foo", None),
            Node::link("blank", "https://unknown.example", Some("  ")),
            Node::link("own", "https://github.com/bar", Some("🦀")),
        ],
    )];

    let result = flatten(&roots, &FlattenOptions::default());
    let links = &result.map.get("Dev").unwrap()["默认分类"];

    assert_eq!(links[0].icon, "💻");
    assert_eq!(links[1].icon, "🔗");
    assert_eq!(links[2].icon, "🦀");
}

// ============================================================================
// Property Tests
// ============================================================================

fn sample_tree() -> Vec<Node> {
    vec![
        folder("Bookmarks bar", vec![link("bar")]),
        folder(
            "Other bookmarks",
            vec![
                link("r1"),
                folder(
                    "资源",
                    vec![
                        link("x1"),
                        folder("学术", vec![link("x2"), folder("论文", vec![link("x3"), link("x4")])]),
                        folder("学术", vec![link("x5")]),
                        folder("空", vec![]),
                    ],
                ),
                folder("效率工具", vec![folder("AI", vec![link("y1")]), link("y2")]),
                link("r2"),
                folder("资源", vec![link("x6")]),
            ],
        ),
    ]
}

#[test]
fn test_every_selected_link_appears_exactly_once() {
    let roots = sample_tree();
    let options = FlattenOptions::default();

    for keying in [BucketKeying::Subfolder, BucketKeying::NearestFolder] {
        let options = options.clone().with_keying(keying);
        let (_, selected) = select_roots(&roots, &options.selection);
        let result = flatten(&roots, &options);

        assert_eq!(result.status, FlattenStatus::Complete);
        assert_eq!(result.map.link_count(), count_links(selected));

        let mut seen: Vec<&str> = result
            .map
            .iter()
            .flat_map(|(_, subs)| subs.values())
            .flat_map(|links| links.iter().map(|l| l.title.as_str()))
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), count_links(selected));
    }
}

#[test]
fn test_flatten_is_deterministic() {
    let roots = sample_tree();
    let options = FlattenOptions::default();

    let first = serde_json::to_string(&flatten(&roots, &options).map).unwrap();
    let second = serde_json::to_string(&flatten(&roots, &options).map).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_sample_tree_layout() {
    let result = flatten(&sample_tree(), &FlattenOptions::default());

    assert_eq!(
        result.map.category_names().collect::<Vec<_>>(),
        vec!["默认分类", "资源", "效率工具"]
    );
    let resources = result.map.get("资源").unwrap();
    assert_eq!(keys(resources), vec!["默认分类", "学术"]);
    assert_eq!(titles(&resources["默认分类"]), vec!["x1", "x6"]);
    assert_eq!(titles(&resources["学术"]), vec!["x2", "x3", "x4", "x5"]);
    assert_eq!(
        titles(&result.map.get("默认分类").unwrap()["默认分类"]),
        vec!["r1", "r2"]
    );
}

// ============================================================================
// Fallback Tests
// ============================================================================

#[test]
fn test_container_without_links_yields_no_data() {
    let roots = vec![folder(
        "Other bookmarks",
        vec![folder("Work", vec![folder("Empty", vec![])])],
    )];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(result.status, FlattenStatus::NoData);
    assert_eq!(result.strategy, None);
    assert_eq!(
        serde_json::to_value(&result.map).unwrap(),
        json!({"深层扫描结果": {}})
    );
}

#[test]
fn test_fallback_scan_recovers_links_outside_selection() {
    let roots = vec![
        folder("Other bookmarks", vec![folder("Empty", vec![])]),
        folder("Bar", vec![folder("Sub", vec![link("x"), folder("Leaf", vec![link("z")])])]),
        link("y"),
    ];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(result.status, FlattenStatus::Degraded);
    assert_eq!(
        result.map.category_names().collect::<Vec<_>>(),
        vec!["深层扫描结果"]
    );
    let scan = result.map.get("深层扫描结果").unwrap();
    assert_eq!(keys(scan), vec!["Bar - Sub", "Bar - Sub - Leaf", "根目录"]);
    assert_eq!(titles(&scan["根目录"]), vec!["y"]);
}

#[test]
fn test_fallback_not_triggered_when_links_exist() {
    let roots = vec![
        folder("Work", vec![]),
        folder("Play", vec![link("a")]),
    ];

    let result = flatten(&roots, &FlattenOptions::default());

    assert_eq!(result.status, FlattenStatus::Complete);
    assert!(result.map.get("深层扫描结果").is_none());
}

#[test]
fn test_empty_input_yields_no_data() {
    let result = flatten(&[], &FlattenOptions::default());

    assert_eq!(result.status, FlattenStatus::NoData);
    assert_eq!(result.map.category_count(), 1);
    assert_eq!(result.map.link_count(), 0);
}

#[test]
fn test_empty_selection_list_falls_back() {
    let roots = vec![folder("Work", vec![link("a")])];
    let options = FlattenOptions::default().with_selection(vec![]);

    let result = flatten(&roots, &options);

    assert_eq!(result.status, FlattenStatus::Degraded);
    assert_eq!(
        titles(&result.map.get("深层扫描结果").unwrap()["Work"]),
        vec!["a"]
    );
}

#[test]
fn test_fallback_labels_are_configurable() {
    let mut options = FlattenOptions::default().with_selection(vec![]);
    options.fallback_category = "Recovered".to_string();
    options.fallback_root = "(root)".to_string();
    options.fallback_separator = "/".to_string();
    let roots = vec![link("top"), folder("A", vec![folder("B", vec![link("deep")])])];

    let result = flatten(&roots, &options);
    let scan = result.map.get("Recovered").unwrap();

    assert_eq!(keys(scan), vec!["(root)", "A/B"]);
}

// ============================================================================
// File Flattening Tests
// ============================================================================

#[test]
fn test_flatten_file() -> pinnav_core::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pintree.json");
    std::fs::write(
        &path,
        r#"[{"type": "folder", "title": "Other bookmarks", "children": [
            {"type": "folder", "title": "Work", "children": [
                {"type": "link", "title": "A", "url": "https://a.example"},
                {"type": "separator"}
            ]}
        ]}]"#,
    )?;

    let flattened = pinnav_core::flatten_file(&path, &FlattenOptions::default())?;

    assert_eq!(flattened.status, FlattenStatus::Complete);
    assert_eq!(flattened.map.link_count(), 1);
    Ok(())
}

#[test]
fn test_flatten_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let result = pinnav_core::flatten_file(&dir.path().join("nope.json"), &FlattenOptions::default());

    assert!(matches!(
        result,
        Err(pinnav_core::PinnavError::Load(pinnav_core::LoadError::Io { .. }))
    ));
}
