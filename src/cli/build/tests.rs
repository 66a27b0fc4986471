//! End-to-end builds over small on-disk vaults.

use super::*;
use crate::config::test_config_at;
use crate::deferred::{find_node_id, tokens};
use tempfile::TempDir;

const ENTRY: &str = "[vault]\nentrypoint = \"entry.md\"\n";

fn vault(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let path = dir.path().join("vault").join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn build(dir: &TempDir, config: &str) -> BuildReport {
    let config = test_config_at(dir.path(), config);
    build_vault(&config, true).unwrap()
}

fn page(dir: &TempDir, path: &str) -> String {
    fs::read_to_string(dir.path().join("output/html").join(path)).unwrap()
}

fn snapshot(dir: &TempDir, paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| page(dir, p)).collect()
}

#[test]
fn test_link_and_backlink_between_two_notes() {
    let dir = vault(&[("entry.md", "[[note]]"), ("note.md", "hello")]);
    let report = build(&dir, ENTRY);

    let entry = page(&dir, "index.html");
    assert!(entry.contains("<a href=\"/note.html\">note</a>"), "{entry}");
    assert_eq!(find_node_id(&entry).as_deref(), Some("entry"));
    assert!(entry.contains("<!-- empty:backlinks -->"));

    let note = page(&dir, "note.html");
    assert!(note.contains("<ul class=\"backlinks\">\n<li><a href=\"/index.html\">entry</a></li>"), "{note}");
    assert!(note.contains("<p>hello</p>"));
    // Only the node id survives the second pass
    assert_eq!(tokens(&note).len(), 1);

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.notes.processed, 3);
    assert_eq!(report.pages.processed, 3);
}

#[test]
fn test_missing_link_points_at_not_found_page() {
    let dir = vault(&[("entry.md", "[[missing]]")]);
    let report = build(&dir, ENTRY);

    let entry = page(&dir, "index.html");
    assert!(entry.contains("<a href=\"/not_created.html\">missing</a>"), "{entry}");
    let not_found = page(&dir, "not_created.html");
    assert!(not_found.contains("Not created yet"));
    assert!(not_found.contains("<a href=\"/index.html\">entry</a>"));

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("unresolved link `missing`"));
}

#[test]
fn test_exact_path_beats_tail_match() {
    let dir = vault(&[
        ("entry.md", "[[a/x]], [[x]], [[b/x]]"),
        ("a/x.md", "in a"),
        ("b/x.md", "in b"),
    ]);
    build(&dir, ENTRY);
    let entry = page(&dir, "index.html");

    assert!(entry.contains("<a href=\"/a/x.html\">a/x</a>"), "{entry}");
    assert!(entry.contains("<a href=\"/b/x.html\">b/x</a>"));
    // Equal-length tail matches resolve to the last registered path
    assert!(entry.contains("<a href=\"/b/x.html\">x</a>"));
    assert!(!entry.contains("<a href=\"/a/x.html\">x</a>"));

    build(&dir, ENTRY);
    assert_eq!(page(&dir, "index.html"), entry);
}

#[test]
fn test_shorter_tail_match_wins() {
    let dir = vault(&[("entry.md", "[[c]]"), ("a/b/c.md", ""), ("b/c.md", "")]);
    build(&dir, ENTRY);
    assert!(page(&dir, "index.html").contains("<a href=\"/b/c.html\">c</a>"));
}

#[test]
fn test_cycle_builds_each_page_once() {
    let dir = vault(&[("entry.md", "[[a]]"), ("a.md", "[[b]]"), ("b.md", "[[a]] [[b]]")]);
    let report = build(&dir, ENTRY);
    assert_eq!(report.pages.processed, 4);

    let a = page(&dir, "a.html");
    assert_eq!(a.matches("<li><a href=\"/b.html\">b</a></li>").count(), 1, "{a}");
    let b = page(&dir, "b.html");
    assert_eq!(b.matches("<li><a href=\"/a.html\">a</a></li>").count(), 1);
    // Self links are not backlinks
    assert!(!b.contains("<li><a href=\"/b.html\">b</a></li>"));
}

#[test]
fn test_rebuild_is_byte_identical() {
    let dir = vault(&[
        ("entry.md", "---\ntags: [start]\n---\n[[a]] ![[a#Part]]\n```query\ntag:start\n```\n"),
        ("a.md", "# Part\n[[entry]] #topic\n"),
    ]);
    let files = ["index.html", "a.html", "graph.json", "tags/index.html"];

    build(&dir, ENTRY);
    let first = snapshot(&dir, &files);
    build(&dir, ENTRY);
    assert_eq!(snapshot(&dir, &files), first);

    build(&dir, &format!("{ENTRY}[build]\nclean = true\n"));
    assert_eq!(snapshot(&dir, &files), first);
}

#[test]
fn test_graph_export_and_tag_index() {
    let dir = vault(&[("entry.md", "[[a]] #start"), ("a.md", "![[entry]]")]);
    build(&dir, ENTRY);

    let graph: serde_json::Value = serde_json::from_str(&page(&dir, GRAPH_FILE)).unwrap();
    let ids: Vec<_> = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"entry") && ids.contains(&"a"));
    let links = graph["links"].as_array().unwrap();
    assert!(links.iter().any(|l| l["source"] == "entry" && l["target"] == "a" && l["kind"] == "reference"));
    assert!(links.iter().any(|l| l["source"] == "a" && l["target"] == "entry" && l["kind"] == "inclusion"));

    let tags = page(&dir, TAGS_PAGE);
    assert!(tags.contains("<section id=\"start\">"));
    let entry = page(&dir, "index.html");
    assert!(entry.contains("<a href=\"/tags/#start\">#start</a>"), "{entry}");
}

#[test]
fn test_optional_outputs_can_be_disabled() {
    let dir = vault(&[("entry.md", "#start")]);
    build(&dir, &format!("{ENTRY}[build]\ngraph = false\ntag_index = false\n"));

    assert!(!dir.path().join("output/html").join(GRAPH_FILE).exists());
    assert!(!dir.path().join("output/html").join(TAGS_PAGE).exists());
    assert!(page(&dir, "index.html").contains("<li class=\"tag\">#start</li>"));
}

#[test]
fn test_missing_entrypoint_writes_nothing() {
    let dir = vault(&[("other.md", "")]);
    let config = test_config_at(dir.path(), ENTRY);
    let err = build_vault(&config, true).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::EntrypointMissing(..))
    ));
    assert!(!dir.path().join("output").exists());
}

#[test]
fn test_unreachable_notes_need_process_all() {
    let dir = vault(&[("entry.md", ""), ("orphan.md", "[[child]]"), ("child.md", "")]);
    let report = build(&dir, ENTRY);
    assert_eq!(report.unreached, 2);
    assert!(!dir.path().join("output/html/orphan.html").exists());

    let report = build(&dir, &format!("{ENTRY}process_all = true\n"));
    assert_eq!(report.unreached, 0);
    assert!(report.warnings.is_empty());
    assert!(page(&dir, "child.html").contains("<a href=\"/orphan.html\">orphan</a>"));
}

#[test]
fn test_max_depth_sends_deep_links_to_not_found() {
    let dir = vault(&[("entry.md", "[[b]]"), ("b.md", "[[c]]"), ("c.md", "deep")]);
    let report = build(&dir, &format!("{ENTRY}max_depth = 1\n"));

    assert_eq!(report.notes.cut, 1);
    assert!(page(&dir, "b.html").contains("<a href=\"/not_created.html\">c</a>"));
    assert!(!dir.path().join("output/html/c.html").exists());
}

#[test]
fn test_extra_entrypoints_and_site_prefix() {
    let dir = vault(&[("entry.md", ""), ("inbox.md", "[[entry]]"), ("sub/deep.md", "")]);
    let config = format!(
        "{ENTRY}extra_entrypoints = [\"inbox.md\", \"nope.md\"]\n\
         [site]\nurl = \"https://example.com/notes\"\n"
    );
    let report = build(&dir, &config);

    assert!(page(&dir, "inbox.html").contains("<a href=\"/notes/index.html\">entry</a>"));
    assert!(report.warnings.iter().any(|w| w.contains("`nope.md`")));
    assert_eq!(report.unreached, 1);
}

#[test]
fn test_breadcrumbs_follow_folders() {
    let dir = vault(&[
        ("entry.md", "[[guide]] [[page]]"),
        ("docs/guide.md", ""),
        ("docs/guide/page.md", ""),
    ]);
    build(&dir, &format!("{ENTRY}[site]\ntitle = \"Notes\"\n"));

    let html = page(&dir, "docs/guide/page.html");
    assert!(
        html.contains(
            "<ol class=\"breadcrumbs\"><li><a href=\"/index.html\">Notes</a></li>\
             <li><span>docs</span></li>\
             <li><a href=\"/docs/guide.html\">guide</a></li></ol>"
        ),
        "{html}"
    );
    assert!(page(&dir, "index.html").contains("<!-- empty:breadcrumbs -->"));
}
