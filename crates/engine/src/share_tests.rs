use super::*;

use std::path::Path;

use crate::{
    cancel::CancelToken,
    sort::SortKey,
    store::StoreId,
    testing::{CountingFs, RecordingHost, sample_tree, task_ctx, test_config},
    walker::fill_store,
    window::WindowId,
};

/// (depth, name, size, is_dir) rows of a store, for comparing trees.
fn shape(store: &RecordStore) -> Vec<(usize, String, u64, bool)> {
    store
        .snapshot()
        .into_iter()
        .map(|v| (v.depth, v.name, v.size, v.is_dir))
        .collect()
}

fn walked(root: &Path, dot_entries: bool) -> (RecordStore, std::sync::Arc<CountingFs>) {
    let counting = CountingFs::new(dot_entries);
    let host = RecordingHost::new();
    let config = test_config();
    let token = CancelToken::new();
    let ctx = task_ctx(&*counting, &*host, &config, &token);

    let store = RecordStore::owned(StoreId(1));
    fill_store(&ctx, root, &store).expect("walk");
    (store, counting)
}

#[test]
fn share_matches_a_direct_walk_without_reading() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    sample_tree(tmp.path());

    let (source, _) = walked(tmp.path(), false);
    let docs = source.find_path(Path::new("docs")).expect("docs");

    let counting = CountingFs::new(false);
    let host = RecordingHost::new();
    let config = test_config();
    let token = CancelToken::new();
    let ctx = task_ctx(&*counting, &*host, &config, &token);

    let target = RecordStore::shared_from(StoreId(2), &source);
    let stats = share_subtree(&ctx, &source, Some(docs), &target, None).expect("share");
    assert_eq!(counting.reads(), 0, "sharing never touches the filesystem");
    assert_eq!(stats.records, 3);
    assert!(!stats.cancelled);

    let (direct, _) = walked(&tmp.path().join("docs"), false);
    assert_eq!(shape(&target), shape(&direct));
}

#[test]
fn shared_nodes_reference_the_source_records() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    sample_tree(tmp.path());
    let (source, _) = walked(tmp.path(), false);

    let counting = CountingFs::new(false);
    let host = RecordingHost::new();
    let config = test_config();
    let token = CancelToken::new();
    let ctx = task_ctx(&*counting, &*host, &config, &token);

    let target = RecordStore::shared_from(StoreId(2), &source);
    share_subtree(&ctx, &source, None, &target, None).expect("share");

    assert_eq!(target.len(), source.len());
    assert_eq!(source.table().len(), 8, "no records were added");
    for view in target.snapshot() {
        assert!(source.contains_record(view.record), "{} is shared", view.name);
    }
}

#[test]
fn share_follows_scan_order_even_after_source_sort() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    sample_tree(tmp.path());
    let (source, _) = walked(tmp.path(), false);
    let scan_order: Vec<String> = source
        .child_entries(None)
        .expect("children")
        .into_iter()
        .map(|c| c.name)
        .collect();

    source.sort_with(SortKey::Name.comparator());

    let counting = CountingFs::new(false);
    let host = RecordingHost::new();
    let config = test_config();
    let token = CancelToken::new();
    let ctx = task_ctx(&*counting, &*host, &config, &token);

    let target = RecordStore::shared_from(StoreId(2), &source);
    share_subtree(&ctx, &source, None, &target, None).expect("share");

    let shared: Vec<String> = target
        .child_entries(None)
        .expect("children")
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(shared, scan_order);
}

#[test]
fn top_level_is_redrawn_once_and_nested_records_individually() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    sample_tree(tmp.path());
    let (source, _) = walked(tmp.path(), false);
    let docs = source.find_path(Path::new("docs")).expect("docs");

    let counting = CountingFs::new(false);
    let host = RecordingHost::new();
    let config = test_config();
    let token = CancelToken::new();
    let ctx = task_ctx(&*counting, &*host, &config, &token);

    let target = RecordStore::shared_from(StoreId(2), &source);
    share_subtree(&ctx, &source, Some(docs), &target, None).expect("share");

    // docs/: readme.md, notes/ at top level; notes/todo.txt nested.
    let redraws = host.redraws_for(WindowId(1));
    assert_eq!(redraws.len(), 2);
    assert_eq!(redraws[0], None);
    let todo = target
        .find_path(Path::new("notes/todo.txt"))
        .and_then(|n| target.record_of(n));
    assert_eq!(redraws[1], todo);
}

#[test]
fn dot_entries_are_shared_but_not_descended() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    std::fs::create_dir(tmp.path().join("sub")).expect("create sub");
    std::fs::write(tmp.path().join("sub/inner"), b"x").expect("write inner");
    let (source, _) = walked(tmp.path(), true);
    let sub = source.find_path(Path::new("sub")).expect("sub");

    let counting = CountingFs::new(true);
    let host = RecordingHost::new();
    let config = test_config();
    let token = CancelToken::new();
    let ctx = task_ctx(&*counting, &*host, &config, &token);

    let target = RecordStore::shared_from(StoreId(2), &source);
    let stats = share_subtree(&ctx, &source, Some(sub), &target, None).expect("share");

    let names: Vec<String> = target.snapshot().into_iter().map(|v| v.name).collect();
    assert_eq!(names, vec![".", "..", "inner"]);
    assert_eq!(stats.directories, 1);
}

#[test]
fn cancelled_share_keeps_what_it_inserted() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    sample_tree(tmp.path());
    let (source, _) = walked(tmp.path(), false);

    let counting = CountingFs::new(false);
    let host = RecordingHost::new();
    let config = test_config();
    let token = CancelToken::new();
    // The top-level redraw comes after the first sweep, so nothing nested
    // is shared.
    *host.cancel_on_redraw.lock() = Some(token.clone());
    let ctx = task_ctx(&*counting, &*host, &config, &token);

    let target = RecordStore::shared_from(StoreId(2), &source);
    let stats = share_subtree(&ctx, &source, None, &target, None).expect("share");

    assert!(stats.cancelled);
    assert_eq!(target.len(), 4);
    assert_eq!(target.children(None).expect("children").len(), 4);
}

#[test]
fn sharing_needs_the_same_record_table() {
    let one = RecordStore::owned(StoreId(1));
    let other = RecordStore::owned(StoreId(2));

    let counting = CountingFs::new(false);
    let host = RecordingHost::new();
    let config = test_config();
    let token = CancelToken::new();
    let ctx = task_ctx(&*counting, &*host, &config, &token);

    let err = share_subtree(&ctx, &one, None, &other, None).expect_err("foreign store");
    assert!(matches!(err, EngineError::ForeignStore { .. }));
}
