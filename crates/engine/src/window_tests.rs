use super::*;

use std::path::Path;

use crate::store::StoreId;

fn window(id: u32) -> Arc<BrowserWindow> {
    Arc::new(BrowserWindow::new(
        WindowId(id),
        PathBuf::from(format!("/w{id}")),
        RecordStore::owned(StoreId(id)),
    ))
}

#[test]
fn registry_tracks_live_windows() {
    let registry = WindowRegistry::new();
    assert!(registry.is_empty());

    registry.register(window(2));
    registry.register(window(1));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.ids(), vec![WindowId(1), WindowId(2)]);
    assert_eq!(
        registry.get(WindowId(2)).expect("w2").directory().expect("dir"),
        Path::new("/w2")
    );

    assert!(registry.deregister(WindowId(1)).is_some());
    assert!(registry.deregister(WindowId(1)).is_none());
    assert_eq!(registry.ids(), vec![WindowId(2)]);
}

#[test]
fn snapshot_tolerates_windows_going_away() {
    let registry = WindowRegistry::new();
    registry.register(window(1));
    registry.register(window(2));

    let snapshot = registry.snapshot();
    drop(registry.deregister(WindowId(1)));

    let live: Vec<WindowId> = snapshot
        .iter()
        .filter_map(|w| w.upgrade())
        .map(|w| w.id())
        .collect();
    assert_eq!(live, vec![WindowId(2)]);
}

#[test]
fn fill_flag_only_starts_once() {
    let w = window(1);
    assert!(!w.fill_in_progress());
    assert!(w.begin_fill());
    assert!(!w.begin_fill());
    assert!(w.fill_in_progress());
    w.end_fill();
    assert!(!w.fill_in_progress());
}

#[test]
fn cancel_token_is_shared_with_clones() {
    let w = window(1);
    let task_side = w.token().clone();
    assert!(!w.shutdown_requested());

    task_side.cancel();
    assert!(w.shutdown_requested());
}

#[test]
fn menu_node_is_remembered() {
    let w = window(1);
    assert_eq!(w.menu_node(), None);
    w.set_menu_node(Some(NodeId(3)));
    assert_eq!(w.menu_node(), Some(NodeId(3)));
}
