use std::path::PathBuf;

use log::debug;
use serde::Serialize;

use crate::{
    browser::Browser,
    error::Result,
    store::NodeId,
    window::WindowId,
};

/// What a context menu opened over a record applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MenuTargets {
    /// Records the menu commands act on.
    pub count: usize,
    /// At least one of them can be opened in a new window.
    pub any_directory: bool,
}

impl Browser {
    /// Start a context-menu session over `node` (`None` for empty space).
    ///
    /// If `node` is part of the current `selected` set, the menu applies to
    /// the whole selection; otherwise only to `node`. Marks left over from a
    /// previous session are cleared first.
    pub fn begin_menu(
        &self,
        window: WindowId,
        node: Option<NodeId>,
        selected: &[NodeId],
    ) -> Result<MenuTargets> {
        let result = self.lookup(window).and_then(|win| {
            let store = win.store();
            store.clear_selection();
            win.set_menu_node(node);

            let Some(node) = node else {
                return Ok(MenuTargets::default());
            };
            let marked = if selected.contains(&node) {
                selected.to_vec()
            } else {
                vec![node]
            };
            store.set_selected(&marked, true)?;

            Ok(MenuTargets {
                count: marked.len(),
                any_directory: marked
                    .iter()
                    .filter_map(|&n| store.record(n))
                    .any(|r| r.is_navigable()),
            })
        });
        self.reported(Some(window), result)
    }

    /// Open a sharing window for every marked directory of the current menu
    /// session. Files and `.`/`..` are skipped.
    pub fn spawn_selected(&self, window: WindowId) -> Result<Vec<WindowId>> {
        let win = self.reported(Some(window), self.lookup(window))?;
        if win.menu_node().is_none() {
            return Ok(Vec::new());
        }

        let mut spawned = Vec::new();
        for node in win.store().selected_nodes() {
            let navigable = win.store().record(node).is_some_and(|r| r.is_navigable());
            if !navigable {
                continue;
            }
            // Failures are reported by spawn_window; keep going with the rest.
            if let Ok(id) = self.spawn_window(window, node) {
                spawned.push(id);
            }
        }
        Ok(spawned)
    }

    /// Every other open window and the directory it shows.
    pub fn other_windows(&self, window: WindowId) -> Vec<(WindowId, PathBuf)> {
        self.registry()
            .snapshot()
            .iter()
            .filter_map(|weak| weak.upgrade())
            .filter(|w| w.id() != window)
            .filter_map(|w| Some((w.id(), w.directory().ok()?)))
            .collect()
    }

    pub fn end_menu(&self, window: WindowId) -> Result<()> {
        let win = self.reported(Some(window), self.lookup(window))?;
        win.set_menu_node(None);
        Ok(())
    }

    /// Double-click on `node`: directories open in a new sharing window,
    /// anything else is ignored.
    pub fn activate(&self, window: WindowId, node: NodeId) -> Result<Option<WindowId>> {
        let win = self.reported(Some(window), self.lookup(window))?;
        let navigable = win.store().record(node).is_some_and(|r| r.is_navigable());
        if !navigable {
            debug!("[menu] window {window}: {node} is not a directory to open");
            return Ok(None);
        }
        self.spawn_window(window, node).map(Some)
    }
}

#[cfg(test)]
#[path = "menu_tests.rs"]
mod tests;
