//! Off-screen bookkeeping for in-flight renders.
//!
//! A layout tree is mounted while it is being rasterized and must be
//! unmounted afterwards no matter how the render ends. Both the mount and
//! the "generating" flag are scoped guards so that every exit path,
//! including `?` and panics, releases them.

use dossier_layout::LayoutTree;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Mounted = Vec<(u64, Arc<LayoutTree>)>;

/// The set of layout trees currently mounted for rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderTree {
    nodes: Arc<Mutex<Mounted>>,
    next_id: Arc<AtomicU64>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `tree`; it stays mounted until the returned node is dropped.
    pub fn mount(&self, tree: LayoutTree) -> MountedNode {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tree = Arc::new(tree);
        self.lock().push((id, tree.clone()));
        log::trace!("mounted layout node {}", id);
        MountedNode {
            id,
            tree,
            owner: self.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn unmount(&self, id: u64) {
        self.lock().retain(|(mounted, _)| *mounted != id);
        log::trace!("unmounted layout node {}", id);
    }

    // A poisoned lock only means a render panicked; the list is still valid.
    fn lock(&self) -> MutexGuard<'_, Mounted> {
        self.nodes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A layout tree attached to a [`RenderTree`]. Unmounts itself on drop.
#[derive(Debug)]
pub struct MountedNode {
    id: u64,
    tree: Arc<LayoutTree>,
    owner: RenderTree,
}

impl MountedNode {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }
}

impl Drop for MountedNode {
    fn drop(&mut self) {
        self.owner.unmount(self.id);
    }
}

/// Whether an export is currently running.
#[derive(Debug, Clone, Default)]
pub struct GeneratingState {
    flag: Arc<AtomicBool>,
}

impl GeneratingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag, or returns `None` if it is already set.
    pub fn begin(&self) -> Option<GeneratingGuard> {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GeneratingGuard {
                flag: self.flag.clone(),
            })
    }

    pub fn is_generating(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Clears the generating flag when dropped.
#[derive(Debug)]
pub struct GeneratingGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for GeneratingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mounted_nodes_unmount_on_drop() {
        let tree = RenderTree::new();
        let a = tree.mount(LayoutTree::new(100.0));
        let b = tree.mount(LayoutTree::new(200.0));
        assert_eq!(tree.len(), 2);
        assert_ne!(a.id(), b.id());
        assert_eq!(b.tree().width, 200.0);

        drop(a);
        assert_eq!(tree.len(), 1);
        drop(b);
        assert!(tree.is_empty());
    }

    #[test]
    fn node_is_released_when_a_render_fails() {
        let tree = RenderTree::new();
        let attempt = |tree: &RenderTree| -> Result<(), &'static str> {
            let _node = tree.mount(LayoutTree::new(10.0));
            Err("render failed")
        };
        assert!(attempt(&tree).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn generating_flag_is_exclusive_and_scoped() {
        let state = GeneratingState::new();
        let guard = state.begin().unwrap();
        assert!(state.is_generating());
        assert!(state.begin().is_none());

        drop(guard);
        assert!(!state.is_generating());
        assert!(state.begin().is_some());
    }
}
