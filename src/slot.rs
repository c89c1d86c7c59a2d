//! Atomically swappable upstream references.

use alloc::sync::Arc;

use arc_swap::{ArcSwapOption, Guard};

use crate::node::SharedNode;

/// A loaded slot: holds the upstream node alive for the rest of the call.
pub type SlotGuard = Guard<Option<Arc<SharedNode>>>;

/// Zero-or-one upstream node, replaced with a single atomic exchange.
///
/// The control thread installs and removes nodes with [`swap`](Self::swap);
/// the audio thread [`load`](Self::load)s once per call. A reader therefore
/// sees either the old or the new node for the whole call, never a mix.
///
/// `arc_swap` only stores sized pointees, hence the extra `Arc` around the
/// trait object. The outer allocation happens on the control thread.
#[derive(Default)]
pub struct InputSlot {
    node: ArcSwapOption<SharedNode>,
}

impl InputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the current node. Wait-free; does not allocate.
    #[inline]
    pub fn load(&self) -> SlotGuard {
        self.node.load()
    }

    /// Load the current node once and apply `f` to it.
    ///
    /// `None` when nothing is attached. Used for transport delegation.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&SharedNode) -> R) -> Option<R> {
        let node = self.node.load();
        node.as_deref().map(f)
    }

    /// Install `node` (or clear the slot) and return what was there before.
    pub fn swap(&self, node: Option<SharedNode>) -> Option<SharedNode> {
        self.node
            .swap(node.map(Arc::new))
            .map(|previous| SharedNode::clone(&previous))
    }

    /// A new reference to the current node. Control thread only.
    pub fn get(&self) -> Option<SharedNode> {
        self.node.load_full().map(|node| SharedNode::clone(&node))
    }

    pub fn is_attached(&self) -> bool {
        self.node.load().is_some()
    }
}

impl core::fmt::Debug for InputSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let node = self.node.load();
        f.debug_struct("InputSlot")
            .field("node", &node.as_deref().map(|n| n.name()))
            .finish()
    }
}
