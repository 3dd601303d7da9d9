use std::collections::HashSet;
use tickworld_common::EntityId;
use tickworld_kernel::{Entity, World, WorldView};

/// One callback received by a [`ViewRecorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCallback {
    Attached,
    Detached,
    Added(EntityId),
    Removed(EntityId),
}

/// A view that logs every callback it receives and mirrors the entity set.
///
/// Useful to check that a world keeps a view's stream balanced: after
/// detaching, every entity the recorder was told about has been removed
/// exactly once.
#[derive(Debug, Default)]
pub struct ViewRecorder {
    log: Vec<ViewCallback>,
    mirrored: HashSet<EntityId>,
    violations: usize,
}

impl ViewRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &[ViewCallback] {
        &self.log
    }

    /// Entities currently mirrored (added and not yet removed).
    pub fn mirrored(&self) -> &HashSet<EntityId> {
        &self.mirrored
    }

    pub fn added_count(&self) -> usize {
        self.count(|c| matches!(c, ViewCallback::Added(_)))
    }

    pub fn removed_count(&self) -> usize {
        self.count(|c| matches!(c, ViewCallback::Removed(_)))
    }

    /// No entity is still mirrored and no callback arrived out of turn
    /// (a duplicate add, or a removal of something never added).
    pub fn is_balanced(&self) -> bool {
        self.mirrored.is_empty() && self.violations == 0
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    fn count(&self, pred: impl Fn(&ViewCallback) -> bool) -> usize {
        self.log.iter().filter(|c| pred(c)).count()
    }
}

impl WorldView for ViewRecorder {
    fn on_attached(&mut self, world: &World) {
        tracing::debug!(live = world.entity_count(), "recorder attached");
        self.log.push(ViewCallback::Attached);
    }

    fn on_detached(&mut self, _world: &World) {
        self.log.push(ViewCallback::Detached);
    }

    fn on_entity_added(&mut self, id: EntityId, _entity: &dyn Entity) {
        if !self.mirrored.insert(id) {
            tracing::warn!(entity = %id, "entity added twice");
            self.violations += 1;
        }
        self.log.push(ViewCallback::Added(id));
    }

    fn on_entity_removed(&mut self, id: EntityId, _entity: &dyn Entity) {
        if !self.mirrored.remove(&id) {
            tracing::warn!(entity = %id, "entity removed without being added");
            self.violations += 1;
        }
        self.log.push(ViewCallback::Removed(id));
    }
}
