use crate::entity::Entity;
use crate::world::World;
use std::cell::RefCell;
use std::rc::Rc;
use tickworld_common::EntityId;

/// An observer mirroring world membership.
///
/// Side systems (renderers, audio, debug overlays) use views to keep per-entity
/// state in sync without owning entities. Over a view's attached lifetime every
/// `on_entity_added` is matched by exactly one `on_entity_removed`, including
/// entities that were already live when the view attached.
pub trait WorldView {
    fn on_attached(&mut self, _world: &World) {}

    fn on_detached(&mut self, _world: &World) {}

    fn on_entity_added(&mut self, id: EntityId, entity: &dyn Entity);

    fn on_entity_removed(&mut self, id: EntityId, entity: &dyn Entity);
}

/// Shared handle to a view. The world keeps a clone for dispatch; the caller
/// keeps its own to read the view's state and to detach it later.
pub type SharedView = Rc<RefCell<dyn WorldView>>;

/// View identity is handle identity, not value equality.
pub(crate) fn same_view(a: &SharedView, b: &SharedView) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(usize);

    impl WorldView for Counter {
        fn on_entity_added(&mut self, _id: EntityId, _entity: &dyn Entity) {
            self.0 += 1;
        }

        fn on_entity_removed(&mut self, _id: EntityId, _entity: &dyn Entity) {
            self.0 -= 1;
        }
    }

    #[test]
    fn identity_is_by_handle() {
        let a: SharedView = Rc::new(RefCell::new(Counter(0)));
        let a2 = a.clone();
        let b: SharedView = Rc::new(RefCell::new(Counter(0)));

        assert!(same_view(&a, &a2));
        assert!(!same_view(&a, &b));
    }
}
