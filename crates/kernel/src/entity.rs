use crate::world::WorldContext;
use glam::Vec3;
use std::any::Any;

/// A simulated object living in a [`World`](crate::World).
///
/// The world calls into an entity at three points: when it becomes live, when
/// it is detached, and once per step to drain its queued events. Every hook
/// receives a [`WorldContext`] through which the entity may request further
/// membership changes; those requests are deferred to the next flush.
pub trait Entity {
    /// Called once, right after the entity joins the live set.
    fn on_added_to_world(&mut self, _ctx: &mut WorldContext<'_>) {}

    /// Called once, right after the entity leaves the live set. Detachment is
    /// terminal for this identity.
    fn on_removed_from_world(&mut self, _ctx: &mut WorldContext<'_>) {}

    /// Drain and dispatch the events queued since the last call.
    fn process_events(&mut self, ctx: &mut WorldContext<'_>);

    /// Position used by distance-qualified queries.
    fn position(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// Get this entity as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Get this entity as mutable Any for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn Entity + 'a {
    /// Typed view of the entity if its concrete type is `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rock;

    impl Entity for Rock {
        fn process_events(&mut self, _ctx: &mut WorldContext<'_>) {}

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Bird {
        height: f32,
    }

    impl Entity for Bird {
        fn process_events(&mut self, _ctx: &mut WorldContext<'_>) {}

        fn position(&self) -> Vec3 {
            Vec3::new(0.0, self.height, 0.0)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn default_position_is_origin() {
        assert_eq!(Rock.position(), Vec3::ZERO);
        assert_eq!(Bird { height: 3.0 }.position(), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn downcast_by_concrete_type() {
        let mut boxed: Box<dyn Entity> = Box::new(Bird { height: 1.0 });
        assert!(boxed.is::<Bird>());
        assert!(!boxed.is::<Rock>());
        assert!(boxed.downcast_ref::<Rock>().is_none());

        boxed.downcast_mut::<Bird>().unwrap().height = 7.5;
        assert_eq!(boxed.downcast_ref::<Bird>().unwrap().height, 7.5);
    }
}
