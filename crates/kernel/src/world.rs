use crate::config::WorldConfig;
use crate::entity::Entity;
use crate::view::{SharedView, same_view};
use glam::Vec3;
use std::collections::{HashMap, HashSet, VecDeque};
use tickworld_common::{Bounds, EntityId};

/// Anything advanced once per simulation tick by an external clock.
pub trait Updatable {
    fn update(&mut self, delta_time: f32);
}

/// The authoritative entity set of a running simulation.
///
/// Structural changes are never applied mid-iteration: `spawn`, `add_entity`
/// and `remove_entity` only record intent, which `step` resolves between
/// ticks (removals first, then additions), before delivering queued events to
/// every live entity in live order.
///
/// The world keeps entities in an arena keyed by [`EntityId`]. Callers, views
/// and other entities refer to an entity by id only. Entities that leave the
/// world are handed back through [`World::drain_detached`]. They accumulate
/// until drained, so a long-running driver should drain once per step.
pub struct World {
    bounds: Bounds,
    entities: HashMap<EntityId, Box<dyn Entity>>,
    /// Live order.
    live: Vec<EntityId>,
    /// Same ids as `live`, for membership checks.
    live_set: HashSet<EntityId>,
    pending_add: Vec<EntityId>,
    pending_remove: Vec<EntityId>,
    /// Removal batch being flushed. Add requests made by hooks strike ids
    /// from it.
    removing: VecDeque<EntityId>,
    views: Vec<SharedView>,
    detached: Vec<(EntityId, Box<dyn Entity>)>,
    tick: u64,
    elapsed: f64,
    /// Delta of the step in progress, exposed to entity hooks.
    delta_time: f32,
}

impl World {
    /// Create an empty world with fixed bounds.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: Bounds::new(width, height),
            entities: HashMap::new(),
            live: Vec::new(),
            live_set: HashSet::new(),
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
            removing: VecDeque::new(),
            views: Vec::new(),
            detached: Vec::new(),
            tick: 0,
            elapsed: 0.0,
            delta_time: 0.0,
        }
    }

    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(config.width, config.height)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    /// Whether a point lies inside the world bounds.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.bounds.contains(point)
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds accumulated over all steps.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.live.len()
    }

    /// Live entity ids in live (insertion) order.
    pub fn live_ids(&self) -> &[EntityId] {
        &self.live
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.live_set.contains(&id)
    }

    pub fn is_pending_add(&self, id: EntityId) -> bool {
        self.pending_add.contains(&id)
    }

    pub fn is_pending_remove(&self, id: EntityId) -> bool {
        self.pending_remove.contains(&id)
    }

    pub fn pending_add_count(&self) -> usize {
        self.pending_add.len()
    }

    pub fn pending_remove_count(&self) -> usize {
        self.pending_remove.len()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Read access to a live entity.
    pub fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        if !self.is_live(id) {
            return None;
        }
        self.entities.get(&id).map(|e| &**e)
    }

    /// Take back every entity that has left the world, in detachment order.
    ///
    /// This includes entities whose attachment was cancelled before they ever
    /// became live. Departed entities stay in the backlog until this is called.
    pub fn drain_detached(&mut self) -> Vec<(EntityId, Box<dyn Entity>)> {
        std::mem::take(&mut self.detached)
    }

    // --- Membership requests ---

    /// Hand a new entity to the world and request its attachment.
    pub fn spawn<E: Entity + 'static>(&mut self, entity: E) -> EntityId {
        self.spawn_boxed(Box::new(entity))
    }

    pub fn spawn_boxed(&mut self, entity: Box<dyn Entity>) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(id, entity);
        self.pending_add.push(id);
        tracing::debug!(entity = %id, "entity spawned");
        id
    }

    /// Request attachment of an entity the world already holds.
    ///
    /// Cancels a pending removal of the same entity, including one in the
    /// removal batch currently being flushed. Requests for entities that are
    /// live, already pending, or no longer held by the world change nothing
    /// else.
    pub fn add_entity(&mut self, id: EntityId) {
        self.pending_remove.retain(|p| *p != id);
        self.removing.retain(|p| *p != id);
        if self.live_set.contains(&id) || self.pending_add.contains(&id) {
            tracing::trace!(entity = %id, "add request absorbed");
            return;
        }
        if !self.entities.contains_key(&id) {
            tracing::trace!(entity = %id, "add request for unknown or detached entity ignored");
            return;
        }
        self.pending_add.push(id);
    }

    /// Request detachment of an entity. Cancels a pending addition of the same
    /// entity. Takes effect at the next step's removal flush.
    pub fn remove_entity(&mut self, id: EntityId) {
        self.pending_add.retain(|p| *p != id);
        if self.pending_remove.contains(&id) {
            tracing::trace!(entity = %id, "remove request absorbed");
            return;
        }
        self.pending_remove.push(id);
    }

    // --- Views ---

    /// Register a view and replay the current live set to it.
    ///
    /// Returns `false` if the same handle is already attached.
    pub fn attach_view(&mut self, view: SharedView) -> bool {
        if self.views.iter().any(|v| same_view(v, &view)) {
            tracing::trace!("view already attached");
            return false;
        }
        self.views.push(view.clone());

        let mut v = view.borrow_mut();
        v.on_attached(self);
        for id in &self.live {
            if let Some(entity) = self.entities.get(id) {
                v.on_entity_added(*id, &**entity);
            }
        }
        tracing::debug!(replayed = self.live.len(), "view attached");
        true
    }

    /// Replay the live set as removals, notify the view and unregister it.
    ///
    /// Returns `false` if the handle was not attached.
    pub fn detach_view(&mut self, view: &SharedView) -> bool {
        let Some(index) = self.views.iter().position(|v| same_view(v, view)) else {
            tracing::trace!("detach of unattached view ignored");
            return false;
        };

        {
            let mut v = view.borrow_mut();
            for id in &self.live {
                if let Some(entity) = self.entities.get(id) {
                    v.on_entity_removed(*id, &**entity);
                }
            }
            v.on_detached(self);
        }
        self.views.remove(index);
        tracing::debug!(replayed = self.live.len(), "view detached");
        true
    }

    // --- Stepping ---

    /// Advance the world by one tick.
    ///
    /// 1. Flush removals in request order.
    /// 2. Flush additions in request order.
    /// 3. Deliver queued events to every live entity in live order.
    ///
    /// Requests issued by entity hooks during any phase land in the queues for
    /// the following flush; a request made during event delivery therefore
    /// takes effect at the next `step`. An add request from a detach hook also
    /// cancels the same entity's removal if it is still in the current batch.
    pub fn step(&mut self, delta_time: f32) {
        self.tick += 1;
        let _span = tracing::debug_span!("world_step", tick = self.tick).entered();

        if delta_time.is_finite() && delta_time >= 0.0 {
            self.delta_time = delta_time;
            self.elapsed += f64::from(delta_time);
        } else {
            tracing::warn!(delta_time, "invalid delta time, not accumulated");
            self.delta_time = 0.0;
        }

        self.flush_removals();
        self.flush_additions();
        self.deliver_events();

        tracing::trace!(
            live = self.live.len(),
            pending_add = self.pending_add.len(),
            pending_remove = self.pending_remove.len(),
            "step complete"
        );
    }

    fn flush_removals(&mut self) {
        self.removing = std::mem::take(&mut self.pending_remove).into();
        while let Some(id) = self.removing.pop_front() {
            if self.live_set.remove(&id) {
                self.live.retain(|l| *l != id);
                let Some(mut entity) = self.entities.remove(&id) else {
                    continue;
                };
                entity.on_removed_from_world(&mut WorldContext::new(self, id));
                for view in &self.views {
                    view.borrow_mut().on_entity_removed(id, &*entity);
                }
                tracing::debug!(entity = %id, "entity detached");
                self.detached.push((id, entity));
            } else if let Some(entity) = self.entities.remove(&id) {
                // Never became live: no hooks, no view callbacks.
                tracing::debug!(entity = %id, "entity released before attachment");
                self.detached.push((id, entity));
            } else {
                tracing::trace!(entity = %id, "removal of unknown entity ignored");
            }
        }
    }

    fn flush_additions(&mut self) {
        let pending = std::mem::take(&mut self.pending_add);
        for id in pending {
            if self.live_set.contains(&id) {
                continue;
            }
            let Some(mut entity) = self.entities.remove(&id) else {
                continue;
            };
            self.live.push(id);
            self.live_set.insert(id);
            entity.on_added_to_world(&mut WorldContext::new(self, id));
            for view in &self.views {
                view.borrow_mut().on_entity_added(id, &*entity);
            }
            self.entities.insert(id, entity);
            tracing::debug!(entity = %id, "entity attached");
        }

        // A hook may have re-requested an entity attached later in this batch.
        let live = &self.live_set;
        self.pending_add.retain(|id| !live.contains(id));
    }

    fn deliver_events(&mut self) {
        // The live set cannot change during delivery: hooks only queue requests.
        for index in 0..self.live.len() {
            let id = self.live[index];
            let Some(mut entity) = self.entities.remove(&id) else {
                continue;
            };
            entity.process_events(&mut WorldContext::new(self, id));
            self.entities.insert(id, entity);
        }
    }

    // --- Queries ---

    fn live_entities(&self) -> impl Iterator<Item = (EntityId, &dyn Entity)> + '_ {
        self.live
            .iter()
            .filter_map(|id| self.entities.get(id).map(|e| (*id, &**e)))
    }

    /// First live entity, in live order, matching `predicate`.
    pub fn find_entity<P>(&self, mut predicate: P) -> Option<EntityId>
    where
        P: FnMut(EntityId, &dyn Entity) -> bool,
    {
        self.live_entities()
            .find(|(id, entity)| predicate(*id, *entity))
            .map(|(id, _)| id)
    }

    /// First live entity whose concrete type is `T`.
    pub fn find_entity_of<T: Entity + 'static>(&self) -> Option<(EntityId, &T)> {
        self.live_entities()
            .find_map(|(id, entity)| entity.downcast_ref::<T>().map(|t| (id, t)))
    }

    /// Closest live entity matching `predicate` within `max_distance` of
    /// `point`, measured on the XY plane. Ties go to the earlier live entity.
    pub fn find_nearest_entity<P>(
        &self,
        mut predicate: P,
        max_distance: f32,
        point: Vec3,
    ) -> Option<EntityId>
    where
        P: FnMut(EntityId, &dyn Entity) -> bool,
    {
        let origin = point.truncate();
        let mut best: Option<(EntityId, f32)> = None;
        for (id, entity) in self.live_entities() {
            if !predicate(id, entity) {
                continue;
            }
            let distance = entity.position().truncate().distance(origin);
            if distance > max_distance {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Visit every live entity in live order.
    pub fn execute_operation<F>(&self, mut visitor: F)
    where
        F: FnMut(EntityId, &dyn Entity),
    {
        for (id, entity) in self.live_entities() {
            visitor(id, entity);
        }
    }
}

impl Updatable for World {
    fn update(&mut self, delta_time: f32) {
        self.step(delta_time);
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("bounds", &self.bounds)
            .field("tick", &self.tick)
            .field("live", &self.live)
            .field("pending_add", &self.pending_add)
            .field("pending_remove", &self.pending_remove)
            .field("views", &self.views.len())
            .finish()
    }
}

/// Restricted world handle passed to entity hooks.
///
/// Membership requests made here are deferred exactly like calls on the world
/// itself. The entity being dispatched is checked out while its hook runs, so
/// queries made through its own context do not see it.
pub struct WorldContext<'w> {
    world: &'w mut World,
    id: EntityId,
}

impl<'w> WorldContext<'w> {
    fn new(world: &'w mut World, id: EntityId) -> Self {
        Self { world, id }
    }

    /// Id of the entity whose hook is running.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn tick(&self) -> u64 {
        self.world.tick
    }

    /// Delta time of the step in progress.
    pub fn delta_time(&self) -> f32 {
        self.world.delta_time
    }

    pub fn bounds(&self) -> Bounds {
        self.world.bounds
    }

    pub fn spawn<E: Entity + 'static>(&mut self, entity: E) -> EntityId {
        self.world.spawn(entity)
    }

    pub fn add_entity(&mut self, id: EntityId) {
        self.world.add_entity(id);
    }

    pub fn remove_entity(&mut self, id: EntityId) {
        self.world.remove_entity(id);
    }

    /// Request detachment of the entity whose hook is running.
    pub fn remove_self(&mut self) {
        let id = self.id;
        self.world.remove_entity(id);
    }

    pub fn is_live(&self, id: EntityId) -> bool {
        self.world.is_live(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        self.world.entity(id)
    }

    /// Mutable access to another live entity, e.g. to post into its mailbox.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Entity> {
        if !self.world.is_live(id) {
            return None;
        }
        match self.world.entities.get_mut(&id) {
            Some(entity) => Some(&mut **entity),
            None => None,
        }
    }

    pub fn find_entity<P>(&self, predicate: P) -> Option<EntityId>
    where
        P: FnMut(EntityId, &dyn Entity) -> bool,
    {
        self.world.find_entity(predicate)
    }

    pub fn find_entity_of<T: Entity + 'static>(&self) -> Option<(EntityId, &T)> {
        self.world.find_entity_of::<T>()
    }

    pub fn find_nearest_entity<P>(
        &self,
        predicate: P,
        max_distance: f32,
        point: Vec3,
    ) -> Option<EntityId>
    where
        P: FnMut(EntityId, &dyn Entity) -> bool,
    {
        self.world.find_nearest_entity(predicate, max_distance, point)
    }

    pub fn execute_operation<F>(&self, visitor: F)
    where
        F: FnMut(EntityId, &dyn Entity),
    {
        self.world.execute_operation(visitor);
    }
}
