use tickworld_common::{Bounds, EntityId};
use tickworld_kernel::World;

/// Read-only queries against a world for debugging and CLI output.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        WorldSummary {
            tick: world.tick(),
            elapsed: world.elapsed(),
            live: world.entity_count(),
            pending_add: world.pending_add_count(),
            pending_remove: world.pending_remove_count(),
            views: world.view_count(),
            bounds: world.bounds(),
        }
    }

    /// Position of a live entity.
    pub fn inspect_entity(world: &World, id: EntityId) -> Option<EntityInfo> {
        world.entity(id).map(|entity| {
            let p = entity.position();
            EntityInfo {
                id,
                position: [p.x, p.y, p.z],
            }
        })
    }

    /// Live entity ids in live order.
    pub fn list_entities(world: &World) -> Vec<EntityId> {
        world.live_ids().to_vec()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone)]
pub struct WorldSummary {
    pub tick: u64,
    pub elapsed: f64,
    pub live: usize,
    pub pending_add: usize,
    pub pending_remove: usize,
    pub views: usize,
    pub bounds: Bounds,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World {}x{}: tick={} elapsed={:.3}s live={} pending_add={} pending_remove={} views={}",
            self.bounds.width(),
            self.bounds.height(),
            self.tick,
            self.elapsed,
            self.live,
            self.pending_add,
            self.pending_remove,
            self.views
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub position: [f32; 3],
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity [{}] pos=({:.2}, {:.2}, {:.2})",
            self.id, self.position[0], self.position[1], self.position[2],
        )
    }
}
