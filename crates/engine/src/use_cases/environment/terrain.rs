//! Looking around the player for somewhere to act.

use minefriend_domain::{BlockPos, BlockState, WorldId};

use crate::infrastructure::ports::{RandomPort, WorldPort};
use crate::infrastructure::random::{offset, shuffle};

const SCAN_HEIGHT: i32 = 4;

/// A random cell within a cube around `center` whose state satisfies `wanted`.
///
/// The cube spans `radius` horizontally and four cells vertically. Cells whose
/// neighbourhood is not loaded are skipped.
pub fn find_nearby_block(
    world: &dyn WorldPort,
    random: &dyn RandomPort,
    world_id: WorldId,
    center: BlockPos,
    radius: i32,
    wanted: impl Fn(&BlockState) -> bool,
) -> Option<BlockPos> {
    let mut cells = Vec::new();
    for dx in -radius..=radius {
        for dy in -SCAN_HEIGHT..=SCAN_HEIGHT {
            for dz in -radius..=radius {
                cells.push(center.offset(dx, dy, dz));
            }
        }
    }
    shuffle(random, &mut cells);
    cells
        .into_iter()
        .filter(|pos| world.is_area_loaded(world_id, *pos, 1))
        .find(|pos| wanted(&world.block(world_id, *pos)))
}

/// The surface cell of a column at a random offset from `origin`.
pub fn random_surface(
    world: &dyn WorldPort,
    random: &dyn RandomPort,
    world_id: WorldId,
    origin: BlockPos,
    spread: i32,
) -> BlockPos {
    let x = origin.x + offset(random, spread);
    let z = origin.z + offset(random, spread);
    world.surface(world_id, x, z)
}

/// Free cell standing on something solid, where a sign or pillar can go.
pub fn is_open_ground(world: &dyn WorldPort, world_id: WorldId, pos: BlockPos) -> bool {
    world.block(world_id, pos).is_air() && world.block(world_id, pos.below()).kind.is_solid()
}
