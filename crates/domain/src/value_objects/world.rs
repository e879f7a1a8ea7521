//! Block-level vocabulary shared with the world collaborator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub fn relative(self, direction: Direction, distance: i32) -> Self {
        let (dx, dz) = direction.step();
        self.offset(dx * distance, 0, dz * distance)
    }

    /// Centre of the block's floor, where an actor would stand.
    pub fn bottom_center(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y),
            f64::from(self.z) + 0.5,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_sq(&self, other: &Vec3) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    pub fn block(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    /// A point `distance` further away from `from` along the horizontal plane.
    pub fn away_from(&self, from: &Vec3, distance: f64) -> Vec3 {
        let (dx, dz) = (self.x - from.x, self.z - from.z);
        let len = (dx * dx + dz * dz).sqrt();
        if len < f64::EPSILON {
            return Vec3::new(self.x + distance, self.y, self.z);
        }
        Vec3::new(
            self.x + dx / len * distance,
            self.y,
            self.z + dz / len * distance,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Unit (dx, dz) step.
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DyeColor {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    LightGray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

impl DyeColor {
    pub const ALL: [DyeColor; 16] = [
        DyeColor::White,
        DyeColor::Orange,
        DyeColor::Magenta,
        DyeColor::LightBlue,
        DyeColor::Yellow,
        DyeColor::Lime,
        DyeColor::Pink,
        DyeColor::Gray,
        DyeColor::LightGray,
        DyeColor::Cyan,
        DyeColor::Purple,
        DyeColor::Blue,
        DyeColor::Brown,
        DyeColor::Green,
        DyeColor::Red,
        DyeColor::Black,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorMaterial {
    Oak,
    Spruce,
    Birch,
    Jungle,
    Acacia,
    DarkOak,
    Crimson,
    Warped,
    Iron,
}

impl DoorMaterial {
    /// Materials a tampered door can be swapped to.
    pub const REPLACEMENTS: [DoorMaterial; 8] = [
        DoorMaterial::Spruce,
        DoorMaterial::Birch,
        DoorMaterial::Jungle,
        DoorMaterial::Acacia,
        DoorMaterial::DarkOak,
        DoorMaterial::Crimson,
        DoorMaterial::Warped,
        DoorMaterial::Iron,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flower {
    Poppy,
    Dandelion,
    BlueOrchid,
    Allium,
    AzureBluet,
    RedTulip,
    WhiteTulip,
    PinkTulip,
    OxeyeDaisy,
}

impl Flower {
    pub const ALL: [Flower; 9] = [
        Flower::Poppy,
        Flower::Dandelion,
        Flower::BlueOrchid,
        Flower::Allium,
        Flower::AzureBluet,
        Flower::RedTulip,
        Flower::WhiteTulip,
        Flower::PinkTulip,
        Flower::OxeyeDaisy,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Air,
    Stone,
    Grass,
    Dirt,
    Podzol,
    Farmland,
    Crop,
    Cobblestone,
    MossyCobblestone,
    OakPlanks,
    OakSlab,
    GlassPane,
    Torch,
    WallTorch,
    Flower(Flower),
    Bed(DyeColor),
    Door(DoorMaterial),
    OakSign,
    Chest,
    Other,
}

impl BlockKind {
    pub fn is_air(self) -> bool {
        self == BlockKind::Air
    }

    /// Full opaque cube, something a sign or pillar can stand on.
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            BlockKind::Stone
                | BlockKind::Grass
                | BlockKind::Dirt
                | BlockKind::Podzol
                | BlockKind::Cobblestone
                | BlockKind::MossyCobblestone
                | BlockKind::OakPlanks
                | BlockKind::Other
        )
    }

    pub fn is_torch(self) -> bool {
        matches!(self, BlockKind::Torch | BlockKind::WallTorch)
    }

    pub fn supports_flowers(self) -> bool {
        matches!(self, BlockKind::Grass | BlockKind::Dirt | BlockKind::Podzol)
    }
}

/// Which piece of a multi-block structure a cell is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockPart {
    #[default]
    Single,
    Lower,
    Upper,
    Head,
    Foot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockState {
    pub kind: BlockKind,
    pub facing: Direction,
    pub part: BlockPart,
    pub open: bool,
    pub hinge_right: bool,
    /// Standing sign rotation, 0..16.
    pub rotation: u8,
}

impl BlockState {
    pub const AIR: BlockState = BlockState {
        kind: BlockKind::Air,
        facing: Direction::North,
        part: BlockPart::Single,
        open: false,
        hinge_right: false,
        rotation: 0,
    };

    pub fn of(kind: BlockKind) -> Self {
        Self {
            kind,
            ..Self::AIR
        }
    }

    pub fn facing(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }

    pub fn part(mut self, part: BlockPart) -> Self {
        self.part = part;
        self
    }

    pub fn rotation(mut self, rotation: u8) -> Self {
        self.rotation = rotation % 16;
        self
    }

    pub fn is_air(&self) -> bool {
        self.kind.is_air()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Torch,
    RottenFlesh,
    LeatherHelmet,
    LeatherChestplate,
    LeatherLeggings,
    LeatherBoots,
    Bread,
    Dirt,
    WoodenPickaxe,
    Flower(Flower),
}

impl ItemKind {
    pub fn max_damage(self) -> u32 {
        match self {
            ItemKind::LeatherHelmet => 55,
            ItemKind::LeatherChestplate => 80,
            ItemKind::LeatherLeggings => 75,
            ItemKind::LeatherBoots => 65,
            ItemKind::WoodenPickaxe => 59,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemKind,
    pub count: u32,
    pub damage: u32,
}

impl ItemStack {
    pub fn new(item: ItemKind, count: u32) -> Self {
        Self {
            item,
            count,
            damage: 0,
        }
    }

    pub fn damaged(item: ItemKind, damage: u32) -> Self {
        Self {
            item,
            count: 1,
            damage,
        }
    }

    pub fn single(mut self) -> Self {
        self.count = 1;
        self
    }
}
