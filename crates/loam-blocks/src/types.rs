use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Voxel kinds produced by terrain generation and player edits.
///
/// `Nothing` is never stored by generation; it is what lookups return for
/// positions outside every loaded chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BlockType {
    Nothing = 0,
    #[default]
    Air = 1,
    Grass = 2,
    Dirt = 3,
    Stone = 4,
    Sand = 5,
    Water = 6,
    TreeTrunk = 7,
    TreeLeaves = 8,
}

impl BlockType {
    pub const ALL: [BlockType; 9] = [
        BlockType::Nothing,
        BlockType::Air,
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::Sand,
        BlockType::Water,
        BlockType::TreeTrunk,
        BlockType::TreeLeaves,
    ];

    #[inline]
    pub fn is_solid(self) -> bool {
        !matches!(self, BlockType::Nothing | BlockType::Air | BlockType::Water)
    }

    #[inline]
    pub fn is_liquid(self) -> bool {
        matches!(self, BlockType::Water)
    }

    /// Whether a face of `self` is visible when `neighbor` sits against it.
    /// Unloaded neighbors (`Nothing`) hide faces so chunk borders facing
    /// missing data do not emit walls.
    #[inline]
    pub fn shows_face_against(self, neighbor: BlockType) -> bool {
        match self {
            BlockType::Nothing | BlockType::Air => false,
            BlockType::Water => neighbor == BlockType::Air,
            _ => !matches!(neighbor, BlockType::Nothing) && !neighbor.is_solid(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Nothing => "nothing",
            BlockType::Air => "air",
            BlockType::Grass => "grass",
            BlockType::Dirt => "dirt",
            BlockType::Stone => "stone",
            BlockType::Sand => "sand",
            BlockType::Water => "water",
            BlockType::TreeTrunk => "tree_trunk",
            BlockType::TreeLeaves => "tree_leaves",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownBlock(pub String);

impl fmt::Display for UnknownBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown block name: {}", self.0)
    }
}

impl std::error::Error for UnknownBlock {}

impl FromStr for BlockType {
    type Err = UnknownBlock;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .copied()
            .find(|b| b.name() == s)
            .ok_or_else(|| UnknownBlock(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_name() {
        for b in BlockType::ALL {
            assert_eq!(b.name().parse::<BlockType>(), Ok(b));
        }
        assert!("obsidian".parse::<BlockType>().is_err());
    }

    #[test]
    fn solid_faces_show_against_air_and_water_only() {
        assert!(BlockType::Stone.shows_face_against(BlockType::Air));
        assert!(BlockType::Stone.shows_face_against(BlockType::Water));
        assert!(!BlockType::Stone.shows_face_against(BlockType::Dirt));
        assert!(!BlockType::Stone.shows_face_against(BlockType::Nothing));
    }

    #[test]
    fn water_faces_show_against_air_only() {
        assert!(BlockType::Water.shows_face_against(BlockType::Air));
        assert!(!BlockType::Water.shows_face_against(BlockType::Water));
        assert!(!BlockType::Water.shows_face_against(BlockType::Sand));
        assert!(!BlockType::Air.shows_face_against(BlockType::Air));
    }

    #[test]
    fn deserializes_snake_case_names() {
        #[derive(serde::Deserialize)]
        struct Row {
            block: BlockType,
        }
        let row: Row = toml::from_str("block = \"tree_trunk\"").unwrap();
        assert_eq!(row.block, BlockType::TreeTrunk);
    }
}
