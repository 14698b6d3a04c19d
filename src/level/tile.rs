use serde::{Deserialize, Serialize};

/// Door state. Only `locked` affects movement and sight; `open` is the
/// presentational state (doors slide open when something stands next to them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub locked: bool,
    pub open: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Wall,
    Floor,
    Door(Door),
}

impl Tile {
    pub fn blocks_movement(&self) -> bool {
        match self {
            Tile::Wall => true,
            Tile::Floor => false,
            Tile::Door(door) => door.locked,
        }
    }

    // Unlocked doors are transparent whether or not they are drawn open
    pub fn blocks_sight(&self) -> bool {
        self.blocks_movement()
    }

    pub fn is_door(&self) -> bool {
        matches!(self, Tile::Door(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_door_blocks() {
        let locked = Tile::Door(Door {
            locked: true,
            open: false,
        });
        assert!(locked.blocks_movement());
        assert!(locked.blocks_sight());
    }

    #[test]
    fn test_unlocked_closed_door_is_transparent() {
        let closed = Tile::Door(Door {
            locked: false,
            open: false,
        });
        assert!(!closed.blocks_movement());
        assert!(!closed.blocks_sight());
        assert!(Tile::Wall.blocks_sight());
        assert!(!Tile::Floor.blocks_movement());
    }
}
