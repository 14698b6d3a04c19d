use crate::types::TileCoord;
use serde::{Deserialize, Serialize};

/// Axis-aligned tile rectangle. `x2`/`y2` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect {
            x1: x,
            y1: y,
            x2: x + w,
            y2: y + h,
        }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> TileCoord {
        TileCoord::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.x1 && coord.x < self.x2 && coord.y >= self.y1 && coord.y < self.y2
    }

    /// Overlap test with `margin` tiles of required clearance between the two.
    pub fn intersects(&self, other: &Rect, margin: i32) -> bool {
        self.x1 - margin < other.x2
            && self.x2 + margin > other.x1
            && self.y1 - margin < other.y2
            && self.y2 + margin > other.y1
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.y1..self.y2).flat_map(move |y| (self.x1..self.x2).map(move |x| TileCoord::new(x, y)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    Start,
    Combat,
    Treasure,
    Boss,
    Exit,
}

impl RoomKind {
    /// Rooms with working lights; everything else is dark.
    pub fn is_lit(&self) -> bool {
        matches!(self, RoomKind::Start | RoomKind::Treasure | RoomKind::Boss)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub index: usize,
    pub bounds: Rect,
    pub kind: RoomKind,
    pub lit: bool,
}

/// An L-shaped corridor between two room centres: a horizontal run on the
/// `from` row followed by a vertical run on the `to` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub from_room: usize,
    pub to_room: usize,
    pub tiles: Vec<TileCoord>,
}

impl Corridor {
    pub fn l_shaped(from_room: usize, to_room: usize, from: TileCoord, to: TileCoord) -> Self {
        let mut tiles = Vec::new();
        let step_x = if to.x >= from.x { 1 } else { -1 };
        let mut x = from.x;
        loop {
            tiles.push(TileCoord::new(x, from.y));
            if x == to.x {
                break;
            }
            x += step_x;
        }
        let step_y = if to.y >= from.y { 1 } else { -1 };
        let mut y = from.y;
        while y != to.y {
            y += step_y;
            tiles.push(TileCoord::new(to.x, y));
        }
        Corridor {
            from_room,
            to_room,
            tiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersects_with_margin() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(6, 0, 5, 5);
        assert!(!a.intersects(&b, 0));
        assert!(a.intersects(&b, 2));
        assert!(a.intersects(&Rect::new(4, 4, 3, 3), 0));
    }

    #[test]
    fn test_l_shaped_corridor_is_contiguous() {
        let corridor = Corridor::l_shaped(0, 1, TileCoord::new(2, 2), TileCoord::new(8, 10));
        assert_eq!(corridor.tiles.first(), Some(&TileCoord::new(2, 2)));
        assert_eq!(corridor.tiles.last(), Some(&TileCoord::new(8, 10)));
        // Horizontal run on the start row, then vertical on the end column
        assert!(corridor.tiles.contains(&TileCoord::new(8, 2)));
        for pair in corridor.tiles.windows(2) {
            let step = (pair[0].x - pair[1].x).abs() + (pair[0].y - pair[1].y).abs();
            assert_eq!(step, 1);
        }
        assert_eq!(corridor.tiles.len(), 6 + 8 + 1);
    }

    #[test]
    fn test_corridor_handles_reverse_direction() {
        let corridor = Corridor::l_shaped(0, 1, TileCoord::new(10, 10), TileCoord::new(3, 3));
        assert_eq!(corridor.tiles.last(), Some(&TileCoord::new(3, 3)));
        assert_eq!(corridor.tiles.len(), 7 + 7 + 1);
    }

    #[test]
    fn test_room_kind_lighting() {
        assert!(RoomKind::Start.is_lit());
        assert!(!RoomKind::Combat.is_lit());
        assert!(!RoomKind::Exit.is_lit());
    }
}
