use std::ops::{Add, Sub};

use image::RgbImage;
use serde::Deserialize;
use thiserror::Error;

pub const TILE_SIZE_PX: u32 = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Moves toward `target` by at most `max_distance`; lands exactly on the
    /// target once the remaining distance fits inside the step.
    pub fn move_toward(self, target: Vec2, max_distance: f32) -> Vec2 {
        let delta = target - self;
        let distance = delta.length();
        if distance <= max_distance + MOVE_TOWARD_SLACK || distance == 0.0 {
            return target;
        }
        let scale = max_distance / distance;
        Vec2 {
            x: self.x + delta.x * scale,
            y: self.y + delta.y * scale,
        }
    }
}

// Absorbs f32 accumulation error so a whole number of steps lands on the target.
const MOVE_TOWARD_SLACK: f32 = 1.0e-4;

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncates toward zero, the same conversion passability lookups use.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            x: position.x.trunc() as i32,
            y: position.y.trunc() as i32,
        }
    }

    pub fn to_position(self) -> Vec2 {
        Vec2 {
            x: self.x as f32,
            y: self.y as f32,
        }
    }
}

/// Discriminants double as the column index into per-action frame tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up = 0,
    #[default]
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Up, Facing::Down, Facing::Left, Facing::Right];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn unit_vector(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub const fn token(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

pub trait Passability {
    fn is_passable(&self, position: Vec2) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PassabilityError {
    #[error("passability cell count mismatch: expected {expected}, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
}

/// Read-only walkability grid, one cell per tile, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassabilityMap {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl PassabilityMap {
    pub fn new(width: u32, height: u32, cells: Vec<bool>) -> Result<Self, PassabilityError> {
        let expected = width as usize * height as usize;
        let actual = cells.len();
        if expected != actual {
            return Err(PassabilityError::CellCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn filled(width: u32, height: u32, passable: bool) -> Self {
        Self {
            width,
            height,
            cells: vec![passable; width as usize * height as usize],
        }
    }

    /// Any pixel that is not pure black marks a walkable tile.
    pub fn from_image(image: &RgbImage) -> Self {
        let cells = image.pixels().map(|pixel| pixel.0 != [0, 0, 0]).collect();
        Self {
            width: image.width(),
            height: image.height(),
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_tile_passable(&self, tile: TileCoord) -> bool {
        if tile.x < 0 || tile.y < 0 {
            return false;
        }
        let (x, y) = (tile.x as u32, tile.y as u32);
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.cells.get(index).copied().unwrap_or(false)
    }
}

impl Passability for PassabilityMap {
    fn is_passable(&self, position: Vec2) -> bool {
        if !position.is_finite() || position.x < 0.0 || position.y < 0.0 {
            return false;
        }
        self.is_tile_passable(TileCoord::from_position(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn cross_map() -> PassabilityMap {
        // 3x3 with a solid center.
        let mut cells = vec![true; 9];
        cells[4] = false;
        PassabilityMap::new(3, 3, cells).expect("map")
    }

    #[test]
    fn new_rejects_wrong_cell_count() {
        let error = PassabilityMap::new(2, 2, vec![true; 3]).expect_err("must fail");
        assert_eq!(
            error,
            PassabilityError::CellCountMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn out_of_bounds_positions_are_impassable() {
        let map = PassabilityMap::filled(4, 3, true);
        for position in [
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, -1.0),
            Vec2::new(-0.5, 1.0),
            Vec2::new(1.0, -0.01),
            Vec2::new(4.0, 0.0),
            Vec2::new(0.0, 3.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(f32::NAN, 1.0),
            Vec2::new(1.0, f32::INFINITY),
        ] {
            assert!(!map.is_passable(position), "position={position:?}");
        }
    }

    #[test]
    fn in_bounds_lookup_truncates_toward_zero() {
        let map = cross_map();
        assert!(map.is_passable(Vec2::new(0.9, 0.9)));
        assert!(!map.is_passable(Vec2::new(1.0, 1.0)));
        assert!(!map.is_passable(Vec2::new(1.99, 1.5)));
        assert!(map.is_passable(Vec2::new(2.0, 1.0)));
        assert!(map.is_passable(Vec2::new(2.99, 2.99)));
    }

    #[test]
    fn image_conversion_treats_only_black_as_solid() {
        let mut image = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        image.put_pixel(1, 0, Rgb([0, 0, 0]));
        image.put_pixel(0, 1, Rgb([1, 0, 0]));
        let map = PassabilityMap::from_image(&image);

        assert_eq!((map.width(), map.height()), (2, 2));
        assert!(map.is_tile_passable(TileCoord::new(0, 0)));
        assert!(!map.is_tile_passable(TileCoord::new(1, 0)));
        assert!(map.is_tile_passable(TileCoord::new(0, 1)));
    }

    #[test]
    fn move_toward_never_overshoots() {
        let start = Vec2::new(5.0, 5.0);
        let target = Vec2::new(5.0, 6.0);
        let mut position = start;
        for _ in 0..20 {
            position = position.move_toward(target, 0.3);
            assert!(position.y <= target.y, "overshot: {position:?}");
        }
        assert_eq!(position, target);
    }

    #[test]
    fn facing_index_follows_table_order() {
        for (index, facing) in Facing::ALL.iter().enumerate() {
            assert_eq!(facing.index(), index);
        }
    }

    #[test]
    fn tile_coord_truncates_fractional_positions() {
        assert_eq!(
            TileCoord::from_position(Vec2::new(3.7, 2.2)),
            TileCoord::new(3, 2)
        );
        assert_eq!(
            TileCoord::from_position(Vec2::new(-0.4, 1.0)),
            TileCoord::new(0, 1)
        );
    }
}
