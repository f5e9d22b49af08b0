use serde::{Deserialize, Serialize};

/// A single map cell. `z` grows northwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

impl Cell {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub fn offset(self, delta: Cell) -> Cell {
        Cell {
            x: self.x.saturating_add(delta.x),
            z: self.z.saturating_add(delta.z),
        }
    }

    pub fn distance_squared(self, other: Cell) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dz = i64::from(self.z) - i64::from(other.z);
        dx * dx + dz * dz
    }

    pub fn within_radius(self, other: Cell, radius: u32) -> bool {
        let radius = i64::from(radius);
        self.distance_squared(other) <= radius * radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    North,
    East,
    #[default]
    South,
    West,
}

impl Rotation {
    /// Rotates an offset authored for a south-facing structure.
    pub fn rotate(self, offset: Cell) -> Cell {
        match self {
            Rotation::South => offset,
            Rotation::West => Cell::new(offset.z, -offset.x),
            Rotation::North => Cell::new(-offset.x, -offset.z),
            Rotation::East => Cell::new(-offset.z, offset.x),
        }
    }
}

/// Inclusive cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub min: Cell,
    pub max: Cell,
}

impl CellRect {
    pub fn bounding<I>(cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut iter = cells.into_iter();
        let first = iter.next()?;
        let mut rect = CellRect {
            min: first,
            max: first,
        };
        for cell in iter {
            rect.min.x = rect.min.x.min(cell.x);
            rect.min.z = rect.min.z.min(cell.z);
            rect.max.x = rect.max.x.max(cell.x);
            rect.max.z = rect.max.z.max(cell.z);
        }
        Some(rect)
    }

    pub fn expanded_by(self, margin: u32) -> Self {
        let margin = i32::try_from(margin).unwrap_or(i32::MAX);
        CellRect {
            min: Cell::new(
                self.min.x.saturating_sub(margin),
                self.min.z.saturating_sub(margin),
            ),
            max: Cell::new(
                self.max.x.saturating_add(margin),
                self.max.z.saturating_add(margin),
            ),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.z >= self.min.z && cell.z <= self.max.z
    }
}
