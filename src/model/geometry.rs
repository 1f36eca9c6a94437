//! Axis-aligned blocks and bounding boxes

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Which face family a block belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Front or back panel
    FrontBack,
    /// Left or right panel
    LeftRight,
    /// Top panel
    Top,
}

/// Structural role of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Longitudinal skid
    Skid,
    /// Deck board
    Floorboard,
    /// Plywood sheet piece
    Plywood,
    /// 1x4 cleat
    Cleat,
    /// Lag screw head
    LagHead,
    /// Lag screw shaft
    LagShaft,
}

/// Axis-aligned box, the geometric primitive of the whole scene
///
/// `position` is the center point, `dimensions` the full extent along each
/// world axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Unique name within a scene
    pub name: String,
    /// Structural role
    pub kind: BlockKind,
    /// Center point
    pub position: Point3<f64>,
    /// Extent along X, Y and Z
    pub dimensions: Vector3<f64>,
    /// Panel family, for blocks attached to a panel
    pub orientation: Option<Orientation>,
}

impl Block {
    /// Create a block from two opposite corners, in any order
    pub fn from_corners(
        name: impl Into<String>,
        kind: BlockKind,
        a: Point3<f64>,
        b: Point3<f64>,
    ) -> Self {
        let min = a.inf(&b);
        let max = a.sup(&b);
        Self {
            name: name.into(),
            kind,
            position: nalgebra::center(&min, &max),
            dimensions: max - min,
            orientation: None,
        }
    }

    /// Attach an orientation tag
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Minimum corner
    pub fn min(&self) -> Point3<f64> {
        self.position - self.dimensions / 2.0
    }

    /// Maximum corner
    pub fn max(&self) -> Point3<f64> {
        self.position + self.dimensions / 2.0
    }

    /// Axis-aligned box covering the block
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            min: self.min(),
            max: self.max(),
        }
    }

    /// All eight corners
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let min = self.min();
        let max = self.max();
        [
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(min.x, max.y, max.z),
            Point3::new(max.x, max.y, max.z),
        ]
    }

    /// Volume in cubic inches
    pub fn volume(&self) -> f64 {
        self.dimensions.x * self.dimensions.y * self.dimensions.z
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Point3<f64>,
    /// Maximum corner
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for no points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Self { min, max })
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Midpoint
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the main diagonal
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }

    /// Whether the interiors of the two boxes overlap by more than `tolerance` on every axis
    pub fn intersects(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (0..3).all(|i| {
            self.min[i] < other.max[i] - tolerance && other.min[i] < self.max[i] - tolerance
        })
    }

    /// Whether `other` lies entirely inside this box, within `tolerance`
    pub fn contains(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (0..3).all(|i| {
            other.min[i] >= self.min[i] - tolerance && other.max[i] <= self.max[i] + tolerance
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_from_corners_normalizes() {
        let block = Block::from_corners(
            "b",
            BlockKind::Skid,
            Point3::new(2.0, 0.0, 4.0),
            Point3::new(-2.0, -10.0, 0.0),
        );
        assert_eq!(block.position, Point3::new(0.0, -5.0, 2.0));
        assert_eq!(block.dimensions, Vector3::new(4.0, 10.0, 4.0));
        assert_eq!(block.min(), Point3::new(-2.0, -10.0, 0.0));
        assert_eq!(block.max(), Point3::new(2.0, 0.0, 4.0));
        assert_eq!(block.volume(), 160.0);
    }

    #[test]
    fn test_block_corners() {
        let block = Block::from_corners(
            "b",
            BlockKind::Cleat,
            Point3::origin(),
            Point3::new(1.0, 2.0, 3.0),
        );
        let corners = block.corners();
        assert_eq!(corners[0], Point3::origin());
        assert_eq!(corners[7], Point3::new(1.0, 2.0, 3.0));
        let bbox = BoundingBox::from_points(corners.iter()).unwrap();
        assert_eq!(bbox.min, block.min());
        assert_eq!(bbox.max, block.max());
    }

    #[test]
    fn test_bounding_box_diagonal() {
        let bbox = BoundingBox {
            min: Point3::origin(),
            max: Point3::new(3.0, 4.0, 12.0),
        };
        assert_eq!(bbox.diagonal(), 13.0);
        assert_eq!(bbox.center(), Point3::new(1.5, 2.0, 6.0));
    }

    #[test]
    fn test_bounding_box_empty() {
        let points: Vec<Point3<f64>> = Vec::new();
        assert!(BoundingBox::from_points(points.iter()).is_none());
    }

    #[test]
    fn test_containment_and_overlap() {
        let outer = Block::from_corners(
            "outer",
            BlockKind::Plywood,
            Point3::origin(),
            Point3::new(10.0, 10.0, 1.0),
        )
        .bounding_box();
        let inner = BoundingBox {
            min: Point3::new(2.0, 2.0, 0.0),
            max: Point3::new(4.0, 4.0, 1.0),
        };
        let touching = BoundingBox {
            min: Point3::new(10.0, 0.0, 0.0),
            max: Point3::new(12.0, 10.0, 1.0),
        };
        assert!(outer.contains(&inner, 0.0));
        assert!(!inner.contains(&outer, 0.0));
        assert!(outer.intersects(&inner, 1e-9));
        assert!(!outer.intersects(&touching, 1e-9));
        assert!(!outer.contains(&touching, 1e-9));
    }
}
