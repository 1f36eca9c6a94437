//! Panel-local coordinate frames
//!
//! Panel layouts, cleats and hardware are computed in 2D panel coordinates
//! `(u, v)` measured from the panel's lower-left corner, plus a depth `w`
//! measured inward from the panel's outside face. A [`PanelFrame`] maps those
//! coordinates into the world frame (Z-up, front face at `y = 0`, crate
//! extending toward `-y`) and back.
//!
//! | Frame | u  | v  | w (inward) |
//! |-------|----|----|------------|
//! | Front | +X | +Z | -Y         |
//! | Back  | +X | +Z | +Y         |
//! | Left  | +Y | +Z | +X         |
//! | Right | +Y | +Z | -X         |
//! | Top   | +X | +Y | -Z         |

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::geometry::{Block, BlockKind, Orientation};

/// One of the five crate faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelFrame {
    /// Front face, `y = 0`
    Front,
    /// Back face, `y = -length`
    Back,
    /// Left face, `x = -width / 2`
    Left,
    /// Right face, `x = +width / 2`
    Right,
    /// Top face, `z = height`
    Top,
}

/// Which panel edges an in-plane horizontal position can be near
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelEdge {
    /// World -X edge of a front/back/top panel
    Left,
    /// World +X edge of a front/back/top panel
    Right,
    /// Back (`-y`) edge of a side panel
    Back,
    /// Front (`y = 0`) edge of a side panel
    Front,
}

impl PanelEdge {
    /// Upper-case label used in part names
    pub fn label(&self) -> &'static str {
        match self {
            PanelEdge::Left => "LEFT",
            PanelEdge::Right => "RIGHT",
            PanelEdge::Back => "BACK",
            PanelEdge::Front => "FRONT",
        }
    }
}

impl PanelFrame {
    /// All frames in assembly order
    pub const ALL: [PanelFrame; 5] = [
        PanelFrame::Front,
        PanelFrame::Back,
        PanelFrame::Left,
        PanelFrame::Right,
        PanelFrame::Top,
    ];

    /// The four wall frames
    pub const WALLS: [PanelFrame; 4] = [
        PanelFrame::Front,
        PanelFrame::Back,
        PanelFrame::Left,
        PanelFrame::Right,
    ];

    /// Upper-case name used as a prefix for part names
    pub fn name(&self) -> &'static str {
        match self {
            PanelFrame::Front => "FRONT",
            PanelFrame::Back => "BACK",
            PanelFrame::Left => "LEFT",
            PanelFrame::Right => "RIGHT",
            PanelFrame::Top => "TOP",
        }
    }

    /// Orientation tag carried by blocks on this face
    pub fn orientation(&self) -> Orientation {
        match self {
            PanelFrame::Front | PanelFrame::Back => Orientation::FrontBack,
            PanelFrame::Left | PanelFrame::Right => Orientation::LeftRight,
            PanelFrame::Top => Orientation::Top,
        }
    }

    /// Whether this is a left or right side panel
    pub fn is_side(&self) -> bool {
        matches!(self, PanelFrame::Left | PanelFrame::Right)
    }

    /// World direction of increasing `u`
    pub fn u_axis(&self) -> Vector3<f64> {
        match self {
            PanelFrame::Front | PanelFrame::Back | PanelFrame::Top => Vector3::x(),
            PanelFrame::Left | PanelFrame::Right => Vector3::y(),
        }
    }

    /// World direction of increasing `v`
    pub fn v_axis(&self) -> Vector3<f64> {
        match self {
            PanelFrame::Top => Vector3::y(),
            _ => Vector3::z(),
        }
    }

    /// World direction pointing into the crate
    pub fn inward_axis(&self) -> Vector3<f64> {
        match self {
            PanelFrame::Front => -Vector3::y(),
            PanelFrame::Back => Vector3::y(),
            PanelFrame::Left => Vector3::x(),
            PanelFrame::Right => -Vector3::x(),
            PanelFrame::Top => -Vector3::z(),
        }
    }

    /// Edges at `u = 0` and `u = width`
    pub fn u_edges(&self) -> (PanelEdge, PanelEdge) {
        if self.is_side() {
            (PanelEdge::Back, PanelEdge::Front)
        } else {
            (PanelEdge::Left, PanelEdge::Right)
        }
    }

    /// Map panel-local `(u, v, w)` to a world point
    ///
    /// `origin` is the world position of the panel's lower-left corner on its
    /// outside face.
    pub fn to_world(&self, origin: &Point3<f64>, u: f64, v: f64, w: f64) -> Point3<f64> {
        *origin + self.u_axis() * u + self.v_axis() * v + self.inward_axis() * w
    }

    /// Map a world point back to panel-local `(u, v, w)`
    pub fn to_local(&self, origin: &Point3<f64>, point: &Point3<f64>) -> Vector3<f64> {
        let d = *point - *origin;
        Vector3::new(
            d.dot(&self.u_axis()),
            d.dot(&self.v_axis()),
            d.dot(&self.inward_axis()),
        )
    }

    /// Build a world block from a panel-local box
    ///
    /// The box spans `[u, u + du] x [v, v + dv] x [w, w + dw]`; the resulting
    /// block is tagged with this frame's orientation.
    pub fn block(
        &self,
        origin: &Point3<f64>,
        name: impl Into<String>,
        kind: BlockKind,
        (u, v, w): (f64, f64, f64),
        (du, dv, dw): (f64, f64, f64),
    ) -> Block {
        let a = self.to_world(origin, u, v, w);
        let b = self.to_world(origin, u + du, v + dv, w + dw);
        Block::from_corners(name, kind, a, b).with_orientation(self.orientation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_frames() {
        let origin = Point3::new(-20.0, -48.0, 3.5);
        for frame in PanelFrame::ALL {
            let world = frame.to_world(&origin, 12.5, 7.25, 0.75);
            let local = frame.to_local(&origin, &world);
            assert!((local - Vector3::new(12.5, 7.25, 0.75)).norm() < 1e-12, "{:?}", frame);
        }
    }

    #[test]
    fn test_axis_mapping() {
        let origin = Point3::origin();
        let front = PanelFrame::Front.to_world(&origin, 1.0, 2.0, 3.0);
        assert_eq!(front, Point3::new(1.0, -3.0, 2.0));

        let left = PanelFrame::Left.to_world(&origin, 1.0, 2.0, 3.0);
        assert_eq!(left, Point3::new(3.0, 1.0, 2.0));

        let right = PanelFrame::Right.to_world(&origin, 1.0, 2.0, 3.0);
        assert_eq!(right, Point3::new(-3.0, 1.0, 2.0));

        let top = PanelFrame::Top.to_world(&origin, 1.0, 2.0, 3.0);
        assert_eq!(top, Point3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn test_inward_axes_are_distinct() {
        for (i, a) in PanelFrame::ALL.iter().enumerate() {
            for b in &PanelFrame::ALL[i + 1..] {
                assert_ne!(a.inward_axis(), b.inward_axis());
            }
        }
    }

    #[test]
    fn test_block_from_local_box() {
        let origin = Point3::new(-20.0, 0.0, 3.5);
        let block = PanelFrame::Front.block(
            &origin,
            "ply",
            BlockKind::Plywood,
            (0.0, 0.0, 0.0),
            (40.0, 30.0, 0.75),
        );
        assert_eq!(block.min(), Point3::new(-20.0, -0.75, 3.5));
        assert_eq!(block.max(), Point3::new(20.0, 0.0, 33.5));
        assert_eq!(block.orientation, Some(Orientation::FrontBack));
    }
}
