//! Lag screw placement along support cleats
//!
//! Lag screws tie each wall panel to the floor through its vertical support
//! cleats. Placement is computed in panel-local coordinates and turned into
//! world-space head and shaft blocks through the panel's [`PanelFrame`].

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cleat::{Cleat, CleatLayout};
use crate::model::{Block, BlockKind, PanelEdge, PanelFrame};

/// Lag screw shank diameter (3/8" nominal)
pub const LAG_SHANK_DIAMETER: f64 = 0.38;

/// Lag screw head diameter
pub const LAG_HEAD_DIAMETER: f64 = 0.75;

/// Lag screw head height
pub const LAG_HEAD_HEIGHT: f64 = 0.25;

/// Lag screw shank length
pub const LAG_SHANK_LENGTH: f64 = 2.5;

/// Distance of near-edge screws from the panel edge, and of low screws above the cleat bottom
pub const LAG_EDGE_INSET: f64 = 0.5;

/// Near-edge screws closer than this to the centered screw are not emitted
pub const NEAR_EDGE_TOLERANCE: f64 = 1e-3;

/// Vertical position of a lag screw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LagRow {
    /// Floorboard centerline
    Mid,
    /// Just above the bottom of the support cleat
    Low,
}

impl LagRow {
    /// Label used in part names
    pub fn label(&self) -> &'static str {
        match self {
            LagRow::Mid => "MID",
            LagRow::Low => "LOW",
        }
    }
}

/// Horizontal position of a lag screw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LagColumn {
    /// Centered on the support cleat
    Center,
    /// Just inboard of the nearest panel edge
    Near(PanelEdge),
}

impl LagColumn {
    /// Label used in part names
    pub fn label(&self) -> String {
        match self {
            LagColumn::Center => "CENTER".to_string(),
            LagColumn::Near(edge) => format!("NEAR_{}", edge.label()),
        }
    }
}

/// Panel-local position of one lag screw
#[derive(Debug, Clone, PartialEq)]
pub struct LagPoint {
    /// Id of the cleat the screw goes through
    pub cleat_id: String,
    /// Vertical position class
    pub row: LagRow,
    /// Horizontal position class
    pub column: LagColumn,
    /// Position along the panel width
    pub u: f64,
    /// Position up the panel height
    pub v: f64,
}

impl LagPoint {
    /// Screw id, e.g. `LEFT_CLEAT_V_1_LAG_MID_CENTER`
    pub fn id(&self) -> String {
        format!(
            "{}_LAG_{}_{}",
            self.cleat_id,
            self.row.label(),
            self.column.label()
        )
    }
}

/// A placed lag screw
#[derive(Debug, Clone, PartialEq)]
pub struct LagScrew {
    /// Screw id
    pub id: String,
    /// Panel-local position
    pub point: LagPoint,
    /// Head, on the outside face of the panel
    pub head: Block,
    /// Shaft, running inward from the outside face
    pub shaft: Block,
}

/// Lag screws for one panel
#[derive(Debug, Clone, PartialEq)]
pub struct LagHardwarePlacement {
    /// Panel the screws go through
    pub panel: PanelFrame,
    /// Placed screws
    pub screws: Vec<LagScrew>,
    /// Number of head/shaft pairs emitted
    pub lag_screw_count: usize,
}

impl LagHardwarePlacement {
    /// Head and shaft blocks of every screw
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.screws.iter().flat_map(|s| [&s.head, &s.shaft])
    }
}

fn horizontal_placements(
    panel: PanelFrame,
    cleat: &Cleat,
    panel_width: f64,
) -> Vec<(LagColumn, f64)> {
    let shank_radius = LAG_SHANK_DIAMETER / 2.0;
    let center = cleat.center_u();
    let (start_edge, end_edge) = panel.u_edges();

    let min_u = shank_radius;
    let max_u = panel_width - shank_radius;
    let start_candidate = LAG_EDGE_INSET.clamp(min_u, max_u);
    let end_candidate = (panel_width - LAG_EDGE_INSET).clamp(min_u, max_u);

    let near = if (center - start_candidate).abs() <= (center - end_candidate).abs() {
        (LagColumn::Near(start_edge), start_candidate)
    } else {
        (LagColumn::Near(end_edge), end_candidate)
    };

    let mut placements = vec![(LagColumn::Center, center)];
    if (near.1 - center).abs() > NEAR_EDGE_TOLERANCE {
        placements.push(near);
    }
    placements
}

fn vertical_placements(cleat: &Cleat, floor_centerline: f64) -> Vec<(LagRow, f64)> {
    let head_radius = LAG_HEAD_DIAMETER / 2.0;
    let mut placements = vec![(LagRow::Mid, floor_centerline)];

    let (bottom, top) = cleat.v_range();
    let low = bottom + LAG_EDGE_INSET;
    if low - head_radius >= bottom && low + head_radius <= top {
        placements.push((LagRow::Low, low));
    }
    placements
}

/// Panel-local lag screw positions for every vertical support cleat
///
/// # Arguments
/// * `cleats` - Cleat layout of a wall panel
/// * `floor_centerline` - Height of the floorboard centerline above the panel bottom
pub fn lag_points(cleats: &CleatLayout, floor_centerline: f64) -> Vec<LagPoint> {
    let mut points = Vec::new();
    for cleat in cleats.vertical_supports() {
        let columns = horizontal_placements(cleats.panel, cleat, cleats.panel_width);
        for (row, v) in vertical_placements(cleat, floor_centerline) {
            for &(column, u) in &columns {
                points.push(LagPoint {
                    cleat_id: cleat.id.clone(),
                    row,
                    column,
                    u,
                    v,
                });
            }
        }
    }
    points
}

/// Place head and shaft blocks for every lag screw on a panel
///
/// The head sits on the panel's outside face; the shaft runs inward along
/// the frame's inward axis through the panel and cleat.
///
/// # Arguments
/// * `cleats` - Cleat layout of a wall panel
/// * `origin` - World position of the panel's outside lower-left corner
/// * `floor_centerline` - Height of the floorboard centerline above the panel bottom
#[instrument(level = "debug", skip(cleats, origin), fields(panel = cleats.panel.name()))]
pub fn place_lag_hardware(
    cleats: &CleatLayout,
    origin: &Point3<f64>,
    floor_centerline: f64,
) -> LagHardwarePlacement {
    let frame = cleats.panel;
    let head_radius = LAG_HEAD_DIAMETER / 2.0;
    let shank_radius = LAG_SHANK_DIAMETER / 2.0;

    let mut screws = Vec::new();
    let mut lag_screw_count = 0;
    for point in lag_points(cleats, floor_centerline) {
        let id = point.id();
        let head = frame.block(
            origin,
            format!("{}_HEAD", id),
            BlockKind::LagHead,
            (point.u - head_radius, point.v - head_radius, -LAG_HEAD_HEIGHT),
            (LAG_HEAD_DIAMETER, LAG_HEAD_DIAMETER, LAG_HEAD_HEIGHT),
        );
        let shaft = frame.block(
            origin,
            format!("{}_SHAFT", id),
            BlockKind::LagShaft,
            (point.u - shank_radius, point.v - shank_radius, 0.0),
            (LAG_SHANK_DIAMETER, LAG_SHANK_DIAMETER, LAG_SHANK_LENGTH),
        );
        screws.push(LagScrew {
            id,
            point,
            head,
            shaft,
        });
        lag_screw_count += 1;
    }

    debug!(lag_screw_count, "placed lag hardware");
    LagHardwarePlacement {
        panel: frame,
        screws,
        lag_screw_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plywood::PanelLayout;
    use nalgebra::Vector3;

    fn cleats(panel: PanelFrame, width: f64, height: f64) -> CleatLayout {
        CleatLayout::calculate(panel, &PanelLayout::optimize(width, height))
    }

    #[test]
    fn test_no_supports_no_screws() {
        let layout = cleats(PanelFrame::Left, 24.0, 30.0);
        let placement = place_lag_hardware(&layout, &Point3::origin(), 0.75);
        assert_eq!(placement.lag_screw_count, 0);
        assert!(placement.screws.is_empty());
    }

    #[test]
    fn test_pairs_per_support_cleat() {
        // one support at u = 20: CENTER and NEAR, MID and LOW
        let layout = cleats(PanelFrame::Left, 40.0, 30.0);
        let placement = place_lag_hardware(&layout, &Point3::origin(), 0.75);
        assert_eq!(placement.lag_screw_count, 4);
        assert_eq!(placement.blocks().count(), 8);

        let ids: Vec<&str> = placement.screws.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "LEFT_CLEAT_V_1_LAG_MID_CENTER",
                "LEFT_CLEAT_V_1_LAG_MID_NEAR_BACK",
                "LEFT_CLEAT_V_1_LAG_LOW_CENTER",
                "LEFT_CLEAT_V_1_LAG_LOW_NEAR_BACK",
            ]
        );
        assert_eq!(
            placement.screws[0].head.name,
            "LEFT_CLEAT_V_1_LAG_MID_CENTER_HEAD"
        );
        assert_eq!(
            placement.screws[0].shaft.name,
            "LEFT_CLEAT_V_1_LAG_MID_CENTER_SHAFT"
        );
    }

    #[test]
    fn test_near_edge_is_inset_from_panel_edge() {
        let layout = cleats(PanelFrame::Front, 40.0, 30.0);
        let points = lag_points(&layout, 0.75);
        let near: Vec<_> = points
            .iter()
            .filter(|p| matches!(p.column, LagColumn::Near(_)))
            .collect();
        assert!(!near.is_empty());
        for p in near {
            // center 20 is equidistant; ties go to the start edge
            assert_eq!(p.column, LagColumn::Near(PanelEdge::Left));
            assert!((p.u - LAG_EDGE_INSET).abs() < 1e-12);
        }
    }

    #[test]
    fn test_low_row_requires_room_on_cleat() {
        let mut layout = cleats(PanelFrame::Back, 40.0, 30.0);
        for cleat in layout.cleats.iter_mut().filter(|c| c.is_vertical_support()) {
            cleat.length = 0.8;
        }
        let points = lag_points(&layout, 0.75);
        assert!(points.iter().all(|p| p.row == LagRow::Mid));
    }

    #[test]
    fn test_axis_points_inward() {
        let origin = Point3::new(-20.0, -40.0, 3.5);
        for panel in PanelFrame::WALLS {
            let layout = cleats(panel, 40.0, 30.0);
            let placement = place_lag_hardware(&layout, &origin, 0.75);
            let inward: Vector3<f64> = panel.inward_axis();
            for screw in &placement.screws {
                let head_depth = (screw.head.position - origin).dot(&inward);
                let shaft_depth = (screw.shaft.position - origin).dot(&inward);
                assert!(head_depth < 0.0, "{} head must be outside", screw.id);
                assert!(shaft_depth > 0.0, "{} shaft must point inward", screw.id);
                assert!((shaft_depth - LAG_SHANK_LENGTH / 2.0).abs() < 1e-9);

                let local = panel.to_local(&origin, &screw.shaft.position);
                assert!((local.x - screw.point.u).abs() < 1e-9);
                assert!((local.y - screw.point.v).abs() < 1e-9);
            }
        }
    }
}
