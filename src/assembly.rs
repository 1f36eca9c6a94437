//! Geometry assembly
//!
//! Composes skids, floorboards, panels, cleats and lag hardware into one
//! world frame: Z up, origin at floor level centered across the width, front
//! face at `y = 0` and the crate extending toward `-y`.
//!
//! The walls stand on the skids and run up to the underside of the top panel.
//! Front and back panels span the full width; the side panels fit between
//! them. Cleats sit on the inside face of every panel; the top panel's cleats
//! are confined to the opening inside the wall cleats. The floor deck fills
//! the footprint inside the cleats.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::cleat::{CLEAT_THICKNESS, CLEAT_WIDTH, CleatLayout, CleatOpening};
use crate::error::{Error, Result};
use crate::floor::FloorLayout;
use crate::hardware::{LagHardwarePlacement, place_lag_hardware};
use crate::model::{
    Block, BlockKind, BoundingBox, CrateConfiguration, Dimensions, Orientation, PanelConfig,
    PanelFrame,
};
use crate::plywood::PanelLayout;
use crate::skid::{SkidConfiguration, calculate_skid_configuration};

/// Overall and usable inside dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrateDimensions {
    /// Outside envelope
    pub overall: Dimensions,
    /// Clear space inside the cleats, above the deck and below the top cleats
    pub internal: Dimensions,
}

/// Everything computed for one panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelDesign {
    /// Which face
    pub frame: PanelFrame,
    /// Panel options
    pub config: PanelConfig,
    /// World position of the outside lower-left corner
    pub origin: Point3<f64>,
    /// Panel width along the frame's `u` axis
    pub width: f64,
    /// Panel height along the frame's `v` axis
    pub height: f64,
    /// Sheet layout
    pub plywood: PanelLayout,
    /// Cleat layout
    pub cleats: CleatLayout,
    /// Lag screws (wall panels only)
    pub hardware: Option<LagHardwarePlacement>,
}

impl PanelDesign {
    /// Sheet thickness
    pub fn thickness(&self) -> f64 {
        self.config.thickness
    }

    /// World blocks for the plywood pieces
    pub fn plywood_blocks(&self) -> Vec<Block> {
        self.plywood
            .pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| {
                self.frame.block(
                    &self.origin,
                    format!("{}_PLY_{}", self.frame.name(), i + 1),
                    BlockKind::Plywood,
                    (piece.x, piece.y, 0.0),
                    (piece.width, piece.height, self.thickness()),
                )
            })
            .collect()
    }

    /// World blocks for the cleats, on the panel's inside face
    pub fn cleat_blocks(&self) -> Vec<Block> {
        self.cleats
            .cleats
            .iter()
            .map(|cleat| {
                let (u0, u1) = cleat.u_range();
                let (v0, v1) = cleat.v_range();
                self.frame.block(
                    &self.origin,
                    cleat.id.clone(),
                    BlockKind::Cleat,
                    (u0, v0, self.thickness()),
                    (u1 - u0, v1 - v0, cleat.thickness),
                )
            })
            .collect()
    }

    /// Number of lag screws through this panel
    pub fn lag_screw_count(&self) -> usize {
        self.hardware.as_ref().map_or(0, |h| h.lag_screw_count)
    }
}

/// All blocks of an assembled crate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    /// Blocks in assembly order: base, floor, panels with cleats, hardware
    pub blocks: Vec<Block>,
}

impl Scene {
    /// Bounding box over every corner of every block
    pub fn bounding_box(&self) -> Result<BoundingBox> {
        let corners: Vec<Point3<f64>> = self.blocks.iter().flat_map(Block::corners).collect();
        BoundingBox::from_points(corners.iter())
            .ok_or_else(|| Error::InvalidGeometry("scene contains no blocks".to_string()))
    }

    /// Extent of the bounding box
    pub fn size(&self) -> Result<nalgebra::Vector3<f64>> {
        Ok(self.bounding_box()?.size())
    }

    /// Length of the bounding box diagonal
    pub fn diagonal(&self) -> Result<f64> {
        Ok(self.bounding_box()?.diagonal())
    }

    /// Blocks of one kind
    pub fn of_kind(&self, kind: BlockKind) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    /// Blocks attached to one panel family
    pub fn with_orientation(&self, orientation: Orientation) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(move |b| b.orientation == Some(orientation))
    }

    /// Look up a block by name
    pub fn find(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }
}

/// A fully assembled crate
#[derive(Debug, Clone, PartialEq)]
pub struct CrateAssembly {
    /// Skid arrangement
    pub skids: SkidConfiguration,
    /// Floorboard arrangement
    pub floor: FloorLayout,
    /// Front, back, left, right and top panels, in that order
    pub panels: Vec<PanelDesign>,
    /// Overall and internal dimensions
    pub dimensions: CrateDimensions,
    /// Every block in world space
    pub scene: Scene,
}

fn panel_config(config: &CrateConfiguration, frame: PanelFrame) -> PanelConfig {
    match frame {
        PanelFrame::Front => config.cap.front,
        PanelFrame::Back => config.cap.back,
        PanelFrame::Left => config.cap.left,
        PanelFrame::Right => config.cap.right,
        PanelFrame::Top => config.cap.top,
    }
}

fn require_panel_size(frame: PanelFrame, width: f64, height: f64) -> Result<()> {
    let min = 2.0 * CLEAT_WIDTH;
    if width < min || height < min {
        return Err(Error::InvalidConfiguration(format!(
            "{} panel is {:.2} x {:.2} in; both sides must be at least {} in to hold perimeter cleats",
            frame.name().to_lowercase(),
            width,
            height,
            min
        )));
    }
    Ok(())
}

fn require_positive(what: &str, value: f64) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration(format!(
            "{} would be {:.2} in; enlarge the crate",
            what, value
        )))
    }
}

impl CrateAssembly {
    /// Assemble a crate from a configuration
    ///
    /// The configuration is validated first; degenerate geometry (walls too
    /// short to clear the skids and top panel, or no room inside the cleats)
    /// is rejected with [`Error::InvalidConfiguration`].
    #[instrument(skip(config), fields(project = %config.project_name))]
    pub fn assemble(config: &CrateConfiguration) -> Result<Self> {
        config.validate()?;

        let dims = config.dimensions;
        let (length, width, height) = (dims.length, dims.width, dims.height);
        let skids = calculate_skid_configuration(&dims, config.weight.gross_lb());
        let skid_height = skids.dimensions.height;
        let floor_thickness = config.base.floorboard_thickness;
        let t = |frame| panel_config(config, frame).thickness;

        let wall_height = height - skid_height - t(PanelFrame::Top);
        let side_width = length - t(PanelFrame::Front) - t(PanelFrame::Back);

        let internal = Dimensions::new(
            side_width - 2.0 * CLEAT_THICKNESS,
            width - t(PanelFrame::Left) - t(PanelFrame::Right) - 2.0 * CLEAT_THICKNESS,
            wall_height - floor_thickness - CLEAT_THICKNESS,
        );
        require_positive("internal length", internal.length)?;
        require_positive("internal width", internal.width)?;
        require_positive("internal height", internal.height)?;

        let mut panels = Vec::with_capacity(PanelFrame::ALL.len());
        for frame in PanelFrame::ALL {
            let (origin, panel_width, panel_height) = match frame {
                PanelFrame::Front => (Point3::new(-width / 2.0, 0.0, skid_height), width, wall_height),
                PanelFrame::Back => (
                    Point3::new(-width / 2.0, -length, skid_height),
                    width,
                    wall_height,
                ),
                PanelFrame::Left => (
                    Point3::new(-width / 2.0, -length + t(PanelFrame::Back), skid_height),
                    side_width,
                    wall_height,
                ),
                PanelFrame::Right => (
                    Point3::new(width / 2.0, -length + t(PanelFrame::Back), skid_height),
                    side_width,
                    wall_height,
                ),
                PanelFrame::Top => (Point3::new(-width / 2.0, -length, height), width, length),
            };
            require_panel_size(frame, panel_width, panel_height)?;

            let plywood = PanelLayout::optimize(panel_width, panel_height);
            let cleats = if frame == PanelFrame::Top {
                // top cleats fit inside the wall cleats below them
                let opening = CleatOpening {
                    u: t(PanelFrame::Left) + CLEAT_THICKNESS,
                    v: t(PanelFrame::Back) + CLEAT_THICKNESS,
                    width: internal.width,
                    height: internal.length,
                };
                require_panel_size(frame, opening.width, opening.height)?;
                CleatLayout::calculate_within(frame, &plywood, opening)
            } else {
                CleatLayout::calculate(frame, &plywood)
            };
            let hardware = (frame != PanelFrame::Top)
                .then(|| place_lag_hardware(&cleats, &origin, floor_thickness / 2.0));

            panels.push(PanelDesign {
                frame,
                config: panel_config(config, frame),
                origin,
                width: panel_width,
                height: panel_height,
                plywood,
                cleats,
                hardware,
            });
        }

        let floor = FloorLayout::calculate(internal.length, internal.width, floor_thickness);

        let mut blocks = Vec::new();
        for (i, offset) in skids.center_offsets().into_iter().enumerate() {
            let x = -width / 2.0 + offset;
            let half = skids.dimensions.width / 2.0;
            blocks.push(Block::from_corners(
                format!("SKID_{}", i + 1),
                BlockKind::Skid,
                Point3::new(x - half, -length, 0.0),
                Point3::new(x + half, 0.0, skid_height),
            ));
        }

        let deck_front = -t(PanelFrame::Front) - CLEAT_THICKNESS;
        let deck_left = -width / 2.0 + t(PanelFrame::Left) + CLEAT_THICKNESS;
        for (i, board) in floor.boards.iter().enumerate() {
            let y_front = deck_front - board.y_offset;
            blocks.push(Block::from_corners(
                format!("FLOORBOARD_{}", i + 1),
                BlockKind::Floorboard,
                Point3::new(deck_left, y_front - board.width, skid_height),
                Point3::new(
                    deck_left + floor.board_length,
                    y_front,
                    skid_height + floor_thickness,
                ),
            ));
        }

        for panel in &panels {
            blocks.extend(panel.plywood_blocks());
            blocks.extend(panel.cleat_blocks());
        }
        for panel in &panels {
            if let Some(hardware) = &panel.hardware {
                blocks.extend(hardware.blocks().cloned());
            }
        }

        let assembly = Self {
            skids,
            floor,
            panels,
            dimensions: CrateDimensions {
                overall: dims,
                internal,
            },
            scene: Scene { blocks },
        };
        info!(
            blocks = assembly.scene.blocks.len(),
            skids = assembly.skids.count,
            lag_screws = assembly.lag_screw_count(),
            "assembled crate"
        );
        Ok(assembly)
    }

    /// Design of one panel
    pub fn panel(&self, frame: PanelFrame) -> Option<&PanelDesign> {
        self.panels.iter().find(|p| p.frame == frame)
    }

    /// Lag screws across all panels
    pub fn lag_screw_count(&self) -> usize {
        self.panels.iter().map(PanelDesign::lag_screw_count).sum()
    }
}
