//! Cleat layout
//!
//! Every panel is framed by 1x4 perimeter cleats on its inside face. Support
//! cleats back each plywood seam and are added wherever the distance between
//! neighbouring cleats would exceed the unsupported-span limit. Positions are
//! panel-local: `x` along the panel width, `y` up the panel height, both
//! measured to the cleat's lower-left corner.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::model::PanelFrame;
use crate::plywood::PanelLayout;

/// Cleat face width (actual 1x4)
pub const CLEAT_WIDTH: f64 = 3.5;

/// Cleat thickness (actual 1x4)
pub const CLEAT_THICKNESS: f64 = 0.75;

/// Largest allowed center-to-center distance between parallel cleats
pub const MAX_CLEAT_SPACING: f64 = 24.0;

/// Support cleats must sit farther than this from a panel edge
pub const MIN_EDGE_DISTANCE: f64 = 2.0;

/// Horizontal support pieces shorter than this are dropped
pub const MIN_CLEAT_PIECE: f64 = 0.5;

/// Length of purchased cleat stock (8 ft)
pub const CLEAT_STOCK_LENGTH: f64 = 96.0;

/// Direction a cleat runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleatOrientation {
    /// Runs up the panel height
    Vertical,
    /// Runs along the panel width
    Horizontal,
}

/// Structural role of a cleat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleatKind {
    /// Borders a panel edge
    Perimeter,
    /// Reinforces an otherwise unsupported span
    Intermediate,
    /// Backs a seam between plywood sheets
    Splice,
}

/// One cleat in panel-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cleat {
    /// Unique id within the crate (e.g. `FRONT_CLEAT_V_1`)
    pub id: String,
    /// Running direction
    pub orientation: CleatOrientation,
    /// Structural role
    pub kind: CleatKind,
    /// Left edge
    pub x: f64,
    /// Bottom edge
    pub y: f64,
    /// Face width across the running direction
    pub width: f64,
    /// Length along the running direction
    pub length: f64,
    /// Thickness away from the panel
    pub thickness: f64,
}

impl Cleat {
    fn new(
        id: String,
        orientation: CleatOrientation,
        kind: CleatKind,
        x: f64,
        y: f64,
        length: f64,
    ) -> Self {
        Self {
            id,
            orientation,
            kind,
            x,
            y,
            width: CLEAT_WIDTH,
            length,
            thickness: CLEAT_THICKNESS,
        }
    }

    /// Extent along the panel width as (start, end)
    pub fn u_range(&self) -> (f64, f64) {
        match self.orientation {
            CleatOrientation::Vertical => (self.x, self.x + self.width),
            CleatOrientation::Horizontal => (self.x, self.x + self.length),
        }
    }

    /// Extent up the panel height as (start, end)
    pub fn v_range(&self) -> (f64, f64) {
        match self.orientation {
            CleatOrientation::Vertical => (self.y, self.y + self.length),
            CleatOrientation::Horizontal => (self.y, self.y + self.width),
        }
    }

    /// Center across the running direction of a vertical cleat, or along it for a horizontal one
    pub fn center_u(&self) -> f64 {
        let (start, end) = self.u_range();
        (start + end) / 2.0
    }

    /// Whether this is a vertical support (non-perimeter) cleat
    pub fn is_vertical_support(&self) -> bool {
        self.orientation == CleatOrientation::Vertical && self.kind != CleatKind::Perimeter
    }
}

/// Cleat stock needed for one or more layouts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleatMaterial {
    /// Number of cleat pieces
    pub total_cleats: usize,
    /// Sum of cleat lengths in inches
    pub total_length: f64,
    /// Sum of cleat lengths in feet
    pub total_linear_feet: f64,
    /// Estimated 8 ft 1x4 sticks to purchase
    pub stock_count: usize,
}

impl CleatMaterial {
    fn from_lengths(lengths: impl IntoIterator<Item = f64>) -> Self {
        let (total_cleats, total_length) = lengths
            .into_iter()
            .fold((0, 0.0), |(n, sum), len| (n + 1, sum + len));
        Self {
            total_cleats,
            total_length,
            total_linear_feet: total_length / 12.0,
            stock_count: (total_length / CLEAT_STOCK_LENGTH).ceil() as usize,
        }
    }

    /// Combine the material of several layouts
    pub fn sum<'a>(layouts: impl IntoIterator<Item = &'a CleatLayout>) -> Self {
        Self::from_lengths(
            layouts
                .into_iter()
                .flat_map(|layout| layout.cleats.iter().map(|c| c.length)),
        )
    }
}

/// Cleats on one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleatLayout {
    /// Panel the cleats belong to
    pub panel: PanelFrame,
    /// Panel width
    pub panel_width: f64,
    /// Panel height
    pub panel_height: f64,
    /// All cleats, perimeter first
    pub cleats: Vec<Cleat>,
}

/// Rectangle of a panel that receives cleats, in panel-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleatOpening {
    /// Left edge
    pub u: f64,
    /// Bottom edge
    pub v: f64,
    /// Extent along the panel width
    pub width: f64,
    /// Extent up the panel height
    pub height: f64,
}

fn round_position(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Support centers along one axis of a panel
///
/// `seams` become splice supports unless a perimeter cleat already covers
/// them; every remaining gap wider than [`MAX_CLEAT_SPACING`] is split evenly
/// with intermediate supports.
fn support_positions(extent: f64, seams: &[f64]) -> Vec<(f64, CleatKind)> {
    let first = CLEAT_WIDTH / 2.0;
    let last = extent - CLEAT_WIDTH / 2.0;

    let mut anchors: Vec<(f64, CleatKind)> = vec![(first, CleatKind::Perimeter)];
    for &seam in seams {
        let center = round_position(seam);
        if center - first >= CLEAT_WIDTH && last - center >= CLEAT_WIDTH {
            anchors.push((center, CleatKind::Splice));
        }
    }
    anchors.push((last, CleatKind::Perimeter));
    anchors.sort_by(|a, b| a.0.total_cmp(&b.0));
    anchors.dedup_by(|a, b| (a.0 - b.0).abs() < 0.005);

    let mut supports = Vec::new();
    for pair in anchors.windows(2) {
        let (start, start_kind) = pair[0];
        let (end, _) = pair[1];
        if start_kind != CleatKind::Perimeter {
            supports.push((start, start_kind));
        }
        let gap = end - start;
        if gap > MAX_CLEAT_SPACING {
            let divisions = (gap / MAX_CLEAT_SPACING).ceil() as usize;
            for k in 1..divisions {
                let center = round_position(start + gap * k as f64 / divisions as f64);
                if center > MIN_EDGE_DISTANCE && center < extent - MIN_EDGE_DISTANCE {
                    supports.push((center, CleatKind::Intermediate));
                }
            }
        }
    }
    supports
}

impl CleatLayout {
    /// Lay out cleats for a panel
    ///
    /// Front, back and top panels run their horizontal perimeter cleats the
    /// full width with the vertical ones fitted between; side panels do the
    /// opposite so their vertical edge cleats bear on the floor.
    pub fn calculate(panel: PanelFrame, plywood: &PanelLayout) -> Self {
        Self::calculate_within(
            panel,
            plywood,
            CleatOpening {
                u: 0.0,
                v: 0.0,
                width: plywood.panel_width,
                height: plywood.panel_height,
            },
        )
    }

    /// Lay out cleats inside a rectangular opening of a panel
    ///
    /// The framing is computed for the opening alone, using only the sheet
    /// seams that cross it, and then placed back into panel coordinates. The
    /// top panel uses this to keep its cleats clear of the walls it rests on.
    #[instrument(level = "debug", skip(plywood), fields(width = opening.width, height = opening.height))]
    pub fn calculate_within(
        panel: PanelFrame,
        plywood: &PanelLayout,
        opening: CleatOpening,
    ) -> Self {
        let width = opening.width;
        let height = opening.height;
        let name = panel.name();
        let mut cleats = Vec::new();

        let id = |suffix: &str| format!("{}_CLEAT_{}", name, suffix);
        let inner_width = (width - 2.0 * CLEAT_WIDTH).max(0.0);
        let inner_height = (height - 2.0 * CLEAT_WIDTH).max(0.0);

        use CleatKind::Perimeter;
        use CleatOrientation::{Horizontal, Vertical};
        if panel.is_side() {
            cleats.push(Cleat::new(id("LEFT"), Vertical, Perimeter, 0.0, 0.0, height));
            cleats.push(Cleat::new(id("RIGHT"), Vertical, Perimeter, width - CLEAT_WIDTH, 0.0, height));
            cleats.push(Cleat::new(id("BOTTOM"), Horizontal, Perimeter, CLEAT_WIDTH, 0.0, inner_width));
            cleats.push(Cleat::new(
                id("TOP"),
                Horizontal,
                Perimeter,
                CLEAT_WIDTH,
                height - CLEAT_WIDTH,
                inner_width,
            ));
        } else {
            cleats.push(Cleat::new(id("BOTTOM"), Horizontal, Perimeter, 0.0, 0.0, width));
            cleats.push(Cleat::new(id("TOP"), Horizontal, Perimeter, 0.0, height - CLEAT_WIDTH, width));
            cleats.push(Cleat::new(id("LEFT"), Vertical, Perimeter, 0.0, CLEAT_WIDTH, inner_height));
            cleats.push(Cleat::new(
                id("RIGHT"),
                Vertical,
                Perimeter,
                width - CLEAT_WIDTH,
                CLEAT_WIDTH,
                inner_height,
            ));
        }

        let seams_u: Vec<f64> = plywood.vertical_seams().iter().map(|x| x - opening.u).collect();
        let verticals = support_positions(width, &seams_u);
        for (i, &(center, kind)) in verticals.iter().enumerate() {
            cleats.push(Cleat::new(
                id(&format!("V_{}", i + 1)),
                Vertical,
                kind,
                center - CLEAT_WIDTH / 2.0,
                CLEAT_WIDTH,
                inner_height,
            ));
        }

        // Horizontal supports are cut to fit between the vertical cleats.
        let starts = std::iter::once(CLEAT_WIDTH)
            .chain(verticals.iter().map(|&(c, _)| c + CLEAT_WIDTH / 2.0));
        let ends = verticals
            .iter()
            .map(|&(c, _)| c - CLEAT_WIDTH / 2.0)
            .chain(std::iter::once(width - CLEAT_WIDTH));
        let openings: Vec<(f64, f64)> = starts.zip(ends).collect();

        let seams_v: Vec<f64> = plywood.horizontal_seams().iter().map(|y| y - opening.v).collect();
        let rows = support_positions(height, &seams_v);
        for (row, &(center, kind)) in rows.iter().enumerate() {
            let y = center - CLEAT_WIDTH / 2.0;
            let mut piece = 0;
            for &(start, end) in &openings {
                let length = end - start;
                if length > MIN_CLEAT_PIECE {
                    piece += 1;
                    cleats.push(Cleat::new(
                        id(&format!("H_{}_{}", row + 1, piece)),
                        Horizontal,
                        kind,
                        start,
                        y,
                        length,
                    ));
                }
            }
        }

        debug!(
            panel = name,
            total = cleats.len(),
            vertical_supports = verticals.len(),
            horizontal_rows = rows.len(),
            "laid out cleats"
        );

        for cleat in &mut cleats {
            cleat.x += opening.u;
            cleat.y += opening.v;
        }

        Self {
            panel,
            panel_width: plywood.panel_width,
            panel_height: plywood.panel_height,
            cleats,
        }
    }

    /// Vertical non-perimeter cleats, in order across the panel
    pub fn vertical_supports(&self) -> impl Iterator<Item = &Cleat> {
        self.cleats.iter().filter(|c| c.is_vertical_support())
    }

    /// Cleats of one kind
    pub fn of_kind(&self, kind: CleatKind) -> impl Iterator<Item = &Cleat> {
        self.cleats.iter().filter(move |c| c.kind == kind)
    }

    /// Stock needed for this panel
    pub fn material(&self) -> CleatMaterial {
        CleatMaterial::from_lengths(self.cleats.iter().map(|c| c.length))
    }
}
