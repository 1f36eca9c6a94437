//! Plywood sheet layout
//!
//! Each rectangular panel face is tiled with 4x8 sheet stock. Two sheet
//! orientations are evaluated and the one needing fewer sheets wins; the
//! tiling itself is greedy and row-major, so the last column and row hold
//! partial pieces cut from full sheets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Long side of a plywood sheet
pub const SHEET_LONG: f64 = 96.0;

/// Short side of a plywood sheet
pub const SHEET_SHORT: f64 = 48.0;

/// Seams closer than this to a panel edge are ignored
const SEAM_EPSILON: f64 = 1e-9;

/// One rectangular piece of a panel, in panel-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlywoodPiece {
    /// Left edge
    pub x: f64,
    /// Bottom edge
    pub y: f64,
    /// Width along the panel's horizontal axis
    pub width: f64,
    /// Height along the panel's vertical axis
    pub height: f64,
    /// Grid row, counted from the bottom
    pub row: usize,
    /// Grid column, counted from the left
    pub column: usize,
}

impl PlywoodPiece {
    /// Area in square inches
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Identical pieces grouped for a cut list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceGroup {
    /// Piece width
    pub width: f64,
    /// Piece height
    pub height: f64,
    /// Number of pieces of this size
    pub count: usize,
}

/// A panel face decomposed into sheet pieces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelLayout {
    /// Panel width
    pub panel_width: f64,
    /// Panel height
    pub panel_height: f64,
    /// Sheets laid 48" wide by 96" high instead of 96" wide by 48" high
    pub is_rotated: bool,
    /// Sheets needed (one per piece)
    pub sheet_count: usize,
    /// Grid columns
    pub sheets_across: usize,
    /// Grid rows
    pub sheets_down: usize,
    /// Pieces in row-major order from the bottom-left corner
    pub pieces: Vec<PlywoodPiece>,
}

fn grid(width: f64, height: f64, sheet_width: f64, sheet_height: f64) -> (usize, usize) {
    let across = (width / sheet_width).ceil().max(1.0) as usize;
    let down = (height / sheet_height).ceil().max(1.0) as usize;
    (across, down)
}

/// Start positions and sizes of `count` cells covering `total` with cells of at most `cell`
fn cells(total: f64, cell: f64, count: usize) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(count);
    let mut start = 0.0;
    for i in 0..count {
        let size = if i + 1 == count {
            total - start
        } else {
            cell.min(total - start)
        };
        out.push((start, size));
        start += size;
    }
    out
}

impl PanelLayout {
    /// Tile a `width` x `height` panel with the fewest sheets
    ///
    /// Standard (96 wide x 48 high) and rotated (48 x 96) sheets are both
    /// evaluated; ties go to standard.
    ///
    /// # Example
    ///
    /// ```
    /// use autocrate::plywood::PanelLayout;
    ///
    /// let layout = PanelLayout::optimize(40.0, 90.0);
    /// assert!(layout.is_rotated);
    /// assert_eq!(layout.sheet_count, 1);
    /// ```
    pub fn optimize(width: f64, height: f64) -> Self {
        let standard = grid(width, height, SHEET_LONG, SHEET_SHORT);
        let rotated = grid(width, height, SHEET_SHORT, SHEET_LONG);
        let is_rotated =
            rotated.0.saturating_mul(rotated.1) < standard.0.saturating_mul(standard.1);
        let ((across, down), (sheet_width, sheet_height)) = if is_rotated {
            (rotated, (SHEET_SHORT, SHEET_LONG))
        } else {
            (standard, (SHEET_LONG, SHEET_SHORT))
        };

        let columns = cells(width, sheet_width, across);
        let rows = cells(height, sheet_height, down);
        let mut pieces = Vec::with_capacity(across * down);
        for (row, &(y, piece_height)) in rows.iter().enumerate() {
            for (column, &(x, piece_width)) in columns.iter().enumerate() {
                pieces.push(PlywoodPiece {
                    x,
                    y,
                    width: piece_width,
                    height: piece_height,
                    row,
                    column,
                });
            }
        }

        Self {
            panel_width: width,
            panel_height: height,
            is_rotated,
            sheet_count: pieces.len(),
            sheets_across: across,
            sheets_down: down,
            pieces,
        }
    }

    /// Largest piece allowed in this layout as (width, height)
    pub fn sheet_size(&self) -> (f64, f64) {
        if self.is_rotated {
            (SHEET_SHORT, SHEET_LONG)
        } else {
            (SHEET_LONG, SHEET_SHORT)
        }
    }

    /// X positions of the seams between sheet columns
    pub fn vertical_seams(&self) -> Vec<f64> {
        self.pieces
            .iter()
            .filter(|p| p.row == 0 && p.column > 0)
            .map(|p| p.x)
            .filter(|&x| x > SEAM_EPSILON && x < self.panel_width - SEAM_EPSILON)
            .collect()
    }

    /// Y positions of the seams between sheet rows
    pub fn horizontal_seams(&self) -> Vec<f64> {
        self.pieces
            .iter()
            .filter(|p| p.column == 0 && p.row > 0)
            .map(|p| p.y)
            .filter(|&y| y > SEAM_EPSILON && y < self.panel_height - SEAM_EPSILON)
            .collect()
    }

    /// Total area of all pieces
    pub fn used_area(&self) -> f64 {
        self.pieces.iter().map(PlywoodPiece::area).sum()
    }

    /// Pieces grouped by size (rounded to 1/100"), largest first
    pub fn grouped(&self) -> Vec<PieceGroup> {
        let mut groups: BTreeMap<(i64, i64), PieceGroup> = BTreeMap::new();
        for piece in &self.pieces {
            let key = (hundredths(piece.width), hundredths(piece.height));
            groups
                .entry(key)
                .and_modify(|g| g.count += 1)
                .or_insert(PieceGroup {
                    width: piece.width,
                    height: piece.height,
                    count: 1,
                });
        }
        groups.into_values().rev().collect()
    }
}

pub(crate) fn hundredths(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Sheet usage across several panel layouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    /// Full sheets purchased
    pub total_sheets: usize,
    /// Area actually covered
    pub used_area: f64,
    /// Area of the purchased sheets
    pub sheet_area: f64,
    /// `used_area / sheet_area`
    pub efficiency: f64,
}

impl MaterialUsage {
    /// Summarize the sheets consumed by a set of layouts
    pub fn from_layouts<'a>(layouts: impl IntoIterator<Item = &'a PanelLayout>) -> Self {
        let (total_sheets, used_area) = layouts
            .into_iter()
            .fold((0, 0.0), |(sheets, area), layout| {
                (sheets + layout.sheet_count, area + layout.used_area())
            });
        let sheet_area = total_sheets as f64 * SHEET_LONG * SHEET_SHORT;
        let efficiency = if sheet_area > 0.0 {
            used_area / sheet_area
        } else {
            0.0
        };
        Self {
            total_sheets,
            used_area,
            sheet_area,
            efficiency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tiles(layout: &PanelLayout) {
        let expected = layout.panel_width * layout.panel_height;
        assert!(
            (layout.used_area() - expected).abs() < 1e-9 * expected.max(1.0),
            "area {} != {}",
            layout.used_area(),
            expected
        );
        let (max_w, max_h) = layout.sheet_size();
        for piece in &layout.pieces {
            assert!(piece.width > 0.0 && piece.width <= max_w + 1e-9);
            assert!(piece.height > 0.0 && piece.height <= max_h + 1e-9);
        }
    }

    #[test]
    fn test_single_sheet_panel() {
        let layout = PanelLayout::optimize(40.0, 30.0);
        assert!(!layout.is_rotated);
        assert_eq!(layout.sheet_count, 1);
        assert_eq!(layout.pieces[0].width, 40.0);
        assert_eq!(layout.pieces[0].height, 30.0);
        assert!(layout.vertical_seams().is_empty());
        assert!(layout.horizontal_seams().is_empty());
        assert_tiles(&layout);
    }

    #[test]
    fn test_tie_prefers_standard() {
        // 96x96: standard 1x2, rotated 2x1
        let layout = PanelLayout::optimize(96.0, 96.0);
        assert!(!layout.is_rotated);
        assert_eq!(layout.sheet_count, 2);
        assert_eq!(layout.horizontal_seams(), vec![48.0]);
        assert_tiles(&layout);
    }

    #[test]
    fn test_tall_panel_rotates() {
        // standard: 1 x 2 = 2, rotated: 1 x 1 = 1
        let layout = PanelLayout::optimize(40.0, 80.0);
        assert!(layout.is_rotated);
        assert_eq!(layout.sheet_count, 1);
        assert_tiles(&layout);
    }

    #[test]
    fn test_partial_pieces_at_edges() {
        // standard 2 x 2 ties rotated 4 x 1
        let layout = PanelLayout::optimize(150.0, 60.0);
        assert!(!layout.is_rotated);
        assert_eq!((layout.sheets_across, layout.sheets_down), (2, 2));
        assert_eq!(layout.vertical_seams(), vec![96.0]);
        assert_eq!(layout.horizontal_seams(), vec![48.0]);

        let last = layout.pieces.last().unwrap();
        assert_eq!((last.x, last.y), (96.0, 48.0));
        assert_eq!((last.width, last.height), (54.0, 12.0));
        assert_tiles(&layout);

        let groups = layout.grouped();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), 4);
    }

    #[test]
    fn test_grouping_identical_pieces() {
        let layout = PanelLayout::optimize(192.0, 40.0);
        let groups = layout.grouped();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 2);
        assert_eq!((groups[0].width, groups[0].height), (96.0, 40.0));
    }

    #[test]
    fn test_material_usage() {
        let layouts = [PanelLayout::optimize(96.0, 48.0), PanelLayout::optimize(48.0, 48.0)];
        let usage = MaterialUsage::from_layouts(layouts.iter());
        assert_eq!(usage.total_sheets, 2);
        assert_eq!(usage.sheet_area, 2.0 * 96.0 * 48.0);
        assert!((usage.efficiency - 0.75).abs() < 1e-12);
    }
}
