//! Floorboard layout
//!
//! Floorboards run across the crate (world X) on top of the skids and are
//! laid side by side from the front panel to the back panel. Boards are placed
//! in matching pairs from the outside in, widest first, so the deck is
//! symmetric; whatever is left in the middle is taken by one narrower board or
//! a custom ripped board.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Dimensional lumber available for floorboards, widest first, as (nominal, actual width)
pub const FLOORBOARD_LUMBER: [(&str, f64); 4] = [
    ("2x12", 11.25),
    ("2x10", 9.25),
    ("2x8", 7.25),
    ("2x6", 5.5),
];

/// Narrowest custom board worth ripping; smaller remainders stay open
pub const MIN_CUSTOM_WIDTH: f64 = 2.5;

/// One floorboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorBoard {
    /// Nominal lumber size, or "custom" for a ripped board
    pub nominal: String,
    /// Actual width (world Y extent)
    pub width: f64,
    /// Distance of the board's front edge behind the front panel's inside face
    pub y_offset: f64,
    /// Whether the board is ripped to a non-standard width
    pub is_custom: bool,
}

/// Floorboards between the front and back panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorLayout {
    /// Boards from front to back
    pub boards: Vec<FloorBoard>,
    /// Board length (interior crate width)
    pub board_length: f64,
    /// Board thickness
    pub thickness: f64,
    /// Interior length the boards are laid along
    pub span: f64,
    /// Uncovered remainder in the middle of the deck
    pub gap: f64,
}

fn widest_fitting(space: f64) -> Option<(&'static str, f64)> {
    FLOORBOARD_LUMBER
        .iter()
        .copied()
        .find(|&(_, width)| width <= space)
}

impl FloorLayout {
    /// Lay floorboards along `span` (interior length)
    ///
    /// # Arguments
    /// * `span` - Distance between the front and back panel inside faces
    /// * `board_length` - Distance between the side panel inside faces
    /// * `thickness` - Floorboard thickness
    #[instrument(level = "debug")]
    pub fn calculate(span: f64, board_length: f64, thickness: f64) -> Self {
        let mut front: Vec<(&'static str, f64)> = Vec::new();
        let mut center: Option<(&'static str, f64, bool)> = None;
        let mut remaining = span;

        while remaining > 0.0 {
            match widest_fitting(remaining / 2.0) {
                Some(lumber) => {
                    front.push(lumber);
                    remaining -= 2.0 * lumber.1;
                }
                None => {
                    if let Some((nominal, width)) = widest_fitting(remaining) {
                        center = Some((nominal, width, false));
                        remaining -= width;
                    } else if remaining >= MIN_CUSTOM_WIDTH {
                        center = Some(("custom", remaining, true));
                        remaining = 0.0;
                    }
                    break;
                }
            }
        }

        let mut sequence: Vec<(&'static str, f64, bool)> =
            front.iter().map(|&(n, w)| (n, w, false)).collect();
        sequence.extend(center);
        sequence.extend(front.iter().rev().map(|&(n, w)| (n, w, false)));

        // Any open remainder sits in the middle of the deck.
        let gap = remaining.max(0.0);
        let middle = front.len();
        let mut boards = Vec::with_capacity(sequence.len());
        let mut y = 0.0;
        for (i, (nominal, width, is_custom)) in sequence.into_iter().enumerate() {
            if i == middle {
                y += if center.is_some() { gap / 2.0 } else { gap };
            }
            boards.push(FloorBoard {
                nominal: nominal.to_string(),
                width,
                y_offset: y,
                is_custom,
            });
            y += width;
            if center.is_some() && i == middle {
                y += gap / 2.0;
            }
        }

        debug!(boards = boards.len(), gap, "laid floorboards");
        Self {
            boards,
            board_length,
            thickness,
            span,
            gap,
        }
    }

    /// Total width covered by boards
    pub fn coverage(&self) -> f64 {
        self.boards.iter().map(|b| b.width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_pairs() {
        // 2x12 pairs while space/2 allows, then a centered board
        let layout = FloorLayout::calculate(40.0, 36.0, 1.5);
        let widths: Vec<f64> = layout.boards.iter().map(|b| b.width).collect();
        let reversed: Vec<f64> = widths.iter().rev().copied().collect();
        assert_eq!(widths, reversed);
        assert!(layout.coverage() <= 40.0 + 1e-9);
        assert!((layout.coverage() + layout.gap - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_center_board() {
        // 2 x 11.25 = 22.5, remainder 3.0 -> custom board
        let layout = FloorLayout::calculate(25.5, 30.0, 1.5);
        assert_eq!(layout.boards.len(), 3);
        assert!(layout.boards[1].is_custom);
        assert_eq!(layout.boards[1].nominal, "custom");
        assert!((layout.boards[1].width - 3.0).abs() < 1e-9);
        assert_eq!(layout.gap, 0.0);
    }

    #[test]
    fn test_small_remainder_left_open() {
        // 2 x 11.25 = 22.5, remainder 1.0 < 2.5
        let layout = FloorLayout::calculate(23.5, 30.0, 1.5);
        assert_eq!(layout.boards.len(), 2);
        assert!((layout.gap - 1.0).abs() < 1e-9);
        assert_eq!(layout.boards[0].y_offset, 0.0);
        assert!((layout.boards[1].y_offset - 12.25).abs() < 1e-9);
    }

    #[test]
    fn test_boards_do_not_overlap() {
        for span in [12.0, 17.3, 40.0, 66.5, 101.0] {
            let layout = FloorLayout::calculate(span, 30.0, 1.5);
            let mut end = 0.0;
            for board in &layout.boards {
                assert!(board.y_offset >= end - 1e-9, "span {}", span);
                end = board.y_offset + board.width;
            }
            assert!(end <= span + 1e-9, "span {}", span);
        }
    }
}
