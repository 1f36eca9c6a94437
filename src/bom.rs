//! Cut list and bill of materials
//!
//! Aggregates an assembled crate into purchasable and cuttable line items.
//! Identical parts are grouped, with lengths compared to the hundredth of an
//! inch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::assembly::{CrateAssembly, PanelDesign};
use crate::cleat::{CLEAT_THICKNESS, CLEAT_WIDTH, CleatMaterial};
use crate::CrateDesign;
use crate::hardware::{LAG_SHANK_DIAMETER, LAG_SHANK_LENGTH};
use crate::model::{CrateConfiguration, PanelFrame, VinylCoverage};
use crate::plywood::{MaterialUsage, hundredths};
use crate::writer::format_number;

/// Distance between rub strips along the crate length
pub const RUB_STRIP_SPACING: f64 = 48.0;

/// Rub strip cross-section (2x4 actual) as (width, thickness)
pub const RUB_STRIP_SECTION: (f64, f64) = (3.5, 1.5);

/// Unit for parts counted by the piece
pub const EACH: &str = "ea";

/// Lumber grade required for the load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LumberGrade {
    /// Below 1000 lb
    Standard,
    /// 1000 lb and up
    No2,
    /// 2000 lb and up
    No1,
    /// 3000 lb and up
    Select,
}

impl LumberGrade {
    /// Grade for a product weight in pounds
    ///
    /// ```
    /// use autocrate::bom::LumberGrade;
    ///
    /// assert_eq!(LumberGrade::for_weight(999.0), LumberGrade::Standard);
    /// assert_eq!(LumberGrade::for_weight(1000.0), LumberGrade::No2);
    /// assert_eq!(LumberGrade::for_weight(3000.0), LumberGrade::Select);
    /// ```
    pub fn for_weight(product_lb: f64) -> Self {
        if product_lb >= 3000.0 {
            LumberGrade::Select
        } else if product_lb >= 2000.0 {
            LumberGrade::No1
        } else if product_lb >= 1000.0 {
            LumberGrade::No2
        } else {
            LumberGrade::Standard
        }
    }

    /// Grade stamp
    pub fn as_str(&self) -> &'static str {
        match self {
            LumberGrade::Standard => "Standard",
            LumberGrade::No2 => "#2",
            LumberGrade::No1 => "#1",
            LumberGrade::Select => "Select Structural",
        }
    }
}

/// One line of the cut list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutItem {
    /// What the part is
    pub description: String,
    /// Material and grade
    pub material: String,
    /// Cut length in inches
    pub length: f64,
    /// Width in inches
    pub width: f64,
    /// Thickness in inches
    pub thickness: f64,
    /// Number of identical parts
    pub quantity: usize,
    /// Unit the quantity is counted in
    pub unit: String,
}

/// Cut list for one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelCutList {
    /// Panel
    pub panel: PanelFrame,
    /// Cleats grouped by length, longest first
    pub cleats: Vec<CutItem>,
    /// Plywood pieces grouped by size, largest first
    pub plywood: Vec<CutItem>,
    /// Full sheets consumed
    pub sheet_count: usize,
}

/// Vinyl wrap requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VinylItem {
    /// Barrier type
    pub kind: String,
    /// Film thickness in inches
    pub thickness: f64,
    /// Area to cover
    pub square_feet: f64,
}

/// Totals across the cut list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutListSummary {
    /// Cleat stock in linear feet
    pub cleat_linear_feet: f64,
    /// 8 ft 1x4 sticks to purchase
    pub cleat_stock_count: usize,
    /// Plywood sheets to purchase
    pub plywood_sheets: usize,
    /// Fraction of purchased plywood that ends up in the crate
    pub plywood_efficiency: f64,
    /// Skid lumber in linear feet
    pub skid_linear_feet: f64,
    /// Lag screws
    pub lag_screws: usize,
    /// Panel fasteners along the wall edges
    pub panel_fasteners: usize,
    /// Cut list lines
    pub line_items: usize,
}

/// Complete cut list for a crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutList {
    /// Lumber grade for the load
    pub grade: LumberGrade,
    /// Skids
    pub skids: Vec<CutItem>,
    /// Rub strips, empty when not required
    pub rub_strips: Vec<CutItem>,
    /// Floorboards grouped by size
    pub floorboards: Vec<CutItem>,
    /// Per-panel cleats and plywood
    pub panels: Vec<PanelCutList>,
    /// Lag screws and panel fasteners
    pub hardware: Vec<CutItem>,
    /// Vinyl, when enabled
    pub vinyl: Option<VinylItem>,
    /// Totals
    pub summary: CutListSummary,
}

fn lumber(config: &CrateConfiguration, grade: LumberGrade) -> String {
    format!("{} {}", config.base.material.as_str(), grade.as_str())
}

fn rub_strip_count(length: f64) -> usize {
    ((length / RUB_STRIP_SPACING).ceil() as usize).saturating_add(1)
}

fn panel_cut_list(panel: &PanelDesign) -> PanelCutList {
    let name = panel.frame.name();
    let mut by_length: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for cleat in &panel.cleats.cleats {
        by_length
            .entry(hundredths(cleat.length))
            .and_modify(|(_, n)| *n += 1)
            .or_insert((cleat.length, 1));
    }
    let cleats = by_length
        .into_values()
        .rev()
        .map(|(length, quantity)| CutItem {
            description: format!("{} cleat 1x4", name),
            material: "1x4 lumber".to_string(),
            length,
            width: CLEAT_WIDTH,
            thickness: CLEAT_THICKNESS,
            quantity,
            unit: EACH.to_string(),
        })
        .collect();

    let plywood = panel
        .plywood
        .grouped()
        .into_iter()
        .map(|group| CutItem {
            description: format!("{} sheet", name),
            material: panel.config.material.as_str().to_string(),
            length: group.height,
            width: group.width,
            thickness: panel.thickness(),
            quantity: group.count,
            unit: EACH.to_string(),
        })
        .collect();

    PanelCutList {
        panel: panel.frame,
        cleats,
        plywood,
        sheet_count: panel.plywood.sheet_count,
    }
}

fn vinyl_area(config: &CrateConfiguration) -> f64 {
    let d = config.dimensions;
    let (top, sides, ends) = (d.length * d.width, d.length * d.height, d.width * d.height);
    let square_inches = match config.vinyl.coverage {
        VinylCoverage::Full => 2.0 * (top + sides + ends),
        VinylCoverage::Partial => top + 2.0 * (sides + ends),
    };
    square_inches / 144.0
}

impl CutList {
    /// Build the cut list of a finished design
    pub fn from_design(design: &CrateDesign) -> Self {
        Self::from_assembly(&design.configuration, &design.assembly)
    }

    /// Build the cut list from a configuration and its assembly
    #[instrument(level = "debug", skip_all, fields(project = %config.project_name))]
    pub fn from_assembly(config: &CrateConfiguration, assembly: &CrateAssembly) -> Self {
        let grade = LumberGrade::for_weight(config.weight.product_lb());
        let material = lumber(config, grade);
        let dims = config.dimensions;
        let skid = &assembly.skids;

        let skids = vec![CutItem {
            description: format!("Skid {}", skid.nominal),
            material: material.clone(),
            length: skid.length,
            width: skid.dimensions.width,
            thickness: skid.dimensions.height,
            quantity: skid.count,
            unit: EACH.to_string(),
        }];

        let rub_strips = if skid.requires_rub_strips {
            vec![CutItem {
                description: "Rub strip 2x4".to_string(),
                material: material.clone(),
                length: dims.width,
                width: RUB_STRIP_SECTION.0,
                thickness: RUB_STRIP_SECTION.1,
                quantity: rub_strip_count(dims.length),
                unit: EACH.to_string(),
            }]
        } else {
            Vec::new()
        };

        let floor = &assembly.floor;
        let mut by_board: BTreeMap<(i64, String), (f64, usize)> = BTreeMap::new();
        for board in &floor.boards {
            by_board
                .entry((hundredths(board.width), board.nominal.clone()))
                .and_modify(|(_, n)| *n += 1)
                .or_insert((board.width, 1));
        }
        let floorboards: Vec<CutItem> = by_board
            .into_iter()
            .rev()
            .map(|((_, nominal), (width, quantity))| CutItem {
                description: if nominal == "custom" {
                    "Floorboard custom rip".to_string()
                } else {
                    format!("Floorboard {}", nominal)
                },
                material: material.clone(),
                length: floor.board_length,
                width,
                thickness: floor.thickness,
                quantity,
                unit: EACH.to_string(),
            })
            .collect();

        let panels: Vec<PanelCutList> = assembly.panels.iter().map(panel_cut_list).collect();

        let lag_screws = assembly.lag_screw_count();
        let spacing = config.fasteners.spacing;
        let panel_fasteners: usize = assembly
            .panels
            .iter()
            .filter(|p| p.frame != PanelFrame::Top)
            .map(|p| (2.0 * (p.width + p.height) / spacing).ceil() as usize)
            .sum();
        let mut hardware = Vec::new();
        if lag_screws > 0 {
            hardware.push(CutItem {
                description: "Lag screw 3/8 x 2-1/2".to_string(),
                material: "zinc plated steel".to_string(),
                length: LAG_SHANK_LENGTH,
                width: LAG_SHANK_DIAMETER,
                thickness: LAG_SHANK_DIAMETER,
                quantity: lag_screws,
                unit: EACH.to_string(),
            });
        }
        hardware.push(CutItem {
            description: format!(
                "Panel fastener {} {}",
                config.fasteners.kind.as_str(),
                config.fasteners.size
            ),
            material: config.fasteners.material.as_str().to_string(),
            length: 0.0,
            width: 0.0,
            thickness: 0.0,
            quantity: panel_fasteners,
            unit: EACH.to_string(),
        });

        let vinyl = config.vinyl.enabled.then(|| VinylItem {
            kind: config.vinyl.kind.as_str().to_string(),
            thickness: config.vinyl.thickness,
            square_feet: vinyl_area(config),
        });

        let cleat_material = CleatMaterial::sum(assembly.panels.iter().map(|p| &p.cleats));
        let usage = MaterialUsage::from_layouts(assembly.panels.iter().map(|p| &p.plywood));
        let line_items = skids.len()
            + rub_strips.len()
            + floorboards.len()
            + panels
                .iter()
                .map(|p| p.cleats.len() + p.plywood.len())
                .sum::<usize>()
            + hardware.len()
            + usize::from(vinyl.is_some());

        let summary = CutListSummary {
            cleat_linear_feet: cleat_material.total_linear_feet,
            cleat_stock_count: cleat_material.stock_count,
            plywood_sheets: usage.total_sheets,
            plywood_efficiency: usage.efficiency,
            skid_linear_feet: skid.count as f64 * skid.length / 12.0,
            lag_screws,
            panel_fasteners,
            line_items,
        };
        debug!(line_items, grade = grade.as_str(), "built cut list");

        Self {
            grade,
            skids,
            rub_strips,
            floorboards,
            panels,
            hardware,
            vinyl,
            summary,
        }
    }

    /// Every cut item with the section it belongs to
    pub fn items(&self) -> Vec<(String, &CutItem)> {
        let mut items: Vec<(String, &CutItem)> = Vec::new();
        items.extend(self.skids.iter().map(|i| ("skids".to_string(), i)));
        items.extend(self.rub_strips.iter().map(|i| ("rub_strips".to_string(), i)));
        items.extend(self.floorboards.iter().map(|i| ("floorboards".to_string(), i)));
        for panel in &self.panels {
            let section = panel.panel.name().to_lowercase();
            items.extend(panel.cleats.iter().map(|i| (format!("{}_cleats", section), i)));
            items.extend(panel.plywood.iter().map(|i| (format!("{}_plywood", section), i)));
        }
        items.extend(self.hardware.iter().map(|i| ("hardware".to_string(), i)));
        items
    }

    /// Render as CSV with a header row
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("section,description,material,length,width,thickness,quantity,unit\n");
        for (section, item) in self.items() {
            let row = [
                section,
                csv_field(&item.description),
                csv_field(&item.material),
                format_number(item.length),
                format_number(item.width),
                format_number(item.thickness),
                item.quantity.to_string(),
                csv_field(&item.unit),
            ];
            csv.push_str(&row.join(","));
            csv.push('\n');
        }
        if let Some(vinyl) = &self.vinyl {
            csv.push_str(&format!(
                "vinyl,Vinyl wrap,{},0,0,{},{},sq ft\n",
                csv_field(&vinyl.kind),
                format_number(vinyl.thickness),
                format_number(vinyl.square_feet)
            ));
        }
        csv
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dimensions;

    fn cut_list(dims: Dimensions, weight: f64) -> (CrateAssembly, CutList) {
        let config = CrateConfiguration::with_dimensions(dims, weight);
        let assembly = CrateAssembly::assemble(&config).unwrap();
        let list = CutList::from_assembly(&config, &assembly);
        (assembly, list)
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(LumberGrade::for_weight(0.0), LumberGrade::Standard);
        assert_eq!(LumberGrade::for_weight(1999.9), LumberGrade::No2);
        assert_eq!(LumberGrade::for_weight(2000.0), LumberGrade::No1);
        assert_eq!(LumberGrade::for_weight(10_000.0), LumberGrade::Select);
    }

    #[test]
    fn test_rub_strip_count() {
        assert_eq!(rub_strip_count(96.0), 3);
        assert_eq!(rub_strip_count(120.0), 4);
    }

    #[test]
    fn test_no_rub_strips_on_short_crate() {
        let (_, list) = cut_list(Dimensions::new(48.0, 40.0, 36.0), 500.0);
        assert!(list.rub_strips.is_empty());
        assert_eq!(list.skids[0].quantity, 3);
        assert_eq!(list.skids[0].description, "Skid 4x4");
        assert_eq!(list.skids[0].material, "pine Standard");
    }

    #[test]
    fn test_rub_strips_on_long_crate() {
        let (_, list) = cut_list(Dimensions::new(120.0, 40.0, 36.0), 500.0);
        assert_eq!(list.rub_strips.len(), 1);
        assert_eq!(list.rub_strips[0].quantity, 4);
        assert_eq!(list.rub_strips[0].length, 40.0);
    }

    #[test]
    fn test_totals_match_assembly() {
        let (assembly, list) = cut_list(Dimensions::new(100.0, 60.0, 50.0), 2500.0);
        let cleats: usize = list
            .panels
            .iter()
            .flat_map(|p| &p.cleats)
            .map(|i| i.quantity)
            .sum();
        let cleat_blocks = assembly
            .scene
            .of_kind(crate::model::BlockKind::Cleat)
            .count();
        assert_eq!(cleats, cleat_blocks);

        let pieces: usize = list
            .panels
            .iter()
            .flat_map(|p| &p.plywood)
            .map(|i| i.quantity)
            .sum();
        assert_eq!(pieces, list.summary.plywood_sheets);

        assert!(!list.floorboards.is_empty());
        assert!(list.items().iter().all(|(_, item)| item.unit == EACH));
        let boards: usize = list.floorboards.iter().map(|i| i.quantity).sum();
        assert_eq!(boards, assembly.floor.boards.len());
        assert_eq!(list.summary.lag_screws, assembly.lag_screw_count());
        assert_eq!(list.grade, LumberGrade::No1);
        assert_eq!(list.items().len() + usize::from(list.vinyl.is_some()), list.summary.line_items);
    }

    #[test]
    fn test_panel_fastener_count() {
        // walls: 2 x (40 + 31.75) + 2 x (46.5 + 31.75), perimeters / 6
        let (_, list) = cut_list(Dimensions::new(48.0, 40.0, 36.0), 500.0);
        let expected = 2 * (143.5f64 / 6.0).ceil() as usize + 2 * (156.5f64 / 6.0).ceil() as usize;
        assert_eq!(list.summary.panel_fasteners, expected);
    }

    #[test]
    fn test_vinyl_area() {
        let mut config = CrateConfiguration::with_dimensions(Dimensions::new(48.0, 40.0, 36.0), 500.0);
        config.vinyl.enabled = true;
        let assembly = CrateAssembly::assemble(&config).unwrap();
        let list = CutList::from_assembly(&config, &assembly);
        let vinyl = list.vinyl.as_ref().unwrap();
        let expected = 2.0 * (48.0 * 40.0 + 48.0 * 36.0 + 40.0 * 36.0) / 144.0;
        assert!((vinyl.square_feet - expected).abs() < 1e-9);
        assert!(list.to_csv().ends_with("sq ft\n"));
    }

    #[test]
    fn test_csv() {
        let (_, list) = cut_list(Dimensions::new(48.0, 40.0, 36.0), 500.0);
        let csv = list.to_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("section,description,material,length,width,thickness,quantity,unit")
        );
        assert_eq!(
            lines.next(),
            Some("skids,Skid 4x4,pine Standard,48,3.5,3.5,3,ea")
        );
        assert_eq!(csv.lines().count(), list.items().len() + 1);
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
