//! NX expression generation
//!
//! Serializes an assembled crate into a parametric expression listing for the
//! NX expression importer. Output is built from fixed tables and ordered
//! collections only, so the same configuration always produces byte-identical
//! text.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write as IoWrite;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::assembly::{CrateAssembly, PanelDesign};
use crate::cleat::CLEAT_THICKNESS;
use crate::error::Result;
use crate::model::{Block, BlockKind, CrateConfiguration, PanelFrame, VentilationPattern};

/// Numbered parameters as (number, semantic name, description)
///
/// Numbers are stable across releases; new parameters take unused numbers.
pub const PARAMETERS: [(u32, &str, &str); 18] = [
    (0, "crate_length", "Length"),
    (1, "crate_width", "Width"),
    (2, "crate_height", "Height"),
    (10, "skid_height", "Skid Height"),
    (11, "skid_width", "Skid Width"),
    (12, "skid_count", "Number of Skids"),
    (13, "floorboard_thickness", "Floorboard Thickness"),
    (14, "skid_pitch", "Skid Center Spacing"),
    (20, "top_panel_thickness", "Top Panel"),
    (21, "front_panel_thickness", "Front Panel"),
    (22, "back_panel_thickness", "Back Panel"),
    (23, "left_panel_thickness", "Left Panel"),
    (24, "right_panel_thickness", "Right Panel"),
    (30, "fastener_spacing", "Fastener Spacing"),
    (31, "lag_screw_count", "Lag Screws"),
    (40, "vinyl_thickness", "Vinyl Thickness"),
    (50, "product_weight", "Product Weight (lb)"),
    (51, "max_gross_weight", "Max Gross Weight (lb)"),
];

/// Build stage of a feature; features are always emitted in stage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureStage {
    /// Skids
    Base,
    /// Floorboards
    Floor,
    /// Plywood, cleats and ventilation cut-outs
    Panel,
    /// Lag screws and panel fastener pattern
    Fastener,
    /// Vinyl wrap
    Finish,
}

/// A single feature command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NxFeature {
    /// Build stage
    pub stage: FeatureStage,
    /// Command text, e.g. `BLOCK/SKID_1 = BLOCK(...)`
    pub command: String,
}

impl NxFeature {
    fn new(stage: FeatureStage, command: String) -> Self {
        Self { stage, command }
    }

    /// Feature name, e.g. `BLOCK/SKID_1`
    pub fn name(&self) -> &str {
        self.command
            .split_once(" = ")
            .map_or(self.command.as_str(), |(name, _)| name)
    }
}

impl fmt::Display for NxFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

/// Value of a named variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NxValue {
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl fmt::Display for NxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NxValue::Number(n) => f.write_str(&format_number(*n)),
            NxValue::Text(s) => write!(f, "\"{}\"", escape_text(s)),
        }
    }
}

/// A numbered parameter with its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NxParameter {
    /// Parameter number (`p{index}`)
    pub index: u32,
    /// Semantic name
    pub name: String,
    /// Value
    pub value: f64,
}

/// Generated NX expression set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NxExpression {
    /// Numbered parameters in table order
    pub parameters: Vec<NxParameter>,
    /// Semantic variables by name
    pub variables: BTreeMap<String, NxValue>,
    /// Derived expressions as (name, formula)
    pub expressions: Vec<(String, String)>,
    /// Features in stage order
    pub features: Vec<NxFeature>,
    /// Constraint assertions
    pub constraints: Vec<String>,
    /// Applied standards
    pub standards: Vec<String>,
    /// Rendered expression file
    pub code: String,
}

/// Format a number with at most four decimals and no trailing zeros
///
/// # Example
///
/// ```
/// use autocrate::writer::format_number;
///
/// assert_eq!(format_number(48.0), "48");
/// assert_eq!(format_number(0.75), "0.75");
/// assert_eq!(format_number(1.0 / 3.0), "0.3333");
/// assert_eq!(format_number(-0.00001), "0");
/// ```
pub fn format_number(value: f64) -> String {
    let mut s = format!("{:.4}", value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Text kept on one line, with control characters replaced by spaces
fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Quoted-string body: backslashes and double quotes escaped, one line
fn escape_text(value: &str) -> String {
    single_line(value).replace('\\', "\\\\").replace('"', "\\\"")
}

fn format_triple(a: f64, b: f64, c: f64) -> String {
    format!(
        "{}, {}, {}",
        format_number(a),
        format_number(b),
        format_number(c)
    )
}

fn block_feature(stage: FeatureStage, block: &Block) -> NxFeature {
    let min = block.min();
    let d = block.dimensions;
    NxFeature::new(
        stage,
        format!(
            "BLOCK/{} = BLOCK({}, {})",
            block.name,
            format_triple(min.x, min.y, min.z),
            format_triple(d.x, d.y, d.z)
        ),
    )
}

fn extrude_feature(stage: FeatureStage, block: &Block, panel: PanelFrame) -> NxFeature {
    let min = block.min();
    let d = block.dimensions;
    let dir = panel.inward_axis();
    NxFeature::new(
        stage,
        format!(
            "EXTRUDE/{} = EXTRUDE({}, {}, DIR=({}))",
            block.name,
            format_triple(min.x, min.y, min.z),
            format_triple(d.x, d.y, d.z),
            format_triple(dir.x, dir.y, dir.z)
        ),
    )
}

fn panel_features(panel: &PanelDesign) -> Vec<NxFeature> {
    let mut features: Vec<NxFeature> = panel
        .plywood_blocks()
        .iter()
        .map(|b| extrude_feature(FeatureStage::Panel, b, panel.frame))
        .collect();
    features.extend(
        panel
            .cleat_blocks()
            .iter()
            .map(|b| block_feature(FeatureStage::Panel, b)),
    );
    if let Some(vent) = panel.config.ventilation {
        let body = match vent.pattern {
            VentilationPattern::Holes => format!(
                "SIMPLE_HOLE({}, {}, PATTERN=RECTANGULAR)",
                format_number(vent.size),
                vent.count
            ),
            VentilationPattern::Slots => format!(
                "RECTANGULAR_SLOT({}, {}, {})",
                format_number(vent.size),
                format_number(vent.size * 3.0),
                vent.count
            ),
        };
        features.push(NxFeature::new(
            FeatureStage::Panel,
            format!(
                "{}/{}_VENT = {}",
                vent.pattern.feature(),
                panel.frame.name(),
                body
            ),
        ));
    }
    features
}

fn parameter_values(config: &CrateConfiguration, assembly: &CrateAssembly) -> [f64; 18] {
    let dims = config.dimensions;
    let skids = &assembly.skids;
    let cap = &config.cap;
    [
        dims.length,
        dims.width,
        dims.height,
        skids.dimensions.height,
        skids.dimensions.width,
        skids.count as f64,
        config.base.floorboard_thickness,
        skids.pitch,
        cap.top.thickness,
        cap.front.thickness,
        cap.back.thickness,
        cap.left.thickness,
        cap.right.thickness,
        config.fasteners.spacing,
        assembly.lag_screw_count() as f64,
        config.vinyl.thickness,
        config.weight.product_lb(),
        config.weight.gross_lb(),
    ]
}

fn derived_expressions() -> Vec<(String, String)> {
    let cleat = format_number(CLEAT_THICKNESS);
    [
        ("wall_height", "p2 - p10 - p20".to_string()),
        ("total_height", "p10 + wall_height + p20".to_string()),
        ("interior_length", format!("p0 - p21 - p22 - 2 * {}", cleat)),
        ("interior_width", format!("p1 - p23 - p24 - 2 * {}", cleat)),
        ("interior_height", format!("wall_height - p13 - {}", cleat)),
        ("crate_volume", "p0 * p1 * p2".to_string()),
    ]
    .into_iter()
    .map(|(name, formula)| (name.to_string(), formula))
    .collect()
}

const CONSTRAINTS: [&str; 8] = [
    "crate_length > 0",
    "crate_width > 0",
    "crate_height > 0",
    "skid_count >= 3",
    "skid_height >= 3.5",
    "top_panel_thickness >= 0.5",
    "product_weight <= max_gross_weight",
    "fastener_spacing > 0",
];

impl NxExpression {
    /// Generate the expression set for an assembled crate
    ///
    /// # Arguments
    /// * `config` - The configuration the assembly was built from
    /// * `assembly` - The assembled geometry
    #[instrument(level = "debug", skip_all, fields(project = %config.project_name))]
    pub fn generate(config: &CrateConfiguration, assembly: &CrateAssembly) -> Self {
        let values = parameter_values(config, assembly);
        let parameters: Vec<NxParameter> = PARAMETERS
            .iter()
            .zip(values)
            .map(|(&(index, name, _), value)| NxParameter {
                index,
                name: name.to_string(),
                value,
            })
            .collect();

        let mut variables: BTreeMap<String, NxValue> = parameters
            .iter()
            .map(|p| (p.name.clone(), NxValue::Number(p.value)))
            .collect();
        let text = [
            ("base_type", config.base.base_type.as_str().to_string()),
            ("base_material", config.base.material.as_str().to_string()),
            ("fastener_type", config.fasteners.kind.as_str().to_string()),
            ("fastener_size", config.fasteners.size.clone()),
            ("fastener_material", config.fasteners.material.as_str().to_string()),
        ];
        for (name, value) in text {
            variables.insert(name.to_string(), NxValue::Text(value));
        }
        variables.insert(
            "vinyl_enabled".to_string(),
            NxValue::Number(if config.vinyl.enabled { 1.0 } else { 0.0 }),
        );

        let mut features = Vec::new();
        features.extend(
            assembly
                .scene
                .of_kind(BlockKind::Skid)
                .map(|b| block_feature(FeatureStage::Base, b)),
        );
        features.extend(
            assembly
                .scene
                .of_kind(BlockKind::Floorboard)
                .map(|b| block_feature(FeatureStage::Floor, b)),
        );
        for panel in &assembly.panels {
            features.extend(panel_features(panel));
        }
        for panel in &assembly.panels {
            if let Some(hardware) = &panel.hardware {
                features.extend(
                    hardware
                        .blocks()
                        .map(|b| extrude_feature(FeatureStage::Fastener, b, panel.frame)),
                );
            }
        }
        let fasteners = &config.fasteners;
        features.push(NxFeature::new(
            FeatureStage::Fastener,
            format!(
                "PATTERN/FASTENER_LAYOUT = PATTERN(TYPE={}, SIZE={}, SPACING=p30, MATERIAL={}, APPLY_TO=ALL_EDGES)",
                fasteners.kind.as_str().to_uppercase(),
                single_line(&fasteners.size),
                fasteners.material.as_str().to_uppercase()
            ),
        ));
        if config.vinyl.enabled {
            features.push(NxFeature::new(
                FeatureStage::Finish,
                format!(
                    "SHEET/VINYL_WRAP = SHEET(THICKNESS=p40, TYPE={}, COVERAGE={})",
                    config.vinyl.kind.as_str().to_uppercase(),
                    config.vinyl.coverage.as_str().to_uppercase()
                ),
            ));
        }
        // stable: keeps assembly order within a stage
        features.sort_by_key(|f| f.stage);

        let mut expression = Self {
            parameters,
            variables,
            expressions: derived_expressions(),
            features,
            constraints: CONSTRAINTS.iter().map(|c| c.to_string()).collect(),
            standards: config
                .standards
                .applied()
                .into_iter()
                .map(String::from)
                .collect(),
            code: String::new(),
        };
        expression.code = expression.render(&config.project_name);
        debug!(
            features = expression.features.len(),
            bytes = expression.code.len(),
            "generated NX expressions"
        );
        expression
    }

    fn render(&self, project_name: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        let descriptions: BTreeMap<u32, &str> =
            PARAMETERS.iter().map(|&(i, _, d)| (i, d)).collect();

        for p in &self.parameters {
            let description = descriptions.get(&p.index).copied().unwrap_or(&p.name);
            lines.push(format!(
                "p{} = {} // {}",
                p.index,
                format_number(p.value),
                description
            ));
        }

        lines.push(String::new());
        lines.push("// ===== VARIABLES =====".to_string());
        for p in &self.parameters {
            lines.push(format!("{} = p{}", p.name, p.index));
        }
        for (name, value) in &self.variables {
            if let NxValue::Text(_) = value {
                lines.push(format!("{} = {}", name, value));
            }
        }
        if let Some(vinyl) = self.variables.get("vinyl_enabled") {
            lines.push(format!("vinyl_enabled = {}", vinyl));
        }

        lines.push(String::new());
        lines.push("// ===== EXPRESSIONS =====".to_string());
        for (name, formula) in &self.expressions {
            lines.push(format!("{} = {}", name, formula));
        }

        lines.push(String::new());
        lines.push("// ===== FEATURES =====".to_string());
        lines.extend(self.features.iter().map(|f| f.command.clone()));

        lines.push(String::new());
        lines.push("// ===== CONSTRAINTS =====".to_string());
        lines.extend(self.constraints.iter().cloned());

        lines.push(String::new());
        lines.push(format!("// PROJECT: {}", single_line(project_name)));
        for standard in &self.standards {
            lines.push(format!("// STANDARD: {}", single_line(standard)));
        }

        let mut code = lines.join("\n");
        code.push('\n');
        code
    }

    /// Value of a numbered parameter
    pub fn parameter(&self, index: u32) -> Option<f64> {
        self.parameters
            .iter()
            .find(|p| p.index == index)
            .map(|p| p.value)
    }

    /// Index of the first feature in a stage
    pub fn first_of_stage(&self, stage: FeatureStage) -> Option<usize> {
        self.features.iter().position(|f| f.stage == stage)
    }
}

/// Write the rendered expression file
///
/// # Arguments
/// * `expression` - Generated expressions
/// * `writer` - Destination
pub fn write_nx_expression<W: IoWrite>(expression: &NxExpression, mut writer: W) -> Result<()> {
    writer.write_all(expression.code.as_bytes())?;
    writer.flush()?;
    Ok(())
}
