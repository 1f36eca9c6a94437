//! STEP (ISO-10303-21) bounding-box extraction
//!
//! Only `CARTESIAN_POINT` entities and the first `PRODUCT` name are read. The
//! bounding box of all points is used to size and classify hardware models;
//! no topology is interpreted.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

const POINT_KEYWORD: &str = "CARTESIAN_POINT";
const PRODUCT_KEYWORD: &str = "PRODUCT";

/// Extents of a STEP bounding box along X, Y and Z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepDimensions {
    /// X extent
    pub width: f64,
    /// Y extent
    pub height: f64,
    /// Z extent
    pub depth: f64,
}

/// Axis-aligned bounding box of every point in a STEP file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepBoundingBox {
    /// Componentwise minimum
    pub min: Point3<f64>,
    /// Componentwise maximum
    pub max: Point3<f64>,
    /// Extents
    pub dimensions: StepDimensions,
    /// Midpoint
    pub center: Point3<f64>,
}

impl StepBoundingBox {
    /// Bounding box of a point set, `None` when empty
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest.iter().fold((*first, *first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        });
        Some(Self {
            min,
            max,
            dimensions: StepDimensions {
                width: max.x - min.x,
                height: max.y - min.y,
                depth: max.z - min.z,
            },
            center: nalgebra::center(&min, &max),
        })
    }

    /// Product of the three extents
    pub fn volume(&self) -> f64 {
        self.dimensions.width * self.dimensions.height * self.dimensions.depth
    }
}

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// X
    X,
    /// Y
    Y,
    /// Z
    Z,
}

/// Extents sorted from longest to shortest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOrientation {
    /// Axis of the longest extent
    pub primary_axis: Axis,
    /// Longest extent
    pub length: f64,
    /// Middle extent
    pub width: f64,
    /// Shortest extent
    pub height: f64,
}

impl StepOrientation {
    fn from_dimensions(d: &StepDimensions) -> Self {
        let mut extents = [(Axis::X, d.width), (Axis::Y, d.height), (Axis::Z, d.depth)];
        // stable: equal extents keep X before Y before Z
        extents.sort_by(|a, b| b.1.total_cmp(&a.1));
        Self {
            primary_axis: extents[0].0,
            length: extents[0].1,
            width: extents[1].1,
            height: extents[2].1,
        }
    }
}

/// Geometry summary of one STEP file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFileInfo {
    /// Source file name, empty for in-memory text
    pub file_name: String,
    /// First PRODUCT name, or "Unknown"
    pub product_name: String,
    /// Bounding box of all points
    pub bounding_box: StepBoundingBox,
    /// Bounding box volume (a crude stand-in for solid volume)
    pub volume: f64,
    /// Sorted extents
    pub orientation: StepOrientation,
    /// Number of points read
    pub point_count: usize,
}

/// Tuning values for shape classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationThresholds {
    /// Flat when the shortest extent is below this fraction of the longest
    pub flat_ratio: f64,
    /// Lower bound (exclusive) of the solid/box volume ratio for L shapes
    pub l_shape_min: f64,
    /// Upper bound (exclusive) of the solid/box volume ratio for L shapes
    pub l_shape_max: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            flat_ratio: 0.1,
            l_shape_min: 0.3,
            l_shape_max: 0.7,
        }
    }
}

impl StepFileInfo {
    /// Whether the part is flat, like a stencil or decal
    pub fn is_flat_stencil(&self, thresholds: &ClassificationThresholds) -> bool {
        self.orientation.height < self.orientation.length * thresholds.flat_ratio
    }

    /// Whether the part fills an L-shaped fraction of its bounding box
    ///
    /// `solid_volume` defaults to [`StepFileInfo::volume`], which always gives
    /// a ratio of 1 and therefore `false`.
    pub fn is_l_shaped(
        &self,
        thresholds: &ClassificationThresholds,
        solid_volume: Option<f64>,
    ) -> bool {
        let box_volume = self.bounding_box.volume();
        if box_volume <= 0.0 {
            return false;
        }
        let ratio = solid_volume.unwrap_or(self.volume) / box_volume;
        ratio > thresholds.l_shape_min && ratio < thresholds.l_shape_max
    }
}

/// Hardware category derived from a product name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Klimp spring clip
    Klimp,
    /// Stencil or decal
    Stencil,
    /// Screw, washer or bolt
    Fastener,
    /// Anything else
    Unknown,
}

impl ComponentKind {
    /// Classify by case-insensitive substring of the product name
    ///
    /// ```
    /// use autocrate::parser::ComponentKind;
    ///
    /// assert_eq!(ComponentKind::from_name("KLIMP_#4"), ComponentKind::Klimp);
    /// assert_eq!(ComponentKind::from_name("Lag Screw 3/8"), ComponentKind::Fastener);
    /// assert_eq!(ComponentKind::from_name("bracket"), ComponentKind::Unknown);
    /// ```
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("klimp") {
            ComponentKind::Klimp
        } else if name.contains("stencil") {
            ComponentKind::Stencil
        } else if ["screw", "washer", "bolt"].iter().any(|k| name.contains(k)) {
            ComponentKind::Fastener
        } else {
            ComponentKind::Unknown
        }
    }

    /// Bounding-box display color
    pub fn color(&self) -> &'static str {
        match self {
            ComponentKind::Klimp => "#2a2a2a",
            ComponentKind::Stencil => "#1a1a1a",
            ComponentKind::Fastener => "#404040",
            ComponentKind::Unknown => "#333333",
        }
    }

    /// Lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Klimp => "klimp",
            ComponentKind::Stencil => "stencil",
            ComponentKind::Fastener => "fastener",
            ComponentKind::Unknown => "unknown",
        }
    }
}

/// Classified component ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    /// Product name
    pub name: String,
    /// Category
    pub kind: ComponentKind,
    /// Display color
    pub color: String,
    /// Parsed geometry
    pub info: StepFileInfo,
    /// Flat like a stencil or decal
    pub is_flat_stencil: bool,
    /// Fills an L-shaped fraction of its bounding box
    pub is_l_shaped: bool,
}

impl ComponentDescriptor {
    /// Classify a parsed STEP file with the default thresholds
    pub fn from_info(info: &StepFileInfo) -> Self {
        Self::classify(info, &ClassificationThresholds::default())
    }

    /// Classify a parsed STEP file by its product name and shape
    pub fn classify(info: &StepFileInfo, thresholds: &ClassificationThresholds) -> Self {
        let kind = ComponentKind::from_name(&info.product_name);
        Self {
            name: info.product_name.clone(),
            kind,
            color: kind.color().to_string(),
            info: info.clone(),
            is_flat_stencil: info.is_flat_stencil(thresholds),
            is_l_shaped: info.is_l_shaped(thresholds, None),
        }
    }
}

/// Parse a STEP real such as `0.`, `-1.5E-3` or `+2`
pub fn parse_step_real(token: &str) -> Result<f64> {
    let token = token.trim();
    let well_formed = !token.is_empty()
        && token.bytes().any(|b| b.is_ascii_digit())
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !well_formed {
        return Err(Error::parse_error_with_context(
            "CARTESIAN_POINT coordinate",
            token,
            "STEP real",
        ));
    }
    let value = token.parse::<f64>()?;
    if !value.is_finite() {
        return Err(Error::parse_error_with_context(
            "CARTESIAN_POINT coordinate",
            token,
            "finite STEP real",
        ));
    }
    Ok(value)
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Index just past a quoted STEP string starting at `i`; `''` is an escaped quote
fn skip_string(bytes: &[u8], mut i: usize) -> Option<usize> {
    i += 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Parse the point list of one `CARTESIAN_POINT` whose keyword ends at `i`
fn point_at(text: &str, i: usize) -> Option<Point3<f64>> {
    let bytes = text.as_bytes();
    let mut i = skip_ws(bytes, i);
    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    i = skip_ws(bytes, i + 1);
    if bytes.get(i) == Some(&b'\'') {
        i = skip_string(bytes, i)?;
    } else {
        while i < bytes.len() && bytes[i] != b',' {
            i += 1;
        }
    }
    i = skip_ws(bytes, i);
    if bytes.get(i) != Some(&b',') {
        return None;
    }
    i = skip_ws(bytes, i + 1);
    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    let start = i + 1;
    let end = start + text[start..].find(')')?;
    let coords: Vec<&str> = text[start..end].split(',').collect();
    if coords.len() != 3 {
        return None;
    }
    let x = parse_step_real(coords[0]).ok()?;
    let y = parse_step_real(coords[1]).ok()?;
    let z = parse_step_real(coords[2]).ok()?;
    Some(Point3::new(x, y, z))
}

/// Every well-formed 3D `CARTESIAN_POINT` in the text
///
/// Entities with two coordinates or malformed numbers are skipped.
pub fn cartesian_points(text: &str) -> Vec<Point3<f64>> {
    let bytes = text.as_bytes();
    let mut points = Vec::new();
    let mut skipped = 0usize;
    for (at, _) in text.match_indices(POINT_KEYWORD) {
        if at > 0 && is_ident_byte(bytes[at - 1]) {
            continue;
        }
        match point_at(text, at + POINT_KEYWORD.len()) {
            Some(p) => points.push(p),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "skipped CARTESIAN_POINT entities");
    }
    points
}

/// First non-empty `PRODUCT('name'` label, or "Unknown"
pub fn product_name(text: &str) -> String {
    let bytes = text.as_bytes();
    for (at, _) in text.match_indices(PRODUCT_KEYWORD) {
        if at > 0 && is_ident_byte(bytes[at - 1]) {
            continue;
        }
        let mut i = skip_ws(bytes, at + PRODUCT_KEYWORD.len());
        if bytes.get(i) != Some(&b'(') {
            continue;
        }
        i = skip_ws(bytes, i + 1);
        if bytes.get(i) != Some(&b'\'') {
            continue;
        }
        let Some(end) = skip_string(bytes, i) else {
            continue;
        };
        let name = text[i + 1..end - 1].replace("''", "'");
        if !name.is_empty() {
            return name;
        }
    }
    "Unknown".to_string()
}

/// Parse STEP text held in memory
///
/// # Example
///
/// ```
/// use autocrate::parser::parse_step;
///
/// let text = "#1=CARTESIAN_POINT('',(0.,0.,0.));\n#2=CARTESIAN_POINT('',(4.,2.,1.));";
/// let info = parse_step(text).unwrap();
/// assert_eq!(info.bounding_box.dimensions.width, 4.0);
/// assert_eq!(info.product_name, "Unknown");
/// ```
pub fn parse_step(text: &str) -> Result<StepFileInfo> {
    parse_step_file(text, "")
}

/// Parse STEP text read from `file_name`
///
/// # Errors
/// [`Error::ParseError`] when the text holds no usable `CARTESIAN_POINT`.
#[instrument(level = "debug", skip(text), fields(bytes = text.len()))]
pub fn parse_step_file(text: &str, file_name: &str) -> Result<StepFileInfo> {
    let points = cartesian_points(text);
    let bounding_box = StepBoundingBox::from_points(&points).ok_or_else(|| {
        Error::ParseError(format!(
            "No CARTESIAN_POINT entities found in STEP file '{}'",
            file_name
        ))
    })?;
    let info = StepFileInfo {
        file_name: file_name.to_string(),
        product_name: product_name(text),
        volume: bounding_box.volume(),
        orientation: StepOrientation::from_dimensions(&bounding_box.dimensions),
        bounding_box,
        point_count: points.len(),
    };
    debug!(
        product = %info.product_name,
        points = info.point_count,
        "parsed STEP bounding box"
    );
    Ok(info)
}
