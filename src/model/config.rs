//! Crate configuration types
//!
//! These are the inputs to every design stage. They deserialize from the
//! camelCase JSON produced by configuration front-ends and are validated once
//! with [`CrateConfiguration::validate`] before any geometry is computed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.20462;

/// Gross weight estimate as a multiple of product weight (crate materials add ~20%)
pub const GROSS_WEIGHT_FACTOR: f64 = 1.2;

/// Largest accepted crate dimension or material thickness in inches (100 ft)
pub const MAX_DIMENSION: f64 = 1200.0;

/// Smallest accepted panel fastener spacing in inches
pub const MIN_FASTENER_SPACING: f64 = 0.5;

/// Overall crate dimensions in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Front-to-back extent (world -Y)
    pub length: f64,
    /// Left-to-right extent (world X)
    pub width: f64,
    /// Floor-to-top extent (world Z)
    pub height: f64,
}

impl Dimensions {
    /// Create new dimensions
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(48.0, 40.0, 40.0)
    }
}

/// Unit a weight is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Pounds
    #[default]
    Lb,
    /// Kilograms
    Kg,
}

impl WeightUnit {
    /// Convert a value in this unit to pounds
    pub fn to_lb(self, value: f64) -> f64 {
        match self {
            WeightUnit::Lb => value,
            WeightUnit::Kg => value * LB_PER_KG,
        }
    }
}

/// Product and gross weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
    /// Weight of the packed product
    pub product: f64,
    /// Rated maximum gross weight, if known
    #[serde(default)]
    pub max_gross: Option<f64>,
    /// Unit of both weights
    #[serde(default)]
    pub unit: WeightUnit,
}

impl Weight {
    /// Product weight in pounds
    pub fn new_lb(product: f64) -> Self {
        Self {
            product,
            max_gross: None,
            unit: WeightUnit::Lb,
        }
    }

    /// Product weight converted to pounds
    pub fn product_lb(&self) -> f64 {
        self.unit.to_lb(self.product)
    }

    /// Gross weight in pounds
    ///
    /// Uses the rated maximum when given, otherwise estimates it from the
    /// product weight with [`GROSS_WEIGHT_FACTOR`].
    pub fn gross_lb(&self) -> f64 {
        match self.max_gross {
            Some(gross) => self.unit.to_lb(gross),
            None => self.product_lb() * GROSS_WEIGHT_FACTOR,
        }
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::new_lb(500.0)
    }
}

/// Construction class of the base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    /// Domestic shipping base
    #[default]
    Standard,
    /// Heavy equipment base
    HeavyDuty,
    /// Export base (ISPM-15 treated lumber)
    Export,
}

impl BaseType {
    /// Name used in NX variables and the cut list
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Standard => "standard",
            BaseType::HeavyDuty => "heavy_duty",
            BaseType::Export => "export",
        }
    }
}

/// Lumber species used for skids and floorboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseMaterial {
    /// Southern yellow pine
    #[default]
    Pine,
    /// Oak
    Oak,
    /// Plywood deck
    Plywood,
}

impl BaseMaterial {
    /// Name used in NX variables and the cut list
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseMaterial::Pine => "pine",
            BaseMaterial::Oak => "oak",
            BaseMaterial::Plywood => "plywood",
        }
    }
}

/// Base (skids and floor) options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseConfig {
    /// Construction class
    pub base_type: BaseType,
    /// Floorboard thickness in inches
    pub floorboard_thickness: f64,
    /// Lumber species
    pub material: BaseMaterial,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            base_type: BaseType::Standard,
            floorboard_thickness: 1.5,
            material: BaseMaterial::Pine,
        }
    }
}

/// Sheet material of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelMaterial {
    /// Exterior grade plywood
    #[default]
    Plywood,
    /// Oriented strand board
    Osb,
    /// Hardboard
    Hardboard,
}

impl PanelMaterial {
    /// Name used in the cut list
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelMaterial::Plywood => "plywood",
            PanelMaterial::Osb => "osb",
            PanelMaterial::Hardboard => "hardboard",
        }
    }
}

/// Shape of ventilation openings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VentilationPattern {
    /// Round holes of diameter `size`
    Holes,
    /// Slots of length `size`
    Slots,
}

impl VentilationPattern {
    /// NX feature keyword for the opening
    pub fn feature(&self) -> &'static str {
        match self {
            VentilationPattern::Holes => "HOLE",
            VentilationPattern::Slots => "SLOT",
        }
    }
}

/// Ventilation openings cut through a panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ventilation {
    /// Opening shape
    pub pattern: VentilationPattern,
    /// Number of openings
    pub count: u32,
    /// Hole diameter or slot length in inches
    pub size: f64,
}

/// Options for a single panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelConfig {
    /// Sheet thickness in inches
    pub thickness: f64,
    /// Sheet material
    pub material: PanelMaterial,
    /// Whether the panel carries reinforcement beyond the standard cleating
    pub reinforcement: bool,
    /// Optional ventilation openings
    pub ventilation: Option<Ventilation>,
}

impl PanelConfig {
    /// Plain plywood panel of the given thickness
    pub fn plywood(thickness: f64) -> Self {
        Self {
            thickness,
            ..Self::default()
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            thickness: 0.75,
            material: PanelMaterial::Plywood,
            reinforcement: false,
            ventilation: None,
        }
    }
}

/// Options for the five panels (the "cap")
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CapConfig {
    /// Top panel
    pub top: PanelConfig,
    /// Front panel (y = 0)
    pub front: PanelConfig,
    /// Back panel
    pub back: PanelConfig,
    /// Left panel (-X)
    pub left: PanelConfig,
    /// Right panel (+X)
    pub right: PanelConfig,
}

/// Panel fastener style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastenerKind {
    /// Klimp spring clips
    #[default]
    Klimp,
    /// Nails
    Nails,
    /// Wood screws
    Screws,
}

impl FastenerKind {
    /// Name used in NX variables and the cut list
    pub fn as_str(&self) -> &'static str {
        match self {
            FastenerKind::Klimp => "klimp",
            FastenerKind::Nails => "nails",
            FastenerKind::Screws => "screws",
        }
    }
}

/// Fastener material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FastenerMaterial {
    /// Plain steel
    #[default]
    Steel,
    /// Stainless steel
    Stainless,
    /// Hot-dip galvanized steel
    Galvanized,
}

impl FastenerMaterial {
    /// Name used in NX variables and the cut list
    pub fn as_str(&self) -> &'static str {
        match self {
            FastenerMaterial::Steel => "steel",
            FastenerMaterial::Stainless => "stainless",
            FastenerMaterial::Galvanized => "galvanized",
        }
    }
}

/// Panel fastener options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FastenerConfig {
    /// Fastener style
    #[serde(rename = "type")]
    pub kind: FastenerKind,
    /// Trade size (e.g. "8d")
    pub size: String,
    /// Spacing along panel edges in inches
    pub spacing: f64,
    /// Material
    pub material: FastenerMaterial,
}

impl Default for FastenerConfig {
    fn default() -> Self {
        Self {
            kind: FastenerKind::Klimp,
            size: "8d".to_string(),
            spacing: 6.0,
            material: FastenerMaterial::Steel,
        }
    }
}

/// Vinyl barrier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VinylKind {
    /// Waterproof liner
    #[default]
    Waterproof,
    /// Vapor barrier
    VaporBarrier,
    /// Anti-static film
    AntiStatic,
}

impl VinylKind {
    /// Name used in NX output
    pub fn as_str(&self) -> &'static str {
        match self {
            VinylKind::Waterproof => "waterproof",
            VinylKind::VaporBarrier => "vapor_barrier",
            VinylKind::AntiStatic => "anti_static",
        }
    }
}

/// How much of the crate the vinyl covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VinylCoverage {
    /// All six faces
    #[default]
    Full,
    /// Top and walls only
    Partial,
}

impl VinylCoverage {
    /// Name used in NX output
    pub fn as_str(&self) -> &'static str {
        match self {
            VinylCoverage::Full => "full",
            VinylCoverage::Partial => "partial",
        }
    }
}

/// Vinyl wrap options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VinylConfig {
    /// Whether the crate is wrapped
    pub enabled: bool,
    /// Barrier type
    #[serde(rename = "type")]
    pub kind: VinylKind,
    /// Film thickness in inches
    pub thickness: f64,
    /// Coverage
    pub coverage: VinylCoverage,
}

impl Default for VinylConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: VinylKind::Waterproof,
            thickness: 0.006,
            coverage: VinylCoverage::Full,
        }
    }
}

/// Manufacturing standards the design is declared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandardsConfig {
    /// Applied Materials crating standard
    pub amat: bool,
    /// ISPM-15 wood packaging treatment
    pub ispm15: bool,
    /// ASME drawing standard
    pub asme: bool,
}

impl StandardsConfig {
    /// Names of the enabled standards, in a fixed order
    pub fn applied(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.amat {
            names.push("AMAT-0251-70054");
        }
        if self.ispm15 {
            names.push("ISPM-15");
        }
        if self.asme {
            names.push("ASME Y14.5-2009");
        }
        names
    }
}

impl Default for StandardsConfig {
    fn default() -> Self {
        Self {
            amat: true,
            ispm15: false,
            asme: true,
        }
    }
}

/// Complete description of a crate to design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrateConfiguration {
    /// Project name carried into exports
    #[serde(default = "default_project_name")]
    pub project_name: String,
    /// Overall crate dimensions
    pub dimensions: Dimensions,
    /// Product weight
    pub weight: Weight,
    /// Skid and floor options
    #[serde(default)]
    pub base: BaseConfig,
    /// Panel options
    #[serde(default)]
    pub cap: CapConfig,
    /// Panel fastener options
    #[serde(default)]
    pub fasteners: FastenerConfig,
    /// Vinyl wrap options
    #[serde(default)]
    pub vinyl: VinylConfig,
    /// Applied standards
    #[serde(default)]
    pub standards: StandardsConfig,
}

fn default_project_name() -> String {
    "New Crate".to_string()
}

impl Default for CrateConfiguration {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            dimensions: Dimensions::default(),
            weight: Weight::default(),
            base: BaseConfig::default(),
            cap: CapConfig::default(),
            fasteners: FastenerConfig::default(),
            vinyl: VinylConfig::default(),
            standards: StandardsConfig::default(),
        }
    }
}

impl CrateConfiguration {
    /// Default configuration with the given dimensions and product weight in pounds
    pub fn with_dimensions(dimensions: Dimensions, product_weight_lb: f64) -> Self {
        Self {
            dimensions,
            weight: Weight::new_lb(product_weight_lb),
            ..Self::default()
        }
    }

    /// Parse and validate a configuration from JSON
    ///
    /// # Example
    ///
    /// ```
    /// use autocrate::CrateConfiguration;
    ///
    /// let json = r#"{
    ///     "dimensions": { "length": 48, "width": 40, "height": 36 },
    ///     "weight": { "product": 500 }
    /// }"#;
    /// let config = CrateConfiguration::from_json(json).unwrap();
    /// assert_eq!(config.dimensions.length, 48.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values no crate can be built from
    ///
    /// Every length, thickness and weight must be finite and strictly positive.
    /// Panel sizes derived from these values are checked later by the
    /// assembler, which knows the skid height.
    pub fn validate(&self) -> Result<()> {
        let dims = &self.dimensions;
        bounded("dimensions.length", dims.length)?;
        bounded("dimensions.width", dims.width)?;
        bounded("dimensions.height", dims.height)?;

        positive("weight.product", self.weight.product)?;
        if let Some(gross) = self.weight.max_gross {
            positive("weight.maxGross", gross)?;
            if gross < self.weight.product {
                return Err(Error::InvalidConfiguration(format!(
                    "weight.maxGross ({}) is less than weight.product ({})",
                    gross, self.weight.product
                )));
            }
        }

        bounded("base.floorboardThickness", self.base.floorboard_thickness)?;

        for (name, panel) in [
            ("cap.top", &self.cap.top),
            ("cap.front", &self.cap.front),
            ("cap.back", &self.cap.back),
            ("cap.left", &self.cap.left),
            ("cap.right", &self.cap.right),
        ] {
            bounded(&format!("{}.thickness", name), panel.thickness)?;
            if let Some(vent) = &panel.ventilation {
                bounded(&format!("{}.ventilation.size", name), vent.size)?;
            }
        }

        positive("fasteners.spacing", self.fasteners.spacing)?;
        if self.fasteners.spacing < MIN_FASTENER_SPACING {
            return Err(Error::InvalidConfiguration(format!(
                "'fasteners.spacing' must be at least {}, got {}",
                MIN_FASTENER_SPACING, self.fasteners.spacing
            )));
        }
        if self.vinyl.enabled {
            positive("vinyl.thickness", self.vinyl.thickness)?;
        }

        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_dimension(field, value))
    }
}

fn bounded(field: &str, value: f64) -> Result<()> {
    positive(field, value)?;
    if value > MAX_DIMENSION {
        return Err(Error::InvalidConfiguration(format!(
            "'{}' must not exceed {} inches, got {}",
            field, MAX_DIMENSION, value
        )));
    }
    Ok(())
}
