//! # autocrate
//!
//! A rule-based design engine for wooden shipping crates.
//!
//! Given product dimensions, weight and construction options, the engine sizes
//! skids, lays out floorboards and plywood sheets, places cleats and lag
//! screws, and emits both an NX parametric expression file and a cut list. A
//! separate STEP reader extracts bounding boxes from hardware models.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Table-driven skid sizing and spacing by gross weight
//! - Plywood sheet tiling with automatic sheet rotation
//! - Perimeter, splice and intermediate cleats with lag screw placement
//! - Deterministic NX expression output
//! - Cut list with CSV export
//! - STEP bounding-box parsing and hardware classification
//! - Directory-wide STEP component catalog (`catalog` feature)
//!
//! ## Example
//!
//! ```
//! use autocrate::{CrateConfiguration, CrateDesign, Dimensions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CrateConfiguration::with_dimensions(Dimensions::new(48.0, 40.0, 36.0), 500.0);
//! let design = CrateDesign::from_configuration(&config)?;
//!
//! assert!(design.assembly.skids.count >= 3);
//! assert!(design.nx.code.starts_with("p0 = 48"));
//! println!("{}", design.cut_list.to_csv());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assembly;
pub mod bom;
#[cfg(feature = "catalog")]
pub mod catalog;
pub mod cleat;
pub mod error;
pub mod floor;
pub mod hardware;
pub mod model;
pub mod parser;
pub mod plywood;
pub mod skid;
pub mod writer;

pub use assembly::{CrateAssembly, CrateDimensions, PanelDesign, Scene};
pub use bom::{CutItem, CutList, LumberGrade};
#[cfg(feature = "catalog")]
pub use catalog::ComponentCatalog;
pub use error::{Error, Result};
pub use model::{
    BaseConfig, BaseMaterial, BaseType, Block, BlockKind, BoundingBox, CapConfig,
    CrateConfiguration, Dimensions, FastenerConfig, FastenerKind, FastenerMaterial, Orientation,
    PanelConfig, PanelEdge, PanelFrame, PanelMaterial, StandardsConfig, Ventilation,
    VentilationPattern, VinylConfig, VinylCoverage, VinylKind, Weight, WeightUnit,
};
pub use parser::{
    ClassificationThresholds, ComponentDescriptor, ComponentKind, StepFileInfo, parse_step,
};
pub use skid::SkidConfiguration;
pub use writer::{FeatureStage, NxExpression, write_nx_expression};

use std::io::Write;
use tracing::{info, instrument};

/// A complete crate design: geometry, NX expressions and cut list
#[derive(Debug, Clone, PartialEq)]
pub struct CrateDesign {
    /// The configuration the design was computed from
    pub configuration: CrateConfiguration,
    /// Assembled geometry
    pub assembly: CrateAssembly,
    /// NX expressions
    pub nx: NxExpression,
    /// Cut list
    pub cut_list: CutList,
}

impl CrateDesign {
    /// Compute a design from a configuration
    ///
    /// The configuration is validated, assembled, and exported. Every call
    /// recomputes from scratch; nothing is cached.
    ///
    /// # Arguments
    ///
    /// * `config` - Crate dimensions, weight and options
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] when a value is non-positive or the
    /// crate is too small to build.
    #[instrument(skip(config), fields(project = %config.project_name))]
    pub fn from_configuration(config: &CrateConfiguration) -> Result<Self> {
        let assembly = CrateAssembly::assemble(config)?;
        let nx = NxExpression::generate(config, &assembly);
        let cut_list = CutList::from_assembly(config, &assembly);
        info!(
            features = nx.features.len(),
            line_items = cut_list.summary.line_items,
            "designed crate"
        );
        Ok(Self {
            configuration: config.clone(),
            assembly,
            nx,
            cut_list,
        })
    }

    /// Compute a design from configuration JSON
    ///
    /// # Example
    ///
    /// ```
    /// use autocrate::CrateDesign;
    ///
    /// let json = r#"{
    ///     "projectName": "Pump skid",
    ///     "dimensions": { "length": 120, "width": 48, "height": 60 },
    ///     "weight": { "product": 2500 }
    /// }"#;
    /// let design = CrateDesign::from_json(json).unwrap();
    /// assert!(design.assembly.skids.requires_rub_strips);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_configuration(&CrateConfiguration::from_json(json)?)
    }

    /// Write the NX expression file
    pub fn write_nx<W: Write>(&self, writer: W) -> Result<()> {
        write_nx_expression(&self.nx, writer)
    }
}
