//! Data structures describing a crate configuration and its geometry

// Declare all submodules
mod config;
mod frame;
mod geometry;

// Re-export all public types from config module
pub use config::{
    BaseConfig, BaseMaterial, BaseType, CapConfig, CrateConfiguration, Dimensions, FastenerConfig,
    FastenerKind, FastenerMaterial, GROSS_WEIGHT_FACTOR, LB_PER_KG, PanelConfig, PanelMaterial,
    StandardsConfig, Ventilation, VentilationPattern, VinylConfig, VinylCoverage, VinylKind,
    Weight, WeightUnit,
};

// Re-export all public types from frame module
pub use frame::{PanelEdge, PanelFrame};

// Re-export all public types from geometry module
pub use geometry::{Block, BlockKind, BoundingBox, Orientation};
