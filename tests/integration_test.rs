//! End-to-end tests: configuration in, geometry, NX expressions and cut list out

use autocrate::{
    BlockKind, BoundingBox, CrateConfiguration, CrateDesign, Dimensions, Error, FeatureStage,
    PanelFrame, Ventilation, VentilationPattern,
};
use nalgebra::Point3;

fn design(length: f64, width: f64, height: f64, weight: f64) -> CrateDesign {
    let config =
        CrateConfiguration::with_dimensions(Dimensions::new(length, width, height), weight);
    CrateDesign::from_configuration(&config).unwrap()
}

#[test]
fn test_standard_crate() {
    let design = design(48.0, 40.0, 36.0, 500.0);
    let skids = &design.assembly.skids;
    assert_eq!(skids.dimensions.width, 3.5);
    assert_eq!(skids.dimensions.height, 3.5);
    assert_eq!(skids.spacing, 30.0);
    assert!(skids.count >= 3);
    assert!(!skids.requires_rub_strips);

    let code = &design.nx.code;
    assert!(code.contains("p0 = 48"));
    assert!(code.contains("p2 = 36"));
    assert!(code.contains("p20 = 0.75"));
    assert_eq!(design.nx.parameter(2), Some(36.0));
}

#[test]
fn test_generation_is_deterministic() {
    let mut config = CrateConfiguration::with_dimensions(Dimensions::new(130.0, 70.0, 90.0), 8000.0);
    config.vinyl.enabled = true;
    config.standards.ispm15 = true;
    let first = CrateDesign::from_configuration(&config).unwrap();
    let second = CrateDesign::from_configuration(&config).unwrap();
    assert_eq!(first.nx.code.as_bytes(), second.nx.code.as_bytes());
    assert_eq!(first.cut_list.to_csv(), second.cut_list.to_csv());

    let mut written = Vec::new();
    first.write_nx(&mut written).unwrap();
    assert_eq!(written, second.nx.code.into_bytes());
}

#[test]
fn test_feature_order_base_panel_fastener() {
    let mut config = CrateConfiguration::with_dimensions(Dimensions::new(100.0, 60.0, 70.0), 3000.0);
    config.cap.back.ventilation = Some(Ventilation {
        pattern: VentilationPattern::Slots,
        count: 6,
        size: 2.0,
    });
    config.vinyl.enabled = true;
    let nx = CrateDesign::from_configuration(&config).unwrap().nx;

    let base = nx.first_of_stage(FeatureStage::Base).unwrap();
    let floor = nx.first_of_stage(FeatureStage::Floor).unwrap();
    let panel = nx.first_of_stage(FeatureStage::Panel).unwrap();
    let fastener = nx.first_of_stage(FeatureStage::Fastener).unwrap();
    let finish = nx.first_of_stage(FeatureStage::Finish).unwrap();
    assert!(base < floor && floor < panel && panel < fastener && fastener < finish);

    // the text follows the same order
    let code = &nx.code;
    let skid = code.find("BLOCK/SKID_1 =").unwrap();
    let ply = code.find("EXTRUDE/FRONT_PLY_1 =").unwrap();
    let vent = code.find("SLOT/BACK_VENT =").unwrap();
    let lag = code.find("_LAG_").unwrap();
    assert!(skid < ply && ply < vent && vent < lag);
}

#[test]
fn test_long_crate_requires_rub_strips() {
    for weight in [100.0, 5_000.0, 25_000.0, 45_000.0] {
        let design = design(120.0, 48.0, 48.0, weight);
        assert!(design.assembly.skids.requires_rub_strips, "weight {}", weight);
        assert!(!design.cut_list.rub_strips.is_empty());
    }
}

#[test]
fn test_rub_strip_threshold() {
    assert!(!design(96.0, 48.0, 48.0, 500.0).assembly.skids.requires_rub_strips);
    assert!(design(96.01, 48.0, 48.0, 500.0).assembly.skids.requires_rub_strips);
}

#[test]
fn test_heavy_crate_skids() {
    let design = design(140.0, 90.0, 80.0, 30_000.0);
    let skids = &design.assembly.skids;
    // gross 36000 lb
    assert_eq!(skids.nominal, "6x6");
    assert_eq!(skids.spacing, 20.0);
    assert!(skids.count >= 6);
    let blocks: Vec<_> = design.assembly.scene.of_kind(BlockKind::Skid).collect();
    assert_eq!(blocks.len(), skids.count);
    for pair in blocks.windows(2) {
        assert!(pair[0].max().x <= pair[1].min().x + 1e-9, "skids overlap");
    }
}

#[test]
fn test_scene_fits_envelope() {
    let design = design(110.0, 75.0, 85.0, 4_000.0);
    let bbox = design.assembly.scene.bounding_box().unwrap();
    let head = autocrate::hardware::LAG_HEAD_HEIGHT;
    assert!(bbox.min.z.abs() < 1e-9);
    assert!((bbox.max.z - 85.0).abs() < 1e-9);
    assert!(bbox.min.x >= -37.5 - head - 1e-9 && bbox.max.x <= 37.5 + head + 1e-9);
    assert!(bbox.min.y >= -110.0 - head - 1e-9 && bbox.max.y <= head + 1e-9);

    // everything except lag heads stays inside the crate envelope
    let envelope = BoundingBox {
        min: Point3::new(-37.5, -110.0, 0.0),
        max: Point3::new(37.5, 0.0, 85.0),
    };
    for block in &design.assembly.scene.blocks {
        if block.kind == BlockKind::LagHead {
            continue;
        }
        assert!(envelope.contains(&block.bounding_box(), 1e-9), "{}", block.name);
    }
}

#[test]
fn test_large_panels_get_splice_and_support_cleats() {
    let design = design(150.0, 110.0, 100.0, 6_000.0);
    let front = design.assembly.panel(PanelFrame::Front).unwrap();
    assert!(front.plywood.sheet_count > 1);
    assert!(front.cleats.vertical_supports().count() > 0);
    assert!(design.assembly.lag_screw_count() > 0);
    assert_eq!(
        design.nx.parameter(31),
        Some(design.assembly.lag_screw_count() as f64)
    );
}

#[test]
fn test_cut_list_agrees_with_scene() {
    let design = design(100.0, 60.0, 70.0, 1_500.0);
    let list = &design.cut_list;
    let scene = &design.assembly.scene;

    let skids: usize = list.skids.iter().map(|i| i.quantity).sum();
    assert_eq!(skids, scene.of_kind(BlockKind::Skid).count());

    let boards: usize = list.floorboards.iter().map(|i| i.quantity).sum();
    assert_eq!(boards, scene.of_kind(BlockKind::Floorboard).count());

    let plywood: usize = list
        .panels
        .iter()
        .flat_map(|p| &p.plywood)
        .map(|i| i.quantity)
        .sum();
    assert_eq!(plywood, scene.of_kind(BlockKind::Plywood).count());

    assert_eq!(list.summary.lag_screws, scene.of_kind(BlockKind::LagShaft).count());
    assert_eq!(list, &autocrate::CutList::from_design(&design));
}

#[test]
fn test_floor_fits_between_cleats() {
    let design = design(90.0, 50.0, 60.0, 800.0);
    let floor = &design.assembly.floor;
    let interior = design.assembly.dimensions.internal;
    assert!(floor.coverage() <= interior.length + 1e-9);
    assert!((floor.board_length - interior.width).abs() < 1e-9);
}

#[test]
fn test_json_configuration() {
    let json = r#"{
        "projectName": "Export crate",
        "dimensions": { "length": 72, "width": 48, "height": 60 },
        "weight": { "product": 900, "unit": "kg" },
        "standards": { "ispm15": true }
    }"#;
    let design = CrateDesign::from_json(json).unwrap();
    assert!(design.nx.code.contains("// STANDARD: ISPM-15"));
    assert!(design.nx.code.contains("// PROJECT: Export crate"));
    // 900 kg is just under 2000 lb
    assert_eq!(design.cut_list.grade, autocrate::LumberGrade::No2);
}

#[test]
fn test_invalid_configurations() {
    let err = CrateDesign::from_json(r#"{"dimensions": {"length": -1, "width": 40, "height": 40}, "weight": {"product": 10}}"#)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
    assert!(err.to_string().starts_with("[E3001]"));

    let err = CrateDesign::from_json(r#"{"dimensions": {"length": 48}}"#).unwrap_err();
    assert!(matches!(err, Error::Json(_)));

    // walls would be shorter than two cleat widths
    let config = CrateConfiguration::with_dimensions(Dimensions::new(48.0, 40.0, 10.0), 500.0);
    assert!(matches!(
        CrateDesign::from_configuration(&config),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_oversized_configurations_are_rejected() {
    for dims in [
        Dimensions::new(48.0, 1e300, 36.0),
        Dimensions::new(1e300, 40.0, 36.0),
        Dimensions::new(48.0, 40.0, 1e12),
    ] {
        let config = CrateConfiguration::with_dimensions(dims, 500.0);
        let err = CrateDesign::from_configuration(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)), "{:?}", dims);
    }

    let mut config = CrateConfiguration::with_dimensions(Dimensions::new(48.0, 40.0, 36.0), 500.0);
    config.fasteners.spacing = 1e-300;
    assert!(matches!(
        CrateDesign::from_configuration(&config),
        Err(Error::InvalidConfiguration(_))
    ));
}
