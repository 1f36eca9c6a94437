#![no_main]

use libfuzzer_sys::fuzz_target;
use libfuzzer_sys::arbitrary::{Arbitrary, Result, Unstructured};

#[derive(Debug)]
struct FuzzCrate {
    length: f64,
    width: f64,
    height: f64,
    weight: f64,
    spacing: f64,
}

impl<'a> Arbitrary<'a> for FuzzCrate {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        // Keep sizes in a range where the layout loops stay small
        let mut dim = |max: u32| -> Result<f64> { Ok(u.int_in_range(1..=max * 4)? as f64 / 4.0) };
        Ok(Self {
            length: dim(400)?,
            width: dim(200)?,
            height: dim(200)?,
            weight: dim(80_000)?,
            spacing: dim(48)?,
        })
    }
}

fuzz_target!(|input: FuzzCrate| {
    // Validated configurations must design without panicking
    let mut config = autocrate::CrateConfiguration::with_dimensions(
        autocrate::Dimensions::new(input.length, input.width, input.height),
        input.weight,
    );
    config.fasteners.spacing = input.spacing;
    if let Ok(design) = autocrate::CrateDesign::from_configuration(&config) {
        assert!(design.assembly.skids.count >= 3);
        assert!(design.nx.code.starts_with("p0 = "));
        let _ = serde_json::to_string(&design.cut_list);
    }
});
