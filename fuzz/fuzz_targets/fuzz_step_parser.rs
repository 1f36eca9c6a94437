#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must either parse or return an error, never panic
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(info) = autocrate::parse_step(text) {
            let bbox = info.bounding_box;
            assert!(bbox.min.x <= bbox.max.x);
            let _ = autocrate::ComponentDescriptor::from_info(&info);
        }
    }
});
