#![no_main]

use libfuzzer_sys::fuzz_target;
use rigstream_wire::decode_frame;

fuzz_target!(|data: &[u8]| {
    // Never panics; anything accepted is fully finite
    if let Ok(frame) = decode_frame(data) {
        for (_, group) in frame.present_groups() {
            assert!(group.iter().all(|p| p.is_finite()));
        }
    }
});
