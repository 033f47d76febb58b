#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rigstream_core::{GroupKind, LandmarkGroup, LandmarkPoint, Metrics, PoseFrame};
use rigstream_wire::{decode_frame, encode_frame};

#[derive(Arbitrary, Debug)]
struct FuzzFrame {
    pose: Option<Vec<[f32; 3]>>,
    left_hand: Option<Vec<[f32; 3]>>,
    right_hand: Option<Vec<[f32; 3]>>,
    metrics: Option<(Option<f32>, Option<f32>, Option<f32>)>,
}

fn group(points: Option<Vec<[f32; 3]>>) -> Option<LandmarkGroup> {
    points.map(|p| p.into_iter().map(LandmarkPoint::from).collect())
}

fuzz_target!(|input: FuzzFrame| {
    let mut frame = PoseFrame::new();
    frame.set_group(GroupKind::Pose, group(input.pose));
    frame.set_group(GroupKind::LeftHand, group(input.left_hand));
    frame.set_group(GroupKind::RightHand, group(input.right_hand));
    frame.metrics = input.metrics.map(|(inference_ms, fps, intensity)| Metrics {
        inference_ms,
        fps,
        intensity,
    });

    // Non-finite or oversized frames are refused by the encoder
    if let Ok(bytes) = encode_frame(&frame) {
        let decoded = decode_frame(&bytes).expect("encoded frame must decode");
        assert_eq!(decoded, frame);
    }
});
