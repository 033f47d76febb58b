//! Headless rig example
//!
//! Starts the engine on loopback, streams a waving arm from a local
//! transmitter and drives an in-memory rig at 60 Hz.

use std::time::{Duration, Instant};

use rigstream_core::{GroupKind, LandmarkGroup, LandmarkPoint, Metrics, PoseFrame, RigConfig};
use rigstream_motion::JointRig;
use rigstream_runtime::{init_tracing, RigEngine, TelemetryConfig};
use rigstream_transport::PoseTransmitter;

/// Right wrist landmark in the pose group
const RIGHT_WRIST: usize = 16;

fn waving_pose(t: f32) -> PoseFrame {
    let pose: LandmarkGroup = (0..GroupKind::Pose.nominal_len())
        .map(|i| {
            if i == RIGHT_WRIST {
                LandmarkPoint::new(0.3 + 0.1 * (t * 4.0).sin(), 0.25, -0.1)
            } else {
                LandmarkPoint::new(0.5, 0.2 + i as f32 * 0.02, 0.0)
            }
        })
        .collect();

    PoseFrame::new()
        .with_group(GroupKind::Pose, pose)
        .with_metrics(Metrics {
            inference_ms: Some(11.0),
            fps: Some(30.0),
            intensity: None,
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&TelemetryConfig::default())?;

    println!("=== Rigstream Headless Rig ===\n");

    let mut engine = RigEngine::start(RigConfig::loopback()).await?;
    let addr = engine.local_addr().ok_or("receiver not bound")?;
    println!("1. Receiver listening on {}", addr);

    // 2. Producer at ~30 Hz
    let producer = tokio::spawn(async move {
        let tx = PoseTransmitter::connect(addr).await?;
        let started = Instant::now();
        let mut interval = tokio::time::interval(Duration::from_millis(33));
        for _ in 0..60 {
            interval.tick().await;
            tx.send_frame(&waving_pose(started.elapsed().as_secs_f32()))
                .await?;
        }
        Ok::<_, rigstream_core::RigError>(())
    });
    println!("2. Producer streaming 60 frames");

    // 3. Render loop at 60 Hz
    let mut rig = JointRig::from_config(engine.config());
    let mut interval = tokio::time::interval(Duration::from_millis(16));
    let mut last = Instant::now();
    for frame in 0..120 {
        interval.tick().await;
        let now = Instant::now();
        let dt = (now - last).as_secs_f32();
        last = now;

        let tick = engine.tick(dt, &mut rig);
        if frame % 20 == 0 {
            let wrist = rig.get(GroupKind::Pose, RIGHT_WRIST).unwrap_or_default();
            println!(
                "   tick {:3}: fresh={} stale_ticks={} wrist=({:+.3}, {:+.3}, {:+.3})",
                frame, tick.fresh, tick.ticks_since_frame, wrist.x, wrist.y, wrist.z
            );
        }
    }

    producer.await??;

    // 4. Shut down
    let stats = engine.stop().await?;
    println!("\n3. Receiver stats: {:?}", stats);
    println!("4. Engine stats: {:?}", engine.stats());

    Ok(())
}
