//! Headless demo run.
//!
//! Drives the sample universe for a few simulated seconds with a null
//! renderer and a synthesized audio spectrum, printing what the engine
//! does along the way.
//!
//! Run with: `cargo run --release`

use astrarium::prelude::*;

fn main() {
    let mut engine = Engine::new(EngineConfig::sample()).expect("sample config is valid");
    engine.set_fixed_delta(Some(1.0 / 60.0));
    let mut renderer = NullRenderer::new();
    let pointer = PointerSnapshot::default();

    println!("=== Astrarium headless demo ===");
    println!("Structures: whirl (spiral), smudge (irregular), haven (system)");
    println!();

    let mut spectrum = vec![0.0f32; 128];
    for tick in 0..600u32 {
        // A slow bass swell so the smoothed parameters have something to chase.
        let phase = tick as f32 / 60.0;
        for (i, v) in spectrum.iter_mut().enumerate() {
            let band = 1.0 - i as f32 / 128.0;
            *v = (phase.sin().abs() * 220.0 * band).max(0.0);
        }

        // Scripted interaction: dive into the system, then a body, then back.
        match tick {
            120 => drain(engine.select_structure(Some("haven")).unwrap()),
            300 => drain(engine.select_body("haven", "haven/body-2").unwrap()),
            480 => drain(engine.select_structure(None).unwrap()),
            _ => {}
        }

        for notice in engine.tick(&pointer, Some(&spectrum), &mut renderer) {
            match notice {
                EngineNotice::TransitionStarted { to, .. } => {
                    println!("[{:>4}] transition started -> {:?}", tick, to);
                }
                EngineNotice::TransitionCompleted { view, .. } => {
                    println!("[{:>4}] transition complete: {:?}", tick, view);
                }
                _ => {}
            }
        }
    }

    let params = engine.render_params();
    println!();
    println!("Frames submitted: {}", renderer.frames());
    println!(
        "Smoothed audio: bass {:.2}  mid {:.2}  high {:.2}  overall {:.2}",
        params.bass, params.mid, params.high, params.overall
    );
    println!("Final view: {:?}", engine.view());

    engine.shutdown();
}

fn drain(notices: Vec<EngineNotice>) {
    for notice in notices {
        if let EngineNotice::SelectionChanged { selection } = notice {
            println!(
                "       selection: structure={:?} body={:?}",
                selection.structure(),
                selection.body()
            );
        }
    }
}
