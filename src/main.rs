//! Claw Machine headless runner
//!
//! Plays one level on autoplay and logs everything the simulation reports.
//!
//! Usage: `claw-machine [level] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use claw_machine::consts::FRAME_MS;
    use claw_machine::sim::{EventSink, ParticleRequest, SoundEffect, target_score, time_limit_secs};
    use claw_machine::{Simulation, Tuning};

    const CANVAS_WIDTH: f32 = 800.0;
    const CANVAS_HEIGHT: f32 = 600.0;

    /// Logs every event and keeps the running score
    #[derive(Default)]
    struct LogSink {
        score: i64,
        stolen: i64,
        cleared: bool,
    }

    impl EventSink for LogSink {
        fn on_score_delta(&mut self, points: i64) {
            self.score += points;
            log::info!("+{} (score {})", points, self.score);
        }

        fn on_level_complete(&mut self) {
            self.cleared = true;
            log::info!("Field cleared");
        }

        fn on_item_stolen(&mut self, original_value: i32) {
            self.stolen += original_value as i64;
            log::info!("A rat stole a diamond worth {}", original_value);
        }

        fn on_particle_request(&mut self, request: ParticleRequest) {
            log::trace!("Particles {:?} x{} at {}", request.kind, request.count, request.pos);
        }

        fn on_sound_request(&mut self, sound: SoundEffect) {
            log::debug!("Sound: {}", sound.name());
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Claw Machine (native) starting...");

        let mut args = std::env::args().skip(1);
        let level = match args.next().map(|arg| arg.parse::<i64>()) {
            Some(Ok(level)) => level,
            Some(Err(e)) => {
                log::warn!("Invalid level argument ({}), starting at level 1", e);
                1
            }
            None => 1,
        };
        let tuning = match args.next() {
            Some(path) => Tuning::load(Path::new(&path)),
            None => Tuning::default(),
        };

        let mut sim = Simulation::from_entropy(tuning, CANVAS_WIDTH, CANVAS_HEIGHT, LogSink::default());
        sim.configure_level(level);
        sim.set_autoplay(true);
        sim.start();

        let level = sim.level();
        let frames = (time_limit_secs(level) as f32 * 1000.0 / FRAME_MS).ceil() as u32;
        for _ in 0..frames {
            sim.tick(FRAME_MS);
            if sim.sink().cleared {
                break;
            }
        }
        sim.end();

        let sink = sim.sink();
        let target = target_score(level);
        log::info!(
            "Level {} finished: score {} / {} ({}), {} lost to rats",
            level,
            sink.score,
            target,
            if sink.score.max(0) as u64 >= target { "passed" } else { "failed" },
            sink.stolen
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page, nothing to run here
}
