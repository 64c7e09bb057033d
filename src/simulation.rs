//! Session facade
//!
//! [`Simulation`] owns the game state, the tuning and the event sink. Hosts drive
//! it with `tick`, forward player input through `fire_hook`, and observe it only
//! through the sink.

use crate::sim::events::{EventSink, GameEvent, SoundEffect};
use crate::sim::hook::fire;
use crate::sim::schedule::Deferred;
use crate::sim::spawner::SpawnReport;
use crate::sim::state::{GameState, SessionPhase};
use crate::sim::tick::{TickInput, configure_level, tick};
use crate::tuning::Tuning;

/// A claw-machine session
pub struct Simulation<S: EventSink = Vec<GameEvent>> {
    state: GameState,
    tuning: Tuning,
    sink: S,
    input: TickInput,
}

impl<S: EventSink> Simulation<S> {
    /// New idle session at level 1
    pub fn new(tuning: Tuning, seed: u64, width: f32, height: f32, sink: S) -> Self {
        let mut state = GameState::new(seed, width, height, &tuning);
        configure_level(&mut state, 1, &tuning);
        log::info!("Simulation initialized with seed: {}", seed);
        Self {
            state,
            tuning,
            sink,
            input: TickInput::default(),
        }
    }

    /// New idle session with a random seed
    pub fn from_entropy(tuning: Tuning, width: f32, height: f32, sink: S) -> Self {
        Self::new(tuning, rand::random::<u64>(), width, height, sink)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    /// Demo mode: the hook fires on its own whenever it points at an item
    pub fn set_autoplay(&mut self, enabled: bool) {
        if self.input.autoplay != enabled {
            log::info!("Autoplay: {}", enabled);
        }
        self.input.autoplay = enabled;
    }

    /// Idle -> Running
    pub fn start(&mut self) -> bool {
        if self.state.phase != SessionPhase::Idle {
            return false;
        }
        self.state.phase = SessionPhase::Running;
        log::info!("Level {} started", self.state.level);
        true
    }

    /// Running -> Paused. Pending deferred effects are dropped.
    pub fn pause(&mut self) -> bool {
        if self.state.phase != SessionPhase::Running {
            return false;
        }
        self.state.phase = SessionPhase::Paused;
        self.state.scheduler.cancel_all();
        log::info!("Paused");
        true
    }

    /// Paused -> Running. A cleared level queues its advance again.
    pub fn resume(&mut self) -> bool {
        if self.state.phase != SessionPhase::Paused {
            return false;
        }
        self.state.phase = SessionPhase::Running;
        if self.state.level_cleared
            && let Some(delay) = self.tuning.level_advance_delay_ms
        {
            self.state.scheduler.schedule(delay, Deferred::AdvanceLevel);
        }
        log::info!("Resumed");
        true
    }

    /// Back to an idle level 1 on the same canvas
    pub fn reset(&mut self) {
        self.state.phase = SessionPhase::Idle;
        configure_level(&mut self.state, 1, &self.tuning);
        self.flush();
        log::info!("Simulation reset");
    }

    /// Finish the run (time out or explicit stop)
    pub fn end(&mut self) {
        if self.state.phase == SessionPhase::Ended {
            return;
        }
        self.state.phase = SessionPhase::Ended;
        self.state.scheduler.cancel_all();
        self.state.emit(GameEvent::Sound(SoundEffect::GameOver));
        self.flush();
        log::info!("Run ended at level {}", self.state.level);
    }

    /// Player input. Ignored unless the hook is swinging in a running session.
    pub fn fire_hook(&mut self) -> bool {
        let fired = fire(&mut self.state, &self.tuning);
        self.flush();
        fired
    }

    /// Advance by one animation frame of `delta_ms` milliseconds
    pub fn tick(&mut self, delta_ms: f32) {
        tick(&mut self.state, &self.input, delta_ms, &self.tuning);
        self.flush();
    }

    /// Set up a new level; out-of-range numbers are clamped
    pub fn configure_level(&mut self, level: i64) -> SpawnReport {
        let report = configure_level(&mut self.state, level, &self.tuning);
        self.flush();
        report
    }

    /// Recompute miner, hook pivot and reach for a new canvas size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.apply_layout(width, height, &self.tuning);
        log::debug!("Resized to {}x{}", self.state.area.width, self.state.area.height);
    }

    /// Hand queued events to the sink in emission order
    fn flush(&mut self) {
        for event in self.state.events.drain(..) {
            self.sink.dispatch(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::sim::difficulty::time_limit_secs;
    use crate::sim::state::{HookPhase, Item, ItemId, ItemKind, ItemSize};
    use glam::Vec2;

    fn session(seed: u64) -> Simulation {
        Simulation::new(Tuning::default(), seed, 800.0, 600.0, Vec::new())
    }

    /// Replace the field with a single item centered on `center`
    fn only_item<S: EventSink>(sim: &mut Simulation<S>, kind: ItemKind, size: ItemSize, center: Vec2) -> ItemId {
        sim.state.items.clear();
        let id = sim.state.next_entity_id();
        let mut item = Item::new(id, kind, size, Vec2::ZERO);
        item.set_center(center);
        sim.state.items.insert(item);
        id
    }

    fn score(events: &[GameEvent]) -> i64 {
        events
            .iter()
            .map(|e| match e {
                GameEvent::ScoreDelta(points) => *points,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_new_session_is_idle_with_a_field() {
        let mut sim = session(1);
        assert_eq!(sim.phase(), SessionPhase::Idle);
        assert_eq!(sim.level(), 1);
        assert!(!sim.state().items.is_empty());

        sim.tick(FRAME_MS);
        assert_eq!(sim.state().time_ticks, 0);
        assert!(!sim.fire_hook());
        assert!(sim.sink().is_empty());
    }

    #[test]
    fn test_session_transitions() {
        let mut sim = session(2);
        assert!(!sim.resume());
        assert!(sim.start());
        assert!(!sim.start());
        assert!(sim.pause());
        assert!(!sim.pause());
        assert!(sim.resume());
        assert_eq!(sim.phase(), SessionPhase::Running);

        sim.end();
        assert_eq!(sim.phase(), SessionPhase::Ended);
        assert_eq!(sim.sink().last(), Some(&GameEvent::Sound(SoundEffect::GameOver)));
        assert!(!sim.start());

        sim.reset();
        assert_eq!(sim.phase(), SessionPhase::Idle);
        assert_eq!(sim.level(), 1);
    }

    #[test]
    fn test_fire_reaches_sink() {
        let mut sim = session(3);
        sim.start();
        assert!(sim.fire_hook());
        assert_eq!(sim.sink(), &vec![GameEvent::Sound(SoundEffect::Shoot)]);
        assert_eq!(sim.state().hook.phase, HookPhase::Extending);
        assert!(!sim.fire_hook());
    }

    #[test]
    fn test_pause_drops_deferred_effects() {
        let mut sim = session(4);
        sim.start();
        sim.state.scheduler.schedule(50.0, Deferred::PlaySound(SoundEffect::Gold));
        sim.pause();
        sim.resume();
        for _ in 0..10 {
            sim.tick(FRAME_MS);
        }
        assert!(!sim.sink().contains(&GameEvent::Sound(SoundEffect::Gold)));
    }

    #[test]
    fn test_configure_level_clamps_input() {
        let mut sim = session(5);
        sim.configure_level(0);
        assert_eq!(sim.level(), 1);
        let report = sim.configure_level(7);
        assert_eq!(sim.level(), 7);
        assert_eq!(report.placed, sim.state().items.len());
    }

    #[test]
    fn test_resize_moves_pivot_and_clamps() {
        let mut sim = session(6);
        sim.resize(1200.0, 900.0);
        assert_eq!(sim.state().hook.pivot.x, 600.0);

        sim.resize(f32::NAN, -10.0);
        assert_eq!(sim.state().area.width, crate::consts::MIN_CANVAS_DIM);
        assert_eq!(sim.state().area.height, crate::consts::MIN_CANVAS_DIM);
        assert!(sim.state().hook.max_angle.is_finite());
        assert!(sim.state().hook.max_length.is_finite());
    }

    #[test]
    fn test_autoplay_level_scores() {
        let mut sim = session(7);
        sim.set_autoplay(true);
        sim.start();
        let ticks = time_limit_secs(1) as f32 * 1000.0 / FRAME_MS;
        for _ in 0..ticks as u32 {
            sim.tick(FRAME_MS);
        }
        assert!(score(sim.sink()) > 0);
        assert!(sim.sink().iter().all(|e| !matches!(e, GameEvent::ScoreDelta(p) if *p < 0)));
    }

    #[test]
    fn test_custom_sink_receives_callbacks() {
        #[derive(Default)]
        struct Sounds(Vec<&'static str>);

        impl EventSink for Sounds {
            fn on_sound_request(&mut self, sound: SoundEffect) {
                self.0.push(sound.name());
            }
        }

        let mut sim = Simulation::new(Tuning::default(), 8, 800.0, 600.0, Sounds::default());
        sim.start();
        sim.fire_hook();
        sim.end();
        assert_eq!(sim.into_sink().0, vec!["shoot", "gameOver"]);
    }

    #[test]
    fn test_auto_advance_survives_pause() {
        let tuning = Tuning {
            level_advance_delay_ms: Some(500.0),
            ..Tuning::default()
        };
        let mut sim = Simulation::new(tuning, 9, 800.0, 600.0, Vec::new());
        only_item(&mut sim, ItemKind::Bone, ItemSize::Small, Vec2::new(400.0, 250.0));
        sim.start();
        assert!(sim.fire_hook());

        for _ in 0..300 {
            sim.tick(FRAME_MS);
            if sim.sink().contains(&GameEvent::LevelComplete) {
                break;
            }
        }
        assert!(sim.state().level_cleared);

        assert!(sim.pause());
        assert!(sim.resume());
        for _ in 0..100 {
            sim.tick(FRAME_MS);
        }
        assert_eq!(sim.level(), 2);
        assert!(!sim.state().items.is_empty());
    }

    #[test]
    fn test_rat_steals_diamond_during_play() {
        #[derive(Default)]
        struct Thefts(Vec<i32>);

        impl EventSink for Thefts {
            fn on_item_stolen(&mut self, original_value: i32) {
                self.0.push(original_value);
            }
        }

        let mut sim = Simulation::new(Tuning::default(), 10, 800.0, 600.0, Thefts::default());
        sim.configure_level(5);
        let diamond = only_item(&mut sim, ItemKind::Diamond, ItemSize::Medium, Vec2::new(80.0, 380.0));
        sim.start();

        for _ in 0..20_000 {
            sim.tick(FRAME_MS);
            if !sim.sink().0.is_empty() {
                break;
            }
        }

        assert!(sim.state().level_elapsed_secs() >= 30.0);
        assert_eq!(sim.sink().0, vec![600]);
        assert!(!sim.state().items.contains(diamond));

        let rat = sim.state().rats.iter().next().unwrap();
        assert_eq!(rat.carrying_diamond_id(), Some(diamond));
        assert_eq!(sim.state().items.get(rat.item_id).unwrap().value, 6000);
    }
}
