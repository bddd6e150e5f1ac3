//! Player session
//!
//! One [`GameSession`] per process. It owns the weather machine (which keeps
//! turning between runs), the current run, the freeze-frame snapshot of the
//! last run, and the storage/audio collaborators. Hosts drive it with
//! intents, setters and one `tick(dt)` per frame, and read everything else.

use crate::audio::{AudioManager, AudioSink, SoundCue};
use crate::consts::MAX_DELTA;
use crate::persistence::{Progress, Store};
use crate::settings::{QualityPreset, Settings};
use crate::sim::{
    CampaignModifiers, GameEvent, MissionCatalog, RunPhase, RunSnapshot, RunState, TickInput,
    WeatherKind, WeatherModifiers, WeatherSystem, WeatherVisual, tick,
};

/// A mission's weather rolls in within this many seconds of run start
const MISSION_WEATHER_LEAD: f32 = 3.0;

/// Keeps the weather stream independent of run seeds
const WEATHER_SEED_SALT: u64 = 0xA5A5_5A5A_C3C3_3C3C;

pub struct GameSession {
    seed: u64,
    runs_started: u64,
    run: RunState,
    weather: WeatherSystem,
    snapshot: Option<RunSnapshot>,
    /// Intents collected since the last tick
    pending: TickInput,
    /// Events from the most recent tick
    events: Vec<GameEvent>,
    settings: Settings,
    progress: Progress,
    missions: MissionCatalog,
    selected_mission: Option<usize>,
    store: Option<Box<dyn Store>>,
    audio: AudioManager,
}

impl GameSession {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            runs_started: 0,
            run: RunState::idle(),
            weather: WeatherSystem::new(seed ^ WEATHER_SEED_SALT),
            snapshot: None,
            pending: TickInput::default(),
            events: Vec::new(),
            settings: Settings::default(),
            progress: Progress::default(),
            missions: MissionCatalog::builtin(),
            selected_mission: None,
            store: None,
            audio: AudioManager::new(),
        }
    }

    /// Attach storage and load settings and progress from it
    pub fn with_store(mut self, store: Box<dyn Store>) -> Self {
        self.settings = Settings::load(store.as_ref());
        self.progress = Progress::load(store.as_ref());
        self.apply_audio_settings();
        self.store = Some(store);
        self
    }

    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio.set_sink(sink);
        self.apply_audio_settings();
        self
    }

    pub fn with_missions(mut self, missions: MissionCatalog) -> Self {
        self.missions = missions;
        self.selected_mission = None;
        self
    }

    fn apply_audio_settings(&mut self) {
        self.audio.set_muted(self.settings.muted);
        self.audio.set_master_volume(self.settings.master_volume);
        self.audio.set_sfx_volume(self.settings.sfx_volume);
    }

    // === Run lifecycle ===

    /// Begin a fresh run with the selected mission's overlay (if any)
    pub fn start_run(&mut self) {
        self.runs_started += 1;
        let run_seed = self
            .seed
            .wrapping_add(self.runs_started.wrapping_mul(0x9E37_79B9_7F4A_7C15));

        let mission = self.selected_mission.and_then(|i| self.missions.missions.get(i));
        let campaign = mission
            .map(CampaignModifiers::from_mission)
            .unwrap_or_default();

        if let Some(kind) = campaign.weather_bias {
            if self.weather.current() != kind {
                self.weather.set_bias(Some(kind));
                self.weather.hasten(MISSION_WEATHER_LEAD);
            }
        }

        self.run = RunState::new(run_seed, campaign);
        self.run.max_particles = self.settings.max_particles();
        self.snapshot = None;
        self.pending = TickInput::default();
        self.events.clear();

        log::info!(
            "Run {} started (seed {:#x}, mission {})",
            self.runs_started,
            run_seed,
            mission.map(|m| m.id.as_str()).unwrap_or("none")
        );
        self.audio.play(SoundCue::Start);
    }

    pub fn pause(&mut self) -> bool {
        if self.run.phase != RunPhase::Active {
            return false;
        }
        self.run.phase = RunPhase::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.run.phase != RunPhase::Paused {
            return false;
        }
        self.run.phase = RunPhase::Active;
        true
    }

    /// Back to the menu; every per-run collection is dropped
    pub fn leave_run(&mut self) {
        self.run.clear();
        self.snapshot = None;
        self.pending = TickInput::default();
        self.events.clear();
    }

    // === Intents ===

    /// Flap on the next tick (repeat calls before then are no-ops)
    pub fn request_flap(&mut self) {
        self.pending.flap = true;
    }

    /// Fire on the next tick (repeat calls before then are no-ops)
    pub fn request_fire(&mut self) {
        self.pending.fire = true;
    }

    // === Frame step ===

    /// Advance one frame. Weather always turns; the run only while active.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_DELTA)
        } else {
            0.0
        };
        let input = std::mem::take(&mut self.pending);
        self.events.clear();

        self.weather.update(dt);

        match self.run.phase {
            RunPhase::Active => {
                let modifiers = self.weather.gameplay_modifiers();
                tick(&mut self.run, &modifiers, &input, dt);
                self.events = self.run.drain_events();
                for event in &self.events {
                    if let Some(cue) = cue_for(event) {
                        self.audio.play(cue);
                    }
                }
                if self.run.is_terminated() && self.snapshot.is_none() {
                    self.finish_run();
                }
            }
            RunPhase::Terminated => {
                if let Some(snapshot) = self.snapshot.as_mut() {
                    snapshot.tick_particles(dt);
                }
            }
            RunPhase::Idle | RunPhase::Paused => {}
        }
    }

    /// One-time bookkeeping when a run ends
    fn finish_run(&mut self) {
        let Some(cause) = self.run.termination else {
            return;
        };
        self.snapshot = Some(RunSnapshot::capture(&self.run, cause));

        if self.progress.record_score(self.run.score) {
            log::info!("New best score: {}", self.run.score);
        }

        let stats = self.run.stats();
        if let Some(mission) = self.selected_mission.and_then(|i| self.missions.missions.get(i)) {
            if mission.objective.is_met(&stats)
                && self
                    .progress
                    .campaign
                    .record_completion(&self.missions, &mission.id)
            {
                log::info!("Mission {} cleared", mission.id);
            }
        }

        if let Some(store) = self.store.as_mut() {
            self.progress.save(store.as_mut());
        }
    }

    // === Setters ===

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.audio.set_muted(muted);
        self.audio.play(SoundCue::Toggle);
        self.save_settings();
    }

    /// Returns the new mute state
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.settings.muted;
        self.set_muted(muted);
        muted
    }

    pub fn set_quality(&mut self, quality: QualityPreset) {
        self.settings.quality = quality;
        self.run.max_particles = self.settings.max_particles();
        self.audio.play(SoundCue::Toggle);
        self.save_settings();
    }

    pub fn set_particles(&mut self, enabled: bool) {
        self.settings.particles = enabled;
        self.run.max_particles = self.settings.max_particles();
        self.audio.play(SoundCue::Toggle);
        self.save_settings();
    }

    /// Master volume, clamped to [0, 1]
    pub fn set_master_volume(&mut self, vol: f32) {
        if !vol.is_finite() {
            return;
        }
        self.settings.master_volume = vol.clamp(0.0, 1.0);
        self.apply_audio_settings();
        self.save_settings();
    }

    /// Sound effects volume, clamped to [0, 1]
    pub fn set_sfx_volume(&mut self, vol: f32) {
        if !vol.is_finite() {
            return;
        }
        self.settings.sfx_volume = vol.clamp(0.0, 1.0);
        self.apply_audio_settings();
        self.save_settings();
    }

    /// Prefer `kind` at the next weather transition
    pub fn set_weather_bias(&mut self, kind: Option<WeatherKind>) {
        self.weather.set_bias(kind);
    }

    /// Pick a mission for the next run (`None` = free play).
    /// Unknown or still-locked missions are refused.
    pub fn select_mission(&mut self, id: Option<&str>) -> bool {
        let Some(id) = id else {
            self.selected_mission = None;
            self.audio.play(SoundCue::Select);
            return true;
        };
        let Some(index) = self.missions.index_of(id) else {
            log::warn!("Unknown mission '{}'", id);
            return false;
        };
        if !self.progress.campaign.is_unlocked(index) {
            log::info!("Mission '{}' is locked", id);
            return false;
        }
        self.selected_mission = Some(index);
        self.audio.play(SoundCue::Select);
        log::info!("Mission selected: {}", id);
        true
    }

    pub fn reset_weather(&mut self) {
        self.weather.reset();
    }

    fn save_settings(&mut self) {
        if let Some(store) = self.store.as_mut() {
            self.settings.save(store.as_mut());
        }
    }

    // === Read-only state ===

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn phase(&self) -> RunPhase {
        self.run.phase
    }

    /// Events produced by the most recent tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn snapshot(&self) -> Option<&RunSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn weather(&self) -> &WeatherSystem {
        &self.weather
    }

    pub fn weather_modifiers(&self) -> WeatherModifiers {
        self.weather.gameplay_modifiers()
    }

    /// Weather look with the mission's fog overlay applied
    pub fn weather_visual(&self) -> WeatherVisual {
        let mut visual = self.weather.visual();
        if self.run.phase != RunPhase::Idle {
            if let Some(fog) = self.run.campaign.fog_overlay {
                visual.previous_look.fog_alpha = visual.previous_look.fog_alpha.max(fog);
                visual.current_look.fog_alpha = visual.current_look.fog_alpha.max(fog);
            }
        }
        visual
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn missions(&self) -> &MissionCatalog {
        &self.missions
    }

    pub fn selected_mission(&self) -> Option<&str> {
        self.selected_mission
            .and_then(|i| self.missions.missions.get(i))
            .map(|m| m.id.as_str())
    }

    pub fn store(&self) -> Option<&dyn Store> {
        self.store.as_deref()
    }
}

/// Which cue (if any) an event makes
fn cue_for(event: &GameEvent) -> Option<SoundCue> {
    match event {
        GameEvent::Flapped => Some(SoundCue::Flap),
        GameEvent::Fired => Some(SoundCue::Fire),
        GameEvent::Scored { .. } => Some(SoundCue::Score),
        GameEvent::MeteorDestroyed { .. } => Some(SoundCue::Hit),
        GameEvent::PowerUpActivated { .. } => Some(SoundCue::PowerUp),
        GameEvent::ShieldAbsorbed { .. } => Some(SoundCue::Shield),
        GameEvent::Terminated { .. } => Some(SoundCue::Crash),
        GameEvent::PickupSpawned { .. } | GameEvent::PowerUpExpired { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingSink;
    use crate::consts::{FRAME_DT, GROUND_Y};
    use crate::persistence::testing::BrokenStore;
    use crate::persistence::{MemoryStore, StoredValue, keys};
    use crate::sim::TerminationCause;

    fn count_cue(cues: &[SoundCue], cue: SoundCue) -> usize {
        cues.iter().filter(|c| **c == cue).count()
    }

    /// Tick until the run ends (or `max` ticks), counting termination events
    fn run_ticks(session: &mut GameSession, max: usize) -> usize {
        let mut terminations = 0;
        for _ in 0..max {
            session.tick(FRAME_DT);
            terminations += session
                .events()
                .iter()
                .filter(|e| matches!(e, GameEvent::Terminated { .. }))
                .count();
        }
        terminations
    }

    #[test]
    fn test_idle_run_ends_once_with_one_snapshot() {
        let sink = RecordingSink::default();
        let cues = sink.cues.clone();
        let mut session = GameSession::new(42).with_audio(Box::new(sink));
        session.start_run();

        let terminations = run_ticks(&mut session, 50);

        assert_eq!(terminations, 1);
        assert_eq!(session.phase(), RunPhase::Terminated);
        assert_eq!(session.run().termination, Some(TerminationCause::Ground));
        let snapshot = session.snapshot().expect("snapshot after termination");
        assert_eq!(snapshot.cause, TerminationCause::Ground);
        assert_eq!(snapshot.avatar, session.run().avatar);
        assert_eq!(snapshot.obstacles, session.run().obstacles);
        assert_eq!(count_cue(&cues.borrow(), SoundCue::Crash), 1);
        assert_eq!(count_cue(&cues.borrow(), SoundCue::Start), 1);
    }

    #[test]
    fn test_request_flap_is_idempotent() {
        let mut once = GameSession::new(7);
        let mut twice = GameSession::new(7);
        once.start_run();
        twice.start_run();

        once.request_flap();
        twice.request_flap();
        twice.request_flap();
        once.tick(FRAME_DT);
        twice.tick(FRAME_DT);

        assert_eq!(once.run().avatar.vel_y, twice.run().avatar.vel_y);
        assert_eq!(once.run().avatar.pos, twice.run().avatar.pos);
        let flaps = |s: &GameSession| {
            s.events()
                .iter()
                .filter(|e| matches!(e, GameEvent::Flapped))
                .count()
        };
        assert_eq!(flaps(&once), 1);
        assert_eq!(flaps(&twice), 1);
    }

    #[test]
    fn test_shield_absorbs_ground_hit() {
        let sink = RecordingSink::default();
        let cues = sink.cues.clone();
        let mut session = GameSession::new(42).with_audio(Box::new(sink));
        session.start_run();
        session.run.powerups.shield_charges = 1;

        let terminations = run_ticks(&mut session, 50);

        assert_eq!(terminations, 0);
        assert_eq!(session.phase(), RunPhase::Active);
        assert_eq!(session.run().shield_charges(), 0);
        assert!(session.snapshot().is_none());
        assert_eq!(count_cue(&cues.borrow(), SoundCue::Shield), 1);
        assert!(session.run().avatar.pos.y < GROUND_Y);
    }

    #[test]
    fn test_snapshot_matches_live_state_at_termination() {
        let mut session = GameSession::new(3);
        session.start_run();
        // Stop on the tick that ends the run, before snapshot particles decay
        for _ in 0..50 {
            session.tick(FRAME_DT);
            if session.phase() == RunPhase::Terminated {
                break;
            }
        }
        assert_eq!(session.phase(), RunPhase::Terminated);

        let run = session.run();
        assert!(!run.particles.is_empty());
        let snapshot = session.snapshot().expect("snapshot");
        assert_eq!(snapshot.avatar, run.avatar);
        assert_eq!(snapshot.obstacles, run.obstacles);
        assert_eq!(snapshot.hazards, run.hazards);
        assert_eq!(snapshot.projectiles, run.projectiles);
        assert_eq!(snapshot.pickup, run.pickup);
        assert_eq!(snapshot.particles, run.particles);
        assert_eq!(snapshot.score, run.score);
        assert_eq!(snapshot.shards, run.shards);
    }

    #[test]
    fn test_snapshot_animates_while_run_stays_frozen() {
        let mut session = GameSession::new(3);
        session.start_run();
        run_ticks(&mut session, 50);

        let frozen = session.run().clone();
        let before = session.snapshot().map(|s| s.particles.clone());
        session.tick(FRAME_DT);
        session.tick(FRAME_DT);

        assert_ne!(session.snapshot().map(|s| s.particles.clone()), before);
        assert_eq!(session.run().particles, frozen.particles);
        assert_eq!(session.run().avatar, frozen.avatar);
        assert_eq!(session.run().elapsed, frozen.elapsed);
    }

    #[test]
    fn test_pause_freezes_and_drops_intents() {
        let mut session = GameSession::new(5);
        session.start_run();
        session.tick(FRAME_DT);
        assert!(session.pause());
        let elapsed = session.run().elapsed;

        session.request_flap();
        session.tick(FRAME_DT);
        assert_eq!(session.run().elapsed, elapsed);

        assert!(session.resume());
        session.tick(FRAME_DT);
        assert!(session.run().elapsed > elapsed);
        assert!(!session.events().contains(&GameEvent::Flapped));
    }

    #[test]
    fn test_weather_turns_without_a_run() {
        let mut session = GameSession::new(5);
        let hold = session.weather().hold_remaining();
        session.tick(FRAME_DT);
        assert!(session.weather().hold_remaining() < hold);
        assert_eq!(session.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_leave_run_clears_everything() {
        let mut session = GameSession::new(5);
        session.start_run();
        run_ticks(&mut session, 50);
        session.leave_run();
        assert_eq!(session.phase(), RunPhase::Idle);
        assert!(session.snapshot().is_none());
        assert!(session.run().particles.is_empty());
        assert!(session.run().obstacles.is_empty());
    }

    #[test]
    fn test_best_score_saved_on_termination() {
        let mut session = GameSession::new(42).with_store(Box::new(MemoryStore::new()));
        session.start_run();
        session.run.score = 5;
        run_ticks(&mut session, 50);

        assert_eq!(session.progress().best_score, 5);
        let stored = session
            .store()
            .and_then(|s| s.load(keys::BEST_SCORE).ok().flatten());
        assert_eq!(stored, Some(StoredValue::Int(5)));
    }

    #[test]
    fn test_mute_is_persisted() {
        let mut session = GameSession::new(1).with_store(Box::new(MemoryStore::new()));
        assert!(session.toggle_mute());
        let stored = session
            .store()
            .and_then(|s| s.load(keys::MUTED).ok().flatten());
        assert_eq!(stored, Some(StoredValue::Bool(true)));
        assert!(session.settings().muted);
    }

    #[test]
    fn test_audio_and_particle_settings_survive_a_restart() {
        let mut session = GameSession::new(1).with_store(Box::new(MemoryStore::new()));
        session.set_particles(false);
        session.set_master_volume(0.3);
        session.set_sfx_volume(2.0);
        assert_eq!(session.run().max_particles, 0);

        let stored = session.store().map(Settings::load);
        let expected = Settings {
            particles: false,
            master_volume: 0.3,
            sfx_volume: 1.0,
            ..Settings::default()
        };
        assert_eq!(stored, Some(expected));
    }

    #[test]
    fn test_broken_store_does_not_change_the_game() {
        let mut plain = GameSession::new(42);
        let mut broken = GameSession::new(42).with_store(Box::new(BrokenStore::default()));
        plain.start_run();
        broken.start_run();
        run_ticks(&mut plain, 50);
        run_ticks(&mut broken, 50);
        assert_eq!(plain.run().avatar, broken.run().avatar);
        assert_eq!(plain.run().termination, broken.run().termination);
        broken.set_muted(true);
        assert!(broken.settings().muted);
    }

    #[test]
    fn test_locked_missions_are_refused() {
        let mut session = GameSession::new(1);
        assert!(!session.select_mission(Some("gale_gate")));
        assert!(!session.select_mission(Some("no_such_gate")));
        assert!(session.select_mission(Some("ashen_gate")));
        assert_eq!(session.selected_mission(), Some("ashen_gate"));
        assert!(session.select_mission(None));
        assert_eq!(session.selected_mission(), None);
    }

    #[test]
    fn test_mission_overlay_and_completion() {
        let mut session = GameSession::new(9);
        assert!(session.select_mission(Some("ashen_gate")));
        session.start_run();
        assert_eq!(
            session.run().campaign.weather_bias,
            Some(WeatherKind::EmberStorm)
        );
        assert_eq!(session.weather().bias(), Some(WeatherKind::EmberStorm));

        session.run.kills = 12;
        run_ticks(&mut session, 50);

        let progress = session.progress();
        assert!(progress.campaign.completed.iter().any(|c| c == "ashen_gate"));
        assert!(progress.campaign.is_unlocked(1));
        assert!(session.select_mission(Some("mist_gate")));
    }

    #[test]
    fn test_fog_overlay_reaches_visual() {
        let mut session = GameSession::new(9);
        session.progress.campaign.unlocked = 1;
        assert!(session.select_mission(Some("mist_gate")));
        session.start_run();
        let visual = session.weather_visual();
        assert!(visual.current_look.fog_alpha >= 0.35);
        session.leave_run();
        assert_eq!(session.weather_visual(), session.weather().visual());
    }
}
