//! The shared world model.
//!
//! [`WorldState`] aggregates the squadron, the threats, the two global
//! histories, the pause flag, and the mission status line. It carries no
//! scheduling logic of its own: the motion and detection engines and the
//! command path mutate it, always through a [`SimulationHandle`] that
//! serializes access behind one lock.
//!
//! # Invariants
//!
//! - The pulse history and event log never exceed their capacity and
//!   evict oldest-first (see [`BoundedLog`]).
//! - Each jet's signal history is bounded by `signal_capacity`.
//! - `locked_enemy` is only cleared by [`WorldState::reset`].
//! - Fuel stays in `[0, 100]`; headings stay in `[0, 360)`.
//!
//! [`SimulationHandle`]: crate::handle::SimulationHandle

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use trinetra_types::{
    DetectionEvent, Jet, JetId, JetStatus, Position, SignalRecord, SignalReport, Threat, ThreatId,
    WorldSnapshot,
};

use crate::config::{HistoryConfig, WorldConfig};
use crate::history::{BoundedLog, push_back_bounded};

/// Fuel of a freshly reset jet, and the upper clamp.
pub const FUEL_MAX: f64 = 100.0;

/// Mission status shown before the operator has issued any command.
pub const STATUS_AWAITING: &str = "AWAITING COMMANDS";

/// Mission status after a pause.
pub const STATUS_PAUSED: &str = "SIMULATION PAUSED";

/// Mission status after a resume.
pub const STATUS_RESUMED: &str = "SIMULATION RESUMED";

/// Mission status after a reset.
pub const STATUS_RESET: &str = "SIMULATION RESET";

/// First entry of the event log.
pub const INITIAL_EVENT: &str = "System Initialized. Awaiting operator input.";

/// Number of ticks each engine has applied since startup.
///
/// Paused ticks are counted separately because they still publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickCounters {
    /// Motion ticks that mutated the world.
    pub motion: u64,
    /// Detection ticks that mutated the world.
    pub detection: u64,
    /// Ticks of either engine skipped because the world was paused.
    pub paused: u64,
    /// Ticks of either engine that failed and were discarded.
    pub failed: u64,
}

/// The single shared world.
#[derive(Debug)]
pub struct WorldState {
    pub(crate) jets: Vec<Jet>,
    pub(crate) threats: Vec<Threat>,
    pub(crate) events: BoundedLog<String>,
    pub(crate) pulse_history: BoundedLog<DetectionEvent>,
    pub(crate) is_paused: bool,
    pub(crate) mission_status: String,
    pub(crate) signal_capacity: usize,
    pub(crate) counters: TickCounters,
    layout: WorldConfig,
    rng: StdRng,
}

impl WorldState {
    /// Build the initial world with randomized positions and headings.
    ///
    /// The RNG is kept for later resets so a seeded world stays
    /// reproducible across them.
    pub fn new(layout: &WorldConfig, history: &HistoryConfig, mut rng: StdRng) -> Self {
        let jets = spawn_jets(layout, layout.spawn_jitter, &mut rng);
        let threats = spawn_threats(layout, 0.0, &mut rng);

        let mut events = BoundedLog::new(history.event_capacity);
        events.push_front(INITIAL_EVENT.to_owned());

        Self {
            jets,
            threats,
            events,
            pulse_history: BoundedLog::new(history.pulse_capacity),
            is_paused: false,
            mission_status: STATUS_AWAITING.to_owned(),
            signal_capacity: history.signal_capacity,
            counters: TickCounters::default(),
            layout: layout.clone(),
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// All jets in creation order.
    pub fn jets(&self) -> &[Jet] {
        &self.jets
    }

    /// All threats in creation order.
    pub fn threats(&self) -> &[Threat] {
        &self.threats
    }

    /// Look up a jet by id.
    pub fn jet(&self, id: JetId) -> Option<&Jet> {
        self.jets.iter().find(|jet| jet.id == id)
    }

    /// Look up a threat by id.
    pub fn threat(&self, id: ThreatId) -> Option<&Threat> {
        self.threats.iter().find(|threat| threat.id == id)
    }

    /// Event log, newest first.
    pub const fn events(&self) -> &BoundedLog<String> {
        &self.events
    }

    /// Pulse history, oldest first.
    pub const fn pulse_history(&self) -> &BoundedLog<DetectionEvent> {
        &self.pulse_history
    }

    /// Whether the engines are frozen.
    pub const fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Operator-facing mission status line.
    pub fn mission_status(&self) -> &str {
        &self.mission_status
    }

    /// Maximum signal records retained per jet.
    pub const fn signal_capacity(&self) -> usize {
        self.signal_capacity
    }

    /// Tick counters since startup.
    pub const fn counters(&self) -> TickCounters {
        self.counters
    }

    /// Capture the full world as a serializable snapshot.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            is_paused: self.is_paused,
            mission_status: self.mission_status.clone(),
            events: self.events.to_vec(),
            squadron: self.jets.clone(),
            threats: self.threats.clone(),
            pulse_history: self.pulse_history.to_vec(),
        }
    }

    /// Every jet's signal records, tagged with the jet id and ordered by
    /// timestamp descending. Records with equal timestamps keep squadron
    /// order.
    pub fn signal_intelligence(&self) -> Vec<SignalReport> {
        let mut reports: Vec<SignalReport> = self
            .jets
            .iter()
            .flat_map(|jet| {
                jet.signal_history
                    .iter()
                    .map(move |record| SignalReport::from_record(jet.id, record))
            })
            .collect();
        reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        reports
    }

    // -----------------------------------------------------------------------
    // Mutation helpers
    // -----------------------------------------------------------------------

    /// Set the pause flag and the matching mission status.
    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
        let status = if paused { STATUS_PAUSED } else { STATUS_RESUMED };
        status.clone_into(&mut self.mission_status);
    }

    /// Flip the pause flag. Returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        let paused = !self.is_paused;
        self.set_paused(paused);
        paused
    }

    /// Set a threat's scanning flag. Returns `false` if the id is unknown.
    pub fn set_scanning(&mut self, id: ThreatId, scanning: bool) -> bool {
        self.threats
            .iter_mut()
            .find(|threat| threat.id == id)
            .map(|threat| threat.is_scanning = scanning)
            .is_some()
    }

    /// Prepend an entry to the event log, evicting the oldest at capacity.
    pub fn log_event(&mut self, message: String) {
        self.events.push_front(message);
    }

    /// Append a detection pulse, evicting the oldest at capacity.
    pub fn record_pulse(&mut self, event: DetectionEvent) {
        self.pulse_history.push_back(event);
    }

    /// Reposition a jet. Returns `false` if the id is unknown or the
    /// position is not finite.
    pub fn place_jet(&mut self, id: JetId, position: Position) -> bool {
        if !position.is_finite() {
            return false;
        }
        self.jets
            .iter_mut()
            .find(|jet| jet.id == id)
            .map(|jet| jet.position = position)
            .is_some()
    }

    /// Reposition a threat. Returns `false` if the id is unknown or the
    /// position is not finite.
    pub fn place_threat(&mut self, id: ThreatId, position: Position) -> bool {
        if !position.is_finite() {
            return false;
        }
        self.threats
            .iter_mut()
            .find(|threat| threat.id == id)
            .map(|threat| {
                threat.x = position.x;
                threat.y = position.y;
            })
            .is_some()
    }

    /// Return every agent to a near-default layout.
    ///
    /// Jets get fresh positions and headings, full fuel, `PATROL` status,
    /// and lose their lock and signal history. Threats get fresh
    /// positions and headings and stop scanning. The pulse history and
    /// event log are retained; a reset entry is prepended to the log.
    /// The pause flag is left as it was.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        let jitter = self.layout.reset_jitter;
        let origin = self.layout.jet_origin;
        for jet in &mut self.jets {
            jet.position = jittered(origin, jitter, &mut self.rng);
            jet.angle = random_heading(&mut self.rng);
            jet.fuel = FUEL_MAX;
            jet.status = JetStatus::Patrol;
            jet.signal_history.clear();
            jet.locked_enemy = None;
        }
        for (threat, spawn) in self.threats.iter_mut().zip(&self.layout.threats) {
            let position = jittered(spawn.position, jitter, &mut self.rng);
            threat.x = position.x;
            threat.y = position.y;
            threat.angle = random_heading(&mut self.rng);
            threat.is_scanning = false;
        }
        STATUS_RESET.clone_into(&mut self.mission_status);
        self.log_event(format!("[{}] Simulation reset.", clock_label(now)));
    }

    /// Append a signal record to a jet under the per-jet bound.
    pub(crate) fn push_signal(jet: &mut Jet, capacity: usize, record: SignalRecord) {
        push_back_bounded(&mut jet.signal_history, capacity, record);
    }
}

/// `HH:MM:SS` label used in event log lines.
pub fn clock_label(now: DateTime<Utc>) -> String {
    now.format("%H:%M:%S").to_string()
}

fn random_heading(rng: &mut StdRng) -> f64 {
    rng.random_range(0.0..360.0)
}

fn jittered(origin: Position, jitter: f64, rng: &mut StdRng) -> Position {
    if jitter <= 0.0 {
        return origin;
    }
    Position::new(
        origin.x + rng.random_range(-jitter..=jitter),
        origin.y + rng.random_range(-jitter..=jitter),
    )
}

fn spawn_jets(layout: &WorldConfig, jitter: f64, rng: &mut StdRng) -> Vec<Jet> {
    (1..=layout.jet_count)
        .map(|n| Jet {
            id: JetId::new(n),
            name: n.to_string(),
            status: JetStatus::Patrol,
            position: jittered(layout.jet_origin, jitter, rng),
            angle: random_heading(rng),
            speed: layout.jet_speed,
            fuel: FUEL_MAX,
            weapons: layout.jet_weapons,
            signal_history: VecDeque::new(),
            locked_enemy: None,
        })
        .collect()
}

fn spawn_threats(layout: &WorldConfig, jitter: f64, rng: &mut StdRng) -> Vec<Threat> {
    (1_u32..)
        .zip(&layout.threats)
        .map(|(n, spawn)| {
            let position = jittered(spawn.position, jitter, rng);
            Threat {
                id: ThreatId::new(n),
                x: position.x,
                y: position.y,
                is_scanning: false,
                angle: random_heading(rng),
                speed: spawn.speed,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use trinetra_types::RangeBand;

    use super::*;

    fn make_world() -> WorldState {
        WorldState::new(
            &WorldConfig::default(),
            &HistoryConfig::default(),
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn initial_world_matches_reference_layout() {
        let world = make_world();
        assert_eq!(world.jets().len(), 5);
        assert_eq!(world.threats().len(), 2);
        assert_eq!(world.mission_status(), STATUS_AWAITING);
        assert_eq!(world.events().to_vec(), vec![INITIAL_EVENT.to_owned()]);
        assert!(world.pulse_history().is_empty());
        assert!(!world.is_paused());

        for (n, jet) in (1_u32..).zip(world.jets()) {
            assert_eq!(jet.id, JetId::new(n));
            assert_eq!(jet.name, n.to_string());
            assert_eq!(jet.fuel, FUEL_MAX);
            assert_eq!(jet.weapons, 4);
            assert!((jet.position.x - 22.30).abs() <= 0.1 + 1e-12);
            assert!((jet.position.y - 84.80).abs() <= 0.1 + 1e-12);
            assert!((0.0..360.0).contains(&jet.angle));
            assert!(jet.locked_enemy.is_none());
        }

        let first = world.threat(ThreatId::new(1)).unwrap();
        assert_eq!(first.position(), Position::new(22.25, 84.85));
        assert_eq!(first.speed, 0.0005);
    }

    #[test]
    fn same_seed_gives_same_world() {
        let a = make_world().snapshot();
        let b = make_world().snapshot();
        assert_eq!(a, b);
    }

    #[test]
    fn toggle_pause_updates_status() {
        let mut world = make_world();
        assert!(world.toggle_pause());
        assert!(world.is_paused());
        assert_eq!(world.mission_status(), STATUS_PAUSED);
        assert!(!world.toggle_pause());
        assert_eq!(world.mission_status(), STATUS_RESUMED);
    }

    #[test]
    fn set_scanning_rejects_unknown_threat() {
        let mut world = make_world();
        assert!(world.set_scanning(ThreatId::new(2), true));
        assert!(world.threat(ThreatId::new(2)).unwrap().is_scanning);
        assert!(!world.set_scanning(ThreatId::new(99), true));
    }

    #[test]
    fn place_rejects_non_finite_positions() {
        let mut world = make_world();
        assert!(!world.place_jet(JetId::new(1), Position::new(f64::NAN, 0.0)));
        assert!(world.place_jet(JetId::new(1), Position::new(1.0, 2.0)));
        assert_eq!(world.jet(JetId::new(1)).unwrap().position, Position::new(1.0, 2.0));
        assert!(!world.place_threat(ThreatId::new(9), Position::new(0.0, 0.0)));
    }

    #[test]
    fn reset_clears_jet_state_and_keeps_histories() {
        let mut world = make_world();
        let now = Utc::now();
        for jet in &mut world.jets {
            jet.fuel = 12.5;
            jet.status = JetStatus::Locked;
            jet.locked_enemy = Some(ThreatId::new(1));
            WorldState::push_signal(
                jet,
                10,
                SignalRecord {
                    timestamp: now,
                    frequency_ghz: 9.0,
                    strength_db: -40.0,
                    angle_deg: 0.0,
                    range: RangeBand::Far,
                },
            );
        }
        world.set_scanning(ThreatId::new(1), true);
        world.record_pulse(DetectionEvent {
            from_threat: ThreatId::new(1),
            to_jet: JetId::new(1),
            strength: 40.0,
            timestamp: now,
            angle_deg: 0.0,
            range: RangeBand::Far,
            enemy_pos: Position::new(0.0, 0.0),
        });
        let events_before = world.events().len();

        world.reset(now);

        for jet in world.jets() {
            assert!(jet.locked_enemy.is_none());
            assert_eq!(jet.fuel, FUEL_MAX);
            assert_eq!(jet.status, JetStatus::Patrol);
            assert!(jet.signal_history.is_empty());
            assert!((jet.position.x - 22.30).abs() <= 0.05 + 1e-12);
        }
        assert!(world.threats().iter().all(|t| !t.is_scanning));
        assert_eq!(world.pulse_history().len(), 1);
        assert_eq!(world.events().len(), events_before + 1);
        assert!(world.events().front().unwrap().ends_with("Simulation reset."));
        assert_eq!(world.mission_status(), STATUS_RESET);
    }

    #[test]
    fn signal_intelligence_is_sorted_newest_first() {
        let mut world = make_world();
        let base = Utc::now();
        let record = |secs: i64| SignalRecord {
            timestamp: base + chrono::Duration::seconds(secs),
            frequency_ghz: 10.0,
            strength_db: -35.0,
            angle_deg: 45.0,
            range: RangeBand::Far,
        };
        let capacity = world.signal_capacity();
        let mut jets = world.jets.iter_mut();
        let first = jets.next().unwrap();
        WorldState::push_signal(first, capacity, record(1));
        WorldState::push_signal(first, capacity, record(5));
        let second = jets.next().unwrap();
        WorldState::push_signal(second, capacity, record(3));

        let reports = world.signal_intelligence();
        let order: Vec<(u32, i64)> = reports
            .iter()
            .map(|r| (r.jet_id.into_inner(), (r.timestamp - base).num_seconds()))
            .collect();
        assert_eq!(order, vec![(1, 5), (2, 3), (1, 1)]);
    }

    #[test]
    fn signal_history_is_bounded() {
        let mut world = make_world();
        let now = Utc::now();
        let jet = world.jets.first_mut().unwrap();
        for i in 0..5 {
            WorldState::push_signal(
                jet,
                3,
                SignalRecord {
                    timestamp: now,
                    frequency_ghz: f64::from(i),
                    strength_db: -31.0,
                    angle_deg: 0.0,
                    range: RangeBand::Far,
                },
            );
        }
        let freqs: Vec<f64> = jet.signal_history.iter().map(|r| r.frequency_ghz).collect();
        assert_eq!(freqs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn clock_label_is_hh_mm_ss() {
        let ts = DateTime::parse_from_rfc3339("2026-10-18T07:05:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(clock_label(ts), "07:05:09");
    }
}
