//! Debounce state machine for grid persistence.
//!
//! ```text
//! IDLE    --(mutation)-->            PENDING(armed)
//! PENDING --(mutation before fire)--> PENDING(re-armed, new generation)
//! PENDING --(fire)-->                 IDLE (flush emitted)
//! PENDING --(cancel)-->               IDLE (nothing emitted)
//! any     --(dispose)-->              DISPOSED (nothing ever fires again)
//! ```
//!
//! The bridge owns no timer of its own. Each arm hands out a generation; a
//! timer that fires with anything but the current generation has been
//! superseded and must not flush. Hosts with a frame loop can skip timers
//! entirely and call `poll`.

use std::time::{Duration, Instant};

use surveygrid_engine::{EntityCollection, EntityRecord};

/// Default quiet period before a flush.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Idle,
    Pending { generation: u64, deadline: Instant },
    Disposed,
}

#[derive(Debug)]
pub struct PersistenceBridge {
    debounce: Duration,
    generation: u64,
    phase: BridgePhase,
    flushes: u64,
}

impl Default for PersistenceBridge {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl PersistenceBridge {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            generation: 0,
            phase: BridgePhase::Idle,
            flushes: 0,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, BridgePhase::Pending { .. })
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == BridgePhase::Disposed
    }

    /// Number of flushes emitted so far.
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            BridgePhase::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Record a mutation: arm (or re-arm) the pending flush.
    ///
    /// Returns the generation the caller's timer must present when it
    /// fires, or `None` once disposed.
    pub fn arm(&mut self, now: Instant) -> Option<u64> {
        if self.is_disposed() {
            return None;
        }
        self.generation += 1;
        self.phase = BridgePhase::Pending {
            generation: self.generation,
            deadline: now + self.debounce,
        };
        Some(self.generation)
    }

    /// A timer armed with `generation` fired.
    ///
    /// Returns true (and goes idle) only if that timer is still the current
    /// one; superseded and post-dispose timers get false.
    pub fn fire(&mut self, generation: u64) -> bool {
        match self.phase {
            BridgePhase::Pending { generation: current, .. } if current == generation => {
                self.phase = BridgePhase::Idle;
                self.flushes += 1;
                true
            }
            _ => false,
        }
    }

    /// Tick-driven alternative to timers: flush once the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.phase {
            BridgePhase::Pending {
                generation,
                deadline,
            } if now >= deadline => self.fire(generation),
            _ => false,
        }
    }

    /// Drop the pending flush without emitting it. Returns true if one was
    /// pending. Its timer now carries a stale generation.
    pub fn cancel(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.generation += 1;
        self.phase = BridgePhase::Idle;
        true
    }

    /// Drop any pending flush and refuse to arm again.
    pub fn dispose(&mut self) {
        self.phase = BridgePhase::Disposed;
    }
}

/// The payload sent to the collaborator: non-empty entities, flags stripped.
pub fn flush_payload(collection: &EntityCollection) -> Vec<EntityRecord> {
    collection.non_empty_records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use surveygrid_engine::{FieldSchema, GridOptions};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_arm_and_fire() {
        let mut bridge = PersistenceBridge::default();
        assert_eq!(bridge.phase(), BridgePhase::Idle);

        let start = Instant::now();
        let generation = bridge.arm(start).unwrap();
        assert!(bridge.is_pending());
        assert_eq!(bridge.deadline(), Some(start + DEFAULT_DEBOUNCE));

        assert!(bridge.fire(generation));
        assert_eq!(bridge.phase(), BridgePhase::Idle);
        assert_eq!(bridge.flushes(), 1);
        // Firing twice never flushes twice
        assert!(!bridge.fire(generation));
    }

    #[test]
    fn test_rearm_supersedes_previous_timer() {
        let mut bridge = PersistenceBridge::new(ms(300));
        let start = Instant::now();
        let first = bridge.arm(start).unwrap();
        let second = bridge.arm(start + ms(10)).unwrap();

        assert!(!bridge.fire(first));
        assert!(bridge.is_pending());
        assert!(bridge.fire(second));
        assert_eq!(bridge.flushes(), 1);
    }

    #[test]
    fn test_poll_coalesces_burst() {
        let mut bridge = PersistenceBridge::new(ms(300));
        let start = Instant::now();
        for i in 0..5 {
            bridge.arm(start + ms(i * 10));
        }

        assert!(!bridge.poll(start + ms(300)));
        assert!(bridge.poll(start + ms(340)));
        assert!(!bridge.poll(start + ms(1000)));
        assert_eq!(bridge.flushes(), 1);
    }

    #[test]
    fn test_dispose_guards_stale_timers() {
        let mut bridge = PersistenceBridge::new(ms(300));
        let generation = bridge.arm(Instant::now()).unwrap();
        bridge.dispose();

        assert!(!bridge.fire(generation));
        assert_eq!(bridge.arm(Instant::now()), None);
        assert!(!bridge.poll(Instant::now() + ms(1000)));
        assert_eq!(bridge.flushes(), 0);
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut bridge = PersistenceBridge::new(ms(300));
        assert!(!bridge.cancel());

        let stale = bridge.arm(Instant::now()).unwrap();
        assert!(bridge.cancel());
        assert_eq!(bridge.phase(), BridgePhase::Idle);
        assert!(!bridge.fire(stale));
        assert!(!bridge.poll(Instant::now() + ms(1000)));
        assert_eq!(bridge.flushes(), 0);

        // Still usable afterwards
        let next = bridge.arm(Instant::now()).unwrap();
        assert!(next > stale);
        assert!(bridge.fire(next));
        assert_eq!(bridge.flushes(), 1);

        bridge.dispose();
        assert!(!bridge.cancel());
        assert!(bridge.is_disposed());
    }

    #[test]
    fn test_flush_payload_skips_blank_entities() {
        let schema = FieldSchema::new(["make", "rating"]).unwrap();
        let mut c = EntityCollection::new(schema, GridOptions::default(), Vec::new());
        c.set_field(0, "make", "Eltek").unwrap();
        c.set_field(1, "rating", "  ").unwrap();
        assert_eq!(c.len(), 2);

        let payload = flush_payload(&c);
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].get("make"), Some("Eltek"));
    }
}
