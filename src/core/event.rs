use std::collections::BTreeSet;

/// A collision resolved during one tick.
///
/// Participants are identified by [`Particle::id`](crate::core::Particle::id), not by index,
/// so events stay meaningful after the collection is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionEvent {
    /// Particle-to-particle collision between particles `i` and `j`.
    Pair { i: u32, j: u32 },
    /// Particle-to-wall collision for particle `i` and wall `wall_id`.
    Wall { i: u32, wall_id: u32 },
}

impl CollisionEvent {
    /// Whether particle `id` took part in this event.
    #[inline]
    pub fn involves(&self, id: u32) -> bool {
        match *self {
            CollisionEvent::Pair { i, j } => i == id || j == id,
            CollisionEvent::Wall { i, .. } => i == id,
        }
    }
}

/// Everything that happened during one call to `Simulation::step`.
///
/// Events appear in resolution order: all wall hits of the integration pass
/// first, then pair collisions in `(i, j)` index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Tick number this report belongs to (1 for the first step).
    pub tick: u64,
    pub events: Vec<CollisionEvent>,
}

impl StepReport {
    pub fn wall_collisions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, CollisionEvent::Wall { .. }))
            .count()
    }

    pub fn pair_collisions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, CollisionEvent::Pair { .. }))
            .count()
    }

    /// Ids of particles to draw highlighted this frame: those in a pair collision.
    pub fn highlighted(&self) -> BTreeSet<u32> {
        let mut out = BTreeSet::new();
        for ev in &self.events {
            if let CollisionEvent::Pair { i, j } = *ev {
                out.insert(i);
                out.insert(j);
            }
        }
        out
    }

    pub fn is_highlighted(&self, id: u32) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, CollisionEvent::Pair { .. }) && e.involves(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CollisionEvent::{Pair, Wall};

    fn sample() -> StepReport {
        StepReport {
            tick: 3,
            events: vec![
                Wall { i: 4, wall_id: 0 },
                Wall { i: 4, wall_id: 3 },
                Pair { i: 1, j: 2 },
                Pair { i: 2, j: 9 },
            ],
        }
    }

    #[test]
    fn counts_by_kind() {
        let r = sample();
        assert_eq!(r.wall_collisions(), 2);
        assert_eq!(r.pair_collisions(), 2);
    }

    #[test]
    fn only_pair_participants_are_highlighted() {
        let r = sample();
        let ids: Vec<u32> = r.highlighted().into_iter().collect();
        assert_eq!(ids, vec![1, 2, 9]);
        assert!(!r.is_highlighted(4));
        assert!(r.is_highlighted(9));
    }

    #[test]
    fn involves_matches_participants() {
        assert!(Pair { i: 1, j: 2 }.involves(2));
        assert!(!Pair { i: 1, j: 2 }.involves(3));
        assert!(Wall { i: 5, wall_id: 1 }.involves(5));
    }
}
