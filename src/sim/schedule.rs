//! Deadline scheduler for delayed run transitions
//!
//! Callbacks are keyed by an absolute run-clock deadline and checked once per
//! tick. `cancel_all` bumps a generation counter; anything scheduled under an
//! older generation is dropped when it falls due instead of firing.

#[derive(Debug, Clone)]
struct Scheduled<T> {
    deadline_ms: f64,
    generation: u64,
    action: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    generation: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, deadline_ms: f64, action: T) {
        self.pending.push(Scheduled {
            deadline_ms,
            generation: self.generation,
            action,
        });
    }

    /// Invalidate everything scheduled so far
    pub fn cancel_all(&mut self) {
        self.generation += 1;
    }

    /// Number of callbacks that will still fire
    #[cfg(test)]
    fn live_count(&self) -> usize {
        self.pending
            .iter()
            .filter(|s| s.generation == self.generation)
            .count()
    }

    /// Earliest live deadline
    #[cfg(test)]
    fn next_deadline(&self) -> Option<f64> {
        self.pending
            .iter()
            .filter(|s| s.generation == self.generation)
            .map(|s| s.deadline_ms)
            .min_by(f64::total_cmp)
    }

    /// Remove and return the actions due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|s| s.deadline_ms <= now_ms);
        self.pending = pending;

        due.sort_by(|a, b| a.deadline_ms.total_cmp(&b.deadline_ms));
        let generation = self.generation;
        due.into_iter()
            .filter(|s| {
                let live = s.generation == generation;
                if !live {
                    log::debug!("Dropped stale timer due at {:.0} ms", s.deadline_ms);
                }
                live
            })
            .map(|s| s.action)
            .collect()
    }
}
