use std::collections::{HashMap, HashSet, VecDeque};

use crate::output::OutputMode;

/// Queue of referenced types awaiting generation, plus the generated set.
///
/// Entries are keyed by `(type full name, mode)`. Enqueueing a pair that is
/// already generated or already queued is a no-op, which bounds the total
/// work by reachable types times enabled modes.
#[derive(Debug, Default)]
pub struct Worklist {
    queue: VecDeque<String>,
    pending: HashMap<String, Vec<OutputMode>>,
    generated: HashSet<(String, OutputMode)>,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `full_name` for every mode in `modes` not yet generated or queued.
    ///
    /// Returns true if at least one new `(type, mode)` pair was queued.
    pub fn enqueue(&mut self, full_name: &str, modes: &[OutputMode]) -> bool {
        let fresh: Vec<OutputMode> = modes
            .iter()
            .copied()
            .filter(|&m| !self.is_generated(full_name, m))
            .filter(|m| {
                self.pending
                    .get(full_name)
                    .map_or(true, |queued| !queued.contains(m))
            })
            .collect();

        if fresh.is_empty() {
            return false;
        }

        match self.pending.get_mut(full_name) {
            Some(queued) => queued.extend(fresh),
            None => {
                self.pending.insert(full_name.to_string(), fresh);
                self.queue.push_back(full_name.to_string());
            }
        }
        true
    }

    /// Dequeue the next type with the modes it is still pending for.
    ///
    /// Modes generated since the entry was queued are dropped; an entry with
    /// no remaining modes is skipped.
    pub fn next(&mut self) -> Option<(String, Vec<OutputMode>)> {
        while let Some(name) = self.queue.pop_front() {
            let modes = self.pending.remove(&name).unwrap_or_default();
            let modes = self.ungenerated(&name, &modes);
            if !modes.is_empty() {
                return Some((name, modes));
            }
            tracing::debug!(type_name = %name, "Queued type already generated");
        }
        None
    }

    pub fn is_generated(&self, full_name: &str, mode: OutputMode) -> bool {
        self.generated.contains(&(full_name.to_string(), mode))
    }

    /// Subset of `modes` not yet generated for `full_name`.
    pub fn ungenerated(&self, full_name: &str, modes: &[OutputMode]) -> Vec<OutputMode> {
        modes
            .iter()
            .copied()
            .filter(|&m| !self.is_generated(full_name, m))
            .collect()
    }

    pub fn mark_generated(&mut self, full_name: &str, mode: OutputMode) {
        self.generated.insert((full_name.to_string(), mode));
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: [OutputMode; 2] = [OutputMode::Namespace, OutputMode::Module];

    #[test]
    fn test_enqueue_is_idempotent() {
        let mut worklist = Worklist::new();
        assert!(worklist.enqueue("Acme.A", &BOTH));
        assert!(!worklist.enqueue("Acme.A", &BOTH));

        let (name, modes) = worklist.next().unwrap();
        assert_eq!(name, "Acme.A");
        assert_eq!(modes, BOTH.to_vec());
        assert!(worklist.next().is_none());
    }

    #[test]
    fn test_generated_types_are_not_queued() {
        let mut worklist = Worklist::new();
        worklist.mark_generated("Acme.A", OutputMode::Namespace);
        assert!(!worklist.enqueue("Acme.A", &[OutputMode::Namespace]));
        assert!(worklist.enqueue("Acme.A", &BOTH));

        let (_, modes) = worklist.next().unwrap();
        assert_eq!(modes, vec![OutputMode::Module]);
    }

    #[test]
    fn test_generated_after_queueing_is_skipped() {
        let mut worklist = Worklist::new();
        worklist.enqueue("Acme.A", &BOTH);
        worklist.enqueue("Acme.B", &BOTH);
        worklist.mark_generated("Acme.A", OutputMode::Namespace);
        worklist.mark_generated("Acme.A", OutputMode::Module);

        let (name, _) = worklist.next().unwrap();
        assert_eq!(name, "Acme.B");
        assert!(worklist.next().is_none());
        assert!(worklist.is_empty());
    }

    #[test]
    fn test_partial_mode_queueing_merges() {
        let mut worklist = Worklist::new();
        worklist.enqueue("Acme.A", &[OutputMode::Namespace]);
        assert!(worklist.enqueue("Acme.A", &BOTH));

        let (_, modes) = worklist.next().unwrap();
        assert_eq!(modes, BOTH.to_vec());
        assert!(worklist.next().is_none());
    }
}
