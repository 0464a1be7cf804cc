//! Change detection between consecutive polls.

use crate::resolver::Snapshot;

/// Remembers the last published snapshot of one stream.
#[derive(Debug, Default)]
pub struct ChangeGate {
    last: Option<Snapshot>,
}

impl ChangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `snapshot` and report whether it must be published.
    ///
    /// The first snapshot is always published, even when empty; later ones
    /// only when they differ from the previous one.
    pub fn observe(&mut self, snapshot: Snapshot) -> bool {
        if self.last.as_ref() == Some(&snapshot) {
            return false;
        }
        self.last = Some(snapshot);
        true
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolution;
    use signage_core::{MediaRow, StationSummary};

    fn snapshot(ids: &[i64]) -> Snapshot {
        Resolution {
            station: StationSummary {
                id: 1,
                name: "Lobby".to_string(),
                screen_name: "Lobby Display".to_string(),
                selected_media_count: ids.len(),
            },
            rows: ids
                .iter()
                .map(|id| MediaRow {
                    id: *id,
                    file: format!("ad{}.jpg", id),
                    duration: 5,
                    product_name: "Widget".to_string(),
                    product_code: "W100".to_string(),
                })
                .collect(),
        }
        .snapshot()
    }

    #[test]
    fn test_first_observation_always_publishes() {
        let mut gate = ChangeGate::new();
        assert!(gate.observe(snapshot(&[])));
        assert!(gate.last().unwrap().is_empty());
    }

    #[test]
    fn test_unchanged_snapshot_is_suppressed() {
        let mut gate = ChangeGate::new();
        assert!(gate.observe(snapshot(&[1, 2])));
        assert!(!gate.observe(snapshot(&[1, 2])));
        assert!(!gate.observe(snapshot(&[1, 2])));
    }

    #[test]
    fn test_change_publishes_once() {
        let mut gate = ChangeGate::new();
        gate.observe(snapshot(&[1, 2]));

        assert!(gate.observe(snapshot(&[1, 3])));
        assert!(!gate.observe(snapshot(&[1, 3])));
        assert!(gate.observe(snapshot(&[1, 2])));
    }

    #[test]
    fn test_order_matters() {
        let mut gate = ChangeGate::new();
        gate.observe(snapshot(&[1, 2]));
        assert!(gate.observe(snapshot(&[2, 1])));
    }
}
