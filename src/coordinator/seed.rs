//! Initial coordinator contents, applied once at startup

use crate::coordinator::ledger::ReservationLedger;
use crate::coordinator::model::WaitlistEntry;

/// Waitlists to load before the first request
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub waitlists: Vec<(String, Vec<WaitlistEntry>)>,
}

impl Seed {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Three customers already queued for the corner table T002
    pub fn house() -> Self {
        let entry = |customer: &str, prefs: [&str; 2]| {
            WaitlistEntry::new(customer, prefs.iter().map(|p| p.to_string()).collect())
        };
        Self {
            waitlists: vec![(
                "T002".to_string(),
                vec![
                    entry("C101", ["Window", "Quiet"]),
                    entry("C102", ["Corner", "Loud"]),
                    entry("C103", ["Center", "Quiet"]),
                ],
            )],
        }
    }

    /// Enqueue every entry in order
    pub fn apply(&self, ledger: &dyn ReservationLedger) {
        for (table_id, entries) in &self.waitlists {
            for entry in entries {
                ledger.enqueue(table_id, entry.clone());
            }
            tracing::debug!(table_id = %table_id, queued = entries.len(), "Seeded waitlist");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::ledger::MemLedger;

    #[test]
    fn test_house_seed() {
        let ledger = MemLedger::new();
        Seed::house().apply(&ledger);

        let queue = ledger.waitlist("T002");
        let customers: Vec<_> = queue.iter().map(|e| e.customer_id.as_str()).collect();
        assert_eq!(customers, vec!["C101", "C102", "C103"]);
        assert_eq!(queue[0].preferences, vec!["Window", "Quiet"]);
        assert!(ledger.reservations().is_empty());
    }

    #[test]
    fn test_empty_seed() {
        let ledger = MemLedger::new();
        Seed::empty().apply(&ledger);
        assert!(ledger.waitlist("T002").is_empty());
    }
}
