//! Plain-text report printed after a run.

use std::fmt::{self, Write as _};

use spore_colony_core::Event;
use spore_colony_world::{query, Colony};

/// Running counts of the events a run produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct EventTally {
    pub(crate) births: usize,
    pub(crate) deaths: usize,
    pub(crate) rejected: usize,
}

impl EventTally {
    /// Counts `events` and empties the buffer for the next tick.
    pub(crate) fn drain(&mut self, events: &mut Vec<Event>) {
        for event in events.drain(..) {
            match event {
                Event::SporeBorn { .. } => self.births += 1,
                Event::SporeDied { .. } => self.deaths += 1,
                Event::BuildingRejected { .. } | Event::BuildingRelocationRejected { .. } => {
                    self.rejected += 1;
                }
                _ => {}
            }
        }
    }
}

/// Outcome of a run, captured from the colony once ticking stops.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RunSummary {
    text: String,
}

impl RunSummary {
    pub(crate) fn capture(colony: &Colony, tally: &EventTally) -> Self {
        let mut text = String::new();
        let _ = writeln!(text, "tick: {}", query::tick(colony));
        let _ = writeln!(text, "population: {}", query::population(colony));
        if query::is_extinct(colony) {
            let _ = writeln!(text, "status: died out");
        }

        let categories = query::category_counts(colony)
            .into_iter()
            .map(|(category, count)| format!("{}={count}", category.label()))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(text, "categories: {categories}");

        let storage = query::colony_storage(colony);
        for (kind, stock) in storage.iter() {
            let _ = writeln!(
                text,
                "{kind}: {:.1}/{:.1}",
                stock.amount(),
                stock.capacity()
            );
        }

        let _ = writeln!(text, "births: {} deaths: {}", tally.births, tally.deaths);

        let buildings = query::buildings(colony);
        let _ = writeln!(text, "buildings: {}", buildings.len());
        for building in buildings {
            let _ = writeln!(
                text,
                "  {} kind {} level {} at {}",
                building.id,
                building.kind,
                building.level,
                building.region.origin()
            );
        }
        Self { text }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spore_colony_core::{CellCoord, ColonyConfig, DeathCause, SporeId};

    #[test]
    fn fresh_colony_summary_lists_every_section() {
        let colony = Colony::new(ColonyConfig::default()).expect("default colony");
        let summary = RunSummary::capture(&colony, &EventTally::default()).to_string();

        assert!(summary.starts_with("tick: 0\npopulation: 10\n"));
        assert!(summary.contains("categories: A=5 B=5\n"));
        assert!(summary.contains("food: 200.0/2000.0\n"));
        assert!(summary.contains("wood: 60.0/500.0\n"));
        assert!(summary.contains("buildings: 0\n"));
        assert!(!summary.contains("died out"));
    }

    #[test]
    fn tally_counts_and_clears_each_batch() {
        let mut tally = EventTally::default();
        let mut events = vec![
            Event::SporeDied {
                spore: SporeId::new(1),
                cell: CellCoord::new(0, 0),
                cause: DeathCause::Removed,
            },
            Event::TickCompleted {
                tick: 1,
                population: 9,
            },
        ];
        tally.drain(&mut events);
        assert!(events.is_empty());

        events.push(Event::SporeDied {
            spore: SporeId::new(2),
            cell: CellCoord::new(1, 0),
            cause: DeathCause::Removed,
        });
        tally.drain(&mut events);

        assert_eq!(
            tally,
            EventTally {
                births: 0,
                deaths: 2,
                rejected: 0,
            }
        );
    }
}
