#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resource economy: colony stocks, per-spore food flow and happiness.

use std::collections::VecDeque;

use spore_colony_core::{ColonyConfig, HappinessConfig, ResourceKind, Storage};
use spore_colony_random::{BatchNormal, RandomError, Stream};
use tracing::debug;

/// Progress value at which the colony is ready to expand.
pub const PROGRESS_SATURATION: f64 = 100.0;

/// Errors raised while settling the economy.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EconomyError {
    /// A random stream rejected a request.
    #[error(transparent)]
    Random(#[from] RandomError),
}

/// Outcome of one economy pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EconomyReport {
    /// Spores that took part in the pass.
    pub population: usize,
    /// Food accepted into colony storage.
    pub food_gathered: f64,
    /// Food consumed by spores.
    pub food_consumed: f64,
    /// Spores whose need exceeded what their store and the colony could supply.
    pub unfed: usize,
    /// Amount of every non-food resource accepted into colony storage.
    pub income: Vec<(ResourceKind, f64)>,
}

#[derive(Debug)]
struct Income {
    kind: ResourceKind,
    draws: BatchNormal,
}

/// Colony storage together with the streams driving income and consumption.
#[derive(Debug)]
pub struct ResourceEconomy {
    colony: Storage,
    interval: u64,
    food_collection: BatchNormal,
    consumption: BatchNormal,
    incomes: Vec<Income>,
}

impl ResourceEconomy {
    /// Creates the economy with every configured stock at its initial amount.
    pub fn new(config: &ColonyConfig) -> Result<Self, EconomyError> {
        let seed = config.world.seed;
        let batch = config.movement.random_batch_size;
        let resources = &config.resources;

        let mut colony = Storage::new();
        for settings in &resources.stocks {
            colony.track(settings.kind, settings.initial, settings.capacity);
        }

        let (food_speed, food_std) = resources
            .settings(ResourceKind::Food)
            .map_or((0.0, 0.0), |food| (food.income_speed, food.income_std()));
        let food_collection =
            BatchNormal::normal(seed, Stream::FoodCollection, food_speed, food_std, batch)?;
        let consumption = BatchNormal::normal(
            seed,
            Stream::Consumption,
            resources.food_consumption,
            resources.consumption_std(),
            batch,
        )?;

        let mut incomes = Vec::new();
        for settings in resources
            .stocks
            .iter()
            .filter(|settings| settings.kind != ResourceKind::Food)
        {
            incomes.push(Income {
                kind: settings.kind,
                draws: BatchNormal::normal(
                    seed,
                    Stream::Income(settings.kind),
                    settings.income_speed,
                    settings.income_std(),
                    batch,
                )?,
            });
        }

        Ok(Self {
            colony,
            interval: resources.interval.max(1),
            food_collection,
            consumption,
            incomes,
        })
    }

    /// Whether the economy runs on `tick`.
    #[must_use]
    pub const fn is_due(&self, tick: u64) -> bool {
        tick % self.interval == 0
    }

    /// Colony storage.
    #[must_use]
    pub const fn colony(&self) -> &Storage {
        &self.colony
    }

    /// Mutable colony storage, used to charge building costs.
    pub fn colony_mut(&mut self) -> &mut Storage {
        &mut self.colony
    }

    /// Runs one pass over the given personal stores.
    ///
    /// Each spore gathers food into the colony, then consumes from its own
    /// store. A spore whose store runs dry asks the colony for its deficit
    /// plus a refill to capacity; the colony hands over what it holds and
    /// the refill shrinks accordingly. Other resources accrue as one summed
    /// draw per resource.
    pub fn settle<'a, I>(&mut self, stores: I) -> Result<EconomyReport, EconomyError>
    where
        I: IntoIterator<Item = &'a mut Storage>,
    {
        let mut stores: Vec<&mut Storage> = stores.into_iter().collect();
        let population = stores.len();
        let mut report = EconomyReport {
            population,
            ..EconomyReport::default()
        };
        if population == 0 {
            return Ok(report);
        }

        for gathered in self.food_collection.get_batch(population)? {
            report.food_gathered += self.colony.add(ResourceKind::Food, gathered);
        }

        let needs = self.consumption.get_batch(population)?;
        for (store, need) in stores.iter_mut().zip(needs) {
            let need = need.max(0.0);
            let eaten = store.withdraw(ResourceKind::Food, need);
            let deficit = need - eaten;
            report.food_consumed += eaten;
            if store.amount(ResourceKind::Food) > 0.0 {
                continue;
            }

            let refill_room = store
                .stock(ResourceKind::Food)
                .map_or(0.0, |stock| stock.free_space());
            let granted = self.colony.withdraw(ResourceKind::Food, deficit + refill_room);
            report.food_consumed += granted.min(deficit);
            if granted < deficit {
                report.unfed += 1;
            }
            let _ = store.add(ResourceKind::Food, (granted - deficit).max(0.0));
        }

        for income in &mut self.incomes {
            let total: f64 = income.draws.get_batch(population)?.into_iter().sum();
            let accepted = self.colony.add(income.kind, total);
            report.income.push((income.kind, accepted));
        }

        debug!(
            population,
            food_gathered = report.food_gathered,
            food_consumed = report.food_consumed,
            unfed = report.unfed,
            "economy settled"
        );
        Ok(report)
    }
}

/// Bounded happiness history and the expansion progress accumulator.
#[derive(Clone, Debug, PartialEq)]
pub struct Happiness {
    base: f64,
    divisor: f64,
    history: VecDeque<f64>,
    history_cap: usize,
    progress: f64,
    baseline: usize,
}

impl Happiness {
    /// Creates an accumulator tracking growth against `population`.
    #[must_use]
    pub fn new(config: &HappinessConfig, population: usize) -> Self {
        Self {
            base: config.base,
            divisor: config.divisor,
            history: VecDeque::with_capacity(config.history_cap.min(1_024)),
            history_cap: config.history_cap,
            progress: 0.0,
            baseline: population,
        }
    }

    /// Records one happiness sample and reports whether expansion is ready.
    ///
    /// Progress restarts only when the population grew past the baseline, so
    /// a saturated accumulator keeps reporting ready until a birth lands.
    pub fn update(&mut self, population: usize) -> bool {
        if population > self.baseline {
            self.progress = 0.0;
        }
        self.baseline = population;

        let score = self.base;
        if self.history_cap > 0 {
            if self.history.len() >= self.history_cap {
                let _ = self.history.pop_front();
            }
            self.history.push_back(score);
        }

        self.progress = (self.progress + score / self.divisor).min(PROGRESS_SATURATION);
        self.progress >= PROGRESS_SATURATION
    }

    /// Current progress toward saturation.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Most recent happiness score.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.history.back().copied().unwrap_or(self.base)
    }

    /// Retained happiness samples, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_population_settles_nothing() {
        let mut economy = ResourceEconomy::new(&ColonyConfig::default()).expect("valid config");
        let before = economy.colony().clone();

        let report = economy.settle(Vec::new()).expect("empty pass");

        assert_eq!(report.population, 0);
        assert_eq!(economy.colony(), &before);
    }

    #[test]
    fn history_evicts_oldest_samples() {
        let config = HappinessConfig {
            history_cap: 3,
            ..HappinessConfig::default()
        };
        let mut happiness = Happiness::new(&config, 10);
        for _ in 0..5 {
            let _ = happiness.update(10);
        }
        assert_eq!(happiness.history().count(), 3);
    }
}
