//! Capacity-clamped resource stores shared by the colony and individual spores.

use std::collections::BTreeMap;

use crate::{ResourceAmount, ResourceKind};

/// Quantity of a single resource together with the capacity bounding it.
///
/// A stock never exceeds its capacity and never drops below zero. Operations
/// that would cross either boundary clamp instead of failing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stock {
    amount: f64,
    capacity: f64,
}

impl Stock {
    /// Creates a stock, clamping the starting amount into `0..=capacity`.
    #[must_use]
    pub fn new(amount: f64, capacity: f64) -> Self {
        let capacity = sanitize(capacity);
        Self {
            amount: sanitize(amount).min(capacity),
            capacity,
        }
    }

    /// Quantity currently held.
    #[must_use]
    pub const fn amount(&self) -> f64 {
        self.amount
    }

    /// Maximum quantity the stock may hold.
    #[must_use]
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Remaining room before the stock is full.
    #[must_use]
    pub fn free_space(&self) -> f64 {
        (self.capacity - self.amount).max(0.0)
    }

    /// Adds to the stock and returns the amount actually accepted.
    ///
    /// A stock already at capacity drops the addition entirely; otherwise it
    /// rises by `min(addition, capacity - amount)`.
    pub fn add(&mut self, addition: f64) -> f64 {
        let addition = sanitize(addition);
        if self.amount >= self.capacity {
            return 0.0;
        }
        let accepted = addition.min(self.capacity - self.amount);
        self.amount += accepted;
        accepted
    }

    /// Removes up to `requested` and returns the amount actually taken.
    pub fn withdraw(&mut self, requested: f64) -> f64 {
        let taken = sanitize(requested).min(self.amount);
        self.amount -= taken;
        taken
    }
}

/// Resource kind to stock mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Storage {
    stocks: BTreeMap<ResourceKind, Stock>,
}

impl Storage {
    /// Creates a storage tracking no resources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage tracking `kinds`, each empty with the same capacity.
    #[must_use]
    pub fn with_uniform_capacity(
        kinds: impl IntoIterator<Item = ResourceKind>,
        capacity: f64,
    ) -> Self {
        let stocks = kinds
            .into_iter()
            .map(|kind| (kind, Stock::new(0.0, capacity)))
            .collect();
        Self { stocks }
    }

    /// Starts tracking `kind` with the given amount and capacity, replacing any existing stock.
    pub fn track(&mut self, kind: ResourceKind, amount: f64, capacity: f64) {
        let _ = self.stocks.insert(kind, Stock::new(amount, capacity));
    }

    /// Stock tracked for `kind`, if any.
    #[must_use]
    pub fn stock(&self, kind: ResourceKind) -> Option<Stock> {
        self.stocks.get(&kind).copied()
    }

    /// Quantity held for `kind`, zero when untracked.
    #[must_use]
    pub fn amount(&self, kind: ResourceKind) -> f64 {
        self.stocks.get(&kind).map_or(0.0, Stock::amount)
    }

    /// Capacity for `kind`, zero when untracked.
    #[must_use]
    pub fn capacity(&self, kind: ResourceKind) -> f64 {
        self.stocks.get(&kind).map_or(0.0, Stock::capacity)
    }

    /// Adds to `kind` and returns the accepted amount. Untracked kinds accept nothing.
    pub fn add(&mut self, kind: ResourceKind, addition: f64) -> f64 {
        self.stocks
            .get_mut(&kind)
            .map_or(0.0, |stock| stock.add(addition))
    }

    /// Withdraws up to `requested` from `kind` and returns the amount taken.
    pub fn withdraw(&mut self, kind: ResourceKind, requested: f64) -> f64 {
        self.stocks
            .get_mut(&kind)
            .map_or(0.0, |stock| stock.withdraw(requested))
    }

    /// Reports whether every listed amount is available.
    #[must_use]
    pub fn covers(&self, costs: &[ResourceAmount]) -> bool {
        costs
            .iter()
            .all(|cost| self.amount(cost.kind) >= cost.amount)
    }

    /// Withdraws every listed amount. Pair with [`Storage::covers`].
    pub fn deduct(&mut self, costs: &[ResourceAmount]) {
        for cost in costs {
            let _ = self.withdraw(cost.kind, cost.amount);
        }
    }

    /// Iterates tracked stocks in resource code order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, Stock)> + '_ {
        self.stocks.iter().map(|(kind, stock)| (*kind, *stock))
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}
