//! Errors surfaced by colony construction and tick progression.

use spore_colony_core::ConfigError;
use spore_colony_system_economy::EconomyError;
use spore_colony_system_lifecycle::LifecycleError;
use spore_colony_system_movement::MovementError;

/// Failures raised while building or advancing a colony.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// A supplied terrain does not match the configured grid.
    #[error("terrain is {actual_columns}x{actual_rows} but the grid is {columns}x{rows}")]
    TerrainMismatch {
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
        /// Columns of the supplied terrain.
        actual_columns: u32,
        /// Rows of the supplied terrain.
        actual_rows: u32,
    },
    /// The lifecycle manager failed.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// The economy failed.
    #[error(transparent)]
    Economy(#[from] EconomyError),
    /// The movement resolver failed.
    #[error(transparent)]
    Movement(#[from] MovementError),
}
