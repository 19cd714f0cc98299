//! Earthworks terrain engine - heightfield editing and precision cut/fill
//!
//! This crate provides:
//! - [`grid`] - Heightfield grid with baseline, clamping and dirty tiles
//! - [`material`] - Soil layers below the baseline
//! - [`volume`] - Cut/fill volume accounting
//! - [`brush`] - Falloff brushes and stroke interpolation
//! - [`area`] - Polygon and polyline drawing areas
//! - [`cross_section`] - Wall profiles for precision operations
//! - [`planner`] - The step-by-step operation workflow
//! - [`executor`] - Rasterizes and applies cut/fill operations
//! - [`history`] - Bounded undo/redo snapshots
//! - [`log`] - Operation log and event hooks for collaborators
//! - [`snapshot`] - Export/import for persistence
//! - [`mesh`] - Read-only display mesh adapter
//! - [`session`] - Everything above behind one owner

pub mod area;
pub mod brush;
pub mod constants;
pub mod cross_section;
pub mod executor;
pub mod grid;
pub mod history;
pub mod log;
pub mod material;
pub mod mesh;
pub mod planner;
pub mod session;
pub mod snapshot;
pub mod types;
pub mod volume;

pub use area::*;
pub use brush::*;
pub use constants::*;
pub use cross_section::*;
pub use executor::*;
pub use grid::*;
pub use history::*;
pub use log::*;
pub use material::*;
pub use mesh::*;
pub use planner::*;
pub use session::*;
pub use snapshot::*;
pub use types::*;
pub use volume::*;
