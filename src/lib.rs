// ATM coverage dashboard - core library.
//
// Load → clean → enrich runs once (`dashboard::Dataset::load`); every UI
// interaction afterwards is a pure `dashboard::render` over that snapshot.

pub mod aggregate;
pub mod boundary;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filters;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod server;
pub mod types;
pub mod util;

pub use dashboard::{render, DashboardView, Dataset};
pub use error::{DashboardError, Result};
pub use filters::{FilterOptions, FilterSelection, Selection};
