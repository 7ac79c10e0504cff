//! Core of the sample-label workbench: order import and cleanup, grid selection,
//! label mapping, print rendering and the spreadsheet sync payload.
//!
//! Nothing here touches the network or the DOM; the wasm front end and the
//! `label-sheet` CLI both drive a [`Workbench`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod import;
pub mod layout;
pub mod mapping;
pub mod normalize;
pub mod orders;
pub mod render;
pub mod selection;
pub mod sync;
pub mod workbench;

pub use config::Settings;
pub use error::{LabelError, Result};
pub use geometry::{CellGeometry, CellGrid, Point, Rect};
pub use layout::{LabelConfig, LayoutKind, SheetPreset};
pub use mapping::LabelMap;
pub use normalize::{NormalizeRules, Normalizer};
pub use orders::{Field, OrderItem, OrderStore, RowId, RowView};
pub use render::{PrintDocument, SheetPlan};
pub use selection::Selection;
pub use sync::{RemoteEntry, SyncRow};
pub use workbench::{Command, Effect, Workbench};
