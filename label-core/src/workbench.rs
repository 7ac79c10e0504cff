//! Application state of the label workbench.
//!
//! Every front end drives one `Workbench` through `Command`s and performs the
//! returned `Effect`s itself (network calls, timers).

use std::collections::BTreeSet;

use crate::error::{LabelError, Result};
use crate::import::parse_orders;
use crate::layout::LayoutKind;
use crate::mapping::{LabelMap, map_labels, titles_for_volume};
use crate::normalize::Normalizer;
use crate::orders::{Field, OrderStore, RowId, strip_unit};
use crate::render::{PrintDocument, print_document};
use crate::selection::Selection;
use crate::sync::{RemoteEntry, SyncRow, build_payload};

#[derive(Clone, Debug)]
pub enum Command {
    SetLayout(LayoutKind),
    SetVolume(String),
    /// Replace the order list with parsed CSV/TSV text.
    Import(String),
    UpdateField {
        id: RowId,
        field: Field,
        value: String,
    },
    InsertRow(usize),
    DeleteRow(RowId),
    DeleteGroup(String),
    ClearOrders,
    ToggleCell(usize),
    SetCell(usize, bool),
    SelectAll,
    ClearGrid,
    /// Map titles of the current volume onto the selection. `remote` is used
    /// only when the local list holds nothing.
    AutoMap { remote: Option<Vec<RemoteEntry>> },
    SetExistingOrders(BTreeSet<String>),
    FinishSync,
}

/// Side effect the host has to carry out after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    RefreshExistingOrders,
    Mapped(usize),
}

#[derive(Debug)]
pub struct Workbench {
    pub layout: LayoutKind,
    pub volume: String,
    pub store: OrderStore,
    pub selection: Selection,
    pub mapping: LabelMap,
    pub existing: BTreeSet<String>,
    pub syncing: bool,
    normalizer: Normalizer,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(LayoutKind::default(), Normalizer::bundled())
    }
}

impl Workbench {
    pub fn new(layout: LayoutKind, normalizer: Normalizer) -> Self {
        Workbench {
            layout,
            volume: layout.first_option().to_string(),
            store: OrderStore::new(),
            selection: Selection::new(),
            mapping: LabelMap::new(),
            existing: BTreeSet::new(),
            syncing: false,
            normalizer,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Swap cleanup rules; rows already imported keep their titles.
    pub fn set_normalizer(&mut self, normalizer: Normalizer) {
        self.normalizer = normalizer;
    }

    pub fn total_cells(&self) -> usize {
        self.layout.config().total()
    }

    fn check_cell(&self, index: usize) -> Result<()> {
        let total = self.total_cells();
        if index >= total {
            return Err(LabelError::CellOutOfRange { index, total });
        }
        Ok(())
    }

    pub fn apply(&mut self, cmd: Command) -> Result<Effect> {
        match cmd {
            Command::SetLayout(layout) => {
                self.layout = layout;
                self.volume = layout.first_option().to_string();
                self.selection.clear();
                self.mapping.clear();
                log::info!("workbench: layout {layout}, volume {}", self.volume);
                return Ok(Effect::RefreshExistingOrders);
            }
            Command::SetVolume(volume) => {
                if !self.layout.config().offers(&volume) {
                    return Err(LabelError::UnsupportedVolume {
                        volume,
                        layout: self.layout.id(),
                    });
                }
                self.volume = volume.trim().to_lowercase();
            }
            Command::Import(text) => {
                let rows = parse_orders(&text, &self.normalizer);
                log::info!("workbench: imported {} rows", rows.len());
                self.store.replace(rows);
            }
            Command::UpdateField { id, field, value } => self.store.update(id, field, &value)?,
            Command::InsertRow(pos) => {
                if self.store.insert_at(pos).is_none() {
                    log::debug!("workbench: insert at {pos} skipped, neighbour is blank");
                }
            }
            Command::DeleteRow(id) => self.store.delete(id)?,
            Command::DeleteGroup(order) => {
                let n = self.store.delete_group(&order);
                log::debug!("workbench: removed {n} rows of order {order}");
            }
            Command::ClearOrders => self.store.clear(),
            Command::ToggleCell(index) => {
                self.check_cell(index)?;
                self.selection.toggle(index);
            }
            Command::SetCell(index, on) => {
                self.check_cell(index)?;
                self.selection.set(index, on);
            }
            Command::SelectAll => self.selection.select_all(self.total_cells()),
            Command::ClearGrid => {
                self.selection.clear();
                self.mapping.clear();
            }
            Command::AutoMap { remote } => {
                let titles = self.titles(remote.as_deref());
                let n = map_labels(
                    &mut self.mapping,
                    &self.selection.sorted(),
                    &titles,
                    &self.volume,
                )?;
                self.selection.clear();
                return Ok(Effect::Mapped(n));
            }
            Command::SetExistingOrders(set) => self.existing = set,
            Command::FinishSync => self.syncing = false,
        }
        Ok(Effect::None)
    }

    /// Titles matching the current volume, from the local list or, when that
    /// is empty, from the remote entries.
    fn titles(&self, remote: Option<&[RemoteEntry]>) -> Vec<String> {
        match remote {
            Some(entries) if self.store.is_empty() => {
                let target = strip_unit(&self.volume);
                entries
                    .iter()
                    .filter(|e| strip_unit(&e.size) == target)
                    .map(|e| e.name.clone())
                    .collect()
            }
            _ => titles_for_volume(self.store.items(), &self.volume),
        }
    }

    /// Build the webhook payload and raise the syncing flag.
    pub fn begin_sync(&mut self, date: &str) -> Result<Vec<SyncRow>> {
        let rows = build_payload(self.store.items(), date)?;
        self.syncing = true;
        log::info!("workbench: syncing {} rows", rows.len());
        Ok(rows)
    }

    pub fn print_document(&self, logo_url: &str) -> Result<PrintDocument> {
        print_document(self.layout, &self.mapping, &self.normalizer, logo_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ORDERS: &str = "Name,Title,Variant,Qty\n#1001,Creed Aventus,3ml,2\n#1002,Oud Wood,1ml,1\n";

    fn bench() -> Workbench {
        Workbench::new(LayoutKind::Standard, Normalizer::bundled())
    }

    #[test]
    fn layout_change_resets_volume_and_grid() {
        let mut w = bench();
        w.apply(Command::SetVolume("3ml".into())).unwrap();
        w.apply(Command::ToggleCell(4)).unwrap();
        w.mapping.insert(1, "X".into());
        let effect = w.apply(Command::SetLayout(LayoutKind::Large)).unwrap();
        assert_eq!(effect, Effect::RefreshExistingOrders);
        assert_eq!(w.volume, "5ml");
        assert!(w.selection.is_empty());
        assert!(w.mapping.is_empty());
    }

    #[test]
    fn rejects_foreign_volume_and_cells() {
        let mut w = bench();
        assert!(matches!(
            w.apply(Command::SetVolume("10ml".into())),
            Err(LabelError::UnsupportedVolume { .. })
        ));
        assert!(matches!(
            w.apply(Command::ToggleCell(160)),
            Err(LabelError::CellOutOfRange { index: 160, total: 160 })
        ));
    }

    #[test]
    fn auto_map_uses_local_rows_then_clears_selection() {
        let mut w = bench();
        w.apply(Command::Import(ORDERS.into())).unwrap();
        w.apply(Command::SetVolume("3ml".into())).unwrap();
        for i in [7, 2, 30] {
            w.apply(Command::SetCell(i, true)).unwrap();
        }
        let effect = w.apply(Command::AutoMap { remote: None }).unwrap();
        assert_eq!(effect, Effect::Mapped(2));
        assert_eq!(
            w.mapping,
            LabelMap::from([(2, "Aventus".into()), (7, "Aventus".into())])
        );
        assert!(w.selection.is_empty());
    }

    #[test]
    fn auto_map_falls_back_to_remote_when_empty() {
        let mut w = bench();
        w.apply(Command::SelectAll).unwrap();
        let remote = vec![
            RemoteEntry {
                name: "Rose".into(),
                size: "1".into(),
            },
            RemoteEntry {
                name: "Iris".into(),
                size: "3".into(),
            },
        ];
        let effect = w.apply(Command::AutoMap { remote: Some(remote) }).unwrap();
        assert_eq!(effect, Effect::Mapped(1));
        assert_eq!(w.mapping.get(&0).map(String::as_str), Some("Rose"));
    }

    #[test]
    fn auto_map_error_keeps_selection() {
        let mut w = bench();
        w.apply(Command::Import(ORDERS.into())).unwrap();
        w.apply(Command::ToggleCell(0)).unwrap();
        w.apply(Command::SetVolume("3ml".into())).unwrap();
        w.apply(Command::DeleteGroup("1001".into())).unwrap();
        let err = w.apply(Command::AutoMap { remote: None }).unwrap_err();
        assert!(matches!(err, LabelError::NoMatchingSize(_)));
        assert_eq!(w.selection.len(), 1);
    }

    #[test]
    fn sync_flag_round_trip() {
        let mut w = bench();
        assert!(matches!(w.begin_sync("1/1/2026"), Err(LabelError::NothingToSync)));
        assert!(!w.syncing);
        w.apply(Command::Import(ORDERS.into())).unwrap();
        let rows = w.begin_sync("1/1/2026").unwrap();
        assert_eq!(rows.len(), 3);
        assert!(w.syncing);
        w.apply(Command::FinishSync).unwrap();
        assert!(!w.syncing);
    }
}
