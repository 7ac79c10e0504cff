//! In-memory order list edited by the import table.
//!
//! The list always ends with exactly one blank row so the operator can type a new
//! entry without pressing "add" first.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LabelError, Result};

/// Opaque row key, unique for the lifetime of a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: RowId,
    pub order_number: String,
    pub product_title: String,
    pub size: String,
}

impl OrderItem {
    pub fn is_blank(&self) -> bool {
        self.order_number.trim().is_empty()
            && self.product_title.trim().is_empty()
            && self.size.trim().is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    OrderNumber,
    ProductTitle,
    Size,
}

/// Imported row before it receives an id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewItem {
    pub order_number: String,
    pub product_title: String,
    pub size: String,
}

/// Table row as rendered by the import view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: RowId,
    pub order_number: String,
    pub product_title: String,
    pub size: String,
    pub effective_order: String,
    /// Same effective order as the previous visible row; the order cell is drawn empty.
    pub hide_order: bool,
    /// The order already appears in the remote sheet.
    pub in_sheet: bool,
    pub blank: bool,
}

#[derive(Clone, Debug)]
pub struct OrderStore {
    items: Vec<OrderItem>,
    next_id: u64,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    pub fn new() -> Self {
        let mut store = OrderStore {
            items: Vec::new(),
            next_id: 1,
        };
        store.normalize();
        store
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.iter().all(OrderItem::is_blank)
    }

    fn issue_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }

    fn blank_row(&mut self) -> OrderItem {
        OrderItem {
            id: self.issue_id(),
            order_number: String::new(),
            product_title: String::new(),
            size: String::new(),
        }
    }

    /// Replace the whole list, as an import does.
    pub fn replace(&mut self, rows: Vec<NewItem>) {
        let mut items = Vec::with_capacity(rows.len() + 1);
        for r in rows {
            items.push(OrderItem {
                id: self.issue_id(),
                order_number: r.order_number,
                product_title: r.product_title,
                size: r.size,
            });
        }
        self.items = items;
        self.normalize();
    }

    pub fn update(&mut self, id: RowId, field: Field, value: &str) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|it| it.id == id)
            .ok_or(LabelError::UnknownRow(id))?;
        let slot = match field {
            Field::OrderNumber => &mut item.order_number,
            Field::ProductTitle => &mut item.product_title,
            Field::Size => &mut item.size,
        };
        *slot = value.to_string();
        self.normalize();
        Ok(())
    }

    /// Whether a blank row inserted before `position` would survive, i.e.
    /// neither neighbour is blank already.
    pub fn can_insert_at(&self, position: usize) -> bool {
        let at = position.min(self.items.len());
        let blank = |i: usize| self.items.get(i).is_some_and(OrderItem::is_blank);
        !(blank(at) || (at > 0 && blank(at - 1)))
    }

    /// Insert a blank row before `position` and return its id. Returns `None`
    /// and leaves the list alone when the row would sit next to a blank one.
    pub fn insert_at(&mut self, position: usize) -> Option<RowId> {
        if !self.can_insert_at(position) {
            return None;
        }
        let row = self.blank_row();
        let id = row.id;
        self.items.insert(position.min(self.items.len()), row);
        self.normalize();
        Some(id)
    }

    pub fn delete(&mut self, id: RowId) -> Result<()> {
        let before = self.items.len();
        if before == 1 && self.items[0].id == id {
            self.clear();
            return Ok(());
        }
        self.items.retain(|it| it.id != id);
        if self.items.len() == before {
            return Err(LabelError::UnknownRow(id));
        }
        self.normalize();
        Ok(())
    }

    /// Remove every row whose effective order number is `order`. Returns the
    /// number of rows removed.
    pub fn delete_group(&mut self, order: &str) -> usize {
        let order = order.trim();
        if order.is_empty() {
            return 0;
        }
        let effective = self.effective_orders();
        let before = self.items.len();
        let mut idx = 0;
        self.items.retain(|_| {
            let keep = effective[idx] != order;
            idx += 1;
            keep
        });
        let removed = before - self.items.len();
        self.normalize();
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.normalize();
    }

    /// Collapse blank runs to one row and make sure exactly one blank row trails.
    fn normalize(&mut self) {
        self.items.dedup_by(|next, prev| prev.is_blank() && next.is_blank());
        let needs_tail = self.items.last().map(|it| !it.is_blank()).unwrap_or(true);
        if needs_tail {
            let row = self.blank_row();
            self.items.push(row);
        }
    }

    /// Effective order number of every row, in list order.
    pub fn effective_orders(&self) -> Vec<String> {
        effective_orders(&self.items)
    }

    pub fn view(&self, search: &str, existing: &BTreeSet<String>) -> Vec<RowView> {
        let needle = search;
        let needle_lower = needle.to_lowercase();
        let mut out: Vec<RowView> = Vec::new();
        for (item, effective) in self.items.iter().zip(self.effective_orders()) {
            let visible = needle.is_empty()
                || item.product_title.to_lowercase().contains(&needle_lower)
                || item.order_number.contains(needle)
                || effective.contains(needle);
            if !visible {
                continue;
            }
            let hide_order = !effective.is_empty()
                && out
                    .last()
                    .map(|prev| prev.effective_order == effective)
                    .unwrap_or(false);
            let in_sheet = !effective.is_empty() && existing.contains(&digits(&effective));
            out.push(RowView {
                id: item.id,
                order_number: item.order_number.clone(),
                product_title: item.product_title.clone(),
                size: item.size.clone(),
                hide_order,
                in_sheet,
                blank: item.is_blank(),
                effective_order: effective,
            });
        }
        out
    }

    /// Rows that carry a product title.
    pub fn entry_count(&self) -> usize {
        self.items
            .iter()
            .filter(|it| !it.product_title.is_empty())
            .count()
    }

    /// Distinct effective orders among rows that carry a product title.
    pub fn order_groups(&self) -> usize {
        self.items
            .iter()
            .zip(self.effective_orders())
            .filter(|(it, _)| !it.product_title.is_empty())
            .map(|(_, eff)| eff)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Row count per volume, keyed like the layout options (`"3ml"`).
    pub fn size_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for it in &self.items {
            let numeric = strip_unit(&it.size);
            if numeric.is_empty() {
                continue;
            }
            *counts.entry(format!("{numeric}ml")).or_insert(0) += 1;
        }
        counts
    }

    /// Whether any row's order already exists in the remote sheet.
    pub fn has_existing(&self, existing: &BTreeSet<String>) -> bool {
        self.effective_orders()
            .iter()
            .any(|eff| !eff.is_empty() && existing.contains(&digits(eff)))
    }
}

pub fn effective_orders(items: &[OrderItem]) -> Vec<String> {
    let mut last = String::new();
    items
        .iter()
        .map(|it| {
            let own = it.order_number.trim();
            if !own.is_empty() {
                last = own.to_string();
            }
            last.clone()
        })
        .collect()
}

/// Keep only ASCII digits.
pub fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Lower-cased size with a trailing `ml` unit removed.
pub fn strip_unit(size: &str) -> String {
    let lower = size.trim().to_lowercase();
    lower
        .strip_suffix("ml")
        .unwrap_or(&lower)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(order: &str, title: &str, size: &str) -> NewItem {
        NewItem {
            order_number: order.into(),
            product_title: title.into(),
            size: size.into(),
        }
    }

    fn assert_trailing_blank(store: &OrderStore) {
        let items = store.items();
        assert!(items.last().unwrap().is_blank());
        for pair in items.windows(2) {
            assert!(!(pair[0].is_blank() && pair[1].is_blank()), "adjacent blank rows");
        }
    }

    #[test]
    fn new_store_has_one_blank_row() {
        let s = OrderStore::new();
        assert_eq!(s.len(), 1);
        assert!(s.is_empty());
        assert_trailing_blank(&s);
    }

    #[test]
    fn editing_the_blank_row_appends_another() {
        let mut s = OrderStore::new();
        let id = s.items()[0].id;
        s.update(id, Field::ProductTitle, "Aventus").unwrap();
        assert_eq!(s.len(), 2);
        assert_trailing_blank(&s);
        s.update(id, Field::ProductTitle, "").unwrap();
        assert_eq!(s.len(), 1);
        assert_trailing_blank(&s);
    }

    #[test]
    fn effective_order_carries_forward() {
        let mut s = OrderStore::new();
        s.replace(vec![
            row("", "Orphan", "1"),
            row("1001", "A", "1"),
            row("", "B", "1"),
            row(" 1002 ", "C", "3"),
            row("", "D", "3"),
        ]);
        assert_eq!(s.effective_orders(), vec!["", "1001", "1001", "1002", "1002", "1002"]);
    }

    #[test]
    fn insert_and_delete_keep_invariant() {
        let mut s = OrderStore::new();
        s.replace(vec![row("1", "A", "1"), row("2", "B", "1")]);
        let id = s.insert_at(1).unwrap();
        assert_eq!(s.items()[1].id, id);
        assert_eq!(s.len(), 4);
        assert_eq!(s.insert_at(99), None);
        assert_eq!(s.len(), 4);
        assert_trailing_blank(&s);
        let first = s.items()[0].id;
        s.delete(first).unwrap();
        assert_trailing_blank(&s);
        assert!(matches!(s.delete(RowId(9999)), Err(LabelError::UnknownRow(_))));
    }

    #[test]
    fn insert_next_to_blank_is_refused() {
        let mut s = OrderStore::new();
        s.replace(vec![row("1", "A", "1"), row("2", "B", "1")]);
        let ids: Vec<RowId> = s.items().iter().map(|it| it.id).collect();

        // Above the trailing blank row.
        assert!(!s.can_insert_at(2));
        assert_eq!(s.insert_at(2), None);
        // Directly below a freshly inserted blank row.
        let blank = s.insert_at(1).unwrap();
        assert!(!s.can_insert_at(2));
        assert_eq!(s.insert_at(2), None);
        assert!(!s.can_insert_at(1));
        assert_eq!(s.insert_at(1), None);

        let now: Vec<RowId> = s.items().iter().map(|it| it.id).collect();
        assert_eq!(now, vec![ids[0], blank, ids[1], ids[2]]);
        assert_trailing_blank(&s);
        assert!(s.can_insert_at(0));
    }

    #[test]
    fn deleting_the_only_row_resets() {
        let mut s = OrderStore::new();
        let id = s.items()[0].id;
        s.delete(id).unwrap();
        assert_eq!(s.len(), 1);
        assert_ne!(s.items()[0].id, id);
    }

    #[test]
    fn delete_group_uses_effective_order() {
        let mut s = OrderStore::new();
        s.replace(vec![
            row("1001", "A", "1"),
            row("", "B", "1"),
            row("1002", "C", "3"),
        ]);
        assert_eq!(s.delete_group("1001"), 2);
        assert_eq!(s.items()[0].product_title, "C");
        assert_eq!(s.delete_group("  "), 0);
        assert_trailing_blank(&s);
    }

    #[test]
    fn view_flags_repeats_and_sheet_hits() {
        let mut s = OrderStore::new();
        s.replace(vec![
            row("#1001", "Aventus", "2"),
            row("", "Tuxedo", "2"),
            row("1002", "Oud", "3"),
        ]);
        let existing = BTreeSet::from(["1001".to_string()]);
        let v = s.view("", &existing);
        assert_eq!(v.len(), 4);
        assert!(!v[0].hide_order && v[0].in_sheet);
        assert!(v[1].hide_order && v[1].in_sheet);
        assert!(!v[2].hide_order && !v[2].in_sheet);
        assert!(v[3].blank);
        assert!(s.has_existing(&existing));

        let found = s.view("tux", &existing);
        assert_eq!(found.len(), 1);
        assert!(!found[0].hide_order);
        assert_eq!(found[0].effective_order, "#1001");
    }

    #[test]
    fn search_matches_raw_needle() {
        let mut s = OrderStore::new();
        s.replace(vec![row("1001", "Aventus", "2"), row("2002", "Tuxedo", "2")]);
        let none = BTreeSet::new();
        assert_eq!(s.view(" tux", &none).len(), 0);
        let by_order: Vec<_> = s.view("100", &none).into_iter().map(|r| r.product_title).collect();
        assert_eq!(by_order, vec!["Aventus".to_string()]);
    }

    #[test]
    fn stats() {
        let mut s = OrderStore::new();
        s.replace(vec![
            row("1", "A", "1"),
            row("", "B", "1ml"),
            row("2", "C", "3"),
            row("3", "", "3"),
        ]);
        assert_eq!(s.entry_count(), 3);
        assert_eq!(s.order_groups(), 2);
        let counts = s.size_counts();
        assert_eq!(counts.get("1ml"), Some(&2));
        assert_eq!(counts.get("3ml"), Some(&2));
    }
}
