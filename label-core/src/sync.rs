//! Exchange with the spreadsheet-backed service.
//!
//! Writes go to a webhook that cannot answer cross-origin requests, so a sync
//! only means the request was handed to the network. Nothing here waits for or
//! interprets a server acknowledgement.
//!
//! Reads come from the sheet's published CSV export, split naively on commas.
//! The order-number column position is assumed, not checked against a header.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{LabelError, Result};
use crate::import::size_from_variant;
use crate::normalize::Normalizer;
use crate::orders::{OrderItem, digits, effective_orders};

/// Time the syncing indicator stays up after the request was submitted.
pub const SYNC_COOLDOWN_MS: u32 = 2000;

/// Column of the published export holding the order number.
const ORDER_COLUMN: usize = 1;

/// One row of the webhook payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRow {
    pub date: String,
    pub order_number: String,
    pub product_title: String,
    pub size: String,
}

/// Label candidate read from the published export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub size: String,
}

fn split_naive(line: &str) -> Vec<String> {
    line.split(',')
        .map(|c| c.replace('"', "").trim().to_string())
        .collect()
}

/// Digit-only order numbers already present in the sheet.
pub fn parse_existing_orders(csv: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for line in csv.split('\n') {
        let cols = split_naive(line);
        if let Some(col) = cols.get(ORDER_COLUMN) {
            let order = digits(col);
            if !order.is_empty() {
                out.insert(order);
            }
        }
    }
    out
}

/// Title/size pairs from the export, used when nothing was imported locally.
pub fn parse_remote_entries(csv: &str, normalizer: &Normalizer) -> Vec<RemoteEntry> {
    csv.split('\n')
        .filter_map(|line| {
            let cols = split_naive(line);
            if cols.len() < 3 {
                return None;
            }
            let name = normalizer.apply(&cols[1]);
            if name.is_empty() {
                return None;
            }
            Some(RemoteEntry {
                name,
                size: size_from_variant(&cols[2]),
            })
        })
        .collect()
}

/// Build the webhook payload.
///
/// All-blank rows are dropped. The date is stamped on the first row only, and a
/// row's order number is left empty when the previous row carries the same one.
pub fn build_payload(items: &[OrderItem], date: &str) -> Result<Vec<SyncRow>> {
    let effective = effective_orders(items);
    let kept: Vec<(&OrderItem, &String)> = items
        .iter()
        .zip(effective.iter())
        .filter(|(it, _)| !it.is_blank())
        .collect();
    if kept.is_empty() {
        return Err(LabelError::NothingToSync);
    }
    let rows = kept
        .iter()
        .enumerate()
        .map(|(i, (it, eff))| {
            let repeat = i > 0 && !eff.is_empty() && kept[i - 1].1 == *eff;
            SyncRow {
                date: if i == 0 { date.to_string() } else { String::new() },
                order_number: if repeat { String::new() } else { (*eff).clone() },
                product_title: it.product_title.clone(),
                size: it.size.clone(),
            }
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::RowId;
    use pretty_assertions::assert_eq;

    fn item(id: u64, order: &str, title: &str, size: &str) -> OrderItem {
        OrderItem {
            id: RowId(id),
            order_number: order.into(),
            product_title: title.into(),
            size: size.into(),
        }
    }

    #[test]
    fn existing_orders_from_second_column() {
        let csv = "Date,Order,Title,Size\n1/2/2025,\"#1001\",Aventus,2\n,1002,Oud,3\n,,Rose,1\nbroken";
        let set = parse_existing_orders(csv);
        assert_eq!(set, BTreeSet::from(["1001".to_string(), "1002".to_string()]));
    }

    #[test]
    fn remote_entries_normalize_names() {
        let n = Normalizer::bundled();
        let csv = "x,Creed Aventus,3.5ml\nx,,1ml\nshort,row";
        let entries = parse_remote_entries(csv, &n);
        assert_eq!(
            entries,
            vec![RemoteEntry {
                name: "Aventus".into(),
                size: "3.5".into()
            }]
        );
    }

    #[test]
    fn payload_blanks_repeated_orders() {
        let items = vec![
            item(1, "1001", "A", "1"),
            item(2, "", "B", "1"),
            item(3, "", "", ""),
            item(4, "1002", "C", "3"),
            item(5, "1002", "D", "3"),
            item(6, "", "", ""),
        ];
        let rows = build_payload(&items, "10/19/2026").unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].date, "10/19/2026");
        assert_eq!(rows[0].order_number, "1001");
        assert_eq!(rows[1].date, "");
        assert_eq!(rows[1].order_number, "");
        assert_eq!(rows[2].order_number, "1002");
        assert_eq!(rows[3].order_number, "");
    }

    #[test]
    fn payload_serializes_camel_case() {
        let rows = build_payload(&[item(1, "7", "A", "1")], "d").unwrap();
        let json = serde_json::to_string(&rows).unwrap();
        assert_eq!(
            json,
            r#"[{"date":"d","orderNumber":"7","productTitle":"A","size":"1"}]"#
        );
    }

    #[test]
    fn nothing_to_sync() {
        let err = build_payload(&[item(1, " ", "", "")], "d").unwrap_err();
        assert!(matches!(err, LabelError::NothingToSync));
    }
}
