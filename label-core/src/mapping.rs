//! Assigns order titles of one volume to the selected grid cells.

use std::collections::BTreeMap;

use crate::error::{LabelError, Result};
use crate::orders::{OrderItem, strip_unit};

/// Cell index -> label text.
pub type LabelMap = BTreeMap<usize, String>;

/// Titles of rows whose size matches `volume` once units are stripped.
pub fn titles_for_volume(rows: &[OrderItem], volume: &str) -> Vec<String> {
    let target = strip_unit(volume);
    rows.iter()
        .filter(|it| !it.is_blank())
        .filter(|it| strip_unit(&it.size) == target)
        .filter(|it| !it.product_title.trim().is_empty())
        .map(|it| it.product_title.clone())
        .collect()
}

/// Merge `titles` into `mapping`, lowest selected index first.
///
/// Stops when either list runs out and returns the number of cells assigned.
pub fn assign(mapping: &mut LabelMap, selected: &[usize], titles: &[String]) -> usize {
    let mut cells = selected.to_vec();
    cells.sort_unstable();
    cells.dedup();
    let mut n = 0;
    for (cell, title) in cells.into_iter().zip(titles) {
        mapping.insert(cell, title.clone());
        n += 1;
    }
    n
}

/// Validate inputs and map; leaves `mapping` untouched on error.
pub fn map_labels(
    mapping: &mut LabelMap,
    selected: &[usize],
    titles: &[String],
    volume: &str,
) -> Result<usize> {
    if selected.is_empty() {
        return Err(LabelError::EmptySelection);
    }
    if titles.is_empty() {
        return Err(LabelError::NoMatchingSize(volume.to_string()));
    }
    let n = assign(mapping, selected, titles);
    log::debug!(
        "mapping: {n} of {} titles onto {} selected cells ({volume})",
        titles.len(),
        selected.len()
    );
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::RowId;
    use pretty_assertions::assert_eq;

    fn item(id: u64, title: &str, size: &str) -> OrderItem {
        OrderItem {
            id: RowId(id),
            order_number: "1".into(),
            product_title: title.into(),
            size: size.into(),
        }
    }

    fn titles(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filters_on_volume_without_unit() {
        let rows = vec![
            item(1, "A", "1"),
            item(2, "B", "3"),
            item(3, "C", "1ML"),
            item(4, "", "1"),
            item(5, "D", "10"),
        ];
        assert_eq!(titles_for_volume(&rows, "1ml"), titles(&["A", "C"]));
        assert_eq!(titles_for_volume(&rows, "10ml"), titles(&["D"]));
        assert!(titles_for_volume(&rows, "5ml").is_empty());
    }

    #[test]
    fn assigns_min_of_cells_and_titles() {
        let mut m = LabelMap::new();
        assert_eq!(assign(&mut m, &[9, 2, 5], &titles(&["A", "B"])), 2);
        assert_eq!(m, LabelMap::from([(2, "A".into()), (5, "B".into())]));

        let mut m = LabelMap::new();
        assert_eq!(assign(&mut m, &[3], &titles(&["A", "B"])), 1);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn merges_with_existing_labels() {
        let mut m = LabelMap::from([(0, "Keep".to_string()), (4, "Old".to_string())]);
        map_labels(&mut m, &[4, 7], &titles(&["New", "Other"]), "1ml").unwrap();
        assert_eq!(m.get(&0).map(String::as_str), Some("Keep"));
        assert_eq!(m.get(&4).map(String::as_str), Some("New"));
        assert_eq!(m.get(&7).map(String::as_str), Some("Other"));
    }

    #[test]
    fn errors_leave_mapping_alone() {
        let mut m = LabelMap::from([(1, "X".to_string())]);
        assert!(matches!(
            map_labels(&mut m, &[], &titles(&["A"]), "1ml"),
            Err(LabelError::EmptySelection)
        ));
        let err = map_labels(&mut m, &[2], &[], "3ml").unwrap_err();
        assert_eq!(err.to_string(), "No items found for size 3ml. Check your imported items.");
        assert_eq!(m.len(), 1);
    }
}
