//! Delimited-text order import (shop CSV export or tab-separated paste).

use std::sync::OnceLock;

use regex::Regex;

use crate::normalize::Normalizer;
use crate::orders::{NewItem, digits};

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(\.\d+)?").expect("size pattern is valid"))
}

/// First decimal number in a variant string: `"Sample / 3.5ml"` gives `"3.5"`.
pub fn size_from_variant(variant: &str) -> String {
    number_re()
        .find(variant)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Parse `[order name, product title, variant, quantity?]` lines.
///
/// Lines with fewer than three columns are ignored, as are rows whose quantity
/// column has no leading integer (header lines end up here).
pub fn parse_orders(text: &str, normalizer: &Normalizer) -> Vec<NewItem> {
    let mut out = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let raw: Vec<&str> = if line.contains('\t') {
            line.split('\t').collect()
        } else {
            line.split(',').collect()
        };
        if raw.len() < 3 {
            log::warn!("import: line {} has {} columns, skipped", line_no + 1, raw.len());
            continue;
        }
        let cols: Vec<String> = raw.iter().map(|c| unquote(c)).collect();
        let order_name = &cols[0];
        let order_number = match digits(order_name) {
            d if d.is_empty() => order_name.clone(),
            d => d,
        };
        let product_title = normalizer.apply(&cols[1]);
        let size = size_from_variant(&cols[2]);
        let qty = match cols.get(3).map(String::as_str) {
            None | Some("") => 1,
            Some(q) => leading_int(q),
        };
        if qty == 0 {
            log::debug!("import: line {} expands to no rows", line_no + 1);
        }
        for _ in 0..qty {
            out.push(NewItem {
                order_number: order_number.clone(),
                product_title: product_title.clone(),
                size: size.clone(),
            });
        }
    }
    log::info!("import: {} rows parsed", out.len());
    out
}

fn unquote(col: &str) -> String {
    let t = col.trim();
    let t = t.strip_prefix(['"', '\'']).unwrap_or(t);
    let t = t.strip_suffix(['"', '\'']).unwrap_or(t);
    t.trim().to_string()
}

/// Leading non-negative integer, zero when there is none.
fn leading_int(s: &str) -> usize {
    let t = s.trim_start();
    let t = t.strip_prefix('+').unwrap_or(t);
    let end = t.find(|c: char| !c.is_ascii_digit()).unwrap_or(t.len());
    t[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_quoted_csv_with_quantities() {
        let n = Normalizer::bundled();
        let rows = parse_orders(
            "\"1001\",\"Sample - Baccarat Rouge\",\"2ml\",2\n\"1002\",\"Creed Aventus\",\"3.5ml\",1\n",
            &n,
        );
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], rows[1]);
        assert_eq!(rows[0].order_number, "1001");
        assert_eq!(rows[0].product_title, "Baccarat Rouge 540");
        assert_eq!(rows[0].size, "2");
        assert_eq!(rows[2].product_title, "Aventus");
        assert_eq!(rows[2].size, "3.5");
    }

    #[test]
    fn tabs_short_lines_and_headers() {
        let n = Normalizer::plain();
        let text = "Name\tLineitem name\tLineitem variant\tLineitem quantity\r\n\
                    #A-77\tOud Wood\t10 ml\t\r\n\
                    too,short\r\n\
                    \r\n\
                    Guest\tRose\tn/a";
        let rows = parse_orders(text, &n);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_number, "77");
        assert_eq!(rows[0].size, "10");
        assert_eq!(rows[1].order_number, "Guest");
        assert_eq!(rows[1].size, "");
    }

    #[test]
    fn quantity_parsing() {
        assert_eq!(leading_int("3"), 3);
        assert_eq!(leading_int(" 2 pcs"), 2);
        assert_eq!(leading_int("qty"), 0);
        assert_eq!(leading_int("-1"), 0);
    }

    #[test]
    fn unquote_handles_padding() {
        assert_eq!(unquote(" \"1002\" "), "1002");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("plain"), "plain");
    }
}
