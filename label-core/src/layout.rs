//! Physical label-sheet presets.
//! Lengths are expressed in inches and typography in CSS pixels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

pub const PAGE_W_IN: f64 = 8.5;
pub const PAGE_H_IN: f64 = 11.0;
/// CSS reference pixel density.
pub const CSS_PX_PER_IN: f64 = 96.0;
/// Smallest font size the fit-to-box pass will go down to (px).
pub const MIN_FONT_PX: f64 = 6.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Standard,
    Large,
}

/// Grid shape and offered volumes of a layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub rows: usize,
    pub cols: usize,
    pub options: &'static [&'static str],
}

impl LabelConfig {
    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    pub fn offers(&self, volume: &str) -> bool {
        self.options.iter().any(|o| o.eq_ignore_ascii_case(volume.trim()))
    }
}

/// Cell placement on the printed page plus the typography used inside a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SheetPreset {
    pub cell_w_in: f64,
    pub cell_h_in: f64,
    pub col_gap_in: f64,
    pub row_gap_in: f64,
    pub pad_x_in: f64,
    pub pad_y_in: f64,
    pub font_px: f64,
    pub letter_spacing_px: f64,
    /// Share of the cell height used by the text box.
    pub text_box: f64,
    /// Share of the cell height used by the logo box.
    pub brand_box: f64,
    /// Logo width relative to the cell width.
    pub logo_width: f64,
    /// Horizontal nudge applied to the logo (px).
    pub logo_offset_px: f64,
    /// Text box padding, CSS order: top, right, bottom, left (px).
    pub text_padding_px: [f64; 4],
    /// Centre the text box content as a flex row.
    pub text_flex: bool,
    /// Logo box padding, CSS order (px).
    pub brand_padding_px: [f64; 4],
    /// html2canvas capture scale.
    pub capture_scale: u32,
    pub file_name: &'static str,
}

const STANDARD: LabelConfig = LabelConfig {
    id: "standard",
    name: "Small Format (8x20)",
    rows: 20,
    cols: 8,
    options: &["1ml", "3ml"],
};

const LARGE: LabelConfig = LabelConfig {
    id: "large",
    name: "Large Format (3x10)",
    rows: 10,
    cols: 3,
    options: &["5ml", "10ml"],
};

const STANDARD_SHEET: SheetPreset = SheetPreset {
    cell_w_in: 1.0,
    cell_h_in: 0.5,
    col_gap_in: 0.0,
    row_gap_in: 0.0,
    pad_x_in: 0.25,
    pad_y_in: 0.5,
    font_px: 14.0,
    letter_spacing_px: 3.0,
    text_box: 0.70,
    brand_box: 0.30,
    logo_width: 0.80,
    logo_offset_px: -6.0,
    text_padding_px: [2.5, 5.0, 0.0, 2.5],
    text_flex: true,
    brand_padding_px: [0.0, 0.5, 2.0, 0.5],
    capture_scale: 5,
    file_name: "label3ml.pdf",
};

const LARGE_SHEET: SheetPreset = SheetPreset {
    cell_w_in: 2.5935,
    cell_h_in: 1.0,
    col_gap_in: 0.14,
    row_gap_in: 0.0,
    pad_x_in: 0.21975,
    pad_y_in: 0.5,
    font_px: 25.0,
    letter_spacing_px: 8.0,
    text_box: 0.75,
    brand_box: 0.20,
    logo_width: 0.70,
    logo_offset_px: -8.0,
    text_padding_px: [15.0, 15.0, 0.0, 15.0],
    text_flex: false,
    brand_padding_px: [5.0, 5.0, 5.0, 5.0],
    capture_scale: 3,
    file_name: "label5ml.pdf",
};

impl LayoutKind {
    pub const ALL: [LayoutKind; 2] = [LayoutKind::Standard, LayoutKind::Large];

    pub fn config(self) -> &'static LabelConfig {
        match self {
            LayoutKind::Standard => &STANDARD,
            LayoutKind::Large => &LARGE,
        }
    }

    pub fn sheet(self) -> &'static SheetPreset {
        match self {
            LayoutKind::Standard => &STANDARD_SHEET,
            LayoutKind::Large => &LARGE_SHEET,
        }
    }

    pub fn id(self) -> &'static str {
        self.config().id
    }

    /// Default volume when the layout is chosen.
    pub fn first_option(self) -> &'static str {
        self.config().options[0]
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for LayoutKind {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "small" => Ok(LayoutKind::Standard),
            "large" => Ok(LayoutKind::Large),
            other => Err(LabelError::UnknownLayout(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn presets_fill_the_page_width() {
        for kind in LayoutKind::ALL {
            let cfg = kind.config();
            let s = kind.sheet();
            let w = 2.0 * s.pad_x_in
                + cfg.cols as f64 * s.cell_w_in
                + (cfg.cols - 1) as f64 * s.col_gap_in;
            assert!((w - PAGE_W_IN).abs() < 1e-9, "{kind}: {w}");
            let h = 2.0 * s.pad_y_in + cfg.rows as f64 * s.cell_h_in;
            assert!((h - PAGE_H_IN).abs() < 1e-9, "{kind}: {h}");
        }
    }

    #[test]
    fn parse_and_options() {
        assert_eq!("Large".parse::<LayoutKind>().unwrap(), LayoutKind::Large);
        assert!(matches!("tiny".parse::<LayoutKind>(), Err(LabelError::UnknownLayout(_))));
        assert_eq!(LayoutKind::Standard.config().total(), 160);
        assert_eq!(LayoutKind::Large.first_option(), "5ml");
        assert!(LayoutKind::Standard.config().offers("3ML"));
        assert!(!LayoutKind::Standard.config().offers("5ml"));
    }
}
