use serde::{Deserialize, Serialize};

use crate::layout::{LayoutKind, PAGE_H_IN, PAGE_W_IN};

/// Basic two dimensional point, y grows downwards like screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned rectangle given by its edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    /// Box spanned by two corners in any order.
    pub fn spanning(a: Point, b: Point) -> Self {
        Rect {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Overlap unless fully separated on one axis; shared edges count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.right < self.left
            || other.left > self.right
            || other.bottom < self.top
            || other.top > self.bottom)
    }
}

/// Source of cell bounding boxes for hit-testing.
pub trait CellGeometry {
    /// Every cell index with its current bounding box.
    fn cells(&self) -> Vec<(usize, Rect)>;

    /// Cell under a point, if any.
    fn cell_at(&self, p: Point) -> Option<usize> {
        self.cells()
            .into_iter()
            .find(|(_, r)| r.contains(p))
            .map(|(i, _)| i)
    }

    /// Cells whose box intersects `area`.
    fn cells_in(&self, area: &Rect) -> Vec<usize> {
        self.cells()
            .into_iter()
            .filter(|(_, r)| r.intersects(area))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Regular grid filled column by column: index `i` sits in column `i / rows`,
/// row `i % rows`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellGrid {
    pub rows: usize,
    pub cols: usize,
    pub origin: Point,
    pub cell_w: f64,
    pub cell_h: f64,
    pub col_gap: f64,
    pub row_gap: f64,
}

impl CellGrid {
    /// Grid of a layout in page units, scaled by `units_per_in`.
    pub fn for_layout(kind: LayoutKind, units_per_in: f64) -> Self {
        let cfg = kind.config();
        let s = kind.sheet();
        CellGrid {
            rows: cfg.rows,
            cols: cfg.cols,
            origin: Point {
                x: s.pad_x_in * units_per_in,
                y: s.pad_y_in * units_per_in,
            },
            cell_w: s.cell_w_in * units_per_in,
            cell_h: s.cell_h_in * units_per_in,
            col_gap: s.col_gap_in * units_per_in,
            row_gap: s.row_gap_in * units_per_in,
        }
    }

    /// Page size in the same units as the grid.
    pub fn page_size(units_per_in: f64) -> (f64, f64) {
        (PAGE_W_IN * units_per_in, PAGE_H_IN * units_per_in)
    }

    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    /// (column, row) of a cell index.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.rows, index % self.rows)
    }

    pub fn rect(&self, index: usize) -> Rect {
        let (col, row) = self.position(index);
        Rect::new(
            self.origin.x + col as f64 * (self.cell_w + self.col_gap),
            self.origin.y + row as f64 * (self.cell_h + self.row_gap),
            self.cell_w,
            self.cell_h,
        )
    }
}

impl CellGeometry for CellGrid {
    fn cells(&self) -> Vec<(usize, Rect)> {
        (0..self.total()).map(|i| (i, self.rect(i))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intersection_counts_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(a.intersects(&Rect::new(2.0, 2.0, 1.0, 1.0)));
        assert!(!a.intersects(&Rect::new(10.5, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(0.0, -6.0, 5.0, 5.0)));
    }

    #[test]
    fn cells_fill_columns_first() {
        let g = CellGrid::for_layout(LayoutKind::Standard, 1.0);
        assert_eq!(g.position(0), (0, 0));
        assert_eq!(g.position(19), (0, 19));
        assert_eq!(g.position(20), (1, 0));
        let r = g.rect(21);
        assert_eq!(r, Rect::new(1.25, 1.0, 1.0, 0.5));
    }

    #[test]
    fn hit_testing() {
        let g = CellGrid::for_layout(LayoutKind::Large, 96.0);
        let inside = g.rect(11);
        let centre = Point {
            x: (inside.left + inside.right) / 2.0,
            y: (inside.top + inside.bottom) / 2.0,
        };
        assert_eq!(g.cell_at(centre), Some(11));
        assert_eq!(g.cell_at(Point { x: 1.0, y: 1.0 }), None);
        // The column gap belongs to no cell.
        let gap = Point {
            x: g.rect(0).right + g.col_gap / 2.0,
            y: centre.y,
        };
        assert_eq!(g.cell_at(gap), None);
    }
}
