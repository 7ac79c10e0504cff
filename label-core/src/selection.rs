//! Click and drag-rectangle selection over the label grid.
//!
//! A gesture goes idle -> dragging -> idle. The mode (add or remove) is decided
//! on press and kept until release; cells under the rubber band are only a
//! preview until the pointer is released.

use std::collections::BTreeSet;

use crate::geometry::{CellGeometry, Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Selecting,
    Deselecting,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragGesture {
    pub start: Point,
    pub current: Point,
    pub mode: DragMode,
    pub preview: BTreeSet<usize>,
}

impl DragGesture {
    /// Rubber band spanned by the press point and the pointer.
    pub fn band(&self) -> Rect {
        Rect::spanning(self.start, self.current)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Selection {
    selected: BTreeSet<usize>,
    gesture: Option<DragGesture>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn gesture(&self) -> Option<&DragGesture> {
        self.gesture.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Selected indices in ascending order.
    pub fn sorted(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn press<G: CellGeometry + ?Sized>(&mut self, at: Point, cells: &G) {
        let hit = cells.cell_at(at);
        let mode = match hit {
            Some(i) if self.selected.contains(&i) => DragMode::Deselecting,
            _ => DragMode::Selecting,
        };
        log::debug!("selection: press at ({:.1}, {:.1}) on {hit:?}, {mode:?}", at.x, at.y);
        self.gesture = Some(DragGesture {
            start: at,
            current: at,
            mode,
            preview: hit.into_iter().collect(),
        });
    }

    /// Move the pointer; recomputes the preview from the live cell boxes.
    pub fn drag_to<G: CellGeometry + ?Sized>(&mut self, at: Point, cells: &G) {
        let Some(g) = self.gesture.as_mut() else {
            return;
        };
        g.current = at;
        let band = g.band();
        g.preview = cells.cells_in(&band).into_iter().collect();
    }

    /// Commit the preview and end the gesture. Returns the number of cells touched.
    pub fn release(&mut self) -> usize {
        let Some(g) = self.gesture.take() else {
            return 0;
        };
        let on = g.mode == DragMode::Selecting;
        for idx in &g.preview {
            self.set(*idx, on);
        }
        log::debug!("selection: released, {} cells {:?}", g.preview.len(), g.mode);
        g.preview.len()
    }

    /// Abandon a gesture without committing it.
    pub fn cancel(&mut self) {
        self.gesture = None;
    }

    pub fn toggle(&mut self, index: usize) -> bool {
        let on = !self.selected.contains(&index);
        self.set(index, on);
        on
    }

    pub fn set(&mut self, index: usize, on: bool) {
        if on {
            self.selected.insert(index);
        } else {
            self.selected.remove(&index);
        }
    }

    pub fn select_all(&mut self, total: usize) {
        self.selected = (0..total).collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.gesture = None;
    }

    /// Selection as it should be drawn: the persistent set with the live
    /// preview applied.
    pub fn effective(&self) -> BTreeSet<usize> {
        let mut out = self.selected.clone();
        if let Some(g) = &self.gesture {
            for idx in &g.preview {
                match g.mode {
                    DragMode::Selecting => {
                        out.insert(*idx);
                    }
                    DragMode::Deselecting => {
                        out.remove(idx);
                    }
                }
            }
        }
        out
    }
}
