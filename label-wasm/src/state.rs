use std::cell::RefCell;
use std::rc::Rc;

use label_core::{Settings, Workbench};
use web_sys::{Document, Window};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Import,
    Grid,
}

/// Browser-side state shared by every callback through `Rc<RefCell<_>>`.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub bench: Workbench,
    pub settings: Settings,
    pub tab: Tab,
    /// Filter text of the import table.
    pub search: String,
    /// Auto-map is waiting on the remote sheet.
    pub loading: bool,
}

pub type Shared = Rc<RefCell<State>>;
