use label_core::geometry::{CellGeometry, CellGrid, Point};
use label_core::render::plan_sheet;
use label_core::{Command, Effect, LabelError, LayoutKind, Normalizer, Workbench};
use pretty_assertions::assert_eq;

const SHOP_EXPORT: &str = "\"1001\",\"Sample - Baccarat Rouge\",\"2ml\",2\n\"1002\",\"Creed Aventus\",\"3.5ml\",1\n";

fn centre<G: CellGeometry>(g: &G, index: usize) -> Point {
    let (_, r) = g.cells()[index];
    Point {
        x: (r.left + r.right) / 2.0,
        y: (r.top + r.bottom) / 2.0,
    }
}

#[test]
fn import_example_produces_three_items_and_a_blank() {
    let mut w = Workbench::new(LayoutKind::Standard, Normalizer::bundled());
    w.apply(Command::Import(SHOP_EXPORT.into())).unwrap();

    let items = w.store.items();
    assert_eq!(items.len(), 4);
    for it in &items[..2] {
        assert_eq!(it.order_number, "1001");
        assert_eq!(it.product_title, "Baccarat Rouge 540");
        assert_eq!(it.size, "2");
    }
    assert_eq!(items[2].order_number, "1002");
    assert_eq!(items[2].product_title, "Aventus");
    assert_eq!(items[2].size, "3.5");
    assert!(items[3].is_blank());
}

#[test]
fn import_drag_map_print() {
    let mut w = Workbench::new(LayoutKind::Large, Normalizer::bundled());
    w.apply(Command::Import(
        "#2001,Tom Ford Ombre Leather,5ml,1\n#2001,Nishane Hacivat,5 ml,1\n#2002,Kilian Angels Share,10ml,1\n"
            .into(),
    ))
    .unwrap();
    assert_eq!(w.volume, "5ml");

    // Drag down the first column over three cells.
    let grid = CellGrid::for_layout(w.layout, 96.0);
    w.selection.press(centre(&grid, 0), &grid);
    w.selection.drag_to(centre(&grid, 2), &grid);
    assert_eq!(w.selection.release(), 3);

    let effect = w.apply(Command::AutoMap { remote: None }).unwrap();
    assert_eq!(effect, Effect::Mapped(2));
    assert_eq!(w.mapping.get(&0).map(String::as_str), Some("Ombre Leather"));
    assert_eq!(w.mapping.get(&1).map(String::as_str), Some("Hacivat"));
    assert!(!w.mapping.contains_key(&2));
    assert!(w.selection.is_empty());

    let doc = w.print_document("https://cdn/logo.png").unwrap();
    assert_eq!(doc.file_name, "label5ml.pdf");
    assert!(doc.html.contains(">Ombre Leather</span>"));
    assert_eq!(doc.html.matches("<img ").count(), 2);

    let plan = plan_sheet(w.layout, &w.mapping, w.normalizer());
    let texts: Vec<_> = plan.mapped().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["OMBRE LEATHER", "HACIVAT"]);
}

#[test]
fn printing_and_syncing_nothing_fails() {
    let mut w = Workbench::default();
    assert!(matches!(w.print_document(""), Err(LabelError::NothingMapped)));
    assert!(matches!(w.begin_sync("1/1/2026"), Err(LabelError::NothingToSync)));
    assert!(matches!(
        w.apply(Command::AutoMap { remote: None }),
        Err(LabelError::EmptySelection)
    ));
}
