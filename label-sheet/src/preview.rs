use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use label_core::render::{SheetPlan, sheet_svg};
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};

/// Rasterize the sheet at `px_per_in` and encode it as PNG into `out`.
pub fn render_png<W: Write>(plan: &SheetPlan, px_per_in: f64, out: W) -> Result<()> {
    let (svg, w_px, h_px) = sheet_svg(plan, px_per_in);

    let mut opt = usvg::Options::default();
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    if fontdb.is_empty() {
        log::warn!("preview: no system fonts found, labels will render without text");
    }
    opt.fontdb = Arc::new(fontdb);
    let tree = usvg::Tree::from_str(&svg, &opt).map_err(|e| anyhow!("SVG parse error: {e:?}"))?;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).context("pixmap alloc failed")?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    encode_png(&pixmap, out)
}

fn encode_png<W: Write>(pixmap: &tiny_skia::Pixmap, out: W) -> Result<()> {
    let mut enc = Encoder::new(out, pixmap.width(), pixmap.height());
    enc.set_color(ColorType::Rgba);
    enc.set_depth(BitDepth::Eight);
    enc.set_filter(FilterType::NoFilter);
    enc.set_compression(Compression::Default);
    let mut writer = enc.write_header()?;
    writer.write_image_data(pixmap.data())?;
    Ok(())
}
