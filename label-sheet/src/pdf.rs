//! Native letter-size PDF of a label sheet.
//!
//! Text is set in the base-14 Helvetica font, so only ASCII survives; anything
//! else is replaced by `?`.

use std::io::Cursor;

use anyhow::{Context, Result, bail};
use label_core::render::{SheetPlan, text_width_px};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

const PT_PER_IN: f32 = 72.0;
/// CSS px to PDF points.
const PT_PER_PX: f32 = 0.75;

/// Decoded logo, split into colour and alpha planes.
pub struct Logo {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

impl Logo {
    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info().context("reading PNG header")?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).context("decoding PNG frame")?;
        let data = &buf[..info.buffer_size()];
        let px = (info.width * info.height) as usize;

        let (rgb, alpha) = match info.color_type {
            png::ColorType::Rgb => (data.to_vec(), None),
            png::ColorType::Rgba => {
                let mut rgb = Vec::with_capacity(px * 3);
                let mut alpha = Vec::with_capacity(px);
                for p in data.chunks_exact(4) {
                    rgb.extend_from_slice(&p[..3]);
                    alpha.push(p[3]);
                }
                (rgb, Some(alpha))
            }
            png::ColorType::Grayscale => (data.iter().flat_map(|&g| [g, g, g]).collect(), None),
            png::ColorType::GrayscaleAlpha => {
                let mut rgb = Vec::with_capacity(px * 3);
                let mut alpha = Vec::with_capacity(px);
                for p in data.chunks_exact(2) {
                    rgb.extend_from_slice(&[p[0], p[0], p[0]]);
                    alpha.push(p[1]);
                }
                (rgb, Some(alpha))
            }
            other => bail!("unsupported PNG colour type {other:?}"),
        };
        Ok(Logo {
            width: info.width,
            height: info.height,
            rgb,
            alpha,
        })
    }
}

fn ascii(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' })
        .collect()
}

/// Write the mapped cells of `plan` as a one-page PDF.
pub fn sheet_pdf(plan: &SheetPlan, logo: Option<&Logo>) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let font_id = Ref::new(4);
    let content_id = Ref::new(5);
    let image_id = Ref::new(6);
    let mask_id = Ref::new(7);
    let font_name = Name(b"F1");
    let image_name = Name(b"Im1");

    let page_h = label_core::layout::PAGE_H_IN as f32 * PT_PER_IN;
    let page_w = label_core::layout::PAGE_W_IN as f32 * PT_PER_IN;
    let preset = plan.layout.sheet();
    let spacing_pt = preset.letter_spacing_px as f32 * PT_PER_PX;

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id).kids([page_id]).count(1);
    {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, page_w, page_h));
        page.parent(tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        resources.fonts().pair(font_name, font_id);
        if logo.is_some() {
            resources.x_objects().pair(image_name, image_id);
        }
    }
    pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

    let mut content = Content::new();
    content.set_fill_gray(0.0);
    for cell in plan.mapped() {
        let size_pt = cell.fitted.font_px as f32 * PT_PER_PX;
        let area = cell.text_area;
        let cx = (area.left + area.width() / 2.0) as f32 * PT_PER_IN;
        // PDF y grows upwards.
        let cy = page_h - (area.top + area.height() / 2.0) as f32 * PT_PER_IN;
        let n = cell.fitted.lines.len() as f32;
        for (i, line) in cell.fitted.lines.iter().enumerate() {
            let w_px = text_width_px(
                line.chars().count(),
                cell.fitted.font_px,
                preset.letter_spacing_px,
            );
            let x = cx - w_px as f32 * PT_PER_PX / 2.0;
            let y = cy + ((n - 1.0) / 2.0 - i as f32) * size_pt - size_pt * 0.35;
            content.begin_text();
            content.set_font(font_name, size_pt);
            content.set_char_spacing(spacing_pt);
            content.next_line(x, y);
            content.show(Str(&ascii(line)));
            content.end_text();
        }

        if let Some(logo) = logo {
            let box_w = cell.logo_area.width() as f32 * PT_PER_IN;
            let box_h = cell.logo_area.height() as f32 * PT_PER_IN;
            let mut w = box_w * preset.logo_width as f32;
            let mut h = w * logo.height as f32 / logo.width.max(1) as f32;
            if h > box_h {
                w *= box_h / h;
                h = box_h;
            }
            let x = cell.logo_area.left as f32 * PT_PER_IN
                + (box_w - w) / 2.0
                + preset.logo_offset_px as f32 * PT_PER_PX;
            let y = page_h - cell.logo_area.bottom as f32 * PT_PER_IN + (box_h - h) / 2.0;
            content.save_state();
            content.transform([w, 0.0, 0.0, h, x, y]);
            content.x_object(image_name);
            content.restore_state();
        }
    }
    pdf.stream(content_id, &content.finish());

    if let Some(logo) = logo {
        {
            let mut image = pdf.image_xobject(image_id, &logo.rgb);
            image.width(logo.width as i32);
            image.height(logo.height as i32);
            image.color_space().device_rgb();
            image.bits_per_component(8);
            if logo.alpha.is_some() {
                image.s_mask(mask_id);
            }
        }
        if let Some(alpha) = &logo.alpha {
            let mut mask = pdf.image_xobject(mask_id, alpha);
            mask.width(logo.width as i32);
            mask.height(logo.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
        }
    }

    log::debug!("pdf: {} labels written", plan.mapped().count());
    pdf.finish()
}
