//! Print output for a label sheet.
//!
//! Three renditions share one cell plan: the standalone HTML document that the
//! browser rasterizes with html2canvas/jsPDF, an SVG used for PNG previews, and
//! the plan itself, which the native PDF writer consumes.

use crate::error::{LabelError, Result};
use crate::geometry::{CellGrid, Rect};
use crate::layout::{CSS_PX_PER_IN, LayoutKind, MIN_FONT_PX, SheetPreset};
use crate::mapping::LabelMap;
use crate::normalize::Normalizer;

/// Average advance of an upper-case sans-serif glyph, in em.
const GLYPH_EM: f64 = 0.68;

const HTML2CANVAS_URL: &str = "https://html2canvas.hertzen.com/dist/html2canvas.min.js";
const JSPDF_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/jspdf/2.5.1/jspdf.umd.min.js";
const FONT_CSS_URL: &str =
    "https://fonts.googleapis.com/css2?family=League+Spartan:wght@100..900&display=swap";

/// Text after shrink-to-fit.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedText {
    pub font_px: f64,
    pub lines: Vec<String>,
}

/// One printed cell.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedCell {
    pub index: usize,
    /// Cell box on the page, in inches from the top-left corner.
    pub cell: Rect,
    /// Text area inside the cell, same units.
    pub text_area: Rect,
    /// Logo area inside the cell, same units.
    pub logo_area: Rect,
    /// Upper-cased label text; empty for unmapped cells.
    pub text: String,
    pub fitted: FittedText,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SheetPlan {
    pub layout: LayoutKind,
    pub cells: Vec<PlannedCell>,
}

impl SheetPlan {
    pub fn mapped(&self) -> impl Iterator<Item = &PlannedCell> {
        self.cells.iter().filter(|c| !c.text.is_empty())
    }
}

/// Standalone print document and the PDF name it downloads as.
#[derive(Clone, Debug)]
pub struct PrintDocument {
    pub html: String,
    pub file_name: &'static str,
}

/// Estimated width in px of `chars` upper-case glyphs.
pub fn text_width_px(chars: usize, font_px: f64, spacing_px: f64) -> f64 {
    chars as f64 * (font_px * GLYPH_EM + spacing_px)
}

fn wrap(text: &str, font_px: f64, spacing_px: f64, max_w: f64) -> (Vec<String>, bool) {
    let mut lines: Vec<String> = Vec::new();
    let mut fits = true;
    for word in text.split_whitespace() {
        let candidate = match lines.last() {
            Some(last) => format!("{last} {word}"),
            None => word.to_string(),
        };
        if !lines.is_empty() && text_width_px(candidate.chars().count(), font_px, spacing_px) <= max_w {
            if let Some(last) = lines.last_mut() {
                *last = candidate;
            }
            continue;
        }
        if text_width_px(word.chars().count(), font_px, spacing_px) > max_w {
            fits = false;
        }
        lines.push(word.to_string());
    }
    (lines, fits)
}

/// Shrink `text` one pixel at a time until it fits `width` x `height` (px).
pub fn fit_text(text: &str, width: f64, height: f64, preset: &SheetPreset) -> FittedText {
    let mut size = preset.font_px;
    loop {
        let (lines, fits) = wrap(text, size, preset.letter_spacing_px, width);
        let tall = lines.len() as f64 * size;
        if (fits && tall <= height) || size - 1.0 < MIN_FONT_PX {
            return FittedText {
                font_px: size,
                lines,
            };
        }
        size -= 1.0;
    }
}

/// Text box of a cell in CSS px.
pub fn text_box_px(preset: &SheetPreset) -> (f64, f64) {
    let [top, right, bottom, left] = preset.text_padding_px;
    let w = preset.cell_w_in * CSS_PX_PER_IN - left - right - preset.letter_spacing_px;
    let h = preset.cell_h_in * CSS_PX_PER_IN * preset.text_box - top - bottom;
    (w.max(1.0), h.max(1.0))
}

/// Shrink an inch rect by CSS padding given in px.
fn inset_px(r: Rect, [top, right, bottom, left]: [f64; 4]) -> Rect {
    let k = 1.0 / CSS_PX_PER_IN;
    Rect {
        left: r.left + left * k,
        top: r.top + top * k,
        right: (r.right - right * k).max(r.left + left * k),
        bottom: (r.bottom - bottom * k).max(r.top + top * k),
    }
}

/// Lay out every cell of the sheet with its cleaned, fitted label.
pub fn plan_sheet(layout: LayoutKind, mapping: &LabelMap, normalizer: &Normalizer) -> SheetPlan {
    let preset = layout.sheet();
    let grid = CellGrid::for_layout(layout, 1.0);
    let (box_w, box_h) = text_box_px(preset);
    let cells = (0..grid.total())
        .map(|index| {
            let cell = grid.rect(index);
            let text_h = cell.height() * preset.text_box;
            let logo_h = cell.height() * preset.brand_box;
            let text = mapping
                .get(&index)
                .map(|v| normalizer.apply(v).to_uppercase())
                .unwrap_or_default();
            let fitted = if text.is_empty() {
                FittedText {
                    font_px: preset.font_px,
                    lines: Vec::new(),
                }
            } else {
                fit_text(&text, box_w, box_h, preset)
            };
            PlannedCell {
                index,
                cell,
                text_area: Rect::new(cell.left, cell.top, cell.width(), text_h),
                logo_area: inset_px(
                    Rect::new(cell.left, cell.top + text_h, cell.width(), logo_h),
                    preset.brand_padding_px,
                ),
                text,
                fitted,
            }
        })
        .collect();
    SheetPlan { layout, cells }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn fmt_in(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}in", v)
    } else {
        format!("{:.5}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
            + "in"
    }
}

/// Build the self-printing HTML document for the current mapping.
pub fn print_document(
    layout: LayoutKind,
    mapping: &LabelMap,
    normalizer: &Normalizer,
    logo_url: &str,
) -> Result<PrintDocument> {
    if mapping.is_empty() {
        return Err(LabelError::NothingMapped);
    }
    let cfg = layout.config();
    let p = layout.sheet();
    let mut cells = String::new();
    for i in 0..cfg.total() {
        let value = mapping.get(&i).map(|v| normalizer.apply(v)).unwrap_or_default();
        let logo = if mapping.contains_key(&i) {
            format!("<img src=\"{}\">", escape_html(logo_url))
        } else {
            String::new()
        };
        cells.push_str(&format!(
            "\n      <div class=\"label-cell\">\n        <div class=\"text-box\"><span class=\"fit-text\">{}</span></div>\n        <div class=\"brand-box\"><span class=\"fit-text\">{}</span></div>\n      </div>",
            escape_html(&value),
            logo
        ));
    }

    let [pt, pr, pb, pl] = p.text_padding_px;
    let container = format!(
        "display: grid; grid-auto-flow: column; grid-template-rows: repeat({}, {}); grid-template-columns: repeat({}, {}); gap: {} {}; padding: {} {};",
        cfg.rows,
        fmt_in(p.cell_h_in),
        cfg.cols,
        fmt_in(p.cell_w_in),
        fmt_in(p.row_gap_in),
        fmt_in(p.col_gap_in),
        fmt_in(p.pad_y_in),
        fmt_in(p.pad_x_in),
    );
    let label_cell = format!(
        "width: {}; height: {}; overflow: hidden; display: flex; flex-direction: column; box-sizing: border-box;",
        fmt_in(p.cell_w_in),
        fmt_in(p.cell_h_in)
    );
    let text_flex = if p.text_flex {
        " display: flex; justify-content: center; align-items: center; flex-direction: row;"
    } else {
        ""
    };
    let text_box = format!(
        "width: 100%; height: {:.0}%; padding: {pt}px {pr}px {pb}px {pl}px; margin: 0; box-sizing: border-box;{text_flex}",
        p.text_box * 100.0
    );
    let [bt, br, bb, bl] = p.brand_padding_px;
    let brand_box = format!(
        "width: 100%; height: {:.0}%; padding: {bt}px {br}px {bb}px {bl}px; margin: 0; box-sizing: border-box;",
        p.brand_box * 100.0
    );
    let fit_text = format!(
        "font-family: \"League Spartan\", sans-serif; text-transform: uppercase; width: 100%; height: 100%; text-align: center; display: flex; align-items: center; justify-content: center; font-size: {}px; line-height: 1; font-weight: 400; letter-spacing: {}px; padding-left: {}px;",
        p.font_px, p.letter_spacing_px, p.letter_spacing_px
    );
    let img = format!(
        "margin-left: {}px; width: {:.0}%;",
        p.logo_offset_px,
        p.logo_width * 100.0
    );

    let html = format!(
        r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Label Print Preview</title>
    <script src="{jspdf}"></script>
    <script src="{h2c}"></script>
    <link href="{font_css}" rel="stylesheet">
    <style>
      body {{ margin: 0; padding: 40px; font-family: -apple-system, sans-serif; background: #f5f5f7; display: flex; flex-direction: column; align-items: center; }}
      .container {{ position: absolute; left: -9999px; width: 8.5in; height: 11in; box-sizing: border-box; background: white; {container} }}
      .label-cell {{ {label_cell} }}
      .text-box {{ {text_box} }}
      .brand-box {{ {brand_box} }}
      .fit-text {{ {fit_text} }}
      .fit-text img {{ {img} }}
      .controls {{ margin-top: 30px; padding: 24px; background: white; border-radius: 12px; border: 1px solid #e5e5e5; text-align: center; }}
      @keyframes spin {{ 0% {{ transform: rotate(0deg); }} 100% {{ transform: rotate(360deg); }} }}
    </style>
  </head>
  <body>
    <div id="container" class="container">{cells}
    </div>
    <div class="controls">
      <div id="status-text" style="font-size: 14px; color: #86868b; margin-bottom: 8px;">Preparing your label sheet...</div>
      <div style="margin: 20px auto; width: 30px; height: 30px; border: 3px solid #f3f3f3; border-top: 3px solid #007aff; border-radius: 50%; animation: spin 1s linear infinite;"></div>
    </div>
    <script>
      function autoFitText(el) {{
        let fontSize = parseInt(window.getComputedStyle(el).fontSize);
        while ((el.scrollHeight > el.clientHeight || el.scrollWidth > el.clientWidth) && fontSize > {min_font}) {{
          fontSize--;
          el.style.fontSize = fontSize + "px";
        }}
      }}

      window.onload = function () {{
        document.querySelectorAll('.fit-text').forEach(autoFitText);
        setTimeout(function () {{ downloadElementAsPdf('container', '{file_name}'); }}, 800);
      }};

      async function downloadElementAsPdf(elementId, fileName) {{
        const statusText = document.getElementById('status-text');
        try {{
          const {{ jsPDF }} = window.jspdf;
          const element = document.getElementById(elementId);
          const canvas = await html2canvas(element, {{ scale: {scale}, useCORS: true, backgroundColor: "#ffffff" }});
          const imgData = canvas.toDataURL('image/jpeg', 1.0);
          const pdf = new jsPDF({{ orientation: "portrait", unit: "in", format: "letter" }});
          pdf.addImage(imgData, 'JPEG', 0, 0, 8.5, 11);
          pdf.setProperties({{ title: fileName }});
          window.location.replace(pdf.output('bloburl'));
        }} catch (err) {{
          console.error(err);
          statusText.textContent = "Error generating PDF. Please close this tab and try again.";
          statusText.style.color = "#ff3b30";
        }}
      }}
    </script>
  </body>
</html>
"##,
        jspdf = JSPDF_URL,
        h2c = HTML2CANVAS_URL,
        font_css = FONT_CSS_URL,
        min_font = MIN_FONT_PX,
        file_name = p.file_name,
        scale = p.capture_scale,
    );
    Ok(PrintDocument {
        html,
        file_name: p.file_name,
    })
}

/// SVG rendition of the sheet at `px_per_in`, with cell outlines and fitted text.
pub fn sheet_svg(plan: &SheetPlan, px_per_in: f64) -> (String, u32, u32) {
    let (page_w, page_h) = CellGrid::page_size(px_per_in);
    let w_px = page_w.ceil() as u32;
    let h_px = page_h.ceil() as u32;
    let preset = plan.layout.sheet();
    // Fitted sizes are CSS px; rescale to the output density.
    let k = px_per_in / CSS_PX_PER_IN;

    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"sans-serif\">\n",
        w_px, h_px, w_px, h_px
    ));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    for c in &plan.cells {
        s.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#dddddd\" stroke-width=\"1\"/>\n",
            c.cell.left * px_per_in,
            c.cell.top * px_per_in,
            c.cell.width() * px_per_in,
            c.cell.height() * px_per_in
        ));
        if c.fitted.lines.is_empty() {
            continue;
        }
        let size = c.fitted.font_px * k;
        let cx = (c.text_area.left + c.text_area.width() / 2.0) * px_per_in;
        let cy = (c.text_area.top + c.text_area.height() / 2.0) * px_per_in;
        let n = c.fitted.lines.len() as f64;
        for (i, line) in c.fitted.lines.iter().enumerate() {
            // Baselines centred around the text box middle, line-height 1.
            let y = cy + (i as f64 - (n - 1.0) / 2.0) * size + size * 0.35;
            s.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"{:.2}\" letter-spacing=\"{:.2}\" fill=\"#000000\">{}</text>\n",
                cx,
                y,
                size,
                preset.letter_spacing_px * k,
                escape_html(line)
            ));
        }
    }
    s.push_str("</svg>\n");
    (s, w_px, h_px)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_text_keeps_preset_size() {
        let p = LayoutKind::Large.sheet();
        let (w, h) = text_box_px(p);
        let f = fit_text("OUD", w, h, p);
        assert_eq!(f.font_px, 25.0);
        assert_eq!(f.lines, vec!["OUD".to_string()]);
    }

    #[test]
    fn long_text_shrinks_and_wraps() {
        let p = LayoutKind::Standard.sheet();
        let (w, h) = text_box_px(p);
        let f = fit_text("BACCARAT ROUGE 540", w, h, p);
        assert!(f.font_px < 14.0);
        assert!(f.font_px >= MIN_FONT_PX);
        assert!(f.lines.len() >= 2);
        assert_eq!(f.lines.join(" "), "BACCARAT ROUGE 540");
    }

    #[test]
    fn unfittable_text_stops_at_minimum() {
        let p = LayoutKind::Standard.sheet();
        let f = fit_text("SUPERCALIFRAGILISTICEXPIALIDOCIOUS", 20.0, 10.0, p);
        assert_eq!(f.font_px, MIN_FONT_PX);
    }

    #[test]
    fn plan_cleans_and_uppercases() {
        let n = Normalizer::bundled();
        let mapping = LabelMap::from([(21, "Creed Aventus".to_string())]);
        let plan = plan_sheet(LayoutKind::Standard, &mapping, &n);
        assert_eq!(plan.cells.len(), 160);
        let mapped: Vec<_> = plan.mapped().collect();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].index, 21);
        assert_eq!(mapped[0].text, "AVENTUS");
        assert_eq!(mapped[0].cell, Rect::new(1.25, 1.0, 1.0, 0.5));
        // Logo box sits under the text and keeps its 2px bottom padding.
        let logo = mapped[0].logo_area;
        assert!((logo.bottom - (mapped[0].cell.bottom - 2.0 / 96.0)).abs() < 1e-9);
        assert!((logo.left - (mapped[0].cell.left + 0.5 / 96.0)).abs() < 1e-9);
    }

    #[test]
    fn print_document_has_every_cell() {
        let n = Normalizer::bundled();
        let mapping = LabelMap::from([(0, "Tom Ford Oud <Wood>".to_string())]);
        let doc = print_document(LayoutKind::Large, &mapping, &n, "https://x/logo.png").unwrap();
        assert_eq!(doc.file_name, "label5ml.pdf");
        assert_eq!(doc.html.matches("class=\"label-cell\"").count(), 30);
        assert_eq!(doc.html.matches("<img src=\"https://x/logo.png\">").count(), 1);
        assert!(doc.html.contains("Oud &lt;Wood&gt;"));
        assert!(doc.html.contains("grid-template-columns: repeat(3, 2.5935in)"));
        assert!(doc.html.contains("scale: 3"));
        assert!(doc.html.contains(
            ".brand-box { width: 100%; height: 20%; padding: 5px 5px 5px 5px; margin: 0; box-sizing: border-box; }"
        ));
        assert!(doc.html.contains(
            ".text-box { width: 100%; height: 75%; padding: 15px 15px 0px 15px; margin: 0; box-sizing: border-box; }"
        ));
    }

    #[test]
    fn standard_document_centres_text_and_pads_logo() {
        let n = Normalizer::plain();
        let mapping = LabelMap::from([(5, "Rose".to_string())]);
        let doc = print_document(LayoutKind::Standard, &mapping, &n, "logo.png").unwrap();
        assert_eq!(doc.file_name, "label3ml.pdf");
        assert!(doc.html.contains(
            ".text-box { width: 100%; height: 70%; padding: 2.5px 5px 0px 2.5px; margin: 0; box-sizing: border-box; display: flex; justify-content: center; align-items: center; flex-direction: row; }"
        ));
        assert!(doc.html.contains("padding: 0px 0.5px 2px 0.5px;"));
    }

    #[test]
    fn print_requires_mapping() {
        let n = Normalizer::plain();
        let err = print_document(LayoutKind::Standard, &LabelMap::new(), &n, "").unwrap_err();
        assert!(matches!(err, LabelError::NothingMapped));
    }

    #[test]
    fn svg_draws_outlines_and_text() {
        let n = Normalizer::plain();
        let mapping = LabelMap::from([(3, "Rose".to_string())]);
        let plan = plan_sheet(LayoutKind::Large, &mapping, &n);
        let (svg, w, h) = sheet_svg(&plan, 96.0);
        assert_eq!((w, h), (816, 1056));
        assert_eq!(svg.matches("stroke=\"#dddddd\"").count(), 30);
        assert!(svg.contains(">ROSE</text>"));
    }

    #[test]
    fn inch_formatting() {
        assert_eq!(fmt_in(1.0), "1in");
        assert_eq!(fmt_in(0.21975), "0.21975in");
        assert_eq!(fmt_in(0.5), "0.5in");
    }
}
