//! Turns a draw list into RGB pixels.
//!
//! Glyph outlines are flattened to polylines and filled with a nonzero
//! winding scanline pass. No antialiasing; captures run at an integer
//! scale factor instead, which is how the export pipeline gets its
//! resolution.

use ttf_parser::OutlineBuilder;

use crate::fonts::{FontBook, FontId, synthetic_advance};
use crate::model::Bitmap;
use crate::render::layout::{DrawList, DrawOp};

pub(crate) fn rasterize(list: &DrawList, width: u32, scale: u32, fonts: &FontBook) -> Bitmap {
    let scale_f = scale as f32;
    let height = (list.content_height.ceil().max(1.0)) as u32 * scale;
    let mut bitmap = Bitmap::white(width * scale, height);

    for op in &list.ops {
        match op {
            DrawOp::Rect { x, y, w, h, color } => fill_rect(
                &mut bitmap,
                x * scale_f,
                y * scale_f,
                w * scale_f,
                h * scale_f,
                *color,
            ),
            DrawOp::Text {
                x,
                baseline,
                text,
                font,
                size,
                color,
            } => draw_text(
                &mut bitmap,
                fonts,
                x * scale_f,
                baseline * scale_f,
                text,
                *font,
                size * scale_f,
                *color,
            ),
        }
    }
    bitmap
}

fn put(bitmap: &mut Bitmap, x: u32, y: u32, color: [u8; 3]) {
    let idx = ((y * bitmap.width + x) * 3) as usize;
    bitmap.pixels[idx..idx + 3].copy_from_slice(&color);
}

fn fill_rect(bitmap: &mut Bitmap, x: f32, y: f32, w: f32, h: f32, color: [u8; 3]) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let x0 = x.round().max(0.0) as u32;
    let y0 = y.round().max(0.0) as u32;
    let x1 = (x + w).round().min(bitmap.width as f32) as u32;
    let y1 = (y + h).round().min(bitmap.height as f32) as u32;
    for yy in y0..y1 {
        for xx in x0..x1 {
            put(bitmap, xx, yy, color);
        }
    }
}

fn draw_text(
    bitmap: &mut Bitmap,
    fonts: &FontBook,
    x: f32,
    baseline: f32,
    text: &str,
    font: FontId,
    size: f32,
    color: [u8; 3],
) {
    fonts.with_face(font, |face| match face {
        Some((face, upem)) => {
            let mut pen_x = x;
            for ch in text.chars() {
                let glyph = face.glyph_index(ch);
                let advance = glyph
                    .and_then(|g| face.glyph_hor_advance(g))
                    .map(|adv| f32::from(adv) * size / upem)
                    .unwrap_or_else(|| size * synthetic_advance(ch));
                let mut outlined = false;
                if let Some(glyph) = glyph {
                    let mut pen = OutlinePen::new(pen_x, baseline, size / upem);
                    if face.outline_glyph(glyph, &mut pen).is_some() {
                        let contours = pen.finish();
                        if !contours.is_empty() {
                            fill_contours(bitmap, &contours, color);
                            outlined = true;
                        }
                    }
                }
                if !outlined && !ch.is_whitespace() {
                    placeholder_box(bitmap, pen_x, baseline, advance, size, color);
                }
                pen_x += advance;
            }
        }
        // No face file anywhere on the system. Advance with the synthetic
        // metrics and mark each glyph so text still occupies its box.
        None => {
            let mut pen_x = x;
            for ch in text.chars() {
                let advance = size * synthetic_advance(ch);
                if !ch.is_whitespace() {
                    placeholder_box(bitmap, pen_x, baseline, advance, size, color);
                }
                pen_x += advance;
            }
        }
    });
}

fn placeholder_box(bitmap: &mut Bitmap, x: f32, baseline: f32, advance: f32, size: f32, color: [u8; 3]) {
    let w = (advance * 0.8).max(1.0);
    let h = size * 0.62;
    fill_rect(bitmap, x + advance * 0.1, baseline - h, w, h, color);
}

/// Flattens glyph outlines into closed polylines. Font space is y-up with
/// the origin on the baseline; the pen flips into bitmap space as it goes.
struct OutlinePen {
    origin_x: f32,
    origin_y: f32,
    unit: f32,
    current: (f32, f32),
    contour: Vec<(f32, f32)>,
    contours: Vec<Vec<(f32, f32)>>,
}

impl OutlinePen {
    fn new(origin_x: f32, origin_y: f32, unit: f32) -> Self {
        OutlinePen {
            origin_x,
            origin_y,
            unit,
            current: (origin_x, origin_y),
            contour: Vec::new(),
            contours: Vec::new(),
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.unit, self.origin_y - y * self.unit)
    }

    fn flush(&mut self) {
        if self.contour.len() > 1 {
            self.contours.push(std::mem::take(&mut self.contour));
        } else {
            self.contour.clear();
        }
    }

    fn finish(mut self) -> Vec<Vec<(f32, f32)>> {
        self.flush();
        self.contours
    }
}

impl OutlineBuilder for OutlinePen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.point(x, y);
        self.current = p;
        self.contour.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.current = p;
        self.contour.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let from = self.current;
        let ctrl = self.point(x1, y1);
        let end = self.point(x, y);
        const SEGMENTS: u32 = 8;
        for i in 1..=SEGMENTS {
            let t = i as f32 / SEGMENTS as f32;
            let mt = 1.0 - t;
            self.contour.push((
                mt * mt * from.0 + 2.0 * mt * t * ctrl.0 + t * t * end.0,
                mt * mt * from.1 + 2.0 * mt * t * ctrl.1 + t * t * end.1,
            ));
        }
        self.current = end;
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let from = self.current;
        let c1 = self.point(x1, y1);
        let c2 = self.point(x2, y2);
        let end = self.point(x, y);
        const SEGMENTS: u32 = 16;
        for i in 1..=SEGMENTS {
            let t = i as f32 / SEGMENTS as f32;
            let mt = 1.0 - t;
            self.contour.push((
                mt * mt * mt * from.0
                    + 3.0 * mt * mt * t * c1.0
                    + 3.0 * mt * t * t * c2.0
                    + t * t * t * end.0,
                mt * mt * mt * from.1
                    + 3.0 * mt * mt * t * c1.1
                    + 3.0 * mt * t * t * c2.1
                    + t * t * t * end.1,
            ));
        }
        self.current = end;
    }

    fn close(&mut self) {
        self.flush();
    }
}

/// Nonzero winding scanline fill. Contours are treated as closed; the
/// edge back to the first point is implicit.
fn fill_contours(bitmap: &mut Bitmap, contours: &[Vec<(f32, f32)>], color: [u8; 3]) {
    if bitmap.height == 0 || bitmap.width == 0 {
        return;
    }
    let mut min_y = f32::MAX;
    let mut max_y = f32::MIN;
    for contour in contours {
        for &(_, y) in contour {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }
    if min_y > max_y {
        return;
    }
    let y0 = min_y.floor().max(0.0) as u32;
    let y1 = max_y.ceil().min(bitmap.height as f32 - 1.0).max(0.0) as u32;

    let mut crossings: Vec<(f32, i32)> = Vec::new();
    for y in y0..=y1 {
        let sy = y as f32 + 0.5;
        crossings.clear();
        for contour in contours {
            let n = contour.len();
            if n < 2 {
                continue;
            }
            for i in 0..n {
                let (ax, ay) = contour[i];
                let (bx, by) = contour[(i + 1) % n];
                if (ay <= sy) == (by <= sy) {
                    continue;
                }
                let t = (sy - ay) / (by - ay);
                crossings.push((ax + t * (bx - ax), if by > ay { 1 } else { -1 }));
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        let mut span_start = 0.0f32;
        for &(cx, dir) in &crossings {
            if winding == 0 {
                span_start = cx;
            }
            winding += dir;
            if winding == 0 {
                let px0 = span_start.round().max(0.0) as u32;
                let px1 = cx.round().min(bitmap.width as f32) as u32;
                for px in px0..px1 {
                    put(bitmap, px, y, color);
                }
            }
        }
    }
}
