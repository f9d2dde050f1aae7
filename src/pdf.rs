use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};
use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};

use crate::error::{Error, Result};
use crate::model::{Bitmap, Logo};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const LOGO_X_MM: f32 = 14.0;
const LOGO_Y_MM: f32 = 10.0;
const LOGO_WIDTH_MM: f32 = 30.0;
const LOGO_HEIGHT_MM: f32 = 10.0;
// The report image starts below the logo band when a logo is present.
const IMAGE_TOP_WITH_LOGO_MM: f32 = 25.0;

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Where the report bitmap lands on the page, in millimetres measured
/// from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePlacement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Scale the captured bitmap onto the A4 page.
///
/// Width always spans the printable area. Height follows the bitmap
/// aspect ratio until it hits the bottom margin, then clamps; a report
/// taller than one page is compressed vertically rather than split.
pub fn placement(bitmap_width: u32, bitmap_height: u32, has_logo: bool) -> ImagePlacement {
    let y_mm = if has_logo {
        IMAGE_TOP_WITH_LOGO_MM
    } else {
        MARGIN_MM
    };
    let width_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let available_mm = PAGE_HEIGHT_MM - y_mm - MARGIN_MM;
    let height_mm = if bitmap_width == 0 {
        available_mm
    } else {
        (bitmap_height as f32 * width_mm / bitmap_width as f32).min(available_mm)
    };
    ImagePlacement {
        x_mm: MARGIN_MM,
        y_mm,
        width_mm,
        height_mm,
    }
}

/// Output file name for a given calendar year.
pub fn report_file_name(year: i32) -> String {
    format!("users-report-{year}.pdf")
}

/// Load the corner logo PNG. A missing or undecodable file is routine,
/// not an error; the export simply proceeds without a logo.
pub async fn load_logo(path: &Path) -> Option<Logo> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("no logo at {}: {e}", path.display());
            return None;
        }
    };
    match ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png).decode() {
        Ok(decoded) => Some(Logo {
            pixels: decoded.to_rgba8(),
        }),
        Err(e) => {
            log::debug!("undecodable logo at {}: {e}", path.display());
            None
        }
    }
}

/// Assemble the single-page document: the report bitmap scaled into the
/// printable area, plus the logo in the top-left corner when present.
pub fn compose(bitmap: &Bitmap, logo: Option<&Logo>) -> Result<Vec<u8>> {
    if bitmap.width == 0 || bitmap.height == 0 || bitmap.pixels.is_empty() {
        return Err(Error::Compose("report bitmap is empty".to_string()));
    }

    let mut pdf = Pdf::new();
    let mut alloc = {
        let mut next_id = 0;
        move || {
            next_id += 1;
            Ref::new(next_id)
        }
    };

    let catalog_id = alloc();
    let page_tree_id = alloc();
    let page_id = alloc();
    let content_id = alloc();

    let report_id = alloc();
    let report_w = dimension(bitmap.width)?;
    let report_h = dimension(bitmap.height)?;
    let report_samples = compress_to_vec_zlib(&bitmap.pixels, 6);
    let mut report = pdf.image_xobject(report_id, &report_samples);
    report.filter(Filter::FlateDecode);
    report.width(report_w);
    report.height(report_h);
    report.color_space().device_rgb();
    report.bits_per_component(8);
    report.finish();

    let mut logo_ref = None;
    if let Some(logo) = logo {
        let (w, h) = logo.pixels.dimensions();
        let logo_w = dimension(w)?;
        let logo_h = dimension(h)?;

        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        let mut alpha = Vec::with_capacity((w * h) as usize);
        let mut translucent = false;
        for pixel in logo.pixels.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
            if pixel.0[3] < 255 {
                translucent = true;
            }
        }

        let id = alloc();
        let smask_id = if translucent { Some(alloc()) } else { None };

        let rgb_samples = compress_to_vec_zlib(&rgb, 6);
        let mut xobj = pdf.image_xobject(id, &rgb_samples);
        xobj.filter(Filter::FlateDecode);
        xobj.width(logo_w);
        xobj.height(logo_h);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        if let Some(smask_id) = smask_id {
            xobj.s_mask(smask_id);
        }
        xobj.finish();

        if let Some(smask_id) = smask_id {
            let alpha_samples = compress_to_vec_zlib(&alpha, 6);
            let mut mask = pdf.image_xobject(smask_id, &alpha_samples);
            mask.filter(Filter::FlateDecode);
            mask.width(logo_w);
            mask.height(logo_h);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask.finish();
        }
        logo_ref = Some(id);
    }

    // PDF user space puts the origin at the bottom-left, so vertical
    // positions flip from the top-down millimetre layout.
    let mut content = Content::new();
    if logo_ref.is_some() {
        content.save_state();
        content.transform([
            mm_to_pt(LOGO_WIDTH_MM),
            0.0,
            0.0,
            mm_to_pt(LOGO_HEIGHT_MM),
            mm_to_pt(LOGO_X_MM),
            mm_to_pt(PAGE_HEIGHT_MM - LOGO_Y_MM - LOGO_HEIGHT_MM),
        ]);
        content.x_object(Name(b"Im2"));
        content.restore_state();
    }
    let report_box = placement(bitmap.width, bitmap.height, logo_ref.is_some());
    content.save_state();
    content.transform([
        mm_to_pt(report_box.width_mm),
        0.0,
        0.0,
        mm_to_pt(report_box.height_mm),
        mm_to_pt(report_box.x_mm),
        mm_to_pt(PAGE_HEIGHT_MM - report_box.y_mm - report_box.height_mm),
    ]);
    content.x_object(Name(b"Im1"));
    content.restore_state();

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(
        0.0,
        0.0,
        mm_to_pt(PAGE_WIDTH_MM),
        mm_to_pt(PAGE_HEIGHT_MM),
    ));
    page.parent(page_tree_id);
    page.contents(content_id);
    let mut resources = page.resources();
    let mut x_objects = resources.x_objects();
    x_objects.pair(Name(b"Im1"), report_id);
    if let Some(logo_id) = logo_ref {
        x_objects.pair(Name(b"Im2"), logo_id);
    }
    x_objects.finish();
    resources.finish();
    page.finish();

    let compressed = compress_to_vec_zlib(&content.finish(), 6);
    pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

    Ok(pdf.finish())
}

fn dimension(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::Compose(format!("image dimension {value} overflows")))
}
