//! Offline rendering of report markup.
//!
//! A surface pairs a fixed-width viewport with an injected document. The
//! document is parsed on inject, laid out on first measure, and captured
//! as an RGB bitmap spanning the full content height. Surfaces are cheap
//! and live for a single export; a process-wide counter tracks them so
//! tests can prove none leak.

mod content;
mod layout;
mod raster;
mod style;

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::fonts::FontBook;
use crate::model::{Bitmap, ExportOptions, SettleStrategy};
use content::ContentTree;
use layout::DrawList;

static LIVE_SURFACES: AtomicUsize = AtomicUsize::new(0);

/// Number of rendering surfaces currently alive in this process.
pub fn active_surfaces() -> usize {
    LIVE_SURFACES.load(Ordering::SeqCst)
}

struct Surface {
    width: u32,
    height: u32,
    content: Option<ContentTree>,
    layout: Option<DrawList>,
    fonts: FontBook,
}

impl Surface {
    fn create(width: u32, height: u32) -> Surface {
        let live = LIVE_SURFACES.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("surface created ({width}x{height}, {live} live)");
        Surface {
            width,
            height,
            content: None,
            layout: None,
            fonts: FontBook::new(),
        }
    }

    /// Parse markup and make it the surface document. Replaces any
    /// previous document and invalidates its layout.
    fn inject(&mut self, markup: &str) -> Result<()> {
        let tree = content::parse(markup)?;
        self.content = Some(tree);
        self.layout = None;
        log::debug!("markup injected ({} bytes)", markup.len());
        Ok(())
    }

    /// Content height in CSS pixels, running layout if it has not run
    /// yet. An empty surface reports its viewport height.
    fn measure(&mut self) -> f32 {
        let Some(tree) = &self.content else {
            return self.height as f32;
        };
        let width = self.width as f32;
        let fonts = &mut self.fonts;
        self.layout
            .get_or_insert_with(|| layout::lay_out(tree, width, fonts))
            .content_height
    }

    fn capture(&mut self, scale: u32) -> Result<Bitmap> {
        let content_height = self.measure();
        if scale == 0 {
            return Err(Error::Render("capture scale must be at least 1".to_string()));
        }
        if self.width == 0 || content_height <= 0.0 {
            return Err(Error::Render("content has no drawable extent".to_string()));
        }
        let Some(list) = &self.layout else {
            return Err(Error::Render("no document injected".to_string()));
        };
        Ok(raster::rasterize(list, self.width, scale, &self.fonts))
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        let live = LIVE_SURFACES.fetch_sub(1, Ordering::SeqCst) - 1;
        log::debug!("surface destroyed ({live} live)");
    }
}

/// Render report markup to pixels on a fresh surface.
///
/// The surface lives exactly as long as this call; every return path,
/// error paths included, destroys it.
pub async fn rasterize_report(markup: &str, options: &ExportOptions) -> Result<Bitmap> {
    let mut surface = Surface::create(options.surface_width, options.surface_height);
    surface.inject(markup)?;
    settle(&mut surface, &options.settle).await;
    surface.capture(options.scale)
}

/// Wait for the document to stop changing size before capture. Web fonts
/// never load here, so a fixed delay is already conservative; polling
/// re-measures until two readings agree.
async fn settle(surface: &mut Surface, strategy: &SettleStrategy) {
    match strategy {
        SettleStrategy::FixedDelay(delay) => {
            tokio::time::sleep(*delay).await;
        }
        SettleStrategy::PollUntilStable {
            interval,
            max_polls,
        } => {
            let mut last = surface.measure();
            for _ in 0..*max_polls {
                tokio::time::sleep(*interval).await;
                let height = surface.measure();
                if (height - last).abs() < f32::EPSILON {
                    break;
                }
                last = height;
            }
        }
    }
    log::debug!("content settled at {:.1}px", surface.measure());
}
