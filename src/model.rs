use std::path::PathBuf;
use std::time::Duration;

/// Tightly packed 8-bit RGB raster, row-major, fully opaque.
#[derive(Clone, Debug)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Allocate a bitmap filled with opaque white.
    pub fn white(width: u32, height: u32) -> Self {
        Bitmap {
            width,
            height,
            pixels: vec![0xFF; width as usize * height as usize * 3],
        }
    }
}

/// Decoded corner logo. Kept as RGBA so composition can decide whether the
/// alpha channel warrants a soft mask.
#[derive(Clone, Debug)]
pub struct Logo {
    pub pixels: image::RgbaImage,
}

/// How the renderer decides the injected content has settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettleStrategy {
    /// Wait a fixed delay, then capture.
    FixedDelay(Duration),
    /// Re-measure the content height until two consecutive measurements
    /// agree, giving up after `max_polls` polls.
    PollUntilStable { interval: Duration, max_polls: u32 },
}

impl Default for SettleStrategy {
    fn default() -> Self {
        SettleStrategy::FixedDelay(Duration::from_millis(800))
    }
}

/// Export tuning knobs.
///
/// The defaults describe an A4-proportioned 595x842 surface captured at 2x
/// device scale after an 800 ms settle delay, with the logo read from
/// `logo-placeholder.png` in the working directory.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    /// Logical viewport width of the off-screen surface, in pixels.
    pub surface_width: u32,
    /// Nominal viewport height. Capture extends to the full content height,
    /// so this only sizes the surface itself.
    pub surface_height: u32,
    /// Device scale factor applied at capture time.
    pub scale: u32,
    /// Wait executed between injection and capture.
    pub settle: SettleStrategy,
    /// Logo file drawn in the page corner. A missing or undecodable file
    /// silently yields a report without a logo.
    pub logo_path: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            surface_width: 595,
            surface_height: 842,
            scale: 2,
            settle: SettleStrategy::default(),
            logo_path: PathBuf::from("logo-placeholder.png"),
        }
    }
}

impl ExportOptions {
    pub fn with_surface_size(mut self, width: u32, height: u32) -> Self {
        self.surface_width = width;
        self.surface_height = height;
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_settle(mut self, settle: SettleStrategy) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = path.into();
        self
    }
}
