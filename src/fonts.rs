use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use memmap2::Mmap;
use ttf_parser::Face;

/// (lowercase family name, bold) -> (file path, face index within TTC)
type FontLookup = HashMap<(String, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

/// Families tried for the generic `sans-serif` keyword, and as the last
/// resort when nothing in the requested stack is installed.
const GENERIC_SANS: [&str; 5] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

fn font_family_name(face: &Face) -> Option<String> {
    // ID 1 (Family) distinguishes variants like "Noto Sans Display" from
    // "Noto Sans", which is what the lookup keys on.
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn read_font_style(data: &[u8], face_index: u32) -> Option<(String, bool)> {
    let face = Face::parse(data, face_index).ok()?;
    // The report never sets italic text, so italic faces are not indexed.
    if face.is_italic() {
        return None;
    }
    let family = font_family_name(&face)?;
    Some((family, face.is_bold()))
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    // 1. User-configured directories via ROSTER_PDF_FONTS env var
    if let Ok(val) = std::env::var("ROSTER_PDF_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    // 2. Platform-specific system font directories
    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(&home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn is_font_collection(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttc"))
}

fn scan_font_dirs() -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut files_parsed = 0u32;
    let mut visited_dirs: HashSet<PathBuf> = HashSet::new();

    let mut stack: Vec<PathBuf> = font_directories();
    while let Some(dir) = stack.pop() {
        if !visited_dirs.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let face_count = if is_font_collection(&path) {
                ttf_parser::fonts_in_collection(&data).unwrap_or(1)
            } else {
                1
            };
            files_parsed += 1;
            for face_idx in 0..face_count {
                if let Some((family, bold)) = read_font_style(&data, face_idx) {
                    index
                        .entry((family.to_lowercase(), bold))
                        .or_insert((path.clone(), face_idx));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} files parsed, {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        files_parsed,
        index.len(),
    );

    index
}

/// Look up a font file by family name and weight. Falls back to the regular
/// variant when no bold face is installed.
fn find_font_file(family: &str, bold: bool) -> Option<(PathBuf, u32)> {
    let index = FONT_INDEX.get_or_init(scan_font_dirs);
    let key = family.to_lowercase();
    index
        .get(&(key.clone(), bold))
        .or_else(|| if bold { index.get(&(key, false)) } else { None })
        .cloned()
}

/// Approximate Helvetica advance ratios, used when no installed face covers
/// a character or no face is installed at all.
pub(crate) fn synthetic_advance(ch: char) -> f32 {
    match ch {
        ' ' => 0.278,
        'f' | 'i' | 'j' | 'l' | 't' => 0.278,
        'm' | 'w' => 0.833,
        'I' | 'J' => 0.278,
        'M' | 'W' => 0.833,
        '0'..='9' => 0.556,
        'A'..='Z' => 0.667,
        _ if ch.is_ascii_punctuation() => 0.333,
        _ => 0.556,
    }
}

enum FaceData {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl FaceData {
    fn bytes(&self) -> &[u8] {
        match self {
            FaceData::Mapped(map) => map,
            FaceData::Owned(vec) => vec,
        }
    }
}

struct LoadedFace {
    /// `None` marks the synthetic fallback entry.
    data: Option<FaceData>,
    face_index: u32,
    units_per_em: f32,
    line_h_ratio: f32,
    ascender_ratio: f32,
}

/// Handle into a [`FontBook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FontId(usize);

/// Faces loaded for one surface: resolves font stacks against the system
/// index, measures text and hands parsed faces to the rasterizer.
pub(crate) struct FontBook {
    faces: Vec<LoadedFace>,
    by_request: HashMap<(String, bool), FontId>,
    advance_cache: HashMap<(FontId, char), f32>,
}

impl FontBook {
    pub(crate) fn new() -> Self {
        // Entry 0 is the synthetic fallback: Helvetica-like metrics with no
        // outlines behind them.
        FontBook {
            faces: vec![LoadedFace {
                data: None,
                face_index: 0,
                units_per_em: 1000.0,
                line_h_ratio: 1.2,
                ascender_ratio: 0.75,
            }],
            by_request: HashMap::new(),
            advance_cache: HashMap::new(),
        }
    }

    /// Resolve a font stack to a loaded face. Generic keywords expand to
    /// common system sans faces; when nothing in the stack is installed the
    /// synthetic fallback keeps layout going.
    pub(crate) fn resolve(&mut self, families: &[String], bold: bool) -> FontId {
        let request = (families.join(",").to_lowercase(), bold);
        if let Some(&id) = self.by_request.get(&request) {
            return id;
        }

        let mut candidates: Vec<&str> = Vec::new();
        for family in families {
            if family.eq_ignore_ascii_case("sans-serif")
                || family.eq_ignore_ascii_case("serif")
                || family.eq_ignore_ascii_case("monospace")
            {
                candidates.extend(GENERIC_SANS);
            } else {
                candidates.push(family);
            }
        }
        if candidates.is_empty() {
            candidates.extend(GENERIC_SANS);
        }

        for candidate in candidates {
            let Some((path, face_index)) = find_font_file(candidate, bold) else {
                continue;
            };
            if let Some(id) = self.load_face(&path, face_index) {
                log::debug!("resolved [{}] bold={bold} to {}", families.join(", "), path.display());
                self.by_request.insert(request, id);
                return id;
            }
        }

        log::warn!(
            "no usable font for [{}] bold={bold}; falling back to synthetic metrics",
            families.join(", "),
        );
        self.by_request.insert(request, FontId(0));
        FontId(0)
    }

    fn load_face(&mut self, path: &Path, face_index: u32) -> Option<FontId> {
        let file = std::fs::File::open(path).ok()?;
        let data = match unsafe { Mmap::map(&file) } {
            Ok(map) => FaceData::Mapped(map),
            Err(_) => FaceData::Owned(std::fs::read(path).ok()?),
        };
        let (units_per_em, line_h_ratio, ascender_ratio) = {
            let face = Face::parse(data.bytes(), face_index).ok()?;
            let units = face.units_per_em() as f32;
            (
                units,
                (face.ascender() as f32 - face.descender() as f32 + face.line_gap() as f32)
                    / units,
                face.ascender() as f32 / units,
            )
        };
        self.faces.push(LoadedFace {
            data: Some(data),
            face_index,
            units_per_em,
            line_h_ratio,
            ascender_ratio,
        });
        Some(FontId(self.faces.len() - 1))
    }

    pub(crate) fn line_h_ratio(&self, id: FontId) -> f32 {
        self.faces[id.0].line_h_ratio
    }

    pub(crate) fn ascender_ratio(&self, id: FontId) -> f32 {
        self.faces[id.0].ascender_ratio
    }

    /// Advance of one character as a fraction of the font size.
    pub(crate) fn advance_ratio(&mut self, id: FontId, ch: char) -> f32 {
        if let Some(&cached) = self.advance_cache.get(&(id, ch)) {
            return cached;
        }
        let ratio = self.with_face(id, |face| match face {
            Some((face, units)) => face
                .glyph_index(ch)
                .and_then(|gid| face.glyph_hor_advance(gid))
                .map(|adv| adv as f32 / units)
                .unwrap_or_else(|| synthetic_advance(ch)),
            None => synthetic_advance(ch),
        });
        self.advance_cache.insert((id, ch), ratio);
        ratio
    }

    /// Advance width of `text` at `size` pixels.
    pub(crate) fn text_width(&mut self, id: FontId, text: &str, size: f32) -> f32 {
        text.chars().map(|ch| self.advance_ratio(id, ch) * size).sum()
    }

    /// Run `f` with the parsed face behind `id`, or `None` for the synthetic
    /// fallback. Faces are parsed on demand; the bytes stay mapped.
    pub(crate) fn with_face<R>(&self, id: FontId, f: impl FnOnce(Option<(&Face, f32)>) -> R) -> R {
        let entry = &self.faces[id.0];
        match &entry.data {
            Some(data) => match Face::parse(data.bytes(), entry.face_index) {
                Ok(face) => f(Some((&face, entry.units_per_em))),
                Err(_) => f(None),
            },
            None => f(None),
        }
    }
}
