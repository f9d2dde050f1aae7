use std::path::{Path, PathBuf};
use std::time::Duration;

use miniz_oxide::inflate::decompress_to_vec_zlib;
use serde_json::{Value, json};

use roster_pdf::{ExportOptions, SettleStrategy};

/// Records shaped like the user service payload, numbered from 1.
pub fn sample_users(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("User {i}"),
                "username": format!("user{i}"),
                "email": format!("user{i}@example.com"),
                "phone": format!("555-01{i:02}"),
                "website": format!("user{i}.example.com"),
                "company": { "name": format!("Company {i}") },
                "address": { "city": format!("City {i}") }
            })
        })
        .collect()
}

/// Default options minus the settle delay, which only slows tests down.
pub fn fast_options() -> ExportOptions {
    ExportOptions::default().with_settle(SettleStrategy::FixedDelay(Duration::ZERO))
}

/// Write a small fully opaque logo PNG and return its path.
pub fn write_logo_png(dir: &Path) -> PathBuf {
    let path = dir.join("logo-placeholder.png");
    let logo = image::RgbaImage::from_pixel(60, 20, image::Rgba([220, 40, 40, 255]));
    logo.save_with_format(&path, image::ImageFormat::Png)
        .expect("logo written");
    path
}

pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}

/// Number of image XObjects in the file, soft masks included.
pub fn image_count(pdf: &[u8]) -> usize {
    count_occurrences(pdf, b"/Image")
}

pub fn media_box(pdf: &[u8]) -> [f32; 4] {
    let text = String::from_utf8_lossy(pdf);
    let start = text.find("/MediaBox").expect("MediaBox present");
    let open = start + text[start..].find('[').expect("MediaBox array");
    let close = open + text[open..].find(']').expect("MediaBox array closed");
    let nums: Vec<f32> = text[open + 1..close]
        .split_whitespace()
        .map(|t| t.parse().expect("MediaBox number"))
        .collect();
    [nums[0], nums[1], nums[2], nums[3]]
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Decompress every stream in the file and return each as lossy text.
pub fn content_streams(pdf: &[u8]) -> Vec<String> {
    let marker = b"stream\n";
    let mut streams = Vec::new();
    let mut at = 0;
    while let Some(pos) = find(&pdf[at..], marker) {
        let hit = at + pos;
        let start = hit + marker.len();
        // "endstream\n" contains the marker too
        if hit >= 3 && &pdf[hit - 3..hit] == b"end" {
            at = start;
            continue;
        }
        let Some(len) = find(&pdf[start..], b"endstream") else {
            break;
        };
        let mut data = &pdf[start..start + len];
        while let [rest @ .., b'\n' | b'\r'] = data {
            data = rest;
        }
        if let Ok(decompressed) = decompress_to_vec_zlib(data) {
            streams.push(String::from_utf8_lossy(&decompressed).into_owned());
        }
        at = start + len;
    }
    streams
}

/// Every `cm` operator in the page content, as its six matrix numbers.
pub fn transforms(pdf: &[u8]) -> Vec<[f32; 6]> {
    let mut result = Vec::new();
    for stream in content_streams(pdf) {
        // image data decompresses too; pixel streams carry NUL bytes,
        // operator streams never do
        if stream.as_bytes().contains(&0) {
            continue;
        }
        let tokens: Vec<&str> = stream.split_whitespace().collect();
        for (i, token) in tokens.iter().enumerate() {
            if *token != "cm" || i < 6 {
                continue;
            }
            let matrix: Option<Vec<f32>> =
                tokens[i - 6..i].iter().map(|t| t.parse().ok()).collect();
            if let Some(m) = matrix {
                result.push([m[0], m[1], m[2], m[3], m[4], m[5]]);
            }
        }
    }
    result
}
