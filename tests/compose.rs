mod common;

use image::{Rgba, RgbaImage};

use roster_pdf::{Bitmap, Error, Logo, compose, placement, report_file_name};

const MM: f32 = 72.0 / 25.4;

fn sample_logo(alpha: u8) -> Logo {
    Logo {
        pixels: RgbaImage::from_pixel(60, 20, Rgba([40, 160, 220, alpha])),
    }
}

#[test]
fn page_is_a4_portrait() {
    let pdf = compose(&Bitmap::white(1190, 800), None).expect("compose");
    let media = common::media_box(&pdf);
    assert_eq!(media[0], 0.0);
    assert_eq!(media[1], 0.0);
    assert!((media[2] - 595.276).abs() < 0.05, "width {}", media[2]);
    assert!((media[3] - 841.89).abs() < 0.05, "height {}", media[3]);
}

#[test]
fn report_is_the_only_image_without_logo() {
    let pdf = compose(&Bitmap::white(1190, 800), None).expect("compose");
    assert_eq!(common::image_count(&pdf), 1);
    assert_eq!(common::count_occurrences(&pdf, b"/SMask"), 0);
}

#[test]
fn opaque_logo_adds_one_image_and_no_mask() {
    let pdf = compose(&Bitmap::white(1190, 800), Some(&sample_logo(255))).expect("compose");
    assert_eq!(common::image_count(&pdf), 2);
    assert_eq!(common::count_occurrences(&pdf, b"/SMask"), 0);
}

#[test]
fn translucent_logo_gets_a_soft_mask() {
    let pdf = compose(&Bitmap::white(1190, 800), Some(&sample_logo(128))).expect("compose");
    // the mask is itself an image XObject
    assert_eq!(common::image_count(&pdf), 3);
    assert_eq!(common::count_occurrences(&pdf, b"/SMask"), 1);
}

#[test]
fn placement_follows_aspect_until_the_page_ends() {
    let p = placement(1190, 800, false);
    assert_eq!(p.x_mm, 10.0);
    assert_eq!(p.y_mm, 10.0);
    assert_eq!(p.width_mm, 190.0);
    let expected = 800.0 * 190.0 / 1190.0;
    assert!((p.height_mm - expected).abs() < 1e-3);

    // taller than the page: height clamps, width stays put
    let clamped = placement(1190, 40_000, false);
    assert_eq!(clamped.height_mm, 277.0);
    assert_eq!(clamped.width_mm, 190.0);
}

#[test]
fn logo_pushes_the_report_down() {
    let p = placement(1190, 40_000, true);
    assert_eq!(p.y_mm, 25.0);
    assert_eq!(p.height_mm, 262.0);
}

#[test]
fn content_transform_matches_placement() {
    let pdf = compose(&Bitmap::white(1190, 800), None).expect("compose");
    let transforms = common::transforms(&pdf);
    assert_eq!(transforms.len(), 1);

    let p = placement(1190, 800, false);
    let t = transforms[0];
    assert!((t[0] - p.width_mm * MM).abs() < 0.1);
    assert!((t[3] - p.height_mm * MM).abs() < 0.1);
    assert!((t[4] - p.x_mm * MM).abs() < 0.1);
    let bottom = (297.0 - p.y_mm - p.height_mm) * MM;
    assert!((t[5] - bottom).abs() < 0.1);
}

#[test]
fn logo_sits_in_the_top_left_corner() {
    let pdf = compose(&Bitmap::white(1190, 800), Some(&sample_logo(255))).expect("compose");
    let transforms = common::transforms(&pdf);
    assert_eq!(transforms.len(), 2);

    // the logo paints first, above the report area
    let t = transforms[0];
    assert!((t[0] - 30.0 * MM).abs() < 0.1);
    assert!((t[3] - 10.0 * MM).abs() < 0.1);
    assert!((t[4] - 14.0 * MM).abs() < 0.1);
    assert!((t[5] - 277.0 * MM).abs() < 0.1);
}

#[test]
fn empty_bitmap_is_rejected() {
    let empty = Bitmap {
        width: 0,
        height: 0,
        pixels: Vec::new(),
    };
    assert!(matches!(compose(&empty, None), Err(Error::Compose(_))));
}

#[test]
fn file_name_carries_the_year() {
    assert_eq!(report_file_name(2026), "users-report-2026.pdf");
}
