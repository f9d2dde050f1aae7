mod common;

use roster_pdf::{active_surfaces, build_report, rasterize_report, resolve};

// Single test on purpose: the live-surface counter is process-wide, and a
// second test running on another thread would shift it mid-assertion.
#[tokio::test]
async fn surfaces_never_outlive_their_export() {
    let baseline = active_surfaces();

    let markup = build_report(
        &common::sample_users(2),
        &resolve(&[]),
        "01.01.2026, 12:00",
    );
    rasterize_report(&markup, &common::fast_options())
        .await
        .expect("render");
    assert_eq!(active_surfaces(), baseline, "success path leaked");

    rasterize_report("not markup at all", &common::fast_options())
        .await
        .unwrap_err();
    assert_eq!(active_surfaces(), baseline, "parse failure leaked");

    rasterize_report("<html><head></head></html>", &common::fast_options())
        .await
        .unwrap_err();
    assert_eq!(active_surfaces(), baseline, "missing body leaked");

    let empty = r#"<html><head></head><body style="margin:0;padding:0"></body></html>"#;
    rasterize_report(empty, &common::fast_options())
        .await
        .unwrap_err();
    assert_eq!(active_surfaces(), baseline, "zero extent capture leaked");
}
