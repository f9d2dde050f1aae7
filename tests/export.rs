mod common;

use roster_pdf::{export_users_to_pdf, export_users_to_pdf_with};

const MM: f32 = 72.0 / 25.4;

#[tokio::test]
async fn default_options_produce_a_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let users = common::sample_users(2);

    // rides the stock 800 ms settle delay and the cwd-relative logo path,
    // which resolves to nothing under the test runner
    let path = export_users_to_pdf(&users, &[], dir.path())
        .await
        .expect("export");
    let bytes = std::fs::read(&path).expect("report readable");

    assert!(bytes.starts_with(b"%PDF-"));
    let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(name.starts_with("users-report-"));
    assert!(name.ends_with(".pdf"));
}

#[tokio::test]
async fn empty_record_set_exports_a_header_only_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = common::fast_options().with_logo_path(dir.path().join("missing.png"));

    let path = export_users_to_pdf_with(&[], &[], dir.path(), &options)
        .await
        .expect("export");
    let bytes = std::fs::read(&path).expect("report readable");

    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(common::image_count(&bytes), 1);
    let media = common::media_box(&bytes);
    assert!((media[2] - 595.276).abs() < 0.05);
    assert!((media[3] - 841.89).abs() < 0.05);
}

#[tokio::test]
async fn filename_is_stamped_with_the_year() {
    let dir = tempfile::tempdir().expect("tempdir");
    let users = common::sample_users(5);
    let selected = ["name".to_string(), "email".to_string()];
    let options = common::fast_options().with_logo_path(dir.path().join("missing.png"));

    let path = export_users_to_pdf_with(&users, &selected, dir.path(), &options)
        .await
        .expect("export");

    let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(name.starts_with("users-report-"));
    assert!(name.ends_with(".pdf"));
    let digits = &name["users-report-".len()..name.len() - ".pdf".len()];
    assert_eq!(digits.len(), 4);
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
    assert!(path.exists());
}

#[tokio::test]
async fn missing_logo_leaves_the_report_at_the_top_margin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let options = common::fast_options().with_logo_path(dir.path().join("absent.png"));
    let users = common::sample_users(3);

    let path = export_users_to_pdf_with(&users, &[], dir.path(), &options)
        .await
        .expect("export");
    let bytes = std::fs::read(&path).expect("report readable");

    assert_eq!(common::image_count(&bytes), 1);
    let transforms = common::transforms(&bytes);
    assert_eq!(transforms.len(), 1);
    // top edge of the image sits at the 10 mm page margin
    let top = transforms[0][5] + transforms[0][3];
    assert!((top - 287.0 * MM).abs() < 0.1, "top edge at {top}pt");
}

#[tokio::test]
async fn present_logo_shifts_the_report_down() {
    let dir = tempfile::tempdir().expect("tempdir");
    let logo_path = common::write_logo_png(dir.path());
    let options = common::fast_options().with_logo_path(&logo_path);
    let users = common::sample_users(3);

    let path = export_users_to_pdf_with(&users, &[], dir.path(), &options)
        .await
        .expect("export");
    let bytes = std::fs::read(&path).expect("report readable");

    assert_eq!(common::image_count(&bytes), 2);
    let transforms = common::transforms(&bytes);
    assert_eq!(transforms.len(), 2);
    // the report starts below the 25 mm logo band
    let top = transforms[1][5] + transforms[1][3];
    assert!((top - 272.0 * MM).abs() < 0.1, "top edge at {top}pt");

    // a second export for the same year lands on the same path
    let again = export_users_to_pdf_with(&users, &[], dir.path(), &options)
        .await
        .expect("second export");
    assert_eq!(again, path);
}
