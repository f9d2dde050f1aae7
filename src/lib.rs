//! Renders user records as a styled table and exports them to a
//! single-page A4 PDF, without a browser or a network connection.

mod columns;
mod error;
mod fonts;
mod markup;
mod model;
mod pdf;
mod render;

pub use columns::{COLUMNS, Column, ColumnDescriptor, project, resolve};
pub use error::{Error, Result};
pub use markup::build_report;
pub use model::{Bitmap, ExportOptions, Logo, SettleStrategy};
pub use pdf::{ImagePlacement, compose, load_logo, placement, report_file_name};
pub use render::{active_surfaces, rasterize_report};

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Datelike, Local};
use serde_json::Value;

/// Export `users` to `users-report-<year>.pdf` in `out_dir` with default
/// options. An existing report for the same year is overwritten.
pub async fn export_users_to_pdf(
    users: &[Value],
    selected: &[String],
    out_dir: &Path,
) -> Result<PathBuf> {
    export_users_to_pdf_with(users, selected, out_dir, &ExportOptions::default()).await
}

/// Export with explicit options. `selected` names the columns to include,
/// in order; an empty slice selects the full catalog. Returns the path of
/// the written file.
pub async fn export_users_to_pdf_with(
    users: &[Value],
    selected: &[String],
    out_dir: &Path,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let t0 = Instant::now();

    let columns = resolve(selected);
    let stamp = Local::now().format(markup::STAMP_FORMAT).to_string();
    let report = build_report(users, &columns, &stamp);
    let t_markup = t0.elapsed();

    let bitmap = rasterize_report(&report, options).await?;
    let t_render = t0.elapsed();

    let logo = load_logo(&options.logo_path).await;
    let bytes = compose(&bitmap, logo.as_ref())?;
    let t_compose = t0.elapsed();

    let path = out_dir.join(report_file_name(Local::now().year()));
    tokio::fs::write(&path, &bytes).await?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: markup={:.1}ms, render={:.1}ms, compose={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_markup.as_secs_f64() * 1000.0,
        (t_render - t_markup).as_secs_f64() * 1000.0,
        (t_compose - t_render).as_secs_f64() * 1000.0,
        (t_total - t_compose).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(path)
}
