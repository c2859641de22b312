//! Irap ASCII surface grid codec
//!
//! Reads and writes regular 2D surface grids in the Irap ASCII format: a
//! four-line header (magic id `-996`, dimensions, origin, increments,
//! rotation) followed by the cell values with the column index cycling
//! fastest. The marker value 9999900.0 denotes an undefined cell and maps to
//! NaN in memory.

use crate::app::models::{GridGeometry, SurfaceGrid};
use crate::constants::irap;
use crate::{Error, Result};
use ndarray::Array2;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Read a surface grid from an Irap ASCII file
pub fn read_surface(path: &Path) -> Result<SurfaceGrid> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("Failed to read surface file {}", path.display()), e))?;
    parse_surface(&content)
        .map_err(|message| Error::surface_format(path.display().to_string(), message))
}

/// Write a surface grid to an Irap ASCII file
pub fn write_surface(path: &Path, surface: &SurfaceGrid) -> Result<()> {
    let content = format_surface(surface);
    std::fs::write(path, content)
        .map_err(|e| Error::io(format!("Failed to write surface file {}", path.display()), e))?;
    debug!(
        "Wrote {}x{} surface to {}",
        surface.geometry.ncol,
        surface.geometry.nrow,
        path.display()
    );
    Ok(())
}

/// Parse the textual format; errors are plain messages to be wrapped with the
/// file path by the caller
fn parse_surface(content: &str) -> std::result::Result<SurfaceGrid, String> {
    let mut tokens = content.split_whitespace();

    let mut header = [0.0_f64; 12];
    for (i, slot) in header.iter_mut().enumerate() {
        let token = tokens
            .next()
            .ok_or_else(|| format!("Truncated header: expected 12 leading fields, got {}", i))?;
        *slot = token
            .parse::<f64>()
            .map_err(|_| format!("Invalid header field '{}'", token))?;
    }

    if header[0] as i32 != irap::HEADER_ID {
        return Err(format!(
            "Unexpected header id {} (expected {})",
            header[0],
            irap::HEADER_ID
        ));
    }

    let nrow = header[1] as usize;
    let xinc = header[2];
    let yinc = header[3];
    let xori = header[4];
    let yori = header[6];
    let ncol = header[8] as usize;
    let rotation = header[9];

    // Seven reserved integer fields terminate the header
    for _ in 0..7 {
        tokens
            .next()
            .ok_or_else(|| "Truncated header: missing reserved fields".to_string())?;
    }

    let geometry = GridGeometry::new(ncol, nrow, xori, yori, xinc, yinc, rotation)
        .map_err(|e| format!("Invalid grid geometry: {}", e))?;

    let mut values = Vec::with_capacity(geometry.cell_count());
    for token in tokens {
        let value = token
            .parse::<f64>()
            .map_err(|_| format!("Invalid cell value '{}'", token))?;
        values.push(if value == irap::UNDEFINED {
            f64::NAN
        } else {
            value
        });
    }

    if values.len() != geometry.cell_count() {
        return Err(format!(
            "Expected {} cell values for a {}x{} grid, got {}",
            geometry.cell_count(),
            ncol,
            nrow,
            values.len()
        ));
    }

    let array = Array2::from_shape_vec((nrow, ncol), values)
        .map_err(|e| format!("Cell value layout error: {}", e))?;
    SurfaceGrid::new(geometry, array).map_err(|e| e.to_string())
}

fn format_surface(surface: &SurfaceGrid) -> String {
    let g = &surface.geometry;
    let xmax = g.xori + g.xinc * (g.ncol.saturating_sub(1)) as f64;
    let ymax = g.yori + g.yinc * (g.nrow.saturating_sub(1)) as f64;

    let mut out = String::new();
    let _ = writeln!(out, "{} {} {:.6} {:.6}", irap::HEADER_ID, g.nrow, g.xinc, g.yinc);
    let _ = writeln!(out, "{:.6} {:.6} {:.6} {:.6}", g.xori, xmax, g.yori, ymax);
    let _ = writeln!(out, "{} {:.6} {:.6} {:.6}", g.ncol, g.rotation, g.xori, g.yori);
    let _ = writeln!(out, "0 0 0 0 0 0 0");

    for (i, value) in surface.values.iter().enumerate() {
        let written = if value.is_nan() {
            irap::UNDEFINED
        } else {
            *value
        };
        let _ = write!(out, "{:.6}", written);
        if (i + 1) % irap::VALUES_PER_LINE == 0 {
            out.push('\n');
        } else {
            out.push(' ');
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
