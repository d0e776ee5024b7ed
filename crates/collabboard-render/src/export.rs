//! PNG export of rendered whiteboards.

use crate::raster::RasterBackend;
use crate::renderer::{DisplayList, RenderBackend, RenderError, RenderResult};
use collabboard_core::shapes::now_millis;
use std::path::{Path, PathBuf};

/// File name used for an export taken at `timestamp` (ms since epoch).
pub fn export_file_name(timestamp: u64) -> String {
    format!("whiteboard-{timestamp}.png")
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let expected = width as usize * height as usize * 4;
    if rgba_data.len() != expected {
        return Err(RenderError::RenderFailed(format!(
            "pixel buffer holds {} bytes, expected {expected}",
            rgba_data.len()
        )));
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()?;
    }
    Ok(png_data)
}

/// Rasterize `list` and encode it as PNG bytes.
pub fn render_png(list: &DisplayList, width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut backend = RasterBackend::new(width, height)?;
    backend.execute(list)?;
    encode_png(&backend.to_rgba(), width, height)
}

/// Render `list` and write it to `dir` as `whiteboard-<timestamp>.png`.
///
/// Returns the path of the written file.
pub fn export_png(list: &DisplayList, width: u32, height: u32, dir: &Path) -> RenderResult<PathBuf> {
    let png_data = render_png(list, width, height)?;
    let path = dir.join(export_file_name(now_millis()));
    std::fs::write(&path, &png_data)?;
    log::info!("PNG export complete: {} bytes to {}", png_data.len(), path.display());
    Ok(path)
}
