use crate::error::{Error, Result};
use std::path::Path;

/// Rasterizes an SVG document to a PNG. `page_width` is the figure width in
/// points; the pixel size follows from it and `dpi`.
///
/// The pixmap starts fully transparent and nothing paints a background.
#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, page_width: f64, dpi: f64) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| Error::Raster(err.to_string()))?;
    let size = tree.size();
    // usvg resolves `pt` lengths to CSS pixels, so scale from its size.
    let scale = ((page_width * dpi / 72.0) as f32 / size.width()).max(f32::EPSILON);
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| Error::Raster(format!("failed to allocate a {width}x{height} pixmap")))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap
        .save_png(output)
        .map_err(|err| Error::Raster(err.to_string()))?;
    log::debug!("wrote {}x{} png to {}", width, height, output.display());
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _page_width: f64, _dpi: f64) -> Result<()> {
    Err(Error::UnsupportedFormat(
        "png (built without the `png` feature)".to_string(),
    ))
}
