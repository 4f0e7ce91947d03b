use std::collections::HashMap;
use std::path::Path;
use tiny_skia::{Pixmap, Transform};
use image::ImageReader;
use log::{debug, warn};
use std::fs;
use crate::config::Config;

const GLOBE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 15 15" fill="none" stroke="#475569" stroke-width="1">
<circle cx="7.5" cy="7.5" r="6.5"/><ellipse cx="7.5" cy="7.5" rx="3" ry="6.5"/><path d="M1 7.5h13M2 4h11M2 11h11"/></svg>"##;

const CUBE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 15 15" fill="none" stroke="#475569" stroke-width="1" stroke-linejoin="round">
<path d="M7.5 1L13.5 4.25V10.75L7.5 14L1.5 10.75V4.25Z"/><path d="M1.5 4.25L7.5 7.5L13.5 4.25M7.5 7.5V14"/></svg>"##;

const READER: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 15 15" fill="none" stroke="#475569" stroke-width="1">
<rect x="2.5" y="1.5" width="10" height="12" rx="1"/><path d="M4.5 4.5h6M4.5 7h6M4.5 9.5h4"/></svg>"##;

const MAGNIFIER: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 15 15" fill="none" stroke="#64748b" stroke-width="1.5" stroke-linecap="round">
<circle cx="6.5" cy="6.5" r="4.5"/><path d="M10 10L13.5 13.5"/></svg>"##;

fn builtin_svg(name: &str) -> Option<&'static str> {
    match name {
        "globe" => Some(GLOBE),
        "cube" => Some(CUBE),
        "reader" => Some(READER),
        "magnifier" => Some(MAGNIFIER),
        _ => None,
    }
}

/// Glyph for the categories the overlay ships with.
fn default_icon_for(category: &str) -> Option<&'static str> {
    match category {
        "Documentation" => Some("globe"),
        "Inspiration" => Some("cube"),
        "Guides" => Some("reader"),
        _ => None,
    }
}

/// Category name -> glyph lookup, resolved once at startup and handed to
/// the renderer.
pub struct IconTable {
    size: u32,
    by_category: HashMap<String, Pixmap>,
    magnifier: Option<Pixmap>,
}

impl IconTable {
    pub fn load(config: &Config, size: u32) -> Self {
        let configured: HashMap<&str, &str> = config.icon_specs().collect();
        let mut by_category = HashMap::new();

        for category in config.dataset().categories() {
            let spec = configured
                .get(category.name.as_str())
                .copied()
                .or_else(|| default_icon_for(&category.name));
            let Some(spec) = spec else { continue };

            match load_spec(spec, size) {
                Some(pixmap) => {
                    by_category.insert(category.name.clone(), pixmap);
                }
                None => warn!("Icons: could not load '{}' for category '{}'", spec, category.name),
            }
        }
        debug!("Icons: {} category icons loaded", by_category.len());

        Self {
            size,
            by_category,
            magnifier: render_svg(MAGNIFIER.as_bytes(), size),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn get(&self, category: &str) -> Option<&Pixmap> {
        self.by_category.get(category)
    }

    pub fn magnifier(&self) -> Option<&Pixmap> {
        self.magnifier.as_ref()
    }
}

fn load_spec(spec: &str, size: u32) -> Option<Pixmap> {
    if let Some(svg) = builtin_svg(spec) {
        return render_svg(svg.as_bytes(), size);
    }
    load_from_path(Path::new(spec), size)
}

fn load_from_path(path: &Path, size: u32) -> Option<Pixmap> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    match ext {
        "svg" => render_svg(&fs::read(path).ok()?, size),
        _ => load_raster(path, size),
    }
}

fn load_raster(path: &Path, size: u32) -> Option<Pixmap> {
    let img = ImageReader::open(path).ok()?.decode().ok()?;
    let img = img.resize(size, size, image::imageops::FilterType::Lanczos3);
    let mut rgba = img.into_rgba8();

    // tiny-skia expects premultiplied alpha
    for pixel in rgba.chunks_exact_mut(4) {
        let a = pixel[3] as f32 / 255.0;
        pixel[0] = (pixel[0] as f32 * a) as u8;
        pixel[1] = (pixel[1] as f32 * a) as u8;
        pixel[2] = (pixel[2] as f32 * a) as u8;
    }

    let width = rgba.width();
    let height = rgba.height();

    Pixmap::from_vec(rgba.into_vec(), tiny_skia::IntSize::from_wh(width, height)?)
}

fn render_svg(data: &[u8], size: u32) -> Option<Pixmap> {
    let opt = resvg::usvg::Options::default();
    let tree = resvg::usvg::Tree::from_data(data, &opt).ok()?;

    let mut pixmap = Pixmap::new(size, size)?;
    let transform = Transform::from_scale(
        size as f32 / tree.size().width(),
        size as f32 / tree.size().height(),
    );

    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_glyphs_render() {
        for name in ["globe", "cube", "reader", "magnifier"] {
            let pixmap = load_spec(name, 16).unwrap();
            assert_eq!((pixmap.width(), pixmap.height()), (16, 16));
            assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0), "{name}");
        }
    }

    #[test]
    fn default_dataset_gets_default_icons() {
        let table = IconTable::load(&Config::default(), 16);
        assert!(table.get("Documentation").is_some());
        assert!(table.get("Inspiration").is_some());
        assert!(table.get("Guides").is_some());
        assert!(table.get("Elsewhere").is_none());
        assert!(table.magnifier().is_some());
    }

    #[test]
    fn missing_icon_file_is_skipped() {
        assert!(load_spec("/nonexistent/icon.png", 16).is_none());
    }
}
