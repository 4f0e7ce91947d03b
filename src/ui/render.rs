use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, PixmapMut, PixmapPaint, Rect, Stroke, Transform};
use cosmic_text::{Attrs, Buffer, FontSystem, Metrics, SwashCache, Weight};
use crate::config::ThemeConfig;
use crate::events::Region;
use crate::state::AppState;
use crate::ui::icons::IconTable;
use crate::ui::layout::RowKind;
use crate::ui::trigger::Trigger;

const PLACEHOLDER: &str = "Search...";

pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    icons: IconTable,
}

impl Renderer {
    pub fn new(icons: IconTable) -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            icons,
        }
    }

    pub fn draw(&mut self, pixmap: &mut PixmapMut, state: &AppState) {
        pixmap.fill(Color::TRANSPARENT);
        if state.overlay.is_visible() {
            self.draw_overlay(pixmap, state);
        } else {
            self.draw_bar(pixmap, state);
        }
    }

    fn draw_bar(&mut self, pixmap: &mut PixmapMut, state: &AppState) {
        let theme = &state.config.theme;
        let bar_color = ThemeConfig::parse_color(&theme.bar_background);
        let border_color = ThemeConfig::parse_color(&theme.border_color);
        let muted_color = ThemeConfig::parse_color(&theme.muted_text);
        let bg_color = ThemeConfig::parse_color(&theme.background);

        let width = pixmap.width() as f32;
        let height = pixmap.height() as f32;
        if let Some(rect) = Rect::from_xywh(0.0, 0.0, width, height) {
            fill_rect(pixmap, rect, bar_color);
        }
        if let Some(line) = Rect::from_xywh(0.0, height - 1.0, width, 1.0) {
            fill_rect(pixmap, line, border_color);
        }

        let trigger = state.trigger_region();
        let Some(rect) = to_rect(trigger) else { return };
        self.draw_rounded_rect(pixmap, rect, theme.border_radius * 1.5, bg_color, Some(border_color));

        let icon_size = self.icons.size() as f32;
        let mut x = trigger.x + theme.padding;
        let icon_y = trigger.y + (trigger.height - icon_size) / 2.0;
        if let Some(icon) = self.icons.magnifier() {
            draw_icon(pixmap, icon, x, icon_y);
            x += icon_size + 8.0;
        }
        let text_y = trigger.y + (trigger.height - 14.0) / 2.0;
        self.draw_text(pixmap, Trigger::LABEL, x, text_y, 14.0, muted_color, Weight::MEDIUM);

        let hint_width = self.measure_text(Trigger::HINT, 11.0) + 12.0;
        let hint_x = trigger.right() - theme.padding - hint_width;
        let hint_h = 20.0;
        let hint_y = trigger.y + (trigger.height - hint_h) / 2.0;
        if let Some(hint) = Rect::from_xywh(hint_x, hint_y, hint_width, hint_h) {
            let kbd_bg = ThemeConfig::parse_color(&theme.selection_background);
            self.draw_rounded_rect(pixmap, hint, 4.0, kbd_bg, Some(border_color));
            self.draw_text(pixmap, Trigger::HINT, hint_x + 6.0, hint_y + 4.0, 11.0, muted_color, Weight::MEDIUM);
        }
    }

    fn draw_overlay(&mut self, pixmap: &mut PixmapMut, state: &AppState) {
        let theme = &state.config.theme;
        let backdrop = ThemeConfig::parse_color(&theme.backdrop);
        let bg_color = ThemeConfig::parse_color(&theme.background);
        let border_color = ThemeConfig::parse_color(&theme.border_color);
        let text_color = ThemeConfig::parse_color(&theme.text);
        let muted_color = ThemeConfig::parse_color(&theme.muted_text);
        let sel_bg_color = ThemeConfig::parse_color(&theme.selection_background);

        let width = pixmap.width() as f32;
        let height = pixmap.height() as f32;
        if let Some(rect) = Rect::from_xywh(0.0, 0.0, width, height) {
            fill_rect(pixmap, rect, backdrop);
        }

        let layout = state.popover_layout();
        let Some(container) = to_rect(layout.container) else { return };
        self.draw_rounded_rect(pixmap, container, theme.border_radius, bg_color, Some(border_color));

        // Input row
        let input = layout.input;
        let icon_size = self.icons.size() as f32;
        let mut x = input.x + theme.padding;
        if let Some(icon) = self.icons.magnifier() {
            draw_icon(pixmap, icon, x, input.y + (input.height - icon_size) / 2.0);
            x += icon_size + 8.0;
        }
        let text_y = input.y + (input.height - 16.0) / 2.0;
        let query = state.overlay.query();
        if query.is_empty() {
            self.draw_text(pixmap, PLACEHOLDER, x, text_y, 16.0, muted_color, Weight::NORMAL);
        } else {
            self.draw_text(pixmap, query, x, text_y, 16.0, text_color, Weight::NORMAL);
        }
        if state.input_focused {
            let caret_x = x + self.measure_text(query, 16.0) + 1.0;
            if let Some(caret) = Rect::from_xywh(caret_x, text_y, 1.5, 18.0) {
                fill_rect(pixmap, caret, text_color);
            }
        }

        let results = state.overlay.results();
        if results.is_empty() {
            return;
        }
        if let Some(line) = Rect::from_xywh(input.x, input.bottom() - 1.0, input.width, 1.0) {
            fill_rect(pixmap, line, border_color);
        }

        for row in &layout.rows {
            let region = row.region;
            match row.kind {
                RowKind::Header(group) => {
                    let Some(group) = results.groups.get(group) else { continue };
                    let y = region.y + (region.height - 12.0) / 2.0;
                    self.draw_text(pixmap, &group.category, region.x + 8.0, y, 12.0, text_color, Weight::EXTRA_BOLD);
                }
                RowKind::Item(index) => {
                    let Some((group, entry)) = results.flat_items().nth(index) else { continue };
                    if index == state.selected_index {
                        if let Some(sel) = Rect::from_xywh(region.x + 4.0, region.y + 2.0, region.width - 8.0, region.height - 4.0) {
                            self.draw_rounded_rect(pixmap, sel, theme.border_radius / 2.0, sel_bg_color, None);
                        }
                    }

                    let mut text_x = region.x + 16.0;
                    if let Some(icon) = self.icons.get(&group.category) {
                        draw_icon(pixmap, icon, text_x, region.y + (region.height - icon_size) / 2.0);
                        text_x += icon_size + 8.0;
                    }
                    let y = region.y + (region.height - 16.0) / 2.0;
                    self.draw_text(pixmap, &entry.label, text_x, y, 16.0, text_color, Weight::MEDIUM);
                }
            }
        }
    }

    fn draw_rounded_rect(&self, pixmap: &mut PixmapMut, rect: Rect, radius: f32, fill: Color, stroke: Option<Color>) {
        let Some(path) = rounded_rect_path(rect, radius) else { return };
        pixmap.fill_path(&path, &solid(fill), FillRule::Winding, Transform::identity(), None);
        if let Some(color) = stroke {
            let hairline = Stroke { width: 1.0, ..Stroke::default() };
            pixmap.stroke_path(&path, &solid(color), &hairline, Transform::identity(), None);
        }
    }

    fn shape(&mut self, text: &str, size: f32, width: Option<f32>, weight: Weight) -> Buffer {
        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(size, size * 1.2));
        buffer.set_size(&mut self.font_system, width, None);
        buffer.set_text(&mut self.font_system, text, Attrs::new().weight(weight), cosmic_text::Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    fn measure_text(&mut self, text: &str, size: f32) -> f32 {
        let buffer = self.shape(text, size, None, Weight::NORMAL);
        buffer
            .layout_runs()
            .map(|run| run.line_w)
            .fold(0.0, f32::max)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(&mut self, pixmap: &mut PixmapMut, text: &str, x: f32, y: f32, size: f32, color: Color, weight: Weight) {
        let mut buffer = self.shape(text, size, Some(pixmap.width() as f32 - x), weight);
        let color = color.to_color_u8();
        let ink = cosmic_text::Color::rgba(color.red(), color.green(), color.blue(), color.alpha());
        let (max_x, max_y) = (pixmap.width() as i32, pixmap.height() as i32);
        let (origin_x, origin_y) = (x as i32, y as i32);

        buffer.draw(&mut self.font_system, &mut self.swash_cache, ink, |gx, gy, w, h, glyph| {
            let (px, py) = (gx + origin_x, gy + origin_y);
            if !(0..max_x).contains(&px) || !(0..max_y).contains(&py) {
                return;
            }
            if let Some(span) = Rect::from_xywh(px as f32, py as f32, w as f32, h as f32) {
                let shade = Color::from_rgba8(glyph.r(), glyph.g(), glyph.b(), glyph.a());
                pixmap.fill_rect(span, &solid(shade), Transform::identity(), None);
            }
        });
    }
}

/// Outline of `rect` with every corner rounded by `radius`, clamped to
/// half the shorter side.
fn rounded_rect_path(rect: Rect, radius: f32) -> Option<Path> {
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    let (left, top, right, bottom) = (rect.left(), rect.top(), rect.right(), rect.bottom());

    let mut pb = PathBuilder::new();
    pb.move_to(left + r, top);
    // Each side runs into the corner ahead, which is drawn as a quad
    // through the corner point.
    let corners = [
        ((right - r, top), (right, top), (right, top + r)),
        ((right, bottom - r), (right, bottom), (right - r, bottom)),
        ((left + r, bottom), (left, bottom), (left, bottom - r)),
        ((left, top + r), (left, top), (left + r, top)),
    ];
    for ((lx, ly), (cx, cy), (ex, ey)) in corners {
        pb.line_to(lx, ly);
        pb.quad_to(cx, cy, ex, ey);
    }
    pb.close();
    pb.finish()
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn to_rect(region: Region) -> Option<Rect> {
    Rect::from_xywh(region.x, region.y, region.width, region.height)
}

fn fill_rect(pixmap: &mut PixmapMut, rect: Rect, color: Color) {
    pixmap.fill_rect(rect, &solid(color), Transform::identity(), None);
}

fn draw_icon(pixmap: &mut PixmapMut, icon: &Pixmap, x: f32, y: f32) {
    pixmap.draw_pixmap(x as i32, y as i32, icon.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_path_stays_inside_its_rect() {
        let rect = Rect::from_xywh(10.0, 20.0, 100.0, 40.0).unwrap();
        let path = rounded_rect_path(rect, 8.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 10.0);
        assert_eq!(bounds.top(), 20.0);
        assert_eq!(bounds.right(), 110.0);
        assert_eq!(bounds.bottom(), 60.0);
    }

    #[test]
    fn oversized_radius_is_clamped() {
        let rect = Rect::from_xywh(0.0, 0.0, 20.0, 10.0).unwrap();
        let path = rounded_rect_path(rect, 50.0).unwrap();
        assert_eq!(path.bounds().width(), 20.0);
        assert_eq!(path.bounds().height(), 10.0);
    }
}
