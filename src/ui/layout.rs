use crate::config::ThemeConfig;
use crate::events::Region;
use crate::model::SearchResult;

const TRIGGER_WIDTH: f32 = 280.0;
const TRIGGER_MARGIN: f32 = 6.0;

/// Trigger button position inside the bar.
pub fn trigger(width: f32, bar_height: f32) -> Region {
    let w = TRIGGER_WIDTH.min(width - 2.0 * TRIGGER_MARGIN).max(0.0);
    let h = (bar_height - 2.0 * TRIGGER_MARGIN).max(0.0);
    Region::new((width - w) / 2.0, TRIGGER_MARGIN, w, h)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Category heading, by group index.
    Header(usize),
    /// Result item, by index into the flattened item list.
    Item(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopoverLayout {
    pub container: Region,
    pub input: Region,
    pub list: Region,
    /// Rows fully inside the visible part of the list.
    pub rows: Vec<Row>,
}

impl PopoverLayout {
    pub fn item_at(&self, x: f32, y: f32) -> Option<usize> {
        self.rows.iter().find_map(|row| match row.kind {
            RowKind::Item(index) if row.region.contains(x, y) => Some(index),
            _ => None,
        })
    }
}

fn header_height(theme: &ThemeConfig) -> f32 {
    (theme.row_height * 0.75).round()
}

/// Centred popover for a `width` x `height` surface. The list scrolls so
/// the selected item is visible.
pub fn popover(width: f32, height: f32, theme: &ThemeConfig, results: &SearchResult, selected: usize) -> PopoverLayout {
    let popover_width = (theme.popover_width as f32).min(width);
    let input_height = theme.row_height + 8.0;

    let mut content = Vec::new();
    let mut y = 0.0;
    let mut flat_index = 0;
    let mut selected_span = None;
    for (group_index, group) in results.groups.iter().enumerate() {
        let h = header_height(theme);
        content.push((RowKind::Header(group_index), y, h));
        y += h;
        for _ in &group.items {
            if flat_index == selected {
                selected_span = Some((y, y + theme.row_height));
            }
            content.push((RowKind::Item(flat_index), y, theme.row_height));
            y += theme.row_height;
            flat_index += 1;
        }
    }
    let content_height = y;

    let max_list = (theme.max_list_height as f32).min((height - input_height).max(0.0));
    let list_height = content_height.min(max_list);
    let scroll = match selected_span {
        Some((_, bottom)) if bottom > list_height => bottom - list_height,
        _ => 0.0,
    };

    let container_height = input_height + list_height;
    let container = Region::new(
        ((width - popover_width) / 2.0).max(0.0),
        ((height - container_height) / 2.0).max(0.0),
        popover_width,
        container_height,
    );
    let input = Region::new(container.x, container.y, container.width, input_height);
    let list = Region::new(container.x, input.bottom(), container.width, list_height);

    let rows = content
        .into_iter()
        .filter(|&(_, top, h)| top >= scroll && top + h <= scroll + list_height)
        .map(|(kind, top, h)| Row {
            kind,
            region: Region::new(list.x, list.y + top - scroll, list.width, h),
        })
        .collect();

    PopoverLayout {
        container,
        input,
        list,
        rows,
    }
}
