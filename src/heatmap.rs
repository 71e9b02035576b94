use crate::matrix::format_annotation;
use crate::palette::{color_limit, diverging_color, missing_color, text_color_for};
use crate::pipeline::Rendering;
use egui::{pos2, vec2, Align2, Color32, FontId, Rect, RichText, Sense, Stroke};

#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapStyle {
    pub row_height: f32,
    pub min_grid_height: f32,
    pub min_cell_width: f32,
    pub tick_size: f32,
    pub annotation_size: f32,
    pub title_size: f32,
    pub line_width: f32,
    pub colorbar_width: f32,
    pub colorbar_label: String,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            row_height: 24.0,
            min_grid_height: 360.0,
            min_cell_width: 56.0,
            tick_size: 10.0,
            annotation_size: 10.0,
            title_size: 14.0,
            line_width: 0.5,
            colorbar_width: 16.0,
            colorbar_label: "Average Delta Z-Score".to_owned(),
        }
    }
}

impl HeatmapStyle {
    /// Grid grows with the row count but never below `min_grid_height`.
    pub fn grid_height(&self, rows: usize) -> f32 {
        (rows as f32 * self.row_height).max(self.min_grid_height)
    }
}

pub struct HeatmapView<'a> {
    rendering: &'a Rendering,
    style: &'a HeatmapStyle,
}

impl<'a> HeatmapView<'a> {
    pub fn new(rendering: &'a Rendering, style: &'a HeatmapStyle) -> Self {
        Self { rendering, style }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let style = self.style;
        let heatmap = &self.rendering.heatmap;
        let matrix = &heatmap.matrix;
        let (rows, cols) = matrix.shape();
        let limit = color_limit(matrix);

        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new(&self.rendering.title)
                    .size(style.title_size)
                    .strong(),
            );
        });

        let tick_font = FontId::proportional(style.tick_size);
        let annotation_font = FontId::proportional(style.annotation_size);
        let text_width = |text: &str, font: &FontId| {
            ui.painter()
                .layout_no_wrap(text.to_owned(), font.clone(), Color32::WHITE)
                .size()
                .x
        };

        let label_width = matrix
            .row_labels()
            .iter()
            .map(|l| text_width(l.as_str(), &tick_font))
            .fold(0.0, f32::max)
            + 10.0;
        let widest_annotation = heatmap
            .annotations
            .rows()
            .iter()
            .flatten()
            .map(|a| text_width(a.as_str(), &annotation_font))
            .fold(0.0, f32::max);
        let widest_condition = matrix
            .col_labels()
            .iter()
            .map(|l| text_width(l.as_str(), &tick_font))
            .fold(widest_annotation, f32::max);
        let cell_w = (widest_condition + 10.0).max(style.min_cell_width);
        let grid_h = style.grid_height(rows);
        let cell_h = if rows == 0 { grid_h } else { grid_h / rows as f32 };
        let axis_h = style.tick_size * 2.0 + 6.0;
        let bar_gap = 20.0;
        let bar_labels_w = 48.0;

        let total = vec2(
            label_width + cols as f32 * cell_w + bar_gap + style.colorbar_width + bar_labels_w,
            grid_h + axis_h + style.tick_size * 2.0,
        );
        let (response, painter) = ui.allocate_painter(total, Sense::hover());
        let origin = response.rect.min;
        let grid_origin = pos2(origin.x + label_width, origin.y + style.tick_size * 2.0);
        let text_color = ui.visuals().text_color();
        let separator = Stroke::new(style.line_width, Color32::WHITE);

        let mut hovered: Option<(usize, usize)> = None;
        for row in 0..rows {
            let y = grid_origin.y + row as f32 * cell_h;
            painter.text(
                pos2(grid_origin.x - 5.0, y + cell_h / 2.0),
                Align2::RIGHT_CENTER,
                &matrix.row_labels()[row],
                tick_font.clone(),
                text_color,
            );
            for col in 0..cols {
                let cell_rect = Rect::from_min_size(
                    pos2(grid_origin.x + col as f32 * cell_w, y),
                    vec2(cell_w, cell_h),
                );
                let fill = match matrix.row(row)[col] {
                    Some(v) => diverging_color(v, limit),
                    None => missing_color(),
                };
                painter.rect_filled(cell_rect, 0.0, fill);
                painter.rect_stroke(cell_rect, 0.0, separator);
                let annotation = heatmap.annotations.get(row, col);
                if !annotation.is_empty() {
                    painter.text(
                        cell_rect.center(),
                        Align2::CENTER_CENTER,
                        annotation,
                        annotation_font.clone(),
                        text_color_for(fill),
                    );
                }
                if let Some(pointer) = response.hover_pos() {
                    if cell_rect.contains(pointer) {
                        hovered = Some((row, col));
                    }
                }
            }
        }

        for (col, label) in matrix.col_labels().iter().enumerate() {
            painter.text(
                pos2(
                    grid_origin.x + col as f32 * cell_w + cell_w / 2.0,
                    grid_origin.y + grid_h + 4.0,
                ),
                Align2::CENTER_TOP,
                label,
                tick_font.clone(),
                text_color,
            );
        }

        // Color bar, top = +limit.
        let bar_rect = Rect::from_min_size(
            pos2(grid_origin.x + cols as f32 * cell_w + bar_gap, grid_origin.y),
            vec2(style.colorbar_width, grid_h),
        );
        let steps = 64;
        let step_h = grid_h / steps as f32;
        for step in 0..steps {
            let t = 1.0 - (step as f64 + 0.5) / steps as f64 * 2.0;
            let strip = Rect::from_min_size(
                pos2(bar_rect.min.x, bar_rect.min.y + step as f32 * step_h),
                vec2(style.colorbar_width, step_h + 0.5),
            );
            painter.rect_filled(strip, 0.0, diverging_color(t * limit, limit));
        }
        for (fraction, value) in [(0.0, limit), (0.5, 0.0), (1.0, -limit)] {
            painter.text(
                pos2(bar_rect.max.x + 4.0, bar_rect.min.y + grid_h * fraction),
                Align2::LEFT_CENTER,
                format!("{:.1}", value),
                tick_font.clone(),
                text_color,
            );
        }
        painter.text(
            pos2(bar_rect.center().x, bar_rect.min.y - 4.0),
            Align2::CENTER_BOTTOM,
            &style.colorbar_label,
            tick_font,
            text_color,
        );

        match hovered {
            Some((row, col)) => {
                let value = format_annotation(matrix.row(row)[col]);
                let text = format!(
                    "{} / {}: {}",
                    matrix.row_labels()[row],
                    matrix.col_labels()[col],
                    if value.is_empty() { "missing" } else { value.as_str() }
                );
                response.on_hover_text_at_pointer(text)
            }
            None => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_height_grows_with_rows() {
        let style = HeatmapStyle::default();
        assert_eq!(style.grid_height(1), style.min_grid_height);
        assert_eq!(style.grid_height(100), 100.0 * style.row_height);
    }
}
