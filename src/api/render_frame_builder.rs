use crate::core::coordinate::{index_to_pixel_x, price_to_pixel_y};
use crate::core::{Candle, Surface, Viewport, project_candles};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    LinePrimitive, PolygonPrimitive, RectPrimitive, RenderFrame, Renderer, TextHAlign,
    TextPrimitive,
};

use super::{ChartEngine, RenderStyle, SeriesStyle};

const LABEL_INSET_PX: f64 = 4.0;

impl<R: Renderer> ChartEngine<R> {
    /// Materializes the current state into a backend-agnostic frame.
    pub fn build_render_frame(&self) -> ChartResult<RenderFrame> {
        let surface = self.renderer.surface();
        if !surface.is_valid() {
            return Err(ChartError::InvalidSurface {
                width: surface.width,
                height: surface.height,
            });
        }
        let viewport = self.core.view.controller.viewport();
        let mut frame = RenderFrame::new(surface, viewport);
        if !self.core.view.initialized {
            return Ok(frame);
        }

        let style = self.core.config.render_style;
        let candles = self.core.model.store.candles();
        if let Some((lo, hi)) = viewport.visible_index_bounds(candles.len()) {
            let visible = &candles[lo..=hi];
            match self.core.config.series_style {
                SeriesStyle::Candlestick => {
                    push_candlesticks(&mut frame, visible, lo, &viewport, surface, style)?;
                }
                SeriesStyle::Line => {
                    push_close_line(&mut frame, visible, lo, &viewport, surface, style);
                }
                SeriesStyle::Area => {
                    push_close_line(&mut frame, visible, lo, &viewport, surface, style);
                    push_area_fill(&mut frame, visible, lo, &viewport, surface, style);
                }
            }
        }

        for marker in self.core.model.price_markers.values() {
            let y = price_to_pixel_y(&viewport, surface, marker.price);
            frame.lines.push(
                LinePrimitive::new(0.0, y, surface.width, y, 1.0, style.marker_color).dashed(),
            );
            let text = marker.label.as_deref().unwrap_or(&marker.id);
            frame.texts.push(TextPrimitive::new(
                text,
                LABEL_INSET_PX,
                y,
                style.label_font_size_px,
                style.marker_color,
                TextHAlign::Left,
            ));
        }

        if style.show_last_price {
            if let Some(last) = candles.last() {
                let color = if last.is_bullish() {
                    style.up_color
                } else {
                    style.down_color
                };
                let y = price_to_pixel_y(&viewport, surface, last.close);
                frame
                    .lines
                    .push(LinePrimitive::new(0.0, y, surface.width, y, 1.0, color).dashed());
                frame.texts.push(TextPrimitive::new(
                    format!("{:.*}", style.price_precision, last.close),
                    surface.width - LABEL_INSET_PX,
                    y,
                    style.label_font_size_px,
                    color,
                    TextHAlign::Right,
                ));
            }
        }

        if let Some(index) = self.core.runtime.time_sync.displayed_index() {
            let x = index_to_pixel_x(&viewport, surface, index);
            if (0.0..=surface.width).contains(&x) {
                frame.lines.push(
                    LinePrimitive::new(x, 0.0, x, surface.height, 1.0, style.time_sync_line_color)
                        .dashed(),
                );
            }
        }

        let hover = self.core.view.interaction.hover();
        if hover.visible {
            frame.lines.push(LinePrimitive::new(
                hover.x,
                0.0,
                hover.x,
                surface.height,
                1.0,
                style.crosshair_color,
            ));
            frame.lines.push(LinePrimitive::new(
                0.0,
                hover.y,
                surface.width,
                hover.y,
                1.0,
                style.crosshair_color,
            ));
            if let Some(price) = hover.price {
                frame.texts.push(TextPrimitive::new(
                    format!("{:.*}", style.price_precision, price),
                    surface.width - LABEL_INSET_PX,
                    hover.y,
                    style.label_font_size_px,
                    style.label_color,
                    TextHAlign::Right,
                ));
            }
        }

        Ok(frame)
    }
}

fn push_candlesticks(
    frame: &mut RenderFrame,
    visible: &[Candle],
    first_index: usize,
    viewport: &Viewport,
    surface: Surface,
    style: RenderStyle,
) -> ChartResult<()> {
    let slot = surface.width / viewport.candles_per_screen;
    let body_width = (slot * style.body_width_ratio).max(1.0);
    for geometry in project_candles(visible, first_index, viewport, surface, body_width)? {
        let color = if geometry.is_bullish {
            style.up_color
        } else {
            style.down_color
        };
        frame.lines.push(LinePrimitive::new(
            geometry.center_x,
            geometry.wick_top,
            geometry.center_x,
            geometry.wick_bottom,
            1.0,
            color,
        ));
        frame.rects.push(RectPrimitive::new(
            geometry.body_left,
            geometry.body_top,
            geometry.body_right - geometry.body_left,
            (geometry.body_bottom - geometry.body_top).max(1.0),
            color,
        ));
    }
    Ok(())
}

fn close_points(
    visible: &[Candle],
    first_index: usize,
    viewport: &Viewport,
    surface: Surface,
) -> Vec<(f64, f64)> {
    visible
        .iter()
        .enumerate()
        .map(|(offset, candle)| {
            (
                index_to_pixel_x(viewport, surface, (first_index + offset) as f64),
                price_to_pixel_y(viewport, surface, candle.close),
            )
        })
        .collect()
}

fn push_close_line(
    frame: &mut RenderFrame,
    visible: &[Candle],
    first_index: usize,
    viewport: &Viewport,
    surface: Surface,
    style: RenderStyle,
) {
    let points = close_points(visible, first_index, viewport, surface);
    frame.lines.extend(points.windows(2).map(|pair| {
        LinePrimitive::new(
            pair[0].0,
            pair[0].1,
            pair[1].0,
            pair[1].1,
            style.line_width_px,
            style.line_color,
        )
    }));
}

fn push_area_fill(
    frame: &mut RenderFrame,
    visible: &[Candle],
    first_index: usize,
    viewport: &Viewport,
    surface: Surface,
    style: RenderStyle,
) {
    let mut points = close_points(visible, first_index, viewport, surface);
    let (Some(&(first_x, _)), Some(&(last_x, _))) = (points.first(), points.last()) else {
        return;
    };
    if points.len() < 2 {
        return;
    }
    points.push((last_x, surface.height));
    points.push((first_x, surface.height));
    frame
        .polygons
        .push(PolygonPrimitive::new(points, style.area_fill_color));
}
