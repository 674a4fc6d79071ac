//! Site detail screen: trigger-hour histogram and hourly weather charts.

use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::Result;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, BarChart, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph,
};
use strum::IntoEnumIterator;

use camtrap_core::{
    CurrentConditions, DetailPanel, EnrichmentResult, RenderModel, WeatherMetric, WeatherState,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct DetailScreen {
    focused: bool,
    images_dir: PathBuf,
    model: Option<Arc<RenderModel>>,
}

impl DetailScreen {
    pub fn new(images_dir: PathBuf) -> Self {
        Self {
            focused: false,
            images_dir,
            model: None,
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, panel: &DetailPanel) {
        let image = self.images_dir.join(&panel.image_path);
        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", panel.label), theme::title_style()),
                Span::styled(format!(" {}  ", panel.region), theme::text()),
                Span::styled(panel.site_id.tooltip(), theme::muted()),
            ]),
            Line::from(vec![
                Span::styled(" Location  ", theme::key_hint()),
                Span::styled(panel.coordinates.to_string(), theme::text()),
                Span::styled("   Baboons  ", theme::key_hint()),
                Span::styled(panel.baboon_count.to_string(), theme::text()),
            ]),
            Line::from(vec![
                Span::styled(" Image     ", theme::key_hint()),
                Span::styled(image.display().to_string(), theme::muted()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_histogram(&self, frame: &mut Frame, area: Rect, panel: &DetailPanel) {
        let block = Block::default()
            .title(" Camera triggers by hour ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let labels: Vec<String> = (0..panel.histogram.len())
            .map(|hour| format!("{hour:02}"))
            .collect();
        let data: Vec<(&str, u64)> = labels
            .iter()
            .zip(panel.histogram)
            .map(|(label, count)| (label.as_str(), u64::from(count)))
            .collect();

        // 24 bars plus one-cell gaps must fit inside the borders.
        let bar_width = (block.inner(area).width.saturating_sub(23) / 24).max(1);

        let chart = BarChart::default()
            .block(block)
            .data(data.as_slice())
            .bar_width(bar_width)
            .bar_gap(1)
            .bar_style(Style::default().fg(theme::LATERITE))
            .value_style(Style::default().fg(theme::BG_DARK).bg(theme::LATERITE))
            .label_style(theme::muted());

        frame.render_widget(chart, area);
    }

    fn render_weather(frame: &mut Frame, area: Rect, weather: &WeatherState) {
        let [current_area, charts_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(6)]).areas(area);

        let block = Block::default()
            .title(" Current conditions ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let line = match weather {
            WeatherState::Loading => {
                Line::from(Span::styled(" Fetching forecast\u{2026}", theme::muted()))
            }
            WeatherState::Unavailable(reason) => Line::from(Span::styled(
                format!(" Weather unavailable: {reason}"),
                Style::default().fg(theme::ALERT_RED),
            )),
            WeatherState::Ready(result) => match result.current_conditions() {
                Some(current) => current_line(&current),
                None => Line::from(Span::styled(
                    " No reading for the current hour",
                    theme::muted(),
                )),
            },
        };
        frame.render_widget(Paragraph::new(line).block(block), current_area);

        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(charts_area);
        let [top_left, top_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(top);
        let [bottom_left, bottom_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(bottom);

        let cells = [top_left, top_right, bottom_left, bottom_right];
        for ((metric, cell), color) in WeatherMetric::iter().zip(cells).zip(theme::CHART_SERIES) {
            render_metric_chart(frame, cell, metric, weather.result(), color);
        }
    }
}

fn current_line(current: &CurrentConditions) -> Line<'static> {
    let reading = |label: &'static str, value: Option<f64>, metric: WeatherMetric| {
        [
            Span::styled(format!(" {label} "), theme::key_hint()),
            Span::styled(
                value.map_or_else(
                    || "n/a".to_string(),
                    |v| format!("{v:.1} {}", metric.unit()),
                ),
                theme::text(),
            ),
            Span::raw("  "),
        ]
    };

    let spans: Vec<Span<'static>> = [
        reading(
            "Feels like",
            current.temperature,
            WeatherMetric::ApparentTemperature,
        ),
        reading("Rain", current.precipitation, WeatherMetric::Precipitation),
        reading("Pressure", current.pressure, WeatherMetric::Pressure),
        reading("Wind", current.wind_speed, WeatherMetric::WindSpeed),
    ]
    .into_iter()
    .flatten()
    .collect();

    Line::from(spans)
}

/// One Braille line chart for `metric`; an empty panel when there is
/// nothing to plot.
fn render_metric_chart(
    frame: &mut Frame,
    area: Rect,
    metric: WeatherMetric,
    result: Option<&EnrichmentResult>,
    color: ratatui::style::Color,
) {
    let block = Block::default()
        .title(format!(" {metric} ({}) ", metric.unit()))
        .title_style(Style::default().fg(color))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());

    let points = result.map(|r| r.points(metric)).unwrap_or_default();
    if points.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new("  No data").style(theme::muted()), inner);
        return;
    }

    let x_max = points.last().map_or(1.0, |&(x, _)| x).max(1.0);
    let (y_min, y_max) = value_bounds(&points);

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let axis_style = Style::default().fg(theme::DUST);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::styled("0h", axis_style),
                    Span::styled(format!("{x_max:.0}h"), axis_style),
                ])
                .style(axis_style),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.0}"), axis_style),
                    Span::styled(format!("{y_max:.0}"), axis_style),
                ])
                .style(axis_style),
        );

    frame.render_widget(chart, area);
}

/// Y range with a little headroom; flat series get a unit-wide band.
fn value_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    let pad = ((max - min) * 0.1).max(0.5);
    (min - pad, max + pad)
}

impl Component for DetailScreen {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::ModelUpdated(model) = action {
            self.model = Some(Arc::clone(model));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(panel) = self.model.as_deref().and_then(|m| m.detail.as_ref()) else {
            let hint = vec![
                Line::from(""),
                Line::from(Span::styled("  No site selected.", theme::text())),
                Line::from(vec![
                    Span::styled("  Pick one on the Map screen (", theme::muted()),
                    Span::styled("1", theme::key_hint_key()),
                    Span::styled(") and press ", theme::muted()),
                    Span::styled("Enter", theme::key_hint_key()),
                    Span::styled(".", theme::muted()),
                ]),
            ];
            frame.render_widget(Paragraph::new(hint), area);
            return;
        };

        let [header_area, histogram_area, weather_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Min(9),
        ])
        .areas(area);

        self.render_header(frame, header_area, panel);
        self.render_histogram(frame, histogram_area, panel);
        Self::render_weather(frame, weather_area, &panel.weather);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
