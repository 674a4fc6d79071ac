//! Map screen: study-area canvas with site markers and baboon bubbles.
//!
//! The canvas is a plain lon/lat plot centered on the view state. Tile
//! imagery cannot be drawn in a terminal, so the active base layer only
//! changes the canvas palette; its tile source and attribution are listed
//! in the sidebar.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker as CanvasMarker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Rectangle};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap,
};

use camtrap_core::{Coordinates, MapLayer, RenderModel, SiteCatalog, ViewEvent};
use strum::IntoEnumIterator;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{choice_bar, toggle_line};

/// Web-map tiles are 256 px wide; bubble radii are in those pixels.
const TILE_SIZE_PX: f64 = 256.0;

const SIDEBAR_WIDTH: u16 = 36;

pub struct MapScreen {
    focused: bool,
    catalog: Arc<SiteCatalog>,
    /// Boundary rings as (lon, lat).
    outline: Vec<Vec<(f64, f64)>>,
    model: Option<Arc<RenderModel>>,
    table_state: TableState,
}

impl MapScreen {
    pub fn new(catalog: Arc<SiteCatalog>, outline: Vec<Vec<(f64, f64)>>) -> Self {
        let mut table_state = TableState::default();
        if !catalog.is_empty() {
            table_state.select(Some(0));
        }
        Self {
            focused: false,
            catalog,
            outline,
            model: None,
            table_state,
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn select(&mut self, idx: usize) {
        let len = self.catalog.len();
        if len == 0 {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(len - 1)));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let next = self.selected_index().saturating_add_signed(delta);
        self.select(next);
    }

    /// Selection event for the site under the cursor, keyed the way a
    /// marker tooltip would name it.
    fn open_selected(&self) -> Option<Action> {
        let site = self.catalog.all().get(self.selected_index())?;
        Some(Action::Dispatch(ViewEvent::SelectSite(site.id.tooltip())))
    }

    fn render_canvas(&self, frame: &mut Frame, area: Rect, model: &RenderModel) {
        let view = &model.view;
        let palette = LayerPalette::for_layer(view.active_layer);

        let block = Block::default()
            .title(format!(" {} ", view.active_layer))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        let span = view.span_degrees();
        let (x_bounds, y_bounds) = viewport(view.center, span, inner);
        let degrees_per_px = span / TILE_SIZE_PX;

        let cursor_site = self.catalog.all().get(self.selected_index()).map(|s| s.id);

        let canvas = Canvas::default()
            .block(block)
            .marker(CanvasMarker::Braille)
            .background_color(palette.background)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx: &mut Context<'_>| {
                // Study-area boundary
                for ring in &self.outline {
                    for pair in ring.windows(2) {
                        if let &[(x1, y1), (x2, y2)] = pair {
                            ctx.draw(&ratatui::widgets::canvas::Line {
                                x1,
                                y1,
                                x2,
                                y2,
                                color: palette.boundary,
                            });
                        }
                    }
                }
                if let Some(bounds) = model.bounds {
                    ctx.draw(&Rectangle {
                        x: bounds.west,
                        y: bounds.south,
                        width: bounds.east - bounds.west,
                        height: bounds.north - bounds.south,
                        color: theme::DUST,
                    });
                }
                ctx.layer();

                for bubble in model.overlay.bubbles.iter().filter(|b| !b.is_sentinel()) {
                    let color = bubble.color.parse::<Color>().unwrap_or(theme::LATERITE);
                    let radius = bubble.radius * degrees_per_px;
                    ctx.draw(&Circle {
                        x: bubble.center.longitude,
                        y: bubble.center.latitude,
                        radius,
                        color,
                    });
                    if bubble.filled {
                        ctx.draw(&Circle {
                            x: bubble.center.longitude,
                            y: bubble.center.latitude,
                            radius: radius / 2.0,
                            color,
                        });
                    }
                }
                ctx.layer();

                for marker in model.overlay.markers.iter().filter(|m| !m.is_sentinel()) {
                    let selected =
                        marker.site_id.is_some() && marker.site_id == view.selected_site;
                    let under_cursor = marker.site_id.is_some() && marker.site_id == cursor_site;
                    let (glyph, style) = if selected {
                        (
                            "◆",
                            Style::default()
                                .fg(theme::MARKER_SELECTED)
                                .add_modifier(Modifier::BOLD),
                        )
                    } else if under_cursor {
                        ("●", Style::default().fg(theme::MARKER_SELECTED))
                    } else {
                        ("●", Style::default().fg(theme::MARKER))
                    };
                    ctx.print(
                        marker.position.longitude,
                        marker.position.latitude,
                        Span::styled(glyph, style),
                    );
                    if selected || under_cursor {
                        if let Some(tooltip) = &marker.tooltip {
                            ctx.print(
                                marker.position.longitude + degrees_per_px * 12.0,
                                marker.position.latitude,
                                Span::styled(tooltip.clone(), style),
                            );
                        }
                    }
                }
            });

        frame.render_widget(canvas, area);
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect, model: &RenderModel) {
        let block = Block::default()
            .title(" Sites ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [layers_area, toggles_area, table_area, attribution_area, hints_area] =
            Layout::vertical([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .areas(inner);

        let names: Vec<String> = MapLayer::iter().map(|layer| layer.to_string()).collect();
        let labels: Vec<&str> = names.iter().map(String::as_str).collect();
        let layer_lines = vec![
            choice_bar::choice_bar(&labels, model.view.active_layer.index()),
            Line::from(Span::styled(
                format!(" zoom {}  {}", model.view.zoom, model.view.center),
                theme::muted(),
            )),
        ];
        frame.render_widget(Paragraph::new(layer_lines), layers_area);

        let toggles = vec![
            toggle_line::toggle_line('m', "Markers", model.view.show_markers),
            toggle_line::toggle_line('b', "Bubbles", model.view.show_bubbles),
        ];
        frame.render_widget(Paragraph::new(toggles), toggles_area);

        let header = Row::new(["Site", "Region", "Baboons"]).style(theme::title_style());
        let rows: Vec<Row> = self
            .catalog
            .iter()
            .map(|site| {
                let style = if Some(site.id) == model.view.selected_site {
                    Style::default().fg(theme::MARKER_SELECTED)
                } else {
                    theme::text()
                };
                Row::new([
                    Cell::from(site.label.clone()),
                    Cell::from(site.region.to_string()),
                    Cell::from(site.baboon_count.to_string()),
                ])
                .style(style)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Length(8),
                Constraint::Length(7),
            ],
        )
        .header(header)
        .row_highlight_style(theme::list_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, table_area, &mut state);

        let attribution = Paragraph::new(vec![
            Line::from(Span::styled(model.tile_source, theme::muted())),
            Line::from(Span::styled(model.attribution, theme::key_hint())),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(attribution, attribution_area);

        let hints = Line::from(vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("open", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);
    }
}

/// Canvas colours standing in for each base layer's look.
#[derive(Debug, Clone, Copy)]
struct LayerPalette {
    background: Color,
    boundary: Color,
}

impl LayerPalette {
    fn for_layer(layer: MapLayer) -> Self {
        match layer {
            MapLayer::Standard => Self {
                background: Color::Reset,
                boundary: theme::BOUNDARY,
            },
            MapLayer::Topographical => Self {
                background: Color::Reset,
                boundary: theme::GALLERY_GREEN,
            },
            MapLayer::Satellite => Self {
                background: theme::BG_DARK,
                boundary: theme::SAVANNA_GOLD,
            },
        }
    }
}

/// Canvas bounds for a view centered on `center` spanning `span` degrees
/// of longitude. Terminal cells are about twice as tall as wide, so the
/// latitude span follows the area's aspect ratio.
fn viewport(center: Coordinates, span: f64, area: Rect) -> ([f64; 2], [f64; 2]) {
    let half_x = span / 2.0;
    let aspect = if area.width == 0 {
        1.0
    } else {
        f64::from(area.height) * 2.0 / f64::from(area.width)
    };
    let half_y = half_x * aspect;
    (
        [center.longitude - half_x, center.longitude + half_x],
        [center.latitude - half_y, center.latitude + half_y],
    )
}

impl Component for MapScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(None)
            }
            KeyCode::Char('g') => {
                self.select(0);
                Ok(None)
            }
            KeyCode::Char('G') => {
                self.select(usize::MAX);
                Ok(None)
            }
            KeyCode::Enter => Ok(self.open_selected()),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::ModelUpdated(model) = action {
            if let Some(id) = model.view.selected_site {
                self.select(id.index());
            }
            self.model = Some(Arc::clone(model));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(model) = self.model.as_deref() else {
            frame.render_widget(
                Paragraph::new("  Loading map\u{2026}").style(theme::muted()),
                area,
            );
            return;
        };

        let [canvas_area, sidebar_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
                .areas(area);

        self.render_canvas(frame, canvas_area, model);
        self.render_sidebar(frame, sidebar_area, model);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use camtrap_core::{Region, SiteId, SiteRecord, ViewState, project};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn catalog() -> Arc<SiteCatalog> {
        let record = |region, label: &str, lat, lon, count| SiteRecord {
            region,
            label: label.to_string(),
            coordinates: Coordinates::new(lat, lon),
            trigger_hours: vec![6, 7, 18],
            baboon_count: count,
        };
        Arc::new(SiteCatalog::from_records(vec![
            record(Region::Assirik, "site_0", 12.88, -12.72, 14),
            record(Region::Assirik, "site_1", 12.89, -12.70, 3),
            record(Region::Assirik, "site_2", 12.90, -12.69, 0),
        ]))
    }

    fn model(catalog: &SiteCatalog, view: ViewState) -> Arc<RenderModel> {
        Arc::new(RenderModel {
            tile_source: view.active_layer.tile_source(),
            attribution: view.active_layer.attribution(),
            bounds: None,
            overlay: project(catalog, view.show_markers, view.show_bubbles),
            detail: None,
            view,
        })
    }

    fn press(screen: &mut MapScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn enter_selects_site_under_cursor() {
        let mut screen = MapScreen::new(catalog(), Vec::new());
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Char('j'));

        match press(&mut screen, KeyCode::Enter) {
            Some(Action::Dispatch(ViewEvent::SelectSite(label))) => assert_eq!(label, "Site 2"),
            other => panic!("expected site selection, got {other:?}"),
        }

        press(&mut screen, KeyCode::Char('g'));
        press(&mut screen, KeyCode::Char('k'));
        assert_eq!(screen.selected_index(), 0);
    }

    #[test]
    fn model_update_follows_selection() {
        let catalog = catalog();
        let mut screen = MapScreen::new(Arc::clone(&catalog), Vec::new());
        let view = ViewState {
            selected_site: Some(SiteId(1)),
            ..ViewState::default()
        };

        screen.update(&Action::ModelUpdated(model(&catalog, view))).unwrap();
        assert_eq!(screen.selected_index(), 1);
    }

    #[test]
    fn viewport_keeps_center_and_aspect() {
        let center = Coordinates::new(12.9, -12.4);
        let (x, y) = viewport(center, 2.0, Rect::new(0, 0, 80, 20));

        assert!((x[0] + 13.4).abs() < 1e-9);
        assert!((x[1] + 11.4).abs() < 1e-9);
        assert!((y[0] - 12.4).abs() < 1e-9);
        assert!((y[1] - 13.4).abs() < 1e-9);
    }

    #[test]
    fn renders_with_snapshot() {
        let catalog = catalog();
        let mut screen = MapScreen::new(Arc::clone(&catalog), vec![vec![
            (-12.8, 12.8),
            (-12.6, 12.8),
            (-12.6, 13.0),
            (-12.8, 12.8),
        ]]);
        screen
            .update(&Action::ModelUpdated(model(&catalog, ViewState::default())))
            .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| screen.render(frame, frame.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(ratatui::buffer::Cell::symbol).collect();
        assert!(text.contains("site_1"));
        assert!(text.contains("[Standard]"));
    }
}
