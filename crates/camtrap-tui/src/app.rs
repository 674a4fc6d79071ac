//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use camtrap_config::Config;
use camtrap_core::{
    DashboardController, EnrichmentOutcome, ForecastSource, Region, ViewEvent, ViewState,
    WeatherState,
};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// Toasts disappear after this long.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App<S> {
    /// Current active screen.
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// Action sender; components dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver; the main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Sole owner of dashboard state.
    controller: DashboardController<S>,
    /// Weather outcomes, handed to the bridge task on `run`.
    outcome_rx: Option<mpsc::UnboundedReceiver<EnrichmentOutcome>>,
    /// Cancellation token for the enrichment bridge task.
    bridge_cancel: CancellationToken,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    tick_rate: Duration,
    render_rate: Duration,
}

impl<S: ForecastSource> App<S> {
    pub fn new(
        controller: DashboardController<S>,
        outcome_rx: mpsc::UnboundedReceiver<EnrichmentOutcome>,
        cfg: &Config,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let images_dir: PathBuf = cfg.data.images_dir.clone();
        let screens: HashMap<ScreenId, Box<dyn Component>> = create_screens(
            std::sync::Arc::clone(controller.catalog()),
            controller.region().outline(),
            images_dir,
        )
        .into_iter()
        .collect();

        Self {
            active_screen: ScreenId::default(),
            previous_screen: None,
            screens,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            controller,
            outcome_rx: Some(outcome_rx),
            bridge_cancel: CancellationToken::new(),
            notification: None,
            tick_rate: Duration::from_millis(cfg.ui.tick_rate_ms),
            render_rate: Duration::from_millis(cfg.ui.render_rate_ms),
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }

        if let Some(outcome_rx) = self.outcome_rx.take() {
            let cancel = self.bridge_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_enrichment_bridge(outcome_rx, tx, cancel).await;
            });
        }

        // Seed every screen with the initial snapshot.
        self.action_tx
            .send(Action::ModelUpdated(self.controller.render_model()))?;

        let mut events = EventReader::new(self.tick_rate, self.render_rate);

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                let redraw = matches!(action, Action::Render);
                self.process_action(action)?;

                if redraw && self.running {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.bridge_cancel.cancel();
        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        if let Some(action) = global_key_action(self.controller.view(), self.active_screen, key) {
            return Ok(Some(action));
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action: update app state and propagate to components.
    fn process_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => {
                debug!(w, h, "terminal resized");
            }

            Action::SwitchScreen(target) => {
                if target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.previous_screen = Some(self.active_screen);
                    self.active_screen = target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Dispatch(event) => self.dispatch(event)?,

            Action::EnrichmentArrived(outcome) => {
                let unavailable = match &outcome.weather {
                    WeatherState::Unavailable(reason) => Some(reason.clone()),
                    _ => None,
                };
                if self.controller.apply_enrichment(outcome) {
                    if let Some(reason) = unavailable {
                        self.action_tx
                            .send(Action::Notify(Notification::warning(format!(
                                "Weather unavailable: {reason}"
                            ))))?;
                    }
                    self.action_tx
                        .send(Action::ModelUpdated(self.controller.render_model()))?;
                }
            }

            Action::ModelUpdated(_) => {
                // Every screen keeps its own copy of the latest snapshot.
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(&action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::Tick => {
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > NOTIFICATION_TTL {
                        self.notification = None;
                    }
                }
            }

            Action::Render => {}

            Action::Notify(n) => {
                self.notification = Some((n, Instant::now()));
            }
        }

        Ok(())
    }

    /// Hand a view event to the controller and fan out the new snapshot.
    fn dispatch(&mut self, event: ViewEvent) -> Result<()> {
        let region = match &event {
            ViewEvent::SelectRegion(region) => Some(*region),
            _ => None,
        };
        match self.controller.dispatch(event) {
            Ok(ticket) => {
                self.action_tx
                    .send(Action::ModelUpdated(self.controller.render_model()))?;
                if let Some(region) = region {
                    self.action_tx
                        .send(Action::Notify(Notification::info(format!("Centered on {region}"))))?;
                }
                if let Some(ticket) = ticket {
                    debug!(site = %ticket.site_id, "site selected");
                    self.action_tx.send(Action::SwitchScreen(ScreenId::Detail))?;
                }
            }
            Err(e) => {
                warn!(error = %e, "view event rejected");
                let notification = if e.is_recoverable() {
                    Notification::warning(e.to_string())
                } else {
                    Notification::error(e.to_string())
                };
                self.action_tx.send(Action::Notify(notification))?;
            }
        }
        Ok(())
    }

    // ── Rendering ────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [screen content] [tab bar] [status bar]
        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }

        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        // Overlays on top (last = topmost)
        if let Some((ref notif, _)) = self.notification {
            render_notification(frame, area, notif);
        }

        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    /// Render the tab bar listing every screen.
    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    /// Render the status bar: view summary, fetch indicator, key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let view = self.controller.view();

        let fetch_indicator = if self.controller.pending().is_some() {
            Span::styled("◐ fetching weather", Style::default().fg(theme::SAVANNA_GOLD))
        } else {
            Span::styled("● idle", Style::default().fg(theme::GALLERY_GREEN))
        };

        let summary = Span::styled(
            format!(
                " │ {}  z{}  {} ",
                view.active_layer, view.zoom, view.center
            ),
            theme::text(),
        );

        let hints = Span::styled("│ ? help  l layer  a/f region  q quit", theme::key_hint());

        let line = Line::from(vec![Span::raw(" "), fetch_indicator, summary, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Global bindings, resolved against the current view so toggles flip.
fn global_key_action(view: &ViewState, active: ScreenId, key: KeyEvent) -> Option<Action> {
    let action = match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (KeyModifiers::NONE, KeyCode::Char('q')) => {
            Action::Quit
        }
        (_, KeyCode::Char('?')) => Action::ToggleHelp,

        (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='9')) => {
            let n = u8::try_from(c.to_digit(10)?).ok()?;
            Action::SwitchScreen(ScreenId::from_number(n)?)
        }
        (KeyModifiers::NONE, KeyCode::Tab) => Action::SwitchScreen(active.next()),
        (KeyModifiers::NONE, KeyCode::Esc) => Action::GoBack,

        (KeyModifiers::NONE, KeyCode::Char('l')) => {
            Action::Dispatch(ViewEvent::SetLayer(view.active_layer.next()))
        }
        (KeyModifiers::NONE, KeyCode::Char('m')) => {
            Action::Dispatch(ViewEvent::ToggleMarkers(!view.show_markers))
        }
        (KeyModifiers::NONE, KeyCode::Char('b')) => {
            Action::Dispatch(ViewEvent::ToggleBubbles(!view.show_bubbles))
        }
        (KeyModifiers::NONE, KeyCode::Char('a')) => {
            Action::Dispatch(ViewEvent::SelectRegion(Region::Assirik))
        }
        (KeyModifiers::NONE, KeyCode::Char('f')) => {
            Action::Dispatch(ViewEvent::SelectRegion(Region::Fongoli))
        }
        (_, KeyCode::Char('+' | '=')) => Action::Dispatch(ViewEvent::ZoomIn),
        (_, KeyCode::Char('-')) => Action::Dispatch(ViewEvent::ZoomOut),

        _ => return None,
    };
    Some(action)
}

// ── Overlays ─────────────────────────────────────────────────────────

/// Area of `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

fn help_row(key: &'static str, label: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
        Span::styled(label, theme::key_hint()),
    ])
}

/// Render the help overlay centered on screen.
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 52, 22);

    frame.render_widget(Clear, help_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme::DRY_SEASON_SKY)))
    };

    let help_text = vec![
        Line::from(""),
        heading("  Navigation"),
        Line::from(Span::styled("  ──────────", theme::key_hint())),
        help_row("1-2 Tab", "Switch screen"),
        help_row("j/k ↑/↓", "Move through sites"),
        help_row("Enter", "Open site detail"),
        help_row("Esc", "Back"),
        Line::from(""),
        heading("  Map"),
        Line::from(Span::styled("  ───", theme::key_hint())),
        help_row("l", "Cycle base layer"),
        help_row("m", "Toggle site markers"),
        help_row("b", "Toggle baboon bubbles"),
        help_row("a / f", "Zoom to Assirik / Fongoli"),
        help_row("+ / -", "Zoom in / out"),
        Line::from(""),
        help_row("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "                    Esc or ? to close",
            theme::key_hint(),
        )),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}

/// Render a notification toast in the bottom-right corner.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2); // above status bar
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = match notif.level {
        NotificationLevel::Error => (theme::ALERT_RED, "✗"),
        NotificationLevel::Warning => (theme::SAVANNA_GOLD, "!"),
        NotificationLevel::Info => (theme::DRY_SEASON_SKY, "·"),
    };

    frame.render_widget(Clear, toast_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_DARK));

    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), theme::text()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use camtrap_core::MapLayer;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn dispatched(action: Option<Action>) -> Option<ViewEvent> {
        match action {
            Some(Action::Dispatch(event)) => Some(event),
            _ => None,
        }
    }

    #[test]
    fn toggles_flip_the_current_view() {
        let mut view = ViewState::default();
        assert_eq!(
            dispatched(global_key_action(&view, ScreenId::Map, key(KeyCode::Char('m')))),
            Some(ViewEvent::ToggleMarkers(true))
        );

        view.show_markers = true;
        assert_eq!(
            dispatched(global_key_action(&view, ScreenId::Map, key(KeyCode::Char('m')))),
            Some(ViewEvent::ToggleMarkers(false))
        );

        view.show_bubbles = false;
        assert_eq!(
            dispatched(global_key_action(&view, ScreenId::Map, key(KeyCode::Char('b')))),
            Some(ViewEvent::ToggleBubbles(true))
        );

        view.show_bubbles = true;
        assert_eq!(
            dispatched(global_key_action(&view, ScreenId::Map, key(KeyCode::Char('b')))),
            Some(ViewEvent::ToggleBubbles(false))
        );
    }

    #[test]
    fn layer_key_cycles_from_active_layer() {
        let view = ViewState {
            active_layer: MapLayer::Satellite,
            ..ViewState::default()
        };
        assert_eq!(
            dispatched(global_key_action(&view, ScreenId::Map, key(KeyCode::Char('l')))),
            Some(ViewEvent::SetLayer(MapLayer::Standard))
        );
    }

    #[test]
    fn region_and_zoom_keys() {
        let view = ViewState::default();
        assert_eq!(
            dispatched(global_key_action(&view, ScreenId::Map, key(KeyCode::Char('f')))),
            Some(ViewEvent::SelectRegion(Region::Fongoli))
        );
        assert_eq!(
            dispatched(global_key_action(&view, ScreenId::Detail, key(KeyCode::Char('+')))),
            Some(ViewEvent::ZoomIn)
        );
    }

    #[test]
    fn number_keys_outside_range_are_ignored() {
        let view = ViewState::default();
        assert!(global_key_action(&view, ScreenId::Map, key(KeyCode::Char('7'))).is_none());
        assert!(matches!(
            global_key_action(&view, ScreenId::Map, key(KeyCode::Char('2'))),
            Some(Action::SwitchScreen(ScreenId::Detail))
        ));
    }

    #[test]
    fn screen_keys_fall_through() {
        let view = ViewState::default();
        assert!(global_key_action(&view, ScreenId::Map, key(KeyCode::Char('j'))).is_none());
        assert!(global_key_action(&view, ScreenId::Map, key(KeyCode::Enter)).is_none());
    }
}
