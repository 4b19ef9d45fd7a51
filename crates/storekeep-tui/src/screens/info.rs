//! API Info screen — application metadata and health, fetched together
//! but rendered (and failing) independently.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::action::{Action, ServiceInfo};
use crate::component::Component;
use crate::theme;

pub struct InfoScreen {
    focused: bool,
    service: Option<ServiceInfo>,
    loading: bool,
}

impl InfoScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            service: None,
            loading: false,
        }
    }

    fn render_application_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Application ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = match &self.service {
            None if self.loading => vec![Line::styled("Loading…", theme::placeholder())],
            None => vec![Line::styled("Press r to load", theme::placeholder())],
            Some(ServiceInfo { info: None, .. }) => {
                vec![Line::styled("Failed to load application info", theme::placeholder_error())]
            }
            Some(ServiceInfo { info: Some(info), .. }) => {
                let mut lines = vec![
                    field_line("Name", &info.application),
                    field_line("Version", &info.version),
                ];
                if let Some(description) = &info.description {
                    lines.push(field_line("About", description));
                }
                lines.push(field_line(
                    "Reported",
                    &info.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                ));
                lines
            }
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_health_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Health ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = match &self.service {
            None if self.loading => vec![Line::styled("Loading…", theme::placeholder())],
            None => vec![Line::styled("Press r to load", theme::placeholder())],
            Some(ServiceInfo { health: None, .. }) => {
                vec![Line::styled("Failed to load health status", theme::placeholder_error())]
            }
            Some(ServiceInfo { health: Some(health), .. }) => {
                let (dot, color) = if health.is_up() {
                    ("●", theme::SUCCESS_GREEN)
                } else {
                    ("○", theme::ERROR_RED)
                };
                vec![
                    Line::from(vec![
                        Span::styled(" Status    ", theme::key_hint()),
                        Span::styled(format!("{dot} {}", health.status), Style::default().fg(color)),
                    ]),
                    field_line(
                        "Checked",
                        &health.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    ),
                ]
            }
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_hints(frame: &mut Frame, area: Rect) {
        let hints = Line::from(vec![
            Span::styled("r", theme::key_hint_key()),
            Span::styled(" reload", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), area);
    }
}

fn field_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {label:<9} "), theme::key_hint()),
        Span::styled(value.to_owned(), theme::table_row()),
    ])
}

impl Component for InfoScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('r') => Ok(Some(Action::LoadServiceInfo)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LoadServiceInfo => self.loading = true,
            Action::ServiceInfoUpdated(service) => {
                self.service = Some(service.clone());
                self.loading = false;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [panels, hints] =
            Layout::vertical([Constraint::Min(4), Constraint::Length(1)]).areas(area);
        let [application, health] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(panels);

        self.render_application_panel(frame, application);
        self.render_health_panel(frame, health);
        Self::render_hints(frame, hints);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "info"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storekeep_core::{AppInfo, HealthStatus};

    #[test]
    fn reload_key_requests_a_fetch() {
        let mut screen = InfoScreen::new();
        let key = KeyEvent::from(KeyCode::Char('r'));
        let action = screen.handle_key_event(key).unwrap();
        assert!(matches!(action, Some(Action::LoadServiceInfo)));
    }

    #[test]
    fn each_panel_fails_independently() {
        let mut screen = InfoScreen::new();
        screen
            .update(&Action::ServiceInfoUpdated(ServiceInfo {
                info: Some(AppInfo {
                    application: "storekeep".into(),
                    version: "1.0".into(),
                    description: None,
                    timestamp: Utc::now(),
                }),
                health: None,
            }))
            .unwrap();

        let service = screen.service.as_ref().unwrap();
        assert!(service.info.is_some());
        assert!(service.health.is_none());
    }

    #[test]
    fn healthy_status_reads_up() {
        let health = HealthStatus {
            status: "UP".into(),
            timestamp: Utc::now(),
        };
        assert!(health.is_up());
    }
}
