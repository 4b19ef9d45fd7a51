//! Application loop — event handling, action processing, and top-level
//! rendering (tab bar, status bar, overlays).

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use storekeep_core::Backend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel, ServiceInfo};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::centered_rect;

/// How long a toast stays on screen. A newer toast replaces the current
/// one and restarts this timer.
const TOAST_DURATION: Duration = Duration::from_secs(3);

struct Toast {
    notification: Notification,
    expires_at: Instant,
}

pub struct App {
    backend: Backend,
    server: String,
    screens: Vec<(ScreenId, Box<dyn Component>)>,
    active_screen: ScreenId,
    running: bool,
    help_visible: bool,
    confirm: Option<ConfirmAction>,
    toast: Option<Toast>,
    action_tx: UnboundedSender<Action>,
    action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new(backend: Backend, server: String) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            server,
            screens: create_screens(),
            active_screen: ScreenId::default(),
            running: true,
            help_visible: false,
            confirm: None,
            toast: None,
            action_tx,
            action_rx,
        }
    }

    /// Main loop. Runs until an [`Action::Quit`] is processed.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut events = EventReader::new();

        for (_, screen) in &mut self.screens {
            screen.init(self.action_tx.clone())?;
        }
        self.focus_active();
        self.spawn_store_watchers();

        // The first tab is visible immediately, so load it up front.
        self.dispatch(Action::LoadProducts);
        self.dispatch(Action::LoadCategories);

        while self.running {
            if let Some(event) = events.next().await {
                self.handle_event(event)?;
            }
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(action, tui)?;
            }
        }

        events.stop();
        Ok(())
    }

    fn dispatch(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }

    fn active_component(&self) -> Option<&dyn Component> {
        self.screens
            .iter()
            .find(|(id, _)| *id == self.active_screen)
            .map(|(_, screen)| screen.as_ref())
    }

    fn active_component_mut(&mut self) -> Option<&mut Box<dyn Component>> {
        self.screens
            .iter_mut()
            .find(|(id, _)| *id == self.active_screen)
            .map(|(_, screen)| screen)
    }

    fn focus_active(&mut self) {
        let active = self.active_screen;
        for (id, screen) in &mut self.screens {
            screen.set_focused(*id == active);
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => {
                if let Some(action) = self.handle_key(key)? {
                    self.dispatch(action);
                }
            }
            Event::Resize(w, h) => self.dispatch(Action::Resize(w, h)),
            Event::Tick => self.dispatch(Action::Tick),
            Event::Render => self.dispatch(Action::Render),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Ctrl+C always quits, even mid-form.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y') | KeyCode::Enter => Some(Action::ConfirmYes),
                KeyCode::Char('n') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        // While a screen is in text entry, every key belongs to it.
        if self.active_component().is_some_and(Component::capturing_input) {
            if let Some(screen) = self.active_component_mut() {
                return screen.handle_key_event(key);
            }
        }

        match key.code {
            KeyCode::Char('q') => Ok(Some(Action::Quit)),
            KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
            KeyCode::Char(c @ '1'..='3') => {
                Ok(ScreenId::from_number(c as u8 - b'0').map(Action::SwitchScreen))
            }
            KeyCode::Tab => Ok(Some(Action::SwitchScreen(self.active_screen.next()))),
            KeyCode::BackTab => Ok(Some(Action::SwitchScreen(self.active_screen.prev()))),
            _ => match self.active_component_mut() {
                Some(screen) => screen.handle_key_event(key),
                None => Ok(None),
            },
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    fn process_action(&mut self, action: Action, tui: &mut Tui) -> Result<()> {
        if !matches!(action, Action::Tick | Action::Render) {
            debug!(?action, "processing");
        }

        match &action {
            Action::Quit => self.running = false,
            Action::Tick => {
                if self.toast.as_ref().is_some_and(|t| t.expires_at <= Instant::now()) {
                    self.toast = None;
                }
            }
            Action::Render => {
                tui.draw(|frame| self.render(frame))?;
            }
            Action::Resize(..) => {} // redrawn on the next render tick

            Action::SwitchScreen(id) => {
                self.active_screen = *id;
                self.focus_active();
                self.load_screen_data(*id);
            }
            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::ShowConfirm(confirm) => self.confirm = Some(confirm.clone()),
            Action::ConfirmYes => {
                if let Some(confirm) = self.confirm.take() {
                    match confirm {
                        ConfirmAction::DeleteProduct { id, .. } => {
                            self.dispatch(Action::DeleteProduct(id));
                        }
                        ConfirmAction::DeleteUser { id, .. } => {
                            self.dispatch(Action::DeleteUser(id));
                        }
                    }
                }
            }
            Action::ConfirmNo => self.confirm = None,

            Action::Notify(notification) => {
                self.toast = Some(Toast {
                    notification: notification.clone(),
                    expires_at: Instant::now() + TOAST_DURATION,
                });
            }
            Action::DismissNotification => self.toast = None,

            Action::LoadProducts => self.spawn_load_products(),
            Action::LoadCategories => self.spawn_load_categories(),
            Action::LoadUsers => self.spawn_load_users(),
            Action::LoadServiceInfo => self.spawn_load_service_info(),

            Action::SaveProduct { draft, id } => self.spawn_save_product(draft.clone(), *id),
            Action::DeleteProduct(id) => self.spawn_delete_product(*id),
            Action::SaveUser { draft, id } => self.spawn_save_user(draft.clone(), *id),
            Action::DeleteUser(id) => self.spawn_delete_user(*id),
            Action::SetUserActive { id, active } => self.spawn_set_user_active(*id, *active),

            // Data events are handled by the screens below.
            _ => {}
        }

        // Every action is offered to every screen, so background screens
        // stay current without refetching on focus.
        let mut follow_ups = Vec::new();
        for (_, screen) in &mut self.screens {
            if let Some(follow_up) = screen.update(&action)? {
                follow_ups.push(follow_up);
            }
        }
        for follow_up in follow_ups {
            self.dispatch(follow_up);
        }
        Ok(())
    }

    /// Lazy loading on tab switch: list tabs fetch only on first visit,
    /// the info tab refreshes every time.
    fn load_screen_data(&self, id: ScreenId) {
        match id {
            ScreenId::Products => {
                if !self.backend.store().products_loaded() {
                    self.dispatch(Action::LoadProducts);
                    self.dispatch(Action::LoadCategories);
                }
            }
            ScreenId::Users => {
                if !self.backend.store().users_loaded() {
                    self.dispatch(Action::LoadUsers);
                }
            }
            ScreenId::Info => self.dispatch(Action::LoadServiceInfo),
        }
    }

    // ── Background tasks ─────────────────────────────────────────────

    /// Forward store change notifications into the action loop. Snapshot
    /// replacement is the only success signal: every load or mutation that
    /// commits shows up here, so the spawned tasks below only have to
    /// report failures and toasts.
    fn spawn_store_watchers(&self) {
        let mut products_rx = self.backend.store().subscribe_products();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            while products_rx.changed().await.is_ok() {
                let snapshot = products_rx.borrow_and_update().clone();
                if tx.send(Action::ProductsUpdated(snapshot)).is_err() {
                    break;
                }
            }
        });

        let mut users_rx = self.backend.store().subscribe_users();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            while users_rx.changed().await.is_ok() {
                let snapshot = users_rx.borrow_and_update().clone();
                if tx.send(Action::UsersUpdated(snapshot)).is_err() {
                    break;
                }
            }
        });

        let mut categories_rx = self.backend.store().subscribe_categories();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            while categories_rx.changed().await.is_ok() {
                let snapshot = categories_rx.borrow_and_update().clone();
                if tx.send(Action::CategoriesUpdated(snapshot)).is_err() {
                    break;
                }
            }
        });
    }

    fn spawn_load_products(&self) {
        let backend = self.backend.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.refresh_products().await {
                error!("failed to load products: {e}");
                let _ = tx.send(Action::ProductsLoadFailed);
                let _ = tx.send(Action::Notify(Notification::error(format!(
                    "Error loading products: {e}"
                ))));
            }
        });
    }

    fn spawn_load_categories(&self) {
        let backend = self.backend.clone();
        tokio::spawn(async move {
            // Categories only feed the filter bar; a failure is not worth
            // a toast on top of the products error.
            if let Err(e) = backend.refresh_categories().await {
                error!("failed to load categories: {e}");
            }
        });
    }

    fn spawn_load_users(&self) {
        let backend = self.backend.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.refresh_users().await {
                error!("failed to load users: {e}");
                let _ = tx.send(Action::UsersLoadFailed);
                let _ = tx.send(Action::Notify(Notification::error(format!(
                    "Error loading users: {e}"
                ))));
            }
        });
    }

    fn spawn_load_service_info(&self) {
        let backend = self.backend.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let info = backend.info().await;
            let health = backend.health().await;
            if let Err(e) = &info {
                error!("failed to load application info: {e}");
            }
            if let Err(e) = &health {
                error!("failed to load health status: {e}");
            }
            let _ = tx.send(Action::ServiceInfoUpdated(ServiceInfo {
                info: info.ok(),
                health: health.ok(),
            }));
        });
    }

    fn spawn_save_product(&self, draft: storekeep_core::ProductDraft, id: Option<i64>) {
        let backend = self.backend.clone();
        let tx = self.action_tx.clone();
        let verb = if id.is_some() { "updated" } else { "created" };
        tokio::spawn(async move {
            match backend.save_product(&draft, id).await {
                Ok(()) => {
                    let _ = tx.send(Action::ProductSaved);
                    let _ = tx.send(Action::Notify(Notification::success(format!(
                        "Product {verb} successfully!"
                    ))));
                }
                Err(e) => {
                    error!("failed to save product: {e}");
                    let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                }
            }
        });
    }

    fn spawn_delete_product(&self, id: i64) {
        let backend = self.backend.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match backend.delete_product(id).await {
                Ok(()) => {
                    let _ = tx.send(Action::Notify(Notification::success(
                        "Product deleted successfully!",
                    )));
                }
                Err(e) => {
                    error!("failed to delete product: {e}");
                    let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                }
            }
        });
    }

    fn spawn_save_user(&self, draft: storekeep_core::UserDraft, id: Option<i64>) {
        let backend = self.backend.clone();
        let tx = self.action_tx.clone();
        let verb = if id.is_some() { "updated" } else { "created" };
        tokio::spawn(async move {
            match backend.save_user(&draft, id).await {
                Ok(()) => {
                    let _ = tx.send(Action::UserSaved);
                    let _ = tx.send(Action::Notify(Notification::success(format!(
                        "User {verb} successfully!"
                    ))));
                }
                Err(e) => {
                    error!("failed to save user: {e}");
                    let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                }
            }
        });
    }

    fn spawn_delete_user(&self, id: i64) {
        let backend = self.backend.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match backend.delete_user(id).await {
                Ok(()) => {
                    let _ = tx.send(Action::Notify(Notification::success(
                        "User deleted successfully!",
                    )));
                }
                Err(e) => {
                    error!("failed to delete user: {e}");
                    let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                }
            }
        });
    }

    fn spawn_set_user_active(&self, id: i64, active: bool) {
        let backend = self.backend.clone();
        let tx = self.action_tx.clone();
        let verb = if active { "activated" } else { "deactivated" };
        tokio::spawn(async move {
            match backend.set_user_active(id, active).await {
                Ok(()) => {
                    let _ = tx.send(Action::Notify(Notification::success(format!(
                        "User {verb} successfully!"
                    ))));
                }
                Err(e) => {
                    error!("failed to toggle user: {e}");
                    let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                }
            }
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [tab_bar, content, status_bar] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_tab_bar(frame, tab_bar);
        if let Some(screen) = self.active_component() {
            screen.render(frame, content);
        }
        self.render_status_bar(frame, status_bar);

        if self.help_visible {
            Self::render_help(frame, area);
        }
        if let Some(confirm) = &self.confirm {
            Self::render_confirm(frame, area, confirm);
        }
        // Toast renders last so nothing covers it.
        if let Some(toast) = &self.toast {
            Self::render_toast(frame, content, toast);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            " storekeep ",
            Style::default()
                .fg(theme::ELECTRIC_PURPLE)
                .add_modifier(Modifier::BOLD),
        )];
        for id in ScreenId::ALL {
            spans.push(Span::styled("  ", theme::key_hint()));
            let label = format!("[{}] {}", id.number(), id.label());
            spans.push(Span::styled(
                label,
                if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                },
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" ?", theme::key_hint_key()),
            Span::styled(" help  ", theme::key_hint()),
            Span::styled("Tab", theme::key_hint_key()),
            Span::styled(" switch  ", theme::key_hint()),
            Span::styled("q", theme::key_hint_key()),
            Span::styled(" quit", theme::key_hint()),
            Span::styled(format!("   {}", self.server), theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help(frame: &mut Frame, area: Rect) {
        let modal = centered_rect(area, 52, 16);
        frame.render_widget(Clear, modal);

        let block = Block::default()
            .title(Span::styled(" Help ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let entry = |key: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!(" {key:<9}"), theme::key_hint_key()),
                Span::styled(what, theme::table_row()),
            ])
        };
        let lines = vec![
            entry("1-3/Tab", "switch tab"),
            entry("j/k ↑/↓", "move selection"),
            entry("/", "live search"),
            entry("c v s", "cycle filters"),
            entry("a e d", "add / edit / delete"),
            entry("t", "toggle user active"),
            entry("r", "reload"),
            entry("Esc", "clear filters / close"),
            entry("?", "toggle this help"),
            entry("q", "quit"),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_confirm(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let modal = centered_rect(area, 56, 5);
        frame.render_widget(Clear, modal);

        let block = Block::default()
            .title(Span::styled(" Confirm ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ERROR_RED));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let lines = vec![
            Line::styled(format!(" {confirm}"), theme::table_row()),
            Line::from(vec![
                Span::styled(" y", theme::key_hint_key()),
                Span::styled(" delete  ", theme::key_hint()),
                Span::styled("n", theme::key_hint_key()),
                Span::styled(" cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast) {
        let color = match toast.notification.level {
            NotificationLevel::Success => theme::SUCCESS_GREEN,
            NotificationLevel::Error => theme::ERROR_RED,
            NotificationLevel::Info => theme::NEON_CYAN,
        };

        #[allow(clippy::cast_possible_truncation)]
        let width = (toast.notification.message.chars().count() as u16 + 4).min(area.width);
        let toast_area = Rect::new(
            area.x + area.width.saturating_sub(width),
            area.y + area.height.saturating_sub(3),
            width,
            3,
        );
        frame.render_widget(Clear, toast_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color));
        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);
        frame.render_widget(
            Paragraph::new(Line::styled(
                toast.notification.message.clone(),
                Style::default()
                    .fg(color)
                    .bg(theme::BG_DARK)
                    .add_modifier(Modifier::BOLD),
            )),
            inner,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn app() -> App {
        let backend = Backend::new("http://localhost:8082/api").unwrap();
        App::new(backend, "http://localhost:8082/api".to_owned())
    }

    #[tokio::test]
    async fn number_keys_switch_screens() {
        let mut app = app();
        let action = app.handle_key(KeyEvent::from(KeyCode::Char('2'))).unwrap();
        assert!(matches!(action, Some(Action::SwitchScreen(ScreenId::Users))));

        let action = app.handle_key(KeyEvent::from(KeyCode::Char('4'))).unwrap();
        assert!(action.is_none());
    }

    #[tokio::test]
    async fn confirm_overlay_swallows_other_keys() {
        let mut app = app();
        app.confirm = Some(ConfirmAction::DeleteProduct {
            id: 1,
            name: "Laptop".to_owned(),
        });

        // 'q' must not quit while the dialog is up
        let action = app.handle_key(KeyEvent::from(KeyCode::Char('q'))).unwrap();
        assert!(action.is_none());

        let action = app.handle_key(KeyEvent::from(KeyCode::Char('y'))).unwrap();
        assert!(matches!(action, Some(Action::ConfirmYes)));
    }

    #[tokio::test]
    async fn confirm_yes_dispatches_the_pending_delete() {
        let mut app = app();
        app.confirm = Some(ConfirmAction::DeleteUser {
            id: 7,
            name: "Ada".to_owned(),
        });

        let mut tui = Tui::new().unwrap();
        app.process_action(Action::ConfirmYes, &mut tui).unwrap();
        assert!(app.confirm.is_none());

        let next = app.action_rx.try_recv().unwrap();
        assert!(matches!(next, Action::DeleteUser(7)));
    }

    #[tokio::test]
    async fn newer_toast_replaces_and_restarts_the_timer() {
        let mut app = app();
        let mut tui = Tui::new().unwrap();

        app.process_action(
            Action::Notify(Notification::success("first")),
            &mut tui,
        )
        .unwrap();
        let first_deadline = app.toast.as_ref().unwrap().expires_at;

        app.process_action(
            Action::Notify(Notification::error("second")),
            &mut tui,
        )
        .unwrap();
        let toast = app.toast.as_ref().unwrap();
        assert_eq!(toast.notification.message, "second");
        assert!(toast.expires_at >= first_deadline);
    }

    #[tokio::test]
    async fn tick_expires_an_old_toast() {
        let mut app = app();
        let mut tui = Tui::new().unwrap();

        app.toast = Some(Toast {
            notification: Notification::success("done"),
            expires_at: Instant::now() - Duration::from_millis(1),
        });
        app.process_action(Action::Tick, &mut tui).unwrap();
        assert!(app.toast.is_none());
    }

    #[tokio::test]
    async fn ctrl_c_quits_even_during_text_entry() {
        let mut app = app();
        // Put the products screen into search mode.
        app.handle_key(KeyEvent::from(KeyCode::Char('/'))).unwrap();

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let action = app.handle_key(ctrl_c).unwrap();
        assert!(matches!(action, Some(Action::Quit)));

        // A plain 'q' during search goes to the search buffer instead.
        let action = app.handle_key(KeyEvent::from(KeyCode::Char('q'))).unwrap();
        assert!(action.is_none());
    }
}
