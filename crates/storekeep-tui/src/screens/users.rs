//! Users screen — account table with activate/deactivate and a modal form.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use storekeep_core::User;
use storekeep_core::filter::{FlagFilter, UserFilter, filter_users};
use storekeep_core::form::UserForm;

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::screens::LoadState;
use crate::theme;
use crate::widgets::{badge, centered_rect, form as form_widget, sub_tabs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Email,
    Phone,
    Address,
    Active,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Email,
            Self::Email => Self::Phone,
            Self::Phone => Self::Address,
            Self::Address => Self::Active,
            Self::Active => Self::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Name => Self::Active,
            Self::Email => Self::Name,
            Self::Phone => Self::Email,
            Self::Address => Self::Phone,
            Self::Active => Self::Address,
        }
    }
}

struct OpenForm {
    form: UserForm,
    id: Option<i64>,
    field: FormField,
}

pub struct UsersScreen {
    focused: bool,
    users: Arc<Vec<User>>,
    load_state: LoadState,
    table_state: TableState,
    filter: UserFilter,
    filtered: Vec<User>,
    search_editing: bool,
    form: Option<OpenForm>,
}

impl UsersScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            users: Arc::new(Vec::new()),
            load_state: LoadState::NotLoaded,
            table_state: TableState::default(),
            filter: UserFilter::default(),
            filtered: Vec::new(),
            search_editing: false,
            form: None,
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter_users(&self.users, &self.filter);
        if self.filtered.is_empty() {
            self.table_state.select(None);
        } else {
            let idx = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some(idx.min(self.filtered.len() - 1)));
        }
    }

    fn selected_user(&self) -> Option<&User> {
        self.table_state.selected().and_then(|i| self.filtered.get(i))
    }

    fn move_selection(&mut self, delta: i64) {
        if self.filtered.is_empty() {
            return;
        }
        #[allow(clippy::cast_possible_wrap)]
        let len = self.filtered.len() as i64;
        #[allow(clippy::cast_possible_wrap)]
        let current = self.table_state.selected().unwrap_or(0) as i64;
        let next = (current + delta).clamp(0, len - 1);
        #[allow(clippy::cast_sign_loss)]
        self.table_state.select(Some(next as usize));
    }

    fn open_create_form(&mut self) {
        self.form = Some(OpenForm {
            form: UserForm::blank(),
            id: None,
            field: FormField::Name,
        });
    }

    fn open_edit_form(&mut self) -> Option<Action> {
        let id = self.selected_user()?.id;
        match self.users.iter().find(|u| u.id == id) {
            Some(user) => {
                self.form = Some(OpenForm {
                    form: UserForm::from_user(user),
                    id: Some(id),
                    field: FormField::Name,
                });
                None
            }
            None => Some(Action::Notify(Notification::error(format!(
                "User {id} no longer exists"
            )))),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter.query.clear();
                self.search_editing = false;
                self.refilter();
            }
            KeyCode::Enter => self.search_editing = false,
            KeyCode::Backspace => {
                self.filter.query.pop();
                self.refilter();
            }
            KeyCode::Char(c) => {
                self.filter.query.push(c);
                self.refilter();
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let open = self.form.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.form = None;
            }
            KeyCode::Tab | KeyCode::Down => open.field = open.field.next(),
            KeyCode::BackTab | KeyCode::Up => open.field = open.field.prev(),
            KeyCode::Enter => match open.form.parse() {
                Ok(draft) => {
                    return Some(Action::SaveUser { draft, id: open.id });
                }
                Err(e) => return Some(Action::Notify(Notification::error(e.to_string()))),
            },
            KeyCode::Char(' ') if open.field == FormField::Active => {
                open.form.is_active = !open.form.is_active;
            }
            KeyCode::Char(c) => {
                if let Some(buf) = Self::active_buffer(open) {
                    buf.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(buf) = Self::active_buffer(open) {
                    buf.pop();
                }
            }
            _ => {}
        }
        None
    }

    fn active_buffer(open: &mut OpenForm) -> Option<&mut String> {
        match open.field {
            FormField::Name => Some(&mut open.form.name),
            FormField::Email => Some(&mut open.form.email),
            FormField::Phone => Some(&mut open.form.phone),
            FormField::Address => Some(&mut open.form.address),
            FormField::Active => None,
        }
    }

    fn placeholder_row(&self) -> Option<Row<'static>> {
        let (text, style) = match self.load_state {
            LoadState::NotLoaded => ("Loading users…", theme::placeholder()),
            LoadState::Failed => ("Error loading users", theme::placeholder_error()),
            LoadState::Loaded if self.filtered.is_empty() => ("No users found", theme::placeholder()),
            LoadState::Loaded => return None,
        };
        Some(Row::new(vec![Cell::from(text)]).style(style))
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let active_index = match self.filter.active {
            FlagFilter::All => 0,
            FlagFilter::On => 1,
            FlagFilter::Off => 2,
        };
        let mut line = sub_tabs::render_sub_tabs(&["All", "Active", "Inactive"], active_index);

        line.push_span(Span::styled("   /", theme::key_hint_key()));
        if self.search_editing {
            line.push_span(Span::styled(
                format!(" {}█", self.filter.query),
                theme::tab_active(),
            ));
        } else if self.filter.query.is_empty() {
            line.push_span(Span::styled(" search", theme::key_hint()));
        } else {
            line.push_span(Span::styled(
                format!(" {}", self.filter.query),
                theme::tab_active(),
            ));
        }

        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" Users ({}/{}) ", self.filtered.len(), self.users.len());
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let header = Row::new(vec!["Name", "Email", "Phone", "Address", "Status"])
            .style(theme::table_header())
            .height(1);

        let rows: Vec<Row> = if let Some(placeholder) = self.placeholder_row() {
            vec![placeholder]
        } else {
            self.filtered
                .iter()
                .map(|u| {
                    Row::new(vec![
                        Cell::from(u.name.clone()).style(theme::table_row()),
                        Cell::from(u.email.clone()),
                        Cell::from(u.phone.clone().unwrap_or_else(|| "N/A".to_owned()))
                            .style(theme::key_hint()),
                        Cell::from(u.address.clone().unwrap_or_else(|| "N/A".to_owned()))
                            .style(theme::key_hint()),
                        Cell::from(Line::from(badge::active_badge(u.is_active))),
                    ])
                })
                .collect()
        };

        let table = Table::new(
            rows,
            [
                Constraint::Min(16),
                Constraint::Min(24),
                Constraint::Length(16),
                Constraint::Min(20),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(theme::table_selected())
        .highlight_symbol("▶ ");

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_hints(frame: &mut Frame, area: Rect) {
        let hints = Line::from(vec![
            Span::styled("a", theme::key_hint_key()),
            Span::styled(" add  ", theme::key_hint()),
            Span::styled("e", theme::key_hint_key()),
            Span::styled(" edit  ", theme::key_hint()),
            Span::styled("d", theme::key_hint_key()),
            Span::styled(" delete  ", theme::key_hint()),
            Span::styled("t", theme::key_hint_key()),
            Span::styled(" toggle active  ", theme::key_hint()),
            Span::styled("/", theme::key_hint_key()),
            Span::styled(" search  ", theme::key_hint()),
            Span::styled("s", theme::key_hint_key()),
            Span::styled(" status  ", theme::key_hint()),
            Span::styled("r", theme::key_hint_key()),
            Span::styled(" reload", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), area);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let Some(open) = &self.form else { return };

        let modal = centered_rect(area, 56, 18);
        frame.render_widget(Clear, modal);

        let title = if open.id.is_some() { " Edit User " } else { " New User " };
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let [name, email, phone, address, active, hint] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let f = &open.form;
        form_widget::render_input_field(frame, name, "Name", &f.name, open.field == FormField::Name);
        form_widget::render_input_field(frame, email, "Email", &f.email, open.field == FormField::Email);
        form_widget::render_input_field(frame, phone, "Phone", &f.phone, open.field == FormField::Phone);
        form_widget::render_input_field(
            frame,
            address,
            "Address",
            &f.address,
            open.field == FormField::Address,
        );
        form_widget::render_checkbox(frame, active, "Active", f.is_active, open.field == FormField::Active);

        let hints = Line::from(vec![
            Span::styled(" Enter", theme::key_hint_key()),
            Span::styled(" save  ", theme::key_hint()),
            Span::styled("Tab", theme::key_hint_key()),
            Span::styled(" next field  ", theme::key_hint()),
            Span::styled("Esc", theme::key_hint_key()),
            Span::styled(" cancel", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hint);
    }
}

impl Component for UsersScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.form.is_some() {
            return Ok(self.handle_form_key(key));
        }
        if self.search_editing {
            self.handle_search_key(key);
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') => {
                self.move_selection(i64::MIN / 2);
                None
            }
            KeyCode::Char('G') => {
                self.move_selection(i64::MAX / 2);
                None
            }
            KeyCode::Char('/') => {
                self.search_editing = true;
                None
            }
            KeyCode::Char('s') => {
                self.filter.active = self.filter.active.cycle();
                self.refilter();
                None
            }
            KeyCode::Char('a') => {
                self.open_create_form();
                None
            }
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => self.selected_user().map(|u| {
                Action::ShowConfirm(ConfirmAction::DeleteUser {
                    id: u.id,
                    name: u.name.clone(),
                })
            }),
            KeyCode::Char('t') => self.selected_user().map(|u| Action::SetUserActive {
                id: u.id,
                active: !u.is_active,
            }),
            KeyCode::Char('r') => Some(Action::LoadUsers),
            KeyCode::Esc if key.modifiers == KeyModifiers::NONE && self.filter.is_active() => {
                self.filter = UserFilter::default();
                self.refilter();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::UsersUpdated(users) => {
                self.users = Arc::clone(users);
                self.load_state = LoadState::Loaded;
                self.refilter();
            }
            Action::UsersLoadFailed => self.load_state = LoadState::Failed,
            Action::UserSaved => self.form = None,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [filter_bar, table, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_filter_bar(frame, filter_bar);
        self.render_table(frame, table);
        Self::render_hints(frame, hints);
        self.render_form(frame, area);
    }

    fn capturing_input(&self) -> bool {
        self.form.is_some() || self.search_editing
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "users"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn user(id: i64, name: &str, active: bool) -> User {
        User {
            id,
            name: name.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            address: None,
            is_active: active,
        }
    }

    fn loaded_screen() -> UsersScreen {
        let mut screen = UsersScreen::new();
        screen
            .update(&Action::UsersUpdated(Arc::new(vec![
                user(1, "Ada", true),
                user(2, "Grace", false),
            ])))
            .unwrap();
        screen
    }

    #[test]
    fn toggle_sends_the_inverse_of_current_state() {
        let mut screen = loaded_screen();
        let action = screen.handle_key_event(key(KeyCode::Char('t'))).unwrap();
        match action {
            Some(Action::SetUserActive { id: 1, active: false }) => {}
            other => panic!("expected deactivate for Ada, got: {other:?}"),
        }

        screen.move_selection(1);
        let action = screen.handle_key_event(key(KeyCode::Char('t'))).unwrap();
        match action {
            Some(Action::SetUserActive { id: 2, active: true }) => {}
            other => panic!("expected activate for Grace, got: {other:?}"),
        }
    }

    #[test]
    fn status_filter_cycles_and_narrows() {
        let mut screen = loaded_screen();
        screen.handle_key_event(key(KeyCode::Char('s'))).unwrap();
        assert_eq!(screen.filter.active, FlagFilter::On);
        assert_eq!(screen.filtered.len(), 1);
        assert_eq!(screen.filtered[0].name, "Ada");

        screen.handle_key_event(key(KeyCode::Char('s'))).unwrap();
        assert_eq!(screen.filtered[0].name, "Grace");

        screen.handle_key_event(key(KeyCode::Char('s'))).unwrap();
        assert_eq!(screen.filtered.len(), 2);
    }

    #[test]
    fn form_submit_requires_email() {
        let mut screen = loaded_screen();
        screen.handle_key_event(key(KeyCode::Char('a'))).unwrap();
        for c in "Ada".chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }

        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        match action {
            Some(Action::Notify(n)) => assert!(n.message.contains("email")),
            other => panic!("expected validation notification, got: {other:?}"),
        }
    }

    #[test]
    fn empty_snapshot_shows_placeholder_not_failure() {
        let mut screen = UsersScreen::new();
        assert_eq!(screen.load_state, LoadState::NotLoaded);

        screen
            .update(&Action::UsersUpdated(Arc::new(Vec::new())))
            .unwrap();
        assert_eq!(screen.load_state, LoadState::Loaded);
        let row = screen.placeholder_row();
        assert!(row.is_some());
    }

    #[test]
    fn delete_on_empty_table_is_a_no_op() {
        let mut screen = UsersScreen::new();
        let action = screen.handle_key_event(key(KeyCode::Char('d'))).unwrap();
        assert!(action.is_none());
    }
}
