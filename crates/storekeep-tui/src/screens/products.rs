//! Products screen — filterable inventory table with a modal create/edit form.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use storekeep_core::Product;
use storekeep_core::filter::{FlagFilter, ProductFilter, filter_products};
use storekeep_core::form::ProductForm;
use tokio::sync::mpsc::UnboundedSender;

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::screens::LoadState;
use crate::theme;
use crate::widgets::{badge, centered_rect, form as form_widget, sub_tabs};

/// Fields of the product form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Category,
    Description,
    Price,
    Quantity,
    Available,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Category,
            Self::Category => Self::Description,
            Self::Description => Self::Price,
            Self::Price => Self::Quantity,
            Self::Quantity => Self::Available,
            Self::Available => Self::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Name => Self::Available,
            Self::Category => Self::Name,
            Self::Description => Self::Category,
            Self::Price => Self::Description,
            Self::Quantity => Self::Price,
            Self::Available => Self::Quantity,
        }
    }
}

/// An open modal form. `id` is None for create, Some for edit.
struct OpenForm {
    form: ProductForm,
    id: Option<i64>,
    field: FormField,
}

pub struct ProductsScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    products: Arc<Vec<Product>>,
    categories: Arc<Vec<String>>,
    load_state: LoadState,
    table_state: TableState,
    filter: ProductFilter,
    filtered: Vec<Product>,
    search_editing: bool,
    form: Option<OpenForm>,
}

impl ProductsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            action_tx: None,
            products: Arc::new(Vec::new()),
            categories: Arc::new(Vec::new()),
            load_state: LoadState::NotLoaded,
            table_state: TableState::default(),
            filter: ProductFilter::default(),
            filtered: Vec::new(),
            search_editing: false,
            form: None,
        }
    }

    /// Re-run the filter over the current snapshot and keep the selection
    /// inside the new row range.
    fn refilter(&mut self) {
        self.filtered = filter_products(&self.products, &self.filter);
        if self.filtered.is_empty() {
            self.table_state.select(None);
        } else {
            let idx = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some(idx.min(self.filtered.len() - 1)));
        }
    }

    fn selected_product(&self) -> Option<&Product> {
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

    /// Advance the category filter: all → each known category → all.
    fn cycle_category_filter(&mut self) {
        let next = match &self.filter.category {
            None => self.categories.first().cloned(),
            Some(current) => self
                .categories
                .iter()
                .position(|c| c == current)
                .and_then(|i| self.categories.get(i + 1))
                .cloned(),
        };
        self.filter.category = next;
        self.refilter();
    }

    fn open_create_form(&mut self) {
        self.form = Some(OpenForm {
            form: ProductForm::blank(),
            id: None,
            field: FormField::Name,
        });
    }

    fn open_edit_form(&mut self) -> Option<Action> {
        let Some(selected) = self.selected_product() else {
            return None;
        };
        let id = selected.id;
        // Resolve against the full snapshot rather than the filtered rows.
        match self.products.iter().find(|p| p.id == id) {
            Some(product) => {
                self.form = Some(OpenForm {
                    form: ProductForm::from_product(product),
                    id: Some(id),
                    field: FormField::Name,
                });
                None
            }
            None => Some(Action::Notify(Notification::error(format!(
                "Product {id} no longer exists"
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
                    return Some(Action::SaveProduct { draft, id: open.id });
                }
                Err(e) => return Some(Action::Notify(Notification::error(e.to_string()))),
            },
            KeyCode::Left | KeyCode::Right if open.field == FormField::Category => {
                Self::cycle_form_category(&self.categories, &mut open.form, key.code);
            }
            KeyCode::Char(' ') if open.field == FormField::Available => {
                open.form.is_available = !open.form.is_available;
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
            FormField::Category => Some(&mut open.form.category),
            FormField::Description => Some(&mut open.form.description),
            FormField::Price => Some(&mut open.form.price),
            FormField::Quantity => Some(&mut open.form.quantity),
            FormField::Available => None,
        }
    }

    /// Left/Right on the category field steps through the known categories
    /// so entries stay consistent with the backend's set. Typing still works
    /// for brand-new categories.
    fn cycle_form_category(categories: &Arc<Vec<String>>, form: &mut ProductForm, code: KeyCode) {
        if categories.is_empty() {
            return;
        }
        let pos = categories.iter().position(|c| *c == form.category);
        let next = match (code, pos) {
            (KeyCode::Right, Some(i)) => (i + 1) % categories.len(),
            (KeyCode::Left, Some(i)) => (i + categories.len() - 1) % categories.len(),
            (KeyCode::Left, None) => categories.len() - 1,
            _ => 0,
        };
        form.category.clone_from(&categories[next]);
    }

    fn placeholder_row(&self) -> Option<Row<'static>> {
        let (text, style) = match self.load_state {
            LoadState::NotLoaded => ("Loading products…", theme::placeholder()),
            LoadState::Failed => ("Error loading products", theme::placeholder_error()),
            LoadState::Loaded if self.filtered.is_empty() => {
                ("No products found", theme::placeholder())
            }
            LoadState::Loaded => return None,
        };
        Some(Row::new(vec![Cell::from(text)]).style(style))
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let availability_index = match self.filter.availability {
            FlagFilter::All => 0,
            FlagFilter::On => 1,
            FlagFilter::Off => 2,
        };
        let mut line = sub_tabs::render_sub_tabs(&["All", "Available", "Unavailable"], availability_index);

        line.push_span(Span::styled("   category: ", theme::key_hint()));
        line.push_span(Span::styled(
            self.filter.category.clone().unwrap_or_else(|| "all".to_owned()),
            theme::tab_active(),
        ));

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
        let title = format!(" Products ({}/{}) ", self.filtered.len(), self.products.len());
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let header = Row::new(vec!["Name", "Category", "Description", "Price", "Qty", "Status"])
            .style(theme::table_header())
            .height(1);

        let rows: Vec<Row> = if let Some(placeholder) = self.placeholder_row() {
            vec![placeholder]
        } else {
            self.filtered
                .iter()
                .map(|p| {
                    Row::new(vec![
                        Cell::from(p.name.clone()).style(theme::table_row()),
                        Cell::from(p.category.clone()).style(Style::default().fg(theme::CORAL)),
                        Cell::from(p.description.clone().unwrap_or_default())
                            .style(theme::key_hint()),
                        Cell::from(format!("${:.2}", p.price))
                            .style(Style::default().fg(theme::ELECTRIC_YELLOW)),
                        Cell::from(p.quantity.to_string()),
                        Cell::from(Line::from(badge::availability_badge(p.is_available))),
                    ])
                })
                .collect()
        };

        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(6),
                Constraint::Length(14),
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
            Span::styled("/", theme::key_hint_key()),
            Span::styled(" search  ", theme::key_hint()),
            Span::styled("c", theme::key_hint_key()),
            Span::styled(" category  ", theme::key_hint()),
            Span::styled("v", theme::key_hint_key()),
            Span::styled(" availability  ", theme::key_hint()),
            Span::styled("r", theme::key_hint_key()),
            Span::styled(" reload", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), area);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let Some(open) = &self.form else { return };

        let modal = centered_rect(area, 56, 21);
        frame.render_widget(Clear, modal);

        let title = if open.id.is_some() { " Edit Product " } else { " New Product " };
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let [name, category, description, price, quantity, available, hint] =
            Layout::vertical([
                Constraint::Length(3),
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
        form_widget::render_input_field(
            frame,
            category,
            "Category (←/→ to pick)",
            &f.category,
            open.field == FormField::Category,
        );
        form_widget::render_input_field(
            frame,
            description,
            "Description",
            &f.description,
            open.field == FormField::Description,
        );
        form_widget::render_input_field(frame, price, "Price", &f.price, open.field == FormField::Price);
        form_widget::render_input_field(
            frame,
            quantity,
            "Quantity",
            &f.quantity,
            open.field == FormField::Quantity,
        );
        form_widget::render_checkbox(
            frame,
            available,
            "Available",
            f.is_available,
            open.field == FormField::Available,
        );

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

impl Component for ProductsScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

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
            KeyCode::Char('c') => {
                self.cycle_category_filter();
                None
            }
            KeyCode::Char('v') => {
                self.filter.availability = self.filter.availability.cycle();
                self.refilter();
                None
            }
            KeyCode::Char('a') => {
                self.open_create_form();
                None
            }
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => self.selected_product().map(|p| {
                Action::ShowConfirm(ConfirmAction::DeleteProduct {
                    id: p.id,
                    name: p.name.clone(),
                })
            }),
            KeyCode::Char('r') => {
                if let Some(tx) = &self.action_tx {
                    let _ = tx.send(Action::LoadCategories);
                }
                Some(Action::LoadProducts)
            }
            KeyCode::Esc if key.modifiers == KeyModifiers::NONE && self.filter.is_active() => {
                self.filter = ProductFilter::default();
                self.refilter();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ProductsUpdated(products) => {
                self.products = Arc::clone(products);
                self.load_state = LoadState::Loaded;
                self.refilter();
            }
            Action::ProductsLoadFailed => self.load_state = LoadState::Failed,
            Action::CategoriesUpdated(categories) => {
                self.categories = Arc::clone(categories);
            }
            Action::ProductSaved => self.form = None,
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
        "products"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn product(id: i64, name: &str, category: &str, available: bool) -> Product {
        Product {
            id,
            name: name.to_owned(),
            category: category.to_owned(),
            description: None,
            price: 9.99,
            quantity: 3,
            is_available: available,
        }
    }

    fn loaded_screen() -> ProductsScreen {
        let mut screen = ProductsScreen::new();
        screen
            .update(&Action::ProductsUpdated(Arc::new(vec![
                product(1, "Laptop", "Electronics", true),
                product(2, "Mug", "Kitchen", false),
                product(3, "Keyboard", "Electronics", true),
            ])))
            .unwrap();
        screen
    }

    #[test]
    fn search_typing_narrows_rows_live() {
        let mut screen = loaded_screen();
        screen.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        assert!(screen.capturing_input());

        screen.handle_key_event(key(KeyCode::Char('m'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('u'))).unwrap();
        assert_eq!(screen.filtered.len(), 1);
        assert_eq!(screen.filtered[0].name, "Mug");
    }

    #[test]
    fn escape_in_search_clears_query() {
        let mut screen = loaded_screen();
        screen.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('x'))).unwrap();
        assert!(screen.filtered.is_empty());

        screen.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(!screen.capturing_input());
        assert_eq!(screen.filtered.len(), 3);
    }

    #[test]
    fn category_filter_cycles_back_to_all() {
        let mut screen = loaded_screen();
        screen
            .update(&Action::CategoriesUpdated(Arc::new(vec![
                "Electronics".to_owned(),
                "Kitchen".to_owned(),
            ])))
            .unwrap();

        screen.handle_key_event(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(screen.filter.category.as_deref(), Some("Electronics"));
        assert_eq!(screen.filtered.len(), 2);

        screen.handle_key_event(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(screen.filter.category.as_deref(), Some("Kitchen"));

        screen.handle_key_event(key(KeyCode::Char('c'))).unwrap();
        assert_eq!(screen.filter.category, None);
        assert_eq!(screen.filtered.len(), 3);
    }

    #[test]
    fn selection_clamps_when_filter_shrinks_rows() {
        let mut screen = loaded_screen();
        screen.move_selection(2);
        assert_eq!(screen.table_state.selected(), Some(2));

        screen.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('m'))).unwrap();
        assert_eq!(screen.table_state.selected(), Some(0));
    }

    #[test]
    fn delete_key_asks_for_confirmation() {
        let mut screen = loaded_screen();
        let action = screen.handle_key_event(key(KeyCode::Char('d'))).unwrap();
        match action {
            Some(Action::ShowConfirm(ConfirmAction::DeleteProduct { id: 1, name })) => {
                assert_eq!(name, "Laptop");
            }
            other => panic!("expected delete confirmation, got: {other:?}"),
        }
    }

    #[test]
    fn form_submit_with_blank_name_notifies_error() {
        let mut screen = loaded_screen();
        screen.handle_key_event(key(KeyCode::Char('a'))).unwrap();
        assert!(screen.capturing_input());

        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        match action {
            Some(Action::Notify(n)) => {
                assert_eq!(n.level, crate::action::NotificationLevel::Error);
            }
            other => panic!("expected validation notification, got: {other:?}"),
        }
        // Form stays open after a failed submit.
        assert!(screen.capturing_input());
    }

    #[test]
    fn edit_prefills_form_from_selected_row() {
        let mut screen = loaded_screen();
        screen.move_selection(1);
        screen.handle_key_event(key(KeyCode::Char('e'))).unwrap();

        let open = screen.form.as_ref().unwrap();
        assert_eq!(open.id, Some(2));
        assert_eq!(open.form.name, "Mug");
    }

    #[test]
    fn load_failure_shows_error_placeholder() {
        let mut screen = loaded_screen();
        screen.update(&Action::ProductsLoadFailed).unwrap();
        assert_eq!(screen.load_state, LoadState::Failed);
        assert!(screen.placeholder_row().is_some());
    }

    #[test]
    fn save_completion_closes_the_form() {
        let mut screen = loaded_screen();
        screen.handle_key_event(key(KeyCode::Char('a'))).unwrap();
        screen.update(&Action::ProductSaved).unwrap();
        assert!(!screen.capturing_input());
    }
}
