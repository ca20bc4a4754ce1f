use std::cell::Cell;
use std::mem;
use std::rc::Rc;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, info};

use crate::cover::CoverFetcher;
use crate::models::Book;
use crate::projection::{project, Projection, SortKey};
use crate::storage::SharedStorage;
use crate::store::BookStore;
use crate::theme::Theme;

use super::forms::{BookForm, ConfirmBookDelete};
use super::helpers::{book_card_lines, centered_rect};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Header rows for the search and sort summary.
const HEADER_HEIGHT: u16 = 3;
/// Rows jumped by PageUp / PageDown.
const PAGE_STEP: isize = 5;

/// The two display partitions.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Shelf {
    InProgress,
    Completed,
}

impl Shelf {
    fn other(self) -> Self {
        match self {
            Shelf::InProgress => Shelf::Completed,
            Shelf::Completed => Shelf::InProgress,
        }
    }

    fn index(self) -> usize {
        match self {
            Shelf::InProgress => 0,
            Shelf::Completed => 1,
        }
    }
}

/// Fine-grained modes layered over the shelf view.
enum Mode {
    Normal,
    Adding(BookForm),
    Editing { id: i64, form: BookForm },
    ConfirmDelete(ConfirmBookDelete),
    Searching(SearchState),
}

/// State for an active inline search. `previous` restores the old query when
/// the search is cancelled.
struct SearchState {
    previous: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: BookStore,
    storage: SharedStorage,
    covers: Option<CoverFetcher>,
    theme: Theme,
    query: String,
    sort: SortKey,
    projection: Projection,
    needs_render: Rc<Cell<bool>>,
    focus: Shelf,
    selected: [usize; 2],
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Wire the render signal, load the stored collection, and restore the
    /// saved theme. `covers` is `None` when lookups are disabled.
    pub fn new(mut store: BookStore, storage: SharedStorage, covers: Option<CoverFetcher>) -> Self {
        let needs_render = Rc::new(Cell::new(false));
        let flag = Rc::clone(&needs_render);
        store.subscribe(Box::new(move || flag.set(true)));
        store.load_initial();

        let theme = Theme::load(storage.as_ref());
        let mut app = Self {
            store,
            storage,
            covers,
            theme,
            query: String::new(),
            sort: SortKey::None,
            projection: Projection::default(),
            needs_render,
            focus: Shelf::InProgress,
            selected: [0, 0],
            mode: Mode::Normal,
            status: None,
        };
        app.sync_projection();
        app
    }

    /// Tell the user that nothing will survive a restart.
    pub fn warn_session_only(&mut self) {
        self.set_status(
            "Storage unavailable: changes will be lost when you quit.",
            StatusKind::Error,
        );
    }

    pub fn store(&self) -> &BookStore {
        &self.store
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Text of the footer status message, if one is showing.
    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    /// Apply finished cover lookups. Results for books deleted in the
    /// meantime are dropped by the store.
    pub fn poll_background(&mut self) {
        let Some(covers) = &self.covers else {
            return;
        };
        for result in covers.drain() {
            self.store.apply_cover(result.book_id, result.cover);
        }
        self.sync_projection();
    }

    /// Feed a key press through the current mode. Returns `true` when the app
    /// should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Adding(form) => self.handle_add_book(code, form)?,
            Mode::Editing { id, form } => self.handle_edit_book(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.sync_projection();
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.focus = self.focus.other();
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.selected[self.focus.index()] = 0,
            KeyCode::End => {
                let len = self.shelf_len(self.focus);
                self.selected[self.focus.index()] = len.saturating_sub(1);
            }
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::Adding(BookForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Ok(Mode::Editing {
                        id: book.id,
                        form: BookForm::from_book(&book),
                    });
                }
                self.set_status("No book selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(book) = self.current_book() {
                    let confirm = ConfirmBookDelete::from(book);
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(confirm));
                }
                self.set_status("No book selected to delete.", StatusKind::Error);
            }
            KeyCode::Char(' ') => self.move_current_to_other_shelf(),
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.clear_status();
                return Ok(Mode::Searching(SearchState {
                    previous: self.query.clone(),
                }));
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.sort = self.sort.next();
                self.needs_render.set(true);
                self.set_status(format!("Sorted by {}.", self.sort.label()), StatusKind::Info);
            }
            KeyCode::Char('d') | KeyCode::Char('D') => self.toggle_theme(),
            KeyCode::Enter => self.open_current_cover(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                self.save_new_book(&form);
                return Ok(Mode::Normal);
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::Adding(form))
    }

    fn handle_edit_book(&mut self, code: KeyCode, id: i64, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => form.move_focus(-1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                if self.store.update_fields(id, &form.to_patch()) {
                    self.set_status("Book updated.", StatusKind::Info);
                } else {
                    self.set_status("That book no longer exists.", StatusKind::Error);
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::Editing { id, form })
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if self.store.remove(confirm.id) {
                    self.set_status(format!("Deleted '{}'.", confirm.title), StatusKind::Info);
                }
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.query = state.previous;
                self.needs_render.set(true);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Tab | KeyCode::BackTab => self.focus = self.focus.other(),
            KeyCode::Backspace => {
                self.query.pop();
                self.needs_render.set(true);
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                self.query.push(ch);
                self.needs_render.set(true);
            }
            _ => {}
        }
        Ok(Mode::Searching(state))
    }

    fn save_new_book(&mut self, form: &BookForm) {
        let input = form.to_new_book();
        let book = self.store.create(
            &input.title,
            &input.author,
            input.year,
            input.is_complete,
            None,
        );
        info!(id = book.id, "book added");
        if let Some(covers) = &self.covers {
            covers.request(book.id, &book.title);
        }
        self.focus = if book.is_complete {
            Shelf::Completed
        } else {
            Shelf::InProgress
        };
        self.set_status(format!("Added '{}'.", book.title), StatusKind::Info);
    }

    fn move_current_to_other_shelf(&mut self) {
        let Some(book) = self.current_book().cloned() else {
            self.set_status("No book selected to move.", StatusKind::Error);
            return;
        };
        let completed = !book.is_complete;
        if self.store.set_completion(book.id, completed) {
            let message = if completed {
                format!("Marked '{}' as finished.", book.title)
            } else {
                format!("Moved '{}' back to in progress.", book.title)
            };
            self.set_status(message, StatusKind::Info);
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.theme.save(self.storage.as_ref());
        debug!(dark = self.theme.is_dark(), "theme toggled");
    }

    fn open_current_cover(&mut self) {
        let Some(book) = self.current_book().cloned() else {
            return;
        };
        match book.cover.as_deref().map(str::trim) {
            None | Some("") => {
                self.set_status("This book does not have a cover yet.", StatusKind::Error);
            }
            Some(url) => {
                if let Err(err) = open_link(url) {
                    self.set_status(format!("Failed to open cover: {err}"), StatusKind::Error);
                } else {
                    self.set_status(format!("Opened cover for {book}."), StatusKind::Info);
                }
            }
        }
    }

    /// Recompute the shelves if the store signalled a change or the query or
    /// sort moved.
    fn sync_projection(&mut self) {
        if !self.needs_render.replace(false) {
            return;
        }
        self.projection = project(self.store.books(), &self.query, self.sort);
        for shelf in [Shelf::InProgress, Shelf::Completed] {
            let len = self.shelf_len(shelf);
            let selected = &mut self.selected[shelf.index()];
            *selected = (*selected).min(len.saturating_sub(1));
        }
    }

    fn shelf(&self, shelf: Shelf) -> &[Book] {
        match shelf {
            Shelf::InProgress => &self.projection.incomplete,
            Shelf::Completed => &self.projection.complete,
        }
    }

    fn shelf_len(&self, shelf: Shelf) -> usize {
        self.shelf(shelf).len()
    }

    fn current_book(&self) -> Option<&Book> {
        self.shelf(self.focus).get(self.selected[self.focus.index()])
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.shelf_len(self.focus);
        if len == 0 {
            return;
        }
        let current = self.selected[self.focus.index()] as isize;
        let next = (current + offset).clamp(0, len as isize - 1);
        self.selected[self.focus.index()] = next as usize;
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = self.theme.palette();
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
            area,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);

        let shelves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        self.draw_shelf(frame, shelves[0], Shelf::InProgress);
        self.draw_shelf(frame, shelves[1], Shelf::Completed);

        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Adding(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::Editing { form, .. } => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(_) => self.draw_search_bar(frame, chunks[0]),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let palette = self.theme.palette();
        let query = if self.query.is_empty() {
            Span::styled("<all titles>", Style::default().fg(palette.muted))
        } else {
            Span::raw(self.query.clone())
        };
        let line = Line::from(vec![
            Span::raw("Search: "),
            query,
            Span::raw("   Sort: "),
            Span::styled(self.sort.label(), Style::default().fg(palette.accent)),
            Span::raw(format!("   {}", self.theme.toggle_icon())),
        ]);
        let header = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Bookshelf")
                .border_style(Style::default().fg(palette.accent)),
        );
        frame.render_widget(header, area);
    }

    fn draw_shelf(&self, frame: &mut Frame, area: Rect, shelf: Shelf) {
        let palette = self.theme.palette();
        let books = self.shelf(shelf);
        let name = match shelf {
            Shelf::InProgress => "In Progress",
            Shelf::Completed => "Completed",
        };
        let focused = self.focus == shelf;
        let border = if focused {
            Style::default().fg(palette.highlight)
        } else {
            Style::default().fg(palette.muted)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{name} ({})", books.len()))
            .border_style(border);

        if books.is_empty() {
            let message = if self.query.is_empty() {
                "No books here yet."
            } else {
                "No titles match the search."
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let inner_width = area.width.saturating_sub(4);
        let items: Vec<ListItem> = books
            .iter()
            .map(|book| {
                let mut lines = book_card_lines(book, palette, inner_width);
                lines.push(Line::from(""));
                ListItem::new(lines)
            })
            .collect();

        let highlight = if focused {
            Style::default()
                .fg(palette.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected[shelf.index()]));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Searching(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Keep Filter   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select"),
            ]),
            Mode::Adding(_) | Mode::Editing { .. } => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmDelete(_) => Line::from(vec![
                Span::styled("[y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[n]", key_style),
                Span::raw(" Keep"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[←→]", key_style),
                Span::raw(" Shelf   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[Space]", key_style),
                Span::raw(" Move   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[f]", key_style),
                Span::raw(" Search   "),
                Span::styled("[s]", key_style),
                Span::raw(" Sort   "),
                Span::styled("[d]", key_style),
                Span::raw(" Theme   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Cover   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = form.lines();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (column, row) = form.cursor();
        frame.set_cursor_position((inner.x + column, inner.y + row));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete '{}' from your shelf?", confirm.title)),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", self.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        let inner = block.inner(area);
        let cursor_x = inner.x + "Search: ".len() as u16 + self.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, DARK_MODE_KEY, STORAGE_KEY};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app_with(memory: Rc<MemoryStore>) -> App {
        let store = BookStore::new(memory.clone());
        App::new(store, memory, None)
    }

    fn type_keys(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn add_book(app: &mut App, title: &str, year: &str, finished: bool) {
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_keys(app, title);
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        type_keys(app, year);
        if finished {
            app.handle_key(KeyCode::Tab).unwrap();
            app.handle_key(KeyCode::Char(' ')).unwrap();
        }
        app.handle_key(KeyCode::Enter).unwrap();
    }

    #[test]
    fn adding_books_fills_the_right_shelves() {
        let memory = Rc::new(MemoryStore::new());
        let mut app = app_with(Rc::clone(&memory));
        add_book(&mut app, "Dune", "1965", false);
        add_book(&mut app, "Duna", "1977", true);

        assert_eq!(app.projection().incomplete_count(), 1);
        assert_eq!(app.projection().complete_count(), 1);
        assert!(memory.get(STORAGE_KEY).unwrap().unwrap().contains("Duna"));
    }

    #[test]
    fn space_moves_selected_book_between_shelves() {
        let mut app = app_with(Rc::new(MemoryStore::new()));
        add_book(&mut app, "Dune", "1965", false);
        app.handle_key(KeyCode::Char(' ')).unwrap();
        assert_eq!(app.projection().complete_count(), 1);
        assert!(app.store().books()[0].is_complete);

        app.handle_key(KeyCode::Right).unwrap();
        app.handle_key(KeyCode::Char(' ')).unwrap();
        assert_eq!(app.projection().incomplete_count(), 1);
    }

    #[test]
    fn search_filters_and_escape_restores() {
        let mut app = app_with(Rc::new(MemoryStore::new()));
        add_book(&mut app, "Dune", "1965", false);
        add_book(&mut app, "Emma", "1815", false);

        app.handle_key(KeyCode::Char('f')).unwrap();
        type_keys(&mut app, "em");
        assert_eq!(app.projection().total(), 1);
        app.handle_key(KeyCode::Esc).unwrap();
        assert_eq!(app.query(), "");
        assert_eq!(app.projection().total(), 2);

        app.handle_key(KeyCode::Char('/')).unwrap();
        type_keys(&mut app, "DU");
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.query(), "DU");
        assert_eq!(app.projection().incomplete[0].title, "Dune");
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app_with(Rc::new(MemoryStore::new()));
        add_book(&mut app, "Dune", "1965", false);

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(app.store().len(), 1);

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert!(app.store().is_empty());
        assert_eq!(app.projection().total(), 0);
    }

    #[test]
    fn edit_updates_fields_in_place() {
        let mut app = app_with(Rc::new(MemoryStore::new()));
        add_book(&mut app, "Dun", "1965", false);

        app.handle_key(KeyCode::Char('e')).unwrap();
        type_keys(&mut app, "e");
        app.handle_key(KeyCode::Tab).unwrap();
        type_keys(&mut app, "Herbert");
        app.handle_key(KeyCode::Enter).unwrap();

        let book = &app.store().books()[0];
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.year, Some(1965));
    }

    #[test]
    fn sort_and_theme_keys_update_state() {
        let memory = Rc::new(MemoryStore::new());
        let mut app = app_with(Rc::clone(&memory));
        add_book(&mut app, "Zeta", "2001", false);
        add_book(&mut app, "Alpha", "1999", false);

        app.handle_key(KeyCode::Char('s')).unwrap();
        assert_eq!(app.sort(), SortKey::TitleAsc);
        assert_eq!(app.projection().incomplete[0].title, "Alpha");
        assert_eq!(app.store().books()[0].title, "Zeta");

        app.handle_key(KeyCode::Char('d')).unwrap();
        assert_eq!(app.theme(), Theme::Dark);
        assert_eq!(memory.get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn draws_without_panicking_in_every_mode() {
        let mut app = app_with(Rc::new(MemoryStore::new()));
        add_book(&mut app, "Dune", "1965", false);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|frame| app.draw(frame)).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        app.handle_key(KeyCode::Esc).unwrap();
        app.handle_key(KeyCode::Char('-')).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        app.handle_key(KeyCode::Esc).unwrap();
        app.handle_key(KeyCode::Char('f')).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
    }
}
