use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{parse_year, Book, BookPatch};

/// Values collected by the add form, ready for `BookStore::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewBook {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: Option<i64>,
    pub(crate) is_complete: bool,
}

/// Form state shared by the add and edit dialogs. The edit dialog hides the
/// completion toggle because moving shelves has its own key.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) is_complete: bool,
    pub(crate) active: BookField,
    pub(crate) editing: bool,
}

/// Enumerates the fields within the book form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Completed,
}

impl BookForm {
    /// Populate the form from an existing book when entering edit mode.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.map(|year| year.to_string()).unwrap_or_default(),
            is_complete: book.is_complete,
            active: BookField::Title,
            editing: true,
        }
    }

    fn fields(&self) -> &'static [BookField] {
        if self.editing {
            &[BookField::Title, BookField::Author, BookField::Year]
        } else {
            &[
                BookField::Title,
                BookField::Author,
                BookField::Year,
                BookField::Completed,
            ]
        }
    }

    /// Cycle focus forward (`step = 1`) or backward (`step = -1`).
    pub(crate) fn move_focus(&mut self, step: isize) {
        let fields = self.fields();
        let current = fields
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0) as isize;
        let len = fields.len() as isize;
        self.active = fields[(current + step).rem_euclid(len) as usize];
    }

    /// Insert a character into the active field. Space on the completion
    /// toggle flips it instead.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Year => self.year.push(ch),
            BookField::Completed => {
                if ch == ' ' || ch == 'x' || ch == 'X' {
                    self.is_complete = !self.is_complete;
                } else {
                    return false;
                }
            }
        }
        true
    }

    /// Remove a character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Completed => {}
        }
    }

    /// Nothing is rejected: text goes through untouched and the year is
    /// coerced.
    pub(crate) fn to_new_book(&self) -> NewBook {
        NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            year: parse_year(&self.year),
            is_complete: self.is_complete,
        }
    }

    pub(crate) fn to_patch(&self) -> BookPatch {
        BookPatch {
            title: Some(self.title.clone()),
            author: Some(self.author.clone()),
            year: Some(parse_year(&self.year)),
        }
    }

    /// Render a styled line for the modal form.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let label = field_label(field);

        if field == BookField::Completed {
            let mark = if self.is_complete { "[x]" } else { "[ ]" };
            let style = if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            return Line::from(vec![
                Span::raw(format!("{label}: ")),
                Span::styled(mark.to_string(), style),
            ]);
        }

        let value = match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            _ => &self.year,
        };
        let display = if value.is_empty() {
            "<empty>".to_string()
        } else {
            value.clone()
        };
        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled(display, style),
        ])
    }

    /// Lines for every visible field, in focus order.
    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        self.fields()
            .iter()
            .map(|field| self.build_line(*field))
            .collect()
    }

    /// Cursor column offset and row index of the active field.
    pub(crate) fn cursor(&self) -> (u16, u16) {
        let row = self
            .fields()
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0) as u16;
        let prefix = field_label(self.active).len() as u16 + 2;
        let len = match self.active {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
            BookField::Year => self.year.chars().count(),
            BookField::Completed => 1,
        };
        (prefix + len as u16, row)
    }
}

fn field_label(field: BookField) -> &'static str {
    match field {
        BookField::Title => "Title",
        BookField::Author => "Author",
        BookField::Year => "Year",
        BookField::Completed => "Finished",
    }
}

/// Pending deletion awaiting a yes/no answer.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

impl From<&Book> for ConfirmBookDelete {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
        }
    }
}
