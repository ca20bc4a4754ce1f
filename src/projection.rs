//! Derived view of the collection: sort a copy, filter by title, and split the
//! result into the two shelves. Nothing in here touches the store, so the
//! functions are safe to call on every frame.

use std::cmp::Ordering;
use std::fmt;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::Book;

/// Display ordering picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Keep collection (insertion) order.
    #[default]
    None,
    TitleAsc,
    TitleDesc,
    YearAsc,
    YearDesc,
}

impl SortKey {
    /// Order in which the UI cycles through the selector.
    pub const ALL: [SortKey; 5] = [
        SortKey::None,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::YearAsc,
        SortKey::YearDesc,
    ];

    /// Parse a selector value. Unknown values fall back to collection order.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "title-asc" => SortKey::TitleAsc,
            "title-desc" => SortKey::TitleDesc,
            "year-asc" => SortKey::YearAsc,
            "year-desc" => SortKey::YearDesc,
            _ => SortKey::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::None => "default",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
            SortKey::YearAsc => "year-asc",
            SortKey::YearDesc => "year-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "Date added",
            SortKey::TitleAsc => "Title A-Z",
            SortKey::TitleDesc => "Title Z-A",
            SortKey::YearAsc => "Oldest first",
            SortKey::YearDesc => "Newest first",
        }
    }

    /// Next entry in [`SortKey::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|key| *key == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two shelves ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub incomplete: Vec<Book>,
    pub complete: Vec<Book>,
}

impl Projection {
    pub fn incomplete_count(&self) -> usize {
        self.incomplete.len()
    }

    pub fn complete_count(&self) -> usize {
        self.complete.len()
    }

    pub fn total(&self) -> usize {
        self.incomplete.len() + self.complete.len()
    }
}

/// Sort, filter, and partition `books` for display.
pub fn project(books: &[Book], query: &str, sort: SortKey) -> Projection {
    let mut ordered: Vec<&Book> = books.iter().collect();
    sort_books(&mut ordered, sort);

    let needle = query.to_lowercase();
    let mut projection = Projection::default();
    for book in ordered
        .into_iter()
        .filter(|book| title_matches(&book.title, &needle))
    {
        if book.is_complete {
            projection.complete.push(book.clone());
        } else {
            projection.incomplete.push(book.clone());
        }
    }
    projection
}

fn title_matches(title: &str, lowered_query: &str) -> bool {
    lowered_query.is_empty() || title.to_lowercase().contains(lowered_query)
}

fn sort_books(books: &mut [&Book], sort: SortKey) {
    match sort {
        SortKey::None => {}
        SortKey::TitleAsc => books.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::TitleDesc => books.sort_by(|a, b| compare_titles(&b.title, &a.title)),
        SortKey::YearAsc => books.sort_by(|a, b| compare_years(a.year, b.year, false)),
        SortKey::YearDesc => books.sort_by(|a, b| compare_years(a.year, b.year, true)),
    }
}

/// Dictionary-style comparison in three levels. Base letters compare with
/// accents and case stripped, so "Émile" files under E. Ties are broken by
/// accents (unaccented first), then by case (lowercase first).
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| accented(a).cmp(&accented(b)))
        .then_with(|| case_tiebreak(a, b))
}

fn base_letters(title: &str) -> String {
    title
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}

fn accented(title: &str) -> String {
    title.nfd().collect::<String>().to_lowercase()
}

fn case_tiebreak(a: &str, b: &str) -> Ordering {
    for (left, right) in a.chars().zip(b.chars()) {
        if left == right {
            continue;
        }
        match (left.is_lowercase(), right.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return left.cmp(&right),
        }
    }
    a.chars().count().cmp(&b.chars().count())
}

/// Numeric year ordering. Books without a year always go last.
fn compare_years(a: Option<i64>, b: Option<i64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) if descending => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: i64, title: &str, year: Option<i64>, is_complete: bool) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: String::new(),
            year,
            is_complete,
            cover: None,
        }
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    fn library() -> Vec<Book> {
        vec![
            book(1, "Dune", Some(1965), false),
            book(2, "Duna", Some(1977), true),
            book(3, "emma", Some(1815), false),
            book(4, "Beloved", Some(1987), true),
            book(5, "Anathem", None, false),
        ]
    }

    #[test]
    fn dune_scenario_partitions_by_completion() {
        let books = vec![
            book(1, "Dune", Some(1965), false),
            book(2, "Duna", Some(1977), true),
        ];
        let view = project(&books, "dun", SortKey::parse("year-asc"));
        assert_eq!(titles(&view.incomplete), ["Dune"]);
        assert_eq!(titles(&view.complete), ["Duna"]);
        assert_eq!((view.incomplete_count(), view.complete_count()), (1, 1));
    }

    #[test]
    fn empty_query_keeps_collection_order() {
        let view = project(&library(), "", SortKey::None);
        assert_eq!(titles(&view.incomplete), ["Dune", "emma", "Anathem"]);
        assert_eq!(titles(&view.complete), ["Duna", "Beloved"]);
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let view = project(&library(), "EM", SortKey::None);
        assert_eq!(titles(&view.incomplete), ["emma", "Anathem"]);
        assert!(view.complete.is_empty());
        assert!(project(&library(), "zzz", SortKey::TitleAsc).total() == 0);
    }

    #[test]
    fn title_sort_ignores_case_first() {
        let view = project(&library(), "", SortKey::TitleAsc);
        assert_eq!(titles(&view.incomplete), ["Anathem", "Dune", "emma"]);
        assert_eq!(titles(&view.complete), ["Beloved", "Duna"]);

        let view = project(&library(), "", SortKey::TitleDesc);
        assert_eq!(titles(&view.incomplete), ["emma", "Dune", "Anathem"]);

        let mut books = library();
        books.push(book(6, "Émile", Some(1762), false));
        books.push(book(7, "Zoo", None, false));
        books.push(book(8, "éclair", None, false));
        let view = project(&books, "", SortKey::TitleAsc);
        assert_eq!(
            titles(&view.incomplete),
            ["Anathem", "Dune", "éclair", "Émile", "emma", "Zoo"]
        );
    }

    #[test]
    fn accents_only_break_ties() {
        assert_eq!(compare_titles("Émile", "Zoo"), Ordering::Less);
        assert_eq!(compare_titles("Ángel", "Bach"), Ordering::Less);
        assert_eq!(compare_titles("resume", "résumé"), Ordering::Less);
        assert_eq!(compare_titles("résumé", "Resume"), Ordering::Greater);
        assert_eq!(compare_titles("Émile", "émile"), Ordering::Greater);
    }

    #[test]
    fn case_only_differences_put_lowercase_first() {
        assert_eq!(compare_titles("dune", "Dune"), Ordering::Less);
        assert_eq!(compare_titles("Dune", "dune"), Ordering::Greater);
        assert_eq!(compare_titles("Dune", "Dune"), Ordering::Equal);
        assert_eq!(compare_titles("apple", "Banana"), Ordering::Less);
    }

    #[test]
    fn year_sort_puts_missing_years_last() {
        let asc = project(&library(), "", SortKey::YearAsc);
        assert_eq!(titles(&asc.incomplete), ["emma", "Dune", "Anathem"]);
        assert_eq!(titles(&asc.complete), ["Duna", "Beloved"]);

        let desc = project(&library(), "", SortKey::YearDesc);
        assert_eq!(titles(&desc.incomplete), ["Dune", "emma", "Anathem"]);
        assert_eq!(titles(&desc.complete), ["Beloved", "Duna"]);
    }

    #[test]
    fn equal_keys_keep_relative_order() {
        let books = vec![
            book(1, "First", Some(2000), false),
            book(2, "Second", Some(2000), false),
            book(3, "Third", Some(1990), false),
        ];
        let view = project(&books, "", SortKey::YearAsc);
        assert_eq!(titles(&view.incomplete), ["Third", "First", "Second"]);
    }

    #[test]
    fn projection_is_idempotent_and_leaves_input_alone() {
        let books = library();
        let snapshot = books.clone();
        let first = project(&books, "e", SortKey::TitleDesc);
        let second = project(&books, "e", SortKey::TitleDesc);
        assert_eq!(first, second);
        assert_eq!(books, snapshot);
    }

    #[test]
    fn partition_covers_every_match_exactly_once() {
        let books = library();
        for sort in SortKey::ALL {
            for query in ["", "d", "an", "E", "missing"] {
                let view = project(&books, query, sort);
                let lowered = query.to_lowercase();
                let expected = books
                    .iter()
                    .filter(|b| b.title.to_lowercase().contains(&lowered))
                    .count();
                assert_eq!(view.total(), expected);

                let mut ids: Vec<i64> = view
                    .incomplete
                    .iter()
                    .chain(view.complete.iter())
                    .map(|b| b.id)
                    .collect();
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), expected);
                assert!(view.incomplete.iter().all(|b| !b.is_complete));
                assert!(view.complete.iter().all(|b| b.is_complete));
            }
        }
    }

    #[test]
    fn unknown_selector_means_collection_order() {
        assert_eq!(SortKey::parse("newest"), SortKey::None);
        assert_eq!(SortKey::parse(""), SortKey::None);
        assert_eq!(SortKey::parse("year-desc"), SortKey::YearDesc);
        assert_eq!(SortKey::YearDesc.next(), SortKey::None);
        assert_eq!(SortKey::None.next(), SortKey::TitleAsc);
    }
}
