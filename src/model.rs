//! Domain records and their normalizers. Each record is rebuilt from raw
//! pages on every fetch cycle; nothing is persisted locally.
use serde::{Deserialize, Serialize};

use crate::notion::model::Page;
use crate::notion::props;

/// Placeholder title for books whose title property is absent upstream.
pub const UNTITLED: &str = "(untitled)";
/// Fallback label for books without a status, category, or genre.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Property names on the books collection.
pub mod book_fields {
    pub const TITLE: &str = "Name";
    pub const AUTHOR: &str = "Author";
    pub const STATUS: &str = "Status";
    pub const CATEGORY: &str = "Category";
    pub const GENRE: &str = "Genre";
    pub const TAGS: &str = "Tags";
    pub const COVER: &str = "Cover";
    pub const PUBLISHER: &str = "Publisher";
    pub const YEAR: &str = "Year";
    pub const ISBN: &str = "ISBN";
    pub const PAGES: &str = "Pages";
    pub const SUMMARY: &str = "Summary";
    pub const START_DATE: &str = "Start Date";
    pub const END_DATE: &str = "Finish Date";
    pub const PDF: &str = "PDF";
}

/// Property names on the reading-log collection.
pub mod log_fields {
    pub const NAME: &str = "Name";
    pub const DATE: &str = "Date";
    pub const PAGES: &str = "Pages";
    pub const MINUTES: &str = "Minutes";
    pub const BOOK: &str = "Book";
}

/// Property names on the todo collection.
pub mod todo_fields {
    pub const NAME: &str = "Name";
    pub const DONE: &str = "Done";
    pub const DUE: &str = "Due";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub status: String,
    pub category: String,
    pub genre: String,
    pub tags: Vec<String>,
    pub cover: String,
    pub publisher: String,
    /// Kept as text; the collection stores it as a rich-text column.
    pub year: String,
    pub isbn: String,
    /// Page count as text, same reason as `year`.
    pub pages: String,
    pub summary: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub pdf: Option<String>,
}

impl Book {
    pub fn from_page(page: &Page) -> Self {
        let props = &page.properties;
        Self {
            id: page.id.clone(),
            title: non_empty_or(props::plain_text(props, book_fields::TITLE), UNTITLED),
            author: props::plain_text(props, book_fields::AUTHOR),
            status: props::select(props, book_fields::STATUS)
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            category: props::select(props, book_fields::CATEGORY)
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            genre: props::select(props, book_fields::GENRE)
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            tags: props::multi_select(props, book_fields::TAGS),
            cover: props::cover(page, book_fields::COVER),
            publisher: props::plain_text(props, book_fields::PUBLISHER),
            year: props::plain_text(props, book_fields::YEAR),
            isbn: props::plain_text(props, book_fields::ISBN),
            pages: props::plain_text(props, book_fields::PAGES),
            summary: props::plain_text(props, book_fields::SUMMARY),
            start_date: props::date_start(props, book_fields::START_DATE),
            end_date: props::date_start(props, book_fields::END_DATE),
            pdf: props::url(props, book_fields::PDF),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    /// ISO date string; entries without one never reach callers.
    pub date: String,
    pub pages: i64,
    pub minutes: i64,
    pub book_id: Option<String>,
}

impl LogEntry {
    /// Returns `None` for rows lacking a date; those are dropped, not
    /// defaulted.
    pub fn from_page(page: &Page) -> Option<Self> {
        let props = &page.properties;
        let date = props::date_start(props, log_fields::DATE)?;
        Some(Self {
            id: page.id.clone(),
            date,
            pages: (props::number(props, log_fields::PAGES) as i64).max(0),
            minutes: (props::number(props, log_fields::MINUTES) as i64).max(0),
            book_id: props::relation_first(props, log_fields::BOOK),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub name: String,
    pub done: bool,
    pub due_date: Option<String>,
}

impl TodoItem {
    pub fn from_page(page: &Page) -> Self {
        let props = &page.properties;
        Self {
            id: page.id.clone(),
            name: props::plain_text(props, todo_fields::NAME),
            done: props::checkbox(props, todo_fields::DONE),
            due_date: props::date_start(props, todo_fields::DUE),
        }
    }
}

/// Selectable option sets introspected from the books collection schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptions {
    pub status: Vec<String>,
    pub categories: Vec<String>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
}

/// User input for a new book. Optional fields left `None` are omitted from
/// the create payload entirely rather than sent as nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub tags: Vec<String>,
    pub cover_url: Option<String>,
    pub pdf_url: Option<String>,
    pub summary: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(v: serde_json::Value) -> Page {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn book_without_title_gets_placeholder() {
        let book = Book::from_page(&page(json!({ "id": "b1", "properties": {} })));
        assert_eq!(book.title, UNTITLED);
        assert_eq!(book.status, UNCATEGORIZED);
        assert_eq!(book.category, UNCATEGORIZED);
        assert_eq!(book.genre, UNCATEGORIZED);
        assert!(book.tags.is_empty());
        assert_eq!(book.cover, "");
        assert_eq!(book.pdf, None);
    }

    #[test]
    fn book_normalizes_full_page() {
        let book = Book::from_page(&page(json!({
            "id": "b2",
            "cover": { "type": "external", "external": { "url": "https://cdn/c.png" } },
            "properties": {
                "Name": { "id": "t", "type": "title", "title": [{ "plain_text": "Dune" }] },
                "Author": { "id": "a", "type": "rich_text", "rich_text": [{ "plain_text": "Herbert" }] },
                "Status": { "id": "s", "type": "select", "select": { "name": "Reading" } },
                "Category": { "id": "c", "type": "select", "select": { "name": "Fiction" } },
                "Tags": { "id": "m", "type": "multi_select", "multi_select": [{ "name": "sf" }, { "name": "classic" }] },
                "Year": { "id": "y", "type": "number", "number": 1965 },
                "Pages": { "id": "p", "type": "rich_text", "rich_text": [{ "plain_text": "412" }] },
                "Start Date": { "id": "d1", "type": "date", "date": { "start": "2024-01-02" } },
                "PDF": { "id": "u", "type": "url", "url": "https://x/dune.pdf" },
            }
        })));
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.status, "Reading");
        assert_eq!(book.category, "Fiction");
        assert_eq!(book.genre, UNCATEGORIZED);
        assert_eq!(book.tags, vec!["sf", "classic"]);
        assert_eq!(book.cover, "https://cdn/c.png");
        assert_eq!(book.year, "1965");
        assert_eq!(book.pages, "412");
        assert_eq!(book.start_date, Some("2024-01-02".to_string()));
        assert_eq!(book.end_date, None);
        assert_eq!(book.pdf, Some("https://x/dune.pdf".to_string()));
    }

    #[test]
    fn log_entry_without_date_is_dropped() {
        let entry = LogEntry::from_page(&page(json!({
            "id": "l1",
            "properties": {
                "Pages": { "id": "p", "type": "number", "number": 12 },
            }
        })));
        assert!(entry.is_none());
    }

    #[test]
    fn log_entry_defaults_counts_to_zero_and_clamps_negatives() {
        let entry = LogEntry::from_page(&page(json!({
            "id": "l2",
            "properties": {
                "Date": { "id": "d", "type": "date", "date": { "start": "2024-02-10" } },
                "Minutes": { "id": "m", "type": "number", "number": -5 },
            }
        })))
        .unwrap();
        assert_eq!(entry.date, "2024-02-10");
        assert_eq!(entry.pages, 0);
        assert_eq!(entry.minutes, 0);
        assert_eq!(entry.book_id, None);
    }

    #[test]
    fn log_entry_carries_book_relation() {
        let entry = LogEntry::from_page(&page(json!({
            "id": "l3",
            "properties": {
                "Date": { "id": "d", "type": "date", "date": { "start": "2024-02-11" } },
                "Pages": { "id": "p", "type": "number", "number": 30 },
                "Book": { "id": "r", "type": "relation", "relation": [{ "id": "b7" }] },
            }
        })))
        .unwrap();
        assert_eq!(entry.pages, 30);
        assert_eq!(entry.book_id, Some("b7".to_string()));
    }

    #[test]
    fn todo_item_normalizes_defaults() {
        let todo = TodoItem::from_page(&page(json!({ "id": "t1", "properties": {} })));
        assert_eq!(todo.name, "");
        assert!(!todo.done);
        assert_eq!(todo.due_date, None);
    }
}
