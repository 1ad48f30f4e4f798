//! Remote gateway over the three collections.
//!
//! Reads go through short-lived caches; any successful write clears them all
//! so the next render reflects the write. Failure policy differs per call and
//! is deliberate: the books listing surfaces a typed error, while logs and
//! todos degrade to empty lists (see DESIGN.md).
//!
//! With no token or books database configured the gateway is degraded: reads
//! come back empty, writes report failure, and the network is never touched.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::cache::Cache;
use crate::config::Config;
use crate::model::{
    book_fields, log_fields, todo_fields, Book, BookDraft, LogEntry, SchemaOptions, TodoItem,
    UNCATEGORIZED,
};
use crate::notion::model::DatabaseProperty;
use crate::notion::{ApiError, NotionApi, NotionClient};

/// Single-page query bound; collections beyond this are truncated.
pub const PAGE_SIZE: u32 = 100;

const BOOKS_TTL: Duration = Duration::from_secs(60);
const LOGS_TTL: Duration = Duration::from_secs(10);
const SCHEMA_TTL: Duration = Duration::from_secs(300);

pub struct Gateway {
    api: Arc<dyn NotionApi>,
    config: Config,
    books: Cache<Vec<Book>>,
    logs: Cache<Vec<LogEntry>>,
    schema: Cache<SchemaOptions>,
}

impl Gateway {
    pub fn new(config: Config) -> Self {
        let api = Arc::new(NotionClient::from_config(&config));
        Self::with_api(api, config)
    }

    pub fn with_api(api: Arc<dyn NotionApi>, config: Config) -> Self {
        Self {
            api,
            config,
            books: Cache::new(BOOKS_TTL),
            logs: Cache::new(LOGS_TTL),
            schema: Cache::new(SCHEMA_TTL),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.config.is_degraded()
    }

    /// Books listing. Fails loudly: callers blocking whole views on this
    /// call want the error text.
    pub async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let Some(db) = self.configured_db(self.config.books_db.as_deref()) else {
            return Ok(Vec::new());
        };
        if let Some(books) = self.books.get() {
            return Ok(books);
        }
        let resp = self
            .api
            .query_database(db, build_query_request(PAGE_SIZE))
            .await?;
        let books: Vec<Book> = resp.results.iter().map(Book::from_page).collect();
        self.books.store(books.clone());
        Ok(books)
    }

    /// Reading logs. Fails silently to an empty list; rows without a date
    /// are dropped before callers see them.
    pub async fn list_logs(&self) -> Vec<LogEntry> {
        let Some(db) = self.configured_db(self.config.logs_db.as_deref()) else {
            return Vec::new();
        };
        if let Some(logs) = self.logs.get() {
            return logs;
        }
        match self
            .api
            .query_database(db, build_query_request(PAGE_SIZE))
            .await
        {
            Ok(resp) => {
                let logs: Vec<LogEntry> =
                    resp.results.iter().filter_map(LogEntry::from_page).collect();
                self.logs.store(logs.clone());
                logs
            }
            Err(err) => {
                warn!(%err, "failed to fetch reading logs");
                Vec::new()
            }
        }
    }

    /// Todos, newest first (server-side sort by creation time). Fails
    /// silently; uncached.
    pub async fn list_todos(&self) -> Vec<TodoItem> {
        let Some(db) = self.configured_db(self.config.todos_db.as_deref()) else {
            return Vec::new();
        };
        match self
            .api
            .query_database(db, build_sorted_query_request(PAGE_SIZE))
            .await
        {
            Ok(resp) => resp.results.iter().map(TodoItem::from_page).collect(),
            Err(err) => {
                warn!(%err, "failed to fetch todos");
                Vec::new()
            }
        }
    }

    /// Create a todo item. Rejects locally, without a network call, when the
    /// todos collection is unconfigured.
    pub async fn create_todo(&self, name: &str, due: Option<NaiveDate>) -> Result<(), String> {
        let Some(db) = self.configured_db(self.config.todos_db.as_deref()) else {
            return Err("todo database is not configured".to_string());
        };
        match self
            .api
            .create_page(build_todo_page_request(db, name, due))
            .await
        {
            Ok(_) => {
                self.invalidate();
                Ok(())
            }
            Err(err) => Err(err.display_text()),
        }
    }

    /// Idempotent done-flag flip. Success boolean only, no error detail.
    pub async fn mark_todo_done(&self, page_id: &str) -> bool {
        if self.is_degraded() {
            return false;
        }
        match self.api.update_page(page_id, build_done_patch()).await {
            Ok(()) => {
                self.invalidate();
                true
            }
            Err(err) => {
                warn!(%err, page_id, "failed to mark todo done");
                false
            }
        }
    }

    /// Record a reading log row tagging the book by relation.
    pub async fn create_log(
        &self,
        date: NaiveDate,
        book_id: &str,
        pages: i64,
        minutes: i64,
    ) -> bool {
        let Some(db) = self.configured_db(self.config.logs_db.as_deref()) else {
            return false;
        };
        let body = build_log_page_request(db, date, book_id, pages, minutes);
        match self.api.create_page(body).await {
            Ok(_) => {
                self.invalidate();
                true
            }
            Err(err) => {
                warn!(%err, "failed to create reading log");
                false
            }
        }
    }

    /// Selectable options introspected from the books collection schema.
    /// Any failure yields four empty sets.
    pub async fn schema_options(&self) -> SchemaOptions {
        let Some(db) = self.configured_db(self.config.books_db.as_deref()) else {
            return SchemaOptions::default();
        };
        if let Some(options) = self.schema.get() {
            return options;
        }
        match self.api.retrieve_database(db).await {
            Ok(resp) => {
                let options = schema_options_from(&resp.properties);
                self.schema.store(options.clone());
                options
            }
            Err(err) => {
                warn!(%err, "failed to introspect book schema");
                SchemaOptions::default()
            }
        }
    }

    /// Create a book. The caller validates the title before calling; on
    /// failure the raw response text comes back for display.
    pub async fn create_book(&self, draft: &BookDraft) -> Result<(), String> {
        let Some(db) = self.configured_db(self.config.books_db.as_deref()) else {
            return Err("book database is not configured".to_string());
        };
        match self
            .api
            .create_page(build_book_page_request(db, draft))
            .await
        {
            Ok(_) => {
                self.invalidate();
                Ok(())
            }
            Err(err) => Err(err.display_text()),
        }
    }

    /// Drop every cached read snapshot. Called after each successful write;
    /// read-after-write, nothing stronger.
    pub fn invalidate(&self) {
        self.books.clear();
        self.logs.clear();
        self.schema.clear();
    }

    fn configured_db<'a>(&self, db: Option<&'a str>) -> Option<&'a str> {
        if self.is_degraded() {
            None
        } else {
            db
        }
    }
}

pub fn build_query_request(page_size: u32) -> Value {
    json!({ "page_size": page_size })
}

pub fn build_sorted_query_request(page_size: u32) -> Value {
    json!({
        "page_size": page_size,
        "sorts": [{ "timestamp": "created_time", "direction": "descending" }],
    })
}

pub fn build_todo_page_request(todos_db: &str, name: &str, due: Option<NaiveDate>) -> Value {
    let mut properties = Map::new();
    properties.insert(
        todo_fields::NAME.to_string(),
        json!({ "title": [{ "text": { "content": name } }] }),
    );
    properties.insert(todo_fields::DONE.to_string(), json!({ "checkbox": false }));
    if let Some(due) = due {
        properties.insert(
            todo_fields::DUE.to_string(),
            json!({ "date": { "start": due.to_string() } }),
        );
    }
    json!({
        "parent": { "database_id": todos_db },
        "properties": Value::Object(properties),
    })
}

/// Properties patch flipping the done flag on.
pub fn build_done_patch() -> Value {
    let mut properties = Map::new();
    properties.insert(todo_fields::DONE.to_string(), json!({ "checkbox": true }));
    Value::Object(properties)
}

pub fn build_log_page_request(
    logs_db: &str,
    date: NaiveDate,
    book_id: &str,
    pages: i64,
    minutes: i64,
) -> Value {
    let mut properties = Map::new();
    properties.insert(
        log_fields::NAME.to_string(),
        json!({ "title": [{ "text": { "content": format!("Log {date}") } }] }),
    );
    properties.insert(
        log_fields::DATE.to_string(),
        json!({ "date": { "start": date.to_string() } }),
    );
    properties.insert(log_fields::PAGES.to_string(), json!({ "number": pages }));
    properties.insert(log_fields::MINUTES.to_string(), json!({ "number": minutes }));
    properties.insert(
        log_fields::BOOK.to_string(),
        json!({ "relation": [{ "id": book_id }] }),
    );
    json!({
        "parent": { "database_id": logs_db },
        "properties": Value::Object(properties),
    })
}

/// Absent optional fields are omitted entirely; an `Uncategorized`
/// category or genre is likewise not sent.
pub fn build_book_page_request(books_db: &str, draft: &BookDraft) -> Value {
    let mut properties = Map::new();
    properties.insert(
        book_fields::TITLE.to_string(),
        json!({ "title": [{ "text": { "content": draft.title } }] }),
    );
    if let Some(status) = present(&draft.status) {
        properties.insert(
            book_fields::STATUS.to_string(),
            json!({ "select": { "name": status } }),
        );
    }
    let tags: Vec<Value> = draft.tags.iter().map(|t| json!({ "name": t })).collect();
    properties.insert(book_fields::TAGS.to_string(), json!({ "multi_select": tags }));
    if let Some(url) = present(&draft.cover_url) {
        properties.insert(book_fields::COVER.to_string(), json!({ "url": url }));
    }
    if let Some(url) = present(&draft.pdf_url) {
        properties.insert(book_fields::PDF.to_string(), json!({ "url": url }));
    }
    if let Some(author) = present(&draft.author) {
        properties.insert(
            book_fields::AUTHOR.to_string(),
            json!({ "rich_text": [{ "text": { "content": author } }] }),
        );
    }
    if let Some(category) = present(&draft.category).filter(|c| *c != UNCATEGORIZED) {
        properties.insert(
            book_fields::CATEGORY.to_string(),
            json!({ "select": { "name": category } }),
        );
    }
    if let Some(genre) = present(&draft.genre).filter(|g| *g != UNCATEGORIZED) {
        properties.insert(
            book_fields::GENRE.to_string(),
            json!({ "select": { "name": genre } }),
        );
    }
    if let Some(summary) = present(&draft.summary) {
        properties.insert(
            book_fields::SUMMARY.to_string(),
            json!({ "rich_text": [{ "text": { "content": summary } }] }),
        );
    }
    if let Some(start) = present(&draft.start_date) {
        properties.insert(
            book_fields::START_DATE.to_string(),
            json!({ "date": { "start": start } }),
        );
    }
    if let Some(end) = present(&draft.end_date) {
        properties.insert(
            book_fields::END_DATE.to_string(),
            json!({ "date": { "start": end } }),
        );
    }
    json!({
        "parent": { "database_id": books_db },
        "properties": Value::Object(properties),
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

fn schema_options_from(props: &HashMap<String, DatabaseProperty>) -> SchemaOptions {
    // A select-typed status field wins; a status-typed one is the fallback.
    let mut status = option_names(props.get(book_fields::STATUS), OptionKind::Select);
    if status.is_empty() {
        status = option_names(props.get(book_fields::STATUS), OptionKind::Status);
    }
    SchemaOptions {
        status,
        categories: option_names(props.get(book_fields::CATEGORY), OptionKind::Select),
        genres: option_names(props.get(book_fields::GENRE), OptionKind::Select),
        tags: option_names(props.get(book_fields::TAGS), OptionKind::MultiSelect),
    }
}

enum OptionKind {
    Select,
    MultiSelect,
    Status,
}

fn option_names(prop: Option<&DatabaseProperty>, kind: OptionKind) -> Vec<String> {
    let list = prop.and_then(|p| match kind {
        OptionKind::Select => p.select.as_ref(),
        OptionKind::MultiSelect => p.multi_select.as_ref(),
        OptionKind::Status => p.status.as_ref(),
    });
    list.map(|l| l.options.iter().map(|o| o.name.clone()).collect())
        .unwrap_or_default()
}
