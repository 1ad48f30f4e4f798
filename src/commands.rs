//! CLI front for the gateway and view models: one function per subcommand
//! plus the interactive session shell.
use std::io::{self, Write as _};
use std::time::Instant;

use anyhow::{bail, Result};
use chrono::{Datelike, Local, NaiveDate};
use tracing::info;

use readtrack::config::Config;
use readtrack::gateway::Gateway;
use readtrack::model::{Book, BookDraft};
use readtrack::session::{AppState, AuthGate, PageId};
use readtrack::timer::{format_mm_ss, Countdown, TimerOutcome, TimerPreset};
use readtrack::view::{self, LibraryFilter};

pub async fn dashboard(gateway: &Gateway) -> Result<()> {
    let books = match gateway.list_books().await {
        Ok(books) => books,
        Err(err) => bail!("failed to load books: {err}"),
    };
    let logs = gateway.list_logs().await;
    let todos = gateway.list_todos().await;

    let stats = view::dashboard_stats(&books, &todos);
    println!(
        "Books: {}   Reading: {}   Pending todos: {}",
        stats.total_books, stats.reading, stats.pending_todos
    );

    println!("\nBy category:");
    for entry in view::category_counts(&books) {
        println!("  {:<24} {}", entry.category, entry.count);
    }

    println!("\nLast 7 days:");
    for day in view::recent_activity_now(&logs) {
        println!("  {}  {:>4} pages", day.date.format("%m/%d"), day.pages);
    }

    println!("\nMonthly trend:");
    for month in view::monthly_trend_now(&logs) {
        println!("  {}  {:>5} pages", month.month, month.pages);
    }
    Ok(())
}

pub async fn books(gateway: &Gateway, filter: LibraryFilter) -> Result<()> {
    let books = match gateway.list_books().await {
        Ok(books) => books,
        Err(err) => bail!("failed to load books: {err}"),
    };
    let hits = filter.apply(&books);
    if hits.is_empty() {
        println!("no books match");
        return Ok(());
    }
    for book in hits {
        print_book_line(book);
    }
    Ok(())
}

pub async fn add_book(gateway: &Gateway, draft: BookDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        bail!("title must not be empty");
    }
    match gateway.create_book(&draft).await {
        Ok(()) => {
            println!("added \"{}\"", draft.title);
            Ok(())
        }
        Err(msg) => bail!("create failed: {msg}"),
    }
}

pub async fn calendar(gateway: &Gateway, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let today = Local::now().date_naive();
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());
    let grid = view::month_grid(year, month);
    if grid.is_empty() {
        bail!("invalid month: {year}-{month}");
    }

    let logs = gateway.list_logs().await;
    let todos = gateway.list_todos().await;
    let buckets = view::day_buckets(&logs, &todos);

    println!("{year}-{month:02}");
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");
    for week in &grid {
        let row: Vec<String> = week
            .iter()
            .map(|day| {
                if *day == 0 {
                    "   ".to_string()
                } else {
                    format!("{day:>3}")
                }
            })
            .collect();
        println!("{}", row.join(" "));
    }

    let prefix = format!("{year}-{month:02}-");
    let mut any = false;
    for (date, bucket) in buckets.iter().filter(|(d, _)| d.starts_with(&prefix)) {
        any = true;
        print!("  {date}: {} pages, {} min", bucket.pages, bucket.minutes);
        if !bucket.todos.is_empty() {
            print!("  due: {}", bucket.todos.join(", "));
        }
        println!();
    }
    if !any {
        println!("  no activity this month");
    }
    Ok(())
}

pub async fn log(
    gateway: &Gateway,
    book_id: &str,
    date: Option<NaiveDate>,
    pages: i64,
    minutes: i64,
) -> Result<()> {
    if pages < 0 || minutes < 0 {
        bail!("pages and minutes must not be negative");
    }
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    if gateway.create_log(date, book_id, pages, minutes).await {
        println!("logged {pages} pages / {minutes} min on {date}");
        Ok(())
    } else {
        bail!("failed to record the reading log");
    }
}

pub async fn todos(gateway: &Gateway) -> Result<()> {
    let todos = gateway.list_todos().await;
    let (pending, completed) = view::partition_todos(&todos);
    println!("Pending ({}):", pending.len());
    for task in &pending {
        match task.due_date.as_deref() {
            Some(due) => println!("  [ ] {}  (due {due})  {}", task.name, task.id),
            None => println!("  [ ] {}  {}", task.name, task.id),
        }
    }
    println!("Completed ({}):", completed.len());
    for task in &completed {
        println!("  [x] {}", task.name);
    }
    Ok(())
}

pub async fn add_todo(gateway: &Gateway, name: &str, due: Option<NaiveDate>) -> Result<()> {
    if name.trim().is_empty() {
        bail!("todo name must not be empty");
    }
    match gateway.create_todo(name, due).await {
        Ok(()) => {
            println!("added todo \"{name}\"");
            Ok(())
        }
        Err(msg) => bail!("create failed: {msg}"),
    }
}

pub async fn done(gateway: &Gateway, id: &str) -> Result<()> {
    if gateway.mark_todo_done(id).await {
        println!("done");
        Ok(())
    } else {
        bail!("failed to mark todo done");
    }
}

pub async fn schema(gateway: &Gateway) -> Result<()> {
    let options = gateway.schema_options().await;
    println!("Status:     {}", options.status.join(", "));
    println!("Categories: {}", options.categories.join(", "));
    println!("Genres:     {}", options.genres.join(", "));
    println!("Tags:       {}", options.tags.join(", "));
    Ok(())
}

pub async fn timer(minutes: u64) -> Result<()> {
    let preset = TimerPreset::from_minutes(minutes);
    let total = preset.minutes() * 60;
    println!("focus timer: {}", format_mm_ss(total));
    let countdown = Countdown::start(total);
    let mut rx = countdown.subscribe();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let left = *rx.borrow();
                print!("\r{}", format_mm_ss(left));
                io::stdout().flush()?;
                if left == 0 {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                countdown.cancel();
                break;
            }
        }
    }
    match countdown.wait().await {
        TimerOutcome::Finished => println!("\ntime is up, take a break"),
        TimerOutcome::Cancelled => println!("\ncancelled"),
    }
    Ok(())
}

/// Interactive shell over the page controller. Commands: page names,
/// `open <n>`, `back`, `refresh`, `quit`.
pub async fn browse(gateway: &Gateway, config: &Config) -> Result<()> {
    if config.passwords.is_empty() {
        bail!("no ACCESS_PASSWORD configured; cannot unlock a session");
    }
    let mut state = AppState::locked();
    loop {
        if !state.is_unlocked(Instant::now()) {
            let Some(input) = prompt("password> ")? else {
                return Ok(());
            };
            let (next, ok) = state.unlock(config, &input, Instant::now());
            state = next;
            if !ok {
                println!("wrong password");
            }
            continue;
        }

        render_page(gateway, &state).await;
        let Some(line) = prompt(&format!("{}> ", state.page.title()))? else {
            return Ok(());
        };
        state = state.touch(Instant::now());
        if matches!(state.auth, AuthGate::Locked) {
            println!("session expired, please sign in again");
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("quit") | Some("q") => return Ok(()),
            Some("dashboard") => state = state.navigate(PageId::Dashboard),
            Some("library") => state = state.navigate(PageId::Library),
            Some("detail") => state = state.navigate(PageId::BookDetail),
            Some("calendar") => state = state.navigate(PageId::Calendar),
            Some("timer") => state = state.navigate(PageId::Timer),
            Some("todo") => state = state.navigate(PageId::Todo),
            Some("back") => state = state.back(),
            Some("refresh") => {
                gateway.invalidate();
                info!("caches cleared");
            }
            Some("open") => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
                Some(n) if n >= 1 => {
                    let books = gateway.list_books().await.unwrap_or_default();
                    match books.get(n - 1) {
                        Some(book) => state = state.open_book(book.clone()),
                        None => println!("no book #{n}"),
                    }
                }
                _ => println!("usage: open <number>"),
            },
            Some(other) => println!("unknown command: {other}"),
            None => {}
        }
    }
}

async fn render_page(gateway: &Gateway, state: &AppState) {
    println!("\n== {} ==", state.page.title());
    let rendered = match state.page {
        PageId::Dashboard => dashboard(gateway).await,
        PageId::Library => render_library(gateway).await,
        PageId::BookDetail => {
            render_book_detail(state.selected.as_ref());
            Ok(())
        }
        PageId::Calendar => calendar(gateway, None, None).await,
        PageId::Timer => {
            println!("presets: 25 (focus), 5 (short break), 15 (long break)");
            println!("run `readtrack timer --minutes <n>` for a countdown");
            Ok(())
        }
        PageId::Todo => todos(gateway).await,
    };
    if let Err(err) = rendered {
        println!("{err}");
    }
}

async fn render_library(gateway: &Gateway) -> Result<()> {
    let books = match gateway.list_books().await {
        Ok(books) => books,
        Err(err) => {
            println!("failed to load books: {err}");
            return Ok(());
        }
    };
    if books.is_empty() {
        println!("no books");
    }
    for (idx, book) in books.iter().enumerate() {
        print!("{:>3}. ", idx + 1);
        print_book_line(book);
    }
    Ok(())
}

fn render_book_detail(book: Option<&Book>) {
    let Some(book) = book else {
        println!("no book selected");
        return;
    };
    println!("{}", book.title);
    if !book.author.is_empty() {
        println!("by {}", book.author);
    }
    println!("status: {}   category: {}   genre: {}", book.status, book.category, book.genre);
    if !book.tags.is_empty() {
        println!("tags: {}", book.tags.join(", "));
    }
    for (label, value) in [
        ("publisher", &book.publisher),
        ("year", &book.year),
        ("isbn", &book.isbn),
        ("pages", &book.pages),
    ] {
        if !value.is_empty() {
            println!("{label}: {value}");
        }
    }
    if let Some(start) = &book.start_date {
        println!("started: {start}");
    }
    if let Some(end) = &book.end_date {
        println!("finished: {end}");
    }
    match &book.pdf {
        Some(url) => println!("pdf: {url}"),
        None => println!("no pdf attached"),
    }
    if !book.summary.is_empty() {
        println!("\n{}", book.summary);
    }
}

fn print_book_line(book: &Book) {
    let author = if book.author.is_empty() {
        "unknown author"
    } else {
        book.author.as_str()
    };
    println!("{} by {} [{}] {}", book.title, author, book.status, book.category);
}

fn prompt(text: &str) -> Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
