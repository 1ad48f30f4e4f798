use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::warn;

use readtrack::config::Config;
use readtrack::gateway::Gateway;
use readtrack::model::BookDraft;
use readtrack::view::LibraryFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(author, version, about = "Personal reading tracker backed by Notion databases")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dashboard counters, category split, and reading trends
    Dashboard,
    /// List books, optionally filtered
    Books {
        /// Case-insensitive title search
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Add a book to the library
    AddBook {
        title: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        /// Repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        cover: Option<String>,
        #[arg(long)]
        pdf: Option<String>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Reading calendar for a month (defaults to the current one)
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Record a reading log for a book
    Log {
        /// Page id of the book
        #[arg(long)]
        book: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 0)]
        pages: i64,
        #[arg(long, default_value_t = 0)]
        minutes: i64,
    },
    /// List todo items, pending first
    Todos,
    /// Add a todo item
    AddTodo {
        name: String,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Mark a todo item done
    Done {
        /// Page id of the todo
        id: String,
    },
    /// Show the selectable option sets from the book schema
    Schema,
    /// Run a focus countdown (ctrl-c cancels)
    Timer {
        #[arg(long, default_value_t = 25)]
        minutes: u64,
    },
    /// Interactive session behind the access gate
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    if config.is_degraded() {
        warn!("NOTION_TOKEN or NOTION_DATABASE_ID missing; running in degraded mode");
    }
    let gateway = Gateway::new(config.clone());

    match args.command {
        Command::Dashboard => commands::dashboard(&gateway).await,
        Command::Books {
            query,
            status,
            category,
            genre,
            tag,
        } => {
            let filter = LibraryFilter {
                query,
                status,
                category,
                genre,
                tag,
            };
            commands::books(&gateway, filter).await
        }
        Command::AddBook {
            title,
            author,
            status,
            category,
            genre,
            tags,
            cover,
            pdf,
            summary,
            start,
            end,
        } => {
            let draft = BookDraft {
                title,
                author,
                status,
                category,
                genre,
                tags,
                cover_url: cover,
                pdf_url: pdf,
                summary,
                start_date: start.map(|d| d.to_string()),
                end_date: end.map(|d| d.to_string()),
            };
            commands::add_book(&gateway, draft).await
        }
        Command::Calendar { year, month } => commands::calendar(&gateway, year, month).await,
        Command::Log {
            book,
            date,
            pages,
            minutes,
        } => commands::log(&gateway, &book, date, pages, minutes).await,
        Command::Todos => commands::todos(&gateway).await,
        Command::AddTodo { name, due } => commands::add_todo(&gateway, &name, due).await,
        Command::Done { id } => commands::done(&gateway, &id).await,
        Command::Schema => commands::schema(&gateway).await,
        Command::Timer { minutes } => commands::timer(minutes).await,
        Command::Browse => commands::browse(&gateway, &config).await,
    }
}
