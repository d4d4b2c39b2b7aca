use std::{fs, process::exit};

use anyhow::{anyhow, bail, Result};
use clap::ArgMatches;
use tracing_subscriber::EnvFilter;

mod command_parser;
mod display;
mod server;

use shelfmark::{
    config::Config,
    cover::cover_candidates,
    export::ExportFormat,
    import::{import_into, parse_imported_books},
    library::{filter_books, sort_books, SortMode},
    lookup::{HttpFetcher, MetadataResolver},
    scan::{scan, ScanOutcome},
    store::{CollectionStore, FileBackend},
    types::{
        book::{BookDraft, ReadingStatus, Source},
        isbn::{clean_isbn, to_isbn13},
    },
    webhook, Error,
};

struct App {
    config:   Config,
    store:    CollectionStore<FileBackend>,
    resolver: MetadataResolver<HttpFetcher>,
}

fn status_arg(matches: &ArgMatches) -> Result<Option<ReadingStatus>> {
    Ok(matches
        .get_one::<String>("status")
        .map(|s| s.parse::<ReadingStatus>())
        .transpose()?)
}

async fn handle_scan(app: &App, matches: &ArgMatches) -> Result<()> {
    let isbn = matches.get_one::<String>("isbn").ok_or(anyhow!("isbn is required"))?;
    let style = &app.config.display;
    match scan(isbn, &app.store, &app.resolver).await? {
        ScanOutcome::AlreadyExists(book) => {
            println!("Already in your collection:");
            println!("{}", display::book_line(&book, style));
        }
        ScanOutcome::Found(book) => {
            println!("{}", display::new_book_details(&book, style));
            if matches.get_flag("add") {
                let record = app.store.add(BookDraft::from(book))?;
                println!("Added {}", display::book_line(&record, style));
            }
        }
    }
    Ok(())
}

fn handle_add(app: &App, matches: &ArgMatches) -> Result<()> {
    let raw_isbn = matches.get_one::<String>("isbn").ok_or(anyhow!("isbn is required"))?;
    let isbn13 = to_isbn13(&clean_isbn(raw_isbn)).ok_or(Error::InvalidIsbn)?;
    if app.store.find_by_isbn13(&isbn13)?.is_some() {
        bail!(Error::DuplicateIsbn(isbn13));
    }
    let draft = BookDraft {
        isbn13: Some(isbn13),
        title: matches.get_one::<String>("title").cloned(),
        authors: matches
            .get_many::<String>("author")
            .map(|authors| authors.cloned().collect()),
        publisher: matches.get_one::<String>("publisher").cloned(),
        publish_year: matches.get_one::<i32>("year").copied(),
        page_count: matches.get_one::<u32>("pages").copied(),
        status: Some(status_arg(matches)?.unwrap_or_default()),
        source: Some(Source::Manual),
        ..BookDraft::default()
    };
    let record = app.store.add(draft)?;
    println!("Added {}", display::book_line(&record, &app.config.display));
    Ok(())
}

fn handle_list(app: &App, matches: &ArgMatches) -> Result<()> {
    let mode = match matches.get_one::<String>("sort") {
        Some(mode) => mode.parse()?,
        None => SortMode::default(),
    };
    let query = matches.get_one::<String>("query").map(String::as_str).unwrap_or_default();
    let books = app.store.books()?;
    let found: Vec<_> = filter_books(&books, query).cloned().collect();
    for book in sort_books(&found, mode) {
        println!("{}", display::book_line(&book, &app.config.display));
    }
    Ok(())
}

fn handle_show(app: &App, matches: &ArgMatches) -> Result<()> {
    let id = matches.get_one::<String>("id").ok_or(anyhow!("id is required"))?;
    let book = app
        .store
        .find_by_id(id)?
        .ok_or_else(|| Error::RecordNotFound(id.clone()))?;
    let covers = cover_candidates(&book, &app.config.endpoints());
    println!("{}", display::book_details(&book, &covers, &app.config.display));
    Ok(())
}

fn handle_update(app: &App, matches: &ArgMatches) -> Result<()> {
    let id = matches.get_one::<String>("id").ok_or(anyhow!("id is required"))?;
    let draft = BookDraft {
        status: status_arg(matches)?,
        rating: matches.get_one::<f64>("rating").copied(),
        notes: matches.get_one::<String>("notes").cloned(),
        title: matches.get_one::<String>("title").cloned(),
        ..BookDraft::default()
    };
    let record = app.store.update(id, draft)?;
    println!("Updated {}", display::book_line(&record, &app.config.display));
    Ok(())
}

fn handle_export(app: &App, matches: &ArgMatches) -> Result<()> {
    let format: ExportFormat = matches
        .get_one::<String>("format")
        .ok_or(anyhow!("format is required"))?
        .parse()?;
    let rendered = format.render(&app.store.load()?)?;
    match matches.get_one::<String>("output") {
        Some(path) => {
            fs::write(path, rendered)?;
            eprintln!("Wrote {path}");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn handle_import(app: &App, matches: &ArgMatches) -> Result<()> {
    let file = matches.get_one::<String>("file").ok_or(anyhow!("file is required"))?;
    let content = fs::read_to_string(file)?;
    let drafts = parse_imported_books(&content, file)?;
    let summary = import_into(&app.store, drafts)?;
    println!(
        "Imported {} of {} books ({} already present, {} invalid)",
        summary.added, summary.total, summary.skipped, summary.failed
    );
    Ok(())
}

async fn handle_push(app: &App, matches: &ArgMatches) -> Result<()> {
    let url = matches.get_one::<String>("url").ok_or(anyhow!("url is required"))?;
    let client = reqwest::Client::builder()
        .timeout(app.config.lookup_timeout())
        .build()?;
    let books = app.store.books()?;
    let count = webhook::push_books(&client, url, &books).await?;
    println!("Sent {count} books to {}", webhook::webhook_host(url));
    Ok(())
}

async fn handle_command(app: App, matches: ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("scan", m)) => handle_scan(&app, m).await?,
        Some(("add", m)) => handle_add(&app, m)?,
        Some(("list", m)) => handle_list(&app, m)?,
        Some(("show", m)) => handle_show(&app, m)?,
        Some(("update", m)) => handle_update(&app, m)?,
        Some(("remove", m)) => {
            let id = m.get_one::<String>("id").ok_or(anyhow!("id is required"))?;
            if !app.store.remove(id)? {
                bail!(Error::RecordNotFound(id.clone()));
            }
            println!("Removed {id}");
        }
        Some(("clear", _)) => {
            app.store.clear()?;
            println!("Collection cleared");
        }
        Some(("export", m)) => handle_export(&app, m)?,
        Some(("import", m)) => handle_import(&app, m)?,
        Some(("push", m)) => handle_push(&app, m).await?,
        Some(("serve", _)) => {
            let (address, port) = (app.config.server_address, app.config.server_port);
            let state = server::AppState {
                store:    app.store,
                resolver: app.resolver,
                client:   reqwest::Client::builder()
                    .timeout(app.config.lookup_timeout())
                    .build()?,
            };
            server::start(state, address, port).await?;
        }
        Some((name, _)) => bail!("Unknown command {name}"),
        None => unreachable!("subcommand required"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shelfmark=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = command_parser::arg_parser().get_matches();

    if let Some(("config", _)) = matches.subcommand() {
        print!("{}", Config::default_as_string()?);
        return Ok(());
    }

    let config = Config::read_config()?;
    let app = App {
        store: CollectionStore::new(FileBackend::new(config.data_path())),
        resolver: MetadataResolver::new(
            HttpFetcher::new(config.lookup_timeout())?,
            config.endpoints(),
        ),
        config,
    };

    let error_style = app.config.display.error.clone();
    if let Err(e) = handle_command(app, matches).await {
        eprintln!("{} {e}", error_style.paint("Error:"));
        exit(1);
    }
    Ok(())
}
