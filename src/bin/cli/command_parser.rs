use clap::{value_parser, Arg, ArgAction, Command};
use shelfmark::{export::ExportFormat, library::SortMode, types::book::ReadingStatus};

fn status_arg() -> Arg {
    Arg::new("status")
        .long("status")
        .short('s')
        .help("Reading status")
        .value_parser(ReadingStatus::ALL.map(|s| s.as_str()))
}

pub fn arg_parser() -> Command {
    Command::new("shelfmark")
        .about("Track the books you own and read")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("scan")
                .about("Look up an ISBN, in the collection first")
                .arg(Arg::new("isbn").required(true))
                .arg(
                    Arg::new("add")
                        .long("add")
                        .help("Add the book if it is not in the collection yet")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Add a book by hand")
                .arg(Arg::new("isbn").long("isbn").required(true))
                .arg(Arg::new("title").long("title").required(true))
                .arg(
                    Arg::new("author")
                        .long("author")
                        .required(true)
                        .action(ArgAction::Append),
                )
                .arg(status_arg())
                .arg(Arg::new("publisher").long("publisher"))
                .arg(
                    Arg::new("year")
                        .long("year")
                        .value_parser(value_parser!(i32)),
                )
                .arg(
                    Arg::new("pages")
                        .long("pages")
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List the collection")
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_parser(SortMode::ALL.map(|m| m.as_str()))
                        .default_value(SortMode::default().as_str()),
                )
                .arg(Arg::new("query").long("query").short('q')),
        )
        .subcommand(
            Command::new("show")
                .about("Show everything about one book")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("update")
                .about("Change a book")
                .arg(Arg::new("id").required(true))
                .arg(status_arg())
                .arg(
                    Arg::new("rating")
                        .long("rating")
                        .value_parser(value_parser!(f64)),
                )
                .arg(Arg::new("notes").long("notes"))
                .arg(Arg::new("title").long("title")),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a book")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(Command::new("clear").about("Remove every book"))
        .subcommand(
            Command::new("export")
                .about("Export the collection")
                .arg(
                    Arg::new("format")
                        .required(true)
                        .value_parser(ExportFormat::ALL.map(|f| f.as_str())),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Write to this file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import books from a JSON or CSV file")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("push")
                .about("Send the collection to a Google Sheets webhook")
                .arg(Arg::new("url").required(true)),
        )
        .subcommand(Command::new("config").about("Print the default configuration"))
        .subcommand(Command::new("serve").about("Serve the HTTP API"))
}
