use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "cinebusca")]
#[command(about = "Movie search with trending queries", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "cinebusca.yaml")]
    config: String,
    #[arg(short, long)]
    debug: bool,
    #[arg(long)]
    json_logs: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Serve the search page and JSON API over HTTP.
    Serve,
    /// Search from the terminal, one line per edit of the search box.
    Interactive,
}

fn init_tracing(args: &Args, command: Command) {
    let default_filter = if args.debug {
        "cinebusca=debug,tower_http=debug"
    } else {
        "cinebusca=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Keep stdout free for the rendered page in interactive mode.
    let to_stderr = command == Command::Interactive;

    let registry = tracing_subscriber::registry().with(filter);
    match (args.json_logs, to_stderr) {
        (true, true) => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (true, false) => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        (false, true) => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        (false, false) => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Serve);

    init_tracing(&args, command);

    let result = match command {
        Command::Serve => cinebusca::run(&args.config, args.debug).await,
        Command::Interactive => cinebusca::run_interactive(&args.config, args.debug).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
