use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use logsearch::api::EventSearchClient;
use logsearch::config::Config;
use logsearch::error::FormError;
use logsearch::filters::{FilterField, SearchForm};
use logsearch::results::{render_files, render_outcomes, render_stats};
use logsearch::session::Session;
use logsearch::shell;

#[derive(Parser)]
#[command(name = "logsearch", version, about = "Upload event logs and search network events")]
struct Cli {
    /// Base URL of the event search API (overrides LOGSEARCH_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload log files (.log, .txt, .csv) in one batch
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Search ingested events
    Search(SearchArgs),
    /// Show the server's event and file counts
    Stats,
    /// List files known to the server
    Files,
    /// Interactive session
    Shell,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long)]
    src_addr: Option<String>,
    #[arg(long)]
    dst_addr: Option<String>,
    #[arg(long)]
    account_id: Option<String>,
    /// ACCEPT or REJECT
    #[arg(long)]
    action: Option<String>,
    #[arg(long)]
    src_port: Option<String>,
    #[arg(long)]
    dst_port: Option<String>,
    #[arg(long)]
    protocol: Option<String>,
    /// OK or NODATA
    #[arg(long)]
    log_status: Option<String>,
    /// Epoch seconds
    #[arg(long)]
    start_time: Option<String>,
    /// Epoch seconds
    #[arg(long)]
    end_time: Option<String>,
    #[arg(long)]
    page: Option<String>,
    /// 25, 50, 100 or 200
    #[arg(long)]
    page_size: Option<String>,
}

impl SearchArgs {
    fn fill(&self, form: &mut SearchForm) -> Result<(), FormError> {
        let filters = [
            (FilterField::SrcAddr, &self.src_addr),
            (FilterField::DstAddr, &self.dst_addr),
            (FilterField::AccountId, &self.account_id),
            (FilterField::Action, &self.action),
            (FilterField::SrcPort, &self.src_port),
            (FilterField::DstPort, &self.dst_port),
            (FilterField::Protocol, &self.protocol),
            (FilterField::LogStatus, &self.log_status),
            (FilterField::StartTime, &self.start_time),
            (FilterField::EndTime, &self.end_time),
        ];
        for (field, value) in filters {
            if let Some(value) = value {
                form.set_filter(field, value.as_str());
            }
        }
        // Pagination last: filter edits reset the page.
        if let Some(page_size) = &self.page_size {
            form.edit("page_size", page_size)?;
        }
        if let Some(page) = &self.page {
            form.edit("page", page)?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("logsearch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url);
    }

    let client = EventSearchClient::new(&config)?;
    tracing::debug!(api_url = client.api_url(), "event search client ready");
    let mut session = Session::new(client);

    match cli.command {
        Command::Upload { files } => {
            session.stage_files(files);
            let outcomes = session.upload().await?;
            print!("{}", render_outcomes(outcomes));
            println!("{}", render_stats(session.stats()));
        }
        Command::Search(args) => {
            args.fill(session.form_mut())?;
            session.search().await?;
            print!("{}", session.results().render());
        }
        Command::Stats => {
            session.sync_stats().await?;
            println!("{}", render_stats(session.stats()));
        }
        Command::Files => {
            let files = session.list_files().await?;
            print!("{}", render_files(&files));
        }
        Command::Shell => {
            println!("{}", shell::HELP);
            shell::run(&mut session).await?;
        }
    }

    Ok(())
}
