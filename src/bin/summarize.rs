use anyhow::{Context, Result, anyhow};
use clap::{ArgGroup, Parser};
use dropnotes::{
    config::Config,
    logging::{self, LogMode},
    processing::{ExtractionRequest, SummaryPipeline},
    summarization::PromptProfile,
};

#[derive(Parser)]
#[command(
    name = "dropnotes-summarize",
    about = "Summarize a note or a remote file once and print the result",
    group(ArgGroup::new("source").required(true).multiple(true).args(["text", "file_url"]))
)]
struct Cli {
    /// Inline note text to summarize.
    #[arg(long)]
    text: Option<String>,
    /// Download URL of the file to summarize.
    #[arg(long, requires = "mime_type")]
    file_url: Option<String>,
    /// Declared MIME type of the file, e.g. `application/pdf`.
    #[arg(long)]
    mime_type: Option<String>,
    /// Prompt profile: `brief` or `detailed`.
    #[arg(long, value_parser = parse_profile)]
    profile: Option<PromptProfile>,
}

fn parse_profile(value: &str) -> Result<PromptProfile, String> {
    value
        .parse()
        .map_err(|()| format!("unknown profile `{value}`; expected `brief` or `detailed`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_tracing(LogMode::Cli);

    let config = Config::from_env().context("Failed to load config from environment")?;
    let pipeline = SummaryPipeline::from_config(&config)
        .context("Failed to initialize summarization pipeline")?;

    let request = ExtractionRequest::resolve(cli.text, cli.file_url, cli.mime_type)
        .map_err(|error| anyhow!(error.user_message()))?;
    let result = pipeline
        .summarize(request, cli.profile)
        .await
        .map_err(|error| anyhow!(error.user_message()))?;

    println!("{}", result.summary_text);
    Ok(())
}
