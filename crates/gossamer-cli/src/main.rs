use std::env;
use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use gossamer_crawler::{crawl_domain, CrawlerConfig, PageResult};
use tokio::runtime;
use tokio::sync::mpsc;
use url::Url;

mod render;

/// Your friendly neighbourhood web crawler
#[derive(Debug, Parser)]
#[command(name = "gossamer", version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "crawl")]
    Crawl(CrawlArgs),
}

/// Crawl a single domain
#[derive(Debug, clap::Args)]
pub struct CrawlArgs {
    /// Root domain to crawl, e.g. https://example.com
    pub domain: String,
    /// How deep to crawl, 0 meaning unlimited
    #[arg(long, short, default_value_t = 0)]
    pub depth: usize,
    /// How many parallel requests are made to the domain
    #[arg(long, short, default_value_t = 5)]
    pub parallel: usize,
    /// How long to wait between requests, in seconds
    #[arg(long, short, default_value_t = 1.0)]
    pub wait: f32,
    /// Print each page result as a JSON line instead of a table
    #[arg(long)]
    pub json: bool,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

impl TryFrom<&CrawlArgs> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlArgs) -> Result<Self, Self::Error> {
        let domain = Url::parse(&args.domain)
            .map_err(|_| anyhow!("The domain name provided is not valid!"))?;
        if domain.host_str().is_none() {
            return Err(anyhow!("The domain name provided is not valid!"));
        }
        if !matches!(domain.path(), "" | "/") || domain.query().is_some() {
            return Err(anyhow!("Please only provide the root domain name!"));
        }
        if args.parallel == 0 {
            return Err(anyhow!("The parallel flag must be a positive integer!"));
        }
        if !args.wait.is_finite() || args.wait < 0.0 {
            return Err(anyhow!("The wait flag must be a non-negative duration!"));
        }

        let mut conf = CrawlerConfig::new(domain);
        conf.depth = args.depth;
        conf.parallel = args.parallel;
        conf.wait = Duration::from_secs_f32(args.wait);
        Ok(conf)
    }
}

pub fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let config: CrawlerConfig = (&args).try_into()?;

    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(async move {
        let (tx_report, mut rx_report) = mpsc::unbounded_channel::<PageResult>();

        let session = crawl_domain(&config, tx_report);
        let reporter = async {
            while let Some(result) = rx_report.recv().await {
                if args.json {
                    match serde_json::to_string(&result) {
                        Ok(line) => println!("{line}"),
                        Err(e) => log::error!("couldn't serialize result: {e}"),
                    }
                } else {
                    print!("{}", render::page_table(&result));
                }
            }
        };

        let (res, ()) = tokio::join!(session, reporter);
        res
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Crawl(args) => {
            if !args.quiet {
                if env::var("RUST_LOG").is_err() {
                    env::set_var("RUST_LOG", "gossamer_crawler=warn");
                }
                env_logger::init();
            }
            crawl(args)
        }
    }
}
