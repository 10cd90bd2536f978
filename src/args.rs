use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitemap-insight")]
#[command(about = "Classifies, fetches and analyzes the pages listed in a site's sitemap")]
#[command(version)]
pub struct Args {
    /// Site identifier (e.g. ostrom, 1komma5, spotmyenergy)
    pub site: String,

    /// Sitemap file [default: sitemaps/<site>_sitemap.xml]
    #[arg(long)]
    pub sitemap: Option<PathBuf>,

    /// Output file [default: output/<site>_analysis.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of sitemap entries to analyze
    #[arg(short, long, default_value_t = 400)]
    pub limit: usize,

    /// Number of pages processed at once (overrides MAX_CONCURRENT_REQUESTS)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Fetch timeout in milliseconds (overrides REQUEST_TIMEOUT_MS)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Analysis model
    #[arg(long)]
    pub model: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for cached analysis results
    #[arg(long, conflicts_with = "no_cache")]
    pub cache_dir: Option<PathBuf>,

    /// Disable the result cache
    #[arg(long)]
    pub no_cache: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn sitemap_path(&self) -> PathBuf {
        self.sitemap
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("sitemaps/{}_sitemap.xml", self.site)))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("output/{}_analysis.json", self.site)))
    }
}
