use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{Catalog, CleaningReport, MovieRecord, MAX_RATING};
use features::NumericScaling;
use neighbors::DistanceMetric;
use pipeline::filters::{
    GenreFilter, LanguageFilter, MinimumRatingFilter, ReleaseYearFilter, RuntimeBand,
    RuntimeFilter, TitleSearchFilter,
};
use pipeline::{browse, FilterPipeline, PageRequest, SortOrder};
use rand::Rng;
use server::{
    RecommendError, RecommendationService, RecommenderConfig, RecommenderSnapshot, ScoredMovie,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::warn;

/// CineRecs - "more like this" movie recommendations
#[derive(Parser)]
#[command(name = "cine-recs")]
#[command(about = "Content-based movie recommendations from a local catalog", long_about = None)]
struct Cli {
    /// Path to the `::`-separated catalog file
    #[arg(short = 'd', long, default_value = "data/movies.dat")]
    data_file: PathBuf,

    /// Prebuilt index artifact (see `build-index`); built from the catalog when omitted
    #[arg(long)]
    index_file: Option<PathBuf>,

    /// JSON file with recommender settings; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Distance between feature vectors
    #[arg(long, value_enum)]
    metric: Option<MetricArg>,

    /// Normalisation of the numeric columns
    #[arg(long, value_enum)]
    scaling: Option<ScalingArg>,

    /// Weight of the numeric block relative to genres
    #[arg(long)]
    numeric_weight: Option<f32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Movies similar to a given title
    Recommend {
        /// Exact catalog title
        #[arg(long)]
        title: String,

        /// Number of recommendations (defaults to the configured count)
        #[arg(long)]
        limit: Option<usize>,

        /// Show distances and shared genres
        #[arg(long)]
        explain: bool,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Browse the catalog with filters
    Browse {
        #[arg(long)]
        genre: Option<String>,

        #[arg(long)]
        year: Option<u16>,

        #[arg(long, value_enum)]
        runtime: Option<RuntimeArg>,

        /// Original language code, e.g. "fr"
        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        min_rating: Option<f32>,

        #[arg(long, value_enum, default_value = "rating-desc")]
        sort: SortArg,

        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long, default_value = "24")]
        per_page: usize,
    },

    /// Show catalog statistics
    Stats,

    /// Build the index and save it as an artifact
    BuildIndex {
        /// Where to write the artifact
        #[arg(long)]
        out: PathBuf,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum MetricArg {
    Euclidean,
    Cosine,
}

impl From<MetricArg> for DistanceMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Euclidean => DistanceMetric::Euclidean,
            MetricArg::Cosine => DistanceMetric::Cosine,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum ScalingArg {
    MinMax,
    ZScore,
}

impl From<ScalingArg> for NumericScaling {
    fn from(arg: ScalingArg) -> Self {
        match arg {
            ScalingArg::MinMax => NumericScaling::MinMax,
            ScalingArg::ZScore => NumericScaling::ZScore,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RuntimeArg {
    Short,
    Medium,
    Long,
    VeryLong,
}

impl From<RuntimeArg> for RuntimeBand {
    fn from(arg: RuntimeArg) -> Self {
        match arg {
            RuntimeArg::Short => RuntimeBand::Short,
            RuntimeArg::Medium => RuntimeBand::Medium,
            RuntimeArg::Long => RuntimeBand::Long,
            RuntimeArg::VeryLong => RuntimeBand::VeryLong,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    RatingDesc,
    RatingAsc,
    YearDesc,
    YearAsc,
    TitleAsc,
    TitleDesc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::RatingDesc => SortOrder::RatingDesc,
            SortArg::RatingAsc => SortOrder::RatingAsc,
            SortArg::YearDesc => SortOrder::YearDesc,
            SortArg::YearAsc => SortOrder::YearAsc,
            SortArg::TitleAsc => SortOrder::TitleAsc,
            SortArg::TitleDesc => SortOrder::TitleDesc,
        }
    }
}

/// Bins of the rating distribution shown by `stats`
const RATING_BINS: usize = 20;

/// Filter choices of the `browse` command
struct BrowseOptions {
    genre: Option<String>,
    year: Option<u16>,
    runtime: Option<RuntimeArg>,
    language: Option<String>,
    min_rating: Option<f32>,
    sort: SortArg,
    request: PageRequest,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    println!("Loading catalog from {}...", cli.data_file.display());
    let start = Instant::now();
    let (catalog, report) = load_catalog(&cli.data_file)?;
    let catalog = Arc::new(catalog);
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            limit,
            explain,
        } => {
            let service = open_service(catalog, config, cli.index_file.as_deref())?;
            handle_recommend(&service, &title, limit, explain)?
        }
        Commands::Search { title } => handle_search(&catalog, &title)?,
        Commands::Browse {
            genre,
            year,
            runtime,
            language,
            min_rating,
            sort,
            page,
            per_page,
        } => handle_browse(
            &catalog,
            BrowseOptions {
                genre,
                year,
                runtime,
                language,
                min_rating,
                sort,
                request: PageRequest::new(page, per_page),
            },
        )?,
        Commands::Stats => handle_stats(&catalog, &report),
        Commands::BuildIndex { out } => handle_build_index(catalog, config, &out)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => {
            let service = open_service(catalog, config, cli.index_file.as_deref())?;
            handle_benchmark(service, requests, concurrent).await?
        }
    }

    Ok(())
}

/// Config file (or defaults) with the command-line overrides applied
fn resolve_config(cli: &Cli) -> Result<RecommenderConfig> {
    let mut config = match &cli.config {
        Some(path) => RecommenderConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => RecommenderConfig::default(),
    };
    if let Some(metric) = cli.metric {
        config = config.with_metric(metric.into());
    }
    if let Some(scaling) = cli.scaling {
        config = config.with_scaling(scaling.into());
    }
    if let Some(weight) = cli.numeric_weight {
        config = config.with_numeric_weight(weight);
    }
    Ok(config)
}

/// Parse and clean the catalog, keeping the cleaning report for `stats`
fn load_catalog(path: &Path) -> Result<(Catalog, CleaningReport)> {
    let rows = data_loader::parser::parse_catalog(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let (catalog, report) = Catalog::from_raw_rows(rows).context("Failed to clean catalog")?;
    if report.dropped() > 0 {
        warn!(
            "Dropped {} of {} catalog rows while cleaning",
            report.dropped(),
            report.rows_read
        );
    }
    Ok((catalog, report))
}

/// Load the index artifact when one is given, otherwise build from the catalog.
///
/// A stale artifact is not fatal: the index is rebuilt and a warning logged.
/// The same happens when the artifact was built with a different metric,
/// scaling or weight than the one requested.
fn open_service(
    catalog: Arc<Catalog>,
    config: RecommenderConfig,
    index: Option<&Path>,
) -> Result<RecommendationService> {
    let snapshot = match index {
        Some(path) => match RecommenderSnapshot::load(path, Arc::clone(&catalog)) {
            Ok(snapshot) if same_model(snapshot.config(), &config) => snapshot,
            Ok(snapshot) => {
                warn!(
                    "Index {} was built with {:?}, rebuilding with the requested settings",
                    path.display(),
                    snapshot.config()
                );
                RecommenderSnapshot::build(catalog, config)?
            }
            Err(RecommendError::StaleIndex { reason }) => {
                warn!("Index {} is stale ({}), rebuilding", path.display(), reason);
                RecommenderSnapshot::build(catalog, config)?
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to load index {}", path.display()))
            }
        },
        None => RecommenderSnapshot::build(catalog, config).context("Failed to build index")?,
    };
    Ok(RecommendationService::new(snapshot))
}

/// Whether two configs produce the same vectors and distances
fn same_model(a: &RecommenderConfig, b: &RecommenderConfig) -> bool {
    a.metric == b.metric && a.scaling == b.scaling && a.numeric_weight == b.numeric_weight
}

/// Handle the 'recommend' command
fn handle_recommend(
    service: &RecommendationService,
    title: &str,
    limit: Option<usize>,
    explain: bool,
) -> Result<()> {
    let snapshot = service.snapshot();
    let limit = limit.unwrap_or(snapshot.config().default_count);

    let recommendations = match service.recommend_scored(title, limit) {
        Ok(recommendations) => recommendations,
        Err(RecommendError::MovieNotFound { title }) => {
            let suggestions = search_titles(snapshot.catalog(), &title)?;
            if !suggestions.is_empty() {
                println!("{}", "Did you mean:".yellow());
                for movie in suggestions.iter().take(5) {
                    println!("  - {}", movie.title);
                }
            }
            return Err(anyhow!("Movie '{}' not found in catalog", title));
        }
        Err(e) => return Err(e.into()),
    };

    // A found title always has a record
    let query = snapshot
        .catalog()
        .get(title)
        .ok_or_else(|| anyhow!("Movie '{}' not found in catalog", title))?;
    print_recommendations(query, &recommendations, explain);
    Ok(())
}

/// Exact (case-insensitive) matches first, then substring matches by rating
fn search_titles<'a>(catalog: &'a Catalog, title: &str) -> Result<Vec<&'a MovieRecord>> {
    let mut matches = FilterPipeline::new()
        .add_filter(TitleSearchFilter::new(title))
        .apply(catalog)?;

    let needle = title.trim().to_lowercase();
    matches.sort_by(|a, b| {
        // `false` sorts first
        let a_partial = a.title.to_lowercase() != needle;
        let b_partial = b.title.to_lowercase() != needle;
        a_partial
            .cmp(&b_partial)
            .then_with(|| b.rating.total_cmp(&a.rating))
    });
    Ok(matches)
}

/// Handle the 'search' command
fn handle_search(catalog: &Catalog, title: &str) -> Result<()> {
    let matches = search_titles(catalog, title)?;

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for movie in matches.iter().take(20) {
        println!("  {}", describe(movie));
    }
    Ok(())
}

/// Handle the 'browse' command
fn handle_browse(catalog: &Catalog, options: BrowseOptions) -> Result<()> {
    let pipeline = FilterPipeline::new()
        .add_optional(options.genre.as_deref().map(GenreFilter::new))
        .add_optional(options.year.map(ReleaseYearFilter::new))
        .add_optional(options.runtime.map(|r| RuntimeFilter::new(r.into())))
        .add_optional(options.language.as_deref().map(LanguageFilter::new))
        .add_optional(options.min_rating.map(MinimumRatingFilter::new));

    let page = browse(catalog, &pipeline, options.sort.into(), options.request)?;

    println!(
        "{}",
        format!(
            "Page {}/{} ({} movies)",
            page.page,
            page.total_pages.max(1),
            page.total_items
        )
        .bold()
        .blue()
    );
    for (i, movie) in page.items.iter().enumerate() {
        let rank = (page.page - 1) * page.per_page + i + 1;
        println!("{}. {}", rank.to_string().green(), describe(movie));
    }
    if page.has_next() {
        println!("  ... more on page {}", page.page + 1);
    }
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(catalog: &Catalog, report: &CleaningReport) {
    let summary = catalog.summary();

    println!("{}", "Catalog statistics:".bold().blue());
    println!("{}Movies: {}", "• ".green(), summary.total_movies);
    println!("{}Average rating: {:.2}", "• ".green(), summary.average_rating);
    println!("{}Total runtime: {} hours", "• ".green(), summary.total_runtime_hours);
    println!("{}Distinct genres: {}", "• ".green(), summary.distinct_genres);
    if let Some((first, last)) = summary.year_range {
        println!("{}Years: {} - {}", "• ".green(), first, last);
    }

    println!("{}", "Cleaning:".bold().blue());
    println!("{}Rows read: {}", "• ".cyan(), report.rows_read);
    println!("{}Missing rating/runtime: {}", "• ".cyan(), report.missing_required);
    println!("{}Non-positive values: {}", "• ".cyan(), report.non_positive);
    println!("{}Rating out of range: {}", "• ".cyan(), report.out_of_range);
    println!("{}Duplicate titles: {}", "• ".cyan(), report.duplicate_titles);

    let mut genres: Vec<(&str, usize)> = catalog
        .genres()
        .into_iter()
        .map(|g| (g, catalog.get_movies_by_genre(g).len()))
        .collect();
    genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    println!("{}", "Top genres:".bold().blue());
    for (genre, count) in genres.iter().take(10) {
        println!("  - {}: {} movies", genre, count);
    }

    let histogram = catalog.rating_histogram(RATING_BINS);
    let tallest = histogram.iter().copied().max().unwrap_or(0).max(1);
    let width = MAX_RATING / RATING_BINS as f32;
    println!("{}", "Rating distribution:".bold().blue());
    for (bin, count) in histogram.iter().enumerate().filter(|(_, c)| **c > 0) {
        let low = bin as f32 * width;
        println!(
            "  {:>4.1}-{:<4.1} {:>6} {}",
            low,
            low + width,
            count,
            "#".repeat(count * 40 / tallest).cyan()
        );
    }

    println!("{}", "Movies per decade:".bold().blue());
    for (decade, count) in catalog.movies_per_decade() {
        println!("  - {}s: {} movies", decade, count);
    }
}

/// Handle the 'build-index' command
fn handle_build_index(catalog: Arc<Catalog>, config: RecommenderConfig, out: &Path) -> Result<()> {
    let start = Instant::now();
    let snapshot = RecommenderSnapshot::build(catalog, config).context("Failed to build index")?;
    snapshot
        .save(out)
        .with_context(|| format!("Failed to write index {}", out.display()))?;

    println!(
        "{} Wrote index to {} in {:?}",
        "✓".green(),
        out.display(),
        start.elapsed()
    );
    println!("{}Rows: {}", "• ".cyan(), snapshot.len());
    println!("{}Dimensions: {}", "• ".cyan(), snapshot.encoder().dimension());
    println!("{}Metric: {}", "• ".cyan(), snapshot.config().metric);
    println!("{}Fingerprint: {}", "• ".cyan(), snapshot.fingerprint());
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: RecommendationService,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    // Pick random catalog titles up front; ThreadRng is not Send
    let titles: Vec<String> = {
        let snapshot = service.snapshot();
        let all: Vec<&str> = snapshot.catalog().titles().collect();
        let mut rng = rand::rng();
        (0..requests)
            .map(|_| all[rng.random_range(0..all.len())].to_string())
            .collect()
    };

    // Bound the number of in-flight requests
    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = vec![];
    for title in titles {
        let service = service.clone();
        let permits = Arc::clone(&permits);
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            // The KNN scan is CPU-bound; keep it off the async workers
            tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                service.recommend(&title, 10)?;
                Ok::<_, anyhow::Error>(start.elapsed())
            })
            .await?
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    if timings.is_empty() {
        println!("No requests were made");
        return Ok(());
    }

    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / (timings.len() as u32);
    timings.sort();
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", timings.len(), concurrent.max(1));
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Nearest-rank percentile of a sorted, non-empty list
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let idx = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// One-line description: title (year) [genres] rating, runtime
fn describe(movie: &MovieRecord) -> String {
    let genres = movie.genres.iter().cloned().collect::<Vec<_>>().join(", ");
    let year = movie
        .release_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "????".to_string());
    format!(
        "{} ({}) [{}] - {:.1}/10, {} min",
        movie.title, year, genres, movie.rating, movie.runtime_minutes
    )
}

/// Helper function to format and print recommendations
fn print_recommendations(query: &MovieRecord, recommendations: &[ScoredMovie], explain: bool) {
    println!(
        "{}",
        format!("Because you liked {}:", query.title).bold().blue()
    );
    if recommendations.is_empty() {
        println!("  (the catalog has no other movies)");
    }

    for (i, scored) in recommendations.iter().enumerate() {
        println!("{}. {}", (i + 1).to_string().green(), describe(&scored.movie));
        if explain {
            let shared: Vec<&str> = query
                .genres
                .intersection(&scored.movie.genres)
                .map(String::as_str)
                .collect();
            let shared = if shared.is_empty() {
                "none".to_string()
            } else {
                shared.join(", ")
            };
            println!(
                "   distance {:.4}, shared genres: {}",
                scored.distance, shared
            );
        }
    }
}
