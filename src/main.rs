//! CLI entry point for the NPS Rater tool.
//!
//! Loads a survey file once, applies the filters given on the command line,
//! and prints KPI numbers, chart series, radar profiles, trends or detractor
//! feedback as text or JSON.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nps_rater::analyzers::chart::{ChartKind, ChartRequest};
use nps_rater::analyzers::types::Metric;
use nps_rater::config::{Settings, parse_delimiter};
use nps_rater::dashboard::{
    Dashboard, DashboardRequest, RadarRequest, Section, build_dashboard,
};
use nps_rater::dataset::{Dataset, DatasetHandle, FileSource};
use nps_rater::filter::Filter;
use nps_rater::output;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "nps_rater")]
#[command(about = "Net Promoter Score analysis of survey spreadsheets", long_about = None)]
struct Cli {
    /// Survey file (.csv, .csv.gz, .xlsx, .xls, .ods); defaults to NPS_DATA_FILE
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Delimiter for CSV files; defaults to NPS_CSV_DELIMITER or ';'
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MetricArg {
    Count,
    Nps,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Count => Metric::Count,
            MetricArg::Nps => Metric::NpsScore,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Bar,
    Donut,
}

impl From<KindArg> for ChartKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Bar => ChartKind::Bar,
            KindArg::Donut => ChartKind::Donut,
        }
    }
}

#[derive(Args, Clone)]
struct FilterArgs {
    /// First day to include (YYYY-MM-DD); defaults to the earliest response
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD); defaults to the latest response
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Column searched by --search
    #[arg(long, default_value = "Empresa")]
    search_field: String,

    /// Case-insensitive text that the search column must contain
    #[arg(long)]
    search: Option<String>,

    /// Keep only listed values of a column, e.g. --select "Setor=Varejo,Saúde"
    #[arg(long = "select", value_name = "COLUMN=V1,V2")]
    selects: Vec<String>,
}

#[derive(Args, Clone)]
struct ChartArgs {
    /// Column on the X axis (or donut slices)
    #[arg(long)]
    x: Option<String>,

    /// Metric on the Y axis
    #[arg(long, value_enum, default_value_t = MetricArg::Count)]
    metric: MetricArg,

    /// Optional second column split by color
    #[arg(long)]
    color: Option<String>,

    #[arg(long, value_enum, default_value_t = KindArg::Bar)]
    kind: KindArg,
}

#[derive(Args, Clone)]
struct RadarArgs {
    /// Column whose items are compared
    #[arg(long)]
    by: Option<String>,

    /// Item to plot; repeat for several
    #[arg(long = "entity")]
    entities: Vec<String>,

    /// Criterion column to include; repeat for several (default: all)
    #[arg(long = "criterion")]
    criteria: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the criterion and categorical columns found in the data
    Schema,
    /// Overall NPS score and classification breakdown
    Kpi {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Grouped counts or scores for a bar or donut chart
    Chart {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Average criterion scores per item, as closed radar polygons
    Radar {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        radar: RadarArgs,
    },
    /// Monthly trend of a metric
    Trend {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = MetricArg::Nps)]
        metric: MetricArg,
    },
    /// Most recent detractor comments
    Comments {
        #[command(flatten)]
        filters: FilterArgs,
        /// How many comments to show; defaults to NPS_COMMENT_TAIL or 10
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Every section at once
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        chart: ChartArgs,
        #[command(flatten)]
        radar: RadarArgs,
        #[arg(long, value_enum, default_value_t = MetricArg::Nps)]
        trend_metric: MetricArg,
        #[arg(long)]
        limit: Option<usize>,
        /// Re-render whenever the data file changes, checking every SECS seconds
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

/// Turns the loaded dataset into a request; re-run after every reload.
type RequestBuilder = Box<dyn Fn(&Dataset) -> Result<DashboardRequest>>;

fn builder(f: impl Fn(&Dataset) -> Result<DashboardRequest> + 'static) -> RequestBuilder {
    Box::new(f)
}

/// Which part of the dashboard a subcommand prints.
#[derive(Clone, Copy, PartialEq, Eq)]
enum View {
    Kpi,
    Chart,
    Radar,
    Trend,
    Comments,
    All,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/nps_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nps_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(file) = cli.file {
        settings.data_file = file;
    }
    if let Some(raw) = &cli.delimiter {
        settings.delimiter = parse_delimiter(raw)?;
    }

    let mut handle = DatasetHandle::open(FileSource::from_settings(&settings))
        .with_context(|| format!("could not load '{}'", settings.data_file.display()))?;

    let (view, build, watch): (View, RequestBuilder, Option<u64>) =
        match cli.command {
            Commands::Schema => {
                let schema = handle.dataset().schema();
                match cli.format {
                    Format::Json => println!("{}", output::to_json(schema)?),
                    Format::Text => print!("{}", output::schema_text(schema)),
                }
                return Ok(());
            }
            Commands::Kpi { filters } => (
                View::Kpi,
                builder(move |data: &Dataset| {
                    Ok(DashboardRequest {
                        filters: build_filters(data, &filters)?,
                        ..DashboardRequest::default()
                    })
                }),
                None,
            ),
            Commands::Chart { filters, chart } => (
                View::Chart,
                builder(move |data: &Dataset| {
                    Ok(DashboardRequest {
                        filters: build_filters(data, &filters)?,
                        chart: Some(chart_request(&chart)?),
                        ..DashboardRequest::default()
                    })
                }),
                None,
            ),
            Commands::Radar { filters, radar } => (
                View::Radar,
                builder(move |data: &Dataset| {
                    Ok(DashboardRequest {
                        filters: build_filters(data, &filters)?,
                        radar: radar_request(data, &radar),
                        ..DashboardRequest::default()
                    })
                }),
                None,
            ),
            Commands::Trend { filters, metric } => (
                View::Trend,
                builder(move |data: &Dataset| {
                    Ok(DashboardRequest {
                        filters: build_filters(data, &filters)?,
                        trend_metric: metric.into(),
                        ..DashboardRequest::default()
                    })
                }),
                None,
            ),
            Commands::Comments { filters, limit } => {
                let tail = limit.unwrap_or(settings.comment_tail);
                (
                    View::Comments,
                    builder(move |data: &Dataset| {
                        Ok(DashboardRequest {
                            filters: build_filters(data, &filters)?,
                            comment_tail: tail,
                            ..DashboardRequest::default()
                        })
                    }),
                    None,
                )
            }
            Commands::Dashboard {
                filters,
                chart,
                radar,
                trend_metric,
                limit,
                watch,
            } => {
                let tail = limit.unwrap_or(settings.comment_tail);
                (
                    View::All,
                    builder(move |data: &Dataset| {
                        Ok(DashboardRequest {
                            filters: build_filters(data, &filters)?,
                            chart: match &chart.x {
                                Some(_) => Some(chart_request(&chart)?),
                                None => None,
                            },
                            radar: radar_request(data, &radar),
                            trend_metric: trend_metric.into(),
                            comment_tail: tail,
                        })
                    }),
                    watch,
                )
            }
        };

    loop {
        let request = build(handle.dataset())?;
        let dashboard = build_dashboard(handle.dataset(), &request);
        output::log_pretty(&dashboard);
        print!("{}", render(&dashboard, view, cli.format)?);

        let Some(secs) = watch else {
            break;
        };
        info!(secs, path = %settings.data_file.display(), "Watching data file for changes");
        loop {
            std::thread::sleep(Duration::from_secs(secs.max(1)));
            match handle.refresh() {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => error!(error = %e, "Reload failed, keeping previous data"),
            }
        }
    }

    Ok(())
}

fn chart_request(args: &ChartArgs) -> Result<ChartRequest> {
    let Some(x) = &args.x else {
        bail!("--x is required to build a chart");
    };
    Ok(ChartRequest {
        kind: args.kind.into(),
        x: x.clone(),
        metric: args.metric.into(),
        color: args.color.clone(),
    })
}

/// Defaults the radar dimension to the first categorical column.
fn radar_request(data: &Dataset, args: &RadarArgs) -> Option<RadarRequest> {
    let dimension = args
        .by
        .clone()
        .or_else(|| data.schema().dimensions().first().cloned())?;
    Some(RadarRequest {
        dimension,
        entities: args.entities.clone(),
        criteria: (!args.criteria.is_empty()).then(|| args.criteria.clone()),
    })
}

fn build_filters(data: &Dataset, args: &FilterArgs) -> Result<Vec<Filter>> {
    let mut filters = Vec::new();

    filters.extend(Filter::date_range(data.date_bounds(), args.from, args.to));

    if let Some(needle) = &args.search {
        filters.push(Filter::TextSearch {
            field: args.search_field.clone(),
            needle: needle.clone(),
        });
    }

    for raw in &args.selects {
        filters.push(Filter::parse_select(raw)?);
    }

    Ok(filters)
}

fn render(dashboard: &Dashboard, view: View, format: Format) -> Result<String> {
    let Some(sections) = dashboard.sections() else {
        return match format {
            Format::Json => Ok(format!("{}\n", output::to_json(dashboard)?)),
            Format::Text => Ok(output::dashboard_text(dashboard)),
        };
    };

    let text = match (view, format) {
        (View::All, Format::Json) => output::to_json(dashboard)?,
        (View::All, Format::Text) => output::dashboard_text(dashboard),
        (View::Kpi, Format::Json) => output::to_json(&sections.kpis)?,
        (View::Kpi, Format::Text) => output::kpi_text(&sections.kpis),
        (View::Chart, _) => match (&sections.chart, format) {
            (Some(chart), Format::Json) => output::to_json(chart)?,
            (Some(Section::Ready(chart)), Format::Text) => output::chart_text(chart),
            (Some(Section::Notice(notice)), Format::Text) => notice.clone(),
            (None, _) => String::new(),
        },
        (View::Radar, Format::Json) => output::to_json(&sections.radar)?,
        (View::Radar, Format::Text) => match &sections.radar {
            Section::Ready(profile) => output::radar_text(profile),
            Section::Notice(notice) => notice.clone(),
        },
        (View::Trend, Format::Json) => output::to_json(&sections.trend)?,
        (View::Trend, Format::Text) => output::trend_text(&sections.trend),
        (View::Comments, Format::Json) => output::to_json(&sections.detractor_comments)?,
        (View::Comments, Format::Text) => match &sections.detractor_comments {
            Some(comments) => output::comments_text(comments),
            None => "The data has no comment column.".to_string(),
        },
    };

    Ok(if text.ends_with('\n') {
        text
    } else {
        format!("{text}\n")
    })
}
