use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use chanview::domain::entities::TeamId;
use chanview::infrastructure::{
    AppConfig, CliArgs, OutputFormat, RolePermissions, StorageManager, load_snapshot,
};
use chanview::presentation::{ReportOptions, SidebarPresenter, render_json, render_text};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let snapshot_path = args.snapshot.clone();
    let config = load_config(args)?;

    init_logging(&config)?;

    info!(version = chanview::VERSION, "Starting {}", chanview::NAME);

    let state = load_snapshot(&snapshot_path)?;
    let options = ReportOptions {
        team_id: config.sidebar.team_id.clone().map(TeamId::from),
        legacy: config.sidebar.legacy,
    };

    let mut presenter = SidebarPresenter::new(config.sidebar.autoclose);
    let report = presenter.build(&state, &options, &RolePermissions::new(&state))?;

    match config.format {
        OutputFormat::Text => print!("{}", render_text(&report)),
        OutputFormat::Json => println!("{}", render_json(&report)?),
    }

    Ok(())
}
