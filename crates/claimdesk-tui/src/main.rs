use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use claimdesk_core::{AnalysisView, ArticleGateway, HttpGateway, config, config_file};

mod action;
mod app;
mod input;
mod settings;
mod theme;
mod tui_event;
mod view;

use action::Action;
use app::App;

/// claimdesk: attach claims to an article and mark its analysis complete.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Id of the article to analyse
    article_id: Option<String>,

    /// Base URL of the claimdesk API
    #[arg(long, env = config::API_URL_ENV)]
    api_url: Option<String>,

    /// Quiet period before a claim search is sent, in milliseconds
    #[arg(long, env = config::DEBOUNCE_ENV)]
    debounce_ms: Option<u64>,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,

    /// Where to write logs (default: <data dir>/claimdesk/claimdesk-tui.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write the resolved settings to the user config file and exit
    #[arg(long)]
    save_config: bool,
}

const TICK_RATE: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let _log_guard = init_logging(args.log_file.clone())?;

    let overrides = settings::Overrides {
        api_url: args.api_url.clone(),
        debounce_ms: args.debounce_ms,
        theme: args.theme.clone(),
    };
    let settings = settings::resolve(&overrides, &config_file::load_config());

    if args.save_config {
        let path = config_file::save_config(&settings::to_config_file(&settings))
            .map_err(anyhow::Error::msg)?;
        println!("Saved config to {}", path.display());
        return Ok(());
    }

    let http = HttpGateway::new(settings.api.clone()).context("building HTTP client")?;
    tracing::info!(
        base_url = %http.config().base_url,
        timeout_secs = http.config().timeout.as_secs(),
        debounce_ms = settings.api.search_debounce.as_millis() as u64,
        article = ?args.article_id,
        "starting claimdesk-tui"
    );

    let gateway: Arc<dyn ArticleGateway> = Arc::new(http);
    let (view, mut outcomes) =
        AnalysisView::new(gateway, args.article_id.clone(), settings.api.search_debounce);
    let mut app = App::new(view, theme::Theme::named(&settings.theme));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    tui_event::drain_pending();

    let cancel = CancellationToken::new();
    let mut events = tui_event::spawn_reader(cancel.clone());

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    let result = run(&mut terminal, &mut app, &mut events, &mut outcomes, &cancel).await;
    cancel.cancel();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<ratatui::crossterm::event::Event>,
    outcomes: &mut tokio::sync::mpsc::UnboundedReceiver<claimdesk_core::SearchOutcome>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    // Show the placeholder before the first fetch goes out.
    terminal.draw(|f| app.view(f))?;
    let _ = app.view.load().await;

    let mut ticker = tokio::time::interval(TICK_RATE);
    loop {
        terminal.draw(|f| app.view(f))?;

        let action = tokio::select! {
            biased;
            _ = cancel.cancelled() => Action::Quit,
            Some(evt) = events.recv() => input::map_event(&evt, app.input_mode),
            Some(outcome) = outcomes.recv() => {
                app.handle_search_outcome(outcome);
                Action::None
            }
            _ = ticker.tick() => Action::Tick,
        };

        if app.update(action).await {
            break;
        }
    }
    Ok(())
}

/// Log to a file so output never lands on the alternate screen.
fn init_logging(
    path: Option<PathBuf>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(path) = path.or_else(default_log_path) else {
        return Ok(None);
    };
    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .context("log file path has no file name")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("claimdesk").join("claimdesk-tui.log"))
}
