use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::{DownloadResolver, HttpClient, RequestPolicy, SessionsFetcher};
use crate::cli::{Cli, Commands, DownloadTarget};
use crate::config::{Config, PortalConfig};
use crate::core::{SessionRow, detail_route};
use crate::navigate::{BrowserNavigator, FileNavigator, Navigator, PrintNavigator};
use crate::output::{
    LOADING_MESSAGE, SessionTableOptions, output_labels_json, output_labels_text,
    output_session_json, render_view,
};
use crate::signing::{CredentialsProvider, EnvCredentials, StaticCredentials};
use crate::view::{SessionsView, ViewState, WatchLoop};

/// CLI flags merged with the config file, plus what they resolve to
pub(crate) struct Settings {
    pub(crate) cli: Cli,
    pub(crate) portal: PortalConfig,
    pub(crate) policy: RequestPolicy,
}

impl Settings {
    pub(crate) fn resolve(raw: &Cli) -> Self {
        Self::from_config(raw, Config::load())
    }

    fn from_config(raw: &Cli, config: Config) -> Self {
        let cli = raw.clone().with_config(&config);
        let portal = cli.portal_config();
        let provider: Arc<dyn CredentialsProvider> = match config.credentials {
            Some(creds) => Arc::new(StaticCredentials(Some(creds))),
            None => Arc::new(EnvCredentials),
        };
        let policy = RequestPolicy::from_config(&portal, provider);
        Self {
            cli,
            portal,
            policy,
        }
    }

    fn client(&self) -> HttpClient {
        HttpClient::new(self.portal.timeout)
    }

    fn fetcher(&self) -> SessionsFetcher {
        SessionsFetcher::new(self.portal.clone(), self.client(), self.policy.clone())
    }

    fn resolver(&self) -> DownloadResolver {
        DownloadResolver::new(self.portal.clone(), self.client(), self.policy.clone())
    }

    fn table_options(&self) -> SessionTableOptions {
        SessionTableOptions {
            use_color: self.cli.use_color(),
        }
    }

    fn new_view(&self) -> SessionsView {
        SessionsView::new(self.portal.target_key(), self.portal.has_download_endpoint())
    }
}

/// Print the view for the current state; returns `false` when it failed
fn print_view(view: &SessionsView, settings: &Settings) -> bool {
    if settings.cli.json
        && let ViewState::Loaded(rows) = view.state()
    {
        println!("{}", output_session_json(view, rows));
        return true;
    }
    match render_view(view, settings.table_options()) {
        Ok(text) => {
            if !text.is_empty() {
                println!("{text}");
            }
            true
        }
        Err(text) => {
            eprintln!("{text}");
            false
        }
    }
}

fn handle_list(settings: &Settings) -> ExitCode {
    let fetcher = settings.fetcher();
    let mut view = settings.new_view();
    if !settings.cli.json {
        eprintln!("{LOADING_MESSAGE}");
    }
    view.load_with(|| fetcher.list_sessions());
    if print_view(&view, settings) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// One watch round against `settings`; `true` when a result was committed
fn watch_round(
    watch: &mut WatchLoop,
    view: &mut SessionsView,
    settings: &Settings,
    wait: Duration,
) -> bool {
    let fetcher = settings.fetcher();
    watch.round(
        view,
        settings.portal.target_key(),
        settings.portal.has_download_endpoint(),
        wait,
        move || fetcher.list_sessions(),
    )
}

/// Reload every `every`, re-reading the config file each round so that an
/// edited endpoint retargets the view.
fn handle_watch(raw: &Cli, every: Duration) -> ExitCode {
    let mut settings = Settings::resolve(raw);
    let mut view = settings.new_view();
    let mut watch = WatchLoop::new();

    loop {
        let started = Instant::now();
        if watch_round(&mut watch, &mut view, &settings, every) {
            print_view(&view, &settings);
        } else {
            tracing::warn!("load still pending after {}s", every.as_secs());
        }

        std::thread::sleep(every.saturating_sub(started.elapsed()));
        settings = Settings::resolve(raw);
    }
}

fn handle_open(settings: &Settings, session_id: &str) -> ExitCode {
    let route = detail_route(session_id);
    if settings.cli.json {
        let row = SessionRow::from_id(session_id);
        let obj = serde_json::json!({
            "sessionId": row.session_id,
            "dateLabel": row.date_label,
            "timeLabel": row.time_label,
            "route": route,
        });
        println!("{obj}");
    } else {
        println!("{route}");
    }
    ExitCode::SUCCESS
}

fn handle_download(settings: &Settings, session_id: &str, target: DownloadTarget) -> ExitCode {
    let resolver = settings.resolver();

    if settings.cli.json && target == DownloadTarget::Print {
        return match resolver.resolve(session_id) {
            Ok(link) => {
                println!(
                    "{}",
                    serde_json::json!({ "sessionId": session_id, "url": link.url })
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Download failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let stdout = std::io::stdout();
    let mut navigator: Box<dyn Navigator> = match target {
        DownloadTarget::Print => Box::new(PrintNavigator::new(stdout.lock())),
        DownloadTarget::Browser => Box::new(BrowserNavigator),
        DownloadTarget::File(path) => Box::new(FileNavigator::new(settings.client(), path)),
    };

    match resolver.download(session_id, navigator.as_mut()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Download failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn write_labels(out: &mut dyn Write, json: bool, session_ids: &[String]) -> std::io::Result<()> {
    if json {
        writeln!(out, "{}", output_labels_json(session_ids))?;
    } else {
        out.write_all(output_labels_text(session_ids).as_bytes())?;
    }
    out.flush()
}

fn handle_parse(settings: &Settings, session_ids: &[String]) -> ExitCode {
    let mut out = std::io::stdout().lock();
    match write_labels(&mut out, settings.cli.json, session_ids) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to write output: {e}");
            ExitCode::FAILURE
        }
    }
}

pub(crate) fn run(raw: &Cli) -> ExitCode {
    if let Some(secs) = raw.watch {
        return handle_watch(raw, Duration::from_secs(secs.max(1)));
    }

    let settings = Settings::resolve(raw);
    match settings.cli.command.clone() {
        None | Some(Commands::List) => handle_list(&settings),
        Some(Commands::Open { session_id }) => handle_open(&settings, &session_id),
        Some(Commands::Download {
            session_id,
            open,
            output,
        }) => handle_download(
            &settings,
            &session_id,
            DownloadTarget::from_flags(open, output),
        ),
        Some(Commands::Parse { session_ids }) => handle_parse(&settings, &session_ids),
    }
}
