use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use spa_nav::core::config::{self, CliOverrides, SpaNavConfig};
use spa_nav::core::{ClickEventKind, SettingsOverrides};
use spa_nav::tui;
use std::fs::File;

#[derive(Parser)]
#[command(name = "spa-nav", about = "Browse a site the way a single-page app navigates it")]
struct Args {
    /// Page to start at
    url: Option<String>,

    /// Which links are handled in place (e.g. "a[data-spa]")
    #[arg(long)]
    selector: Option<String>,

    /// Pointer event that activates links
    #[arg(long, value_enum)]
    click_event: Option<ClickEventKind>,

    /// Never intercept links
    #[arg(long)]
    no_listen_links: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            start_url: self.url.clone(),
            navigation: SettingsOverrides {
                listen_links: self.no_listen_links.then_some(false),
                links_selector: self.selector.clone(),
                click_event: self.click_event,
            },
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to spa-nav.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("spa-nav.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}; using defaults", e);
        SpaNavConfig::default()
    });
    let resolved = config::resolve(&file_config, &args.overrides());

    log::info!(
        "spa-nav starting at {} (selector '{}')",
        resolved.start_url,
        resolved.settings.links_selector
    );

    tui::run(resolved)
}
