//! pwrlvl CLI - headless operator console

use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;

use pwrlvl_console::{
    Activity, Console, ConsoleConfig, ConsoleError, EventLevel, EventRecord, StatusSnapshot, View,
};

#[derive(Parser)]
#[command(name = "pwrlvl")]
#[command(about = "PWRLVL9000 operator console client")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides PWRLVL_URL)
    #[arg(short, long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot status snapshot
    Status,
    /// One-shot XP / level readout
    Xp,
    /// Run the live console: status poller + event stream until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ConsoleConfig::from_env();
    if let Some(url) = cli.url {
        config = config.with_base_url(url);
    }

    let result = match cli.command {
        Commands::Status => show_status(config).await,
        Commands::Xp => show_xp(config).await,
        Commands::Watch => watch(config).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn show_status(config: ConsoleConfig) -> Result<(), ConsoleError> {
    let console = Console::new(config);
    let Some(status) = console.api().fetch_status().await else {
        return Err(ConsoleError::Stream(format!(
            "backend unreachable at {}",
            console.config().base_url
        )));
    };

    println!("{}", "// STATUS".green().bold());
    print_flag("wifi scanning", status.wifi_scanning);
    print_flag("wifi attacking", status.wifi_attacking);
    print_flag("web scanning", status.web_scanning);
    print_flag("net scanning", status.net_scanning);
    print_flag("capturing", status.capturing);
    if let Some(bssid) = &status.attack_bssid {
        println!(
            "  target:      {} on {}",
            bssid.red().bold(),
            status.attack_iface.as_deref().unwrap_or("?")
        );
    }
    if !status.interfaces.is_empty() {
        println!("  interfaces:  {}", status.interfaces.join(", ").cyan());
    }
    println!("{}", headline(&status).bold());
    Ok(())
}

fn print_flag(label: &str, on: bool) {
    let state = if on {
        "RUNNING".yellow().bold()
    } else {
        "idle".dimmed()
    };
    println!("  {label:<12} {state}");
}

async fn show_xp(config: ConsoleConfig) -> Result<(), ConsoleError> {
    let console = Console::new(config);
    let Some(status) = console.api().fetch_status().await else {
        return Err(ConsoleError::Stream(format!(
            "backend unreachable at {}",
            console.config().base_url
        )));
    };
    let tracker = console.tracker();
    tracker.observe_snapshot(&status);
    let state = tracker.state();

    println!(
        "{} {}",
        format!("LVL {}", state.level).green().bold(),
        state.title.cyan().bold()
    );
    println!("  {}  {}", xp_bar(state.percent(), 24), tracker.readout());
    Ok(())
}

fn xp_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Headline line for the console shell: ATTACKING / SCANNING / STANDBY.
fn headline(status: &StatusSnapshot) -> colored::ColoredString {
    match Activity::derive(status) {
        Activity::Attacking => "ATTACKING".red(),
        Activity::Casting => "SCANNING".yellow(),
        Activity::Idle => "STANDBY".green(),
    }
}

/// The watch command's stand-in for the visual shell: prints headline and
/// target transitions as status snapshots arrive.
struct HeadlineView {
    last: Option<String>,
}

impl View for HeadlineView {
    fn on_activate(&mut self) -> Result<(), ConsoleError> {
        println!("{}", "// WATCHING — Ctrl-C to quit".dimmed());
        Ok(())
    }

    fn on_status(&mut self, status: &StatusSnapshot) -> Result<(), ConsoleError> {
        let mut line = headline(status).bold().to_string();
        if let Some(bssid) = &status.attack_bssid {
            if status.wifi_attacking {
                line = format!("{line} → {}", bssid.red());
            }
        } else if let Some(iface) = &status.scan_iface {
            if status.wifi_scanning {
                line = format!("{line} on {}", iface.yellow());
            }
        }
        if self.last.as_deref() != Some(&line) {
            println!("{line}");
            self.last = Some(line);
        }
        Ok(())
    }
}

async fn watch(config: ConsoleConfig) -> Result<(), ConsoleError> {
    let console = Console::new(config);
    console.open_view("headline", Box::new(HeadlineView { last: None }));

    let poller = console.spawn_status_poller();
    let stream = console.spawn_event_stream();

    let log = console.log();
    let tracker = console.tracker();
    let mut cursor = 0u64;
    let mut print_tick = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = print_tick.tick() => {
                for record in log.since(cursor) {
                    println!("{}", format_event(&record));
                }
                cursor = log.total_appended();
                if let Some(level) = tracker.take_level_up() {
                    let state = tracker.state();
                    println!(
                        "{}",
                        format!("★ LEVEL UP! → LVL {level} {} ★", state.title)
                            .yellow()
                            .bold()
                    );
                }
            }
        }
    }

    // Teardown: the stream connection is closed exactly once; the poller
    // handle is dropped with the console.
    stream.shutdown();
    stream.join().await;
    poller.cancel();
    println!("{}", "bye".dimmed());
    Ok(())
}

fn format_event(record: &EventRecord) -> String {
    let time = chrono::DateTime::from_timestamp(record.ts as i64, 0)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "--:--:--".to_string());
    let level = record.level.to_string();
    let tag = match record.level {
        EventLevel::Info => level.normal(),
        EventLevel::Warn => level.yellow(),
        EventLevel::Error => level.red(),
        EventLevel::Attack => level.red().bold(),
        EventLevel::Crack => level.magenta().bold(),
        EventLevel::Scan => level.green(),
        EventLevel::Webscan => level.cyan(),
        EventLevel::Netscan => level.blue(),
        EventLevel::Shell => level.white(),
        EventLevel::Xp => level.bright_yellow(),
    };
    format!("[{}] [{}] {}", time.dimmed(), tag, record.msg)
}
