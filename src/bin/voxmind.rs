//! voxmind CLI: capture notes and browse them by scene.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use voxmind::capture::FileCapture;
use voxmind::classify::category_tone;
use voxmind::config::Config;
use voxmind::filter::{CalendarDay, CalendarView, calendar_strip, filter_memos};
use voxmind::gateway::GeminiGateway;
use voxmind::gateway::gemini::GeminiSettings;
use voxmind::model::{Memo, SceneMode};
use voxmind::notebook::Notebook;
use voxmind::storage::FileBackend;
use voxmind::store::MemoStore;
use voxmind::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "voxmind", about = "Capture thoughts at the speed of sound")]
struct Cli {
    /// Optional TOML config file (environment variables take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture a typed note
    Note {
        /// Note text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Scene to capture under (Idea, Meeting, Study, Personal, To-do)
        #[arg(long, default_value = "All")]
        mode: SceneMode,
    },
    /// Capture an audio recording
    Record {
        /// Audio file to submit
        file: PathBuf,
        /// Scene to capture under
        #[arg(long, default_value = "All")]
        mode: SceneMode,
    },
    /// List memos through a scene lens
    List {
        /// Scene lens; defaults to All, or To-do when --day is given
        #[arg(long)]
        mode: Option<SceneMode>,
        /// Show to-do items for a single day (YYYY-MM-DD) instead of the next 7 days
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Show a memo in detail
    Show {
        /// Memo ID (full or prefix)
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "voxmind".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let store = MemoStore::open(FileBackend::new(&config.data_dir))?;
    let palette = Palette::detect();

    let result = match cli.command {
        Command::Note { text, mode } => {
            let notebook = open_notebook(&config, store)?;
            let memo = notebook.submit_text(&text.join(" "), mode).await?;
            print_card(&memo, palette);
            Ok(())
        }
        Command::Record { file, mode } => {
            let notebook = open_notebook(&config, store)?;
            let mut device = FileCapture::new(&file);
            let memo = notebook.submit_audio(&mut device, mode).await?;
            print_card(&memo, palette);
            Ok(())
        }
        Command::List { mode, day } => {
            cmd_list(&store, mode, day, palette);
            Ok(())
        }
        Command::Show { id } => cmd_show(&store, &id, palette),
    };

    guard.force_flush();
    result
}

fn open_notebook(
    config: &Config,
    store: MemoStore<FileBackend>,
) -> anyhow::Result<Notebook<FileBackend>> {
    let gateway = GeminiGateway::new(GeminiSettings::from_config(config)?)?;
    Ok(Notebook::new(store, Arc::new(gateway)))
}

fn cmd_list(
    store: &MemoStore<FileBackend>,
    mode: Option<SceneMode>,
    day: Option<NaiveDate>,
    palette: Palette,
) {
    let mode = mode.unwrap_or(if day.is_some() {
        SceneMode::Todo
    } else {
        SceneMode::All
    });
    let calendar = day.map_or(CalendarView::SevenDay, CalendarView::Day);
    let now = Local::now();

    if mode == SceneMode::Todo {
        print_strip(&calendar_strip(store.list(), &now), calendar, palette);
    }

    let memos = filter_memos(store.list(), mode, calendar, &now);
    println!(
        "{}  [{}]",
        section_title(mode, calendar),
        count_badge(mode, memos.len())
    );
    println!("{}", "-".repeat(60));

    if memos.is_empty() {
        println!("{}", empty_message(mode, calendar));
        return;
    }
    for memo in memos {
        print_card(memo, palette);
    }
}

fn cmd_show(store: &MemoStore<FileBackend>, prefix: &str, palette: Palette) -> anyhow::Result<()> {
    let memo = store.find_by_prefix(prefix)?;
    let local = memo.timestamp.with_timezone(&Local);

    println!("ID:         {}", memo.id);
    println!("Captured:   {}", local.format("%Y-%m-%d %H:%M"));
    println!("Scene:      {}", memo.scene_mode);
    if let Some(ref audio) = memo.audio_url {
        println!("Audio:      {audio}");
    }

    let Some(ref analysis) = memo.analysis else {
        if memo.is_processing {
            println!("\nStill processing.");
        } else {
            println!("\nNo structured insight for this memo.");
        }
        println!("\nSource:\n  \"{}\"", memo.transcription);
        return Ok(());
    };

    println!("Tags:       {}", render_tags(&analysis.categories, palette));
    if let Some(due) = analysis.due_date.as_ref().filter(|_| analysis.is_todo()) {
        println!("Due:        {}", short_date(due));
    }
    println!("\n{}", analysis.title);
    println!("  {}", analysis.summary);

    if let Some(nodes) = analysis
        .mind_map_nodes
        .as_ref()
        .filter(|_| analysis.shows_mind_map())
    {
        println!("\nMind Map");
        for node in nodes {
            println!("  ◦ {}", node.label);
        }
    }

    println!("\nKey Highlights");
    for (idx, point) in analysis.key_points.iter().enumerate() {
        println!("  {}. {point}", idx + 1);
    }

    if !analysis.action_items.is_empty() {
        println!("\nChecklist");
        for item in &analysis.action_items {
            println!("  [ ] {item}");
        }
    }

    println!("\nSource:\n  \"{}\"", memo.transcription);
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct Palette {
    color: bool,
}

impl Palette {
    fn detect() -> Self {
        Self {
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn paint(self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

fn section_title(mode: SceneMode, calendar: CalendarView) -> String {
    match (mode, calendar) {
        (SceneMode::All, _) => "Recent Activities".to_string(),
        (SceneMode::Todo, CalendarView::SevenDay) => "Next 7 Days Tasks".to_string(),
        (SceneMode::Todo, CalendarView::Day(day)) => format!("{} Tasks", day.format("%b %-d")),
        (other, _) => format!("{other} Activities"),
    }
}

fn count_badge(mode: SceneMode, count: usize) -> String {
    match mode {
        SceneMode::All => format!("{count} TOTAL"),
        other => format!("{count} {}", other.as_str().to_uppercase()),
    }
}

fn empty_message(mode: SceneMode, calendar: CalendarView) -> String {
    match (mode, calendar) {
        (SceneMode::Todo, CalendarView::SevenDay) => {
            "No tasks scheduled for the next 7 days.".to_string()
        }
        (SceneMode::Todo, CalendarView::Day(day)) => {
            format!("No tasks scheduled for {}.", day.format("%A"))
        }
        (other, _) => format!("No {} recordings yet.", other.as_str().to_lowercase()),
    }
}

fn print_strip(days: &[CalendarDay], calendar: CalendarView, palette: Palette) {
    let cells: Vec<String> = days
        .iter()
        .map(|day| {
            let marker = match day.task_count {
                0 if day.is_today => "·",
                0 => " ",
                1 => "•",
                _ => "•+",
            };
            let cell = format!("{} {:>2}{marker}", day.date.format("%a"), day.date.format("%-d"));
            if calendar == CalendarView::Day(day.date) {
                palette.paint("7", &cell)
            } else {
                cell
            }
        })
        .collect();
    let label = if calendar == CalendarView::SevenDay {
        "Schedule (7-Day View)"
    } else {
        "Schedule"
    };
    println!("{label}\n  {}\n", cells.join("  "));
}

fn print_card(memo: &Memo, palette: Palette) {
    let time = memo.timestamp.with_timezone(&Local).format("%H:%M");
    let tags = if memo.is_processing {
        palette.paint("2", "THINKING...")
    } else {
        render_tags(&memo.display_categories(), palette)
    };
    let due = memo
        .analysis
        .as_ref()
        .filter(|a| a.is_todo())
        .and_then(|a| a.due_date.as_deref())
        .map(|due| format!("  due {}", short_date(due)))
        .unwrap_or_default();

    let (title, summary) = if memo.is_processing {
        (
            "Capturing Magic...",
            "Gemini is processing your thoughts into wisdom...",
        )
    } else {
        match &memo.analysis {
            Some(a) => (a.title.as_str(), a.summary.as_str()),
            None => ("Fragmented Thought", memo.transcription.as_str()),
        }
    };

    println!("{}  {tags}{due}  {time}", memo.id.short());
    println!("  {title}");
    if !summary.is_empty() {
        println!("  {}", truncate(summary, 140));
    }
    println!();
}

fn render_tags(categories: &[String], palette: Palette) -> String {
    categories
        .iter()
        .map(|cat| palette.paint(category_tone(cat).ansi(), &cat.to_uppercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn short_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_or_else(|_| raw.to_string(), |d| d.format("%b %-d").to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
