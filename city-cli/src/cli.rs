use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use city_core::{
    CityEditPresenter, CityListener, CurrentCityManager, CurrentCityStore, EditOutcome,
    FilePreferences, PREFERENCE_NAME, prefs,
};
use clap::{Parser, Subcommand};
use inquire::Text;
use serde::Serialize;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-city", version, about = "Current city for the weather app")]
pub struct Cli {
    /// Directory holding the preferences file; defaults to the platform config dir.
    #[arg(long, global = true)]
    pub prefs_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current city.
    Show {
        /// Print as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },

    /// Change the current city.
    Set {
        /// City name, e.g. "Tokyo, Japan".
        city: String,
    },

    /// Type a new city interactively.
    Edit,

    /// Print where the current city is stored.
    Path,
}

#[derive(Debug, Serialize)]
struct CityOutput<'a> {
    city: &'a str,
}

/// Prints the city whenever the store reports a change.
struct PrintOnChange<M> {
    manager: Arc<M>,
}

impl<M: CurrentCityManager> CityListener for PrintOnChange<M> {
    fn on_city_changed(&self) {
        println!("Current city is now: {}", self.manager.city());
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let dir = resolve_dir(self.prefs_dir)?;

        match self.command {
            Command::Path => println!("{}", render_path(&dir)),
            Command::Show { json } => {
                let store = open_store(&dir)?;
                println!("{}", render_show(store.as_ref(), json)?);
            }
            Command::Set { city } => submit(&open_store(&dir)?, &city)?,
            Command::Edit => {
                let store = open_store(&dir)?;
                let current = store.city();
                let text = Text::new("City:")
                    .with_placeholder(&current)
                    .with_help_message("e.g. \"Tokyo, Japan\"; Esc to cancel")
                    .prompt()
                    .context("City input aborted")?;
                submit(&store, &text)?;
            }
        }

        Ok(())
    }
}

/// Explicit `--prefs-dir`, else the platform config directory.
fn resolve_dir(prefs_dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let dir = match prefs_dir {
        Some(dir) => dir,
        None => prefs::default_dir()?,
    };

    tracing::debug!(dir = %dir.display(), "using preferences directory");
    Ok(dir)
}

fn render_path(dir: &Path) -> String {
    FilePreferences::file_path(dir, PREFERENCE_NAME).display().to_string()
}

fn render_show(manager: &dyn CurrentCityManager, json: bool) -> anyhow::Result<String> {
    let city = manager.city();
    if !json {
        return Ok(city);
    }

    serde_json::to_string(&CityOutput { city: &city }).context("Failed to serialize city as JSON")
}

fn open_store(dir: &Path) -> anyhow::Result<Arc<CurrentCityStore<FilePreferences>>> {
    let prefs = FilePreferences::open(dir, PREFERENCE_NAME)
        .context("Failed to open current-city preferences")?;
    Ok(Arc::new(CurrentCityStore::new(prefs)))
}

fn submit(store: &Arc<CurrentCityStore<FilePreferences>>, text: &str) -> anyhow::Result<()> {
    let printer: Arc<dyn CityListener> = Arc::new(PrintOnChange { manager: store.clone() });
    store.add_listener(printer.clone());

    let outcome = CityEditPresenter::new(store.as_ref()).on_city_validated(text);
    store.remove_listener(&printer);
    tracing::debug!(?outcome, "city submitted");

    if let EditOutcome::Unchanged { city } = outcome? {
        println!("Current city is already: {city}");
    }

    Ok(())
}
