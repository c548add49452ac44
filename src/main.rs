//! Command line access to the saved plan.
//!
//! Every command works on the snapshot in the configured storage directory
//! and writes it back immediately. Run `gvgplan --help` for the list.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;
    use gvgplan::config::PlannerConfig;

    let cli = cli::Cli::parse();
    let config = PlannerConfig::load_from_default_path().unwrap_or_default();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.preferences.log_level.name()),
    )
    .init();

    match cli::run(config, cli.command.unwrap_or_default()) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

// WASM doesn't use main(), the library exports the bindings
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use clap::{Parser, Subcommand};

    use gvgplan::background::is_image_file;
    use gvgplan::config::{ConfigError, LogLevel, PlannerConfig};
    use gvgplan::model::{
        AnnotationId, Color, NewParticipant, ParticipantClass, ParticipantId, ParticipantPatch,
        TeamId, TeamPatch,
    };
    use gvgplan::persist::FileStore;
    use gvgplan::{MapBackground, PlannerError, StateManager};

    #[derive(Parser, Debug)]
    #[command(
        name = "gvgplan",
        version,
        about = "Roster, team and map planning for guild-versus-guild events"
    )]
    pub struct Cli {
        #[command(subcommand)]
        pub command: Option<Command>,
    }

    #[derive(Subcommand, Debug, Default, PartialEq)]
    pub enum Command {
        /// Show teams, roster and map elements (default)
        #[default]
        Info,
        /// Write the plan as pretty JSON (default: gvg-plan-YYYY-MM-DD.json)
        Export { path: Option<PathBuf> },
        /// Replace the plan with an exported file
        Import { path: PathBuf },
        /// Set or clear the map background image
        Background {
            #[command(subcommand)]
            action: BackgroundAction,
        },
        /// Replace the strategy notes
        Notes { text: Vec<String> },
        /// Add, edit or remove roster entries
        Player {
            #[command(subcommand)]
            action: PlayerAction,
        },
        /// Rename or recolor a team
        Team {
            id: TeamId,
            #[arg(long)]
            name: Option<String>,
            /// Color as #rrggbb
            #[arg(long)]
            color: Option<Color>,
        },
        /// Edit or remove map elements
        Element {
            #[command(subcommand)]
            action: ElementAction,
        },
        /// Change preferences and save them to the config file
        Config {
            #[arg(long)]
            log_level: Option<LogLevel>,
            #[arg(long)]
            history_limit: Option<usize>,
            #[arg(long)]
            autosave_ms: Option<u64>,
            /// Directory for the saved plan; empty for the platform default
            #[arg(long)]
            storage_dir: Option<String>,
        },
        /// Start over from the default plan
        Reset,
    }

    #[derive(Subcommand, Debug, PartialEq)]
    pub enum BackgroundAction {
        /// Embed an image file as the background
        Set { image: PathBuf },
        /// Remove the background
        Clear,
    }

    #[derive(Subcommand, Debug, PartialEq)]
    pub enum PlayerAction {
        /// Add a player
        Add {
            name: String,
            #[arg(long, default_value = "DPS Misto")]
            class: ParticipantClass,
            #[arg(long)]
            team: Option<TeamId>,
            #[arg(long)]
            leader: bool,
            #[arg(long)]
            notes: Option<String>,
        },
        /// Change fields of a player
        Update {
            id: String,
            #[arg(long)]
            name: Option<String>,
            #[arg(long)]
            class: Option<ParticipantClass>,
            #[arg(long)]
            team: Option<TeamId>,
            /// Remove the player from their team
            #[arg(long, conflicts_with = "team")]
            unassign: bool,
            #[arg(long)]
            notes: Option<String>,
            #[arg(long)]
            leader: Option<bool>,
        },
        /// Remove a player and their tokens
        Remove { id: String },
    }

    #[derive(Subcommand, Debug, PartialEq)]
    pub enum ElementAction {
        /// Merge JSON fields into an element, e.g. '{"label": "Boss"}'
        Update { id: String, json: String },
        /// Remove one element
        Remove { id: String },
        /// Remove every element
        Clear,
    }

    #[derive(Debug, thiserror::Error)]
    pub enum CliError {
        #[error(transparent)]
        Planner(#[from] PlannerError),

        #[error(transparent)]
        Config(#[from] ConfigError),

        #[error("Invalid JSON argument: {0}")]
        Json(#[from] serde_json::Error),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),
    }

    type Result<T> = std::result::Result<T, CliError>;

    pub fn run(config: PlannerConfig, command: Command) -> Result<()> {
        if let Command::Config {
            log_level,
            history_limit,
            autosave_ms,
            storage_dir,
        } = command
        {
            return update_config(config, log_level, history_limit, autosave_ms, storage_dir);
        }

        let dir = config.storage_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?;
        let mut manager = StateManager::with_config(Box::new(FileStore::new(dir)), &config);

        match command {
            Command::Info => {
                print_info(&manager);
                return Ok(());
            }
            Command::Export { path } => {
                let path =
                    path.unwrap_or_else(|| PathBuf::from(StateManager::export_filename_today()));
                std::fs::write(&path, manager.export_json()?)?;
                println!("Exported plan to {}", path.display());
                return Ok(());
            }
            Command::Import { path } => {
                let json = std::fs::read_to_string(&path)?;
                manager.import_json(&json)?;
                println!("Imported plan from {}", path.display());
            }
            Command::Background { action } => {
                let background = match action {
                    BackgroundAction::Set { image } => Some(load_background(&image)?),
                    BackgroundAction::Clear => None,
                };
                manager.set_background(background)?;
            }
            Command::Notes { text } => {
                manager.set_strategy_notes(text.join(" "))?;
                println!("Strategy notes updated");
            }
            Command::Player { action } => run_player(&mut manager, action)?,
            Command::Team { id, name, color } => {
                manager.update_team(id, TeamPatch { name, color })?;
            }
            Command::Element { action } => match action {
                ElementAction::Update { id, json } => {
                    let patch: serde_json::Value = serde_json::from_str(&json)?;
                    manager.patch_annotation(&AnnotationId::from(id.as_str()), &patch)?;
                }
                ElementAction::Remove { id } => {
                    manager.remove_annotation(&AnnotationId::from(id.as_str()))?;
                }
                ElementAction::Clear => manager.clear_annotations()?,
            },
            Command::Reset => {
                manager.reset_all();
                println!("Plan reset to defaults");
            }
            Command::Config { .. } => return Ok(()),
        }

        manager.flush()?;
        print_info(&manager);
        Ok(())
    }

    fn run_player(manager: &mut StateManager, action: PlayerAction) -> Result<()> {
        match action {
            PlayerAction::Add {
                name,
                class,
                team,
                leader,
                notes,
            } => {
                let draft = NewParticipant {
                    name,
                    class,
                    team_id: team,
                    notes,
                    is_leader: leader.then_some(true),
                };
                let id = manager.add_participant(draft)?;
                println!("Added player {id}");
            }
            PlayerAction::Update {
                id,
                name,
                class,
                team,
                unassign,
                notes,
                leader,
            } => {
                let team_id = if unassign { Some(None) } else { team.map(Some) };
                let patch = ParticipantPatch {
                    name,
                    class,
                    team_id,
                    notes: notes.map(|n| Some(n).filter(|n| !n.is_empty())),
                    is_leader: leader,
                };
                manager.update_participant(&ParticipantId::from(id.as_str()), patch)?;
            }
            PlayerAction::Remove { id } => {
                manager.remove_participant(&ParticipantId::from(id.as_str()))?;
            }
        }
        Ok(())
    }

    fn update_config(
        mut config: PlannerConfig,
        log_level: Option<LogLevel>,
        history_limit: Option<usize>,
        autosave_ms: Option<u64>,
        storage_dir: Option<String>,
    ) -> Result<()> {
        let prefs = &mut config.preferences;
        if let Some(level) = log_level {
            prefs.log_level = level;
        }
        if let Some(limit) = history_limit {
            prefs.history_limit = limit;
        }
        if let Some(ms) = autosave_ms {
            prefs.autosave_debounce_ms = ms;
        }
        if let Some(dir) = storage_dir {
            prefs.storage_dir = dir;
        }
        config.save_to_default_path()?;
        println!("{}", config.to_json()?);
        Ok(())
    }

    fn load_background(path: &Path) -> Result<MapBackground> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_image_file(&name) {
            log::warn!("{} does not look like an image, trying anyway", name);
        }
        let bytes = std::fs::read(path)?;
        Ok(MapBackground::from_image_bytes(&name, &bytes)?)
    }

    fn print_info(manager: &StateManager) {
        let state = manager.state();
        match manager.last_saved() {
            Some(saved) => println!("Plan version {} (saved {})", state.version, saved),
            None => println!("Plan version {} (not saved yet)", state.version),
        }
        for team in &state.teams {
            println!("  [{}] {} {}", team.id, team.name, team.color);
            for p in state.team_members(team.id) {
                println!("      {} {} ({})", p.id, p.name, p.class.name());
            }
        }
        let unassigned: Vec<_> = state.unassigned().collect();
        if !unassigned.is_empty() {
            println!("  Unassigned:");
            for p in unassigned {
                println!("      {} {} ({})", p.id, p.name, p.class.name());
            }
        }
        println!("Players: {}", state.participants.len());
        println!("Map elements: {}", state.map.annotations.len());
        for ann in &state.map.annotations {
            println!(
                "  {} {} at ({:.0}, {:.0})",
                ann.id,
                ann.kind.tool().name(),
                ann.x,
                ann.y
            );
        }
        match &state.map.background_image {
            Some(bg) => println!("Background: {} ({}x{})", bg.name, bg.width, bg.height),
            None => println!("Background: none"),
        }
        if !state.strategy_notes.is_empty() {
            println!("Notes: {}", state.strategy_notes);
        }
    }

}
