use api_types::trip::{MeetingSlot, TravelerType, TripId};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/travelmate.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub username: String,
    pub session_path: String,
    pub log_level: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001".to_string(),
            username: String::new(),
            session_path: "config/travelmate_session.json".to_string(),
            log_level: "info".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "travelmate", about = "Plan and manage your trips from the terminal")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8001).
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long, global = true)]
    username: Option<String>,
    /// Override where the session tokens are stored.
    #[arg(long, global = true)]
    session: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account; the password comes from TRAVELMATE_PASSWORD or stdin.
    Signup,
    /// Sign in; the password comes from TRAVELMATE_PASSWORD or stdin.
    Login,
    /// Forget the stored session.
    Logout,
    /// Show who is signed in.
    Whoami,
    /// List your trips.
    List {
        /// Only trips whose destination or dates contain this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a trip.
    Create(TripArgs),
    /// Edit a trip; omitted fields keep their current value.
    Edit {
        id: TripId,
        #[command(flatten)]
        fields: TripArgs,
    },
    /// Delete a trip.
    Delete {
        id: TripId,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Show a trip with weather, cultural insights, tips and packing list.
    Show { id: TripId },
    /// Add an activity to a trip's itinerary and show the updated trip.
    AddActivity {
        id: TripId,
        #[command(flatten)]
        activity: ActivityArgs,
    },
    /// Manage the packing list of a trip.
    Packing {
        id: TripId,
        #[command(subcommand)]
        action: PackingAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum PackingAction {
    /// Replace the list with one suggested for the trip's activities.
    Generate,
    /// Add a custom item.
    Add { name: String },
    /// Remove an item by id.
    Remove { item_id: String },
}

#[derive(Debug, Default, Args)]
pub struct ActivityArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Day of the activity, YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long, default_value = "")]
    pub location: String,
    /// Something to pack for it; repeat for several.
    #[arg(long = "packing")]
    pub packing_requirements: Vec<String>,
    /// Weather to keep in mind; repeat for several.
    #[arg(long = "weather")]
    pub weather_considerations: Vec<String>,
}

#[derive(Debug, Default, Args)]
pub struct TripArgs {
    #[arg(long)]
    pub destination: Option<String>,
    /// Latitude of the selected place.
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    /// Longitude of the selected place.
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,
    /// First day, YYYY-MM-DD.
    #[arg(long)]
    pub start: Option<String>,
    /// Last day, YYYY-MM-DD.
    #[arg(long)]
    pub end: Option<String>,
    /// Activity identifier; repeat for several.
    #[arg(long = "activity")]
    pub activities: Vec<String>,
    /// casual or business.
    #[arg(long)]
    pub traveler: Option<TravelerType>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub style: Option<String>,
    /// Business meeting as "TIME|LOCATION|DESCRIPTION"; repeat for several.
    #[arg(long = "meeting", value_parser = parse_meeting)]
    pub meetings: Vec<MeetingSlot>,
}

fn parse_meeting(raw: &str) -> std::result::Result<MeetingSlot, String> {
    let mut parts = raw.splitn(3, '|').map(str::trim);
    let time = parts.next().unwrap_or_default();
    if time.is_empty() {
        return Err("meeting time must not be empty".to_string());
    }
    Ok(MeetingSlot {
        time: time.to_string(),
        location: parts.next().unwrap_or_default().to_string(),
        description: parts.next().unwrap_or_default().to_string(),
    })
}

pub fn load() -> Result<(AppConfig, Command)> {
    let args = Cli::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("TRAVELMATE"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(session) = args.session {
        settings.session_path = session;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }

    Ok((settings, args.command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_splits_on_pipes() {
        let slot = parse_meeting("09:00 | HQ | Kickoff | bring slides").unwrap();
        assert_eq!(slot.time, "09:00");
        assert_eq!(slot.location, "HQ");
        assert_eq!(slot.description, "Kickoff | bring slides");

        let bare = parse_meeting("14:30").unwrap();
        assert_eq!(bare.location, "");
        assert!(parse_meeting(" |Lobby").is_err());
    }

    #[test]
    fn trip_flags_parse() {
        let cli = Cli::try_parse_from([
            "travelmate",
            "--base-url",
            "http://example.test",
            "edit",
            "7",
            "--lat",
            "-33.86",
            "--lng",
            "151.2",
            "--activity",
            "beach",
            "--activity",
            "dining",
            "--traveler",
            "business",
            "--meeting",
            "10:00|Office|Review",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://example.test"));
        let Command::Edit { id, fields } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(id, TripId(7));
        assert_eq!(fields.lat, Some(-33.86));
        assert_eq!(fields.activities, vec!["beach", "dining"]);
        assert_eq!(fields.traveler, Some(TravelerType::Business));
        assert_eq!(fields.meetings.len(), 1);
    }

    #[test]
    fn add_activity_parses() {
        let cli = Cli::try_parse_from([
            "travelmate",
            "add-activity",
            "5",
            "--name",
            "Surf lesson",
            "--date",
            "2024-07-02",
            "--packing",
            "Wetsuit",
            "--packing",
            "Towel",
        ])
        .unwrap();

        let Command::AddActivity { id, activity } = cli.command else {
            panic!("expected add-activity");
        };
        assert_eq!(id, TripId(5));
        assert_eq!(activity.name, "Surf lesson");
        assert_eq!(activity.date.as_deref(), Some("2024-07-02"));
        assert_eq!(activity.packing_requirements, vec!["Wetsuit", "Towel"]);
        assert!(activity.weather_considerations.is_empty());
        assert_eq!(activity.location, "");
    }

    #[test]
    fn signup_parses() {
        let cli = Cli::try_parse_from(["travelmate", "--username", "bob", "signup"]).unwrap();
        assert!(matches!(cli.command, Command::Signup));
        assert_eq!(cli.username.as_deref(), Some("bob"));
    }

    #[test]
    fn packing_actions_parse() {
        let cli = Cli::try_parse_from(["travelmate", "packing", "3", "add", "Sunscreen"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Packing {
                id: TripId(3),
                action: PackingAction::Add { ref name },
            } if name == "Sunscreen"
        ));
    }
}
