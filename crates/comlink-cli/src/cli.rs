//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use comlink_client::{ComlinkSettings, LeaderboardId, Payload, RequestBody};

/// Query a comlink gateway from the command line.
#[derive(Debug, Parser)]
#[command(name = "comlink", version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Gateway base URL
    #[arg(long, global = true, env = "COMLINK_URL", default_value = "http://localhost:3000")]
    pub url: String,

    /// HMAC access key
    #[arg(long, global = true, env = "COMLINK_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// HMAC secret key
    #[arg(long, global = true, env = "COMLINK_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Attempts per request, the first one included
    #[arg(long, global = true, default_value_t = 5)]
    pub attempts: u32,

    /// Per-attempt timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Write the response to this file instead of stdout
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Ask the gateway to replace enum values with names.
    /// Rejected for `enums` and `raw`, which build no request body
    #[arg(long, global = true)]
    pub enums: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn settings(&self) -> ComlinkSettings {
        let mut builder = ComlinkSettings::builder()
            .base_url(&self.url)
            .max_attempts(self.attempts)
            .request_timeout(Duration::from_secs(self.timeout));
        if let Some(key) = &self.access_key {
            builder = builder.access_key(key);
        }
        if let Some(key) = &self.secret_key {
            builder = builder.secret_key(key);
        }
        builder.build()
    }
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Game enumerations (unsigned GET)
    Enums,

    /// Current game data and localization versions
    Metadata,

    /// Game data collections for one version
    GameData {
        /// Game data version from `metadata`
        #[arg(long)]
        data_version: String,
        #[arg(long)]
        include_pve_units: bool,
        #[arg(long, default_value_t = 0)]
        request_segment: i32,
        /// Comma-separated collection selector
        #[arg(long)]
        items: Option<String>,
    },

    /// Localization bundle
    Localization {
        /// Localization bundle id from `metadata`
        #[arg(long)]
        id: String,
        /// Return the bundle unzipped
        #[arg(long)]
        unzip: bool,
    },

    /// Scheduled game events
    Events,

    /// A player profile
    Player(PlayerArgs),

    /// A player's arena profile
    PlayerArena {
        #[command(flatten)]
        player: PlayerArgs,
        /// Omit roster details
        #[arg(long)]
        details_only: bool,
    },

    /// A single guild
    Guild {
        /// Guild id
        #[arg(long)]
        id: String,
        #[arg(long)]
        recent_activity: bool,
    },

    /// Search guilds by name
    Guilds {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 10)]
        count: i32,
        #[arg(long, default_value_t = 0)]
        start_index: i32,
    },

    /// Guild leaderboard
    GuildLeaderboard {
        #[arg(long)]
        leaderboard_type: i32,
        #[arg(long, default_value_t = 0)]
        month_offset: i32,
        #[arg(long, default_value_t = 25)]
        count: i32,
    },

    /// Player leaderboard
    Leaderboard {
        #[arg(long)]
        leaderboard_type: i32,
        #[arg(long)]
        event_instance_id: Option<String>,
        #[arg(long)]
        group_id: Option<String>,
        #[arg(long, default_value_t = 0)]
        league: i32,
        #[arg(long, default_value_t = 0)]
        division: i32,
    },

    /// POST a request body read from a JSON file (`-` for stdin)
    Raw {
        /// Endpoint path, e.g. /player
        endpoint: String,
        #[arg(value_hint = ValueHint::FilePath)]
        body: Option<PathBuf>,
    },
}

/// Identifies one player.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct PlayerArgs {
    /// Nine digit ally code
    #[arg(long)]
    pub ally_code: Option<String>,
    /// Player id
    #[arg(long)]
    pub player_id: Option<String>,
}

impl PlayerArgs {
    fn apply(&self, payload: &mut Payload) {
        payload.ally_code = self.ally_code.clone().unwrap_or_default();
        payload.player_id = self.player_id.clone().unwrap_or_default();
    }
}

impl Command {
    /// Request body for this command. `enums` and `raw` build none.
    pub fn request_body(&self, enums: bool) -> Option<RequestBody> {
        let mut payload = Payload::default();
        let mut unzip_body = false;

        match self {
            Command::Enums | Command::Raw { .. } => return None,
            Command::Metadata | Command::Events => {}
            Command::GameData {
                data_version,
                include_pve_units,
                request_segment,
                items,
            } => {
                payload.version = data_version.clone();
                payload.include_pve_units = *include_pve_units;
                payload.request_segment = *request_segment;
                payload.items = items.clone().unwrap_or_default();
            }
            Command::Localization { id, unzip } => {
                payload.id = id.clone();
                unzip_body = *unzip;
            }
            Command::Player(player) => player.apply(&mut payload),
            Command::PlayerArena {
                player,
                details_only,
            } => {
                player.apply(&mut payload);
                payload.player_details_only = *details_only;
            }
            Command::Guild {
                id,
                recent_activity,
            } => {
                payload.guild_id = id.clone();
                payload.include_recent_guild_activity_info = *recent_activity;
            }
            Command::Guilds {
                name,
                count,
                start_index,
            } => {
                payload.name = name.clone();
                // 4: search by name
                payload.filter_type = 4;
                payload.count = *count;
                payload.start_index = *start_index;
            }
            Command::GuildLeaderboard {
                leaderboard_type,
                month_offset,
                count,
            } => {
                payload.leaderboard_id = LeaderboardId {
                    leaderboard_type: *leaderboard_type,
                    month_offset: *month_offset,
                };
                payload.count = *count;
            }
            Command::Leaderboard {
                leaderboard_type,
                event_instance_id,
                group_id,
                league,
                division,
            } => {
                payload.leaderboard_type = *leaderboard_type;
                payload.event_instance_id = event_instance_id.clone().unwrap_or_default();
                payload.group_id = group_id.clone().unwrap_or_default();
                payload.league = *league;
                payload.division = *division;
            }
        }

        Some(RequestBody {
            payload,
            enums,
            unzip: unzip_body,
        })
    }
}
