//! Per-endpoint wrappers over [`ComlinkClient::post`].

use comlink_common_http::{BufferedResponse, Transport};

use crate::client::{ComlinkClient, JsonObject};
use crate::error::ComlinkError;
use crate::payload::RequestBody;

/// Gateway endpoint paths.
pub mod paths {
    pub const ENUMS: &str = "/enums";
    pub const DATA: &str = "/data";
    pub const METADATA: &str = "/metadata";
    pub const LOCALIZATION: &str = "/localization";
    pub const GET_EVENTS: &str = "/GetEvents";
    pub const GUILD: &str = "/Guild";
    pub const GET_GUILD_LEADERBOARD: &str = "/getGuildLeaderboard";
    pub const GET_GUILDS: &str = "/getGuilds";
    pub const GET_LEADERBOARD: &str = "/getLeaderboard";
    pub const PLAYER: &str = "/player";
    pub const PLAYER_ARENA: &str = "/playerArena";
}

macro_rules! post_endpoints {
    ($($(#[$meta:meta])* $name:ident, $raw:ident => $path:expr;)*) => {
        impl<T: Transport> ComlinkClient<T> {
            $(
                $(#[$meta])*
                pub async fn $name(&self, body: &RequestBody) -> Result<JsonObject, ComlinkError> {
                    self.post($path, body).await
                }

                #[doc = concat!("Like [`Self::", stringify!($name), "`], without interpreting the response.")]
                pub async fn $raw(&self, body: &RequestBody) -> Result<BufferedResponse, ComlinkError> {
                    self.post_raw($path, body).await
                }
            )*
        }
    };
}

post_endpoints! {
    /// Game data collections for a given `version`.
    game_data, game_data_raw => paths::DATA;
    /// Current game and localization versions.
    metadata, metadata_raw => paths::METADATA;
    /// Localization bundle for the payload's `id`.
    localization, localization_raw => paths::LOCALIZATION;
    /// Scheduled game events.
    get_events, get_events_raw => paths::GET_EVENTS;
    /// One guild by `guildId`.
    guild, guild_raw => paths::GUILD;
    get_guild_leaderboard, get_guild_leaderboard_raw => paths::GET_GUILD_LEADERBOARD;
    /// Guild search, by name or by `searchCriteria`.
    get_guilds, get_guilds_raw => paths::GET_GUILDS;
    get_leaderboard, get_leaderboard_raw => paths::GET_LEADERBOARD;
    /// One player by `allyCode` or `playerId`.
    player, player_raw => paths::PLAYER;
    player_arena, player_arena_raw => paths::PLAYER_ARENA;
}

impl<T: Transport> ComlinkClient<T> {
    /// Game enumerations. The only GET endpoint, and never signed.
    pub async fn enums(&self) -> Result<JsonObject, ComlinkError> {
        self.get(paths::ENUMS).await
    }

    pub async fn enums_raw(&self) -> Result<BufferedResponse, ComlinkError> {
        self.get_raw(paths::ENUMS).await
    }
}
