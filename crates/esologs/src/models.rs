//! ESO Logs API response types.
//!
//! Field names follow the GraphQL schema (camelCase on the wire). Aggregate
//! payloads the schema types as `JSON` (rankings, tables, graphs, event
//! data) stay as [`serde_json::Value`].

use std::fmt;
use std::marker::PhantomData;

use esologs_graphql::PaginatedResult;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Response Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// A JSON object with exactly one field, e.g. `{"gameData": {...}}`.
///
/// GraphQL responses nest the requested value under one key per selection
/// level; the key itself is fixed by the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root<T>(pub T);

impl<T> Root<T> {
    /// The wrapped value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Root<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RootVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for RootVisitor<T> {
            type Value = Root<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with a single field")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let Some((_, value)) = map.next_entry::<IgnoredAny, T>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };
                if map.next_key::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::custom("expected a single field"));
                }
                Ok(Root(value))
            }
        }

        deserializer.deserialize_map(RootVisitor(PhantomData))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Game Data
// ─────────────────────────────────────────────────────────────────────────────

/// An ability (skill, proc or set effect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAbility {
    /// Ability ID
    pub id: i64,
    /// Localized name
    #[serde(default)]
    pub name: Option<String>,
    /// Icon file name
    #[serde(default)]
    pub icon: Option<String>,
    /// Tooltip text
    #[serde(default)]
    pub description: Option<String>,
}

/// A player class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClass {
    /// Class ID
    pub id: i64,
    /// Localized name
    pub name: String,
    /// URL slug
    pub slug: String,
}

/// A faction (alliance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFaction {
    /// Faction ID
    pub id: i64,
    /// Localized name
    pub name: String,
}

/// An item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameItem {
    /// Item ID
    pub id: i64,
    /// Localized name
    #[serde(default)]
    pub name: Option<String>,
    /// Icon file name
    #[serde(default)]
    pub icon: Option<String>,
}

/// An item set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameItemSet {
    /// Set ID
    pub id: i64,
    /// Localized name
    #[serde(default)]
    pub name: Option<String>,
}

/// A map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMap {
    /// Map ID
    pub id: i64,
    /// Localized name
    #[serde(default)]
    pub name: Option<String>,
}

/// A non-player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameNpc {
    /// NPC ID
    pub id: i64,
    /// Localized name
    #[serde(default)]
    pub name: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// World Data
// ─────────────────────────────────────────────────────────────────────────────

/// Minimal reference to a named entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Entity ID
    pub id: i64,
    /// Name
    pub name: String,
}

/// A zone (trial, dungeon group or arena).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Zone ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Whether rankings for this zone are frozen
    #[serde(default)]
    pub frozen: bool,
    /// Expansion the zone belongs to
    #[serde(default)]
    pub expansion: Option<NamedRef>,
    /// Difficulties available in the zone
    #[serde(default)]
    pub difficulties: Vec<Difficulty>,
    /// Encounters in the zone
    #[serde(default)]
    pub encounters: Vec<NamedRef>,
    /// Bracket definition, when the zone is bracketed
    #[serde(default)]
    pub brackets: Option<Bracket>,
}

/// A zone difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Difficulty ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Group sizes
    #[serde(default)]
    pub sizes: Vec<i64>,
}

/// Ranking bracket range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Lowest bracket
    pub min: f64,
    /// Highest bracket
    pub max: f64,
    /// Bracket step
    pub bucket: f64,
    /// Bracket kind, e.g. "Item Level"
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// An encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    /// Encounter ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Zone the encounter belongs to
    #[serde(default)]
    pub zone: Option<NamedRef>,
}

/// An expansion (chapter or DLC cycle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    /// Expansion ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Zones introduced by the expansion
    #[serde(default)]
    pub zones: Vec<NamedRef>,
}

/// A server region (megaserver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Region ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Short name, e.g. "NA"
    #[serde(default)]
    pub compact_name: Option<String>,
    /// URL slug
    pub slug: String,
}

/// A server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Server ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Name normalized for URLs
    #[serde(default)]
    pub normalized_name: Option<String>,
    /// URL slug
    pub slug: String,
    /// Region the server belongs to
    #[serde(default)]
    pub region: Option<Region>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Characters and Guilds
// ─────────────────────────────────────────────────────────────────────────────

/// A player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Character ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Class ID
    #[serde(default, rename = "classID")]
    pub class_id: Option<i64>,
    /// Race ID
    #[serde(default, rename = "raceID")]
    pub race_id: Option<i64>,
    /// Whether the character is hidden from public view
    #[serde(default)]
    pub hidden: bool,
    /// Home server
    #[serde(default)]
    pub server: Option<Server>,
}

/// A guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guild {
    /// Guild ID
    pub id: i64,
    /// Name
    pub name: String,
    /// Guild description
    #[serde(default)]
    pub description: Option<String>,
    /// Faction
    #[serde(default)]
    pub faction: Option<GameFaction>,
    /// Home server
    #[serde(default)]
    pub server: Option<Server>,
    /// Raid team tags
    #[serde(default)]
    pub tags: Vec<NamedRef>,
}

/// One report's attendance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildAttendance {
    /// Report code
    pub code: String,
    /// Report start, in milliseconds
    pub start_time: f64,
    /// Players and their presence
    #[serde(default)]
    pub players: Vec<PlayerAttendance>,
    /// Zone of the report
    #[serde(default)]
    pub zone: Option<NamedRef>,
}

/// A player's presence in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAttendance {
    /// Character name
    pub name: String,
    /// Class name
    #[serde(default, rename = "type")]
    pub class: Option<String>,
    /// 1 present, 2 on bench, 0 absent
    pub presence: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

/// A combat log report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report code
    pub code: String,
    /// Title
    pub title: String,
    /// Start, in milliseconds since the Unix epoch
    pub start_time: f64,
    /// End, in milliseconds since the Unix epoch
    pub end_time: f64,
    /// Uploader
    #[serde(default)]
    pub owner: Option<NamedRef>,
    /// Guild the report belongs to
    #[serde(default)]
    pub guild: Option<NamedRef>,
    /// Primary zone
    #[serde(default)]
    pub zone: Option<NamedRef>,
    /// Fights; only present when requested
    #[serde(default)]
    pub fights: Vec<ReportFight>,
}

/// A fight within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFight {
    /// Fight ID, unique within the report
    pub id: i64,
    /// Encounter name or trash label
    pub name: String,
    /// Start, relative to the report start, in milliseconds
    pub start_time: f64,
    /// End, relative to the report start, in milliseconds
    pub end_time: f64,
    /// Encounter ID, 0 for trash
    #[serde(default, rename = "encounterID")]
    pub encounter_id: i64,
    /// Difficulty ID
    #[serde(default)]
    pub difficulty: Option<i64>,
    /// Whether the boss died
    #[serde(default)]
    pub kill: Option<bool>,
    /// Remaining boss health in percent, for wipes
    #[serde(default)]
    pub boss_percentage: Option<f64>,
}

/// One page of report events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEventPage {
    /// Raw events
    #[serde(default)]
    pub data: Vec<Value>,
    /// Where the next page starts, absent on the last page
    #[serde(default)]
    pub next_page_timestamp: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Users and System
// ─────────────────────────────────────────────────────────────────────────────

/// An ESO Logs user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Guilds the user belongs to; only visible to the user
    #[serde(default)]
    pub guilds: Vec<NamedRef>,
    /// Claimed characters; only visible to the user
    #[serde(default)]
    pub characters: Vec<NamedRef>,
}

/// API point budget for the current credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitData {
    /// Points available per hour
    pub limit_per_hour: i64,
    /// Points spent in the current hour
    pub points_spent_this_hour: f64,
    /// Seconds until the budget resets
    pub points_reset_in: i64,
}

/// Page of reports.
pub type ReportPage = PaginatedResult<Report>;
/// Page of characters.
pub type CharacterPage = PaginatedResult<Character>;
/// Page of guilds.
pub type GuildPage = PaginatedResult<Guild>;
/// Page of attendance sheets.
pub type AttendancePage = PaginatedResult<GuildAttendance>;
