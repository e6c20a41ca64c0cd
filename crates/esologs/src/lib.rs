//! ESO Logs - typed async client for the ESO Logs v2 GraphQL API
//!
//! This crate provides:
//!
//! - **Client**: app mode (client credentials) or user mode (authorization
//!   code), sharing one token cache across clones
//! - **API handles**: game data, world data, characters, guilds, reports,
//!   progress race, users and rate limit data
//! - **Parameter validation**: every argument is checked and normalized
//!   before a request is sent
//! - **Logging**: `tracing` subscriber setup with secret redaction
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use esologs::{EsoLogsClient, ReportSearch};
//!
//! let client = EsoLogsClient::from_env()?;
//!
//! let zones = client.world_data().zones(Default::default()).await?;
//! let reports = client
//!     .reports()
//!     .list(&ReportSearch::new().guild("Tamriel Rejects", "pc-na", "NA"), Some(100))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod api;
mod client;
mod config;
mod error;
pub mod logging;
pub mod models;
pub mod params;

pub use api::{
    AnalysisQuery, AttendanceQuery, CharacterApi, EncounterRankingQuery, EntityRef, EventsQuery,
    GameDataApi, GraphQuery, GuildApi, GuildListQuery, PlayerDetailsQuery, ProgressRaceApi,
    ProgressRaceQuery, RankingFilters, RankingsQuery, ReportApi, ReportSearch, SystemApi,
    TableQuery, UserApi, WorldDataApi, ZoneRankingQuery,
};
pub use client::{AuthMode, EsoLogsClient, EsoLogsClientBuilder};
pub use config::{
    ClientConfig, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REDIRECT_URI, ENV_TIMEOUT_SECS,
};
pub use error::{ErrorKind, EsoLogsError, EsoLogsResult};
pub use params::{NumericId, Param, ParamBundle, Timestamp, ValidationError};

pub use esologs_graphql::{GraphqlClientError, PageLimit, PaginatedResult};
pub use esologs_oauth::{
    FileTokenStore, MemoryTokenStore, OAuthError, ProviderEndpoints, Token, TokenState,
    TokenStore,
};
