//! Per-category API surfaces.
//!
//! Each handle borrows the client; every method validates its arguments
//! into a [`ParamBundle`] and then runs exactly one GraphQL operation (the
//! `list`/`all_*` helpers run one per page).

use crate::client::EsoLogsClient;
use crate::params::{
    NumericId, Param, ParamBundle, ValidationError, normalize_id, require_any, validate_group,
    validate_limit, validate_non_empty, validate_page,
};

mod character;
mod game_data;
mod guild;
mod progress_race;
mod report;
mod system;
mod user;
mod world_data;

pub use character::*;
pub use game_data::*;
pub use guild::*;
pub use progress_race::*;
pub use report::*;
pub use system::*;
pub use user::*;
pub use world_data::*;

/// Declare a GraphQL operation whose variables are a [`ParamBundle`].
///
/// The operation name is the type name and must match the query text.
macro_rules! operation {
    ($(#[$meta:meta])* $name:ident => $data:ty, $query:literal) => {
        $(#[$meta])*
        pub(crate) struct $name;

        impl esologs_graphql::GraphqlOperation for $name {
            type Variables = crate::params::ParamBundle;
            type ResponseData = $data;

            const QUERY: &'static str = $query;
            const OPERATION_NAME: &'static str = stringify!($name);
        }
    };
}

pub(crate) use operation;

impl EsoLogsClient {
    /// Abilities, classes, items, maps and NPCs.
    #[must_use]
    pub const fn game_data(&self) -> GameDataApi<'_> {
        GameDataApi::new(self)
    }

    /// Zones, encounters, expansions, regions and servers.
    #[must_use]
    pub const fn world_data(&self) -> WorldDataApi<'_> {
        WorldDataApi::new(self)
    }

    /// Characters and their rankings.
    #[must_use]
    pub const fn characters(&self) -> CharacterApi<'_> {
        CharacterApi::new(self)
    }

    /// Guilds, members and attendance.
    #[must_use]
    pub const fn guilds(&self) -> GuildApi<'_> {
        GuildApi::new(self)
    }

    /// Reports, events and report analysis.
    #[must_use]
    pub const fn reports(&self) -> ReportApi<'_> {
        ReportApi::new(self)
    }

    /// World-first progress race standings.
    #[must_use]
    pub const fn progress_race(&self) -> ProgressRaceApi<'_> {
        ProgressRaceApi::new(self)
    }

    /// User accounts.
    #[must_use]
    pub const fn users(&self) -> UserApi<'_> {
        UserApi::new(self)
    }

    /// API budget.
    #[must_use]
    pub const fn system(&self) -> SystemApi<'_> {
        SystemApi::new(self)
    }
}

/// A guild or character: by ID, or by name on a server.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityRef {
    /// Entity ID.
    pub id: Param<NumericId>,
    /// Entity name; needs `server_slug` and `server_region`.
    pub name: Param<String>,
    /// Server slug.
    pub server_slug: Param<String>,
    /// Server region slug, e.g. `"NA"` or `"EU"`.
    pub server_region: Param<String>,
}

impl EntityRef {
    /// Reference by ID.
    pub fn id(id: impl Into<NumericId>) -> Self {
        Self {
            id: Param::Value(id.into()),
            ..Self::default()
        }
    }

    /// Reference by name on a server.
    pub fn name(
        name: impl Into<String>,
        server_slug: impl Into<String>,
        server_region: impl Into<String>,
    ) -> Self {
        Self {
            name: Param::Value(name.into()),
            server_slug: Param::Value(server_slug.into()),
            server_region: Param::Value(server_region.into()),
            ..Self::default()
        }
    }

    /// Add `id`, `name`, `serverSlug` and `serverRegion`.
    pub(crate) fn apply(&self, bundle: &mut ParamBundle) -> Result<(), ValidationError> {
        bundle
            .set("id", self.id.try_map(|id| id.normalize("id"))?)
            .set("name", text_param(&self.name, "name")?)
            .set("serverSlug", text_param(&self.server_slug, "serverSlug")?)
            .set("serverRegion", text_param(&self.server_region, "serverRegion")?);
        validate_group(bundle, &["name", "serverSlug", "serverRegion"])?;
        require_any(bundle, &["id", "name"])
    }
}

/// Add `limit` and `page` for a paginated list.
pub(crate) fn apply_paging(
    bundle: &mut ParamBundle,
    limit: Option<i64>,
    page: Option<i64>,
) -> Result<(), ValidationError> {
    bundle
        .set("limit", Param::from_option(limit).try_map(validate_limit)?)
        .set("page", Param::from_option(page).try_map(validate_page)?);
    Ok(())
}

/// Bundle holding a single positive ID under `field`.
pub(crate) fn id_bundle(
    id: impl Into<NumericId>,
    field: &'static str,
) -> Result<ParamBundle, ValidationError> {
    let mut bundle = ParamBundle::new();
    bundle.insert(field, normalize_id(id, field)?);
    Ok(bundle)
}

/// Trimmed non-blank text, keeping `Unset` and `Null`.
pub(crate) fn text_param(
    value: &Param<String>,
    field: &'static str,
) -> Result<Param<String>, ValidationError> {
    value
        .clone()
        .try_map(|text| validate_non_empty(&text, field).map(str::to_string))
}

/// Optional ID under `field`.
pub(crate) fn id_param(
    value: Param<NumericId>,
    field: &'static str,
) -> Result<Param<i64>, ValidationError> {
    value.try_map(|id| id.normalize(field))
}

/// Optional list of IDs under `field`.
pub(crate) fn ids_param(
    value: &Param<Vec<i64>>,
    field: &'static str,
) -> Result<Param<Vec<i64>>, ValidationError> {
    value.clone().try_map(|ids| {
        ids.into_iter()
            .map(|id| normalize_id(id, field))
            .collect::<Result<Vec<_>, _>>()
    })
}
