//! World-first progress race standings.

use serde_json::Value;
use tracing::instrument;

use super::{id_param, operation, text_param};
use crate::client::EsoLogsClient;
use crate::error::EsoLogsResult;
use crate::models::Root;
use crate::params::{NumericId, Param, ParamBundle, ValidationError, validate_group, validate_range};

operation! {
    GetProgressRace => Root<Root<Option<Value>>>,
    "query GetProgressRace($competitionID: Int, $difficulty: Int, $guildID: Int, $guildName: String, $serverSlug: String, $serverRegion: String, $serverSubregion: String, $size: Int, $zoneID: Int) { progressRaceData { progressRace(competitionID: $competitionID, difficulty: $difficulty, guildID: $guildID, guildName: $guildName, serverSlug: $serverSlug, serverRegion: $serverRegion, serverSubregion: $serverSubregion, size: $size, zoneID: $zoneID) } }"
}

/// Filters for [`ProgressRaceApi::progress_race`]. All optional; the
/// current race is used when nothing is set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressRaceQuery {
    /// Competition ID.
    pub competition_id: Param<NumericId>,
    /// Difficulty ID.
    pub difficulty: Param<i64>,
    /// Restrict to one guild by ID.
    pub guild_id: Param<NumericId>,
    /// Restrict to one guild by name; needs `server_slug` and `server_region`.
    pub guild_name: Param<String>,
    /// Server slug.
    pub server_slug: Param<String>,
    /// Server region.
    pub server_region: Param<String>,
    /// Server subregion.
    pub server_subregion: Param<String>,
    /// Group size.
    pub size: Param<i64>,
    /// Zone ID.
    pub zone_id: Param<NumericId>,
}

impl ProgressRaceQuery {
    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = ParamBundle::new();
        bundle
            .set("competitionID", id_param(self.competition_id, "competitionID")?)
            .set(
                "difficulty",
                self.difficulty
                    .try_map(|v| validate_range(v, 1, None, "difficulty"))?,
            )
            .set("guildID", id_param(self.guild_id, "guildID")?)
            .set("guildName", text_param(&self.guild_name, "guildName")?)
            .set("serverSlug", text_param(&self.server_slug, "serverSlug")?)
            .set("serverRegion", text_param(&self.server_region, "serverRegion")?)
            .set(
                "serverSubregion",
                text_param(&self.server_subregion, "serverSubregion")?,
            )
            .set("size", self.size.try_map(|v| validate_range(v, 1, None, "size"))?)
            .set("zoneID", id_param(self.zone_id, "zoneID")?);

        validate_group(&bundle, &["serverSlug", "serverRegion"])?;
        if bundle.has_value("guildName") {
            validate_group(&bundle, &["guildName", "serverSlug", "serverRegion"])?;
        }
        Ok(bundle)
    }
}

/// Progress race queries.
#[derive(Debug, Clone, Copy)]
pub struct ProgressRaceApi<'a> {
    client: &'a EsoLogsClient,
}

impl<'a> ProgressRaceApi<'a> {
    pub(crate) const fn new(client: &'a EsoLogsClient) -> Self {
        Self { client }
    }

    /// Race standings as returned by the API; `None` outside a race.
    #[instrument(skip(self, query))]
    pub async fn progress_race(&self, query: &ProgressRaceQuery) -> EsoLogsResult<Option<Value>> {
        let vars = query.to_params()?;
        Ok(self.client.fetch::<GetProgressRace>(vars).await?.0.0)
    }
}
