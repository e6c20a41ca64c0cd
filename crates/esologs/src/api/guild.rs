//! Guild lookups, listings, members and attendance.

use tracing::instrument;

use super::{EntityRef, apply_paging, id_param, operation, text_param};
use crate::client::EsoLogsClient;
use crate::error::EsoLogsResult;
use crate::models::{AttendancePage, CharacterPage, Guild, GuildPage, Root};
use crate::params::{NumericId, Param, ParamBundle, ValidationError, validate_group};

operation! {
    GetGuild => Root<Root<Option<Guild>>>,
    "query GetGuild($id: Int, $name: String, $serverSlug: String, $serverRegion: String) { guildData { guild(id: $id, name: $name, serverSlug: $serverSlug, serverRegion: $serverRegion) { id name description faction { id name } server { id name normalizedName slug region { id name compactName slug } } tags { id name } } } }"
}

operation! {
    GetGuilds => Root<Root<GuildPage>>,
    "query GetGuilds($limit: Int, $page: Int, $serverID: Int, $serverSlug: String, $serverRegion: String) { guildData { guilds(limit: $limit, page: $page, serverID: $serverID, serverSlug: $serverSlug, serverRegion: $serverRegion) { data { id name faction { id name } server { id name slug } } total per_page current_page from to last_page has_more_pages } } }"
}

operation! {
    GetGuildAttendance => Root<Root<Option<Root<AttendancePage>>>>,
    "query GetGuildAttendance($id: Int, $name: String, $serverSlug: String, $serverRegion: String, $guildTagID: Int, $limit: Int, $page: Int, $zoneID: Int) { guildData { guild(id: $id, name: $name, serverSlug: $serverSlug, serverRegion: $serverRegion) { attendance(guildTagID: $guildTagID, limit: $limit, page: $page, zoneID: $zoneID) { data { code startTime players { name type presence } zone { id name } } total per_page current_page from to last_page has_more_pages } } } }"
}

operation! {
    GetGuildMembers => Root<Root<Option<Root<CharacterPage>>>>,
    "query GetGuildMembers($id: Int, $name: String, $serverSlug: String, $serverRegion: String, $limit: Int, $page: Int) { guildData { guild(id: $id, name: $name, serverSlug: $serverSlug, serverRegion: $serverRegion) { members(limit: $limit, page: $page) { data { id name classID raceID hidden server { id name slug } } total per_page current_page from to last_page has_more_pages } } } }"
}

/// Filters for [`GuildApi::list`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GuildListQuery {
    /// Restrict to one server by ID.
    pub server_id: Param<NumericId>,
    /// Restrict to one server by slug; needs `server_region`.
    pub server_slug: Param<String>,
    /// Region of `server_slug`.
    pub server_region: Param<String>,
    /// Page size, 1 to 25.
    pub limit: Option<i64>,
    /// Page number, from 1.
    pub page: Option<i64>,
}

impl GuildListQuery {
    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = ParamBundle::new();
        bundle
            .set("serverID", id_param(self.server_id, "serverID")?)
            .set("serverSlug", text_param(&self.server_slug, "serverSlug")?)
            .set("serverRegion", text_param(&self.server_region, "serverRegion")?);
        validate_group(&bundle, &["serverSlug", "serverRegion"])?;
        apply_paging(&mut bundle, self.limit, self.page)?;
        Ok(bundle)
    }
}

/// Filters for [`GuildApi::attendance`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceQuery {
    /// Guild to look up.
    pub guild: EntityRef,
    /// Restrict to one raid team tag.
    pub guild_tag_id: Param<NumericId>,
    /// Restrict to one zone.
    pub zone_id: Param<NumericId>,
    /// Page size, 1 to 25.
    pub limit: Option<i64>,
    /// Page number, from 1.
    pub page: Option<i64>,
}

impl AttendanceQuery {
    /// First page of `guild`'s attendance, unfiltered.
    #[must_use]
    pub const fn new(guild: EntityRef) -> Self {
        Self {
            guild,
            guild_tag_id: Param::Unset,
            zone_id: Param::Unset,
            limit: None,
            page: None,
        }
    }

    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = ParamBundle::new();
        self.guild.apply(&mut bundle)?;
        bundle
            .set("guildTagID", id_param(self.guild_tag_id, "guildTagID")?)
            .set("zoneID", id_param(self.zone_id, "zoneID")?);
        apply_paging(&mut bundle, self.limit, self.page)?;
        Ok(bundle)
    }
}

/// Guild queries.
#[derive(Debug, Clone, Copy)]
pub struct GuildApi<'a> {
    client: &'a EsoLogsClient,
}

impl<'a> GuildApi<'a> {
    pub(crate) const fn new(client: &'a EsoLogsClient) -> Self {
        Self { client }
    }

    /// Guild by ID.
    #[instrument(skip(self, id))]
    pub async fn by_id(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<Guild>> {
        let mut vars = ParamBundle::new();
        EntityRef::id(id).apply(&mut vars)?;
        Ok(self.client.fetch::<GetGuild>(vars).await?.0.0)
    }

    /// Guild by name on a server.
    #[instrument(skip(self))]
    pub async fn by_name(
        &self,
        name: &str,
        server_slug: &str,
        server_region: &str,
    ) -> EsoLogsResult<Option<Guild>> {
        let mut vars = ParamBundle::new();
        EntityRef::name(name, server_slug, server_region).apply(&mut vars)?;
        Ok(self.client.fetch::<GetGuild>(vars).await?.0.0)
    }

    /// One page of guilds.
    #[instrument(skip(self, query))]
    pub async fn list(&self, query: &GuildListQuery) -> EsoLogsResult<GuildPage> {
        let vars = query.to_params()?;
        Ok(self.client.fetch::<GetGuilds>(vars).await?.0.0)
    }

    /// One page of attendance sheets; `None` if the guild does not exist.
    #[instrument(skip(self, query))]
    pub async fn attendance(&self, query: &AttendanceQuery) -> EsoLogsResult<Option<AttendancePage>> {
        let vars = query.to_params()?;
        let data = self.client.fetch::<GetGuildAttendance>(vars).await?;
        Ok(data.0.0.map(Root::into_inner))
    }

    /// One page of guild members; `None` if the guild does not exist.
    #[instrument(skip(self, guild))]
    pub async fn members(
        &self,
        guild: &EntityRef,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> EsoLogsResult<Option<CharacterPage>> {
        let mut vars = ParamBundle::new();
        guild.apply(&mut vars)?;
        apply_paging(&mut vars, limit, page)?;
        let data = self.client.fetch::<GetGuildMembers>(vars).await?;
        Ok(data.0.0.map(Root::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_requires_slug_and_region_together() {
        let query = GuildListQuery {
            server_slug: Param::Value("megaserver".into()),
            ..GuildListQuery::default()
        };
        assert_eq!(
            query.to_params().unwrap_err(),
            ValidationError::Incomplete {
                fields: vec!["serverSlug", "serverRegion"],
                missing: vec!["serverRegion"],
            }
        );
    }

    #[test]
    fn attendance_variables() {
        let mut query = AttendanceQuery::new(EntityRef::name("Tamriel Rejects", "pc-na", "NA"));
        query.zone_id = Param::Value(NumericId::Int(16));
        query.limit = Some(10);

        assert_eq!(
            query.to_params().unwrap().to_value(),
            json!({
                "name": "Tamriel Rejects",
                "serverSlug": "pc-na",
                "serverRegion": "NA",
                "zoneID": 16,
                "limit": 10,
            })
        );
    }
}
