//! Character lookups, recent reports and rankings.

use serde_json::Value;
use tracing::instrument;

use super::{EntityRef, apply_paging, operation, text_param};
use crate::client::EsoLogsClient;
use crate::error::EsoLogsResult;
use crate::models::{Character, ReportPage, Root};
use crate::params::{
    CharacterRankingMetricType, NumericId, Param, ParamBundle, RankingCompareType,
    RankingTimeframe, RoleType, ValidationError, normalize_id, validate_range,
};

operation! {
    GetCharacter => Root<Root<Option<Character>>>,
    "query GetCharacter($id: Int, $name: String, $serverSlug: String, $serverRegion: String) { characterData { character(id: $id, name: $name, serverSlug: $serverSlug, serverRegion: $serverRegion) { id name classID raceID hidden server { id name normalizedName slug region { id name compactName slug } } } } }"
}

operation! {
    GetCharacterReports => Root<Root<Option<Root<ReportPage>>>>,
    "query GetCharacterReports($id: Int!, $limit: Int, $page: Int) { characterData { character(id: $id) { recentReports(limit: $limit, page: $page) { data { code title startTime endTime zone { id name } } total per_page current_page from to last_page has_more_pages } } } }"
}

operation! {
    GetCharacterEncounterRankings => Root<Root<Option<Root<Value>>>>,
    "query GetCharacterEncounterRankings($id: Int, $name: String, $serverSlug: String, $serverRegion: String, $encounterID: Int!, $byBracket: Boolean, $className: String, $compare: RankingCompareType, $difficulty: Int, $includeCombatantInfo: Boolean, $includePrivateLogs: Boolean, $metric: CharacterRankingMetricType, $partition: Int, $role: RoleType, $size: Int, $specName: String, $timeframe: RankingTimeframe) { characterData { character(id: $id, name: $name, serverSlug: $serverSlug, serverRegion: $serverRegion) { encounterRankings(encounterID: $encounterID, byBracket: $byBracket, className: $className, compare: $compare, difficulty: $difficulty, includeCombatantInfo: $includeCombatantInfo, includePrivateLogs: $includePrivateLogs, metric: $metric, partition: $partition, role: $role, size: $size, specName: $specName, timeframe: $timeframe) } } }"
}

operation! {
    GetCharacterZoneRankings => Root<Root<Option<Root<Value>>>>,
    "query GetCharacterZoneRankings($id: Int, $name: String, $serverSlug: String, $serverRegion: String, $zoneID: Int, $byBracket: Boolean, $className: String, $compare: RankingCompareType, $difficulty: Int, $includePrivateLogs: Boolean, $metric: CharacterRankingMetricType, $partition: Int, $role: RoleType, $size: Int, $specName: String, $timeframe: RankingTimeframe) { characterData { character(id: $id, name: $name, serverSlug: $serverSlug, serverRegion: $serverRegion) { zoneRankings(zoneID: $zoneID, byBracket: $byBracket, className: $className, compare: $compare, difficulty: $difficulty, includePrivateLogs: $includePrivateLogs, metric: $metric, partition: $partition, role: $role, size: $size, specName: $specName, timeframe: $timeframe) } } }"
}

/// Filters shared by character ranking queries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankingFilters {
    /// Rank within item level brackets.
    pub by_bracket: Param<bool>,
    /// Restrict to one class.
    pub class_name: Param<String>,
    /// Compare against rankings or all parses.
    pub compare: Param<RankingCompareType>,
    /// Difficulty ID.
    pub difficulty: Param<i64>,
    /// Include logs the caller can see privately (user mode).
    pub include_private_logs: Param<bool>,
    /// Ranking metric.
    pub metric: Param<CharacterRankingMetricType>,
    /// Ranking partition (patch window).
    pub partition: Param<i64>,
    /// Restrict to one role.
    pub role: Param<RoleType>,
    /// Group size.
    pub size: Param<i64>,
    /// Restrict to one spec.
    pub spec_name: Param<String>,
    /// Today or historical.
    pub timeframe: Param<RankingTimeframe>,
}

impl RankingFilters {
    fn apply(&self, bundle: &mut ParamBundle) -> Result<(), ValidationError> {
        bundle
            .set("byBracket", self.by_bracket)
            .set("className", text_param(&self.class_name, "className")?)
            .set("compare", self.compare)
            .set(
                "difficulty",
                self.difficulty
                    .try_map(|v| validate_range(v, 1, None, "difficulty"))?,
            )
            .set("includePrivateLogs", self.include_private_logs)
            .set("metric", self.metric)
            .set("partition", self.partition)
            .set("role", self.role)
            .set("size", self.size.try_map(|v| validate_range(v, 1, None, "size"))?)
            .set("specName", text_param(&self.spec_name, "specName")?)
            .set("timeframe", self.timeframe);
        Ok(())
    }
}

/// A character's rankings for one encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterRankingQuery {
    /// Character to look up.
    pub character: EntityRef,
    /// Encounter ID.
    pub encounter_id: NumericId,
    /// Attach gear and talents to each ranking.
    pub include_combatant_info: Param<bool>,
    /// Ranking filters.
    pub filters: RankingFilters,
}

impl EncounterRankingQuery {
    /// Rankings of `character` on `encounter_id`, unfiltered.
    pub fn new(character: EntityRef, encounter_id: impl Into<NumericId>) -> Self {
        Self {
            character,
            encounter_id: encounter_id.into(),
            include_combatant_info: Param::Unset,
            filters: RankingFilters::default(),
        }
    }

    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = ParamBundle::new();
        self.character.apply(&mut bundle)?;
        bundle
            .insert("encounterID", normalize_id(self.encounter_id, "encounterID")?)
            .set("includeCombatantInfo", self.include_combatant_info);
        self.filters.apply(&mut bundle)?;
        Ok(bundle)
    }
}

/// A character's rankings across a zone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoneRankingQuery {
    /// Character to look up.
    pub character: EntityRef,
    /// Zone ID; the current zone when unset.
    pub zone_id: Param<NumericId>,
    /// Ranking filters.
    pub filters: RankingFilters,
}

impl ZoneRankingQuery {
    /// Rankings of `character` in the current zone, unfiltered.
    #[must_use]
    pub fn new(character: EntityRef) -> Self {
        Self {
            character,
            ..Self::default()
        }
    }

    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = ParamBundle::new();
        self.character.apply(&mut bundle)?;
        bundle.set("zoneID", self.zone_id.try_map(|id| id.normalize("zoneID"))?);
        self.filters.apply(&mut bundle)?;
        Ok(bundle)
    }
}

/// Character queries.
#[derive(Debug, Clone, Copy)]
pub struct CharacterApi<'a> {
    client: &'a EsoLogsClient,
}

impl<'a> CharacterApi<'a> {
    pub(crate) const fn new(client: &'a EsoLogsClient) -> Self {
        Self { client }
    }

    /// Character by ID.
    #[instrument(skip(self, id))]
    pub async fn by_id(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<Character>> {
        let mut vars = ParamBundle::new();
        EntityRef::id(id).apply(&mut vars)?;
        Ok(self.client.fetch::<GetCharacter>(vars).await?.0.0)
    }

    /// Character by name on a server.
    #[instrument(skip(self))]
    pub async fn by_name(
        &self,
        name: &str,
        server_slug: &str,
        server_region: &str,
    ) -> EsoLogsResult<Option<Character>> {
        let mut vars = ParamBundle::new();
        EntityRef::name(name, server_slug, server_region).apply(&mut vars)?;
        Ok(self.client.fetch::<GetCharacter>(vars).await?.0.0)
    }

    /// One page of the character's recent reports; `None` if the character
    /// does not exist.
    #[instrument(skip(self, character_id))]
    pub async fn reports(
        &self,
        character_id: impl Into<NumericId>,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> EsoLogsResult<Option<ReportPage>> {
        let mut vars = ParamBundle::new();
        vars.insert("id", normalize_id(character_id, "id")?);
        apply_paging(&mut vars, limit, page)?;
        let data = self.client.fetch::<GetCharacterReports>(vars).await?;
        Ok(data.0.0.map(Root::into_inner))
    }

    /// Encounter rankings as returned by the API.
    #[instrument(skip(self, query))]
    pub async fn encounter_ranking(
        &self,
        query: &EncounterRankingQuery,
    ) -> EsoLogsResult<Option<Value>> {
        let vars = query.to_params()?;
        let data = self.client.fetch::<GetCharacterEncounterRankings>(vars).await?;
        Ok(data.0.0.map(Root::into_inner))
    }

    /// Zone rankings as returned by the API.
    #[instrument(skip(self, query))]
    pub async fn zone_rankings(&self, query: &ZoneRankingQuery) -> EsoLogsResult<Option<Value>> {
        let vars = query.to_params()?;
        let data = self.client.fetch::<GetCharacterZoneRankings>(vars).await?;
        Ok(data.0.0.map(Root::into_inner))
    }
}
