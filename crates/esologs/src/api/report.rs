//! Reports: lookup, search, event streams and fight analysis.
//!
//! Report search takes absolute timestamps (see [`Timestamp`]). Event,
//! graph, table and player detail windows are millisecond offsets from the
//! report start and are never rescaled.

use esologs_graphql::{CursorPage, GraphqlClientError, PageLimit, paginate_cursor, paginate_pages};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{id_param, ids_param, operation, text_param};
use crate::client::EsoLogsClient;
use crate::error::{EsoLogsError, EsoLogsResult};
use crate::models::{Report, ReportEventPage, ReportPage, Root};
use crate::params::{
    EventDataType, GraphDataType, HostilityType, KillType, NumericId, PAGE_MIN, Param,
    ParamBundle, RankingCompareType, RankingTimeframe, ReportRankingMetricType, TableDataType,
    Timestamp, ValidationError, ViewType, validate_events_limit, validate_group, validate_limit,
    validate_order, validate_range, validate_report_code,
};

operation! {
    GetReport => Root<Root<Option<Report>>>,
    "query GetReport($code: String!) { reportData { report(code: $code) { code title startTime endTime owner { id name } guild { id name } zone { id name } fights { id name startTime endTime encounterID difficulty kill bossPercentage } } } }"
}

operation! {
    GetReports => Root<Root<ReportPage>>,
    "query GetReports($endTime: Float, $guildID: Int, $guildName: String, $guildServerSlug: String, $guildServerRegion: String, $guildTagID: Int, $userID: Int, $limit: Int, $page: Int, $startTime: Float, $zoneID: Int, $gameZoneID: Int) { reportData { reports(endTime: $endTime, guildID: $guildID, guildName: $guildName, guildServerSlug: $guildServerSlug, guildServerRegion: $guildServerRegion, guildTagID: $guildTagID, userID: $userID, limit: $limit, page: $page, startTime: $startTime, zoneID: $zoneID, gameZoneID: $gameZoneID) { data { code title startTime endTime owner { id name } guild { id name } zone { id name } } total per_page current_page from to last_page has_more_pages } } }"
}

operation! {
    GetReportEvents => Root<Root<Option<Root<ReportEventPage>>>>,
    "query GetReportEvents($code: String!, $startTime: Float, $endTime: Float, $dataType: EventDataType, $fightIDs: [Int], $sourceID: Int, $targetID: Int, $abilityID: Float, $hostilityType: HostilityType, $killType: KillType, $encounterID: Int, $limit: Int, $includeResources: Boolean, $filterExpression: String, $translate: Boolean) { reportData { report(code: $code) { events(startTime: $startTime, endTime: $endTime, dataType: $dataType, fightIDs: $fightIDs, sourceID: $sourceID, targetID: $targetID, abilityID: $abilityID, hostilityType: $hostilityType, killType: $killType, encounterID: $encounterID, limit: $limit, includeResources: $includeResources, filterExpression: $filterExpression, translate: $translate) { data nextPageTimestamp } } } }"
}

operation! {
    GetReportGraph => Root<Root<Option<Root<Value>>>>,
    "query GetReportGraph($code: String!, $startTime: Float, $endTime: Float, $dataType: GraphDataType, $fightIDs: [Int], $sourceID: Int, $targetID: Int, $abilityID: Float, $hostilityType: HostilityType, $killType: KillType, $encounterID: Int, $viewBy: ViewType, $filterExpression: String, $translate: Boolean) { reportData { report(code: $code) { graph(startTime: $startTime, endTime: $endTime, dataType: $dataType, fightIDs: $fightIDs, sourceID: $sourceID, targetID: $targetID, abilityID: $abilityID, hostilityType: $hostilityType, killType: $killType, encounterID: $encounterID, viewBy: $viewBy, filterExpression: $filterExpression, translate: $translate) } } }"
}

operation! {
    GetReportTable => Root<Root<Option<Root<Value>>>>,
    "query GetReportTable($code: String!, $startTime: Float, $endTime: Float, $dataType: TableDataType, $fightIDs: [Int], $sourceID: Int, $targetID: Int, $abilityID: Float, $hostilityType: HostilityType, $killType: KillType, $encounterID: Int, $viewBy: ViewType, $filterExpression: String, $translate: Boolean) { reportData { report(code: $code) { table(startTime: $startTime, endTime: $endTime, dataType: $dataType, fightIDs: $fightIDs, sourceID: $sourceID, targetID: $targetID, abilityID: $abilityID, hostilityType: $hostilityType, killType: $killType, encounterID: $encounterID, viewBy: $viewBy, filterExpression: $filterExpression, translate: $translate) } } }"
}

operation! {
    GetReportRankings => Root<Root<Option<Root<Value>>>>,
    "query GetReportRankings($code: String!, $compare: RankingCompareType, $difficulty: Int, $encounterID: Int, $fightIDs: [Int], $playerMetric: ReportRankingMetricType, $timeframe: RankingTimeframe) { reportData { report(code: $code) { rankings(compare: $compare, difficulty: $difficulty, encounterID: $encounterID, fightIDs: $fightIDs, playerMetric: $playerMetric, timeframe: $timeframe) } } }"
}

operation! {
    GetReportPlayerDetails => Root<Root<Option<Root<Value>>>>,
    "query GetReportPlayerDetails($code: String!, $difficulty: Int, $encounterID: Int, $endTime: Float, $fightIDs: [Int], $killType: KillType, $startTime: Float, $translate: Boolean) { reportData { report(code: $code) { playerDetails(difficulty: $difficulty, encounterID: $encounterID, endTime: $endTime, fightIDs: $fightIDs, killType: $killType, startTime: $startTime, translate: $translate) } } }"
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

/// Report search filters.
///
/// Guild name, server slug and server region go together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportSearch {
    /// Guild by ID.
    pub guild_id: Param<NumericId>,
    /// Guild by name.
    pub guild_name: Param<String>,
    /// Server slug of `guild_name`.
    pub guild_server_slug: Param<String>,
    /// Server region of `guild_name`.
    pub guild_server_region: Param<String>,
    /// Raid team tag.
    pub guild_tag_id: Param<NumericId>,
    /// Uploader.
    pub user_id: Param<NumericId>,
    /// Zone.
    pub zone_id: Param<NumericId>,
    /// In-game zone.
    pub game_zone_id: Param<NumericId>,
    /// Earliest report start.
    pub start_time: Param<Timestamp>,
    /// Latest report start.
    pub end_time: Param<Timestamp>,
    /// Page size, 1 to 25.
    pub limit: Option<i64>,
    /// Page number, from 1.
    pub page: Option<i64>,
}

impl ReportSearch {
    /// No filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports of a guild identified by name.
    #[must_use]
    pub fn guild(
        mut self,
        name: impl Into<String>,
        server_slug: impl Into<String>,
        server_region: impl Into<String>,
    ) -> Self {
        self.guild_name = Param::Value(name.into());
        self.guild_server_slug = Param::Value(server_slug.into());
        self.guild_server_region = Param::Value(server_region.into());
        self
    }

    /// Reports of a guild identified by ID.
    #[must_use]
    pub fn guild_id(mut self, id: impl Into<NumericId>) -> Self {
        self.guild_id = Param::Value(id.into());
        self
    }

    /// Reports uploaded by a user.
    #[must_use]
    pub fn user_id(mut self, id: impl Into<NumericId>) -> Self {
        self.user_id = Param::Value(id.into());
        self
    }

    /// Reports in a zone.
    #[must_use]
    pub fn zone_id(mut self, id: impl Into<NumericId>) -> Self {
        self.zone_id = Param::Value(id.into());
        self
    }

    /// Reports starting inside `[start, end]`.
    #[must_use]
    pub fn between(mut self, start: impl Into<Timestamp>, end: impl Into<Timestamp>) -> Self {
        self.start_time = Param::Value(start.into());
        self.end_time = Param::Value(end.into());
        self
    }

    /// Page size.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Page number.
    #[must_use]
    pub const fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let start = self.start_time.try_map(|t| t.to_millis("startTime"))?;
        let end = self.end_time.try_map(|t| t.to_millis("endTime"))?;
        validate_order(
            start.as_value().copied(),
            end.as_value().copied(),
            "startTime",
            "endTime",
        )?;

        let mut bundle = ParamBundle::new();
        bundle
            .set("guildID", id_param(self.guild_id, "guildID")?)
            .set("guildName", text_param(&self.guild_name, "guildName")?)
            .set("guildServerSlug", text_param(&self.guild_server_slug, "guildServerSlug")?)
            .set(
                "guildServerRegion",
                text_param(&self.guild_server_region, "guildServerRegion")?,
            )
            .set("guildTagID", id_param(self.guild_tag_id, "guildTagID")?)
            .set("userID", id_param(self.user_id, "userID")?)
            .set("zoneID", id_param(self.zone_id, "zoneID")?)
            .set("gameZoneID", id_param(self.game_zone_id, "gameZoneID")?)
            .set("startTime", start)
            .set("endTime", end)
            .set("limit", Param::from_option(self.limit).try_map(validate_limit)?)
            .set("page", Param::from_option(self.page).try_map(first_page)?);
        validate_group(
            &bundle,
            &["guildName", "guildServerSlug", "guildServerRegion"],
        )?;
        Ok(bundle)
    }
}

fn first_page(page: i64) -> Result<i64, ValidationError> {
    validate_range(page, PAGE_MIN, Some(i64::from(u32::MAX)), "page")
}

// ─────────────────────────────────────────────────────────────────────────────
// Events and Analysis
// ─────────────────────────────────────────────────────────────────────────────

/// Report-relative window: offsets in milliseconds from the report start.
fn apply_window(
    bundle: &mut ParamBundle,
    start: Param<i64>,
    end: Param<i64>,
) -> Result<(), ValidationError> {
    let start = start.try_map(|v| validate_range(v, 0, None, "startTime"))?;
    let end = end.try_map(|v| validate_range(v, 0, None, "endTime"))?;
    validate_order(
        start.as_value().copied(),
        end.as_value().copied(),
        "startTime",
        "endTime",
    )?;
    bundle.set("startTime", start).set("endTime", end);
    Ok(())
}

fn code_bundle(code: &str) -> Result<ParamBundle, ValidationError> {
    let mut bundle = ParamBundle::new();
    bundle.insert("code", validate_report_code(code)?);
    Ok(bundle)
}

/// Event stream filters for [`ReportApi::events`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventsQuery {
    /// Report code.
    pub code: String,
    /// Window start offset, in milliseconds.
    pub start_time: Param<i64>,
    /// Window end offset, in milliseconds.
    pub end_time: Param<i64>,
    /// Event category.
    pub data_type: Param<EventDataType>,
    /// Restrict to these fights.
    pub fight_ids: Param<Vec<i64>>,
    /// Restrict to one source actor.
    pub source_id: Param<NumericId>,
    /// Restrict to one target actor.
    pub target_id: Param<NumericId>,
    /// Restrict to one ability.
    pub ability_id: Param<NumericId>,
    /// Friendlies or enemies.
    pub hostility_type: Param<HostilityType>,
    /// Fight outcome filter.
    pub kill_type: Param<KillType>,
    /// Restrict to one encounter.
    pub encounter_id: Param<NumericId>,
    /// Events per page, 1 to 10000.
    pub limit: Param<i64>,
    /// Attach resource snapshots to events.
    pub include_resources: Param<bool>,
    /// Filter expression in the site's query syntax.
    pub filter_expression: Param<String>,
    /// Translate names to English.
    pub translate: Param<bool>,
}

impl EventsQuery {
    /// All events of a report.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            start_time: Param::Unset,
            end_time: Param::Unset,
            data_type: Param::Unset,
            fight_ids: Param::Unset,
            source_id: Param::Unset,
            target_id: Param::Unset,
            ability_id: Param::Unset,
            hostility_type: Param::Unset,
            kill_type: Param::Unset,
            encounter_id: Param::Unset,
            limit: Param::Unset,
            include_resources: Param::Unset,
            filter_expression: Param::Unset,
            translate: Param::Unset,
        }
    }

    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = code_bundle(&self.code)?;
        apply_window(&mut bundle, self.start_time, self.end_time)?;
        bundle
            .set("dataType", self.data_type)
            .set("fightIDs", ids_param(&self.fight_ids, "fightIDs")?)
            .set("sourceID", id_param(self.source_id, "sourceID")?)
            .set("targetID", id_param(self.target_id, "targetID")?)
            .set("abilityID", id_param(self.ability_id, "abilityID")?)
            .set("hostilityType", self.hostility_type)
            .set("killType", self.kill_type)
            .set("encounterID", id_param(self.encounter_id, "encounterID")?)
            .set("limit", self.limit.try_map(validate_events_limit)?)
            .set("includeResources", self.include_resources)
            .set("filterExpression", text_param(&self.filter_expression, "filterExpression")?)
            .set("translate", self.translate);
        Ok(bundle)
    }
}

/// Graph or table filters; `D` is the data category enum.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisQuery<D> {
    /// Report code.
    pub code: String,
    /// Window start offset, in milliseconds.
    pub start_time: Param<i64>,
    /// Window end offset, in milliseconds.
    pub end_time: Param<i64>,
    /// Data category.
    pub data_type: Param<D>,
    /// Restrict to these fights.
    pub fight_ids: Param<Vec<i64>>,
    /// Restrict to one source actor.
    pub source_id: Param<NumericId>,
    /// Restrict to one target actor.
    pub target_id: Param<NumericId>,
    /// Restrict to one ability.
    pub ability_id: Param<NumericId>,
    /// Friendlies or enemies.
    pub hostility_type: Param<HostilityType>,
    /// Fight outcome filter.
    pub kill_type: Param<KillType>,
    /// Restrict to one encounter.
    pub encounter_id: Param<NumericId>,
    /// Grouping.
    pub view_by: Param<ViewType>,
    /// Filter expression in the site's query syntax.
    pub filter_expression: Param<String>,
    /// Translate names to English.
    pub translate: Param<bool>,
}

/// Filters for [`ReportApi::graph`].
pub type GraphQuery = AnalysisQuery<GraphDataType>;
/// Filters for [`ReportApi::table`].
pub type TableQuery = AnalysisQuery<TableDataType>;

impl<D: Into<Value> + Copy> AnalysisQuery<D> {
    /// Whole report, default category.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            start_time: Param::Unset,
            end_time: Param::Unset,
            data_type: Param::Unset,
            fight_ids: Param::Unset,
            source_id: Param::Unset,
            target_id: Param::Unset,
            ability_id: Param::Unset,
            hostility_type: Param::Unset,
            kill_type: Param::Unset,
            encounter_id: Param::Unset,
            view_by: Param::Unset,
            filter_expression: Param::Unset,
            translate: Param::Unset,
        }
    }

    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = code_bundle(&self.code)?;
        apply_window(&mut bundle, self.start_time, self.end_time)?;
        bundle
            .set("dataType", self.data_type)
            .set("fightIDs", ids_param(&self.fight_ids, "fightIDs")?)
            .set("sourceID", id_param(self.source_id, "sourceID")?)
            .set("targetID", id_param(self.target_id, "targetID")?)
            .set("abilityID", id_param(self.ability_id, "abilityID")?)
            .set("hostilityType", self.hostility_type)
            .set("killType", self.kill_type)
            .set("encounterID", id_param(self.encounter_id, "encounterID")?)
            .set("viewBy", self.view_by)
            .set("filterExpression", text_param(&self.filter_expression, "filterExpression")?)
            .set("translate", self.translate);
        Ok(bundle)
    }
}

/// Filters for [`ReportApi::rankings`].
#[derive(Debug, Clone, PartialEq)]
pub struct RankingsQuery {
    /// Report code.
    pub code: String,
    /// Compare against rankings or all parses.
    pub compare: Param<RankingCompareType>,
    /// Difficulty ID.
    pub difficulty: Param<i64>,
    /// Restrict to one encounter.
    pub encounter_id: Param<NumericId>,
    /// Restrict to these fights.
    pub fight_ids: Param<Vec<i64>>,
    /// Ranking metric.
    pub player_metric: Param<ReportRankingMetricType>,
    /// Today or historical.
    pub timeframe: Param<RankingTimeframe>,
}

impl RankingsQuery {
    /// Rankings for every fight in a report.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            compare: Param::Unset,
            difficulty: Param::Unset,
            encounter_id: Param::Unset,
            fight_ids: Param::Unset,
            player_metric: Param::Unset,
            timeframe: Param::Unset,
        }
    }

    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = code_bundle(&self.code)?;
        bundle
            .set("compare", self.compare)
            .set(
                "difficulty",
                self.difficulty
                    .try_map(|v| validate_range(v, 1, None, "difficulty"))?,
            )
            .set("encounterID", id_param(self.encounter_id, "encounterID")?)
            .set("fightIDs", ids_param(&self.fight_ids, "fightIDs")?)
            .set("playerMetric", self.player_metric)
            .set("timeframe", self.timeframe);
        Ok(bundle)
    }
}

/// Filters for [`ReportApi::player_details`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDetailsQuery {
    /// Report code.
    pub code: String,
    /// Difficulty ID.
    pub difficulty: Param<i64>,
    /// Restrict to one encounter.
    pub encounter_id: Param<NumericId>,
    /// Window start offset, in milliseconds.
    pub start_time: Param<i64>,
    /// Window end offset, in milliseconds.
    pub end_time: Param<i64>,
    /// Restrict to these fights.
    pub fight_ids: Param<Vec<i64>>,
    /// Fight outcome filter.
    pub kill_type: Param<KillType>,
    /// Translate names to English.
    pub translate: Param<bool>,
}

impl PlayerDetailsQuery {
    /// Player details for the whole report.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            difficulty: Param::Unset,
            encounter_id: Param::Unset,
            start_time: Param::Unset,
            end_time: Param::Unset,
            fight_ids: Param::Unset,
            kill_type: Param::Unset,
            translate: Param::Unset,
        }
    }

    /// Validated variables.
    pub fn to_params(&self) -> Result<ParamBundle, ValidationError> {
        let mut bundle = code_bundle(&self.code)?;
        apply_window(&mut bundle, self.start_time, self.end_time)?;
        bundle
            .set(
                "difficulty",
                self.difficulty
                    .try_map(|v| validate_range(v, 1, None, "difficulty"))?,
            )
            .set("encounterID", id_param(self.encounter_id, "encounterID")?)
            .set("fightIDs", ids_param(&self.fight_ids, "fightIDs")?)
            .set("killType", self.kill_type)
            .set("translate", self.translate);
        Ok(bundle)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API
// ─────────────────────────────────────────────────────────────────────────────

/// Report queries.
#[derive(Debug, Clone, Copy)]
pub struct ReportApi<'a> {
    client: &'a EsoLogsClient,
}

impl<'a> ReportApi<'a> {
    pub(crate) const fn new(client: &'a EsoLogsClient) -> Self {
        Self { client }
    }

    /// Report by code, with its fights.
    #[instrument(skip(self))]
    pub async fn by_code(&self, code: &str) -> EsoLogsResult<Option<Report>> {
        let vars = code_bundle(code)?;
        Ok(self.client.fetch::<GetReport>(vars).await?.0.0)
    }

    /// One page of reports matching `search`.
    #[instrument(skip(self, search))]
    pub async fn search(&self, search: &ReportSearch) -> EsoLogsResult<ReportPage> {
        let vars = search.to_params()?;
        Ok(self.client.fetch::<GetReports>(vars).await?.0.0)
    }

    /// Every report matching `search`, following pages from `search.page`
    /// (or the first page) until the last page or `max_reports`.
    #[instrument(skip(self, search))]
    pub async fn list(
        &self,
        search: &ReportSearch,
        max_reports: Option<usize>,
    ) -> EsoLogsResult<Vec<Report>> {
        let base = search.to_params()?;
        let first = match search.page {
            Some(page) => u32::try_from(first_page(page)?).unwrap_or(1),
            None => 1,
        };
        let client = self.client;

        let reports = paginate_pages(first, max_reports.map(PageLimit::new), |page| {
            let mut vars = base.clone();
            vars.insert("page", page);
            async move { Ok::<_, EsoLogsError>(client.fetch::<GetReports>(vars).await?.0.0) }
        })
        .await?;
        debug!(count = reports.len(), "collected reports");
        Ok(reports)
    }

    /// One page of events.
    ///
    /// Pass [`ReportEventPage::next_page_timestamp`] as the next
    /// `start_time` to continue, or use [`ReportApi::all_events`].
    #[instrument(skip(self, query), fields(code = %query.code))]
    pub async fn events(&self, query: &EventsQuery) -> EsoLogsResult<ReportEventPage> {
        let vars = query.to_params()?;
        report_field(self.client.fetch::<GetReportEvents>(vars).await?, &query.code)
    }

    /// Every event in the query window, following `nextPageTimestamp` until
    /// the stream ends or `max_events` is reached.
    #[instrument(skip(self, query), fields(code = %query.code))]
    pub async fn all_events(
        &self,
        query: &EventsQuery,
        max_events: Option<usize>,
    ) -> EsoLogsResult<Vec<Value>> {
        let base = query.to_params()?;
        let client = self.client;
        let code = query.code.as_str();

        let events = paginate_cursor(None, max_events.map(PageLimit::new), |cursor: Option<f64>| {
            let mut vars = base.clone();
            if let Some(cursor) = cursor {
                vars.insert("startTime", cursor);
            }
            async move {
                let page: ReportEventPage =
                    report_field(client.fetch::<GetReportEvents>(vars).await?, code)?;
                Ok::<_, EsoLogsError>(CursorPage {
                    items: page.data,
                    next: page.next_page_timestamp,
                })
            }
        })
        .await?;
        debug!(count = events.len(), "collected events");
        Ok(events)
    }

    /// Graph data as returned by the API.
    #[instrument(skip(self, query), fields(code = %query.code))]
    pub async fn graph(&self, query: &GraphQuery) -> EsoLogsResult<Value> {
        let vars = query.to_params()?;
        report_field(self.client.fetch::<GetReportGraph>(vars).await?, &query.code)
    }

    /// Table data as returned by the API.
    #[instrument(skip(self, query), fields(code = %query.code))]
    pub async fn table(&self, query: &TableQuery) -> EsoLogsResult<Value> {
        let vars = query.to_params()?;
        report_field(self.client.fetch::<GetReportTable>(vars).await?, &query.code)
    }

    /// Fight rankings as returned by the API.
    #[instrument(skip(self, query), fields(code = %query.code))]
    pub async fn rankings(&self, query: &RankingsQuery) -> EsoLogsResult<Value> {
        let vars = query.to_params()?;
        report_field(self.client.fetch::<GetReportRankings>(vars).await?, &query.code)
    }

    /// Player details as returned by the API.
    #[instrument(skip(self, query), fields(code = %query.code))]
    pub async fn player_details(&self, query: &PlayerDetailsQuery) -> EsoLogsResult<Value> {
        let vars = query.to_params()?;
        report_field(
            self.client.fetch::<GetReportPlayerDetails>(vars).await?,
            &query.code,
        )
    }
}

/// Unwrap `reportData.report.<field>`, failing when the report is absent.
fn report_field<T>(data: Root<Root<Option<Root<T>>>>, code: &str) -> EsoLogsResult<T> {
    data.0.0.map(Root::into_inner).ok_or_else(|| {
        EsoLogsError::Api(GraphqlClientError::Protocol {
            message: format!("report {code} not found"),
        })
    })
}
