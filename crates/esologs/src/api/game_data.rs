//! Static game data: abilities, classes, factions, items, sets, maps, NPCs.

use esologs_graphql::PaginatedResult;
use tracing::instrument;

use super::{apply_paging, id_bundle, id_param, operation};
use crate::client::EsoLogsClient;
use crate::error::EsoLogsResult;
use crate::models::{
    GameAbility, GameClass, GameFaction, GameItem, GameItemSet, GameMap, GameNpc, Root,
};
use crate::params::{NumericId, Param, ParamBundle};

operation! {
    GetAbility => Root<Root<Option<GameAbility>>>,
    "query GetAbility($id: Int!) { gameData { ability(id: $id) { id name icon description } } }"
}

operation! {
    GetAbilities => Root<Root<PaginatedResult<GameAbility>>>,
    "query GetAbilities($limit: Int, $page: Int) { gameData { abilities(limit: $limit, page: $page) { data { id name icon description } total per_page current_page from to last_page has_more_pages } } }"
}

operation! {
    GetClass => Root<Root<Option<GameClass>>>,
    "query GetClass($id: Int!, $factionID: Int, $zoneID: Int) { gameData { class(id: $id, faction_id: $factionID, zone_id: $zoneID) { id name slug } } }"
}

operation! {
    GetClasses => Root<Root<Option<Vec<GameClass>>>>,
    "query GetClasses($factionID: Int, $zoneID: Int) { gameData { classes(faction_id: $factionID, zone_id: $zoneID) { id name slug } } }"
}

operation! {
    GetFactions => Root<Root<Option<Vec<GameFaction>>>>,
    "query GetFactions { gameData { factions { id name } } }"
}

operation! {
    GetItem => Root<Root<Option<GameItem>>>,
    "query GetItem($id: Int!) { gameData { item(id: $id) { id name icon } } }"
}

operation! {
    GetItems => Root<Root<PaginatedResult<GameItem>>>,
    "query GetItems($limit: Int, $page: Int) { gameData { items(limit: $limit, page: $page) { data { id name icon } total per_page current_page from to last_page has_more_pages } } }"
}

operation! {
    GetItemSet => Root<Root<Option<GameItemSet>>>,
    "query GetItemSet($id: Int!) { gameData { item_set(id: $id) { id name } } }"
}

operation! {
    GetItemSets => Root<Root<PaginatedResult<GameItemSet>>>,
    "query GetItemSets($limit: Int, $page: Int) { gameData { item_sets(limit: $limit, page: $page) { data { id name } total per_page current_page from to last_page has_more_pages } } }"
}

operation! {
    GetMap => Root<Root<Option<GameMap>>>,
    "query GetMap($id: Int!) { gameData { map(id: $id) { id name } } }"
}

operation! {
    GetMaps => Root<Root<PaginatedResult<GameMap>>>,
    "query GetMaps($limit: Int, $page: Int) { gameData { maps(limit: $limit, page: $page) { data { id name } total per_page current_page from to last_page has_more_pages } } }"
}

operation! {
    GetNpc => Root<Root<Option<GameNpc>>>,
    "query GetNpc($id: Int!) { gameData { npc(id: $id) { id name } } }"
}

operation! {
    GetNpcs => Root<Root<PaginatedResult<GameNpc>>>,
    "query GetNpcs($limit: Int, $page: Int) { gameData { npcs(limit: $limit, page: $page) { data { id name } total per_page current_page from to last_page has_more_pages } } }"
}

/// Game data queries.
#[derive(Debug, Clone, Copy)]
pub struct GameDataApi<'a> {
    client: &'a EsoLogsClient,
}

impl<'a> GameDataApi<'a> {
    pub(crate) const fn new(client: &'a EsoLogsClient) -> Self {
        Self { client }
    }

    /// Ability by ID.
    #[instrument(skip(self, id))]
    pub async fn ability(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<GameAbility>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetAbility>(vars).await?.0.0)
    }

    /// One page of abilities.
    #[instrument(skip(self))]
    pub async fn abilities(
        &self,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> EsoLogsResult<PaginatedResult<GameAbility>> {
        let mut vars = ParamBundle::new();
        apply_paging(&mut vars, limit, page)?;
        Ok(self.client.fetch::<GetAbilities>(vars).await?.0.0)
    }

    /// Class by ID, optionally scoped to a faction and zone.
    #[instrument(skip(self, id, faction_id, zone_id))]
    pub async fn class(
        &self,
        id: impl Into<NumericId>,
        faction_id: Param<NumericId>,
        zone_id: Param<NumericId>,
    ) -> EsoLogsResult<Option<GameClass>> {
        let mut vars = id_bundle(id, "id")?;
        vars.set("factionID", id_param(faction_id, "factionID")?)
            .set("zoneID", id_param(zone_id, "zoneID")?);
        Ok(self.client.fetch::<GetClass>(vars).await?.0.0)
    }

    /// All classes, optionally scoped to a faction and zone.
    #[instrument(skip(self, faction_id, zone_id))]
    pub async fn classes(
        &self,
        faction_id: Param<NumericId>,
        zone_id: Param<NumericId>,
    ) -> EsoLogsResult<Vec<GameClass>> {
        let mut vars = ParamBundle::new();
        vars.set("factionID", id_param(faction_id, "factionID")?)
            .set("zoneID", id_param(zone_id, "zoneID")?);
        Ok(self
            .client
            .fetch::<GetClasses>(vars)
            .await?
            .0
            .0
            .unwrap_or_default())
    }

    /// All factions.
    #[instrument(skip(self))]
    pub async fn factions(&self) -> EsoLogsResult<Vec<GameFaction>> {
        Ok(self
            .client
            .fetch::<GetFactions>(ParamBundle::new())
            .await?
            .0
            .0
            .unwrap_or_default())
    }

    /// Item by ID.
    #[instrument(skip(self, id))]
    pub async fn item(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<GameItem>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetItem>(vars).await?.0.0)
    }

    /// One page of items.
    #[instrument(skip(self))]
    pub async fn items(
        &self,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> EsoLogsResult<PaginatedResult<GameItem>> {
        let mut vars = ParamBundle::new();
        apply_paging(&mut vars, limit, page)?;
        Ok(self.client.fetch::<GetItems>(vars).await?.0.0)
    }

    /// Item set by ID.
    #[instrument(skip(self, id))]
    pub async fn item_set(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<GameItemSet>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetItemSet>(vars).await?.0.0)
    }

    /// One page of item sets.
    #[instrument(skip(self))]
    pub async fn item_sets(
        &self,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> EsoLogsResult<PaginatedResult<GameItemSet>> {
        let mut vars = ParamBundle::new();
        apply_paging(&mut vars, limit, page)?;
        Ok(self.client.fetch::<GetItemSets>(vars).await?.0.0)
    }

    /// Map by ID.
    #[instrument(skip(self, id))]
    pub async fn map(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<GameMap>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetMap>(vars).await?.0.0)
    }

    /// One page of maps.
    #[instrument(skip(self))]
    pub async fn maps(
        &self,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> EsoLogsResult<PaginatedResult<GameMap>> {
        let mut vars = ParamBundle::new();
        apply_paging(&mut vars, limit, page)?;
        Ok(self.client.fetch::<GetMaps>(vars).await?.0.0)
    }

    /// NPC by ID.
    #[instrument(skip(self, id))]
    pub async fn npc(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<GameNpc>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetNpc>(vars).await?.0.0)
    }

    /// One page of NPCs.
    #[instrument(skip(self))]
    pub async fn npcs(
        &self,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> EsoLogsResult<PaginatedResult<GameNpc>> {
        let mut vars = ParamBundle::new();
        apply_paging(&mut vars, limit, page)?;
        Ok(self.client.fetch::<GetNpcs>(vars).await?.0.0)
    }
}
