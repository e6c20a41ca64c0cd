//! World data: zones, encounters, expansions, regions, servers.

use tracing::instrument;

use super::{id_bundle, id_param, operation};
use crate::client::EsoLogsClient;
use crate::error::EsoLogsResult;
use crate::models::{Encounter, Expansion, Region, Root, Server, Zone};
use crate::params::{NumericId, Param, ParamBundle, validate_non_empty};

operation! {
    GetZone => Root<Root<Option<Zone>>>,
    "query GetZone($id: Int!) { worldData { zone(id: $id) { id name frozen expansion { id name } difficulties { id name sizes } encounters { id name } brackets { min max bucket type } } } }"
}

operation! {
    GetZones => Root<Root<Option<Vec<Zone>>>>,
    "query GetZones($expansionID: Int) { worldData { zones(expansion_id: $expansionID) { id name frozen expansion { id name } difficulties { id name sizes } encounters { id name } brackets { min max bucket type } } } }"
}

operation! {
    GetEncounter => Root<Root<Option<Encounter>>>,
    "query GetEncounter($id: Int!) { worldData { encounter(id: $id) { id name zone { id name } } } }"
}

operation! {
    GetExpansions => Root<Root<Option<Vec<Expansion>>>>,
    "query GetExpansions { worldData { expansions { id name zones { id name } } } }"
}

operation! {
    GetRegions => Root<Root<Option<Vec<Region>>>>,
    "query GetRegions { worldData { regions { id name compactName slug } } }"
}

operation! {
    GetRegion => Root<Root<Option<Region>>>,
    "query GetRegion($id: Int!) { worldData { region(id: $id) { id name compactName slug } } }"
}

operation! {
    GetServer => Root<Root<Option<Server>>>,
    "query GetServer($id: Int, $region: String, $slug: String) { worldData { server(id: $id, region: $region, slug: $slug) { id name normalizedName slug region { id name compactName slug } } } }"
}

/// World data queries.
#[derive(Debug, Clone, Copy)]
pub struct WorldDataApi<'a> {
    client: &'a EsoLogsClient,
}

impl<'a> WorldDataApi<'a> {
    pub(crate) const fn new(client: &'a EsoLogsClient) -> Self {
        Self { client }
    }

    /// Zone by ID.
    #[instrument(skip(self, id))]
    pub async fn zone(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<Zone>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetZone>(vars).await?.0.0)
    }

    /// All zones, optionally for one expansion.
    #[instrument(skip(self, expansion_id))]
    pub async fn zones(&self, expansion_id: Param<NumericId>) -> EsoLogsResult<Vec<Zone>> {
        let mut vars = ParamBundle::new();
        vars.set("expansionID", id_param(expansion_id, "expansionID")?);
        Ok(self
            .client
            .fetch::<GetZones>(vars)
            .await?
            .0
            .0
            .unwrap_or_default())
    }

    /// Encounter by ID.
    #[instrument(skip(self, id))]
    pub async fn encounter(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<Encounter>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetEncounter>(vars).await?.0.0)
    }

    /// All expansions.
    #[instrument(skip(self))]
    pub async fn expansions(&self) -> EsoLogsResult<Vec<Expansion>> {
        Ok(self
            .client
            .fetch::<GetExpansions>(ParamBundle::new())
            .await?
            .0
            .0
            .unwrap_or_default())
    }

    /// All regions.
    #[instrument(skip(self))]
    pub async fn regions(&self) -> EsoLogsResult<Vec<Region>> {
        Ok(self
            .client
            .fetch::<GetRegions>(ParamBundle::new())
            .await?
            .0
            .0
            .unwrap_or_default())
    }

    /// Region by ID.
    #[instrument(skip(self, id))]
    pub async fn region(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<Region>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetRegion>(vars).await?.0.0)
    }

    /// Server by ID.
    #[instrument(skip(self, id))]
    pub async fn server(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<Server>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetServer>(vars).await?.0.0)
    }

    /// Server by region and slug.
    #[instrument(skip(self))]
    pub async fn server_by_slug(&self, region: &str, slug: &str) -> EsoLogsResult<Option<Server>> {
        let mut vars = ParamBundle::new();
        vars.insert("region", validate_non_empty(region, "region")?)
            .insert("slug", validate_non_empty(slug, "slug")?);
        Ok(self.client.fetch::<GetServer>(vars).await?.0.0)
    }
}
