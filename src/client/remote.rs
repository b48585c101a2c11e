//! Client for the public, read-only character/episode/location API.

use std::collections::HashSet;

use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{
    read_json,
    remote_types::{
        Character, CharacterFilter, Episode, EpisodeFilter, Listing, Location, LocationFilter,
        OneOrMany, Page, QueryFilter,
    },
    ClientError,
};

/// A collection served by the upstream API.
pub trait Resource: DeserializeOwned + Send {
    const PATH: &'static str;
    type Filter: QueryFilter + Clone + Default + Send + Sync;
}

impl Resource for Character {
    const PATH: &'static str = "character";
    type Filter = CharacterFilter;
}

impl Resource for Episode {
    const PATH: &'static str = "episode";
    type Filter = EpisodeFilter;
}

impl Resource for Location {
    const PATH: &'static str = "location";
    type Filter = LocationFilter;
}

#[derive(Clone)]
pub struct RemoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// One page of `R`, filtered. Pages are 1-indexed.
    #[instrument(skip(self, filter), fields(resource = R::PATH))]
    pub async fn list<R: Resource>(
        &self,
        page: u32,
        filter: &R::Filter,
    ) -> Result<Page<R>, ClientError> {
        let mut query = vec![("page", page.max(1).to_string())];
        query.extend(filter.pairs());
        let res = self
            .client
            .get(self.url(R::PATH))
            .query(&query)
            .send()
            .await?;
        let listing: Listing<R> = read_json(res).await?;
        debug!(page, pages = listing.info.pages, "page fetched");
        Ok(listing.into())
    }

    /// Resolves ids to records. Always a sequence, whatever the upstream shape.
    #[instrument(skip(self, ids), fields(resource = R::PATH, n = ids.len()))]
    pub async fn by_ids<R: Resource>(&self, ids: &[i32]) -> Result<Vec<R>, ClientError> {
        let path = match ids {
            [] => return Ok(Vec::new()),
            [id] => format!("{}/{}", R::PATH, id),
            many => {
                let joined = many
                    .iter()
                    .map(i32::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}/{}", R::PATH, joined)
            }
        };
        let res = self.client.get(self.url(&path)).send().await?;
        let body: OneOrMany<R> = read_json(res).await?;
        Ok(body.into())
    }

    /// Total number of records of `R`.
    pub async fn count<R: Resource>(&self) -> Result<u32, ClientError> {
        let res = self.client.get(self.url(R::PATH)).send().await?;
        let listing: Listing<serde_json::Value> = read_json(res).await?;
        Ok(listing.info.count)
    }

    /// `n` distinct random records of `R`.
    pub async fn random<R: Resource>(&self, n: usize) -> Result<Vec<R>, ClientError> {
        let count = self.count::<R>().await?;
        let ids = sample_unique_ids(&mut rand::thread_rng(), n, count);
        self.by_ids::<R>(&ids).await
    }

    pub async fn list_characters(
        &self,
        page: u32,
        filter: &CharacterFilter,
    ) -> Result<Page<Character>, ClientError> {
        self.list::<Character>(page, filter).await
    }

    pub async fn list_episodes(
        &self,
        page: u32,
        filter: &EpisodeFilter,
    ) -> Result<Page<Episode>, ClientError> {
        self.list::<Episode>(page, filter).await
    }

    pub async fn list_locations(
        &self,
        page: u32,
        filter: &LocationFilter,
    ) -> Result<Page<Location>, ClientError> {
        self.list::<Location>(page, filter).await
    }

    pub async fn characters_by_ids(&self, ids: &[i32]) -> Result<Vec<Character>, ClientError> {
        self.by_ids(ids).await
    }

    pub async fn episodes_by_ids(&self, ids: &[i32]) -> Result<Vec<Episode>, ClientError> {
        self.by_ids(ids).await
    }

    pub async fn locations_by_ids(&self, ids: &[i32]) -> Result<Vec<Location>, ClientError> {
        self.by_ids(ids).await
    }

    pub async fn random_characters(&self, n: usize) -> Result<Vec<Character>, ClientError> {
        self.random(n).await
    }

    pub async fn random_episodes(&self, n: usize) -> Result<Vec<Episode>, ClientError> {
        self.random(n).await
    }

    pub async fn random_locations(&self, n: usize) -> Result<Vec<Location>, ClientError> {
        self.random(n).await
    }
}

/// Draws ids from `[1, count]` until `n` distinct ones are collected, keeping
/// draw order. Asking for `count` or more returns every id.
pub fn sample_unique_ids<G: Rng + ?Sized>(rng: &mut G, n: usize, count: u32) -> Vec<i32> {
    let count = count.min(i32::MAX as u32) as i32;
    if count <= 0 || n == 0 {
        return Vec::new();
    }
    if n >= count as usize {
        return (1..=count).collect();
    }
    let mut seen = HashSet::with_capacity(n);
    let mut ids = Vec::with_capacity(n);
    while ids.len() < n {
        let candidate = rng.gen_range(1..=count);
        if seen.insert(candidate) {
            ids.push(candidate);
        }
    }
    ids
}
