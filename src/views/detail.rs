//! Resolving the secondary collections a detail view shows: the episodes a
//! character appears in, the cast of an episode, the residents of a location.

use std::collections::HashSet;

use tracing::warn;

use super::scope::ViewScope;
use crate::client::{
    remote::Resource,
    remote_types::{Character, Episode, Location},
    RemoteClient,
};

/// Trailing numeric id of each resource URL, deduplicated in first-seen order.
/// URLs that don't end in a number are skipped.
pub fn ids_from_urls(urls: &[String]) -> Vec<i32> {
    let mut seen = HashSet::new();
    urls.iter()
        .filter_map(|url| {
            let last = url.trim_end_matches('/').rsplit('/').next()?;
            last.parse::<i32>().ok()
        })
        .filter(|id| seen.insert(*id))
        .collect()
}

async fn resolve<R: Resource>(
    client: &RemoteClient,
    scope: &ViewScope,
    urls: &[String],
) -> Vec<R> {
    let ids = ids_from_urls(urls);
    if ids.is_empty() {
        return Vec::new();
    }
    match scope.run(client.by_ids::<R>(&ids)).await {
        Some(Ok(items)) => items,
        Some(Err(e)) => {
            warn!(error = %e, resource = R::PATH, "detail lookup failed");
            Vec::new()
        }
        None => Vec::new(),
    }
}

pub async fn episodes_of(
    client: &RemoteClient,
    scope: &ViewScope,
    character: &Character,
) -> Vec<Episode> {
    resolve(client, scope, &character.episode).await
}

pub async fn characters_of(
    client: &RemoteClient,
    scope: &ViewScope,
    episode: &Episode,
) -> Vec<Character> {
    resolve(client, scope, &episode.characters).await
}

pub async fn residents_of(
    client: &RemoteClient,
    scope: &ViewScope,
    location: &Location,
) -> Vec<Character> {
    resolve(client, scope, &location.residents).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, routing::get, Json, Router};
    use serde_json::{json, Value};

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn location(residents: Vec<String>) -> Location {
        Location {
            id: 1,
            name: "Earth".into(),
            kind: "Planet".into(),
            dimension: "C-137".into(),
            residents,
            url: String::new(),
            created: String::new(),
        }
    }

    async fn spawn_upstream() -> String {
        let app = Router::new().route(
            "/api/episode/:ids",
            get(|Path(ids): Path<String>| async move {
                let eps: Vec<Value> = ids
                    .split(',')
                    .filter_map(|s| s.parse::<i32>().ok())
                    .map(|id| json!({"id": id, "name": format!("Episode {id}"), "episode": "S01E01"}))
                    .collect();
                if eps.len() == 1 {
                    Json(eps[0].clone())
                } else {
                    Json(Value::Array(eps))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    #[test]
    fn ids_take_trailing_segment() {
        let ids = ids_from_urls(&urls(&[
            "https://example.test/api/episode/1",
            "https://example.test/api/episode/28/",
            "https://example.test/api/episode/7",
        ]));
        assert_eq!(ids, vec![1, 28, 7]);
    }

    #[test]
    fn ids_skip_non_numeric_and_duplicates() {
        let ids = ids_from_urls(&urls(&[
            "https://example.test/api/character/3",
            "https://example.test/api/character/abc",
            "",
            "https://example.test/api/character/3",
            "https://example.test/api/character/2",
        ]));
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn episodes_resolve_through_by_ids() {
        let client = RemoteClient::new(spawn_upstream().await);
        let scope = ViewScope::new();
        let rick: Character = serde_json::from_value(json!({
            "id": 1,
            "name": "Rick",
            "status": "Alive",
            "species": "Human",
            "gender": "Male",
            "episode": [
                "https://example.test/api/episode/1",
                "https://example.test/api/episode/2",
                "https://example.test/api/episode/1",
            ],
        }))
        .unwrap();

        let eps = episodes_of(&client, &scope, &rick).await;
        assert_eq!(eps.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn unreachable_upstream_degrades_to_empty() {
        let client = RemoteClient::new("http://127.0.0.1:1/api");
        let scope = ViewScope::new();
        let loc = location(urls(&["https://example.test/api/character/1"]));
        assert!(residents_of(&client, &scope, &loc).await.is_empty());
    }

    #[tokio::test]
    async fn closed_scope_resolves_nothing() {
        let client = RemoteClient::new(spawn_upstream().await);
        let scope = ViewScope::new();
        scope.teardown();
        let ep: Episode = serde_json::from_value(json!({
            "id": 1,
            "name": "Pilot",
            "episode": "S01E01",
            "characters": ["https://example.test/api/character/1"],
        }))
        .unwrap();
        assert!(characters_of(&client, &scope, &ep).await.is_empty());
    }
}
