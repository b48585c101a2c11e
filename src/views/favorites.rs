use std::collections::BTreeSet;

use tracing::info;

use super::{
    activity::{settle, FanActivity},
    scope::ViewScope,
};

/// Favorite character ids of the signed-in user, for marking list rows and
/// toggling the star. Empty when signed out or when the backend is down.
pub struct FavoriteSet<A: FanActivity> {
    activity: A,
    scope: ViewScope,
    ids: BTreeSet<i32>,
    notice: Option<String>,
}

impl<A: FanActivity> FavoriteSet<A> {
    pub fn new(activity: A) -> Self {
        Self {
            activity,
            scope: ViewScope::new(),
            ids: BTreeSet::new(),
            notice: None,
        }
    }

    pub fn contains(&self, character_id: i32) -> bool {
        self.ids.contains(&character_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.ids.iter().copied()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }

    pub async fn load(&mut self) {
        let Some(res) = self.scope.run(self.activity.favorite_ids()).await else {
            return;
        };
        let mut notice = None;
        self.ids = settle(res, Vec::new(), "favorites", &mut notice)
            .into_iter()
            .collect();
        self.notice = notice;
    }

    /// Adds or removes the star. Returns whether the character is now a
    /// favorite; on failure the local set is left as it was.
    pub async fn toggle(&mut self, character_id: i32) -> bool {
        let was = self.contains(character_id);
        let call = async {
            if was {
                self.activity.remove_favorite(character_id).await
            } else {
                self.activity.add_favorite(character_id).await
            }
        };
        let Some(res) = self.scope.run(call).await else {
            return was;
        };
        let mut notice = None;
        if settle(res.map(|()| true), false, "toggle favorite", &mut notice) {
            if was {
                self.ids.remove(&character_id);
            } else {
                self.ids.insert(character_id);
            }
            info!(character_id, favorite = !was, "favorite toggled");
        }
        self.notice = notice;
        self.contains(character_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{ApiClient, Session},
        views::activity::{fake::FakeActivity, unreachable_api},
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn unreachable_backend_leaves_an_empty_set() {
        let mut favs = FavoriteSet::new(unreachable_api());
        favs.load().await;
        assert_eq!(favs.ids().count(), 0);
        assert!(favs.notice().is_some());

        assert!(!favs.toggle(1).await);
        assert!(!favs.contains(1));
    }

    #[tokio::test]
    async fn signed_out_user_has_no_favorites_and_no_notice() {
        let api = ApiClient::new("http://127.0.0.1:1/api/v1", Arc::new(Session::in_memory()));
        let mut favs = FavoriteSet::new(api);
        favs.load().await;
        assert_eq!(favs.ids().count(), 0);
        assert!(favs.notice().is_none());
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let fake = FakeActivity::default();
        fake.favorites.lock().insert(5);
        let mut favs = FavoriteSet::new(fake);
        favs.load().await;
        assert!(favs.contains(5));

        assert!(favs.toggle(8).await);
        assert!(!favs.toggle(5).await);
        assert_eq!(favs.ids().collect::<Vec<_>>(), vec![8]);
        assert_eq!(
            favs.activity.favorites.lock().iter().copied().collect::<Vec<_>>(),
            vec![8]
        );
    }
}
