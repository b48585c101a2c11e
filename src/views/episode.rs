use tracing::info;
use uuid::Uuid;

use super::{
    activity::{settle, FanActivity},
    scope::{ScopeHandle, ViewScope},
    Confirm,
};
use crate::{
    comments::{dto::MAX_COMMENT_LEN, repo_types::Comment},
    ratings::dto::{AverageRating, MAX_RATING, MIN_RATING},
};

/// The user-facing state around one episode: its comments, the average
/// rating, the user's own rating and whether they have seen it. Any call
/// that fails leaves a default in place and a notice for the user.
pub struct EpisodeDetail<A: FanActivity> {
    activity: A,
    scope: ViewScope,
    episode_id: i32,
    comments: Vec<Comment>,
    my_rating: Option<i16>,
    average: AverageRating,
    viewed: bool,
    notice: Option<String>,
}

fn unrated(episode_id: i32) -> AverageRating {
    AverageRating {
        episode_id,
        average: 0.0,
        count: 0,
    }
}

impl<A: FanActivity> EpisodeDetail<A> {
    pub fn new(activity: A, episode_id: i32) -> Self {
        Self {
            activity,
            scope: ViewScope::new(),
            episode_id,
            comments: Vec::new(),
            my_rating: None,
            average: unrated(episode_id),
            viewed: false,
            notice: None,
        }
    }

    pub fn episode_id(&self) -> i32 {
        self.episode_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn my_rating(&self) -> Option<i16> {
        self.my_rating
    }

    pub fn average(&self) -> AverageRating {
        self.average
    }

    pub fn is_viewed(&self) -> bool {
        self.viewed
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }

    pub async fn load(&mut self) {
        let id = self.episode_id;
        let activity = &self.activity;
        let Some((comments, mine, average, viewed)) = self
            .scope
            .run(async {
                tokio::join!(
                    activity.comments_for_episode(id),
                    activity.my_rating(id),
                    activity.average_rating(id),
                    activity.viewed_episodes(),
                )
            })
            .await
        else {
            return;
        };

        let mut notice = None;
        self.comments = settle(comments, Vec::new(), "comments", &mut notice);
        self.my_rating = settle(mine, None, "my rating", &mut notice).map(|r| r.value);
        self.average = settle(average, unrated(id), "average rating", &mut notice);
        self.viewed = settle(viewed, Vec::new(), "viewed episodes", &mut notice).contains(&id);
        self.notice = notice;
    }

    /// Rates the episode and refreshes the average. Out-of-range values never
    /// leave the client.
    pub async fn rate(&mut self, value: i16) -> bool {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            self.notice = Some(format!(
                "La valoración debe estar entre {MIN_RATING} y {MAX_RATING}"
            ));
            return false;
        }
        let id = self.episode_id;
        let Some(res) = self.scope.run(self.activity.rate_episode(id, value)).await else {
            return false;
        };
        let mut notice = None;
        let Some(rating) = settle(res.map(Some), None, "rate", &mut notice) else {
            self.notice = notice;
            return false;
        };
        info!(episode_id = id, value = rating.value, "episode rated");
        self.my_rating = Some(rating.value);
        if let Some(avg) = self.scope.run(self.activity.average_rating(id)).await {
            self.average = settle(avg, self.average, "average rating", &mut notice);
        }
        self.notice = notice;
        true
    }

    pub async fn add_comment(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > MAX_COMMENT_LEN {
            self.notice = Some(format!(
                "El comentario debe tener entre 1 y {MAX_COMMENT_LEN} caracteres"
            ));
            return false;
        }
        let Some(res) = self.scope.run(self.activity.add_comment(self.episode_id, text)).await
        else {
            return false;
        };
        let mut notice = None;
        match settle(res.map(Some), None, "add comment", &mut notice) {
            Some(comment) => {
                self.comments.insert(0, comment);
                self.notice = None;
                true
            }
            None => {
                self.notice = notice;
                false
            }
        }
    }

    pub async fn delete_comment(&mut self, id: Uuid, confirm: &dyn Confirm) -> bool {
        if !self.comments.iter().any(|c| c.id == id) {
            return false;
        }
        if !confirm.confirm("¿Eliminar este comentario?") {
            return false;
        }
        let Some(res) = self.scope.run(self.activity.delete_comment(id)).await else {
            return false;
        };
        let mut notice = None;
        let deleted = settle(res.map(|()| true), false, "delete comment", &mut notice);
        if deleted {
            self.comments.retain(|c| c.id != id);
        }
        self.notice = notice;
        deleted
    }

    /// Marks the episode viewed, or unmarks it if it already was.
    pub async fn toggle_viewed(&mut self) -> bool {
        let id = self.episode_id;
        let call = async {
            if self.viewed {
                self.activity.unmark_viewed(id).await
            } else {
                self.activity.mark_viewed(id).await
            }
        };
        let Some(res) = self.scope.run(call).await else {
            return false;
        };
        let mut notice = None;
        let done = settle(res.map(|()| true), false, "toggle viewed", &mut notice);
        if done {
            self.viewed = !self.viewed;
        }
        self.notice = notice;
        done
    }
}
