//! View-state controllers. Each one owns its own page, filter and
//! cancellation scope; rendering is left to whoever drives them.

pub mod activity;
pub mod admin;
pub mod auth_flow;
pub mod detail;
pub mod episode;
pub mod favorites;
pub mod list;
pub mod scope;

pub use activity::FanActivity;
pub use admin::{AdminUsersView, UserDirectory};
pub use auth_flow::{AuthFlow, AuthState, Authenticator, Landing};
pub use episode::EpisodeDetail;
pub use favorites::FavoriteSet;
pub use list::{
    CharacterList, CharacterPages, EpisodeList, EpisodePages, ListView, LocationList,
    LocationPages, PageSource, RemotePages,
};
pub use scope::{ScopeHandle, ViewScope};

/// Asks the user to confirm a destructive or privileged action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
