use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::scope::{ScopeHandle, ViewScope};
use crate::client::{
    remote::Resource,
    remote_types::{Character, Episode, Location, Page},
    ClientError, RemoteClient,
};

/// Where a list view gets its pages from.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;
    type Filter: Clone + Default + Send + Sync;

    async fn fetch(&self, page: u32, filter: &Self::Filter)
        -> Result<Page<Self::Item>, ClientError>;
}

/// Pages of one upstream collection.
pub struct RemotePages<R> {
    client: RemoteClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> RemotePages<R> {
    pub fn new(client: RemoteClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Resource + 'static> PageSource for RemotePages<R> {
    type Item = R;
    type Filter = R::Filter;

    async fn fetch(&self, page: u32, filter: &R::Filter) -> Result<Page<R>, ClientError> {
        self.client.list::<R>(page, filter).await
    }
}

pub type CharacterPages = RemotePages<Character>;
pub type EpisodePages = RemotePages<Episode>;
pub type LocationPages = RemotePages<Location>;

pub type CharacterList = ListView<CharacterPages>;
pub type EpisodeList = ListView<EpisodePages>;
pub type LocationList = ListView<LocationPages>;

/// Paginated, filterable list state for one view.
pub struct ListView<S: PageSource> {
    source: S,
    scope: ViewScope,
    page: u32,
    total_pages: u32,
    filter: S::Filter,
    items: Vec<S::Item>,
    notice: Option<String>,
}

impl<S: PageSource> ListView<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            scope: ViewScope::new(),
            page: 1,
            total_pages: 0,
            filter: S::Filter::default(),
            items: Vec::new(),
            notice: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn filter(&self) -> &S::Filter {
        &self.filter
    }

    pub fn items(&self) -> &[S::Item] {
        &self.items
    }

    /// Last failure, worded for the user.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }

    /// Fetches the current page. Failures leave an empty slice behind;
    /// a torn-down view is left untouched.
    pub async fn load(&mut self) {
        let Some(result) = self
            .scope
            .run(self.source.fetch(self.page, &self.filter))
            .await
        else {
            debug!(page = self.page, "load abandoned, view closed");
            return;
        };
        match result {
            Ok(page) => {
                self.total_pages = page.total_pages;
                self.items = page.results;
                self.notice = None;
            }
            Err(e) => {
                warn!(error = %e, page = self.page, "page load failed");
                self.total_pages = 0;
                self.items.clear();
                // A 404 from a filter with no matches is an empty state, not an error.
                self.notice = match e.status() {
                    Some(reqwest::StatusCode::NOT_FOUND) => None,
                    _ => Some(e.user_message()),
                };
            }
        }
    }

    /// Moves forward one page. No-op on the last page.
    pub async fn next(&mut self) -> bool {
        if self.page >= self.total_pages {
            return false;
        }
        self.page += 1;
        self.load().await;
        true
    }

    /// Moves back one page. No-op on the first page.
    pub async fn prev(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        self.load().await;
        true
    }

    pub async fn set_filter(&mut self, filter: S::Filter) {
        self.filter = filter;
        self.page = 1;
        self.load().await;
    }

    pub async fn update_filter(&mut self, f: impl FnOnce(&mut S::Filter)) {
        f(&mut self.filter);
        self.page = 1;
        self.load().await;
    }

    /// Items of the current slice matching `pred`, without refetching.
    pub fn filter_items(&self, pred: impl Fn(&S::Item) -> bool) -> Vec<&S::Item> {
        self.items.iter().filter(|i| pred(i)).collect()
    }

    pub fn sort_items_by<K: Ord>(&mut self, key: impl FnMut(&S::Item) -> K) {
        self.items.sort_by_key(key);
    }
}

/// Groups episodes by season code, seasons in first-seen order.
pub fn group_by_season(episodes: &[Episode]) -> Vec<(String, Vec<&Episode>)> {
    let mut groups: Vec<(String, Vec<&Episode>)> = Vec::new();
    for ep in episodes {
        let code = ep.season_code();
        match groups.iter().position(|(c, _)| c == code) {
            Some(i) => groups[i].1.push(ep),
            None => groups.push((code.to_string(), vec![ep])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::remote_types::CharacterFilter;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Serves `total_pages` pages of two numbers each and records every request.
    struct FakePages {
        total_pages: u32,
        calls: Arc<Mutex<Vec<(u32, CharacterFilter)>>>,
        fail: bool,
    }

    #[async_trait]
    impl PageSource for FakePages {
        type Item = u32;
        type Filter = CharacterFilter;

        async fn fetch(&self, page: u32, filter: &CharacterFilter) -> Result<Page<u32>, ClientError> {
            self.calls.lock().push((page, filter.clone()));
            if self.fail {
                return Err(ClientError::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    body: String::new(),
                });
            }
            Ok(Page {
                results: vec![page * 2 - 1, page * 2],
                total_pages: self.total_pages,
                count: self.total_pages * 2,
            })
        }
    }

    fn view(total_pages: u32) -> (ListView<FakePages>, Arc<Mutex<Vec<(u32, CharacterFilter)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let source = FakePages {
            total_pages,
            calls: calls.clone(),
            fail: false,
        };
        (ListView::new(source), calls)
    }

    #[tokio::test]
    async fn next_and_prev_move_one_page_with_one_reload() {
        let (mut v, calls) = view(3);
        v.load().await;
        assert_eq!(v.items(), &[1, 2]);

        assert!(v.next().await);
        assert_eq!(v.page(), 2);
        assert_eq!(calls.lock().len(), 2);

        assert!(v.prev().await);
        assert_eq!(v.page(), 1);
        assert_eq!(calls.lock().len(), 3);
    }

    #[tokio::test]
    async fn paging_is_a_no_op_at_the_edges() {
        let (mut v, calls) = view(2);
        v.load().await;
        assert!(!v.prev().await);
        assert_eq!(v.page(), 1);

        assert!(v.next().await);
        assert!(!v.next().await);
        assert_eq!(v.page(), 2);
        assert_eq!(calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn next_before_first_load_does_nothing() {
        let (mut v, calls) = view(5);
        assert!(!v.next().await);
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn filter_change_resets_to_first_page() {
        let (mut v, calls) = view(4);
        v.load().await;
        v.next().await;
        v.next().await;
        assert_eq!(v.page(), 3);

        v.update_filter(|f| f.status = Some("alive".into())).await;
        assert_eq!(v.page(), 1);
        let (page, filter) = calls.lock().last().cloned().unwrap();
        assert_eq!(page, 1);
        assert_eq!(filter.status.as_deref(), Some("alive"));
    }

    #[tokio::test]
    async fn failed_load_falls_back_to_empty() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut v = ListView::new(FakePages {
            total_pages: 3,
            calls,
            fail: true,
        });
        v.load().await;
        assert!(v.items().is_empty());
        assert_eq!(v.total_pages(), 0);
        assert!(v.notice().is_some());
    }

    #[tokio::test]
    async fn torn_down_view_ignores_loads() {
        let (mut v, calls) = view(3);
        v.teardown();
        v.load().await;
        assert!(v.items().is_empty());
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn local_filter_and_sort() {
        let (mut v, _) = view(1);
        v.load().await;
        assert_eq!(v.filter_items(|n| n % 2 == 0), vec![&2]);
        v.sort_items_by(|n| std::cmp::Reverse(*n));
        assert_eq!(v.items(), &[2, 1]);
    }

    #[test]
    fn episodes_group_by_season() {
        let ep = |id: i32, code: &str| Episode {
            id,
            name: format!("ep {id}"),
            air_date: String::new(),
            episode: code.into(),
            characters: vec![],
            url: String::new(),
            created: String::new(),
        };
        let eps = vec![ep(1, "S01E01"), ep(2, "S01E02"), ep(12, "S02E01"), ep(3, "S01E03")];
        let groups = group_by_season(&eps);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "S01");
        assert_eq!(groups[0].1.len(), 3);
        assert_eq!(groups[1].0, "S02");
    }
}
