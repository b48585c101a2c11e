//! Admin user table: server-side paging and sort, role edits with a
//! dirty-check, single and bulk deletes behind a confirmation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use super::{scope::ViewScope, Confirm, ScopeHandle};
use crate::{
    auth::{dto::PublicUser, Role},
    client::{ApiClient, ClientError},
    users::dto::{DeletedResponse, SortColumn, UserPage, UserQuery, MAX_PAGE_SIZE},
};

/// Backend operations the admin table needs.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self, query: &UserQuery) -> Result<UserPage, ClientError>;
    async fn change_role(&self, id: Uuid, role: Role) -> Result<PublicUser, ClientError>;
    async fn delete_user(&self, id: Uuid) -> Result<DeletedResponse, ClientError>;
    async fn delete_users(&self, ids: &[Uuid]) -> Result<DeletedResponse, ClientError>;
}

#[async_trait]
impl UserDirectory for ApiClient {
    async fn list_users(&self, query: &UserQuery) -> Result<UserPage, ClientError> {
        ApiClient::list_users(self, query).await
    }

    async fn change_role(&self, id: Uuid, role: Role) -> Result<PublicUser, ClientError> {
        ApiClient::change_role(self, id, role).await
    }

    async fn delete_user(&self, id: Uuid) -> Result<DeletedResponse, ClientError> {
        ApiClient::delete_user(self, id).await
    }

    async fn delete_users(&self, ids: &[Uuid]) -> Result<DeletedResponse, ClientError> {
        ApiClient::delete_users(self, ids).await
    }
}

pub struct AdminUsersView<D: UserDirectory> {
    directory: D,
    scope: ViewScope,
    query: UserQuery,
    total_pages: u32,
    rows: Vec<PublicUser>,
    /// Roles as last loaded from the server.
    baseline: HashMap<Uuid, Role>,
    selected: HashSet<Uuid>,
    notice: Option<String>,
}

impl<D: UserDirectory> AdminUsersView<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            scope: ViewScope::new(),
            query: UserQuery::default(),
            total_pages: 0,
            rows: Vec::new(),
            baseline: HashMap::new(),
            selected: HashSet::new(),
            notice: None,
        }
    }

    pub fn with_page_size(directory: D, page_size: u32) -> Self {
        let mut view = Self::new(directory);
        view.query.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        view
    }

    pub fn query(&self) -> &UserQuery {
        &self.query
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn rows(&self) -> &[PublicUser] {
        &self.rows
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected.contains(&id)
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }

    pub async fn load(&mut self) {
        let Some(result) = self.scope.run(self.directory.list_users(&self.query)).await else {
            return;
        };
        match result {
            Ok(page) => {
                self.total_pages = page.total_pages;
                self.baseline = page.users.iter().map(|u| (u.id, u.role)).collect();
                self.selected.retain(|id| self.baseline.contains_key(id));
                self.rows = page.users;
                self.notice = None;
            }
            Err(e) => {
                warn!(error = %e, "user listing failed");
                self.total_pages = 0;
                self.rows.clear();
                self.baseline.clear();
                self.notice = Some(e.user_message());
            }
        }
    }

    /// Reloads after rows went away. Totals come from the page query itself,
    /// so an emptied last page reports nothing; step back until rows show up.
    async fn reload_after_delete(&mut self) {
        self.load().await;
        while self.rows.is_empty() && self.notice.is_none() && self.query.page > 1 {
            self.query.page -= 1;
            self.load().await;
        }
    }

    pub async fn next(&mut self) -> bool {
        if self.query.page >= self.total_pages {
            return false;
        }
        self.query.page += 1;
        self.load().await;
        true
    }

    pub async fn prev(&mut self) -> bool {
        if self.query.page <= 1 {
            return false;
        }
        self.query.page -= 1;
        self.load().await;
        true
    }

    pub async fn set_search(&mut self, search: Option<String>) {
        self.query.search = search.filter(|s| !s.trim().is_empty());
        self.query.page = 1;
        self.load().await;
    }

    pub async fn set_role_filter(&mut self, role: Option<Role>) {
        self.query.role = role;
        self.query.page = 1;
        self.load().await;
    }

    /// Same column flips the direction; another column starts ascending.
    pub async fn toggle_sort(&mut self, column: SortColumn) {
        if self.query.sort == column {
            self.query.order = self.query.order.flipped();
        } else {
            self.query.sort = column;
            self.query.order = Default::default();
        }
        self.query.page = 1;
        self.load().await;
    }

    /// Edits a row's role locally. Nothing is sent until `save_role`.
    pub fn set_role(&mut self, id: Uuid, role: Role) {
        if let Some(row) = self.rows.iter_mut().find(|u| u.id == id) {
            row.role = role;
        }
    }

    pub fn has_user_type_changed(&self, id: Uuid) -> bool {
        match (self.rows.iter().find(|u| u.id == id), self.baseline.get(&id)) {
            (Some(row), Some(original)) => row.role != *original,
            _ => false,
        }
    }

    /// Sends a pending role change after confirmation. Returns whether the
    /// server accepted it.
    pub async fn save_role(&mut self, id: Uuid, confirm: &dyn Confirm) -> bool {
        if !self.has_user_type_changed(id) {
            return false;
        }
        let Some(row) = self.rows.iter().find(|u| u.id == id) else {
            return false;
        };
        let (role, username) = (row.role, row.username.clone());
        if !confirm.confirm(&format!("¿Cambiar el rol de {username} a {role}?")) {
            return false;
        }
        match self.scope.run(self.directory.change_role(id, role)).await {
            Some(Ok(updated)) => {
                info!(%id, role = %updated.role, "role changed");
                self.baseline.insert(id, updated.role);
                self.notice = None;
                true
            }
            Some(Err(e)) => {
                warn!(error = %e, %id, "role change failed");
                self.notice = Some(e.user_message());
                false
            }
            None => false,
        }
    }

    pub fn toggle_selected(&mut self, id: Uuid) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub async fn delete_user(&mut self, id: Uuid, confirm: &dyn Confirm) -> bool {
        let username = match self.rows.iter().find(|u| u.id == id) {
            Some(row) => row.username.clone(),
            None => return false,
        };
        if !confirm.confirm(&format!("¿Eliminar al usuario {username}?")) {
            return false;
        }
        match self.scope.run(self.directory.delete_user(id)).await {
            Some(Ok(_)) => {
                info!(%id, "user deleted");
                self.selected.remove(&id);
                self.reload_after_delete().await;
                true
            }
            Some(Err(e)) => {
                warn!(error = %e, %id, "user delete failed");
                self.notice = Some(e.user_message());
                false
            }
            None => false,
        }
    }

    /// Deletes every selected user after one confirmation.
    pub async fn delete_selected(&mut self, confirm: &dyn Confirm) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        let ids: Vec<Uuid> = self.selected.iter().copied().collect();
        if !confirm.confirm(&format!("¿Eliminar {} usuarios?", ids.len())) {
            return false;
        }
        match self.scope.run(self.directory.delete_users(&ids)).await {
            Some(Ok(res)) => {
                info!(deleted = res.deleted, "users deleted");
                self.selected.clear();
                self.reload_after_delete().await;
                true
            }
            Some(Err(e)) => {
                warn!(error = %e, "bulk delete failed");
                self.notice = Some(e.user_message());
                false
            }
            None => false,
        }
    }
}
