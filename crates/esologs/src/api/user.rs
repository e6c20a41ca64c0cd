//! Site users.

use tracing::instrument;

use super::{id_bundle, operation};
use crate::client::EsoLogsClient;
use crate::error::EsoLogsResult;
use crate::models::{Root, User};
use crate::params::{NumericId, ParamBundle};

operation! {
    GetCurrentUser => Root<Root<Option<User>>>,
    "query GetCurrentUser { userData { currentUser { id name guilds { id name } characters { id name } } } }"
}

operation! {
    GetUser => Root<Root<Option<User>>>,
    "query GetUser($id: Int!) { userData { user(id: $id) { id name guilds { id name } characters { id name } } } }"
}

/// User queries.
#[derive(Debug, Clone, Copy)]
pub struct UserApi<'a> {
    client: &'a EsoLogsClient,
}

impl<'a> UserApi<'a> {
    pub(crate) const fn new(client: &'a EsoLogsClient) -> Self {
        Self { client }
    }

    /// The user who authorized the client. Fails with a configuration
    /// error on an app-mode client.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> EsoLogsResult<Option<User>> {
        self.client.require_user_mode("current_user")?;
        Ok(self
            .client
            .fetch::<GetCurrentUser>(ParamBundle::new())
            .await?
            .0
            .0)
    }

    /// User by ID. Guilds and characters are only filled in for the
    /// authorized user.
    #[instrument(skip(self, id))]
    pub async fn by_id(&self, id: impl Into<NumericId>) -> EsoLogsResult<Option<User>> {
        let vars = id_bundle(id, "id")?;
        Ok(self.client.fetch::<GetUser>(vars).await?.0.0)
    }
}
