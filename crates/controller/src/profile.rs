//! Signed-in user's profile.

use std::sync::Arc;

use client_core::BackendApi;
use shared::protocol::{UpdateProfileRequest, UserProfile};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    has_token,
    messages::{UiError, UiErrorContext},
    store::{until_cancelled, LatestTask, Store, TaskScope},
    INVALID_TOKEN_MESSAGE,
};

pub const UPDATED_MESSAGE: &str = "Profile updated.";
pub const NOTHING_TO_UPDATE_MESSAGE: &str = "Nothing to update.";
pub const EMPTY_USERNAME_MESSAGE: &str = "Username must not be empty.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileState {
    pub profile: Option<UserProfile>,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    pub session_expired: bool,
}

#[derive(Debug, Clone)]
pub enum ProfileEvent {
    LoadStarted,
    Loaded(UserProfile),
    SaveStarted,
    Saved(UserProfile),
    Failed(UiError),
    ClearMessages,
}

pub fn reduce(mut state: ProfileState, event: ProfileEvent) -> ProfileState {
    match event {
        ProfileEvent::LoadStarted => {
            state.loading = true;
            state.error = None;
            state
        }
        ProfileEvent::Loaded(profile) => {
            state.profile = Some(profile);
            state.loading = false;
            state
        }
        ProfileEvent::SaveStarted => {
            state.saving = true;
            state.error = None;
            state.success = None;
            state
        }
        ProfileEvent::Saved(profile) => {
            state.profile = Some(profile);
            state.saving = false;
            state.success = Some(UPDATED_MESSAGE.to_string());
            state
        }
        ProfileEvent::Failed(err) => {
            state.loading = false;
            state.saving = false;
            state.session_expired |= err.requires_reauth();
            state.error = Some(err.into_message());
            state
        }
        ProfileEvent::ClearMessages => {
            state.error = None;
            state.success = None;
            state
        }
    }
}

pub struct ProfileController {
    backend: Arc<dyn BackendApi>,
    store: Store<ProfileState>,
    scope: TaskScope,
    loads: LatestTask,
}

impl ProfileController {
    pub fn new(backend: Arc<dyn BackendApi>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            store: Store::new(ProfileState::default()),
            scope: TaskScope::new(),
            loads: LatestTask::default(),
        })
    }

    pub fn state(&self) -> ProfileState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.store.subscribe()
    }

    pub async fn load(&self, token: &str) {
        if self.scope.is_shut_down() {
            return;
        }
        if !has_token(token) {
            self.reject(UiErrorContext::Profile, INVALID_TOKEN_MESSAGE);
            return;
        }

        let task = self.loads.restart(&self.scope);
        self.store.dispatch(reduce, ProfileEvent::LoadStarted);
        let event = match until_cancelled(&task, self.backend.profile(token)).await {
            None => return,
            Some(Ok(profile)) => ProfileEvent::Loaded(profile),
            Some(Err(err)) => {
                let ui = UiError::from_client_error(UiErrorContext::Profile, &err);
                warn!(error = %err, "profile fetch failed");
                ProfileEvent::Failed(ui)
            }
        };
        self.store.dispatch_unless_cancelled(&task, reduce, event);
    }

    /// Sends the changed fields; the server's response becomes the profile.
    pub async fn update(&self, token: &str, update: &UpdateProfileRequest) {
        if self.scope.is_shut_down() {
            return;
        }
        let context = UiErrorContext::UpdateProfile;
        if update.is_empty() {
            self.reject(context, NOTHING_TO_UPDATE_MESSAGE);
            return;
        }
        if update
            .username
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            self.reject(context, EMPTY_USERNAME_MESSAGE);
            return;
        }
        if !has_token(token) {
            self.reject(context, INVALID_TOKEN_MESSAGE);
            return;
        }

        let task = self.scope.child();
        self.store.dispatch(reduce, ProfileEvent::SaveStarted);
        let event = match until_cancelled(&task, self.backend.update_profile(token, update)).await {
            None => return,
            Some(Ok(profile)) => {
                info!(user_id = %profile.id, "profile updated");
                ProfileEvent::Saved(profile)
            }
            Some(Err(err)) => {
                let ui = UiError::from_client_error(context, &err);
                warn!(error = %err, "profile update failed");
                ProfileEvent::Failed(ui)
            }
        };
        self.store.dispatch_unless_cancelled(&task, reduce, event);
    }

    pub fn clear_messages(&self) {
        self.store.dispatch(reduce, ProfileEvent::ClearMessages);
    }

    pub fn shutdown(&self) {
        self.scope.shutdown();
    }

    fn reject(&self, context: UiErrorContext, message: &str) {
        let err = UiError::validation(context, message);
        self.store.dispatch(reduce, ProfileEvent::Failed(err));
    }
}

#[cfg(test)]
#[path = "tests/profile_tests.rs"]
mod tests;
