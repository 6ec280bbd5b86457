//! Per-user preference workflows.

use chrono::Utc;

use crate::auth::AuthenticatedUser;
use crate::domain::preferences::UserPreferences;
use crate::domain::types::UserId;
use crate::forms::preferences::PreferencesUpdate;
use crate::repository::{PreferencesReader, PreferencesWriter};
use crate::services::ServiceResult;

/// Stored preferences of `user_id`, or the defaults when none were saved.
pub fn load_preferences<R>(repo: &R, user_id: &UserId) -> ServiceResult<UserPreferences>
where
    R: PreferencesReader + ?Sized,
{
    let stored = repo.get_preferences(user_id).map_err(|err| {
        log::error!("Failed to load preferences for {user_id}: {err}");
        err
    })?;
    Ok(stored.unwrap_or_else(|| UserPreferences::defaults(user_id.clone())))
}

pub fn get_preferences<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<UserPreferences>
where
    R: PreferencesReader + ?Sized,
{
    let user_id = user.user_id()?;
    load_preferences(repo, &user_id)
}

/// Applies a partial update and upserts the result.
pub fn update_preferences<R>(
    repo: &R,
    user: &AuthenticatedUser,
    update: PreferencesUpdate,
) -> ServiceResult<UserPreferences>
where
    R: PreferencesReader + PreferencesWriter + ?Sized,
{
    let user_id = user.user_id()?;
    let mut preferences = load_preferences(repo, &user_id)?;
    update.apply(&mut preferences)?;
    preferences.updated_at = Some(Utc::now().naive_utc());

    let saved = repo.save_preferences(&preferences).map_err(|err| {
        log::error!("Failed to save preferences: {err}");
        err
    })?;
    Ok(saved)
}
