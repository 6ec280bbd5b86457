use chrono::Utc;
use diesel::prelude::*;

use crate::domain::preferences::UserPreferences;
use crate::domain::types::UserId;
use crate::models::preferences::UserPreferences as DbUserPreferences;
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, PreferencesReader, PreferencesWriter};
use crate::schema::user_preferences;

impl PreferencesReader for DieselRepository {
    fn get_preferences(&self, user_id: &UserId) -> RepositoryResult<Option<UserPreferences>> {
        let mut conn = self.conn()?;
        let preferences = user_preferences::table
            .find(user_id.as_str())
            .first::<DbUserPreferences>(&mut conn)
            .optional()?;

        Ok(preferences.map(UserPreferences::try_from).transpose()?)
    }
}

impl PreferencesWriter for DieselRepository {
    fn save_preferences(&self, preferences: &UserPreferences) -> RepositoryResult<UserPreferences> {
        let mut conn = self.conn()?;
        let row = DbUserPreferences::from_domain(preferences, Utc::now().naive_utc());

        let saved = diesel::insert_into(user_preferences::table)
            .values(&row)
            .on_conflict(user_preferences::user_id)
            .do_update()
            .set(&row)
            .get_result::<DbUserPreferences>(&mut conn)?;

        Ok(UserPreferences::try_from(saved)?)
    }
}
