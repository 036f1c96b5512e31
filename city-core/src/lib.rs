//! Core library for the weather app's current city.
//!
//! This crate defines:
//! - The current-city store (lazy load, write-back, change listeners)
//! - Durable key-value preferences it is backed by
//! - The input path that turns typed text into a city update
//!
//! It is used by `city-cli`, but any front end can construct a store once
//! and hand it to whatever needs the city.

pub mod edit;
pub mod error;
pub mod prefs;
pub mod store;

pub use edit::{CityEditPresenter, EditOutcome};
pub use error::{EditError, PrefsError};
pub use prefs::{FilePreferences, MemoryPreferences, Preferences};
pub use store::{
    CITY_KEY, CityListener, CurrentCityManager, CurrentCityStore, DEFAULT_CITY, PREFERENCE_NAME,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_survives_a_new_store_on_the_same_directory() {
        let dir = tempfile::tempdir().unwrap();

        let first =
            CurrentCityStore::new(FilePreferences::open(dir.path(), PREFERENCE_NAME).unwrap());
        assert_eq!(first.city(), DEFAULT_CITY);
        first.set_city("Tokyo, Japan");

        let second =
            CurrentCityStore::new(FilePreferences::open(dir.path(), PREFERENCE_NAME).unwrap());
        assert_eq!(second.city(), "Tokyo, Japan");
    }
}
