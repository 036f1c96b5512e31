use crate::{error::EditError, store::CurrentCityManager};

/// Result of submitting a city from an input surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Changed { city: String },
    Unchanged { city: String },
}

/// Turns raw user input into a current-city update.
pub struct CityEditPresenter<'a> {
    manager: &'a dyn CurrentCityManager,
}

impl<'a> CityEditPresenter<'a> {
    pub fn new(manager: &'a dyn CurrentCityManager) -> Self {
        Self { manager }
    }

    /// Called once the user has confirmed the text they typed.
    pub fn on_city_validated(&self, text: &str) -> Result<EditOutcome, EditError> {
        let city = text.trim();
        if city.is_empty() {
            return Err(EditError::EmptyCity);
        }

        let city = city.to_string();
        if self.manager.set_city(&city) {
            Ok(EditOutcome::Changed { city })
        } else {
            Ok(EditOutcome::Unchanged { city })
        }
    }
}
