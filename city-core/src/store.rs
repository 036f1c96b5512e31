use parking_lot::Mutex;
use std::{fmt, sync::Arc};

use crate::prefs::Preferences;

/// Preferences namespace holding the current city.
pub const PREFERENCE_NAME: &str = "weather_current_city";

/// Key of the city value inside [`PREFERENCE_NAME`].
pub const CITY_KEY: &str = "city";

/// City used until one has been stored.
pub const DEFAULT_CITY: &str = "Paris, France";

/// Told that the current city changed. Call back into the manager for the value.
pub trait CityListener: Send + Sync {
    fn on_city_changed(&self);
}

/// Read/write access to the current city, plus change notification.
pub trait CurrentCityManager: Send + Sync {
    fn city(&self) -> String;

    /// Returns `true` when the city changed, `false` when it already held `city`.
    ///
    /// No validation is applied: an empty `city` is cached and persisted, but a
    /// stored empty value is read back as [`DEFAULT_CITY`] by the next store.
    fn set_city(&self, city: &str) -> bool;

    /// Registering the same listener twice has no further effect.
    fn add_listener(&self, listener: Arc<dyn CityListener>);

    fn remove_listener(&self, listener: &Arc<dyn CityListener>);
}

/// Current city cached in memory and backed by [`Preferences`].
///
/// The stored value is read on first access and never reloaded afterwards.
pub struct CurrentCityStore<P> {
    prefs: P,
    state: Mutex<State>,
}

struct State {
    city: String,
    loaded: bool,
    listeners: Vec<Arc<dyn CityListener>>,
}

impl<P: Preferences> CurrentCityStore<P> {
    pub fn new(prefs: P) -> Self {
        Self {
            prefs,
            state: Mutex::new(State {
                city: DEFAULT_CITY.to_string(),
                loaded: false,
                listeners: Vec::new(),
            }),
        }
    }

    pub fn preferences(&self) -> &P {
        &self.prefs
    }

    fn load_if_needed(&self, state: &mut State) {
        if state.loaded {
            return;
        }

        // An empty stored value is treated as no value.
        match self.prefs.get_string(CITY_KEY).filter(|c| !c.is_empty()) {
            Some(city) => {
                tracing::debug!(%city, "loaded current city");
                state.city = city;
            }
            None => tracing::debug!(city = %state.city, "no stored city, using default"),
        }
        state.loaded = true;
    }
}

impl<P: Preferences> CurrentCityManager for CurrentCityStore<P> {
    fn city(&self) -> String {
        let mut state = self.state.lock();
        self.load_if_needed(&mut state);
        state.city.clone()
    }

    fn set_city(&self, city: &str) -> bool {
        let listeners = {
            let mut state = self.state.lock();
            self.load_if_needed(&mut state);
            if state.city == city {
                return false;
            }

            tracing::info!(from = %state.city, to = %city, "current city changed");
            state.city = city.to_string();

            if let Err(err) = self.prefs.put_string(CITY_KEY, city) {
                tracing::warn!(error = %err, "failed to persist current city");
            }

            state.listeners.clone()
        };

        // Lock released: listeners may read the city back.
        for listener in listeners {
            listener.on_city_changed();
        }
        true
    }

    fn add_listener(&self, listener: Arc<dyn CityListener>) {
        let mut state = self.state.lock();
        if state.listeners.iter().any(|l| same_listener(l, &listener)) {
            return;
        }
        state.listeners.push(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn CityListener>) {
        self.state.lock().listeners.retain(|l| !same_listener(l, listener));
    }
}

impl<P: fmt::Debug> fmt::Debug for CurrentCityStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CurrentCityStore")
            .field("prefs", &self.prefs)
            .field("city", &state.city)
            .field("loaded", &state.loaded)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

// Identity is the data pointer; vtable pointers are not guaranteed unique.
fn same_listener(a: &Arc<dyn CityListener>, b: &Arc<dyn CityListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
