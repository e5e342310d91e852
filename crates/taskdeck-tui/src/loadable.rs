use taskdeck_service::ServiceError;

/// Fetch state of one independently loaded piece of a screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A `Loadable` stamped with the generation of the request that owns it.
///
/// Only an outcome carrying the current generation may land; anything else
/// was issued for a view, filter or organization that has since changed.
///
/// While a reload is in flight the previous value is kept aside so screens
/// can keep showing it until the new one lands.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    state: Loadable<T>,
    previous: Option<T>,
    generation: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: Loadable::Idle,
            previous: None,
            generation: 0,
        }
    }
}

impl<T> Slot<T> {
    pub fn state(&self) -> &Loadable<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The loaded value, or the one being reloaded.
    pub fn latest(&self) -> Option<&T> {
        self.state.loaded().or(self.previous.as_ref())
    }

    /// Marks a new request in flight. Generations start at 1.
    pub fn begin(&mut self, generation: u64) {
        self.generation = generation;
        if let Loadable::Loaded(value) = std::mem::replace(&mut self.state, Loadable::Loading) {
            self.previous = Some(value);
        }
    }

    /// Forgets the current value and orphans any request in flight.
    pub fn reset(&mut self) {
        self.generation = 0;
        self.state = Loadable::Idle;
        self.previous = None;
    }

    /// Applies an outcome. Returns `false` (and changes nothing) when the
    /// outcome is stale.
    pub fn finish(&mut self, generation: u64, result: Result<T, ServiceError>) -> bool {
        if generation == 0 || generation != self.generation {
            return false;
        }
        self.state = match result {
            Ok(value) => Loadable::Loaded(value),
            Err(e) => Loadable::Failed(e.to_string()),
        };
        self.previous = None;
        true
    }
}
