//! One controller per container, keyed by the container's slot on the page.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::RainError;
use crate::rain::MatrixRain;

/// Owns the page's rain controllers.
#[derive(Debug, Default)]
pub struct RainRegistry {
    controllers: BTreeMap<usize, MatrixRain>,
}

impl RainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a controller for container `key` unless one already exists.
    ///
    /// `build` only runs for a new key; a repeat attach leaves the existing
    /// controller untouched and returns [`RainError::DuplicateInit`].
    pub fn attach(
        &mut self,
        key: usize,
        build: impl FnOnce() -> MatrixRain,
    ) -> Result<&mut MatrixRain, RainError> {
        if self.controllers.contains_key(&key) {
            debug!(key, "rain already attached");
            return Err(RainError::DuplicateInit(key));
        }
        let rain = build();
        if let Err(err) = rain.status() {
            debug!(key, %err, "rain attached degraded");
        }
        Ok(self.controllers.entry(key).or_insert(rain))
    }

    pub fn get(&self, key: usize) -> Option<&MatrixRain> {
        self.controllers.get(&key)
    }

    pub fn get_mut(&mut self, key: usize) -> Option<&mut MatrixRain> {
        self.controllers.get_mut(&key)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &MatrixRain)> {
        self.controllers.iter().map(|(key, rain)| (*key, rain))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut MatrixRain)> {
        self.controllers.iter_mut().map(|(key, rain)| (*key, rain))
    }

    /// Run [`MatrixRain::update`] on every controller.
    pub fn update_all(&mut self) {
        for rain in self.controllers.values_mut() {
            rain.update();
        }
    }

    /// Dispose and drop one controller.
    pub fn detach(&mut self, key: usize) -> bool {
        match self.controllers.remove(&key) {
            Some(mut rain) => {
                rain.dispose();
                true
            }
            None => false,
        }
    }

    /// Dispose and drop every controller.
    pub fn dispose_all(&mut self) {
        for (_, mut rain) in std::mem::take(&mut self.controllers) {
            rain.dispose();
        }
    }
}
