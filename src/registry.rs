use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::aperture::{Aperture, DEFAULT_APERTURE_CODE, DEFAULT_APERTURE_KEY};

/// Select code of the first registered aperture, the default aperture occupies the one before it.
pub const FIRST_APERTURE_CODE: i32 = DEFAULT_APERTURE_CODE + 1;

/// Where a primitive's aperture lives in a layer's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApertureSlot {
    /// No aperture, the layer's default aperture is used.
    Default,
    /// Position in the registry's ordered aperture list.
    Registered(usize),
}

impl ApertureSlot {
    /// The on-disk select code (`D<code>`) for this slot.
    pub fn select_code(self) -> i32 {
        match self {
            ApertureSlot::Default => DEFAULT_APERTURE_CODE,
            ApertureSlot::Registered(index) => FIRST_APERTURE_CODE + index as i32,
        }
    }
}

/// Deduplicates apertures by identity key, keeping them in first-seen order.
///
/// Positions never change once assigned, there is no removal.
#[derive(Debug, Default)]
pub struct ApertureRegistry {
    apertures: Vec<Arc<dyn Aperture>>,
    index: HashMap<String, usize>,
}

impl ApertureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the aperture if its identity key has not been seen before and returns its slot.
    ///
    /// An aperture reporting the reserved default key is never stored and resolves to [`ApertureSlot::Default`].
    pub fn register(&mut self, aperture: Arc<dyn Aperture>) -> ApertureSlot {
        let key = aperture.id();
        if key == DEFAULT_APERTURE_KEY {
            return ApertureSlot::Default;
        }
        if let Some(&index) = self.index.get(&key) {
            return ApertureSlot::Registered(index);
        }

        let index = self.apertures.len();
        debug!("registering aperture. key: {}, index: {}", key, index);
        self.index.insert(key, index);
        self.apertures.push(aperture);

        ApertureSlot::Registered(index)
    }

    /// Looks up the slot for an identity key, `None` if the key was never registered.
    pub fn resolve(&self, key: &str) -> Option<ApertureSlot> {
        if key == DEFAULT_APERTURE_KEY {
            return Some(ApertureSlot::Default);
        }
        self.index
            .get(key)
            .map(|&index| ApertureSlot::Registered(index))
    }

    /// Slot for a primitive's optional aperture.
    pub fn resolve_aperture(&self, aperture: Option<&dyn Aperture>) -> Option<ApertureSlot> {
        match aperture {
            None => Some(ApertureSlot::Default),
            Some(aperture) => self.resolve(&aperture.id()),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn Aperture>> {
        self.apertures.get(index)
    }

    pub fn len(&self) -> usize {
        self.apertures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apertures.is_empty()
    }

    /// Registered apertures with their slots, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ApertureSlot, &Arc<dyn Aperture>)> {
        self.apertures
            .iter()
            .enumerate()
            .map(|(index, aperture)| (ApertureSlot::Registered(index), aperture))
    }
}
