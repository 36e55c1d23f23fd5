use std::sync::atomic::{AtomicU8, Ordering};

use tracing::info;

use crate::filters::{FilterMode, FilterRegistry};

/// The currently selected filter, shared between the UI and the lanes
///
/// Written by the UI collaborator, read once per frame by the lanes. Reads never
/// take a lock; a change is visible to the very next frame.
#[derive(Debug)]
pub struct FilterSelector {
    current: AtomicU8,
}

impl FilterSelector {
    pub fn new(mode: FilterMode) -> Self {
        Self {
            current: AtomicU8::new(mode.to_code()),
        }
    }

    /// Start with the mode a name resolves to
    pub fn from_name(registry: &FilterRegistry, name: &str) -> Self {
        Self::new(registry.resolve(name))
    }

    pub fn current(&self) -> FilterMode {
        FilterMode::from_code(self.current.load(Ordering::Acquire))
    }

    pub fn select(&self, mode: FilterMode) {
        let previous = FilterMode::from_code(self.current.swap(mode.to_code(), Ordering::AcqRel));
        if previous != mode {
            info!("Filter changed: {} -> {}", previous, mode);
        }
    }

    /// Select by name; unknown names select identity
    pub fn select_name(&self, registry: &FilterRegistry, name: &str) -> FilterMode {
        let mode = registry.resolve(name);
        self.select(mode);
        mode
    }
}

impl Default for FilterSelector {
    fn default() -> Self {
        Self::new(FilterMode::VhsChain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Preset;
    use std::sync::Arc;

    #[test]
    fn test_select_by_name() {
        let registry = FilterRegistry::new();
        let selector = FilterSelector::from_name(&registry, "VHS");
        assert_eq!(selector.current(), FilterMode::VhsChain);

        assert_eq!(selector.select_name(&registry, "1980s"), FilterMode::Preset(Preset::Eighties));
        assert_eq!(selector.current(), FilterMode::Preset(Preset::Eighties));

        selector.select_name(&registry, "bogus");
        assert_eq!(selector.current(), FilterMode::Identity);
    }

    #[test]
    fn test_visible_across_threads() {
        let selector = Arc::new(FilterSelector::default());
        let writer = Arc::clone(&selector);

        std::thread::spawn(move || writer.select(FilterMode::Preset(Preset::Retro)))
            .join()
            .unwrap();

        assert_eq!(selector.current(), FilterMode::Preset(Preset::Retro));
    }
}
