use std::collections::HashMap;

use tracing::debug;

use crate::filters::presets::Preset;

/// What the pipeline does with a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Pass the frame through unchanged
    #[default]
    Identity,
    /// The full five-stage VHS chain
    VhsChain,
    /// One single-stage preset
    Preset(Preset),
}

impl FilterMode {
    /// Display name of the mode
    pub fn name(self) -> &'static str {
        match self {
            FilterMode::Identity => "Original",
            FilterMode::VhsChain => "VHS",
            FilterMode::Preset(p) => p.name(),
        }
    }

    /// Compact code for lock-free storage
    pub fn to_code(self) -> u8 {
        match self {
            FilterMode::Identity => 0,
            FilterMode::VhsChain => 1,
            FilterMode::Preset(Preset::Retro) => 2,
            FilterMode::Preset(Preset::Eighties) => 3,
            FilterMode::Preset(Preset::Vintage) => 4,
            FilterMode::Preset(Preset::NoiseReduction) => 5,
        }
    }

    /// Inverse of [`FilterMode::to_code`]; unknown codes map to identity
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => FilterMode::VhsChain,
            2 => FilterMode::Preset(Preset::Retro),
            3 => FilterMode::Preset(Preset::Eighties),
            4 => FilterMode::Preset(Preset::Vintage),
            5 => FilterMode::Preset(Preset::NoiseReduction),
            _ => FilterMode::Identity,
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lookup table from filter names to modes
///
/// Names are matched case-insensitively after trimming. Anything not in the
/// table resolves to [`FilterMode::Identity`].
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    modes: HashMap<String, FilterMode>,
}

impl FilterRegistry {
    /// Create a registry with all built-in filters and their aliases
    pub fn new() -> Self {
        let mut registry = Self {
            modes: HashMap::new(),
        };

        registry.register_builtin_filters();
        registry
    }

    fn register_builtin_filters(&mut self) {
        self.register("Original", FilterMode::Identity);
        self.register("None", FilterMode::Identity);
        self.register("VHS", FilterMode::VhsChain);

        for preset in Preset::ALL {
            self.register(preset.name(), FilterMode::Preset(preset));
        }
        self.register("80s", FilterMode::Preset(Preset::Eighties));
        self.register("Noise-reduction", FilterMode::Preset(Preset::NoiseReduction));
    }

    fn normalize(name: &str) -> String {
        name.trim().to_ascii_lowercase()
    }

    /// Register a name (or alias) for a mode
    pub fn register(&mut self, name: &str, mode: FilterMode) {
        self.modes.insert(Self::normalize(name), mode);
    }

    /// Exact lookup; `None` for unknown names
    pub fn lookup(&self, name: &str) -> Option<FilterMode> {
        self.modes.get(&Self::normalize(name)).copied()
    }

    /// Resolve a name, falling back to identity
    pub fn resolve(&self, name: &str) -> FilterMode {
        self.lookup(name).unwrap_or_else(|| {
            debug!("Unknown filter '{}', passing frames through", name);
            FilterMode::Identity
        })
    }

    /// Canonical names of the selectable filters, in picker order
    pub fn available_filters(&self) -> Vec<&'static str> {
        let mut names = vec![FilterMode::VhsChain.name()];
        names.extend(Preset::ALL.iter().map(|p| p.name()));
        names.push(FilterMode::Identity.name());
        names
    }

    /// Check if a name is known
    pub fn has_filter(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Number of registered names, aliases included
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_filters_available() {
        let registry = FilterRegistry::new();

        assert!(registry.has_filter("Retro"));
        assert!(registry.has_filter("1980s"));
        assert!(registry.has_filter("Vintage"));
        assert!(registry.has_filter("Noise"));
        assert!(registry.has_filter("VHS"));

        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = FilterRegistry::new();
        assert_eq!(registry.resolve(" retro "), FilterMode::Preset(Preset::Retro));
        assert_eq!(registry.resolve("80S"), FilterMode::Preset(Preset::Eighties));
        assert_eq!(registry.resolve("vhs"), FilterMode::VhsChain);
    }

    #[test]
    fn test_unknown_is_identity() {
        let registry = FilterRegistry::new();
        assert_eq!(registry.lookup("unknown-name"), None);
        assert_eq!(registry.resolve("unknown-name"), FilterMode::Identity);
        assert_eq!(registry.resolve(""), FilterMode::Identity);
    }

    #[test]
    fn test_mode_codes_roundtrip() {
        let modes = [
            FilterMode::Identity,
            FilterMode::VhsChain,
            FilterMode::Preset(Preset::Retro),
            FilterMode::Preset(Preset::Eighties),
            FilterMode::Preset(Preset::Vintage),
            FilterMode::Preset(Preset::NoiseReduction),
        ];
        for mode in modes {
            assert_eq!(FilterMode::from_code(mode.to_code()), mode);
        }
        assert_eq!(FilterMode::from_code(200), FilterMode::Identity);
    }

    #[test]
    fn test_custom_alias() {
        let mut registry = FilterRegistry::new();
        registry.register("Sepia", FilterMode::Preset(Preset::Vintage));
        assert_eq!(registry.resolve("sepia"), FilterMode::Preset(Preset::Vintage));
        assert_eq!(registry.len(), 10);
    }
}
