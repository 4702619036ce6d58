//! Mod archive handling: routing archive entries into the plugin layout,
//! extracting them and packing directories for version snapshots.

pub(crate) mod zip;

pub use self::zip::{extract_routed, write_directory};

/// Archive entries under this prefix belong to the mod loader's own tree.
pub const FRAMEWORK_PREFIX: &str = "BepInEx";

/// Extension of loadable plugin binaries.
pub const PLUGIN_EXTENSION: &str = ".dll";

/// Where loose plugin binaries are installed, relative to the modpack root.
pub const PLUGINS_SUBPATH: &str = "BepInEx/plugins";

/// Destination of a single archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Extract relative to the modpack root
    Root,
    /// Extract relative to the plugins directory
    Plugins,
    /// Leave the entry out
    Skip,
}

/// Layout rules deciding which archive entries get installed where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLayout {
    pub framework_prefix: String,
    pub plugin_extension: String,
    pub plugins_subpath: String,
}

impl Default for PluginLayout {
    fn default() -> Self {
        Self {
            framework_prefix: FRAMEWORK_PREFIX.to_string(),
            plugin_extension: PLUGIN_EXTENSION.to_string(),
            plugins_subpath: PLUGINS_SUBPATH.to_string(),
        }
    }
}

impl PluginLayout {
    /// Route an archive entry by its raw name. The framework prefix wins over
    /// the plugin extension.
    pub fn route(&self, entry_name: &str) -> Route {
        if entry_name.starts_with(&self.framework_prefix) {
            Route::Root
        } else if entry_name.ends_with(&self.plugin_extension) {
            Route::Plugins
        } else {
            Route::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_framework_tree_to_root() {
        let layout = PluginLayout::default();
        assert_eq!(layout.route("BepInEx/config/tool.cfg"), Route::Root);
        assert_eq!(layout.route("BepInEx/plugins/Tool/Tool.dll"), Route::Root);
        assert_eq!(layout.route("BepInEx/"), Route::Root);
    }

    #[test]
    fn test_route_loose_plugins() {
        let layout = PluginLayout::default();
        assert_eq!(layout.route("Tool.dll"), Route::Plugins);
        assert_eq!(layout.route("Tool/Tool.dll"), Route::Plugins);
    }

    #[test]
    fn test_route_skips_package_metadata() {
        let layout = PluginLayout::default();
        assert_eq!(layout.route("manifest.json"), Route::Skip);
        assert_eq!(layout.route("icon.png"), Route::Skip);
        assert_eq!(layout.route("README.md"), Route::Skip);
        assert_eq!(layout.route("Tool/"), Route::Skip);
    }

    #[test]
    fn test_route_is_case_sensitive() {
        let layout = PluginLayout::default();
        assert_eq!(layout.route("bepinex/config/tool.cfg"), Route::Skip);
        assert_eq!(layout.route("Tool.DLL"), Route::Skip);
    }
}
