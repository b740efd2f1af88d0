//! Linux deployment manifest
//!
//! Everything is staged read-only except for the owner (0644). The xcb
//! platform plugin is built with an rpath pointing into the Qt install, so a
//! freshly staged copy is rewritten to look in `$ORIGIN/..` instead.

use std::path::Path;

use super::{add_cef_resources, CRASH_REPORTER_CFG};
use crate::build::deploy::{DeployManifest, ResourceLocations};
use crate::build::Profile;

/// Mode of every staged file
pub const RESOURCE_MODE: u32 = 0o644;

/// Qt libraries needed by every build
pub const QT_LIBS: &[&str] = &[
    "libQt5Core.so.5",
    "libQt5Gui.so.5",
    "libQt5Sql.so.5",
    "libQt5Widgets.so.5",
    // Qt ships its own ICU build
    "libicui18n.so.56",
    "libicuuc.so.56",
    "libicudata.so.56",
    // Needed by the xcb platform plugin
    "libQt5XcbQpa.so.5",
    "libQt5DBus.so.5",
];

/// Qt libraries only needed by debug builds
pub const QT_DEBUG_LIBS: &[&str] = &[
    "libQt5Network.so.5",
    "libQt5Test.so.5",
    "libQt5WebSockets.so.5",
];

/// Plugin categories and the plugins staged from each
pub const QT_PLUGINS: &[(&str, &str)] = &[
    ("imageformats", "qgif"),
    ("platforms", "qxcb"),
    ("sqldrivers", "qsqlite"),
];

/// CEF binaries from `CEF_DIR/<Debug|Release>`
pub const CEF_LIBS: &[&str] = &["libcef.so", "natives_blob.bin", "snapshot_blob.bin"];

/// Shared object name of a Qt plugin
pub fn plugin_file_name(plugin: &str) -> String {
    format!("lib{}.so", plugin)
}

/// Build the Linux manifest
pub fn manifest(profile: Profile, locations: &ResourceLocations, target_dir: &Path) -> DeployManifest {
    let mode = Some(RESOURCE_MODE);
    let mut manifest = DeployManifest::default();

    manifest.add_files(&locations.project_root, target_dir, &[CRASH_REPORTER_CFG], mode);

    let qt_lib_dir = locations.qt_lib_dir();
    manifest.add_files(&qt_lib_dir, target_dir, QT_LIBS, mode);
    if profile.is_debug() {
        manifest.add_files(&qt_lib_dir, target_dir, QT_DEBUG_LIBS, mode);
    }

    for &(category, plugin) in QT_PLUGINS {
        manifest.add_plugins(locations, target_dir, category, &[plugin_file_name(plugin)], mode);
    }
    manifest.rpath_fixup = Some(target_dir.join("platforms").join(plugin_file_name("qxcb")));

    manifest.add_files(&locations.cef_bin_dir(profile), target_dir, CEF_LIBS, mode);
    add_cef_resources(&mut manifest, locations, target_dir, mode);

    manifest
}
