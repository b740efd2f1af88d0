//! Windows deployment manifest
//!
//! Debug builds link against the `d`-suffixed Qt DLLs and the debug C
//! runtime, and pick up Qt's PDB files when they are installed.

use std::path::Path;

use super::{add_cef_resources, CRASH_REPORTER_CFG};
use crate::build::deploy::{DeployManifest, ResourceLocations};
use crate::build::stage::StagedFile;
use crate::build::Profile;

/// Debug C runtime location
pub const UCRT_DIR: &str = r"C:\Program Files (x86)\Windows Kits\10\bin\x64\ucrt";

/// Debug C runtime DLL
pub const UCRT_DEBUG_DLL: &str = "ucrtbased.dll";

/// Qt modules needed by every build
pub const QT_MODULES: &[&str] = &["Qt5Core", "Qt5Gui", "Qt5Sql", "Qt5Widgets"];

/// Qt modules only needed by debug builds
pub const QT_DEBUG_MODULES: &[&str] = &["Qt5WebSockets", "Qt5Network", "Qt5Test"];

/// Plugin categories and the plugins staged from each
pub const QT_PLUGINS: &[(&str, &str)] = &[
    ("imageformats", "qgif"),
    ("platforms", "qwindows"),
    ("sqldrivers", "qsqlite"),
    ("styles", "qwindowsvistastyle"),
];

/// CEF binaries from `CEF_DIR/<Debug|Release>`
pub const CEF_LIBS: &[&str] = &[
    "libcef.dll",
    "chrome_elf.dll",
    "natives_blob.bin",
    "snapshot_blob.bin",
    "d3dcompiler_43.dll",
    "d3dcompiler_47.dll",
    "libEGL.dll",
    "libGLESv2.dll",
];

/// DLL name of a Qt module or plugin for a profile
pub fn dll_name(base: &str, profile: Profile) -> String {
    if profile.is_debug() {
        format!("{}d.dll", base)
    } else {
        format!("{}.dll", base)
    }
}

/// Build the Windows manifest
pub fn manifest(profile: Profile, locations: &ResourceLocations, target_dir: &Path) -> DeployManifest {
    let mut manifest = DeployManifest::default();

    manifest.add_files(&locations.project_root, target_dir, &[CRASH_REPORTER_CFG], None);

    let mut modules: Vec<&str> = QT_MODULES.to_vec();
    if profile.is_debug() {
        modules.extend_from_slice(QT_DEBUG_MODULES);
    }
    let dlls: Vec<String> = modules.iter().map(|m| dll_name(m, profile)).collect();
    manifest.add_files(&locations.qt_bin_dir, target_dir, &dlls, None);

    if profile.is_debug() {
        for module in &modules {
            let pdb = locations.qt_bin_dir.join(format!("{}d.pdb", module));
            manifest.files.push(StagedFile::new(pdb, target_dir).optional());
        }
        manifest.add_files(Path::new(UCRT_DIR), target_dir, &[UCRT_DEBUG_DLL], None);
    }

    for &(category, plugin) in QT_PLUGINS {
        manifest.add_plugins(locations, target_dir, category, &[dll_name(plugin, profile)], None);
    }

    manifest.add_files(&locations.cef_bin_dir(profile), target_dir, CEF_LIBS, None);
    add_cef_resources(&mut manifest, locations, target_dir, None);

    manifest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn locations() -> ResourceLocations {
        ResourceLocations::new(
            Path::new("/src/doogie"),
            Path::new("/qt/bin/qmake.exe"),
            Path::new("/cef"),
        )
    }

    fn names(manifest: &DeployManifest) -> Vec<String> {
        manifest
            .files
            .iter()
            .map(|f| f.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_dll_name() {
        assert_eq!(dll_name("Qt5Core", Profile::Debug), "Qt5Cored.dll");
        assert_eq!(dll_name("qgif", Profile::Release), "qgif.dll");
    }

    #[test]
    fn test_release_manifest() {
        let manifest = manifest(Profile::Release, &locations(), Path::new("/src/doogie/release"));
        let names = names(&manifest);

        assert!(names.contains(&"Qt5Widgets.dll".to_string()));
        assert!(!names.iter().any(|n| n.ends_with(".pdb")));
        assert!(!names.contains(&UCRT_DEBUG_DLL.to_string()));
        assert!(!names.contains(&"Qt5Test.dll".to_string()));
        assert!(names.contains(&"qwindowsvistastyle.dll".to_string()));
        assert!(manifest.rpath_fixup.is_none());
        assert!(manifest.files.iter().all(|f| f.mode.is_none()));
    }

    #[test]
    fn test_debug_manifest() {
        let manifest = manifest(Profile::Debug, &locations(), Path::new("/src/doogie/debug"));
        let names = names(&manifest);

        assert!(names.contains(&"Qt5Cored.dll".to_string()));
        assert!(names.contains(&"Qt5Testd.dll".to_string()));
        assert!(names.contains(&UCRT_DEBUG_DLL.to_string()));
        assert!(names.contains(&"qwindowsd.dll".to_string()));

        let pdbs: Vec<_> = manifest.files.iter().filter(|f| f.optional).collect();
        assert_eq!(pdbs.len(), QT_MODULES.len() + QT_DEBUG_MODULES.len());
        assert!(pdbs.iter().all(|f| f.source.extension().unwrap() == "pdb"));

        assert!(manifest
            .dest_paths()
            .contains(&PathBuf::from("/src/doogie/debug/styles/qwindowsvistastyled.dll")));
    }
}
