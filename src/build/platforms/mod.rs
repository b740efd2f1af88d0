//! Per-platform deployment manifests
//!
//! Each platform module lists the runtime files the Doogie binary needs next
//! to it. The lists differ by profile: debug builds pull in the extra Qt
//! modules used by tests and the remote debugging server.

pub mod linux;
pub mod windows;

use std::path::Path;

use super::deploy::{DeployManifest, ResourceLocations};
use super::Profile;
use crate::platform::Platform;

/// Crash reporter configuration copied from the project root
pub const CRASH_REPORTER_CFG: &str = "crash_reporter.cfg";

/// CEF resources shared by both platforms
pub const CEF_RESOURCES: &[&str] = &[
    "icudtl.dat",
    "cef.pak",
    "cef_100_percent.pak",
    "cef_200_percent.pak",
    "cef_extensions.pak",
    "devtools_resources.pak",
];

/// Locale paks staged into `locales/`
pub const CEF_LOCALES: &[&str] = &["en-US.pak"];

/// Build the manifest for a platform and profile
pub fn manifest(
    platform: Platform,
    profile: Profile,
    locations: &ResourceLocations,
    target_dir: &Path,
) -> DeployManifest {
    match platform {
        Platform::Linux => linux::manifest(profile, locations, target_dir),
        Platform::Windows => windows::manifest(profile, locations, target_dir),
    }
}

/// CEF resources and locales, identical on both platforms apart from mode
fn add_cef_resources(
    manifest: &mut DeployManifest,
    locations: &ResourceLocations,
    target_dir: &Path,
    mode: Option<u32>,
) {
    manifest.add_files(&locations.cef_resources_dir(), target_dir, CEF_RESOURCES, mode);

    let locales_dir = target_dir.join("locales");
    manifest.dirs.push(locales_dir.clone());
    manifest.add_files(&locations.cef_locales_dir(), &locales_dir, CEF_LOCALES, mode);
}
