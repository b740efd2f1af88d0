//! CEF wrapper library build (`build-cef`)
//!
//! The CEF binary distribution ships `libcef_dll_wrapper` as source. It has to
//! be compiled once per profile with settings compatible with the Qt build
//! before Doogie can link against it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::stage::copy_if_absent;
use super::Profile;
use crate::config::Settings;
use crate::error::BuildError;
use crate::exec::{find_program, Invocation};
use crate::platform::Platform;
use crate::utils::terminal;

/// Wrapper library directory inside CEF_DIR
pub const WRAPPER_DIR: &str = "libcef_dll_wrapper";

/// Visual Studio project of the wrapper library
pub const WRAPPER_VCXPROJ: &str = "libcef_dll_wrapper.vcxproj";

/// CMake generator used on Windows
pub const VS_GENERATOR: &str = "Visual Studio 14 Win64";

/// Build the wrapper library for both profiles
pub fn build_cef(settings: &Settings) -> Result<()> {
    let cef_dir = settings.require_cef_dir("build-cef")?;
    find_program("cmake", "build-cef")?;
    match settings.platform {
        Platform::Linux => build_linux(cef_dir, settings.verbose),
        Platform::Windows => build_windows(cef_dir, settings.verbose),
    }
}

fn build_linux(cef_dir: &Path, verbose: bool) -> Result<()> {
    let wrapper_dir = cef_dir.join(WRAPPER_DIR);
    for profile in Profile::ALL {
        let build_type = profile.cef_subdir();
        terminal::print_step(&format!("Building {} wrapper", build_type));

        Invocation::new("cmake")
            .arg(format!("-DCMAKE_BUILD_TYPE={}", build_type))
            .arg(".")
            .current_dir(cef_dir)
            .run(verbose)
            .context("CMake failed")?;
        Invocation::new("make")
            .current_dir(&wrapper_dir)
            .run(verbose)
            .context("Make failed")?;

        // Each profile's build overwrites the same output name
        let built = wrapper_dir.join(format!("{}.a", WRAPPER_DIR));
        let renamed = wrapper_dir.join(format!("{}_{}.a", WRAPPER_DIR, build_type));
        fs::rename(&built, &renamed)
            .map_err(|e| BuildError::io(&built, e))
            .context("Unable to rename .a file")?;

        if profile == Profile::Release {
            strip_release_libcef(cef_dir, verbose)?;
        }
    }
    Ok(())
}

/// Strip the release libcef.so, keeping an unstripped copy
///
/// The shipped release libcef.so carries full symbols, which makes the
/// deployed browser several hundred megabytes larger.
fn strip_release_libcef(cef_dir: &Path, verbose: bool) -> Result<()> {
    let release_dir = cef_dir.join(Profile::Release.cef_subdir());
    copy_if_absent(
        &release_dir.join("libcef.so"),
        &release_dir.join("libcef.fullsym.so"),
        None,
        verbose,
    )
    .context("Release libcef backup failed")?;

    Invocation::new("strip")
        .args(["--strip-all", "Release/libcef.so"])
        .current_dir(cef_dir)
        .run(verbose)
        .context("Failed stripping symbols")?;
    Ok(())
}

fn build_windows(cef_dir: &Path, verbose: bool) -> Result<()> {
    terminal::print_step("Generating Visual Studio projects");
    Invocation::new("cmake")
        .args(["-G", VS_GENERATOR, "."])
        .current_dir(cef_dir)
        .run(verbose)
        .context("CMake failed")?;

    let wrapper_dir = cef_dir.join(WRAPPER_DIR);
    let vcxproj = wrapper_dir.join(WRAPPER_VCXPROJ);
    let xml = fs::read_to_string(&vcxproj)
        .map_err(|e| BuildError::io(&vcxproj, e))
        .context("Unable to read VC proj file")?;
    fs::write(&vcxproj, use_dll_runtime(&xml))
        .map_err(|e| BuildError::io(&vcxproj, e))
        .context("Unable to write VC proj file")?;

    for profile in Profile::ALL {
        let configuration = profile.cef_subdir();
        terminal::print_step(&format!("Building {} wrapper", configuration));
        Invocation::new("msbuild")
            .arg(WRAPPER_VCXPROJ)
            .arg(format!("/p:Configuration={}", configuration))
            .current_dir(&wrapper_dir)
            .run(verbose)
            .with_context(|| format!("Unable to build {} wrapper", configuration.to_lowercase()))?;
    }
    Ok(())
}

/// Switch the wrapper to the DLL C runtime Qt is built against
///
/// The first `RuntimeLibrary` element belongs to the Debug configuration and
/// the first plain `MultiThreaded` one to Release.
pub fn use_dll_runtime(xml: &str) -> String {
    xml.replacen(
        "<RuntimeLibrary>MultiThreadedDebug</RuntimeLibrary>",
        "<RuntimeLibrary>MultiThreadedDebugDLL</RuntimeLibrary>",
        1,
    )
    .replacen(
        "<RuntimeLibrary>MultiThreaded</RuntimeLibrary>",
        "<RuntimeLibrary>MultiThreadedDLL</RuntimeLibrary>",
        1,
    )
}
