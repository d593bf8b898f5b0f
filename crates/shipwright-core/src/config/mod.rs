//! Release configuration
//!
//! [`ReleaseConfig`] turns `{package metadata, sourcedir, platform, arch,
//! version}` into a fully resolved configuration: channel, display name,
//! packager/installer options and the per-platform asset manifest. All
//! derived values live on a [`PropertyGraph`], so changing a base property
//! (e.g. the version) consistently recomputes everything downstream of it.
//!
//! Platform specialization happens once, at construction, by letting the
//! selected variant override exactly the derived properties that are
//! platform-specific. See [`variants`].

pub mod variants;

use crate::asset::Asset;
use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::graph::{DepValues, PropertyGraph};
use crate::package::PackageInfo;
use crate::platform::Platform;
use chrono::Datelike;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::warn;

pub use variants::{variant_for, PlatformVariant};

/// Property names shared between the base declarations and the variants
pub mod props {
    pub const VERSION: &str = "version";
    pub const PLATFORM: &str = "platform";
    pub const ARCH: &str = "arch";
    pub const SOURCEDIR: &str = "sourcedir";
    pub const NAME: &str = "name";
    pub const BASE_PRODUCT_NAME: &str = "base_product_name";
    pub const AUTHOR: &str = "author";
    pub const DESCRIPTION: &str = "description";
    pub const APP_BUNDLE_ID: &str = "app_bundle_id";
    pub const ICON: &str = "icon";

    pub const CHANNEL: &str = "channel";
    pub const PRODUCT_NAME: &str = "product_name";
    pub const COPYRIGHT: &str = "copyright";
    pub const OUT: &str = "out";
    pub const PACKAGER_BASENAME: &str = "packager_basename";
    pub const RESOURCES: &str = "resources";
    pub const COMMON_PACKAGER_OPTIONS: &str = "common_packager_options";
    pub const PACKAGER_OPTIONS: &str = "packager_options";
    pub const INSTALLER_OPTIONS: &str = "installer_options";
    pub const ASSETS: &str = "assets";
    pub const BUNDLE_ID: &str = "bundle_id";
    pub const APP_PATH: &str = "app_path";
}

/// Raw inputs for building a [`ReleaseConfig`]
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    pub sourcedir: PathBuf,
    pub platform: Platform,
    pub arch: String,
    /// Overrides the package version when set
    pub version: Option<String>,
    pub pkg: PackageInfo,
}

/// Fully resolved configuration for one platform/arch build
pub struct ReleaseConfig {
    graph: PropertyGraph,
    platform: Platform,
    version: String,
    arch: String,
    name: String,
    sourcedir: PathBuf,
}

impl ReleaseConfig {
    /// Build and specialize a configuration.
    ///
    /// Fails with [`Error::InvalidVersion`] before anything else when the
    /// version is not valid semver.
    pub fn new(opts: ReleaseOptions) -> Result<Self> {
        let version = opts.version.clone().unwrap_or_else(|| opts.pkg.version.clone());
        semver::Version::parse(&version).map_err(|_| Error::invalid_version(&version))?;

        let mut graph = PropertyGraph::new();
        declare_base(&mut graph, &opts.platform)?;

        graph.set(props::VERSION, json!(version))?;
        graph.set(props::PLATFORM, json!(opts.platform.as_str()))?;
        graph.set(props::ARCH, json!(opts.arch))?;
        graph.set(
            props::SOURCEDIR,
            json!(opts.sourcedir.to_string_lossy()),
        )?;
        graph.set(props::NAME, json!(opts.pkg.name))?;
        graph.set(
            props::BASE_PRODUCT_NAME,
            json!(opts.pkg.product_name()),
        )?;
        if let Some(author) = &opts.pkg.author {
            graph.set(props::AUTHOR, json!(author))?;
        }
        if let Some(description) = &opts.pkg.description {
            graph.set(props::DESCRIPTION, json!(description))?;
        }
        if let Some(bundle_id) = &opts.pkg.app_bundle_id {
            graph.set(props::APP_BUNDLE_ID, json!(bundle_id))?;
        }
        if let Some(icon) = &opts.pkg.icon {
            let resolved = opts.sourcedir.join(icon);
            graph.set(props::ICON, json!(resolved.to_string_lossy()))?;
        }

        variant_for(&opts.platform).apply(&mut graph)?;

        Ok(Self {
            graph,
            platform: opts.platform,
            version,
            arch: opts.arch,
            name: opts.pkg.name,
            sourcedir: opts.sourcedir,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sourcedir(&self) -> &Path {
        &self.sourcedir
    }

    /// Directory the packaging step writes artifacts to
    pub fn dist_dir(&self) -> PathBuf {
        self.sourcedir.join("dist")
    }

    pub fn channel(&self) -> Result<Channel> {
        let value = self.graph.get(props::CHANNEL)?;
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Channel-suffixed display name
    pub fn product_name(&self) -> Result<String> {
        string_value(self.graph.get(props::PRODUCT_NAME)?, props::PRODUCT_NAME)
    }

    /// The platform asset manifest, whether or not the files exist yet
    pub fn assets(&self) -> Result<Vec<Asset>> {
        let value = self.graph.get(props::ASSETS)?;
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Assets that exist on disk right now. Missing assets are dropped with
    /// a warning rather than failing the run.
    pub fn present_assets(&self) -> Result<Vec<Asset>> {
        let (present, missing): (Vec<_>, Vec<_>) =
            self.assets()?.into_iter().partition(Asset::exists);
        for asset in &missing {
            warn!(
                "Excluding {} from upload because {} does not exist",
                asset.name,
                asset.path.display()
            );
        }
        Ok(present)
    }

    /// Options map consumed by the external packager
    pub fn packager_options(&self) -> Result<Value> {
        self.graph.get(props::PACKAGER_OPTIONS)
    }

    /// Options map consumed by the external installer builder.
    ///
    /// Platforms without installer support yield `Ok(None)`; the condition is
    /// logged but never fatal to the pipeline.
    pub fn installer_options(&self) -> Result<Option<Value>> {
        match self.graph.get(props::INSTALLER_OPTIONS) {
            Ok(value) => Ok(Some(value)),
            Err(Error::InstallerUnsupported { platform }) => {
                warn!("Installers are not supported for {} yet", platform);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Resource directory inside the packaged application
    pub fn resources(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(string_value(
            self.graph.get(props::RESOURCES)?,
            props::RESOURCES,
        )?))
    }

    /// Read any declared property by name
    pub fn property(&self, name: &str) -> Result<Value> {
        self.graph.get(name)
    }

    /// Set a stored property, invalidating dependent derived values
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
        self.graph.set(name, value)
    }

    /// Snapshot every resolvable property, for `config show`
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        let mut names: Vec<_> = self.graph.names().map(str::to_string).collect();
        names.sort();
        for name in names {
            if let Ok(value) = self.graph.get(&name) {
                out.insert(name, value);
            }
        }
        Value::Object(out)
    }
}

impl std::fmt::Debug for ReleaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseConfig")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("platform", &self.platform)
            .field("arch", &self.arch)
            .finish_non_exhaustive()
    }
}

/// Declare the stored properties and the platform-independent derived ones
fn declare_base(graph: &mut PropertyGraph, platform: &Platform) -> Result<()> {
    for name in [
        props::VERSION,
        props::PLATFORM,
        props::ARCH,
        props::SOURCEDIR,
        props::NAME,
        props::BASE_PRODUCT_NAME,
        props::AUTHOR,
        props::DESCRIPTION,
        props::APP_BUNDLE_ID,
        props::ICON,
    ] {
        graph.declare_stored(name);
    }

    graph.declare_derived(props::CHANNEL, &[props::VERSION], |values| {
        let version = req_str(values, props::VERSION)?;
        Ok(serde_json::to_value(Channel::from_version(&version))?)
    })?;

    graph.declare_derived(
        props::PRODUCT_NAME,
        &[props::CHANNEL, props::BASE_PRODUCT_NAME],
        |values| {
            let base = req_str(values, props::BASE_PRODUCT_NAME)?;
            let channel: Channel = serde_json::from_value(values[props::CHANNEL].clone())?;
            Ok(match channel.product_suffix() {
                Some(suffix) => json!(format!("{base}{suffix}")),
                None => json!(base),
            })
        },
    )?;

    // The year is captured once at construction, like the rest of the
    // process environment.
    let year = chrono::Utc::now().year();
    graph.declare_derived(props::COPYRIGHT, &[props::AUTHOR], move |values| {
        Ok(match opt_str(values, props::AUTHOR) {
            Some(author) => json!(format!("{author}, {year}")),
            None => Value::Null,
        })
    })?;

    graph.declare_derived(props::OUT, &[props::SOURCEDIR], |values| {
        let sourcedir = req_str(values, props::SOURCEDIR)?;
        Ok(json!(join_path(&sourcedir, "dist")))
    })?;

    graph.declare_derived(
        props::PACKAGER_BASENAME,
        &[props::OUT, props::NAME, props::PLATFORM, props::ARCH],
        |values| {
            let out = req_str(values, props::OUT)?;
            let name = req_str(values, props::NAME)?;
            let platform = req_str(values, props::PLATFORM)?;
            let arch = req_str(values, props::ARCH)?;
            Ok(json!(join_path(
                &out,
                &format!("{name}-{platform}-{arch}")
            )))
        },
    )?;

    graph.declare_derived(props::RESOURCES, &[props::PACKAGER_BASENAME], |values| {
        let basename = req_str(values, props::PACKAGER_BASENAME)?;
        Ok(json!(join_path(&basename, "resources")))
    })?;

    graph.declare_derived(
        props::COMMON_PACKAGER_OPTIONS,
        &[
            props::NAME,
            props::ICON,
            props::SOURCEDIR,
            props::OUT,
            props::COPYRIGHT,
            props::VERSION,
            props::PLATFORM,
            props::ARCH,
        ],
        |values| {
            Ok(json!({
                "name": values[props::NAME],
                "icon": values[props::ICON],
                "dir": values[props::SOURCEDIR],
                "out": values[props::OUT],
                "overwrite": true,
                "copyright": values[props::COPYRIGHT],
                "app_version": values[props::VERSION],
                "build_version": values[props::VERSION],
                "platform": values[props::PLATFORM],
                "arch": values[props::ARCH],
            }))
        },
    )?;

    graph.declare_derived(
        props::PACKAGER_OPTIONS,
        &[props::COMMON_PACKAGER_OPTIONS],
        |values| Ok(values[props::COMMON_PACKAGER_OPTIONS].clone()),
    )?;

    // Variants override this; the base declaration covers platforms we can
    // configure but not package.
    let platform_name = platform.as_str().to_string();
    graph.declare_derived(props::INSTALLER_OPTIONS, &[], move |_| {
        Err(Error::InstallerUnsupported {
            platform: platform_name.clone(),
        })
    })?;

    graph.declare_derived(props::ASSETS, &[], |_| Ok(json!([])))?;

    Ok(())
}

/// Extract a required string dependency
pub(crate) fn req_str(values: &DepValues, name: &str) -> Result<String> {
    values
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::property_type(name, "string"))
}

/// Extract an optional string dependency
pub(crate) fn opt_str(values: &DepValues, name: &str) -> Option<String> {
    values
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Join path segments into a JSON-friendly string
pub(crate) fn join_path(base: &str, child: &str) -> String {
    Path::new(base).join(child).to_string_lossy().into_owned()
}

fn string_value(value: Value, name: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::property_type(name, "string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg() -> PackageInfo {
        PackageInfo {
            name: "vessel".to_string(),
            product_name: Some("Vessel".to_string()),
            version: "1.2.0".to_string(),
            author: Some("Acme Inc".to_string()),
            description: Some("Data exploration for humans".to_string()),
            app_bundle_id: Some("com.acme.vessel".to_string()),
            ..Default::default()
        }
    }

    fn config(platform: &str, version: &str) -> ReleaseConfig {
        ReleaseConfig::new(ReleaseOptions {
            sourcedir: PathBuf::from("/tmp/vessel"),
            platform: Platform::parse(platform),
            arch: "x64".to_string(),
            version: Some(version.to_string()),
            pkg: pkg(),
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_version_rejected() {
        let err = ReleaseConfig::new(ReleaseOptions {
            sourcedir: PathBuf::from("/tmp/vessel"),
            platform: Platform::Darwin,
            arch: "x64".to_string(),
            version: Some("not-a-version".to_string()),
            pkg: pkg(),
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { .. }));
    }

    #[test]
    fn test_channel_and_product_name() {
        assert_eq!(config("darwin", "1.2.0").channel().unwrap(), Channel::Stable);
        assert_eq!(
            config("darwin", "1.2.0").product_name().unwrap(),
            "Vessel"
        );
        assert_eq!(
            config("darwin", "1.2.0-beta.1").product_name().unwrap(),
            "Vessel (Beta)"
        );
        assert_eq!(
            config("darwin", "1.2.0-dev.4").product_name().unwrap(),
            "Vessel (Development)"
        );
        assert_eq!(
            config("darwin", "1.2.0-alpha.1").product_name().unwrap(),
            "Vessel Alpha"
        );
    }

    #[test]
    fn test_darwin_bundle_id_channel_suffix() {
        let stable = config("darwin", "1.2.0");
        assert_eq!(
            stable.property(props::BUNDLE_ID).unwrap(),
            json!("com.acme.vessel")
        );

        let beta = config("darwin", "1.2.0-beta.1");
        assert_eq!(
            beta.property(props::BUNDLE_ID).unwrap(),
            json!("com.acme.vessel.beta")
        );

        let alpha = config("darwin", "1.2.0-alpha.1");
        assert_eq!(
            alpha.property(props::BUNDLE_ID).unwrap(),
            json!("com.acme.vessel.alpha")
        );
    }

    #[test]
    fn test_darwin_assets() {
        let config = config("darwin", "1.2.0");
        let assets = config.assets().unwrap();
        let names: Vec<_> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["vessel.dmg", "vessel-mac.zip"]);
        assert!(assets[0]
            .path
            .to_string_lossy()
            .ends_with("dist/vessel.dmg"));
    }

    #[test]
    fn test_darwin_resources_uses_product_name() {
        let config = config("darwin", "1.2.0-beta.1");
        let resources = config.resources().unwrap();
        assert!(resources
            .to_string_lossy()
            .contains("Vessel (Beta).app/Contents/Resources"));
    }

    #[test]
    fn test_win32_assets_carry_channel_in_names() {
        let config = config("win32", "1.2.0-custom.5");
        let assets = config.assets().unwrap();
        let names: Vec<_> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Vessel CustomSetup.msi",
                "Vessel CustomSetup.exe",
                "RELEASES",
                "vessel-1.2.0-custom.5-full.nupkg",
                "vessel-windows.zip",
            ]
        );
        // Paths stay keyed on the package name, not the display name.
        assert!(assets[0]
            .path
            .to_string_lossy()
            .ends_with("dist/vesselSetup.msi"));
    }

    #[test]
    fn test_win32_packager_options_version_string() {
        let config = config("win32", "1.2.0");
        let options = config.packager_options().unwrap();
        let vs = &options["version_string"];
        assert_eq!(vs["company_name"], "Acme Inc");
        assert_eq!(vs["product_name"], "Vessel");
        assert_eq!(vs["internal_name"], "vessel");
        assert_eq!(vs["file_description"], "Data exploration for humans");
    }

    #[test]
    fn test_win32_installer_options_shape() {
        let config = config("win32", "1.2.0");
        let options = config.installer_options().unwrap().unwrap();
        assert!(options["app_directory"]
            .as_str()
            .unwrap()
            .ends_with("vessel-win32-x64"));
        assert!(options["output_directory"].as_str().unwrap().ends_with("dist"));
        assert_eq!(options["title"], "Vessel");
    }

    #[test]
    fn test_linux_assets_and_no_installer() {
        let config = config("linux", "1.2.0");
        let assets = config.assets().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "vessel-linux.tar.gz");
        assert_eq!(config.installer_options().unwrap(), None);
    }

    #[test]
    fn test_unknown_platform_minimal_variant() {
        let config = config("freebsd", "1.2.0");
        assert!(config.assets().unwrap().is_empty());
        assert_eq!(config.installer_options().unwrap(), None);
        // The rest of the configuration still resolves.
        assert_eq!(config.product_name().unwrap(), "Vessel");
    }

    #[test]
    fn test_version_change_recomputes_derived() {
        let mut config = config("darwin", "1.2.0");
        assert_eq!(config.channel().unwrap(), Channel::Stable);

        config
            .set_property(props::VERSION, json!("1.3.0-beta.1"))
            .unwrap();
        assert_eq!(config.channel().unwrap(), Channel::Beta);
        assert_eq!(config.product_name().unwrap(), "Vessel (Beta)");
        assert_eq!(
            config.property(props::BUNDLE_ID).unwrap(),
            json!("com.acme.vessel.beta")
        );
    }

    #[test]
    fn test_present_assets_filters_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/vessel.dmg"), b"dmg").unwrap();

        let config = ReleaseConfig::new(ReleaseOptions {
            sourcedir: dir.path().to_path_buf(),
            platform: Platform::Darwin,
            arch: "x64".to_string(),
            version: Some("1.2.0".to_string()),
            pkg: pkg(),
        })
        .unwrap();

        let present = config.present_assets().unwrap();
        assert_eq!(present.len(), 1);
        assert_eq!(present[0].name, "vessel.dmg");
    }

    #[test]
    fn test_snapshot_skips_unresolvable() {
        let snapshot = config("linux", "1.2.0").to_value();
        assert!(snapshot.get(props::INSTALLER_OPTIONS).is_none());
        assert_eq!(snapshot[props::PRODUCT_NAME], "Vessel");
        assert_eq!(snapshot[props::CHANNEL]["name"], "stable");
    }
}
