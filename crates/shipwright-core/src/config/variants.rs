//! Platform variants
//!
//! Each variant overrides exactly the derived properties that are
//! platform-specific: the asset manifest, installer options, resource
//! layout, and (on darwin) the bundle identifier. Everything else stays on
//! the base declarations.

use super::{join_path, opt_str, props, req_str};
use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::graph::{DepValues, PropertyGraph};
use crate::platform::Platform;
use serde_json::{json, Map, Value};

/// Platform-specific overrides applied once at configuration build time
pub trait PlatformVariant {
    fn apply(&self, graph: &mut PropertyGraph) -> Result<()>;
}

/// Select the variant for a platform
pub fn variant_for(platform: &Platform) -> Box<dyn PlatformVariant> {
    match platform {
        Platform::Darwin => Box::new(DarwinVariant),
        Platform::Win32 => Box::new(Win32Variant),
        Platform::Linux => Box::new(LinuxVariant),
        Platform::Other(_) => Box::new(GenericVariant),
    }
}

struct DarwinVariant;
struct Win32Variant;
struct LinuxVariant;

/// Minimal variant for platforms we can configure but not package
struct GenericVariant;

impl PlatformVariant for DarwinVariant {
    fn apply(&self, graph: &mut PropertyGraph) -> Result<()> {
        graph.declare_derived(
            props::BUNDLE_ID,
            &[props::APP_BUNDLE_ID, props::CHANNEL],
            |values| {
                let Some(base) = opt_str(values, props::APP_BUNDLE_ID) else {
                    return Ok(Value::Null);
                };
                let channel: Channel = serde_json::from_value(values[props::CHANNEL].clone())?;
                Ok(match channel.identifier_suffix() {
                    Some(suffix) => json!(format!("{base}{suffix}")),
                    None => json!(base),
                })
            },
        )?;

        graph.declare_derived(
            props::APP_PATH,
            &[props::PACKAGER_BASENAME, props::PRODUCT_NAME],
            |values| {
                let basename = req_str(values, props::PACKAGER_BASENAME)?;
                let product = req_str(values, props::PRODUCT_NAME)?;
                Ok(json!(join_path(&basename, &format!("{product}.app"))))
            },
        )?;

        graph.declare_derived(
            props::RESOURCES,
            &[props::APP_PATH],
            |values| {
                let app_path = req_str(values, props::APP_PATH)?;
                Ok(json!(join_path(&app_path, "Contents/Resources")))
            },
        )?;

        graph.declare_derived(
            props::PACKAGER_OPTIONS,
            &[props::COMMON_PACKAGER_OPTIONS, props::BUNDLE_ID],
            |values| {
                let mut options = object(values, props::COMMON_PACKAGER_OPTIONS)?;
                options.insert("bundle_id".to_string(), values[props::BUNDLE_ID].clone());
                Ok(Value::Object(options))
            },
        )?;

        graph.declare_derived(
            props::INSTALLER_OPTIONS,
            &[props::OUT, props::ICON, props::APP_PATH],
            |values| {
                Ok(json!({
                    "overwrite": true,
                    "out": values[props::OUT],
                    "icon": values[props::ICON],
                    "app_path": values[props::APP_PATH],
                }))
            },
        )?;

        graph.declare_derived(
            props::ASSETS,
            &[props::NAME, props::SOURCEDIR],
            |values| {
                let name = req_str(values, props::NAME)?;
                let sourcedir = req_str(values, props::SOURCEDIR)?;
                Ok(json!([
                    dist_asset(&sourcedir, format!("{name}.dmg"), None),
                    dist_asset(&sourcedir, format!("{name}-mac.zip"), None),
                ]))
            },
        )?;

        Ok(())
    }
}

impl PlatformVariant for Win32Variant {
    fn apply(&self, graph: &mut PropertyGraph) -> Result<()> {
        graph.declare_derived(
            props::PACKAGER_OPTIONS,
            &[
                props::COMMON_PACKAGER_OPTIONS,
                props::AUTHOR,
                props::DESCRIPTION,
                props::PRODUCT_NAME,
                props::NAME,
            ],
            |values| {
                let mut options = object(values, props::COMMON_PACKAGER_OPTIONS)?;
                options.insert(
                    "version_string".to_string(),
                    json!({
                        "company_name": values[props::AUTHOR],
                        "file_description": values[props::DESCRIPTION],
                        "product_name": values[props::PRODUCT_NAME],
                        "internal_name": values[props::NAME],
                    }),
                );
                Ok(Value::Object(options))
            },
        )?;

        graph.declare_derived(
            props::INSTALLER_OPTIONS,
            &[
                props::PACKAGER_BASENAME,
                props::OUT,
                props::ICON,
                props::PRODUCT_NAME,
                props::NAME,
            ],
            |values| {
                Ok(json!({
                    "app_directory": values[props::PACKAGER_BASENAME],
                    "output_directory": values[props::OUT],
                    "setup_icon": values[props::ICON],
                    "title": values[props::PRODUCT_NAME],
                    "name": values[props::NAME],
                }))
            },
        )?;

        graph.declare_derived(
            props::ASSETS,
            &[
                props::NAME,
                props::PRODUCT_NAME,
                props::VERSION,
                props::SOURCEDIR,
            ],
            |values| {
                let name = req_str(values, props::NAME)?;
                let product = req_str(values, props::PRODUCT_NAME)?;
                let version = req_str(values, props::VERSION)?;
                let sourcedir = req_str(values, props::SOURCEDIR)?;
                Ok(json!([
                    dist_asset(
                        &sourcedir,
                        format!("{name}Setup.msi"),
                        Some(format!("{product}Setup.msi")),
                    ),
                    dist_asset(
                        &sourcedir,
                        format!("{name}Setup.exe"),
                        Some(format!("{product}Setup.exe")),
                    ),
                    dist_asset(&sourcedir, "RELEASES".to_string(), None),
                    dist_asset(
                        &sourcedir,
                        format!("{name}-{version}-full.nupkg"),
                        None,
                    ),
                    dist_asset(&sourcedir, format!("{name}-windows.zip"), None),
                ]))
            },
        )?;

        Ok(())
    }
}

impl PlatformVariant for LinuxVariant {
    fn apply(&self, graph: &mut PropertyGraph) -> Result<()> {
        graph.declare_derived(
            props::ASSETS,
            &[props::NAME, props::SOURCEDIR],
            |values| {
                let name = req_str(values, props::NAME)?;
                let sourcedir = req_str(values, props::SOURCEDIR)?;
                Ok(json!([dist_asset(
                    &sourcedir,
                    format!("{name}-linux.tar.gz"),
                    None
                )]))
            },
        )?;

        // installer_options stays on the base declaration, which reports the
        // platform as unsupported without failing the pipeline.
        Ok(())
    }
}

impl PlatformVariant for GenericVariant {
    fn apply(&self, _graph: &mut PropertyGraph) -> Result<()> {
        Ok(())
    }
}

/// Asset entry whose display name may differ from its on-disk filename
fn dist_asset(sourcedir: &str, filename: String, display_name: Option<String>) -> Value {
    let path = join_path(&join_path(sourcedir, "dist"), &filename);
    json!({
        "name": display_name.unwrap_or(filename),
        "path": path,
    })
}

fn object(values: &DepValues, name: &str) -> Result<Map<String, Value>> {
    values
        .get(name)
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| Error::property_type(name, "object"))
}
