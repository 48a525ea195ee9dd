//! Build command: package a config and its processor sources into a ZIP
//! archive for uploading to the backend.
//!
//! The archive always carries the config as `config.yaml` at the root.
//! Processor sources come from the module directory (or single module file)
//! named by `processor_class`, resolved next to the config; Python cache
//! artifacts are excluded. Dependency manifests found next to the config
//! (`requirements.txt`, `pyproject.toml`, `package.json`) are included
//! unless `--no-deps` is given.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use orchael_config::{load_config, validate_for_build};

const DEPENDENCY_FILES: [&str; 3] = ["requirements.txt", "pyproject.toml", "package.json"];

pub fn run(
    config: PathBuf,
    output: PathBuf,
    include_dependencies: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() {
        warn!(path = %output.display(), "Output file already exists and will be overwritten");
    }

    let config_data = load_config(&config)?;
    let (_agent_type, runtime_version) = validate_for_build(&config_data)?;

    let config_abs = std::path::absolute(&config)?;
    let config_dir = config_abs
        .parent()
        .ok_or("config file has no parent directory")?;

    // (source path, archive name) pairs, config first
    let mut entries: Vec<(PathBuf, String)> = vec![(config_abs.clone(), "config.yaml".into())];
    collect_module_sources(&config_data.processor_class, config_dir, &mut entries)?;

    if include_dependencies {
        for dep_file in DEPENDENCY_FILES {
            let dep_path = config_dir.join(dep_file);
            if dep_path.exists() {
                entries.push((dep_path, dep_file.to_string()));
            }
        }
    }

    write_archive(&output, &entries)?;

    println!("Successfully created agent package: {}", output.display());
    println!(
        "  Agent type: {}",
        config_data.agent_type.as_deref().unwrap_or_default()
    );
    println!("  Runtime version: {runtime_version}");
    println!("  Processor class: {}", config_data.processor_class);

    Ok(())
}

/// Find the source files behind `processor_class`, relative to the config
/// directory.
///
/// `pkg.mod.Class` maps to the directory `pkg/mod/` when it exists, else the
/// file `pkg/mod.py`. A dotless class name packages every non-dunder `.py`
/// file sitting next to the config.
fn collect_module_sources(
    processor_class: &str,
    config_dir: &Path,
    entries: &mut Vec<(PathBuf, String)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some((module_path, _class_name)) = processor_class.rsplit_once('.') else {
        for entry in std::fs::read_dir(config_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".py") && !name.starts_with("__") && entry.path().is_file() {
                entries.push((entry.path(), name));
            }
        }
        return Ok(());
    };

    let module_rel = module_path.replace('.', "/");
    let module_dir = config_dir.join(&module_rel);

    if module_dir.is_dir() {
        collect_dir(&module_dir, &module_rel, entries)?;
        return Ok(());
    }

    let module_file = config_dir.join(format!("{module_rel}.py"));
    if module_file.is_file() {
        entries.push((module_file, format!("{module_rel}.py")));
        return Ok(());
    }

    Err(format!(
        "could not find module directory or file: {}",
        module_dir.display()
    )
    .into())
}

/// Recursively collect files under `dir`, skipping `__pycache__` directories
/// and Python cache files.
fn collect_dir(
    dir: &Path,
    prefix: &str,
    entries: &mut Vec<(PathBuf, String)>,
) -> Result<(), Box<dyn std::error::Error>> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if path.is_dir() {
            if name != "__pycache__" {
                collect_dir(&path, &format!("{prefix}/{name}"), entries)?;
            }
        } else if !is_cache_file(&name) {
            entries.push((path, format!("{prefix}/{name}")));
        }
    }
    Ok(())
}

fn is_cache_file(name: &str) -> bool {
    name.ends_with(".pyc") || name.ends_with(".pyo") || name.ends_with(".pyd")
}

fn write_archive(
    output: &Path,
    entries: &[(PathBuf, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(output)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, arcname) in entries {
        writer.start_file(arcname.as_str(), options)?;
        writer.write_all(&std::fs::read(path)?)?;
    }

    writer.finish()?;
    Ok(())
}
