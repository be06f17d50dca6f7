//! Output paths, atomic writes and generation reports

use crate::card::{FieldOutcome, GenerationReport};
use crate::error::{Error, Result};
use serde_json::{Value, json};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Combined structured and human-readable representation of a generation
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Structured JSON representation suitable for scripts
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Place `path` inside `directory`, creating the directory.
///
/// Absolute paths and paths that already start with `directory` are kept
/// as given.
pub fn ensure_output_path(directory: &Path, path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(directory)?;

    if path.is_absolute() || starts_with_dir(path, directory) {
        return Ok(path.to_path_buf());
    }
    Ok(directory.join(path))
}

fn starts_with_dir(path: &Path, directory: &Path) -> bool {
    let dir = normal_components(directory);
    !dir.is_empty() && normal_components(path).starts_with(&dir)
}

fn normal_components(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Append `.svg` unless the name already ends with it.
pub fn with_svg_extension(name: &str) -> PathBuf {
    if name.ends_with(".svg") {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}.svg"))
    }
}

/// Mode of written files, independent of the umask.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

/// Write `contents` to `path` through a temporary file in the same
/// directory, renamed into place once complete.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let failed = |source: std::io::Error| Error::Serialization {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(failed)?;
    file.write_all(contents).map_err(failed)?;
    file.flush().map_err(failed)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(OUTPUT_MODE))
            .map_err(failed)?;
    }
    file.persist(path).map_err(|e| failed(e.error))?;
    Ok(())
}

/// Render a generation report into both JSON and human-readable forms.
pub fn render_report(report: &GenerationReport, pdf: Option<&Path>) -> RenderedReport {
    let fields: serde_json::Map<String, Value> = report
        .fields
        .iter()
        .map(|(label, outcome)| (label.clone(), json!(outcome)))
        .collect();
    let viewport = &report.layout.viewport;

    let json = json!({
        "svg": report.output,
        "pdf": pdf,
        "template": report.template,
        "fields": fields,
        "payload_bytes": report.payload_bytes,
        "modules": report.modules,
        "error_correction": report.error_correction,
        "viewport": [viewport.x, viewport.y, viewport.width, viewport.height],
    });

    let mut human = Vec::new();
    match &report.output {
        Some(path) => human.push(format!("Generated SVG card: {}", path.display())),
        None => human.push("Rendered SVG card".to_string()),
    }
    if let Some(pdf) = pdf {
        human.push(format!("Generated PDF card: {}", pdf.display()));
    }
    for (label, outcome) in &report.fields {
        if *outcome == FieldOutcome::Missing {
            human.push(format!("  Warning: field '{label}' not found in template"));
        }
    }
    human.push(format!(
        "  Scan symbol: {}x{} modules, level {:?}, {} byte payload",
        report.modules, report.modules, report.error_correction, report.payload_bytes
    ));

    RenderedReport { json, human }
}
