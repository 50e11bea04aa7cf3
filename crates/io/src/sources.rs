// Source file resolution, existence checks and loading

use std::path::{Path, PathBuf};

use taxsync_recon::config::ReconConfig;
use taxsync_recon::model::ReconInput;
use taxsync_recon::source::SourceKind;
use taxsync_recon::{ReconError, Table};

/// One configured input file, resolved against the config's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub kind: SourceKind,
    pub path: PathBuf,
    pub sheet: Option<String>,
}

impl SourceFile {
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Resolve the three source paths. Relative paths are taken relative to `base_dir`.
pub fn resolve_sources(config: &ReconConfig, base_dir: &Path) -> [SourceFile; 3] {
    let resolve = |file: &str| {
        let p = Path::new(file);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            base_dir.join(p)
        }
    };
    let s = &config.sources;
    [
        SourceFile {
            kind: SourceKind::Apex,
            path: resolve(&s.apex.file),
            sheet: s.apex.sheet.clone(),
        },
        SourceFile {
            kind: SourceKind::Command,
            path: resolve(&s.command.file),
            sheet: s.command.sheet.clone(),
        },
        SourceFile {
            kind: SourceKind::Edits,
            path: resolve(&s.edits.file),
            sheet: s.edits.sheet.clone(),
        },
    ]
}

/// Fail with `SourceUnavailable` for the first missing file. Every missing
/// file is logged.
pub fn check_sources(sources: &[SourceFile]) -> Result<(), ReconError> {
    let missing: Vec<&SourceFile> = sources.iter().filter(|s| !s.exists()).collect();
    for s in &missing {
        tracing::warn!(source = %s.kind, path = %s.path.display(), "source file not found");
    }
    match missing.first() {
        Some(s) => Err(ReconError::SourceUnavailable {
            source: s.kind,
            path: s.path.display().to_string(),
        }),
        None => Ok(()),
    }
}

fn load_source(source: &SourceFile) -> Result<Table, ReconError> {
    let table = crate::load_table(&source.path, source.sheet.as_deref()).map_err(|message| {
        ReconError::Read {
            source: source.kind,
            message,
        }
    })?;
    tracing::info!(
        source = %source.kind,
        path = %source.path.display(),
        rows = table.row_count(),
        "source loaded"
    );
    Ok(table)
}

/// Check all three sources, then read them. Nothing is read unless every file exists.
pub fn load_sources(config: &ReconConfig, base_dir: &Path) -> Result<ReconInput, ReconError> {
    let [apex, command, edits] = resolve_sources(config, base_dir);
    check_sources(&[apex.clone(), command.clone(), edits.clone()])?;

    Ok(ReconInput {
        apex: load_source(&apex)?,
        command: load_source(&command)?,
        edits: load_source(&edits)?,
    })
}
