//! Loading of TOML run files.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use spore_colony_core::{BuildingConfig, BuildingKind, ColonyConfig};

/// Contents of a run file: the colony configuration plus an optional `[run]` table.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct RunFile {
    #[serde(flatten)]
    pub(crate) colony: ColonyConfig,
    pub(crate) run: RunSettings,
}

/// Tick count and build requests stored alongside the colony configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct RunSettings {
    pub(crate) ticks: u64,
    pub(crate) build: Vec<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            ticks: 100,
            build: Vec::new(),
        }
    }
}

pub(crate) fn load(path: &Path) -> Result<RunFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read run file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid run file {}", path.display()))
}

pub(crate) fn parse(contents: &str) -> Result<RunFile> {
    let file: RunFile = toml::from_str(contents).context("failed to parse run file toml contents")?;
    file.colony
        .validate()
        .context("colony configuration rejected")?;
    Ok(file)
}

/// Resolves a build request given either as a numeric code or a catalog name.
///
/// Names match case-insensitively and treat `_` and `-` like spaces.
pub(crate) fn resolve_kind(catalog: &BuildingConfig, request: &str) -> Result<BuildingKind> {
    if let Ok(code) = request.trim().parse::<u16>() {
        let kind = BuildingKind::new(code);
        if catalog.spec(kind).is_none() {
            bail!("building code {code} is not in the catalog");
        }
        return Ok(kind);
    }

    let wanted = normalise(request);
    let Some(spec) = catalog.kinds.iter().find(|spec| normalise(&spec.name) == wanted) else {
        let known = catalog
            .kinds
            .iter()
            .map(|spec| spec.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        bail!("unknown building `{request}`; known buildings: {known}");
    };
    Ok(spec.kind)
}

fn normalise(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
