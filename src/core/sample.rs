use std::path::{Path, PathBuf};

/// Name prefix marking a sample as an outgroup
pub const OUTGROUP_PREFIX: &str = "outgroup";

/// One input sample (one single-sample VCF)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,

    /// Column index in the call matrices
    pub index: usize,

    /// Outgroups are counted in statistics but never contribute variant positions
    pub is_outgroup: bool,

    /// Source VCF, when the sample came from a file
    pub path: Option<PathBuf>,
}

impl Sample {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        let name = name.into();
        let is_outgroup = name.starts_with(OUTGROUP_PREFIX);

        Self {
            name,
            index,
            is_outgroup,
            path: None,
        }
    }

    /// Build a sample from its VCF path; the name is the enclosing directory.
    pub fn from_path(path: &Path, index: usize) -> Self {
        let mut sample = Self::new(sample_name_from_path(path), index);
        sample.path = Some(path.to_path_buf());
        sample
    }
}

/// Derive a sample name from a VCF path.
///
/// Pipelines lay samples out as `<sample>/<caller output>.vcf`, so the name of the
/// directory holding the file is used. A bare file name is returned unchanged.
pub fn sample_name_from_path(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
