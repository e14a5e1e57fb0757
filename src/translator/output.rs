// src/translator/output.rs
//! Writing translated descriptors to disk

use super::{ArtifactOwner, TranslationOutput};
use crate::descriptor::{DescriptorFormat, DescriptorKind};
use crate::error::{Error, Result};
use crate::package::PackageBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub format: DescriptorFormat,
    /// Write descriptor packages instead of bare descriptor files
    pub archive: bool,
}

/// File-system safe stem for a descriptor name
pub(crate) fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
        .collect();
    if stem.is_empty() { "descriptor".to_string() } else { stem }
}

/// Output names already used in one `write` call
///
/// Plain files carry the kind in their name, packages do not, so a VNFD and
/// an NSD with the same name only clash when archiving.
struct UsedNames {
    archive: bool,
    used: HashSet<String>,
}

impl UsedNames {
    fn new(archive: bool) -> Self {
        Self {
            archive,
            used: HashSet::new(),
        }
    }

    fn key(&self, kind: DescriptorKind, stem: &str) -> String {
        if self.archive { stem.to_string() } else { format!("{}_{}", stem, kind) }
    }

    /// Stem for a descriptor: its name, then name and id, then a counter
    fn claim(&mut self, kind: DescriptorKind, name: &str, id: &str) -> String {
        let base = file_stem(name);
        let with_id = format!("{}_{}", base, file_stem(id));
        let stem = [base.clone(), with_id.clone()]
            .into_iter()
            .chain((2..).map(|n| format!("{}_{}", with_id, n)))
            .find(|stem| !self.used.contains(&self.key(kind, stem)))
            .unwrap_or_else(|| base.clone());
        if stem != base {
            warn!("{} name '{}' already written, using '{}' instead", kind, base, stem);
        }
        self.used.insert(self.key(kind, &stem));
        stem
    }
}

impl TranslationOutput {
    /// Write every VNFD and the NSD into `out_dir`
    ///
    /// With `archive`, artifacts are copied from `source_dir` into the
    /// package of the descriptor that owns them; missing artifacts are
    /// reported and left out.
    pub fn write(&self, out_dir: &Path, source_dir: &Path, options: OutputOptions) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)
            .map_err(|e| Error::IoError(format!("Failed to create {}: {}", out_dir.display(), e)))?;

        let mut names = UsedNames::new(options.archive);
        let mut written = Vec::new();
        for vnfd in &self.vnfds {
            let text = vnfd.to_catalog_string(options.format)?;
            let stem = names.claim(DescriptorKind::Vnfd, vnfd.display_name(), &vnfd.id);
            let owner = ArtifactOwner::Vnfd(vnfd.id.clone());
            written.push(self.write_one(DescriptorKind::Vnfd, &stem, text, &owner, out_dir, source_dir, options)?);
        }

        let text = self.nsd.to_catalog_string(options.format)?;
        let stem = names.claim(DescriptorKind::Nsd, self.nsd.display_name(), &self.nsd.id);
        written.push(self.write_one(DescriptorKind::Nsd, &stem, text, &ArtifactOwner::Nsd, out_dir, source_dir, options)?);

        info!("Wrote {} descriptor(s) to {}", written.len(), out_dir.display());
        Ok(written)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_one(
        &self,
        kind: DescriptorKind,
        stem: &str,
        text: String,
        owner: &ArtifactOwner,
        out_dir: &Path,
        source_dir: &Path,
        options: OutputOptions,
    ) -> Result<PathBuf> {
        if !options.archive {
            let path = out_dir.join(format!("{}_{}.{}", stem, kind, options.format.extension()));
            fs::write(&path, text)
                .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
            return Ok(path);
        }

        let mut builder = PackageBuilder::new(kind, stem, text).format(options.format);
        for artifact in self.artifacts.iter().filter(|a| a.owner == *owner) {
            let source = source_dir.join(&artifact.source);
            if !source.is_file() {
                warn!(
                    "Artifact {} for {} '{}' not found, leaving it out of the package",
                    source.display(),
                    kind,
                    stem
                );
                continue;
            }
            builder.add_file(artifact.kind.subdir(), &source)?;
        }
        builder.build(out_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Nsd, Vnfd};
    use crate::translator::{Artifact, ArtifactKind};

    fn output() -> TranslationOutput {
        TranslationOutput {
            nsd: Nsd {
                id: "ns1".to_string(),
                name: "ping pong".to_string(),
                ..Default::default()
            },
            vnfds: vec![Vnfd {
                id: "v1".to_string(),
                name: "ping".to_string(),
                ..Default::default()
            }],
            artifacts: vec![
                Artifact {
                    kind: ArtifactKind::CloudInit,
                    source: PathBuf::from("cloud_init/ping.cfg"),
                    owner: ArtifactOwner::Vnfd("v1".to_string()),
                },
                Artifact {
                    kind: ArtifactKind::Image,
                    source: PathBuf::from("images/missing.qcow2"),
                    owner: ArtifactOwner::Vnfd("v1".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("ping pong/ns"), "ping_pong_ns");
        assert_eq!(file_stem("ping-1.0"), "ping-1.0");
        assert_eq!(file_stem(""), "descriptor");
    }

    #[test]
    fn test_write_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        let written = output()
            .write(dir.path(), dir.path(), OutputOptions {
                format: DescriptorFormat::Json,
                archive: false,
            })
            .unwrap();
        assert_eq!(written, vec![
            dir.path().join("ping_vnfd.json"),
            dir.path().join("ping_pong_nsd.json")
        ]);
        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.contains("\"vnfd:vnfd-catalog\""));
    }

    #[test]
    fn test_write_archives_with_artifacts() {
        let src = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("cloud_init")).unwrap();
        fs::write(src.path().join("cloud_init/ping.cfg"), "#cloud-config\n").unwrap();

        let out = tempfile::tempdir().unwrap();
        let written = output()
            .write(out.path(), src.path(), OutputOptions {
                format: DescriptorFormat::Yaml,
                archive: true,
            })
            .unwrap();
        assert_eq!(written[0], out.path().join("ping.tar.gz"));

        let report = crate::package::inspect(&written[0]).unwrap();
        assert!(report.is_valid());
        assert!(report.entries.iter().any(|e| e.path == "cloud_init/ping.cfg"));
        assert!(!report.entries.iter().any(|e| e.path.starts_with("images/")));
    }

    #[test]
    fn test_same_named_vnfds_get_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let vnfd = |id: &str| Vnfd {
            id: id.to_string(),
            name: "fw".to_string(),
            ..Default::default()
        };
        let output = TranslationOutput {
            nsd: Nsd {
                id: "ns".to_string(),
                name: "ns".to_string(),
                ..Default::default()
            },
            vnfds: vec![vnfd("a"), vnfd("b")],
            artifacts: Vec::new(),
        };
        let written = output.write(dir.path(), dir.path(), OutputOptions::default()).unwrap();
        assert_eq!(written, vec![
            dir.path().join("fw_vnfd.yaml"),
            dir.path().join("fw_b_vnfd.yaml"),
            dir.path().join("ns_nsd.yaml")
        ]);
        assert!(fs::read_to_string(&written[0]).unwrap().contains("id: a"));
        assert!(fs::read_to_string(&written[1]).unwrap().contains("id: b"));
    }

    #[test]
    fn test_nsd_package_does_not_replace_vnfd_package() {
        let out = tempfile::tempdir().unwrap();
        let output = TranslationOutput {
            nsd: Nsd {
                id: "ping_ns".to_string(),
                name: "ping".to_string(),
                ..Default::default()
            },
            vnfds: vec![Vnfd {
                id: "ping_vnf".to_string(),
                name: "ping".to_string(),
                ..Default::default()
            }],
            artifacts: Vec::new(),
        };
        let written = output
            .write(out.path(), out.path(), OutputOptions {
                format: DescriptorFormat::Yaml,
                archive: true,
            })
            .unwrap();
        assert_eq!(written, vec![
            out.path().join("ping.tar.gz"),
            out.path().join("ping_ping_ns.tar.gz")
        ]);

        let vnfd_package = crate::package::inspect(&written[0]).unwrap();
        assert_eq!(vnfd_package.kind, Some(DescriptorKind::Vnfd));
        let nsd_package = crate::package::inspect(&written[1]).unwrap();
        assert_eq!(nsd_package.kind, Some(DescriptorKind::Nsd));
    }
}
