use std::path::{Path, PathBuf};

use crate::backend::FileOp;
use crate::error::{ExplorerError, Result};

/// The four clipboard-like operations that can be staged ahead of a paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Copy,
    Cut,
    Symlink,
    Hardlink,
}

impl IntentKind {
    pub fn label(self) -> &'static str {
        match self {
            IntentKind::Copy => "copy",
            IntentKind::Cut => "cut",
            IntentKind::Symlink => "symlink",
            IntentKind::Hardlink => "hardlink",
        }
    }
}

/// A staged operation waiting for a paste target. The source paths are a
/// snapshot taken when the intent was created; later selection changes do
/// not affect it. At most one intent exists at a time and staging a new one
/// replaces the old outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationIntent {
    pub kind: IntentKind,
    pub source_paths: Vec<PathBuf>,
}

impl OperationIntent {
    /// Stages `paths` under `kind`. An empty snapshot is useless, so it is
    /// rejected before it can shadow a previous intent.
    pub fn stage(kind: IntentKind, paths: Vec<PathBuf>) -> Result<Self> {
        if paths.is_empty() {
            return Err(ExplorerError::precondition(format!(
                "nothing selected to {}",
                kind.label()
            )));
        }
        Ok(OperationIntent {
            kind,
            source_paths: paths,
        })
    }

    pub fn len(&self) -> usize {
        self.source_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_paths.is_empty()
    }

    /// Resolves this intent against a destination directory into the backend
    /// operations a paste must run, in source order. Fails up-front if any
    /// source has no final component to name the pasted entry after (a bare
    /// root, for instance), so a paste never half-plans.
    pub fn paste_ops(&self, destination: &Path) -> Result<Vec<FileOp>> {
        let mut ops = Vec::with_capacity(self.source_paths.len());
        for src in &self.source_paths {
            let Some(file_name) = src.file_name() else {
                return Err(ExplorerError::precondition(format!(
                    "cannot paste {}: it has no name to paste under",
                    src.display()
                )));
            };
            let dst = destination.join(file_name);
            ops.push(match self.kind {
                IntentKind::Copy => FileOp::Copy {
                    src: src.clone(),
                    dst,
                    overwrite: false,
                },
                IntentKind::Cut => FileOp::Move {
                    src: src.clone(),
                    dst,
                    overwrite: false,
                },
                IntentKind::Symlink => FileOp::Symlink {
                    src: src.clone(),
                    link: dst,
                },
                IntentKind::Hardlink => FileOp::Hardlink {
                    src: src.clone(),
                    dst,
                },
            });
        }
        Ok(ops)
    }

    /// Whether a successful paste should clear this intent. A cut moves its
    /// sources away, so it is single-use; the link and copy kinds remain
    /// valid targets for further pastes.
    pub fn single_use(&self) -> bool {
        self.kind == IntentKind::Cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn staging_with_no_paths_is_rejected() {
        let err = OperationIntent::stage(IntentKind::Copy, Vec::new()).unwrap_err();
        assert!(matches!(err, ExplorerError::Precondition(_)));
    }

    #[test]
    fn copy_paste_plans_one_copy_per_source_in_order() {
        let intent = OperationIntent::stage(IntentKind::Copy, paths(&["/a/x", "/a/y"])).unwrap();
        let ops = intent.paste_ops(Path::new("/dest")).unwrap();
        assert_eq!(
            ops,
            vec![
                FileOp::Copy {
                    src: PathBuf::from("/a/x"),
                    dst: PathBuf::from("/dest/x"),
                    overwrite: false,
                },
                FileOp::Copy {
                    src: PathBuf::from("/a/y"),
                    dst: PathBuf::from("/dest/y"),
                    overwrite: false,
                },
            ]
        );
    }

    #[test]
    fn cut_paste_plans_moves() {
        let intent = OperationIntent::stage(IntentKind::Cut, paths(&["/a/x"])).unwrap();
        let ops = intent.paste_ops(Path::new("/dest")).unwrap();
        assert_eq!(
            ops,
            vec![FileOp::Move {
                src: PathBuf::from("/a/x"),
                dst: PathBuf::from("/dest/x"),
                overwrite: false,
            }]
        );
        assert!(intent.single_use());
    }

    #[test]
    fn link_kinds_plan_links_and_are_reusable() {
        let intent = OperationIntent::stage(IntentKind::Symlink, paths(&["/a/x"])).unwrap();
        let ops = intent.paste_ops(Path::new("/dest")).unwrap();
        assert_eq!(
            ops,
            vec![FileOp::Symlink {
                src: PathBuf::from("/a/x"),
                link: PathBuf::from("/dest/x"),
            }]
        );
        assert!(!intent.single_use());

        let intent = OperationIntent::stage(IntentKind::Hardlink, paths(&["/a/x"])).unwrap();
        let ops = intent.paste_ops(Path::new("/dest")).unwrap();
        assert_eq!(
            ops,
            vec![FileOp::Hardlink {
                src: PathBuf::from("/a/x"),
                dst: PathBuf::from("/dest/x"),
            }]
        );
        assert!(!intent.single_use());
    }

    #[test]
    fn a_nameless_source_fails_the_whole_plan() {
        let intent = OperationIntent::stage(IntentKind::Copy, paths(&["/a/x", "/"])).unwrap();
        let err = intent.paste_ops(Path::new("/dest")).unwrap_err();
        assert!(matches!(err, ExplorerError::Precondition(_)));
    }
}
