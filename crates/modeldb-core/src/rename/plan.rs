//! Rename planning: which files must move, and which moves are unsafe.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::diagnostic::Diagnostic;
use crate::fs::TreeSnapshot;
use crate::record::derive_path;

/// One file that must move to its canonical path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenameMove {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl fmt::Display for RenameMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from.display(), self.to.display())
    }
}

/// Why a target was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Two or more files canonicalize to the same target.
    DuplicateTarget,
    /// The target is held by a file that is not moving away.
    TargetOccupied,
}

/// A target that no move was planned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameConflict {
    pub kind: ConflictKind,
    pub target: PathBuf,
    /// Every file that wanted `target`, sorted.
    pub sources: Vec<PathBuf>,
}

impl fmt::Display for RenameConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources = self
            .sources
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match self.kind {
            ConflictKind::DuplicateTarget => write!(
                f,
                "collision: {sources} all want -> {}",
                self.target.display()
            ),
            ConflictKind::TargetOccupied => write!(
                f,
                "target exists: {} is a different file that is not moving (wanted by {sources})",
                self.target.display()
            ),
        }
    }
}

/// Result of [`plan_renames`].
#[derive(Debug, Clone, Default)]
pub struct RenamePlan {
    /// Safe moves, sorted by target. Targets are unique.
    pub moves: Vec<RenameMove>,
    pub conflicts: Vec<RenameConflict>,
    /// Files that could not be planned at all (unreadable, malformed, no identity).
    pub diagnostics: Vec<Diagnostic>,
}

impl RenamePlan {
    /// `true` when nothing was refused and nothing was malformed.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.diagnostics.is_empty()
    }
}

/// Plans the moves that bring each of `candidates` to its canonical path.
///
/// Pure function of `snapshot`: file contents and occupancy both come from it.
///
/// - Files already at their canonical path produce no move.
/// - When several files want one target, none of them moves and a single
///   [`ConflictKind::DuplicateTarget`] conflict lists all of them.
/// - A target held by a file that is not itself moving away is refused with
///   [`ConflictKind::TargetOccupied`]. Refusals cascade: a move into the
///   current path of a refused file is refused too.
/// - A target held by a file that *is* moving away (chains, cycles) is fine;
///   the executor's staging handles it.
pub fn plan_renames(snapshot: &TreeSnapshot, candidates: &[PathBuf]) -> RenamePlan {
    let mut plan = RenamePlan::default();
    let mut claims: BTreeMap<PathBuf, BTreeSet<PathBuf>> = BTreeMap::new();
    let mut visited: BTreeSet<&Path> = BTreeSet::new();

    for current in candidates {
        if !visited.insert(current.as_path()) {
            continue;
        }

        let record = match snapshot.load_record(current) {
            Ok(record) => record,
            Err(diag) => {
                tracing::warn!("{diag}");
                plan.diagnostics.push(diag);
                continue;
            }
        };

        let location = derive_path(&record);
        if let Some(field) = location.degenerate_field() {
            let diag = Diagnostic::for_path(
                current,
                format!("cannot derive canonical path: \"{field}\" is missing or slugs to nothing"),
            );
            tracing::warn!("{diag}");
            plan.diagnostics.push(diag);
            continue;
        }

        let target = location.under(snapshot.root());
        if target == *current {
            tracing::debug!("already canonical: {}", current.display());
            continue;
        }
        claims.entry(target).or_default().insert(current.clone());
    }

    let mut accepted: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
    for (target, sources) in claims {
        if sources.len() > 1 {
            plan.conflicts.push(RenameConflict {
                kind: ConflictKind::DuplicateTarget,
                target,
                sources: sources.into_iter().collect(),
            });
        } else if let Some(source) = sources.into_iter().next() {
            accepted.insert(target, source);
        }
    }

    loop {
        let blocked: Vec<PathBuf> = {
            let moving: BTreeSet<&PathBuf> = accepted.values().collect();
            accepted
                .keys()
                .filter(|target| snapshot.contains(target) && !moving.contains(target))
                .cloned()
                .collect()
        };
        if blocked.is_empty() {
            break;
        }
        for target in blocked {
            if let Some(source) = accepted.remove(&target) {
                plan.conflicts.push(RenameConflict {
                    kind: ConflictKind::TargetOccupied,
                    target,
                    sources: vec![source],
                });
            }
        }
    }

    for conflict in &plan.conflicts {
        tracing::warn!("{conflict}");
    }

    plan.moves = accepted
        .into_iter()
        .map(|(to, from)| RenameMove { from, to })
        .collect();
    plan
}
