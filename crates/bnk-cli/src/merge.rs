//! Planning for `bnk merge`: which patch supplies each changed sub-file.

use std::fmt;

use bnk::SubFileMarshaller;
use clap::ValueEnum;

/// Which patch wins when several change the same sub-file differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Prefer {
    First,
    Last,
}

/// Several patches change one sub-file to different bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub id: u32,
    /// Indices into the patch list, in order.
    pub patches: Vec<usize>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-file {} changed by patches {:?}", self.id, self.patches)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// `(id, patch index)` in vanilla index order.
    pub picks: Vec<(u32, usize)>,
    /// Left unresolved because no preference was given.
    pub conflicts: Vec<Conflict>,
}

/// Work out, for every vanilla sub-file, which patch (if any) replaces it.
///
/// Patches that agree byte-for-byte are not a conflict. Ids a patch has but
/// vanilla lacks are ignored; a merge never adds sub-files.
pub fn plan_merge(
    vanilla: &SubFileMarshaller,
    patches: &[&SubFileMarshaller],
    prefer: Option<Prefer>,
) -> MergePlan {
    let mut plan = MergePlan::default();

    for id in vanilla.ids() {
        let changed: Vec<usize> = patches
            .iter()
            .enumerate()
            .filter(|(_, p)| vanilla.same_content(p, id) == Some(false))
            .map(|(i, _)| i)
            .collect();
        let (Some(&first), Some(&last)) = (changed.first(), changed.last()) else {
            continue;
        };

        let agree = changed
            .iter()
            .all(|&i| patches[i].same_content(patches[first], id) == Some(true));
        let pick = match (agree, prefer) {
            (true, _) | (false, Some(Prefer::First)) => first,
            (false, Some(Prefer::Last)) => last,
            (false, None) => {
                plan.conflicts.push(Conflict {
                    id,
                    patches: changed,
                });
                continue;
            }
        };
        if !agree {
            tracing::info!(id, patch = pick, candidates = changed.len(), "resolved conflict");
        }
        plan.picks.push((id, pick));
    }

    for (i, patch) in patches.iter().enumerate() {
        for id in patch.ids().filter(|&id| vanilla.lookup(id).is_none()) {
            tracing::warn!(id, patch = i, "sub-file not in vanilla bank, ignored");
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marshaller(files: &[(u32, u8)]) -> SubFileMarshaller {
        SubFileMarshaller::from_files(files.iter().map(|&(id, b)| (id, vec![b; 4]))).unwrap()
    }

    #[test]
    fn picks_only_changed_files() {
        let vanilla = marshaller(&[(1, 0), (2, 0), (3, 0)]);
        let a = marshaller(&[(1, 0), (2, 5), (3, 0)]);
        let b = marshaller(&[(1, 0), (2, 0), (3, 6), (9, 9)]);

        let plan = plan_merge(&vanilla, &[&a, &b], None);
        assert_eq!(plan.picks, [(2, 0), (3, 1)]);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn identical_changes_do_not_conflict() {
        let vanilla = marshaller(&[(1, 0)]);
        let a = marshaller(&[(1, 5)]);
        let b = marshaller(&[(1, 5)]);
        let plan = plan_merge(&vanilla, &[&a, &b], None);
        assert_eq!(plan.picks, [(1, 0)]);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn disagreement_needs_a_preference() {
        let vanilla = marshaller(&[(1, 0), (2, 0)]);
        let a = marshaller(&[(1, 5), (2, 0)]);
        let b = marshaller(&[(1, 0), (2, 0)]);
        let c = marshaller(&[(1, 7), (2, 0)]);
        let patches = [&a, &b, &c];

        let plan = plan_merge(&vanilla, &patches, None);
        assert!(plan.picks.is_empty());
        assert_eq!(
            plan.conflicts,
            [Conflict {
                id: 1,
                patches: vec![0, 2]
            }]
        );

        assert_eq!(
            plan_merge(&vanilla, &patches, Some(Prefer::First)).picks,
            [(1, 0)]
        );
        assert_eq!(
            plan_merge(&vanilla, &patches, Some(Prefer::Last)).picks,
            [(1, 2)]
        );
    }
}
