use std::collections::BTreeMap;

use crate::core::{find_closest, lab_centroid, lab_distance};
use crate::error::{ConfigError, SelectionError};
use crate::{Assignment, Corpus, Feature, Float};

/// A policy for picking one exemplar per cluster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Policy {
    /// Pick the member closest to the cluster's mean L\*a\*b\* color by ΔE.
    LabCenter,
    /// Pick the member with median lightness. For clusters with an even
    /// number of members, this is the brighter of the two middle members.
    LabMedianLuminance,
    /// Pick the member whose feature is closest to the target value.
    NearestToValue { feature: Feature, target: Float },
}

impl Policy {
    /// Pick the exemplar among the given members.
    ///
    /// The members are corpus indices in ascending order. Ties go to the
    /// member that comes first. This method returns `None` if there are no
    /// members.
    fn pick(&self, corpus: &Corpus, members: &[usize]) -> Option<usize> {
        let entries = corpus.entries();

        let position = match *self {
            Self::LabCenter => {
                let centroid = lab_centroid(members.iter().map(|&index| entries[index].lab()))?;
                find_closest(
                    &centroid,
                    members.iter().map(|&index| entries[index].lab()),
                    lab_distance,
                )
            }
            Self::LabMedianLuminance => {
                let mut sorted: Vec<(usize, Float)> = members
                    .iter()
                    .enumerate()
                    .map(|(position, &index)| (position, entries[index].feature(Feature::LabL)))
                    .collect();
                // Stable sort keeps original order among equal lightness.
                sorted.sort_by(|(_, l1), (_, l2)| l1.total_cmp(l2));
                sorted.get(sorted.len() / 2).map(|&(position, _)| position)
            }
            Self::NearestToValue { feature, target } => find_closest(
                &target,
                members.iter().map(|&index| entries[index].feature(feature)),
                |target, value| (target - value).abs(),
            ),
        };

        position.and_then(|position| members.get(position).copied())
    }
}

impl std::str::FromStr for Policy {
    type Err = ConfigError;

    /// Parse a policy.
    ///
    /// Valid policies are `lab_center`, `lab_lcenter`, and a feature name
    /// followed by a number, e.g., `lab_l50` or `hsl_s0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lab_center" => return Ok(Self::LabCenter),
            "lab_lcenter" => return Ok(Self::LabMedianLuminance),
            _ => {}
        }

        for feature in Feature::all() {
            let Some(number) = s.strip_prefix(feature.name()) else {
                continue;
            };

            let target = number
                .parse::<Float>()
                .map_err(|_| ConfigError::UnknownPolicy(s.to_string()))?;
            if !target.is_finite() {
                return Err(ConfigError::NonFiniteTarget(target));
            }
            return Ok(Self::NearestToValue { feature, target });
        }

        Err(ConfigError::UnknownPolicy(s.to_string()))
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::LabCenter => f.write_str("lab_center"),
            Self::LabMedianLuminance => f.write_str("lab_lcenter"),
            Self::NearestToValue { feature, target } => write!(f, "{}{}", feature, target),
        }
    }
}

// ====================================================================================================================

/// The chosen exemplars.
///
/// A selection maps cluster ids to the corpus index of their exemplar. Each
/// cluster has at most one exemplar.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    chosen: BTreeMap<usize, usize>,
}

impl Selection {
    /// Create a new, empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the entry with the given index as exemplar for the cluster.
    ///
    /// Choosing the same entry again has no effect. Choosing a different
    /// entry for a cluster that already has an exemplar fails.
    pub fn choose(&mut self, cluster: usize, index: usize) -> Result<(), SelectionError> {
        match self.chosen.get(&cluster) {
            Some(&chosen) if chosen == index => Ok(()),
            Some(&chosen) => Err(SelectionError::AlreadyChosen {
                cluster,
                chosen,
                rejected: index,
            }),
            None => {
                self.chosen.insert(cluster, index);
                Ok(())
            }
        }
    }

    /// Determine whether the entry with the given index has been chosen.
    pub fn is_chosen(&self, index: usize) -> bool {
        self.chosen.values().any(|&chosen| chosen == index)
    }

    /// Get the exemplar of the given cluster.
    pub fn get(&self, cluster: usize) -> Option<usize> {
        self.chosen.get(&cluster).copied()
    }

    /// Get the number of exemplars.
    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    /// Determine whether there are no exemplars.
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// Get the chosen corpus indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.chosen.values().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Get an iterator over cluster ids and their exemplars, ordered by
    /// cluster id.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.chosen.iter().map(|(&cluster, &index)| (cluster, index))
    }
}

/// Select one exemplar per cluster.
///
/// Every cluster with at least one member contributes exactly one exemplar;
/// a cluster with a single member contributes that member. Clusters without
/// members are skipped with a warning. This function fails if the assignment
/// does not have one cluster id per corpus entry.
pub fn select(
    corpus: &Corpus,
    assignment: &Assignment,
    policy: Policy,
) -> Result<Selection, SelectionError> {
    if assignment.len() != corpus.len() {
        return Err(SelectionError::LengthMismatch {
            expected: corpus.len(),
            actual: assignment.len(),
        });
    }

    let mut selection = Selection::new();
    for cluster in 0..assignment.count() {
        let members: Vec<usize> = assignment.members(cluster).collect();
        match policy.pick(corpus, &members) {
            Some(index) => selection.choose(cluster, index)?,
            None => log::warn!("cluster {} has no members and is skipped", cluster),
        }
    }

    log::debug!(
        "selected {} exemplars with policy {}",
        selection.len(),
        policy
    );
    Ok(selection)
}

// ====================================================================================================================

#[cfg(test)]
mod test {
    use super::{select, Policy, Selection};
    use crate::error::{ConfigError, SelectionError};
    use crate::{Assignment, Corpus, CorpusEntry, Feature, Rgb};
    use std::str::FromStr;

    fn corpus() -> Corpus {
        Corpus::from_entries(vec![
            CorpusEntry::new("black", Rgb::new(0, 0, 0)),
            CorpusEntry::new("gray", Rgb::new(128, 128, 128)),
            CorpusEntry::new("white", Rgb::new(255, 255, 255)),
            CorpusEntry::new("red", Rgb::new(255, 0, 0)),
            CorpusEntry::new("dark red", Rgb::new(139, 0, 0)),
            CorpusEntry::new("indian red", Rgb::new(205, 92, 92)),
            CorpusEntry::new("salmon", Rgb::new(250, 128, 114)),
            CorpusEntry::new("navy", Rgb::new(0, 0, 128)),
        ])
    }

    fn assignment() -> Result<Assignment, SelectionError> {
        Assignment::new(vec![0, 0, 0, 1, 1, 1, 1, 2], 3)
    }

    #[test]
    fn test_policy_names() -> Result<(), ConfigError> {
        assert_eq!(Policy::from_str("lab_center")?, Policy::LabCenter);
        assert_eq!(Policy::from_str("lab_lcenter")?, Policy::LabMedianLuminance);
        assert_eq!(
            Policy::from_str("lab_l100")?,
            Policy::NearestToValue {
                feature: Feature::LabL,
                target: 100.0
            }
        );
        assert_eq!(
            Policy::from_str("hsl_s0.5")?,
            Policy::NearestToValue {
                feature: Feature::HslS,
                target: 0.5
            }
        );
        assert_eq!(
            Policy::from_str("hsl_s"),
            Err(ConfigError::UnknownPolicy("hsl_s".to_string()))
        );
        assert_eq!(
            Policy::from_str("lab_z0"),
            Err(ConfigError::UnknownPolicy("lab_z0".to_string()))
        );
        assert!(matches!(
            Policy::from_str("lab_linf"),
            Err(ConfigError::NonFiniteTarget(_))
        ));

        for name in ["lab_center", "lab_lcenter", "lab_l50", "hsl_s0", "hsl_h0.25"] {
            assert_eq!(Policy::from_str(name)?.to_string(), name);
        }

        Ok(())
    }

    #[test]
    fn test_choose() {
        let mut selection = Selection::new();
        assert_eq!(selection.choose(3, 7), Ok(()));
        assert_eq!(selection.choose(3, 7), Ok(()));
        assert_eq!(
            selection.choose(3, 8),
            Err(SelectionError::AlreadyChosen {
                cluster: 3,
                chosen: 7,
                rejected: 8
            })
        );
        assert_eq!(selection.choose(1, 2), Ok(()));

        assert_eq!(selection.len(), 2);
        assert!(selection.is_chosen(7));
        assert!(!selection.is_chosen(8));
        assert_eq!(selection.get(3), Some(7));
        assert_eq!(selection.indices(), [2, 7]);
        assert_eq!(selection.iter().collect::<Vec<_>>(), [(1, 2), (3, 7)]);
    }

    #[test]
    fn test_one_per_cluster() -> Result<(), SelectionError> {
        let corpus = corpus();
        let assignment = assignment()?;

        for policy in [
            Policy::LabCenter,
            Policy::LabMedianLuminance,
            Policy::NearestToValue {
                feature: Feature::LabL,
                target: 0.0,
            },
            Policy::NearestToValue {
                feature: Feature::LabL,
                target: 50.0,
            },
            Policy::NearestToValue {
                feature: Feature::HslS,
                target: 0.0,
            },
            Policy::NearestToValue {
                feature: Feature::HslH,
                target: 1.0,
            },
        ] {
            let selection = select(&corpus, &assignment, policy)?;
            assert_eq!(selection.len(), 3, "policy {} should choose 3 colors", policy);
            for (cluster, index) in selection.iter() {
                assert_eq!(assignment.cluster_of(index), Some(cluster));
            }
            // Navy is the only member of its cluster.
            assert_eq!(selection.get(2), Some(7));
        }

        Ok(())
    }

    #[test]
    fn test_policies() -> Result<(), SelectionError> {
        let corpus = corpus();
        let assignment = assignment()?;

        let selection = select(&corpus, &assignment, Policy::LabCenter)?;
        assert_eq!(selection.get(0), Some(1));

        // Reds by lightness: dark red, red, indian red, salmon.
        let selection = select(&corpus, &assignment, Policy::LabMedianLuminance)?;
        assert_eq!(selection.get(0), Some(1));
        assert_eq!(selection.get(1), Some(5));

        let darkest = Policy::NearestToValue {
            feature: Feature::LabL,
            target: 0.0,
        };
        let selection = select(&corpus, &assignment, darkest)?;
        assert_eq!(selection.get(0), Some(0));
        assert_eq!(selection.get(1), Some(4));

        // Black, gray, and white all have zero saturation; black comes first.
        let grayest = Policy::NearestToValue {
            feature: Feature::HslS,
            target: 0.0,
        };
        let selection = select(&corpus, &assignment, grayest)?;
        assert_eq!(selection.get(0), Some(0));
        assert_eq!(selection.indices(), [0, 5, 7]);

        Ok(())
    }

    #[test]
    fn test_degenerate() -> Result<(), SelectionError> {
        let corpus = corpus();

        let assignment = Assignment::new(vec![0, 0, 0, 0, 0, 0, 0, 2], 4)?;
        let selection = select(&corpus, &assignment, Policy::LabCenter)?;
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.get(1), None);
        assert_eq!(selection.get(3), None);

        let assignment = Assignment::new(vec![0, 1], 2)?;
        assert_eq!(
            select(&corpus, &assignment, Policy::LabCenter),
            Err(SelectionError::LengthMismatch {
                expected: 8,
                actual: 2
            })
        );

        Ok(())
    }
}
