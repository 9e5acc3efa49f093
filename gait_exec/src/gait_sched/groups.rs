//! Phase groups

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::GroupingError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A partition of leg indices into disjoint, exhaustive, non-empty groups.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseGroups {
    groups: Vec<Vec<usize>>,

    /// Group index of each leg
    group_of: Vec<usize>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How legs are assigned to phase groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Grouping {
    /// Leg `i` belongs to group `i % num_groups`. Two groups gives alternating even and odd legs.
    Parity { num_groups: usize },

    /// Groups listed explicitly by leg index.
    Explicit { groups: Vec<Vec<usize>> },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Grouping {
    fn default() -> Self {
        Grouping::Parity { num_groups: 2 }
    }
}

impl Grouping {
    pub fn num_groups(&self) -> usize {
        match self {
            Grouping::Parity { num_groups } => *num_groups,
            Grouping::Explicit { groups } => groups.len(),
        }
    }
}

impl PhaseGroups {
    /// Build the phase groups for `num_legs` legs.
    pub fn new(grouping: &Grouping, num_legs: usize) -> Result<Self, GroupingError> {
        let num_groups = grouping.num_groups();

        if num_groups < 2 {
            return Err(GroupingError::TooFewGroups(num_groups));
        }
        if num_legs < num_groups {
            return Err(GroupingError::TooFewLegs {
                num_legs,
                num_groups,
            });
        }

        let groups = match grouping {
            Grouping::Parity { num_groups } => {
                let mut groups = vec![Vec::new(); *num_groups];
                for leg in 0..num_legs {
                    groups[leg % num_groups].push(leg);
                }
                groups
            }
            Grouping::Explicit { groups } => groups.clone(),
        };

        Self::from_groups(groups, num_legs)
    }

    fn from_groups(mut groups: Vec<Vec<usize>>, num_legs: usize) -> Result<Self, GroupingError> {
        let mut group_of: Vec<Option<usize>> = vec![None; num_legs];

        for (g, group) in groups.iter_mut().enumerate() {
            if group.is_empty() {
                return Err(GroupingError::EmptyGroup(g));
            }

            // Legs are evaluated in ascending order within a group
            group.sort_unstable();

            for &leg in group.iter() {
                match group_of.get_mut(leg) {
                    None => return Err(GroupingError::LegOutOfRange { leg, num_legs }),
                    Some(Some(_)) => return Err(GroupingError::DuplicateLeg(leg)),
                    Some(slot) => *slot = Some(g),
                }
            }
        }

        let group_of = group_of
            .into_iter()
            .enumerate()
            .map(|(leg, g)| g.ok_or(GroupingError::MissingLeg(leg)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { groups, group_of })
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn num_legs(&self) -> usize {
        self.group_of.len()
    }

    /// Leg indices of a group in ascending order.
    pub fn group(&self, index: usize) -> &[usize] {
        self.groups.get(index).map(|g| g.as_slice()).unwrap_or(&[])
    }

    /// The group a leg belongs to.
    pub fn group_of(&self, leg: usize) -> Option<usize> {
        self.group_of.get(leg).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parity() {
        let groups = PhaseGroups::new(&Grouping::default(), 6).unwrap();
        assert_eq!(groups.num_groups(), 2);
        assert_eq!(groups.group(0), &[0, 2, 4]);
        assert_eq!(groups.group(1), &[1, 3, 5]);
        assert_eq!(groups.group_of(3), Some(1));
        assert_eq!(groups.group_of(6), None);

        let groups = PhaseGroups::new(&Grouping::Parity { num_groups: 3 }, 6).unwrap();
        assert_eq!(groups.group(2), &[2, 5]);
    }

    #[test]
    fn test_explicit() {
        let grouping = Grouping::Explicit {
            groups: vec![vec![1, 0], vec![2, 3]],
        };
        let groups = PhaseGroups::new(&grouping, 4).unwrap();
        assert_eq!(groups.group(0), &[0, 1]);
        assert_eq!(groups.group(1), &[2, 3]);
    }

    #[test]
    fn test_grouping_errors() {
        assert_eq!(
            PhaseGroups::new(&Grouping::Parity { num_groups: 1 }, 4),
            Err(GroupingError::TooFewGroups(1))
        );
        assert_eq!(
            PhaseGroups::new(&Grouping::default(), 0),
            Err(GroupingError::TooFewLegs {
                num_legs: 0,
                num_groups: 2
            })
        );

        let explicit = |groups: Vec<Vec<usize>>| Grouping::Explicit { groups };

        assert_eq!(
            PhaseGroups::new(&explicit(vec![vec![0, 1], vec![2, 4]]), 4),
            Err(GroupingError::LegOutOfRange { leg: 4, num_legs: 4 })
        );
        assert_eq!(
            PhaseGroups::new(&explicit(vec![vec![0, 1], vec![1, 2, 3]]), 4),
            Err(GroupingError::DuplicateLeg(1))
        );
        assert_eq!(
            PhaseGroups::new(&explicit(vec![vec![0, 1], vec![3]]), 4),
            Err(GroupingError::MissingLeg(2))
        );
        assert_eq!(
            PhaseGroups::new(&explicit(vec![vec![0, 1, 2, 3], vec![]]), 4),
            Err(GroupingError::EmptyGroup(1))
        );
    }

    #[test]
    fn test_grouping_deserialise() {
        #[derive(Deserialize)]
        struct Wrapper {
            grouping: Grouping,
        }

        let w: Wrapper = util::params::from_str(
            r#"
            [grouping]
            type = "explicit"
            groups = [[0, 1], [2, 3]]
            "#,
        )
        .unwrap();

        assert_eq!(w.grouping.num_groups(), 2);
    }
}
