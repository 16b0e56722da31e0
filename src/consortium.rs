use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::columns::{CanonicalField, ColumnResolver};
use crate::error::EngineError;
use crate::table::Table;

pub type CompoundProfile = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

impl Serialize for GroupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleGroup {
    pub id: GroupId,
    pub profile: CompoundProfile,
    pub members: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageWarning {
    pub uncovered: BTreeSet<String>,
}

impl fmt::Display for CoverageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listed = self.uncovered.iter().cloned().collect::<Vec<_>>().join(", ");
        write!(
            f,
            "coverage incomplete: {} compound(s) not annotated by any sample: {listed}",
            self.uncovered.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsortiumResult {
    pub compound_class: String,
    pub groups: Vec<SampleGroup>,
    pub selected: BTreeSet<GroupId>,
    pub selection_order: Vec<GroupId>,
    pub universe: BTreeSet<String>,
    pub warning: Option<CoverageWarning>,
}

impl ConsortiumResult {
    pub fn selected_groups(&self) -> impl Iterator<Item = &SampleGroup> {
        self.groups
            .iter()
            .filter(|group| self.selected.contains(&group.id))
    }

    pub fn covered(&self) -> BTreeSet<String> {
        self.selected_groups()
            .flat_map(|group| group.profile.iter().cloned())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.warning.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsortiumMinimizer;

impl ConsortiumMinimizer {
    pub fn minimize(
        &self,
        annotated: &Table,
        compound_class: &str,
    ) -> Result<ConsortiumResult, EngineError> {
        let groups = self.group_samples(annotated, compound_class)?;
        let universe = groups
            .iter()
            .flat_map(|group| group.profile.iter().cloned())
            .collect();
        Ok(finish(compound_class, groups, universe))
    }

    pub fn minimize_against(
        &self,
        annotated: &Table,
        compound_class: &str,
        universe: BTreeSet<String>,
    ) -> Result<ConsortiumResult, EngineError> {
        let groups = self.group_samples(annotated, compound_class)?;
        Ok(finish(compound_class, groups, universe))
    }

    pub fn group_samples(
        &self,
        annotated: &Table,
        compound_class: &str,
    ) -> Result<Vec<SampleGroup>, EngineError> {
        let mut resolver = ColumnResolver::new(annotated);
        let sample_col = resolver.require(CanonicalField::Sample)?;
        let class_col = resolver.require(CanonicalField::CompoundClass)?;
        let compound_col = resolver.require(CanonicalField::CompoundId)?;

        let wanted = compound_class.trim();
        let filtered = annotated.filter(|row| row[class_col].trim() == wanted);
        if filtered.is_empty() {
            return Err(EngineError::EmptyResult {
                step: format!("compound class filter `{wanted}`"),
                before: annotated.len(),
                after: 0,
            });
        }

        let mut profiles: BTreeMap<String, CompoundProfile> = BTreeMap::new();
        for row in filtered.rows() {
            let sample = row[sample_col].trim();
            let compound = row[compound_col].trim();
            if sample.is_empty() || compound.is_empty() {
                continue;
            }
            profiles
                .entry(sample.to_string())
                .or_default()
                .insert(compound.to_string());
        }
        if profiles.is_empty() {
            return Err(EngineError::EmptyResult {
                step: format!("compound profiles for `{wanted}`"),
                before: annotated.len(),
                after: 0,
            });
        }

        // BTreeMap iteration is sorted by sample, so the first member seen for
        // a profile is its smallest one and groups come out in id order.
        let mut by_profile: BTreeMap<CompoundProfile, BTreeSet<String>> = BTreeMap::new();
        let mut order = Vec::new();
        for (sample, profile) in profiles {
            let members = by_profile.entry(profile.clone()).or_default();
            if members.is_empty() {
                order.push(profile);
            }
            members.insert(sample);
        }

        let groups = order
            .into_iter()
            .enumerate()
            .map(|(idx, profile)| {
                let members = by_profile.remove(&profile).unwrap_or_default();
                SampleGroup {
                    id: GroupId(idx),
                    profile,
                    members,
                }
            })
            .collect::<Vec<_>>();
        debug!(
            compound_class = wanted,
            rows = filtered.len(),
            groups = groups.len(),
            "grouped samples by compound profile"
        );
        Ok(groups)
    }
}

fn finish(
    compound_class: &str,
    groups: Vec<SampleGroup>,
    universe: BTreeSet<String>,
) -> ConsortiumResult {
    let (selection_order, uncovered) = greedy_cover(&groups, &universe);
    let warning = if uncovered.is_empty() {
        None
    } else {
        let warning = CoverageWarning { uncovered };
        warn!(compound_class = compound_class.trim(), "{warning}");
        Some(warning)
    };
    ConsortiumResult {
        compound_class: compound_class.trim().to_string(),
        selected: selection_order.iter().copied().collect(),
        selection_order,
        groups,
        universe,
        warning,
    }
}

pub fn greedy_cover(
    groups: &[SampleGroup],
    universe: &BTreeSet<String>,
) -> (Vec<GroupId>, BTreeSet<String>) {
    let mut uncovered = universe.clone();
    let mut remaining = groups.iter().collect::<Vec<_>>();
    remaining.sort_by_key(|group| group.id);
    let mut picked = Vec::new();

    while !uncovered.is_empty() {
        let best = remaining
            .iter()
            .enumerate()
            .map(|(pos, group)| {
                let gain = group
                    .profile
                    .iter()
                    .filter(|compound| uncovered.contains(*compound))
                    .count();
                (pos, gain)
            })
            // max_by returns the last of equal elements, so positions compare
            // in reverse to let the lowest id win ties.
            .max_by(|(pos_a, gain_a), (pos_b, gain_b)| {
                gain_a.cmp(gain_b).then_with(|| pos_b.cmp(pos_a))
            });

        let Some((pos, gain)) = best else {
            break;
        };
        if gain == 0 {
            break;
        }
        let group = remaining.remove(pos);
        for compound in &group.profile {
            uncovered.remove(compound);
        }
        picked.push(group.id);
    }

    (picked, uncovered)
}
