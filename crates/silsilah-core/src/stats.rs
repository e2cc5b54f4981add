//! Family overview figures.

use std::collections::BTreeMap;

use serde::Serialize;
use silsilah_model::{Gender, Member};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationCount {
    pub generation: u32,
    pub members: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyStats {
    pub total: usize,
    /// Number of distinct generations.
    pub generations: usize,
    pub male: usize,
    pub female: usize,
    /// Ascending by generation.
    pub per_generation: Vec<GenerationCount>,
}

pub fn family_stats(members: &[Member]) -> FamilyStats {
    let mut per_generation: BTreeMap<u32, usize> = BTreeMap::new();
    let mut stats = FamilyStats {
        total: members.len(),
        ..FamilyStats::default()
    };
    for member in members {
        *per_generation.entry(member.generation).or_default() += 1;
        match member.gender {
            Gender::Male => stats.male += 1,
            Gender::Female => stats.female += 1,
        }
    }
    stats.generations = per_generation.len();
    stats.per_generation = per_generation
        .into_iter()
        .map(|(generation, members)| GenerationCount {
            generation,
            members,
        })
        .collect();
    stats
}
