//! Pax-max aggregation
//!
//! Turns a flat list of flags into what a renderer needs to animate a map:
//! one merged record per label when nothing is time-scoped, otherwise one
//! snapshot per breakpoint year. A breakpoint is any year where some flag
//! starts or stops, so the latest snapshot at or before any year is exactly
//! the state of that year.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, debug_span};

use super::flag::{Flag, FlagGeometry};
use super::output::{FlagRecord, FlagTimeline, Snapshot};
use crate::core::config::AtlasConfig;
use crate::core::error::Result;
use crate::core::types::Year;
use crate::geometry::{self, CentroidCalculator, Geometry};
use crate::territory::{Territory, TerritoryResolver};

/// Counters describing the work done by an `Aggregator`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    /// Distinct labels seen
    pub groups: u64,
    pub snapshots: u64,
    pub records: u64,
    /// Label/year pairs with no active member (no record emitted)
    pub absent_labels: u64,
    pub territory_unions: u64,
    pub geometry_unions: u64,
    /// Snapshot records copied from the previous breakpoint (same active members)
    pub reused_records: u64,
}

#[derive(Debug, Default)]
pub struct Aggregator {
    centroids: CentroidCalculator,
    stats: AggregationStats,
}

struct Group<'f> {
    label: &'f str,
    members: Vec<&'f Flag>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_centroids(centroids: CentroidCalculator) -> Self {
        Self {
            centroids,
            stats: AggregationStats::default(),
        }
    }

    pub fn from_config(config: &AtlasConfig) -> Self {
        Self::with_centroids(CentroidCalculator::from_config(&config.centroid))
    }

    /// Cumulative counters across every `aggregate` call
    pub fn stats(&self) -> &AggregationStats {
        &self.stats
    }

    /// Build the timeline for `flags`
    ///
    /// `earliest_start` forces an extra breakpoint in dynamic mode. Errors
    /// only come from resolving territories the caller left unresolved.
    pub fn aggregate(
        &mut self,
        flags: &[Flag],
        earliest_start: Option<Year>,
        resolver: &mut TerritoryResolver<'_>,
    ) -> Result<FlagTimeline> {
        let _span = debug_span!("pax_max", flags = flags.len()).entered();

        let groups = group_by_label(flags);
        self.stats.groups += groups.len() as u64;

        if !flags.iter().any(|f| f.period.is_some()) {
            let records = groups
                .iter()
                .map(|g| self.merge(g.label, &g.members, resolver))
                .collect::<Result<Vec<_>>>()?;
            self.stats.records += records.len() as u64;
            debug!(labels = records.len(), "static timeline built");
            return Ok(FlagTimeline::Static { flags: records });
        }

        let breakpoints = compute_breakpoints(flags, earliest_start);
        let mut snapshots = Vec::with_capacity(breakpoints.len());

        // Last merged record per group with the member indices it was built from
        let mut previous: Vec<Option<(Vec<usize>, FlagRecord)>> = vec![None; groups.len()];

        for &year in &breakpoints {
            let mut records = Vec::new();
            for (slot, group) in groups.iter().enumerate() {
                let active: Vec<usize> = group
                    .members
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.is_active_at(year))
                    .map(|(i, _)| i)
                    .collect();
                if active.is_empty() {
                    self.stats.absent_labels += 1;
                    continue;
                }
                if let Some((ids, record)) = &previous[slot] {
                    if *ids == active {
                        self.stats.reused_records += 1;
                        records.push(record.clone());
                        continue;
                    }
                }
                let members: Vec<&Flag> = active.iter().map(|&i| group.members[i]).collect();
                let record = self.merge(group.label, &members, resolver)?;
                previous[slot] = Some((active, record.clone()));
                records.push(record);
            }
            self.stats.records += records.len() as u64;
            snapshots.push(Snapshot { year, flags: records });
        }
        self.stats.snapshots += snapshots.len() as u64;
        debug!(
            breakpoints = breakpoints.len(),
            first = breakpoints.first().copied(),
            last = breakpoints.last().copied(),
            "dynamic timeline built"
        );

        Ok(FlagTimeline::Dynamic {
            breakpoints,
            snapshots,
        })
    }

    fn merge(
        &mut self,
        label: &str,
        members: &[&Flag],
        resolver: &mut TerritoryResolver<'_>,
    ) -> Result<FlagRecord> {
        let geometry = self.merged_geometry(members, resolver)?;
        let centroid = geometry.as_ref().and_then(|g| self.centroids.centroid(g));

        let notes: Vec<&str> = members
            .iter()
            .filter_map(|f| f.note.as_deref())
            .filter(|n| !n.is_empty())
            .collect();
        let note = (!notes.is_empty()).then(|| notes.join("; "));

        let classes: BTreeSet<&str> = members
            .iter()
            .filter_map(|f| f.classes.as_deref())
            .flat_map(str::split_whitespace)
            .collect();
        let classes = (!classes.is_empty()).then(|| classes.into_iter().collect::<Vec<_>>().join(" "));

        Ok(FlagRecord {
            label: label.to_string(),
            geometry,
            centroid,
            note,
            color: members.first().and_then(|f| f.color.clone()),
            classes,
        })
    }

    /// Union of member geometries, through the territory algebra when possible
    fn merged_geometry(
        &mut self,
        members: &[&Flag],
        resolver: &mut TerritoryResolver<'_>,
    ) -> Result<Option<Geometry>> {
        if let [single] = members {
            return member_geometry(single, resolver);
        }

        // Resolve members in place so the clones carry their memo
        let mut territories = Some(Vec::with_capacity(members.len()));
        for flag in members {
            match &flag.geometry {
                FlagGeometry::Territory(t) => {
                    t.resolve(resolver)?;
                    if let Some(list) = territories.as_mut() {
                        list.push(t.clone());
                    }
                }
                FlagGeometry::Geometry(_) => territories = None,
            }
        }

        if let Some(union) = territories.and_then(Territory::union_all) {
            self.stats.territory_unions += 1;
            return Ok(union.resolve(resolver)?.cloned());
        }

        self.stats.geometry_unions += 1;
        let parts = members
            .iter()
            .map(|f| member_geometry(f, resolver))
            .collect::<Result<Vec<_>>>()?;
        Ok(geometry::union_all(parts.into_iter().flatten()))
    }
}

fn member_geometry(flag: &Flag, resolver: &mut TerritoryResolver<'_>) -> Result<Option<Geometry>> {
    match &flag.geometry {
        FlagGeometry::Territory(t) => Ok(t.resolve(resolver)?.cloned()),
        FlagGeometry::Geometry(g) => Ok(geometry::non_empty(g.clone())),
    }
}

/// Group by label in order of first appearance, members in input order
fn group_by_label(flags: &[Flag]) -> Vec<Group<'_>> {
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();
    for flag in flags {
        let slot = *index.entry(flag.label.as_str()).or_insert_with(|| {
            groups.push(Group {
                label: flag.label.as_str(),
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(flag);
    }
    groups
}

/// Every period start and end, plus `earliest_start`, sorted and unique
pub fn compute_breakpoints(flags: &[Flag], earliest_start: Option<Year>) -> Vec<Year> {
    let mut years: BTreeSet<Year> = flags
        .iter()
        .filter_map(|f| f.period)
        .flat_map(|p| [p.start, p.end])
        .collect();
    if let Some(start) = earliest_start {
        years.insert(start);
    }
    years.into_iter().collect()
}
