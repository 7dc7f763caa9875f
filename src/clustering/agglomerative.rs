use std::cmp::Ordering;
use std::collections::HashSet;

use super::error::ClusterError;
use super::linkage::Linkage;
use super::types::{Cluster, Clustering, Group, Grouping, Item, MergeStep};

/// Bottom-up hierarchical clustering into a fixed number of ranked groups.
///
/// Every call is independent: the engine keeps no state between runs and
/// never mutates its input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Agglomerative {
    linkage: Linkage,
}

/// A group still taking part in the merge loop
struct Work<'a> {
    /// Indices into the input slice, in merge order
    members: Vec<usize>,
    /// Smallest member name, used for tie-breaking
    min_name: &'a str,
}

impl Agglomerative {
    pub fn new(linkage: Linkage) -> Self {
        Agglomerative { linkage }
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Partitions items into at most `group_count` groups ranked by score, highest first
    ///
    /// When fewer items than `group_count` are supplied, each item becomes its own group.
    ///
    /// # Arguments
    /// * `items` - Items to group; names must be unique
    /// * `group_count` - Number of groups wanted
    ///
    /// # Returns
    /// * `Ok(Grouping)` - The ranked groups and the merge history
    /// * `Err(ClusterError)` - If the input is invalid
    pub fn cluster(&self, items: &[Item], group_count: usize) -> Result<Grouping, ClusterError> {
        validate(items, group_count)?;

        let target = group_count.min(items.len());
        let mut active: Vec<Work<'_>> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| Work {
                members: vec![idx],
                min_name: item.name.as_str(),
            })
            .collect();

        let mut distances: Vec<Vec<f64>> = items
            .iter()
            .map(|a| items.iter().map(|b| a.distance(b)).collect())
            .collect();

        let mut merges = Vec::with_capacity(items.len() - target);

        while active.len() > target {
            let (i, j) = closest_pair(&active, &distances);
            let distance = distances[i][j];

            // Merged group keeps slot i, slot j is dropped
            let (n_i, n_j) = (active[i].members.len(), active[j].members.len());
            for k in 0..active.len() {
                if k == i || k == j {
                    continue;
                }
                let updated = self
                    .linkage
                    .combine(distances[k][i], distances[k][j], n_i, n_j);
                distances[k][i] = updated;
                distances[i][k] = updated;
            }
            distances.remove(j);
            for row in distances.iter_mut() {
                row.remove(j);
            }

            let second = active.remove(j);
            let first = std::mem::replace(
                &mut active[i],
                Work {
                    members: Vec::new(),
                    min_name: "",
                },
            );
            let (left, right) = if first.min_name <= second.min_name {
                (first, second)
            } else {
                (second, first)
            };

            merges.push(MergeStep {
                left: names_of(items, &left.members),
                right: names_of(items, &right.members),
                distance,
            });

            let mut members = left.members;
            members.extend(right.members);
            active[i] = Work {
                members,
                min_name: left.min_name,
            };
        }

        let mut ranked: Vec<(Group, &str)> = active
            .into_iter()
            .map(|work| {
                let members: Vec<Item> =
                    work.members.iter().map(|&idx| items[idx].clone()).collect();
                let score = mean_primary(&members);
                (Group { members, score }, work.min_name)
            })
            .collect();
        ranked.sort_by(|(a, a_name), (b, b_name)| {
            b.score.total_cmp(&a.score).then_with(|| a_name.cmp(b_name))
        });

        Ok(Grouping {
            groups: ranked.into_iter().map(|(group, _)| group).collect(),
            merges,
        })
    }

    /// Clusters items into one tier per label and names the tiers in rank order
    ///
    /// The highest-scoring tier receives `labels[0]`. With fewer items than labels,
    /// the trailing labels go unused.
    ///
    /// # Arguments
    /// * `items` - Items to group; names must be unique
    /// * `labels` - Tier names, most popular tier first
    ///
    /// # Returns
    /// * `Ok(Clustering)` - Labeled tiers, highest score first
    /// * `Err(ClusterError)` - If the input is invalid
    pub fn find_clusters<S: AsRef<str>>(
        &self,
        items: &[Item],
        labels: &[S],
    ) -> Result<Clustering, ClusterError> {
        let grouping = self.cluster(items, labels.len())?;
        assign_labels(grouping, labels)
    }
}

/// Clusters items with average linkage; see [`Agglomerative::find_clusters`]
pub fn find_clusters<S: AsRef<str>>(
    items: &[Item],
    labels: &[S],
) -> Result<Clustering, ClusterError> {
    Agglomerative::default().find_clusters(items, labels)
}

/// Attaches labels to already ranked groups, first label to the first group
pub fn assign_labels<S: AsRef<str>>(
    grouping: Grouping,
    labels: &[S],
) -> Result<Clustering, ClusterError> {
    if labels.len() < grouping.groups.len() {
        return Err(ClusterError::LabelMismatch {
            clusters: grouping.groups.len(),
            labels: labels.len(),
        });
    }

    let clusters = grouping
        .groups
        .into_iter()
        .zip(labels.iter())
        .map(|(group, label)| Cluster {
            label: label.as_ref().to_string(),
            score: group.score,
            members: group.members,
        })
        .collect();

    Ok(Clustering {
        clusters,
        merges: grouping.merges,
    })
}

fn validate(items: &[Item], group_count: usize) -> Result<(), ClusterError> {
    let first = items.first().ok_or(ClusterError::EmptyInput)?;
    if group_count < 1 {
        return Err(ClusterError::InvalidLabelCount(group_count));
    }

    let expected = first.features.len();
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.name.as_str()) {
            return Err(ClusterError::DuplicateName(item.name.clone()));
        }
        if item.features.is_empty() || item.features.len() != expected {
            return Err(ClusterError::DimensionMismatch {
                name: item.name.clone(),
                expected: expected.max(1),
                actual: item.features.len(),
            });
        }
        if item.features.iter().any(|f| !f.is_finite()) {
            return Err(ClusterError::NonFiniteFeature {
                name: item.name.clone(),
            });
        }
    }
    Ok(())
}

/// Finds the pair of active groups to merge next.
///
/// Ordered by distance, then by the smaller of the two groups' smallest names,
/// then by the larger one. Names are unique, so the order is total.
fn closest_pair(active: &[Work<'_>], distances: &[Vec<f64>]) -> (usize, usize) {
    let key = |i: usize, j: usize| {
        let (a, b) = (active[i].min_name, active[j].min_name);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        (distances[i][j], lo, hi)
    };

    let mut best = (0, 1);
    let mut best_key = key(0, 1);
    for i in 0..active.len() {
        for j in (i + 1)..active.len() {
            let candidate = key(i, j);
            let ordering = candidate
                .0
                .total_cmp(&best_key.0)
                .then_with(|| candidate.1.cmp(best_key.1))
                .then_with(|| candidate.2.cmp(best_key.2));
            if ordering == Ordering::Less {
                best = (i, j);
                best_key = candidate;
            }
        }
    }
    best
}

fn names_of(items: &[Item], members: &[usize]) -> Vec<String> {
    members.iter().map(|&idx| items[idx].name.clone()).collect()
}

fn mean_primary(members: &[Item]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    members.iter().map(Item::primary).sum::<f64>() / members.len() as f64
}
