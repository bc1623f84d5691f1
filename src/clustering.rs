// 🧩 Entity Clusterer - Group name variants into alias clusters
// Two algorithms: density (canonical) and greedy single-pass (explicit
// approximation). Output is always a partition of the unique input names.

use crate::normalize::NormalizerCache;
use crate::similarity::similarity_normalized;
use serde::{Deserialize, Serialize};

// ============================================================================
// MATCH TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    /// Identical after normalization
    Exact,

    /// Matched through the blended similarity score
    Fuzzy,
}

// ============================================================================
// ENTITY MATCH
// ============================================================================

/// One pairwise alias hypothesis inside a cluster.
/// Created only when confidence meets the active threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMatch {
    pub entity1: String,
    pub entity2: String,

    /// Similarity confidence (0.0 - 1.0)
    pub confidence: f64,

    pub match_type: MatchType,

    /// Canonical name of the cluster this pair belongs to
    pub canonical_name: String,
}

// ============================================================================
// CLUSTER CONFIG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterAlgorithm {
    /// Canonical: pairwise matrix + transitive grouping within threshold
    /// distance (single-linkage over the threshold graph)
    Density,

    /// Greedy single-pass seed-and-sweep. An approximation: cluster
    /// boundaries can differ from Density at the threshold margin.
    Greedy,
}

#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Minimum similarity for two names to share a cluster (default 0.85)
    pub threshold: f64,

    pub algorithm: ClusterAlgorithm,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            threshold: 0.85,
            algorithm: ClusterAlgorithm::Density,
        }
    }
}

// ============================================================================
// ENTITY CLUSTERER
// ============================================================================

pub struct EntityClusterer {
    config: ClusterConfig,
}

impl EntityClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        EntityClusterer { config }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        EntityClusterer {
            config: ClusterConfig {
                threshold,
                ..ClusterConfig::default()
            },
        }
    }

    /// Partition names into alias clusters.
    ///
    /// Duplicate input strings are collapsed first; every unique name lands
    /// in exactly one output cluster. Singleton clusters are names with no
    /// neighbor within the threshold.
    pub fn cluster(&self, names: &[String]) -> Vec<Vec<String>> {
        let unique = dedupe_preserving_order(names);
        if unique.is_empty() {
            return Vec::new();
        }

        match self.config.algorithm {
            ClusterAlgorithm::Density => self.cluster_density(&unique),
            ClusterAlgorithm::Greedy => {
                // Boundary membership can differ from the canonical path
                log::warn!(
                    "greedy clustering selected for {} names (threshold {}); \
                     cluster boundaries may differ from the density algorithm",
                    unique.len(),
                    self.config.threshold
                );
                self.cluster_greedy(&unique)
            }
        }
    }

    /// Pairwise alias hypotheses for every intra-cluster pair that meets
    /// the threshold, labeled with the cluster's canonical name.
    pub fn matches(&self, names: &[String]) -> Vec<EntityMatch> {
        let clusters = self.cluster(names);
        let mut cache = NormalizerCache::new();
        let mut result = Vec::new();

        for cluster in &clusters {
            let canonical = canonical_name(cluster);
            for i in 0..cluster.len() {
                for j in (i + 1)..cluster.len() {
                    let norm_i = cache.normalize(&cluster[i]);
                    let norm_j = cache.normalize(&cluster[j]);
                    let confidence = similarity_normalized(&norm_i, &norm_j);
                    if confidence < self.config.threshold {
                        // Transitively linked but not directly similar enough
                        continue;
                    }
                    result.push(EntityMatch {
                        entity1: cluster[i].clone(),
                        entity2: cluster[j].clone(),
                        confidence,
                        match_type: if norm_i == norm_j {
                            MatchType::Exact
                        } else {
                            MatchType::Fuzzy
                        },
                        canonical_name: canonical.clone(),
                    });
                }
            }
        }

        result
    }

    /// Canonical path: full pairwise similarity matrix, then transitive
    /// merging of all pairs within threshold (union-find components).
    fn cluster_density(&self, unique: &[String]) -> Vec<Vec<String>> {
        let n = unique.len();
        let mut cache = NormalizerCache::new();
        let normalized: Vec<String> = unique.iter().map(|s| cache.normalize(s)).collect();

        let mut parent: Vec<usize> = (0..n).collect();

        for i in 0..n {
            for j in (i + 1)..n {
                let sim = similarity_normalized(&normalized[i], &normalized[j]);
                if sim >= self.config.threshold {
                    union(&mut parent, i, j);
                }
            }
        }

        // Collect components in first-seen order
        let mut clusters: Vec<Vec<String>> = Vec::new();
        let mut root_to_cluster: Vec<Option<usize>> = vec![None; n];
        for (i, name) in unique.iter().enumerate() {
            let root = find(&mut parent, i);
            match root_to_cluster[root] {
                Some(idx) => clusters[idx].push(name.clone()),
                None => {
                    root_to_cluster[root] = Some(clusters.len());
                    clusters.push(vec![name.clone()]);
                }
            }
        }

        log::debug!(
            "density clustering: {} names -> {} clusters",
            n,
            clusters.len()
        );
        clusters
    }

    /// Greedy single-pass: pop a seed, sweep the remaining pool for anything
    /// within threshold, repeat until the pool is empty.
    fn cluster_greedy(&self, unique: &[String]) -> Vec<Vec<String>> {
        let mut cache = NormalizerCache::new();
        let normalized: Vec<String> = unique.iter().map(|s| cache.normalize(s)).collect();

        let mut assigned = vec![false; unique.len()];
        let mut clusters: Vec<Vec<String>> = Vec::new();

        for seed in 0..unique.len() {
            if assigned[seed] {
                continue;
            }
            assigned[seed] = true;
            let mut cluster = vec![unique[seed].clone()];

            for candidate in (seed + 1)..unique.len() {
                if assigned[candidate] {
                    continue;
                }
                let sim = similarity_normalized(&normalized[seed], &normalized[candidate]);
                if sim >= self.config.threshold {
                    assigned[candidate] = true;
                    cluster.push(unique[candidate].clone());
                }
            }

            clusters.push(cluster);
        }

        clusters
    }
}

// ============================================================================
// CANONICAL NAME SELECTION
// ============================================================================

/// Pick the cluster member believed most canonical: most whitespace tokens,
/// tie-broken by longer raw string (complete names beat abbreviations).
pub fn canonical_name(cluster: &[String]) -> String {
    cluster
        .iter()
        .max_by_key(|name| (name.split_whitespace().count(), name.len()))
        .cloned()
        .unwrap_or_default()
}

// ============================================================================
// HELPERS
// ============================================================================

fn dedupe_preserving_order(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}

fn find(parent: &mut Vec<usize>, i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
        root = parent[root];
    }
    // Path compression
    let mut current = i;
    while parent[current] != root {
        let next = parent[current];
        parent[current] = root;
        current = next;
    }
    root
}

fn union(parent: &mut Vec<usize>, i: usize, j: usize) {
    let root_i = find(parent, i);
    let root_j = find(parent, j);
    if root_i != root_j {
        parent[root_j] = root_i;
    }
}

// ============================================================================
// TESTS
// ============================================================================
