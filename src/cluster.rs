//! Average-linkage agglomerative clustering over Euclidean row distances.

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ClusteringError {
    #[error("clustering needs at least 2 rows, got {rows}")]
    TooFewRows { rows: usize },

    #[error("row {row}, column {column} is missing or not finite")]
    NonFiniteValue { row: usize, column: usize },

    #[error("rows have different lengths")]
    RaggedRows,
}

/// One agglomeration step. Ids below the leaf count are leaves, merged
/// clusters continue from there in merge order.
#[derive(Clone, Debug, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dendrogram {
    leaves: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    pub fn leaves(&self) -> usize {
        self.leaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Depth-first leaf order, lower id child first.
    pub fn leaf_order(&self) -> Vec<usize> {
        let Some(root) = (self.leaves + self.merges.len()).checked_sub(1) else {
            return Vec::new();
        };
        let mut order = Vec::with_capacity(self.leaves);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node < self.leaves {
                order.push(node);
            } else {
                let merge = &self.merges[node - self.leaves];
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }
        order
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

pub fn cluster_rows(rows: &[Vec<f64>]) -> Result<Dendrogram, ClusteringError> {
    let n = rows.len();
    if n < 2 {
        return Err(ClusteringError::TooFewRows { rows: n });
    }
    let width = rows[0].len();
    for (row, values) in rows.iter().enumerate() {
        if values.len() != width {
            return Err(ClusteringError::RaggedRows);
        }
        if let Some(column) = values.iter().position(|v| !v.is_finite()) {
            return Err(ClusteringError::NonFiniteValue { row, column });
        }
    }

    // Slot i holds the active cluster that started as leaf i.
    let mut dist = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&rows[i], &rows[j]);
            dist[i * n + j] = d;
            dist[j * n + i] = d;
        }
    }
    let mut ids: Vec<usize> = (0..n).collect();
    let mut sizes = vec![1usize; n];
    let mut active = vec![true; n];
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..(n - 1) {
        let mut best: Option<(f64, (usize, usize), usize, usize)> = None;
        for a in (0..n).filter(|&a| active[a]) {
            for b in ((a + 1)..n).filter(|&b| active[b]) {
                let d = dist[a * n + b];
                let key = (ids[a].min(ids[b]), ids[a].max(ids[b]));
                let better = match &best {
                    None => true,
                    Some((best_d, best_key, _, _)) => {
                        d < *best_d || (d == *best_d && key < *best_key)
                    }
                };
                if better {
                    best = Some((d, key, a, b));
                }
            }
        }
        let Some((d, (left, right), a, b)) = best else {
            break;
        };

        let (na, nb) = (sizes[a] as f64, sizes[b] as f64);
        for k in (0..n).filter(|&k| active[k] && k != a && k != b) {
            let merged = (na * dist[a * n + k] + nb * dist[b * n + k]) / (na + nb);
            dist[a * n + k] = merged;
            dist[k * n + a] = merged;
        }
        sizes[a] += sizes[b];
        active[b] = false;
        ids[a] = n + step;
        merges.push(Merge {
            left,
            right,
            distance: d,
            size: sizes[a],
        });
    }

    Ok(Dendrogram { leaves: n, merges })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_rows() {
        assert_eq!(
            cluster_rows(&[vec![1.0, 2.0]]),
            Err(ClusteringError::TooFewRows { rows: 1 })
        );
        assert_eq!(cluster_rows(&[]), Err(ClusteringError::TooFewRows { rows: 0 }));
    }

    #[test]
    fn nan_is_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![f64::NAN, 0.0]];
        assert_eq!(
            cluster_rows(&rows),
            Err(ClusteringError::NonFiniteValue { row: 1, column: 0 })
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![1.0]];
        assert_eq!(cluster_rows(&rows), Err(ClusteringError::RaggedRows));
    }

    #[test]
    fn near_rows_end_up_adjacent() {
        let rows = vec![vec![0.0], vec![10.0], vec![0.1], vec![10.2]];
        let tree = cluster_rows(&rows).unwrap();
        assert_eq!(tree.leaf_order(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn merges_follow_average_linkage() {
        let rows = vec![vec![0.0], vec![1.0], vec![5.0]];
        let tree = cluster_rows(&rows).unwrap();
        assert_eq!(
            tree.merges(),
            &[
                Merge {
                    left: 0,
                    right: 1,
                    distance: 1.0,
                    size: 2
                },
                Merge {
                    left: 2,
                    right: 3,
                    distance: 4.5,
                    size: 3
                },
            ]
        );
        assert_eq!(tree.leaf_order(), vec![2, 0, 1]);
    }

    #[test]
    fn ties_prefer_lowest_ids() {
        let rows = vec![vec![0.0], vec![0.0], vec![0.0]];
        let tree = cluster_rows(&rows).unwrap();
        assert_eq!(tree.merges()[0].left, 0);
        assert_eq!(tree.merges()[0].right, 1);
        assert_eq!(tree.leaf_order(), vec![2, 0, 1]);
    }
}
