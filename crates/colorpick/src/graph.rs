use crate::core::lab_distance;
use crate::error::{SearchError, SelectionError};
use crate::{Assignment, Corpus, Float};

/// A node of a dispersion graph.
///
/// Node index 0 is the synthetic root. Corpus entry `i` has node index
/// `i + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Root,
    Entry(usize),
}

impl NodeId {
    /// Create a node id from its index.
    pub const fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::Root
        } else {
            Self::Entry(index - 1)
        }
    }

    /// Get the node index.
    pub const fn index(&self) -> usize {
        match *self {
            Self::Root => 0,
            Self::Entry(entry) => entry + 1,
        }
    }

    /// Get the corpus index, which only exists for entries.
    pub const fn entry(&self) -> Option<usize> {
        match *self {
            Self::Root => None,
            Self::Entry(entry) => Some(entry),
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Root => f.write_str("root"),
            Self::Entry(entry) => write!(f, "{}", entry),
        }
    }
}

// ====================================================================================================================

/// A set of visited clusters.
///
/// `None` stands for the root's group, which contains the root only. Since
/// each search step receives its own copy, a branch's visits never leak into
/// sibling branches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterSet {
    root: bool,
    words: Vec<u64>,
}

impl ClusterSet {
    /// Create a new, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Determine whether the set contains the cluster.
    pub fn contains(&self, cluster: Option<usize>) -> bool {
        match cluster {
            None => self.root,
            Some(cluster) => self
                .words
                .get(cluster / 64)
                .is_some_and(|word| word & (1_u64 << (cluster % 64)) != 0),
        }
    }

    /// Add the cluster to this set.
    pub fn insert(&mut self, cluster: Option<usize>) {
        match cluster {
            None => self.root = true,
            Some(cluster) => {
                let index = cluster / 64;
                if self.words.len() <= index {
                    self.words.resize(index + 1, 0);
                }
                self.words[index] |= 1_u64 << (cluster % 64);
            }
        }
    }

    /// Return this set with the cluster added.
    #[must_use = "method returns updated set and consumes the original"]
    pub fn with(mut self, cluster: Option<usize>) -> Self {
        self.insert(cluster);
        self
    }

    /// Get the number of clusters in this set.
    pub fn len(&self) -> usize {
        let words: usize = self.words.iter().map(|w| w.count_ones() as usize).sum();
        words + usize::from(self.root)
    }

    /// Determine whether this set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ====================================================================================================================

/// A limit on the work performed by a dispersion search.
///
/// The search is exhaustive and hence exponential in the number of hops.
/// A budget caps the number of expanded nodes. The default budget is
/// unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchBudget {
    max_expansions: Option<u64>,
}

impl SearchBudget {
    /// Create an unbounded budget.
    pub const fn unbounded() -> Self {
        Self {
            max_expansions: None,
        }
    }

    /// Create a budget for the given number of expansions.
    pub const fn with_max_expansions(max_expansions: u64) -> Self {
        Self {
            max_expansions: Some(max_expansions),
        }
    }

    /// Get the maximum number of expansions, if any.
    pub const fn max_expansions(&self) -> Option<u64> {
        self.max_expansions
    }
}

/// The running tally of a search.
struct Tally {
    budget: SearchBudget,
    expansions: u64,
}

impl Tally {
    fn spend(&mut self) -> Result<(), SearchError> {
        self.expansions += 1;
        match self.budget.max_expansions {
            Some(max) if max < self.expansions => Err(SearchError::BudgetExhausted {
                expansions: max,
            }),
            _ => Ok(()),
        }
    }
}

// ====================================================================================================================

/// The result of a dispersion search.
#[derive(Clone, Debug, PartialEq)]
pub struct DispersionPath {
    weight: Float,
    nodes: Vec<NodeId>,
    requested_hops: usize,
}

impl DispersionPath {
    /// Get the sum of edge weights along the path.
    pub fn weight(&self) -> Float {
        self.weight
    }

    /// Get the nodes along the path, starting with the start node.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Get the number of edges along the path.
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Get the number of hops that were requested.
    pub fn requested_hops(&self) -> usize {
        self.requested_hops
    }

    /// Determine whether the path is shorter than requested.
    ///
    /// That is the case when the search runs out of clusters to visit before
    /// making the requested number of hops.
    pub fn is_truncated(&self) -> bool {
        self.hops() < self.requested_hops
    }

    /// Get the corpus indices along the path, skipping the root.
    pub fn entries(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().filter_map(NodeId::entry)
    }
}

// ====================================================================================================================

/// A graph connecting colors from different clusters.
///
/// The graph has one node per corpus entry plus a root. The root connects to
/// every entry with weight zero. Two entries are connected if and only if
/// they belong to different clusters, with their ΔE as weight. All edges are
/// undirected. Adjacency is stored in flat arrays. The root lists entries in
/// ascending order. An entry lists the entries with smaller indices, then the
/// root, then the entries with larger indices, which is the order in which
/// [`DispersionGraph::build`] discovers the edges.
#[derive(Clone, Debug)]
pub struct DispersionGraph {
    clusters: Vec<Option<usize>>,
    offsets: Vec<usize>,
    targets: Vec<usize>,
    weights: Vec<Float>,
}

impl DispersionGraph {
    /// Build a new graph from the L\*a\*b\* coordinates and cluster ids of
    /// corpus entries.
    ///
    /// This function fails if the two slices have different lengths.
    pub fn build(labs: &[[Float; 3]], clusters: &[usize]) -> Result<Self, SelectionError> {
        if labs.len() != clusters.len() {
            return Err(SelectionError::LengthMismatch {
                expected: labs.len(),
                actual: clusters.len(),
            });
        }

        let n = labs.len();
        let mut offsets = Vec::with_capacity(n + 2);
        let mut targets = Vec::with_capacity(n * n);
        let mut weights = Vec::with_capacity(n * n);

        offsets.push(0);
        for node in 1..=n {
            targets.push(node);
            weights.push(0.0);
        }
        offsets.push(targets.len());

        for (index1, (lab1, cluster1)) in labs.iter().zip(clusters.iter()).enumerate() {
            for (index2, (lab2, cluster2)) in labs.iter().zip(clusters.iter()).enumerate() {
                if index1 == index2 {
                    // The root goes between lower and higher entries.
                    targets.push(0);
                    weights.push(0.0);
                } else if cluster1 != cluster2 {
                    targets.push(index2 + 1);
                    weights.push(lab_distance(lab1, lab2));
                }
            }
            offsets.push(targets.len());
        }

        let mut node_clusters = Vec::with_capacity(n + 1);
        node_clusters.push(None);
        node_clusters.extend(clusters.iter().copied().map(Some));

        log::debug!(
            "built dispersion graph with {} nodes and {} edges",
            n + 1,
            targets.len() / 2
        );

        Ok(Self {
            clusters: node_clusters,
            offsets,
            targets,
            weights,
        })
    }

    /// Build a new graph for the corpus and its cluster assignment.
    pub fn from_corpus(corpus: &Corpus, assignment: &Assignment) -> Result<Self, SelectionError> {
        Self::build(&corpus.labs(), assignment.ids())
    }

    /// Get the number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.clusters.len()
    }

    /// Get the number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2
    }

    /// Determine whether the graph has a node with the given id.
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Get the cluster of the given node.
    ///
    /// This method returns `None` for the root and for unknown nodes.
    pub fn cluster_of(&self, node: NodeId) -> Option<usize> {
        self.clusters.get(node.index()).copied().flatten()
    }

    fn edges(&self, index: usize) -> std::ops::Range<usize> {
        match (self.offsets.get(index), self.offsets.get(index + 1)) {
            (Some(&start), Some(&end)) => start..end,
            _ => 0..0,
        }
    }

    /// Get the neighbors of the given node with the weights of the connecting
    /// edges.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, Float)> + '_ {
        let range = self.edges(node.index());
        self.targets[range.clone()]
            .iter()
            .zip(self.weights[range].iter())
            .map(|(&target, &weight)| (NodeId::from_index(target), weight))
    }

    /// Get the weight of the edge between the two nodes, if it exists.
    pub fn edge_weight(&self, node1: NodeId, node2: NodeId) -> Option<Float> {
        self.neighbors(node1)
            .find(|&(target, _)| target == node2)
            .map(|(_, weight)| weight)
    }

    /// Determine whether the two nodes are connected.
    pub fn has_edge(&self, node1: NodeId, node2: NodeId) -> bool {
        self.edge_weight(node1, node2).is_some()
    }

    /// Find the path with the largest total weight.
    ///
    /// This method is [`DispersionGraph::max_path_with`] with an unbounded
    /// budget.
    pub fn max_path(&self, start: NodeId, hops: usize) -> Result<DispersionPath, SearchError> {
        self.max_path_with(start, hops, SearchBudget::unbounded())
    }

    /// Find the path with the largest total weight, within the given budget.
    ///
    /// Starting from the given node, this method exhaustively explores all
    /// paths of up to the given number of hops that visit every cluster at
    /// most once and returns the one with the largest sum of edge weights.
    /// Ties go to the path that leaves each node through the neighbor listed
    /// first by [`DispersionGraph::neighbors`]. A path ends early when no unvisited cluster is
    /// reachable, which [`DispersionPath::is_truncated`] reports.
    pub fn max_path_with(
        &self,
        start: NodeId,
        hops: usize,
        budget: SearchBudget,
    ) -> Result<DispersionPath, SearchError> {
        if !self.contains(start) {
            return Err(SearchError::UnknownNode(start.index()));
        }

        let mut tally = Tally {
            budget,
            expansions: 0,
        };
        let (weight, nodes) = self.search(start.index(), hops, ClusterSet::new(), &mut tally)?;
        log::debug!(
            "dispersion search expanded {} nodes for path of weight {:.3}",
            tally.expansions,
            weight
        );

        Ok(DispersionPath {
            weight,
            nodes: nodes.into_iter().map(NodeId::from_index).collect(),
            requested_hops: hops,
        })
    }

    fn search(
        &self,
        node: usize,
        hops: usize,
        visited: ClusterSet,
        tally: &mut Tally,
    ) -> Result<(Float, Vec<usize>), SearchError> {
        if hops == 0 {
            return Ok((0.0, vec![node]));
        }

        tally.spend()?;
        let visited = visited.with(self.clusters[node]);

        let mut best: Option<(Float, Vec<usize>)> = None;
        let range = self.edges(node);
        for (&target, &weight) in self.targets[range.clone()]
            .iter()
            .zip(self.weights[range].iter())
        {
            if visited.contains(self.clusters[target]) {
                continue;
            }

            let (sub_weight, sub_path) = self.search(target, hops - 1, visited.clone(), tally)?;
            let total = weight + sub_weight;
            if best.as_ref().map_or(true, |(max, _)| *max < total) {
                best = Some((total, sub_path));
            }
        }

        let Some((weight, sub_path)) = best else {
            return Ok((0.0, vec![node]));
        };

        let mut path = Vec::with_capacity(sub_path.len() + 1);
        path.push(node);
        path.extend(sub_path);
        Ok((weight, path))
    }
}

impl std::fmt::Display for DispersionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn label(cluster: Option<usize>) -> String {
            cluster.map_or_else(|| "-".to_string(), |c| c.to_string())
        }

        for index in 0..self.node_count() {
            let node = NodeId::from_index(index);
            write!(f, "[{}]{} ->", label(self.cluster_of(node)), node)?;
            for (target, weight) in self.neighbors(node) {
                write!(f, " ([{}]{},{})", label(self.cluster_of(target)), target, weight)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ====================================================================================================================
