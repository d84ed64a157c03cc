//! Helper module for running the complete palette selection.
//!
//! This module combines the individual steps, i.e., clustering, exemplar
//! selection, and sorting, into one function, [`run`]. It is configured with
//! [`Options`], which are created by an [`OptionBuilder`].
//!
//!
//! # Example
//!
//! ```
//! # use colorpick::{Feature, Policy};
//! # use colorpick::pipeline::{Options, SortKey};
//! # fn main() -> Result<(), colorpick::error::ConfigError> {
//! let options = Options::builder()
//!     .clusters(8)
//!     .policy("lab_l100".parse()?)
//!     .sort_by(SortKey::HslS)
//!     .build()?;
//!
//! assert_eq!(options.clusters(), 8);
//! assert_eq!(options.seed(), 42);
//! # Ok(())
//! # }
//! ```

use crate::core::format_line;
use crate::error::{ConfigError, PipelineError};
use crate::{
    select, Assignment, ClusterFeatures, Clustering, Corpus, DispersionGraph, DispersionPath,
    Feature, Float, KMeans, NodeId, Policy, Rgb, SearchBudget, Selection,
};

/// The strategy for picking exemplars.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Strategy {
    /// Pick one exemplar per cluster with the policy.
    Policy(Policy),
    /// Pick the entries along the dispersion path with the given number of
    /// hops from the root.
    Dispersion { hops: usize, budget: SearchBudget },
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Policy(policy) => write!(f, "{}", policy),
            Self::Dispersion { hops, budget } => match budget.max_expansions() {
                Some(max) => write!(f, "dispersion({} hops, {} expansions)", hops, max),
                None => write!(f, "dispersion({} hops)", hops),
            },
        }
    }
}

/// The key for sorting exemplars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Sort by L\*a\*b\* lightness.
    #[default]
    LabL,
    /// Sort by HSL saturation.
    HslS,
}

impl SortKey {
    /// Get the corresponding feature.
    pub const fn feature(&self) -> Feature {
        match *self {
            Self::LabL => Feature::LabL,
            Self::HslS => Feature::HslS,
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lab_l" => Ok(Self::LabL),
            "hsl_s" => Ok(Self::HslS),
            _ => Err(ConfigError::UnknownSortKey(s.to_string())),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.feature().name())
    }
}

// ====================================================================================================================

#[derive(Clone, Debug)]
struct OptionData {
    clusters: usize,
    seed: u64,
    cluster_by: ClusterFeatures,
    strategy: Strategy,
    sort_by: SortKey,
}

impl OptionData {
    pub const fn new() -> Self {
        Self {
            clusters: 16,
            seed: 42,
            cluster_by: ClusterFeatures::Lab,
            strategy: Strategy::Policy(Policy::NearestToValue {
                feature: Feature::HslS,
                target: 0.0,
            }),
            sort_by: SortKey::LabL,
        }
    }
}

/// A builder of options objects.
#[derive(Debug)]
pub struct OptionBuilder(OptionData);

impl OptionBuilder {
    /// Set the number of clusters.
    pub fn clusters(&mut self, clusters: usize) -> &mut Self {
        self.0.clusters = clusters;
        self
    }

    /// Set the seed for clustering.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.0.seed = seed;
        self
    }

    /// Set the features used for clustering.
    pub fn cluster_by(&mut self, features: ClusterFeatures) -> &mut Self {
        self.0.cluster_by = features;
        self
    }

    /// Set the strategy.
    pub fn strategy(&mut self, strategy: Strategy) -> &mut Self {
        self.0.strategy = strategy;
        self
    }

    /// Pick exemplars with the given policy.
    pub fn policy(&mut self, policy: Policy) -> &mut Self {
        self.0.strategy = Strategy::Policy(policy);
        self
    }

    /// Pick exemplars along a dispersion path with the given number of hops,
    /// without limiting the search.
    pub fn dispersion(&mut self, hops: usize) -> &mut Self {
        self.0.strategy = Strategy::Dispersion {
            hops,
            budget: SearchBudget::unbounded(),
        };
        self
    }

    /// Set the key for sorting exemplars.
    pub fn sort_by(&mut self, key: SortKey) -> &mut Self {
        self.0.sort_by = key;
        self
    }

    /// Validate and instantiate the options.
    pub fn build(&self) -> Result<Options, ConfigError> {
        if self.0.clusters == 0 {
            return Err(ConfigError::NoClusters);
        }

        match self.0.strategy {
            Strategy::Policy(Policy::NearestToValue { target, .. }) if !target.is_finite() => {
                return Err(ConfigError::NonFiniteTarget(target))
            }
            Strategy::Dispersion { hops: 0, .. } => return Err(ConfigError::NoHops),
            _ => {}
        }

        Ok(Options(self.0.clone()))
    }
}

/// An options object.
///
/// The defaults are 16 clusters, seed 42, clustering by all three L\*a\*b\*
/// coordinates, picking the least saturated member of each cluster, and
/// sorting by lightness.
#[derive(Clone, Debug)]
pub struct Options(OptionData);

impl Default for Options {
    fn default() -> Self {
        Options(OptionData::new())
    }
}

impl Options {
    /// Create a new builder with the default option values.
    pub fn builder() -> OptionBuilder {
        OptionBuilder(OptionData::new())
    }

    /// Get the number of clusters.
    pub fn clusters(&self) -> usize {
        self.0.clusters
    }

    /// Get the seed.
    pub fn seed(&self) -> u64 {
        self.0.seed
    }

    /// Get the features used for clustering.
    pub fn cluster_by(&self) -> ClusterFeatures {
        self.0.cluster_by
    }

    /// Get the strategy.
    pub fn strategy(&self) -> Strategy {
        self.0.strategy
    }

    /// Get the sort key.
    pub fn sort_by(&self) -> SortKey {
        self.0.sort_by
    }

    /// Create k-means clustering with this object's number of clusters and
    /// seed.
    pub fn kmeans(&self) -> KMeans {
        KMeans::new(self.0.clusters, self.0.seed)
    }
}

// ====================================================================================================================

/// A chosen color.
#[derive(Clone, Debug, PartialEq)]
pub struct Exemplar {
    index: usize,
    cluster: usize,
    name: String,
    rgb: Rgb,
    lab: [Float; 3],
    hsl: [Float; 3],
}

impl Exemplar {
    /// Get the corpus index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the cluster id.
    pub fn cluster(&self) -> usize {
        self.cluster
    }

    /// Get the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the color.
    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    /// Get the L\*a\*b\* coordinates.
    pub fn lab(&self) -> &[Float; 3] {
        &self.lab
    }

    /// Get the HSL coordinates.
    pub fn hsl(&self) -> &[Float; 3] {
        &self.hsl
    }

    /// Format as palette line, i.e., `name: "#rrggbb"`.
    pub fn to_line(&self) -> String {
        format_line(&self.name, self.rgb.as_ref())
    }

    fn sort_value(&self, key: SortKey) -> Float {
        match key {
            SortKey::LabL => self.lab[0],
            SortKey::HslS => self.hsl[1],
        }
    }
}

/// The result of running the pipeline.
#[derive(Clone, Debug)]
pub struct Outcome {
    assignment: Assignment,
    selection: Selection,
    path: Option<DispersionPath>,
    exemplars: Vec<Exemplar>,
}

impl Outcome {
    /// Get the cluster assignment.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Get the selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Get the dispersion path, which only exists for the dispersion
    /// strategy.
    pub fn path(&self) -> Option<&DispersionPath> {
        self.path.as_ref()
    }

    /// Get the chosen colors in sorted order.
    pub fn exemplars(&self) -> &[Exemplar] {
        &self.exemplars
    }
}

/// Run the pipeline.
///
/// This function clusters the corpus with the given algorithm, picks
/// exemplars according to the options' strategy, and sorts them by the
/// options' key. Sorting is stable, with ties in corpus order.
///
/// The algorithm must produce the options' number of clusters and, if it
/// is seeded, use the options' seed. Otherwise, this function fails with a
/// configuration error before touching the corpus.
pub fn run<C: Clustering + ?Sized>(
    corpus: &Corpus,
    options: &Options,
    clustering: &C,
) -> Result<Outcome, PipelineError> {
    if clustering.n_clusters() != options.clusters() {
        return Err(ConfigError::ClusterCountMismatch {
            configured: options.clusters(),
            actual: clustering.n_clusters(),
        }
        .into());
    }
    if let Some(seed) = clustering.seed() {
        if seed != options.seed() {
            return Err(ConfigError::SeedMismatch {
                configured: options.seed(),
                actual: seed,
            }
            .into());
        }
    }

    let data = corpus.features(options.cluster_by().features());
    let ids = clustering.fit_predict(&data, None)?;
    let assignment = Assignment::for_corpus(corpus, ids, clustering.n_clusters())?;
    log::info!(
        "grouped {} colors into {} clusters by {}",
        corpus.len(),
        assignment.count(),
        options.cluster_by()
    );

    let (selection, path) = match options.strategy() {
        Strategy::Policy(policy) => (select(corpus, &assignment, policy)?, None),
        Strategy::Dispersion { hops, budget } => {
            let graph = DispersionGraph::from_corpus(corpus, &assignment)?;
            let path = graph.max_path_with(NodeId::Root, hops, budget)?;
            if path.is_truncated() {
                log::warn!(
                    "dispersion path has {} hops only, not {}",
                    path.hops(),
                    path.requested_hops()
                );
            }

            let mut selection = Selection::new();
            for index in path.entries() {
                if let Some(cluster) = assignment.cluster_of(index) {
                    selection.choose(cluster, index)?;
                }
            }
            (selection, Some(path))
        }
    };

    let mut exemplars: Vec<Exemplar> = Vec::with_capacity(selection.len());
    for index in selection.indices() {
        let (Some(entry), Some(cluster)) = (corpus.get(index), assignment.cluster_of(index))
        else {
            continue;
        };

        exemplars.push(Exemplar {
            index,
            cluster,
            name: entry.name().to_string(),
            rgb: entry.rgb(),
            lab: *entry.lab(),
            hsl: *entry.hsl(),
        });
    }

    let key = options.sort_by();
    exemplars.sort_by(|e1, e2| e1.sort_value(key).total_cmp(&e2.sort_value(key)));
    log::info!("chose {} of {} colors", exemplars.len(), corpus.len());

    Ok(Outcome {
        assignment,
        selection,
        path,
        exemplars,
    })
}

/// Format the exemplars as palette, with one `name: "#rrggbb"` line each.
pub fn format_palette(exemplars: &[Exemplar]) -> String {
    let mut palette = String::new();
    for exemplar in exemplars {
        palette.push_str(&exemplar.to_line());
        palette.push('\n');
    }
    palette
}

// ====================================================================================================================

#[cfg(test)]
mod test {
    use super::{format_palette, run, Options, SortKey, Strategy};
    use crate::error::{ClusterError, ConfigError, PipelineError, SelectionError};
    use crate::{
        ClusterFeatures, Clustering, Corpus, Feature, Float, KMeans, Policy, SearchBudget,
    };
    use std::str::FromStr;

    /// A clustering that returns fixed ids.
    struct Fixed(Vec<usize>, usize);

    impl Clustering for Fixed {
        fn fit_predict(
            &self,
            data: &[Vec<Float>],
            _weights: Option<&[Float]>,
        ) -> Result<Vec<usize>, ClusterError> {
            if data.is_empty() {
                return Err(ClusterError::NoData);
            }
            Ok(self.0.clone())
        }

        fn n_clusters(&self) -> usize {
            self.1
        }
    }

    fn corpus() -> Corpus {
        let text = "\
            white: \"#ffffff\"\n\
            black: \"#000000\"\n\
            red: \"#ff0000\"\n\
            dark red: \"#8b0000\"\n\
            navy: \"#000080\"\n\
            blue: \"#0000ff\"\n";

        match Corpus::parse(text) {
            Ok(corpus) => corpus,
            Err(err) => panic!("test corpus should parse: {}", err),
        }
    }

    #[test]
    fn test_options() -> Result<(), ConfigError> {
        let options = Options::default();
        assert_eq!(options.clusters(), 16);
        assert_eq!(options.seed(), 42);
        assert_eq!(options.cluster_by(), ClusterFeatures::Lab);
        assert_eq!(options.strategy().to_string(), "hsl_s0");
        assert_eq!(options.sort_by(), SortKey::LabL);

        let options = Options::builder()
            .clusters(3)
            .seed(7)
            .cluster_by(ClusterFeatures::LabL)
            .dispersion(2)
            .sort_by(SortKey::from_str("hsl_s")?)
            .build()?;
        assert_eq!(options.kmeans().seed(), 7);
        assert_eq!(options.strategy().to_string(), "dispersion(2 hops)");

        assert_eq!(
            Options::builder().clusters(0).build().map(|o| o.clusters()),
            Err(ConfigError::NoClusters)
        );
        assert_eq!(
            Options::builder().dispersion(0).build().map(|o| o.clusters()),
            Err(ConfigError::NoHops)
        );
        assert!(matches!(
            Options::builder()
                .policy(Policy::NearestToValue {
                    feature: Feature::LabL,
                    target: Float::NAN
                })
                .build(),
            Err(ConfigError::NonFiniteTarget(_))
        ));
        assert_eq!(
            SortKey::from_str("lab_a"),
            Err(ConfigError::UnknownSortKey("lab_a".to_string()))
        );

        Ok(())
    }

    #[test]
    fn test_run_policy() -> Result<(), Box<dyn std::error::Error>> {
        let corpus = corpus();
        let clustering = Fixed(vec![0, 0, 1, 1, 2, 2], 3);

        let options = Options::builder()
            .clusters(3)
            .policy("lab_l100".parse()?)
            .build()?;
        let outcome = run(&corpus, &options, &clustering)?;
        let names: Vec<_> = outcome.exemplars().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["blue", "red", "white"]);
        assert_eq!(outcome.selection().len(), 3);
        assert!(outcome.path().is_none());

        let options = Options::builder()
            .clusters(3)
            .policy("lab_l0".parse()?)
            .build()?;
        let outcome = run(&corpus, &options, &clustering)?;
        let names: Vec<_> = outcome.exemplars().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["black", "navy", "dark red"]);
        assert_eq!(
            format_palette(outcome.exemplars()),
            "black: \"#000000\"\nnavy: \"#000080\"\ndark red: \"#8b0000\"\n"
        );

        Ok(())
    }

    #[test]
    fn test_run_sorted_by_saturation() -> Result<(), Box<dyn std::error::Error>> {
        let corpus = corpus();
        let clustering = Fixed(vec![0, 0, 1, 1, 2, 2], 3);

        let options = Options::builder()
            .clusters(3)
            .policy(Policy::LabMedianLuminance)
            .sort_by(SortKey::HslS)
            .build()?;
        let outcome = run(&corpus, &options, &clustering)?;
        let exemplars = outcome.exemplars();
        assert_eq!(exemplars.len(), 3);
        assert_eq!(exemplars[0].name(), "white");
        assert!(
            exemplars.windows(2).all(|w| w[0].hsl()[1] <= w[1].hsl()[1]),
            "exemplars should be sorted by saturation"
        );
        Ok(())
    }

    #[test]
    fn test_run_dispersion() -> Result<(), Box<dyn std::error::Error>> {
        let corpus = corpus();
        let clustering = Fixed(vec![0, 0, 1, 1, 2, 2], 3);

        let options = Options::builder().clusters(3).dispersion(3).build()?;
        let outcome = run(&corpus, &options, &clustering)?;
        let path = outcome.path().ok_or("dispersion should produce path")?;
        assert_eq!(path.hops(), 3);
        assert!(!path.is_truncated());
        assert_eq!(outcome.exemplars().len(), 3);

        let mut clusters: Vec<_> = outcome.exemplars().iter().map(|e| e.cluster()).collect();
        clusters.sort_unstable();
        assert_eq!(clusters, [0, 1, 2]);

        let options = Options::builder()
            .clusters(3)
            .strategy(Strategy::Dispersion {
                hops: 3,
                budget: SearchBudget::with_max_expansions(1),
            })
            .build()?;
        assert!(matches!(
            run(&corpus, &options, &clustering),
            Err(PipelineError::Search(_))
        ));

        Ok(())
    }

    #[test]
    fn test_run_errors() -> Result<(), ConfigError> {
        let corpus = corpus();

        let options = Options::builder().clusters(3).build()?;
        let result = run(&corpus, &options, &Fixed(vec![0, 1, 2], 3));
        assert!(matches!(
            result,
            Err(PipelineError::Selection(SelectionError::LengthMismatch {
                expected: 6,
                actual: 3
            }))
        ));

        let result = run(&corpus, &options, &Fixed(vec![0, 1, 2, 3, 4, 5], 3));
        assert!(matches!(
            result,
            Err(PipelineError::Selection(SelectionError::BadCluster(_)))
        ));

        let result = run(&Corpus::default(), &options, &options.kmeans());
        assert!(matches!(
            result,
            Err(PipelineError::Cluster(ClusterError::NoData))
        ));
        Ok(())
    }

    #[test]
    fn test_run_mismatched_clustering() -> Result<(), ConfigError> {
        let corpus = corpus();
        let options = Options::builder().clusters(5).seed(1).build()?;

        let result = run(&corpus, &options, &KMeans::new(2, 1));
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::ClusterCountMismatch {
                configured: 5,
                actual: 2
            }))
        ));

        let result = run(&corpus, &options, &KMeans::new(5, 99));
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::SeedMismatch {
                configured: 1,
                actual: 99
            }))
        ));

        let result = run(&corpus, &options, &Fixed(vec![0, 0, 1, 1, 2, 2], 3));
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::ClusterCountMismatch { .. }))
        ));

        let outcome = run(&corpus, &options, &options.kmeans());
        assert!(outcome.is_ok_and(|o| o.assignment().count() == 5));
        Ok(())
    }

    #[test]
    fn test_run_kmeans() -> Result<(), Box<dyn std::error::Error>> {
        let corpus = corpus();
        let options = Options::builder().clusters(3).build()?;
        let outcome = run(&corpus, &options, &options.kmeans())?;

        assert_eq!(outcome.assignment().len(), 6);
        assert_eq!(outcome.exemplars().len(), 3);
        let again = run(&corpus, &options, &options.kmeans())?;
        assert_eq!(outcome.exemplars(), again.exemplars());
        Ok(())
    }
}
