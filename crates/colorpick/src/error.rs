//! Utility module with colorpick's errors.

use crate::Float;

/// An out-of-bounds error.
///
/// This error indicates a value that is out of bounds for some range. The
/// ranges used by this crate include:
///
///   * `0..=255` for the channels of [`Rgb`](crate::Rgb);
///   * `0..=count-1` for the cluster ids of an
///     [`Assignment`](crate::Assignment).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutOfBoundsError {
    pub value: i64,
    pub expected: std::ops::RangeInclusive<i64>,
}

impl OutOfBoundsError {
    /// Create a new out-of-bounds error.
    pub fn new<V: Into<i64>>(value: V, expected: std::ops::RangeInclusive<i64>) -> Self {
        Self {
            value: value.into(),
            expected,
        }
    }
}

impl std::fmt::Display for OutOfBoundsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{} does not fit into range {}..={}",
            self.value,
            self.expected.start(),
            self.expected.end()
        ))
    }
}

impl std::error::Error for OutOfBoundsError {}

// ====================================================================================================================

/// An erroneous color format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorFormatError {
    /// A hexadecimal color without exactly six digits. For example, `#fff` is
    /// missing three digits.
    UnexpectedLength,

    /// A hexadecimal color with six characters that are not all hexadecimal
    /// digits. For example, `#00g000` has a malformed second coordinate.
    MalformedHex,
}

impl std::fmt::Display for ColorFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ColorFormatError::*;

        match self {
            UnexpectedLength => f.write_str("hex color should have exactly 6 digits but does not"),
            MalformedHex => {
                f.write_str("hex color should contain hexadecimal digits only but does not")
            }
        }
    }
}

impl std::error::Error for ColorFormatError {}

// ====================================================================================================================

/// The kinds of errors while loading a color corpus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorpusErrorKind {
    /// The line's color string is not a valid hex color.
    Format(ColorFormatError),
    /// The line has more than one colon.
    TooManyFields,
    /// Reading the line failed.
    Io,
}

/// An error while loading a color corpus.
///
/// Loading fails on the first malformed line. The error identifies that line
/// by its 1-based number.
#[derive(Debug)]
pub struct CorpusError {
    line: usize,
    kind: CorpusErrorKind,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CorpusError {
    /// Create a new corpus error for the given line.
    pub fn new(line: usize, kind: CorpusErrorKind) -> Self {
        Self {
            line,
            kind,
            source: None,
        }
    }

    /// Create a new corpus error for an I/O failure at the given line.
    pub fn io(line: usize, source: std::io::Error) -> Self {
        Self {
            line,
            kind: CorpusErrorKind::Io,
            source: Some(Box::new(source)),
        }
    }

    /// Get the 1-based number of the offending line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get the kind of error.
    pub fn kind(&self) -> CorpusErrorKind {
        self.kind
    }
}

impl std::fmt::Display for CorpusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match self.kind {
            CorpusErrorKind::Format(err) => write!(f, "{}", err),
            CorpusErrorKind::TooManyFields => {
                f.write_str("line should have at most one colon but has more")
            }
            CorpusErrorKind::Io => f.write_str("could not read line"),
        }
    }
}

impl std::error::Error for CorpusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            CorpusErrorKind::Format(ref err) => Some(err),
            _ => self.source.as_deref().map(|e| e as _),
        }
    }
}

impl From<CorpusError> for std::io::Error {
    fn from(value: CorpusError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, value)
    }
}

// ====================================================================================================================

/// An invalid configuration.
///
/// Configuration errors are raised while validating options, i.e., before
/// any colors are processed.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A feature name other than `lab_l`, `lab_a`, `lab_b`, `hsl_h`, `hsl_s`,
    /// or `hsl_l`.
    UnknownFeature(String),
    /// A clustering feature other than `lab`, `lab_l`, `lab_a`, or `lab_b`.
    UnknownClusterFeatures(String),
    /// A selection policy that is neither `lab_center`, `lab_lcenter`, nor a
    /// feature name followed by a number.
    UnknownPolicy(String),
    /// A sort key other than `lab_l` or `hsl_s`.
    UnknownSortKey(String),
    /// A request for zero clusters.
    NoClusters,
    /// A dispersion search with zero hops.
    NoHops,
    /// A target value that is not a finite number.
    NonFiniteTarget(Float),
    /// A clustering algorithm with another number of clusters than the
    /// options.
    ClusterCountMismatch { configured: usize, actual: usize },
    /// A clustering algorithm with another seed than the options.
    SeedMismatch { configured: u64, actual: u64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ConfigError::*;

        match self {
            UnknownFeature(name) => write!(
                f,
                "feature should be lab_l, lab_a, lab_b, hsl_h, hsl_s, or hsl_l but is {:?}",
                name
            ),
            UnknownClusterFeatures(name) => write!(
                f,
                "clustering features should be lab, lab_l, lab_a, or lab_b but are {:?}",
                name
            ),
            UnknownPolicy(name) => write!(
                f,
                "selection policy should be lab_center, lab_lcenter, or a feature with a number \
                but is {:?}",
                name
            ),
            UnknownSortKey(name) => {
                write!(f, "sort key should be lab_l or hsl_s but is {:?}", name)
            }
            NoClusters => f.write_str("number of clusters should be positive but is zero"),
            NoHops => f.write_str("number of dispersion hops should be positive but is zero"),
            NonFiniteTarget(value) => {
                write!(f, "target value should be a finite number but is {}", value)
            }
            ClusterCountMismatch { configured, actual } => write!(
                f,
                "clustering should produce {} clusters but produces {}",
                configured, actual
            ),
            SeedMismatch { configured, actual } => write!(
                f,
                "clustering should use seed {} but uses {}",
                configured, actual
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ====================================================================================================================

/// An error while clustering feature vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClusterError {
    /// There are no feature vectors.
    NoData,
    /// The requested number of clusters is zero.
    NoClusters,
    /// The requested number of clusters exceeds the number of feature vectors.
    TooManyClusters { clusters: usize, points: usize },
    /// The feature vector at the index has a different dimension than the
    /// first one.
    RaggedData { index: usize },
    /// The number of weights differs from the number of feature vectors.
    WeightMismatch { weights: usize, points: usize },
    /// A feature vector or weight at the index is not-a-number, infinite, or,
    /// for weights, negative.
    NonFinite { index: usize },
}

impl std::fmt::Display for ClusterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ClusterError::*;

        match *self {
            NoData => f.write_str("clustering needs at least one feature vector"),
            NoClusters => f.write_str("number of clusters should be positive but is zero"),
            TooManyClusters { clusters, points } => write!(
                f,
                "number of clusters {} should not exceed number of points {}",
                clusters, points
            ),
            RaggedData { index } => write!(
                f,
                "feature vector {} should have the same dimension as the first one",
                index
            ),
            WeightMismatch { weights, points } => write!(
                f,
                "number of weights {} should equal number of points {}",
                weights, points
            ),
            NonFinite { index } => write!(f, "input {} should be finite but is not", index),
        }
    }
}

impl std::error::Error for ClusterError {}

// ====================================================================================================================

/// An error while selecting cluster exemplars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// The cluster assignment or graph input does not cover the corpus.
    LengthMismatch { expected: usize, actual: usize },
    /// A cluster id is out of bounds.
    BadCluster(OutOfBoundsError),
    /// The cluster already has a different exemplar.
    AlreadyChosen {
        cluster: usize,
        chosen: usize,
        rejected: usize,
    },
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SelectionError::*;

        match self {
            LengthMismatch { expected, actual } => write!(
                f,
                "input should have {} entries, one per color, but has {}",
                expected, actual
            ),
            BadCluster(err) => write!(f, "invalid cluster id: {}", err),
            AlreadyChosen {
                cluster,
                chosen,
                rejected,
            } => write!(
                f,
                "cluster {} already has exemplar {} and cannot also have {}",
                cluster, chosen, rejected
            ),
        }
    }
}

impl std::error::Error for SelectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SelectionError::BadCluster(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OutOfBoundsError> for SelectionError {
    fn from(value: OutOfBoundsError) -> Self {
        SelectionError::BadCluster(value)
    }
}

// ====================================================================================================================

/// An error while searching for a dispersion path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchError {
    /// The search expanded more nodes than its budget allows.
    BudgetExhausted { expansions: u64 },
    /// The start node does not exist.
    UnknownNode(usize),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            SearchError::BudgetExhausted { expansions } => write!(
                f,
                "dispersion search gave up after {} expansions",
                expansions
            ),
            SearchError::UnknownNode(index) => {
                write!(f, "graph has no node with index {}", index)
            }
        }
    }
}

impl std::error::Error for SearchError {}

// ====================================================================================================================

/// An error while running the color selection pipeline.
#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Cluster(ClusterError),
    Selection(SelectionError),
    Search(SearchError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Config(_) => f.write_str("clustering does not match options"),
            PipelineError::Cluster(_) => f.write_str("could not cluster colors"),
            PipelineError::Selection(_) => f.write_str("could not select cluster exemplars"),
            PipelineError::Search(_) => f.write_str("could not find dispersion path"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            PipelineError::Cluster(err) => Some(err),
            PipelineError::Selection(err) => Some(err),
            PipelineError::Search(err) => Some(err),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(value: ConfigError) -> Self {
        PipelineError::Config(value)
    }
}

impl From<ClusterError> for PipelineError {
    fn from(value: ClusterError) -> Self {
        PipelineError::Cluster(value)
    }
}

impl From<SelectionError> for PipelineError {
    fn from(value: SelectionError) -> Self {
        PipelineError::Selection(value)
    }
}

impl From<SearchError> for PipelineError {
    fn from(value: SearchError) -> Self {
        PipelineError::Search(value)
    }
}
