use std::io::BufRead;

use crate::core::{format_line, parse_hex, parse_line, rgb_to_hsl, rgb_to_lab, rgb_to_xyz};
use crate::error::{ColorFormatError, ConfigError, CorpusError, OutOfBoundsError, SelectionError};
use crate::Float;

// ====================================================================================================================
// Rgb
// ====================================================================================================================

/// A 24-bit sRGB color.
///
/// Rgb colors are immutable. They are created from their coordinates with
/// [`Rgb::new`], from hexadecimal strings with
/// [`Rgb::from_str`](std::str::FromStr::from_str), from possibly
/// out-of-range integers with `TryFrom<[i32; 3]>`, or from floating point
/// coordinates with [`Rgb::try_from_floats`]. Their
/// [`Display`](std::fmt::Display) implementation produces lowercase `#rrggbb`
/// strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb([u8; 3]);

impl Rgb {
    /// Create a new color from its coordinates.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Create a new color from floating point coordinates.
    ///
    /// The coordinates are truncated towards zero before checking that they
    /// fall into the `0..=255` range. Not-a-number is out of bounds, too.
    pub fn try_from_floats(r: Float, g: Float, b: Float) -> Result<Self, OutOfBoundsError> {
        fn convert(value: Float) -> Result<u8, OutOfBoundsError> {
            let value = value.trunc();
            if (0.0..=255.0).contains(&value) {
                Ok(value as u8)
            } else {
                Err(OutOfBoundsError::new(value as i64, 0..=255))
            }
        }

        Ok(Self([convert(r)?, convert(g)?, convert(b)?]))
    }

    /// Get this color's coordinates.
    pub const fn coordinates(&self) -> [u8; 3] {
        self.0
    }

    /// Convert this color to CIE XYZ.
    pub fn to_xyz(&self) -> [Float; 3] {
        let [r, g, b] = self.0;
        rgb_to_xyz(r, g, b)
    }

    /// Convert this color to CIE L\*a\*b\*.
    pub fn to_lab(&self) -> [Float; 3] {
        let [r, g, b] = self.0;
        rgb_to_lab(r, g, b)
    }

    /// Convert this color to HSL with unit-range coordinates.
    pub fn to_hsl(&self) -> [Float; 3] {
        let [r, g, b] = self.0;
        rgb_to_hsl(r, g, b)
    }
}

impl AsRef<[u8; 3]> for Rgb {
    fn as_ref(&self) -> &[u8; 3] {
        &self.0
    }
}

impl std::ops::Index<usize> for Rgb {
    type Output = u8;

    /// Access the coordinate with the given index.
    ///
    /// # Panics
    ///
    /// This method panics if `2 < index`.
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self(value)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(value: Rgb) -> Self {
        value.0
    }
}

impl TryFrom<[i32; 3]> for Rgb {
    type Error = OutOfBoundsError;

    fn try_from(value: [i32; 3]) -> Result<Self, Self::Error> {
        fn convert(value: i32) -> Result<u8, OutOfBoundsError> {
            u8::try_from(value).map_err(|_| OutOfBoundsError::new(value, 0..=255))
        }

        let [r, g, b] = value;
        Ok(Self([convert(r)?, convert(g)?, convert(b)?]))
    }
}

impl std::str::FromStr for Rgb {
    type Err = ColorFormatError;

    /// Parse a hexadecimal color such as `#ff6347` or `FF6347`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Self)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        f.write_fmt(format_args!("#{:02x}{:02x}{:02x}", r, g, b))
    }
}

// ====================================================================================================================
// Feature
// ====================================================================================================================

/// A derived coordinate of a corpus entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    LabL,
    LabA,
    LabB,
    HslH,
    HslS,
    HslL,
}

impl Feature {
    /// Get the feature's name, e.g., `lab_l`.
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::LabL => "lab_l",
            Self::LabA => "lab_a",
            Self::LabB => "lab_b",
            Self::HslH => "hsl_h",
            Self::HslS => "hsl_s",
            Self::HslL => "hsl_l",
        }
    }

    /// Get all features in declaration order.
    pub const fn all() -> [Feature; 6] {
        [
            Self::LabL,
            Self::LabA,
            Self::LabB,
            Self::HslH,
            Self::HslS,
            Self::HslL,
        ]
    }
}

impl std::str::FromStr for Feature {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| ConfigError::UnknownFeature(s.to_string()))
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The features fed into clustering.
///
/// Clustering either uses all three L\*a\*b\* coordinates or just one of
/// them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClusterFeatures {
    #[default]
    Lab,
    LabL,
    LabA,
    LabB,
}

impl ClusterFeatures {
    /// Get the name, e.g., `lab`.
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::Lab => "lab",
            Self::LabL => "lab_l",
            Self::LabA => "lab_a",
            Self::LabB => "lab_b",
        }
    }

    /// Get the corresponding features.
    pub const fn features(&self) -> &'static [Feature] {
        match *self {
            Self::Lab => &[Feature::LabL, Feature::LabA, Feature::LabB],
            Self::LabL => &[Feature::LabL],
            Self::LabA => &[Feature::LabA],
            Self::LabB => &[Feature::LabB],
        }
    }
}

impl std::str::FromStr for ClusterFeatures {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lab" => Ok(Self::Lab),
            "lab_l" => Ok(Self::LabL),
            "lab_a" => Ok(Self::LabA),
            "lab_b" => Ok(Self::LabB),
            _ => Err(ConfigError::UnknownClusterFeatures(s.to_string())),
        }
    }
}

impl std::fmt::Display for ClusterFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ====================================================================================================================
// Corpus
// ====================================================================================================================

/// A named color.
///
/// Each entry caches its L\*a\*b\* and HSL coordinates, which are computed
/// once upon creation.
#[derive(Clone, Debug, PartialEq)]
pub struct CorpusEntry {
    name: String,
    rgb: Rgb,
    lab: [Float; 3],
    hsl: [Float; 3],
}

impl CorpusEntry {
    /// Create a new corpus entry.
    pub fn new<S: Into<String>>(name: S, rgb: Rgb) -> Self {
        Self {
            name: name.into(),
            rgb,
            lab: rgb.to_lab(),
            hsl: rgb.to_hsl(),
        }
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

    /// Get the value of the given feature.
    pub fn feature(&self, feature: Feature) -> Float {
        match feature {
            Feature::LabL => self.lab[0],
            Feature::LabA => self.lab[1],
            Feature::LabB => self.lab[2],
            Feature::HslH => self.hsl[0],
            Feature::HslS => self.hsl[1],
            Feature::HslL => self.hsl[2],
        }
    }

    /// Format this entry as a corpus line, i.e., `name: "#rrggbb"`.
    pub fn to_line(&self) -> String {
        format_line(&self.name, self.rgb.as_ref())
    }
}

/// A table of named colors.
///
/// The corpus preserves the order of its entries. Entry indices are stable
/// and identify colors throughout clustering, selection, and search. Names
/// need not be unique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// Parse a corpus from its textual representation.
    ///
    /// Each line is either `name: "#RRGGBB"` or a bare color string, which
    /// then also serves as name. Blank lines and lines starting with `//` are
    /// ignored. Parsing fails on the first malformed line.
    pub fn parse(text: &str) -> Result<Self, CorpusError> {
        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if let Some(entry) = Self::parse_entry(index + 1, line)? {
                entries.push(entry);
            }
        }

        log::debug!("parsed {} colors", entries.len());
        Ok(Self { entries })
    }

    /// Read a corpus from the given reader.
    ///
    /// This method accepts the same format as [`Corpus::parse`]. I/O errors
    /// are reported as corpus errors for the line being read.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, CorpusError> {
        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| CorpusError::io(index + 1, err))?;
            if let Some(entry) = Self::parse_entry(index + 1, &line)? {
                entries.push(entry);
            }
        }

        log::debug!("read {} colors", entries.len());
        Ok(Self { entries })
    }

    fn parse_entry(number: usize, line: &str) -> Result<Option<CorpusEntry>, CorpusError> {
        let parsed = parse_line(line).map_err(|kind| CorpusError::new(number, kind))?;
        Ok(parsed.map(|(name, rgb)| CorpusEntry::new(name, Rgb::from(rgb))))
    }

    /// Create a new corpus from the given entries.
    pub fn from_entries(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Determine whether the corpus has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the entry with the given index.
    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(index)
    }

    /// Get an iterator over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, CorpusEntry> {
        self.entries.iter()
    }

    /// Get the entries.
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Get the value of the given feature for every entry.
    pub fn values(&self, feature: Feature) -> Vec<Float> {
        self.entries
            .iter()
            .map(|entry| entry.feature(feature))
            .collect()
    }

    /// Get the L\*a\*b\* coordinates of every entry.
    pub fn labs(&self) -> Vec<[Float; 3]> {
        self.entries.iter().map(|entry| entry.lab).collect()
    }

    /// Get one feature vector per entry.
    ///
    /// Each vector has the values of the given features in the given order.
    pub fn features(&self, features: &[Feature]) -> Vec<Vec<Float>> {
        self.entries
            .iter()
            .map(|entry| features.iter().map(|f| entry.feature(*f)).collect())
            .collect()
    }
}

impl From<Vec<CorpusEntry>> for Corpus {
    fn from(value: Vec<CorpusEntry>) -> Self {
        Self::from_entries(value)
    }
}

impl FromIterator<CorpusEntry> for Corpus {
    fn from_iter<T: IntoIterator<Item = CorpusEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a CorpusEntry;
    type IntoIter = std::slice::Iter<'a, CorpusEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ====================================================================================================================
// Assignment
// ====================================================================================================================

/// An assignment of corpus entries to clusters.
///
/// The assignment has one cluster id per entry. Ids are dense integers
/// between zero and the cluster count, exclusive. A cluster may be empty,
/// i.e., no entry may have its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    ids: Vec<usize>,
    count: usize,
}

impl Assignment {
    /// Create a new assignment.
    ///
    /// This function fails if any id is not smaller than the count.
    pub fn new(ids: Vec<usize>, count: usize) -> Result<Self, SelectionError> {
        if let Some(&id) = ids.iter().find(|&&id| count <= id) {
            return Err(OutOfBoundsError::new(
                i64::try_from(id).unwrap_or(i64::MAX),
                0..=(count as i64 - 1),
            )
            .into());
        }

        Ok(Self { ids, count })
    }

    /// Create a new assignment for the given corpus.
    ///
    /// In addition to the checks performed by [`Assignment::new`], this
    /// function fails if there isn't exactly one id per corpus entry.
    pub fn for_corpus(
        corpus: &Corpus,
        ids: Vec<usize>,
        count: usize,
    ) -> Result<Self, SelectionError> {
        if ids.len() != corpus.len() {
            return Err(SelectionError::LengthMismatch {
                expected: corpus.len(),
                actual: ids.len(),
            });
        }

        Self::new(ids, count)
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Determine whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Get the number of clusters.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Get all cluster ids, one per entry.
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Get the cluster id of the entry with the given index.
    pub fn cluster_of(&self, index: usize) -> Option<usize> {
        self.ids.get(index).copied()
    }

    /// Get the indices of the entries in the given cluster, in ascending
    /// order.
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = usize> + '_ {
        self.ids
            .iter()
            .enumerate()
            .filter(move |&(_, &id)| id == cluster)
            .map(|(index, _)| index)
    }

    /// Get the number of entries for each cluster.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.count];
        for &id in &self.ids {
            sizes[id] += 1;
        }
        sizes
    }
}

// ====================================================================================================================
