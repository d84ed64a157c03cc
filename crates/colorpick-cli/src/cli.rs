use std::path::PathBuf;

use clap::Parser;
use colorpick::error::ConfigError;
use colorpick::pipeline::{Options, SortKey, Strategy};
use colorpick::{ClusterFeatures, Policy, SearchBudget};
use prettytty::opt::Volume;

/// Choose a small set of clearly distinct colors from a color corpus
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArguments {
    /// Path to the color corpus with one `name: "#rrggbb"` per line
    #[arg(short = 'i', long)]
    pub color_corpus: PathBuf,
    /// Name of the color corpus
    #[arg(short = 't', long, default_value = "default-colors")]
    pub color_corpus_name: String,
    /// Seed for clustering
    #[arg(short = 'r', long, default_value_t = 42)]
    pub random_seed: u64,
    /// Number of colors to choose, which also is the number of clusters
    #[arg(
        short = 'n',
        long = "number-choosen-colors",
        visible_alias = "number-chosen-colors",
        default_value_t = 16
    )]
    pub number_chosen_colors: usize,
    /// Features for clustering: lab, lab_l, lab_a, or lab_b
    #[arg(short = 'g', long, default_value = "lab")]
    pub cluster_by: ClusterFeatures,
    /// Policy for choosing one color per cluster: lab_center, lab_lcenter,
    /// or a feature with target value such as lab_l0, lab_l50, lab_l100,
    /// hsl_s0, hsl_s0.5, or hsl_s1
    #[arg(short = 'c', long, default_value = "hsl_s0")]
    pub choose_by: Policy,
    /// Sort order of the chosen colors: lab_l or hsl_s
    #[arg(short = 's', long, default_value = "lab_l")]
    pub sort_by: SortKey,
    /// Write the chosen colors to this palette file
    #[arg(short = 'o', long)]
    pub output_color_palette: Option<PathBuf>,
    /// Choose the colors along the maximally dispersed path with <HOPS> hops
    /// instead of one color per cluster
    #[arg(long, value_name = "HOPS")]
    pub dispersion_hops: Option<usize>,
    /// Give up on the dispersion search after <MAX_EXPANSIONS> expanded nodes
    #[arg(long, requires = "dispersion_hops")]
    pub max_expansions: Option<u64>,
    /// Log more details; repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CommandLineArguments {
    /// Get the logging volume.
    pub fn volume(&self) -> Volume {
        match self.verbose {
            0 => Volume::Silent,
            1 => Volume::Regular,
            _ => Volume::Detailed,
        }
    }

    /// Validate the pipeline options.
    pub fn options(&self) -> Result<Options, ConfigError> {
        let mut builder = Options::builder();
        builder
            .clusters(self.number_chosen_colors)
            .seed(self.random_seed)
            .cluster_by(self.cluster_by)
            .policy(self.choose_by)
            .sort_by(self.sort_by);

        if let Some(hops) = self.dispersion_hops {
            let budget = self
                .max_expansions
                .map_or(SearchBudget::unbounded(), SearchBudget::with_max_expansions);
            builder.strategy(Strategy::Dispersion { hops, budget });
        }

        builder.build()
    }
}
