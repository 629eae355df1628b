use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct VariablesArgs {
    /// .csv input filename
    #[clap(name = "CSV")]
    pub csv_src: PathBuf,
    /// Variables out. May be either json or yaml
    #[clap(name = "VARIABLES_OUT")]
    pub output: PathBuf,
    /// Maximum distinct values for a categorical variable
    #[clap(short = 'c', long = "category-cutoff", default_value = "20")]
    pub category_cutoff: usize,
}

#[derive(Parser, Debug)]
pub struct SummarizeArgs {
    /// .csv input filename
    #[clap(name = "CSV")]
    pub csv_src: PathBuf,
    /// Optional path to a variables file. Columns without a variable are
    /// kept as they are read.
    #[clap(long = "variables", short = 'v')]
    pub variables: Option<PathBuf>,
    /// Optional table config. If given, the table is pivoted before it is
    /// summarized.
    #[clap(long = "config", conflicts_with = "variables")]
    pub config: Option<PathBuf>,
    /// Only print the one-line structure
    #[clap(long, short)]
    pub brief: bool,
}

#[derive(Parser, Debug)]
pub struct ReshapeArgs {
    /// .csv input filename
    #[clap(name = "CSV")]
    pub csv_src: PathBuf,
    /// Path to the table config. May be either json or yaml
    #[clap(long = "config", short = 'c')]
    pub config: PathBuf,
    /// .csv output filename
    #[clap(name = "CSV_OUT")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
#[clap(
    name = "labtab",
    author = "Labtab Developers",
    about = "Pivot, transform, and summarize labeled tables",
    version
)]
pub enum Opt {
    /// Infer variables from a CSV. You may save the output as yaml or json.
    #[clap(name = "variables")]
    Variables(VariablesArgs),
    /// Print the structure and leading rows of a table
    #[clap(name = "summarize")]
    Summarize(SummarizeArgs),
    /// Pivot a CSV with a table config, apply its transforms, and write the
    /// result as a flat CSV
    #[clap(name = "reshape")]
    Reshape(ReshapeArgs),
}
