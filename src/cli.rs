use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use git_testament::{git_testament, render_testament};

use crate::normalization::tmm::{DEFAULT_A_TRIM, DEFAULT_M_TRIM};

git_testament!(TESTAMENT);

#[derive(Parser)]
#[command(version = render_testament!(TESTAMENT))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Counts per million (CPM).
    Cpm(Io),
    /// Fragments per kilobase of transcript per million mapped reads (FPKM).
    Fpkm(WithinSample),
    /// Transcripts per million (TPM).
    Tpm(WithinSample),
    /// Upper quartile (UQ) normalization.
    Uq(Io),
    /// Counts adjusted with upper quartile factors (CUF).
    Cuf(Io),
    /// Trimmed mean of M-values (TMM) normalization.
    Tmm(BetweenSample),
    /// Counts adjusted with TMM factors (CTF).
    Ctf(BetweenSample),
}

#[derive(Args)]
pub struct Io {
    /// Input count matrix (CSV, samples × genes). Reads from stdin if not set.
    pub src: Option<PathBuf>,

    /// Output destination. Writes to stdout if not set.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Overwrite the output file if it exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct WithinSample {
    #[command(flatten)]
    pub io: Io,

    #[command(flatten)]
    pub gene_lengths: GeneLengthsArgs,
}

#[derive(Args)]
pub struct GeneLengthsArgs {
    /// Input annotations file (GTF). Gene lengths are the union of exon lengths.
    #[arg(long, conflicts_with = "gene_lengths")]
    pub gtf: Option<PathBuf>,

    /// Input gene lengths file (CSV with a header, gene ID and length columns).
    #[arg(long)]
    pub gene_lengths: Option<PathBuf>,

    /// GTF attribute to use as the gene identity.
    #[arg(long, default_value_t = String::from("gene_id"))]
    pub gene_id_attr: String,
}

#[derive(Args)]
pub struct BetweenSample {
    #[command(flatten)]
    pub io: Io,

    /// Fraction of log fold changes (M-values) trimmed from each end.
    #[arg(long = "m_trim", default_value_t = DEFAULT_M_TRIM)]
    pub m_trim: f64,

    /// Fraction of mean log expressions (A-values) trimmed from each end.
    #[arg(long = "a_trim", default_value_t = DEFAULT_A_TRIM)]
    pub a_trim: f64,
}
