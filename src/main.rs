use clap::Parser;
use mimalloc::MiMalloc;
use rnanorm::{
    cli::{Command, GeneLengthsArgs},
    commands::{self, build_gene_length_source, Normalizer},
    normalization::{Ctf, Cuf, Fpkm, GeneLengthSource, Tmm, Tpm, Uq},
    Cli,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let (io, normalizer) = match cli.command {
        Command::Cpm(io) => (io, Normalizer::Cpm),
        Command::Fpkm(args) => {
            let source = gene_length_source(args.gene_lengths)?;
            (args.io, Normalizer::Fpkm(Fpkm::new(source)))
        }
        Command::Tpm(args) => {
            let source = gene_length_source(args.gene_lengths)?;
            (args.io, Normalizer::Tpm(Tpm::new(source)))
        }
        Command::Uq(io) => (io, Normalizer::Uq(Uq::new())),
        Command::Cuf(io) => (io, Normalizer::Cuf(Cuf::new())),
        Command::Tmm(args) => (args.io, Normalizer::Tmm(Tmm::new(args.m_trim, args.a_trim)?)),
        Command::Ctf(args) => (args.io, Normalizer::Ctf(Ctf::new(args.m_trim, args.a_trim)?)),
    };

    commands::normalize(io.src.as_deref(), io.out.as_deref(), io.force, normalizer)?;

    Ok(())
}

fn gene_length_source(
    args: GeneLengthsArgs,
) -> Result<GeneLengthSource, commands::NormalizeError> {
    build_gene_length_source(args.gtf, args.gene_lengths.as_deref(), &args.gene_id_attr)
}
