use clap::Parser;

use corpus_cli::commands::convert_ops;

#[derive(Parser)]
#[command(
    name = "corpusconv",
    about = "Compile a morphological dictionary into a password-corpus word table"
)]
struct Cli {
    /// Source file with a `#` configuration header
    source: String,
    /// Output corpus file
    dest: String,
}

fn main() {
    let cli = Cli::parse();
    convert_ops::convert_cmd(&cli.source, &cli.dest);
}
