use clap::Parser;
use cli_common::OrBail;
use config_producer::cli::Cli;
use config_producer::{run, write_output};

fn main() {
    let cli = Cli::parse();
    cli_common::init_logging(&cli.log);

    let document = run(&cli).or_bail("config-producer failed");
    write_output(&cli.output, &document).or_bail("failed to write output");
}
