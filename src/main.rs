use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use forex::log::init_logging;
use forex::{Cli, ConversionRequest, ForexError};

fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    let request = ConversionRequest::from(&args);
    match forex::run(&request, |key| std::env::var(key).ok()) {
        Ok(result) => println!("{result}"),
        Err(e) => {
            tracing::error!(error = ?e, "conversion failed");
            let kind = match &e {
                ForexError::MissingCredential(_) => ErrorKind::MissingRequiredArgument,
                ForexError::Fetch(_) => ErrorKind::Io,
                _ => ErrorKind::InvalidValue,
            };
            // Same reporting path and exit status as a usage error
            let mut cmd = Cli::command();
            cmd.error(kind, e).exit()
        }
    }
}
