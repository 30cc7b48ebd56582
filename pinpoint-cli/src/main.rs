//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use pinpoint_cli::CliError;

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on stderr"
)]
fn main() {
    match pinpoint_cli::run() {
        Ok(()) => {}
        // Clap renders help, version and usage errors with its own exit code.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("pinpoint: {err}");
            std::process::exit(1);
        }
    }
}
