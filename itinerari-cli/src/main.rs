//! Entry point for the `itinerari` command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = itinerari_cli::run() {
        eprintln!("itinerari: {err}");
        std::process::exit(1);
    }
}
