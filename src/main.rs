//! Eagle-detect CLI entry point.

#![allow(clippy::print_stderr)]

fn main() {
    if let Err(e) = eagle_detect::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
