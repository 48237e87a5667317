//! Short binary name (`qk`) that forwards to the `quote_keeper` library.

fn main() {
    if let Err(err) = quote_keeper::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
