fn main() {
    if let Err(err) = quote_keeper::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
