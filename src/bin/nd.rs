//! Short alias (`nd`) for the `notedir` binary.

fn main() {
    if let Err(err) = notedir::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
