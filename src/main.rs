fn main() {
    if let Err(err) = arc_connector::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
