fn main() {
    if let Err(err) = infraviz::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
