fn main() {
    if let Err(err) = ppts_import::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
