fn main() {
    if let Err(err) = csv_users::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
