fn main() {
    env_logger::init();
    if let Err(err) = timeline_rs_layout::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
