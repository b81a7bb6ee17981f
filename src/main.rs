fn main() {
    if let Err(e) = droidtap_lib::run() {
        tracing::error!(error = %e, "droidtap terminated");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
