mod infra;
mod runtime;

fn main() {
    if let Err(e) = runtime::run_from_args() {
        eprintln!("fixlog: {e}");
        std::process::exit(1);
    }
}
