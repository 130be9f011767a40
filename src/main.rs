use std::process;

fn main() {
    if let Err(err) = ackline::app::run() {
        eprintln!("fatal: {err}");
        process::exit(1);
    }
}
