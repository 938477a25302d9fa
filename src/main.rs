//! rattendance main entrypoint.

use rattendance::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if !e.is_validation() {
            eprintln!("Run `rattendance db --check` if the problem persists.");
        }
        std::process::exit(1);
    }
}
