// Every print macro below is reported by NO_PRINTLN.

fn print_submission(alias: &str) {
    println!("form {} submitted", alias);
}

fn print_failure(alias: &str) {
    eprintln!("form {} failed", alias);
}

fn dump_data() {
    let data = vec![("email", "jane@example.com")];
    dbg!(data);
}

// Not reported.
fn log_submission(alias: &str) {
    tracing::info!(form = %alias, "submission succeeded");
}

fn main() {
    print_submission("contact");
    print_failure("contact");
    dump_data();
    log_submission("contact");
}
