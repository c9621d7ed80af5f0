//! Runs `cargo dylint` against form-core.

use std::process::Command;

fn cargo_dylint(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .arg("dylint")
        .args(args)
        .current_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../../.."))
        .output()
        .expect("failed to run cargo dylint")
}

#[test]
fn form_core_has_no_print_macros() {
    let output = cargo_dylint(&["--lib", "form_lints", "--", "--manifest-path", "Cargo.toml"]);
    assert!(
        output.status.success(),
        "dylint should pass on form-core, got: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn no_println_is_registered_at_deny() {
    let output = cargo_dylint(&["list", "--lib", "form_lints"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("form_lints::no_println"));
    assert!(stdout.contains("deny"));
}
