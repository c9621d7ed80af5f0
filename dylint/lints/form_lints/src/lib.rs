//! Custom lints for form-core.
//!
//! ## Implemented Lints
//!
//! - `NO_PRINTLN`: forbids `println!`, `eprintln!` and `dbg!` in library
//!   code. Form lifecycle output goes through `tracing`, stamped with the
//!   form alias by `FormLog`.

#![feature(rustc_private)]
#![warn(unused_extern_crates)]

extern crate rustc_ast;
extern crate rustc_lint;
extern crate rustc_session;
extern crate rustc_span;

use rustc_ast::{Expr, ExprKind, MacCall};
use rustc_lint::{EarlyContext, EarlyLintPass, LintContext};
use rustc_session::{declare_lint_pass, declare_tool_lint};
use rustc_span::Span;

declare_tool_lint! {
    /// **What it does:** Forbids `println!`, `eprintln!` and `dbg!` in
    /// library code.
    ///
    /// **Why is this bad?** Rendering and submission handling run inside a
    /// host web application. Writing to stdout or stderr interleaves with the
    /// host output, loses the form alias and cannot be filtered by level.
    /// Submitted values printed this way also end up in process logs.
    ///
    /// **Known problems:** None.
    ///
    /// **Example:**
    /// ```rust,ignore
    /// // Bad
    /// println!("form {} submitted", alias);
    /// dbg!(&submitted_data);
    ///
    /// // Good
    /// ctx.log().info(format_args!("submission succeeded"));
    /// tracing::debug!(form = %alias, "form built");
    /// ```
    pub form_lints::NO_PRINTLN,
    Deny,
    "use of println!, eprintln! or dbg!; log through tracing instead"
}

declare_lint_pass!(NoPrintln => [NO_PRINTLN]);

impl EarlyLintPass for NoPrintln {
    fn check_expr(&mut self, cx: &EarlyContext<'_>, expr: &Expr) {
        if let ExprKind::MacCall(mac) = &expr.kind {
            check_macro(cx, mac, expr.span);
        }
    }
}

fn check_macro(cx: &EarlyContext<'_>, mac: &MacCall, span: Span) {
    // Only bare `println!`, not `some_crate::println!`.
    if mac.path.segments.len() != 1 {
        return;
    }

    let replacement = match mac.path.segments[0].ident.name.as_str() {
        "println" => "tracing::info!",
        "eprintln" => "tracing::warn!",
        "dbg" => "tracing::debug!",
        _ => return,
    };

    cx.span_lint(NO_PRINTLN, span, |diag| {
        diag.help(format!("use `{}` or the form `FormLog`", replacement));
        diag.note("stdout and stderr belong to the host application");
    });
}

#[unsafe(no_mangle)]
#[allow(unsafe_code)]
pub extern "C" fn register_lints(_sess: &rustc_session::Session, lint_store: &mut rustc_lint::LintStore) {
    lint_store.register_lints(&[&NO_PRINTLN]);
    lint_store.register_early_pass(|| Box::new(NoPrintln));
}

#[unsafe(no_mangle)]
pub fn dylint_version() -> *mut std::os::raw::c_char {
    std::ffi::CString::new(dylint_linting::DYLINT_VERSION)
        .expect("version string contains null byte")
        .into_raw()
}
