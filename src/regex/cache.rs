/// Compile a pattern once per call site and hand back a `&'static Regex`.
/// Patterns are literals in this crate so a failure to compile is a bug,
/// hence the panic.
#[macro_export]
macro_rules! compile {
    ($pattern:expr) => {{
        use std::sync::OnceLock;
        static REGEX: OnceLock<::regex::Regex> = OnceLock::new();
        REGEX.get_or_init(|| ::regex::Regex::new($pattern).unwrap_or_else(|e| panic!("{}", e)))
    }};
}
