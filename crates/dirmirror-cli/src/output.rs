/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
}

/// Human-readable output formatter with checkmarks and indentation
///
/// Errors go to stderr so that stdout carries only the operator log echo.
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn info(&self, message: &str) {
        eprintln!("  {}", message);
    }
}

pub fn get_formatter() -> Box<dyn OutputFormatter> {
    Box::new(HumanFormatter)
}
