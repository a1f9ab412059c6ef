//! Output formatting helpers.

use owo_colors::OwoColorize;

pub fn print_section_header(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
    println!("{}", "─".repeat(60).bright_black());
}

pub fn print_key_value(key: &str, value: &str) {
    println!("  {} {}", key.bright_black().bold(), value.bold().white());
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_failure(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

pub fn print_item(name: &str, detail: &str) {
    if detail.is_empty() {
        println!("  {} {}", "•".bright_black(), name.white());
    } else {
        println!(
            "  {} {} {}",
            "•".bright_black(),
            name.white(),
            detail.bright_black()
        );
    }
}
