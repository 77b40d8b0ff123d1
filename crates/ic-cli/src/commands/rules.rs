//! Rules command: list classification rules in evaluation order.

use std::fmt::Write;

use ic_core::CategoryLabel;
use ic_core::rules::rules;

pub fn run() {
    print!("{}", format_rules());
}

fn format_rules() -> String {
    let mut output = String::new();
    for (i, rule) in rules().iter().enumerate() {
        writeln!(output, "{:>2}. {}\t{}", i + 1, rule.label, rule.pattern.as_str()).unwrap();
    }
    writeln!(output, "    {}\t(no rule matched)", CategoryLabel::Other).unwrap();
    output
}
