use anyhow::{Context, Result};
use chrono::Utc;

use rerelease::address::parse_instant;
use rerelease::rule::{Rule, Weekday};
use rerelease::schedule::generate;

pub fn expand(rule_text: &str, start: Option<&str>, count: usize) -> Result<()> {
    let rule = Rule::parse(rule_text);
    let anchor = match start {
        Some(text) => parse_instant(text).with_context(|| format!("Invalid start instant: {text}"))?,
        None => Utc::now().fixed_offset(),
    };

    println!("Rule {rule} from {}", anchor.to_rfc3339());
    println!("================================");

    let mut printed = 0;
    for (i, at) in generate(rule, anchor).take(count).enumerate() {
        println!("{:>4}. {} {}", i + 1, Weekday::of(&at).code(), at.to_rfc3339());
        printed += 1;
    }

    if printed < count {
        println!("(sequence ends after {printed} occurrences)");
    }

    Ok(())
}
