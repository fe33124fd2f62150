use rerelease::rule::{Frequency, Rule};

pub fn rule(text: &str) {
    let rule = Rule::parse(text);

    let unit = match rule.frequency() {
        Frequency::Day => "day",
        Frequency::Week => "week",
        Frequency::Month => "month",
    };
    let days: Vec<&str> = rule.weekdays().iter().map(|day| day.code()).collect();

    println!("Input:      {text:?}");
    println!("Normalized: {rule}");
    println!("Interval:   every {} {unit}(s)", rule.interval());
    if days.is_empty() {
        println!("Weekdays:   (any)");
    } else {
        println!("Weekdays:   {}", days.join(", "));
        if rule.frequency() == Frequency::Day {
            println!("            (ignored for daily rules)");
        }
    }
}
