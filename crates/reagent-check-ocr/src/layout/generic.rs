//! Free-form `name   ...   number` lines

use lazy_regex::regex;
use reagent_check_core::{Reading, Readings};

use super::columns::lines;

pub(crate) fn parse(text: &str) -> Readings {
    let pattern = regex!(r"(?i)^([A-Za-z0-9\s\-]+?)\s{2,}.*?(\d+)\s*(?:ML|Tests|units)?$");

    lines(text)
        .into_iter()
        .filter_map(|line| {
            let captures = pattern.captures(&line)?;
            let quantity: f64 = captures[2].parse().ok()?;
            Some(Reading::new(&captures[1], quantity))
        })
        .collect()
}
