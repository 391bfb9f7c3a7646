//! Free-text duration and serving-count parsing.
//!
//! Both parsers are total: unparsable input yields 0, never an error.
//! Ranges take the lower bound ("4-6 servings" is 4).

/// Parse a free-text duration into whole minutes.
///
/// Accepts ISO-8601 style durations (`PT1H30M`), unit words
/// (`1 hour 30 min`, `45 minutes`), compact forms (`1h30m`) and bare
/// numbers, which are read as minutes.
pub fn parse_minutes(text: &str) -> u32 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    let upper = text.to_uppercase();
    if upper.starts_with('P')
        && matches!(upper.chars().nth(1), Some(c) if c == 'T' || c.is_ascii_digit())
    {
        return parse_iso_duration(&upper);
    }

    let mut total = 0f64;
    let mut pending: Option<f64> = None;
    let mut saw_unit = false;

    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| c == ',' || c == '(' || c == ')');
        if token.is_empty() {
            continue;
        }
        if let Some((value, unit)) = split_number_and_unit(token) {
            if !unit.is_empty() {
                // Compact form like "1h30m" may carry several segments
                total += parse_compact_segments(token);
                saw_unit = true;
                pending = None;
            } else {
                // Bare number: unit should follow in the next token
                if let Some(v) = pending.take() {
                    total += v; // previous bare number, assume minutes
                }
                pending = Some(value);
            }
        } else if let Some(minutes_per_unit) = unit_to_minutes(token) {
            if let Some(value) = pending.take() {
                total += value * minutes_per_unit;
                saw_unit = true;
            }
        }
    }

    if let Some(value) = pending {
        // Trailing bare number with no unit: minutes
        total += value;
        saw_unit = saw_unit || total > 0.0;
    }

    if !saw_unit && total == 0.0 {
        return 0;
    }
    total.round().max(0.0) as u32
}

/// Parse a serving-count phrase into an integer.
///
/// Takes the first integer in the text, so "4-6 servings" is 4 and
/// "Serves 8" is 8. Returns 0 when no digits are present.
pub fn parse_servings(text: &str) -> u32 {
    let mut digits = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !digits.is_empty() {
            break;
        }
    }
    digits.parse().unwrap_or(0)
}

/// ISO-8601 duration subset: P[nD][T][nH][nM][nS]. Seconds are dropped.
fn parse_iso_duration(upper: &str) -> u32 {
    let mut total = 0u32;
    let mut digits = String::new();
    for c in upper.chars().skip(1) {
        match c {
            '0'..='9' => digits.push(c),
            'D' => {
                total += digits.parse::<u32>().unwrap_or(0) * 24 * 60;
                digits.clear();
            }
            'H' => {
                total += digits.parse::<u32>().unwrap_or(0) * 60;
                digits.clear();
            }
            'M' => {
                total += digits.parse::<u32>().unwrap_or(0);
                digits.clear();
            }
            'T' | 'S' | '.' => digits.clear(),
            _ => digits.clear(),
        }
    }
    total
}

/// Split a token into its leading number and trailing alphabetic unit.
/// "1.5h" -> (1.5, "h"), "30" -> (30.0, ""), "hour" -> None.
/// A range like "20-30" keeps only the lower bound.
fn split_number_and_unit(token: &str) -> Option<(f64, &str)> {
    let end = token
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '/')
        .unwrap_or(token.len());
    if end == 0 {
        return None;
    }
    let number = parse_number(&token[..end])?;
    let rest = &token[end..];
    let rest = rest.strip_prefix('-').map(strip_range_tail).unwrap_or(rest);
    Some((number, rest))
}

/// Drop the upper bound of a range suffix ("30" in "20-30min" keeps "min").
fn strip_range_tail(rest: &str) -> &str {
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    &rest[end..]
}

/// Handles "1h30m" style tokens where digits and units alternate.
/// A range segment ("20-30min") keeps only its lower bound.
fn parse_compact_segments(token: &str) -> f64 {
    let mut total = 0f64;
    let mut number = String::new();
    let mut range_low: Option<String> = None;
    let mut unit = String::new();

    let mut flush = |number: &mut String,
                     unit: &mut String,
                     range_low: &mut Option<String>,
                     total: &mut f64| {
        let effective = range_low.take().unwrap_or_else(|| number.clone());
        if !effective.is_empty() {
            if let (Some(value), Some(minutes)) =
                (parse_number(&effective), unit_to_minutes(unit))
            {
                *total += value * minutes;
            }
        }
        number.clear();
        unit.clear();
    };

    for c in token.chars() {
        if c.is_ascii_digit() || c == '.' || c == '/' {
            if !unit.is_empty() {
                flush(&mut number, &mut unit, &mut range_low, &mut total);
            }
            number.push(c);
        } else if c.is_alphabetic() {
            unit.push(c.to_ascii_lowercase());
        } else if c == '-' && !number.is_empty() && unit.is_empty() {
            range_low = Some(number.clone());
            number.clear();
        }
    }
    flush(&mut number, &mut unit, &mut range_low, &mut total);
    total
}

/// Plain or fractional number: "30", "1.5", "1/2".
fn parse_number(text: &str) -> Option<f64> {
    if let Some((num, den)) = text.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    text.parse().ok()
}

fn unit_to_minutes(unit: &str) -> Option<f64> {
    match unit.trim_end_matches('.').to_lowercase().as_str() {
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(60.0),
        "m" | "min" | "mins" | "minute" | "minutes" | "" => Some(1.0),
        "d" | "day" | "days" => Some(24.0 * 60.0),
        _ => None,
    }
}
