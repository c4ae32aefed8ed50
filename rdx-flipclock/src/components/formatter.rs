//! Turns a time of day into the symbols the clock should display.

use crate::common::{Symbol, SymbolSequence};
use crate::config::ClockConfiguration;
use chrono::Timelike;

/// Computes the display symbols for `now` under `config`.
///
/// The layout is `HH<sep>MM`, optionally followed by `<sep>SS`, optionally
/// followed by ` AM`/` PM`. In 12-hour mode a leading zero in the hour is
/// dropped entirely, so the sequence is one symbol shorter before 10 o'clock.
///
/// `now` is expected to already include the animation lead time.
pub fn compute_symbols<T: Timelike>(now: &T, config: &ClockConfiguration) -> SymbolSequence {
    let hour24 = now.hour();
    let is_pm = hour24 >= 12;
    let hour = if config.use_12_hour {
        twelve_hour(hour24)
    } else {
        hour24
    };
    let sep = config.separator;

    let mut symbols = Vec::with_capacity(11);
    push_pair(&mut symbols, hour);
    symbols.push(sep);
    push_pair(&mut symbols, now.minute());

    if config.show_seconds {
        symbols.push(sep);
        push_pair(&mut symbols, now.second());
    }

    if config.use_12_hour {
        symbols.extend([' ', if is_pm { 'P' } else { 'A' }, 'M']);
        if hour < 10 {
            symbols.remove(0);
        }
    }

    symbols
}

/// Maps an hour of the day onto 1..=12, where midnight and noon are both 12.
fn twelve_hour(hour24: u32) -> u32 {
    match hour24 % 12 {
        0 => 12,
        h => h,
    }
}

fn push_pair(symbols: &mut Vec<Symbol>, value: u32) {
    symbols.push(digit(value / 10));
    symbols.push(digit(value % 10));
}

fn digit(value: u32) -> Symbol {
    char::from_digit(value % 10, 10).unwrap_or('0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn config(use_12_hour: bool, show_seconds: bool) -> ClockConfiguration {
        ClockConfiguration {
            use_12_hour,
            show_seconds,
            ..ClockConfiguration::default()
        }
    }

    fn text(symbols: &[Symbol]) -> String {
        symbols.iter().collect()
    }

    #[test]
    fn twenty_four_hour_without_seconds_is_five_symbols() {
        for hour in 0..24 {
            let symbols = compute_symbols(&at(hour, 37, 12), &config(false, false));
            assert_eq!(symbols.len(), 5, "hour {hour}");
            assert_eq!(symbols[2], ':');
        }
        assert_eq!(
            compute_symbols(&at(0, 7, 0), &config(false, false)),
            ['0', '0', ':', '0', '7']
        );
    }

    #[test]
    fn seconds_append_separator_and_pair() {
        let without = compute_symbols(&at(14, 3, 59), &config(false, false));
        let with = compute_symbols(&at(14, 3, 59), &config(false, true));
        assert_eq!(with.len(), without.len() + 3);
        assert_eq!(&with[5..], [':', '5', '9']);
    }

    #[test]
    fn end_to_end_twenty_four_hour_with_seconds() {
        let config = ClockConfiguration {
            use_12_hour: false,
            show_seconds: true,
            separator: ':',
            transition_duration: std::time::Duration::from_millis(400),
        };
        assert_eq!(
            compute_symbols(&at(9, 5, 7), &config),
            ['0', '9', ':', '0', '5', ':', '0', '7']
        );
    }

    #[test]
    fn end_to_end_twelve_hour_drops_leading_zero() {
        assert_eq!(
            compute_symbols(&at(21, 5, 0), &config(true, false)),
            ['9', ':', '0', '5', ' ', 'P', 'M']
        );
    }

    #[test]
    fn midnight_and_noon_are_twelve() {
        assert_eq!(text(&compute_symbols(&at(0, 0, 0), &config(true, false))), "12:00 AM");
        assert_eq!(text(&compute_symbols(&at(12, 0, 0), &config(true, false))), "12:00 PM");
    }

    #[test]
    fn afternoon_hours_wrap_and_shrink() {
        let symbols = compute_symbols(&at(13, 0, 0), &config(true, false));
        assert_eq!(text(&symbols), "1:00 PM");
        assert_eq!(symbols.len(), 7);

        let symbols = compute_symbols(&at(9, 30, 0), &config(true, false));
        assert_eq!(text(&symbols), "9:30 AM");
        assert_eq!(symbols.len(), 7);

        let symbols = compute_symbols(&at(22, 30, 0), &config(true, false));
        assert_eq!(text(&symbols), "10:30 PM");
        assert_eq!(symbols.len(), 8);
    }

    #[test]
    fn twelve_hour_with_seconds_lengths() {
        assert_eq!(compute_symbols(&at(9, 59, 59), &config(true, true)).len(), 10);
        assert_eq!(compute_symbols(&at(10, 0, 0), &config(true, true)).len(), 11);
    }

    #[test]
    fn custom_separator_is_used_everywhere() {
        let config = ClockConfiguration {
            separator: '.',
            ..config(false, true)
        };
        assert_eq!(text(&compute_symbols(&at(23, 59, 1), &config)), "23.59.01");
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let config = config(true, true);
        let first = compute_symbols(&at(17, 42, 9), &config);
        let second = compute_symbols(&at(17, 42, 9), &config);
        assert_eq!(first, second);
    }
}
