use anyhow::{bail, ensure, Context, Result};
use musicbox_core::Key;
use serde::Serialize;

/// Hold time for presses that don't give one
pub const DEFAULT_HOLD_MS: u64 = 100;

/// Gap left after the previous press when a press has no start time
pub const DEFAULT_GAP_MS: u64 = 200;

/// Virtual time left running after the last key is released
pub const TAIL_MS: u64 = 1_000;

/// Latest virtual time, in ms, whose µs count still fits in a `u64`
pub const MAX_MS: u64 = u64::MAX / 1_000;

/// One key held down on the virtual keypad from `at_ms` for `hold_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Press {
    pub key: Key,
    pub at_ms: u64,
    pub hold_ms: u64,
}

impl Press {
    pub fn end_ms(&self) -> u64 {
        self.at_ms + self.hold_ms
    }

    /// Whether the key is down at virtual time `now_us`
    pub fn is_held_at(&self, now_us: u64) -> bool {
        (self.at_ms * 1_000..self.end_ms() * 1_000).contains(&now_us)
    }
}

/// Key presses to feed the simulated keypad, ordered by start time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressScript {
    presses: Vec<Press>,
}

impl PressScript {
    pub fn new(mut presses: Vec<Press>) -> Result<Self> {
        ensure!(!presses.is_empty(), "key script has no presses");

        for press in &presses {
            ensure!(
                press.hold_ms > 0,
                "press of `{}` at {}ms is held for 0ms",
                press.key.symbol(),
                press.at_ms
            );
            ensure!(
                press
                    .at_ms
                    .checked_add(press.hold_ms)
                    .is_some_and(|end_ms| end_ms <= MAX_MS),
                "press of `{}` at {}ms held for {}ms ends past {}ms",
                press.key.symbol(),
                press.at_ms,
                press.hold_ms,
                MAX_MS
            );
        }

        presses.sort_by_key(|press| press.at_ms);
        Ok(Self { presses })
    }

    /// Parses the `--keys` shorthand.
    ///
    /// Presses are separated by whitespace or commas. Each one is a key symbol,
    /// optionally followed by `@<start ms>` and then `+<hold ms>`, e.g.
    /// `"B *@1500+50"`. A press without a start time begins
    /// [`DEFAULT_GAP_MS`] after the previous one was released.
    pub fn parse(script: &str) -> Result<Self> {
        let mut presses = Vec::new();
        let mut next_ms = 0;

        for token in script
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
        {
            let press = parse_press(token, next_ms)?;
            next_ms = press
                .at_ms
                .saturating_add(press.hold_ms)
                .saturating_add(DEFAULT_GAP_MS);
            presses.push(press);
        }

        Self::new(presses)
    }

    pub fn presses(&self) -> &[Press] {
        &self.presses
    }

    /// Time the last press is released
    pub fn end_ms(&self) -> u64 {
        self.presses.iter().map(Press::end_ms).max().unwrap_or(0)
    }

    /// How long to run for: `requested`, or [`TAIL_MS`] past the last release
    pub fn run_length_ms(&self, requested: Option<u64>) -> Result<u64> {
        let until_ms = requested.unwrap_or(self.end_ms().saturating_add(TAIL_MS));

        ensure!(
            until_ms.checked_mul(1_000).is_some(),
            "run length of {}ms is past {}ms",
            until_ms,
            MAX_MS
        );

        Ok(until_ms)
    }
}

/// Looks a key up by its printed symbol
pub fn parse_key(symbol: &str) -> Result<Key> {
    let mut chars = symbol.chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) => match Key::from_symbol(c) {
            Some(key) => Ok(key),
            None => bail!("unknown key `{}`", symbol),
        },
        _ => bail!("unknown key `{}`", symbol),
    }
}

fn parse_press(token: &str, default_at_ms: u64) -> Result<Press> {
    let Some(symbol) = token.chars().next() else {
        bail!("empty press");
    };

    let rest = &token[symbol.len_utf8()..];

    let key = Key::from_symbol(symbol)
        .with_context(|| format!("unknown key `{}` in press `{}`", symbol, token))?;

    let (at, hold) = match rest.split_once('+') {
        Some((at, hold)) => (at, Some(hold)),
        None => (rest, None),
    };

    let at_ms = match at {
        "" => default_at_ms,
        at => match at.strip_prefix('@') {
            Some(ms) => ms
                .parse()
                .with_context(|| format!("bad start time `{}` in press `{}`", ms, token))?,
            None => bail!("expected `@<ms>` or `+<ms>` after the key in press `{}`", token),
        },
    };

    let hold_ms = match hold {
        Some(ms) => ms
            .parse()
            .with_context(|| format!("bad hold time `{}` in press `{}`", ms, token))?,
        None => DEFAULT_HOLD_MS,
    };

    Ok(Press {
        key,
        at_ms,
        hold_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_keys_are_spaced_out() {
        let script = PressScript::parse("B 3 *").unwrap();

        assert_eq!(
            script.presses(),
            [
                Press {
                    key: Key::B,
                    at_ms: 0,
                    hold_ms: 100
                },
                Press {
                    key: Key::Three,
                    at_ms: 300,
                    hold_ms: 100
                },
                Press {
                    key: Key::Star,
                    at_ms: 600,
                    hold_ms: 100
                },
            ]
        );
        assert_eq!(script.end_ms(), 700);
    }

    #[test]
    fn explicit_times_and_holds() {
        let script = PressScript::parse("*@2500+40, #@10,a+1000").unwrap();

        assert_eq!(
            script.presses(),
            [
                Press {
                    key: Key::Hash,
                    at_ms: 10,
                    hold_ms: 100
                },
                Press {
                    key: Key::A,
                    at_ms: 310,
                    hold_ms: 1000
                },
                Press {
                    key: Key::Star,
                    at_ms: 2500,
                    hold_ms: 40
                },
            ]
        );
    }

    #[test]
    fn held_window_is_half_open() {
        let press = Press {
            key: Key::One,
            at_ms: 5,
            hold_ms: 10,
        };

        assert!(!press.is_held_at(4_999));
        assert!(press.is_held_at(5_000));
        assert!(press.is_held_at(14_999));
        assert!(!press.is_held_at(15_000));
    }

    #[test]
    fn errors_name_the_bad_token() {
        let err = PressScript::parse("1 x@5").unwrap_err();
        assert!(format!("{err:#}").contains("`x@5`"), "{err:#}");

        let err = PressScript::parse("*@soon").unwrap_err();
        assert!(format!("{err:#}").contains("`soon`"), "{err:#}");

        let err = PressScript::parse("*5").unwrap_err();
        assert!(format!("{err:#}").contains("`*5`"), "{err:#}");
    }

    #[test]
    fn empty_scripts_and_zero_holds_are_rejected() {
        assert!(PressScript::parse("").is_err());
        assert!(PressScript::parse(" , ").is_err());
        assert!(PressScript::parse("*+0").is_err());
    }

    #[test]
    fn times_past_the_virtual_clock_are_rejected() {
        let err = PressScript::parse(&format!("*@{}", u64::MAX)).unwrap_err();
        assert!(format!("{err:#}").contains("ends past"), "{err:#}");

        assert!(PressScript::parse(&format!("*@{}", MAX_MS)).is_err());
        assert!(PressScript::parse(&format!("*@0+{}", MAX_MS)).is_ok());

        // The default start of a following press saturates instead of wrapping
        assert!(PressScript::parse(&format!("*@{} 1", MAX_MS - 100)).is_err());
    }

    #[test]
    fn run_length_defaults_past_the_last_release() {
        let script = PressScript::parse("B@0+100 *@500+50").unwrap();

        assert_eq!(script.run_length_ms(None).unwrap(), 550 + TAIL_MS);
        assert_eq!(script.run_length_ms(Some(20)).unwrap(), 20);
        assert_eq!(script.run_length_ms(Some(MAX_MS)).unwrap(), MAX_MS);

        let err = script.run_length_ms(Some(MAX_MS + 1)).unwrap_err();
        assert!(err.to_string().contains("run length"), "{err}");
    }

    #[test]
    fn single_symbols_parse() {
        assert_eq!(parse_key("#").unwrap(), Key::Hash);
        assert_eq!(parse_key("d").unwrap(), Key::D);
        assert!(parse_key("10").is_err());
        assert!(parse_key("").is_err());
    }
}
