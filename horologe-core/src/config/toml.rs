//! Simple TOML parser for the clock configuration file
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `clock.toml`. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - Key = value pairs (integer, boolean)
//! - A single `[clock]` section
//! - Comments (# ...), whole-line or trailing
//!
//! NOT supported:
//! - Strings, arrays, tables other than `[clock]`
//! - Dotted keys

use super::settings::{ClockSettings, SettingsError};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or does not parse
    InvalidValue,
    /// Key not known in this section
    UnknownKey,
    /// Value parsed but is out of range
    Settings(SettingsError),
}

impl From<SettingsError> for ParseError {
    fn from(e: SettingsError) -> Self {
        ParseError::Settings(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Clock,
}

/// Parse `clock.toml` into settings
///
/// Keys that are absent keep their factory default.
pub fn parse_settings(input: &str) -> Result<ClockSettings, ParseError> {
    let mut settings = ClockSettings::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        match section {
            Section::Root => return Err(ParseError::UnknownKey),
            Section::Clock => apply_value(&mut settings, key, value)?,
        }
    }

    settings.validate()?;
    Ok(settings)
}

/// Parse a `[name]` header, ignoring a trailing comment
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let line = strip_comment(line);
    let name = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?
        .trim();

    match name {
        "clock" => Ok(Section::Clock),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(settings: &mut ClockSettings, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "steps_per_minute" => settings.set_steps_per_minute(parse_int(value)?)?,
        "delay_time" => settings.set_delay_time(parse_int(value)?)?,
        "flip_rotation" => settings.flip_rotation = parse_bool(value)?,
        "allow_backward" => settings.allow_backward = parse_bool(value)?,
        "chime" => settings.chime = parse_bool(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Split `key = value`, dropping any trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(&line[eq_pos + 1..]);

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn strip_comment(s: &str) -> &str {
    match s.find('#') {
        Some(pos) => s[..pos].trim(),
        None => s.trim(),
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let input = r#"
# Hollow clock defaults
[clock]
steps_per_minute = 512   # finer gearing
delay_time = 3
flip_rotation = true
allow_backward = true
chime = false
"#;
        let settings = parse_settings(input).unwrap();
        assert_eq!(settings.steps_per_minute, 512);
        assert_eq!(settings.delay_time, 3);
        assert!(settings.flip_rotation);
        assert!(settings.allow_backward);
        assert!(!settings.chime);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let settings = parse_settings("[clock]\nchime = false\n").unwrap();
        assert_eq!(settings.steps_per_minute, 256);
        assert_eq!(settings.delay_time, 2);
        assert!(!settings.chime);

        assert_eq!(parse_settings("").unwrap(), ClockSettings::new());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            parse_settings("[clock]\nsteps_per_minute = 2000\n"),
            Err(ParseError::Settings(SettingsError::StepsPerMinuteOutOfRange))
        );
        assert_eq!(
            parse_settings("[clock]\ndelay_time = 1\n"),
            Err(ParseError::Settings(SettingsError::DelayTimeTooShort))
        );
    }

    #[test]
    fn test_bad_values_rejected() {
        assert_eq!(
            parse_settings("[clock]\nchime = yes\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_settings("[clock]\ndelay_time = -2\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_settings("[clock]\nsteps_per_minute\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_unknown_keys_and_sections() {
        assert_eq!(
            parse_settings("[clock]\ntimezone = 1\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(parse_settings("chime = true\n"), Err(ParseError::UnknownKey));
        assert_eq!(parse_settings("[wifi]\n"), Err(ParseError::InvalidSection));
        assert_eq!(parse_settings("[clock\n"), Err(ParseError::InvalidSection));
    }
}
