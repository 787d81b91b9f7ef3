//! Line-oriented control console
//!
//! One command per line, words separated by spaces:
//!
//! ```text
//! start            resume time-based movement
//! stop             pause time-based movement
//! step <n>         jog the hands by n steps (|n| <= 10000)
//! set <h> <m>      the hands currently read h:m (h 0-11)
//! time <h> <m>     set the wall clock to h:m (h 0-23)
//! status           print time, hands and state
//! save             write a position checkpoint
//! config           print the stored settings
//! config <k> <v>   store a setting, applied on the next start
//! reset            erase settings and checkpoint from flash
//! help             list the commands
//! ```
//!
//! Setting keys match `clock.toml`: `steps_per_minute`, `delay_time`,
//! `flip_rotation`, `allow_backward` and `chime`. Flags take `true`/`false`,
//! `on`/`off` or `1`/`0`.

use core::str::SplitWhitespace;

use crate::config::SettingChange;

/// Largest jog accepted from the console
pub const MAX_JOG_STEPS: i32 = 10_000;

/// Longest accepted input line
pub const MAX_LINE_LEN: usize = 32;

/// Help text printed by `help`
pub const HELP: &str =
    "start | stop | step <n> | set <h> <m> | time <h> <m> | status | save | config [<k> <v>] | reset";

/// A parsed console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleCommand {
    Start,
    Stop,
    Step(i32),
    /// Calibrate: the hands read `hour:minute`
    SetHands { hour: u8, minute: u8 },
    /// Set the wall clock (24-hour)
    SetTime { hour: u8, minute: u8 },
    Status,
    Save,
    /// Print the stored settings
    ShowConfig,
    /// Store one setting
    SetConfig(SettingChange),
    /// Erase flash back to factory state
    Reset,
    Help,
}

/// Why a console line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleError {
    /// Blank line
    Empty,
    /// First word is not a command
    UnknownCommand,
    /// No such setting
    UnknownSetting,
    /// Too few arguments
    MissingArgument,
    /// Argument is not a number, or extra words follow
    InvalidArgument,
    /// Number outside the accepted range
    OutOfRange,
}

impl ConsoleError {
    /// Reply text for the console
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleError::Empty => "",
            ConsoleError::UnknownCommand => "unknown command (try help)",
            ConsoleError::UnknownSetting => "unknown setting",
            ConsoleError::MissingArgument => "missing argument",
            ConsoleError::InvalidArgument => "invalid argument",
            ConsoleError::OutOfRange => "out of range",
        }
    }
}

/// Parse one console line
pub fn parse_line(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let mut words = line.split_whitespace();
    let command = match words.next().ok_or(ConsoleError::Empty)? {
        "start" => ConsoleCommand::Start,
        "stop" => ConsoleCommand::Stop,
        "step" => {
            let steps: i32 = next_number(&mut words)?;
            if !(-MAX_JOG_STEPS..=MAX_JOG_STEPS).contains(&steps) {
                return Err(ConsoleError::OutOfRange);
            }
            ConsoleCommand::Step(steps)
        }
        "set" => {
            let (hour, minute) = hour_minute(&mut words, 12)?;
            ConsoleCommand::SetHands { hour, minute }
        }
        "time" => {
            let (hour, minute) = hour_minute(&mut words, 24)?;
            ConsoleCommand::SetTime { hour, minute }
        }
        "status" => ConsoleCommand::Status,
        "save" => ConsoleCommand::Save,
        "config" => match words.next() {
            None => ConsoleCommand::ShowConfig,
            Some(key) => ConsoleCommand::SetConfig(setting_change(key, &mut words)?),
        },
        "reset" => ConsoleCommand::Reset,
        "help" | "?" => ConsoleCommand::Help,
        _ => return Err(ConsoleError::UnknownCommand),
    };

    if words.next().is_some() {
        return Err(ConsoleError::InvalidArgument);
    }
    Ok(command)
}

fn next_number<T: core::str::FromStr>(words: &mut SplitWhitespace<'_>) -> Result<T, ConsoleError> {
    words
        .next()
        .ok_or(ConsoleError::MissingArgument)?
        .parse()
        .map_err(|_| ConsoleError::InvalidArgument)
}

/// Range checks are left to [`ClockSettings::apply`](crate::config::ClockSettings::apply)
fn setting_change(
    key: &str,
    words: &mut SplitWhitespace<'_>,
) -> Result<SettingChange, ConsoleError> {
    let change = match key {
        "steps_per_minute" => SettingChange::StepsPerMinute(next_number(words)?),
        "delay_time" => SettingChange::DelayTime(next_number(words)?),
        "flip_rotation" => SettingChange::FlipRotation(next_flag(words)?),
        "allow_backward" => SettingChange::AllowBackward(next_flag(words)?),
        "chime" => SettingChange::Chime(next_flag(words)?),
        _ => return Err(ConsoleError::UnknownSetting),
    };
    Ok(change)
}

fn next_flag(words: &mut SplitWhitespace<'_>) -> Result<bool, ConsoleError> {
    match words.next().ok_or(ConsoleError::MissingArgument)? {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(ConsoleError::InvalidArgument),
    }
}

fn hour_minute(words: &mut SplitWhitespace<'_>, hours: u8) -> Result<(u8, u8), ConsoleError> {
    let hour: u8 = next_number(words)?;
    let minute: u8 = next_number(words)?;
    if hour >= hours || minute >= 60 {
        return Err(ConsoleError::OutOfRange);
    }
    Ok((hour, minute))
}
