//! Clock settings
//!
//! Read once at start-up. Validation happens here, at the configuration
//! boundary; everything downstream trusts the values. Changes made at run
//! time are stored and take effect on the next start.

use serde::{Deserialize, Serialize};

use crate::motion::{
    Dial, MotionProfile, MAX_STEPS_PER_MINUTE, MIN_DELAY_TIME_MS, MIN_STEPS_PER_MINUTE,
};

/// Default steps per dial minute (28BYJ-48 through the hollow clock gearing)
pub const DEFAULT_STEPS_PER_MINUTE: u16 = 256;

/// Default cruising delay between steps in ms
pub const DEFAULT_DELAY_TIME_MS: u8 = 2;

/// Maximum serialized settings size
pub const MAX_SETTINGS_SIZE: usize = 32;

/// Rejected setting values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Steps per minute outside 1-1024
    StepsPerMinuteOutOfRange,
    /// Step delay below the motor's minimum
    DelayTimeTooShort,
}

impl SettingsError {
    /// Reply text for the console
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsError::StepsPerMinuteOutOfRange => "steps_per_minute must be 1-1024",
            SettingsError::DelayTimeTooShort => "delay_time must be at least 2",
        }
    }
}

/// A single setting change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingChange {
    StepsPerMinute(u16),
    DelayTime(u8),
    FlipRotation(bool),
    AllowBackward(bool),
    Chime(bool),
}

/// Persisted clock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSettings {
    /// Steps per dial minute
    pub steps_per_minute: u16,
    /// Cruising delay between steps in ms
    pub delay_time: u8,
    /// Mirror the coil line order (motor mounted the other way)
    pub flip_rotation: bool,
    /// Allow the hands to move backward
    pub allow_backward: bool,
    /// Sound the hourly chime
    pub chime: bool,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSettings {
    /// Factory defaults
    pub const fn new() -> Self {
        Self {
            steps_per_minute: DEFAULT_STEPS_PER_MINUTE,
            delay_time: DEFAULT_DELAY_TIME_MS,
            flip_rotation: false,
            allow_backward: false,
            chime: true,
        }
    }

    /// Check every field against its valid range
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_steps_per_minute(self.steps_per_minute)?;
        check_delay_time(self.delay_time)?;
        Ok(())
    }

    /// Set steps per minute, leaving the old value on error
    pub fn set_steps_per_minute(&mut self, steps_per_minute: u16) -> Result<(), SettingsError> {
        check_steps_per_minute(steps_per_minute)?;
        self.steps_per_minute = steps_per_minute;
        Ok(())
    }

    /// Set the cruising step delay, leaving the old value on error
    pub fn set_delay_time(&mut self, delay_time: u8) -> Result<(), SettingsError> {
        check_delay_time(delay_time)?;
        self.delay_time = delay_time;
        Ok(())
    }

    /// Apply one change, leaving every value as it was on error
    pub fn apply(&mut self, change: SettingChange) -> Result<(), SettingsError> {
        match change {
            SettingChange::StepsPerMinute(value) => self.set_steps_per_minute(value)?,
            SettingChange::DelayTime(value) => self.set_delay_time(value)?,
            SettingChange::FlipRotation(value) => self.flip_rotation = value,
            SettingChange::AllowBackward(value) => self.allow_backward = value,
            SettingChange::Chime(value) => self.chime = value,
        }
        Ok(())
    }

    /// Dial geometry for these settings
    pub fn dial(&self) -> Dial {
        Dial::new(self.steps_per_minute)
    }

    /// Profile for normal tracking moves
    pub fn normal_profile(&self) -> MotionProfile {
        MotionProfile::normal(self.delay_time, self.flip_rotation)
    }

    /// Profile for catch-up moves
    pub fn fast_profile(&self) -> MotionProfile {
        MotionProfile::fastest(self.flip_rotation)
    }
}

fn check_steps_per_minute(value: u16) -> Result<(), SettingsError> {
    if (MIN_STEPS_PER_MINUTE..=MAX_STEPS_PER_MINUTE).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::StepsPerMinuteOutOfRange)
    }
}

fn check_delay_time(value: u8) -> Result<(), SettingsError> {
    if value >= MIN_DELAY_TIME_MS {
        Ok(())
    } else {
        Err(SettingsError::DelayTimeTooShort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ClockSettings::default();
        assert_eq!(settings.steps_per_minute, 256);
        assert_eq!(settings.delay_time, 2);
        assert!(settings.chime);
        assert!(!settings.allow_backward);
        assert!(settings.validate().is_ok());
        assert_eq!(settings.dial().max_position(), 184_320);
    }

    #[test]
    fn test_rejected_setter_keeps_value() {
        let mut settings = ClockSettings::new();
        assert_eq!(
            settings.set_steps_per_minute(0),
            Err(SettingsError::StepsPerMinuteOutOfRange)
        );
        assert_eq!(
            settings.set_steps_per_minute(1025),
            Err(SettingsError::StepsPerMinuteOutOfRange)
        );
        assert_eq!(settings.steps_per_minute, 256);

        assert_eq!(settings.set_delay_time(1), Err(SettingsError::DelayTimeTooShort));
        assert_eq!(settings.delay_time, 2);

        assert!(settings.set_steps_per_minute(1024).is_ok());
        assert!(settings.set_delay_time(5).is_ok());
        assert_eq!(settings.steps_per_minute, 1024);
        assert_eq!(settings.delay_time, 5);
    }

    #[test]
    fn test_apply_changes() {
        let mut settings = ClockSettings::new();
        settings.apply(SettingChange::StepsPerMinute(128)).unwrap();
        settings.apply(SettingChange::DelayTime(4)).unwrap();
        settings.apply(SettingChange::AllowBackward(true)).unwrap();
        settings.apply(SettingChange::Chime(false)).unwrap();
        settings.apply(SettingChange::FlipRotation(true)).unwrap();
        assert_eq!(
            settings,
            ClockSettings {
                steps_per_minute: 128,
                delay_time: 4,
                flip_rotation: true,
                allow_backward: true,
                chime: false,
            }
        );
    }

    #[test]
    fn test_apply_rejects_and_keeps_settings() {
        let mut settings = ClockSettings::new();
        assert_eq!(
            settings.apply(SettingChange::StepsPerMinute(2000)),
            Err(SettingsError::StepsPerMinuteOutOfRange)
        );
        assert_eq!(
            settings.apply(SettingChange::DelayTime(0)),
            Err(SettingsError::DelayTimeTooShort)
        );
        assert_eq!(settings, ClockSettings::new());
    }

    #[test]
    fn test_worst_case_fits_buffer() {
        let settings = ClockSettings {
            steps_per_minute: u16::MAX,
            delay_time: u8::MAX,
            flip_rotation: true,
            allow_backward: true,
            chime: true,
        };
        let mut buf = [0u8; MAX_SETTINGS_SIZE];
        assert!(postcard::to_slice(&settings, &mut buf).is_ok());
    }

    #[test]
    fn test_validate_catches_bad_fields() {
        let settings = ClockSettings {
            delay_time: 0,
            ..ClockSettings::new()
        };
        assert_eq!(settings.validate(), Err(SettingsError::DelayTimeTooShort));
    }

    #[test]
    fn test_postcard_round_trip() {
        let settings = ClockSettings {
            steps_per_minute: 512,
            flip_rotation: true,
            ..ClockSettings::new()
        };
        let mut buf = [0u8; MAX_SETTINGS_SIZE];
        let bytes = postcard::to_slice(&settings, &mut buf).unwrap();
        let decoded: ClockSettings = postcard::from_bytes(bytes).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_profiles_carry_flip() {
        let settings = ClockSettings {
            flip_rotation: true,
            ..ClockSettings::new()
        };
        assert!(settings.normal_profile().flip_rotation);
        assert!(settings.fast_profile().is_fastest());
    }
}
