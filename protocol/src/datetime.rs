//! Date and time of the controller's clock.

use core::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Error returned for invalid dates and times.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct InvalidDateTime;

impl Display for InvalidDateTime {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "invalid date or time")
    }
}

impl core::error::Error for InvalidDateTime {}

/// Date and time with second resolution.
///
/// The controller only stores two-digit years, so the year is
/// limited to 2000 up to and including 2099.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// Constructs a new date and time.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, InvalidDateTime> {
        if !(2000..=2099).contains(&year)
            || !(1..=12).contains(&month)
            || day == 0
            || day > days_in_month(year, month)
            || hour > 23
            || minute > 59
            || second > 59
        {
            return Err(InvalidDateTime);
        }

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Parses the controller's `DD.MM.YY` and `HH:MM:SS` representations.
    pub fn from_device(date: &str, time: &str) -> Result<Self, InvalidDateTime> {
        let [day, month, year] = split3(date, '.')?;
        let [hour, minute, second] = split3(time, ':')?;

        Self::new(2000 + u16::from(year), month, day, hour, minute, second)
    }

    /// Returns the date in the controller's `DD.MM.YY` representation.
    #[must_use]
    pub fn device_date(&self) -> DeviceDate {
        DeviceDate(*self)
    }

    /// Returns the time in the controller's `HH:MM:SS` representation.
    #[must_use]
    pub fn device_time(&self) -> DeviceTime {
        DeviceTime(*self)
    }

    /// Returns the ISO 8601 weekday (1 = Monday, 7 = Sunday).
    #[must_use]
    pub fn weekday(&self) -> u8 {
        // Sakamoto's method, yields 0 for Sunday
        const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];

        let year = if self.month < 3 { self.year - 1 } else { self.year };
        let day = (year + year / 4 - year / 100
            + year / 400
            + OFFSETS[usize::from(self.month - 1)]
            + u16::from(self.day))
            % 7;

        // Always less than 7
        if day == 0 { 7 } else { day as u8 }
    }

    /// Returns the year.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Returns the month (1-12).
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Returns the day of the month.
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Returns the hour.
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Returns the minute.
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns the second.
    #[must_use]
    pub const fn second(&self) -> u8 {
        self.second
    }
}

/// Parses the ISO 8601 representation `YYYY-MM-DDTHH:MM:SS`.
impl FromStr for DateTime {
    type Err = InvalidDateTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, time) = s.split_once(['T', ' ']).ok_or(InvalidDateTime)?;
        let (year, rest) = date.split_once('-').ok_or(InvalidDateTime)?;
        let [month, day] = split2(rest, '-')?;
        let [hour, minute, second] = split3(time, ':')?;

        Self::new(
            year.parse().map_err(|_| InvalidDateTime)?,
            month,
            day,
            hour,
            minute,
            second,
        )
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Date formatted as `DD.MM.YY`.
#[derive(Debug)]
pub struct DeviceDate(DateTime);

impl Display for DeviceDate {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "{:02}.{:02}.{:02}", self.0.day, self.0.month, self.0.year % 100)
    }
}

/// Time formatted as `HH:MM:SS`.
#[derive(Debug)]
pub struct DeviceTime(DateTime);

impl Display for DeviceTime {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.0.hour, self.0.minute, self.0.second)
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn parse_field(s: &str) -> Result<u8, InvalidDateTime> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidDateTime);
    }

    s.parse().map_err(|_| InvalidDateTime)
}

fn split2(s: &str, sep: char) -> Result<[u8; 2], InvalidDateTime> {
    let (a, b) = s.split_once(sep).ok_or(InvalidDateTime)?;

    Ok([parse_field(a)?, parse_field(b)?])
}

fn split3(s: &str, sep: char) -> Result<[u8; 3], InvalidDateTime> {
    let (a, rest) = s.split_once(sep).ok_or(InvalidDateTime)?;
    let [b, c] = split2(rest, sep)?;

    Ok([parse_field(a)?, b, c])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn parse_device_format() {
        let dt = DateTime::from_device("26.11.15", "21:28:57").unwrap();

        assert_eq!(dt, DateTime::new(2015, 11, 26, 21, 28, 57).unwrap());
        assert_eq!(dt.device_date().to_string(), "26.11.15");
        assert_eq!(dt.device_time().to_string(), "21:28:57");
        assert_eq!(dt.to_string(), "2015-11-26T21:28:57");
    }

    #[test]
    fn reject_invalid() {
        assert_eq!(DateTime::from_device("31.04.15", "00:00:00"), Err(InvalidDateTime));
        assert_eq!(DateTime::from_device("29.02.15", "00:00:00"), Err(InvalidDateTime));
        assert!(DateTime::from_device("29.02.16", "00:00:00").is_ok(), "leap day should be valid");
        assert_eq!(DateTime::from_device("01.01.15", "24:00:00"), Err(InvalidDateTime));
        assert_eq!(DateTime::from_device("1.1.15", "00:00:00"), Err(InvalidDateTime));
        assert_eq!(DateTime::new(1999, 1, 1, 0, 0, 0), Err(InvalidDateTime));
    }

    #[test]
    fn parse_iso_format() {
        assert_eq!(
            "2024-03-01T06:05:04".parse::<DateTime>(),
            DateTime::new(2024, 3, 1, 6, 5, 4),
            "ISO date should be parsed"
        );
        assert_eq!("2024-03-01 06:05:04".parse::<DateTime>(), DateTime::new(2024, 3, 1, 6, 5, 4));
        assert_eq!("2024-03-01".parse::<DateTime>(), Err(InvalidDateTime));
    }

    #[test]
    fn weekdays() {
        // Thursday
        assert_eq!(DateTime::new(2015, 11, 26, 0, 0, 0).unwrap().weekday(), 4);
        // Sunday
        assert_eq!(DateTime::new(2000, 1, 2, 0, 0, 0).unwrap().weekday(), 7);
        // Monday
        assert_eq!(DateTime::new(2024, 1, 1, 0, 0, 0).unwrap().weekday(), 1);
        // Thursday, leap day
        assert_eq!(DateTime::new(2024, 2, 29, 0, 0, 0).unwrap().weekday(), 4);
    }
}
