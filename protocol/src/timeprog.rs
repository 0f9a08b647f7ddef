//! Weekly time programs.
//!
//! A time program (e.g. for hot water or the heating circuit) consists of a
//! fixed grid of `number_of_days × entries_a_day` slots. Each slot holds an
//! optional [`TimeProgEntry`] assigning a state to a period of the day.

use alloc::{string::String, vec, vec::Vec};
use core::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Error type for time program operations.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Error {
    /// The time is invalid, e.g. `24:30`.
    InvalidTime(u8, u8),
    /// The start of a period lies after its end.
    StartAfterEnd,
    /// The string doesn't represent a time of day.
    InvalidFormat,
    /// The state is not supported by the time program.
    InvalidState {
        /// Rejected state.
        state: u8,
        /// Number of states supported by the time program.
        number_of_states: u8,
    },
    /// The minute is not a multiple of the time program's step size.
    MisalignedTime {
        /// Rejected minute.
        minute: u8,
        /// Step size of the time program in minutes.
        step_size: u8,
    },
    /// The slot lies outside of the time program's grid.
    OutOfBounds {
        /// Requested day.
        day: usize,
        /// Requested entry of the day.
        num: usize,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            Self::InvalidTime(hour, minute) => write!(f, "invalid time {hour:02}:{minute:02}"),
            Self::StartAfterEnd => write!(f, "start of period after its end"),
            Self::InvalidFormat => write!(f, "invalid time format"),
            Self::InvalidState {
                state,
                number_of_states,
            } => write!(f, "state {state} out of range [0, {number_of_states})"),
            Self::MisalignedTime { minute, step_size } => {
                write!(f, "minute {minute} not a multiple of step size {step_size}")
            }
            Self::OutOfBounds { day, num } => {
                write!(f, "entry {num} of day {day} out of bounds")
            }
        }
    }
}

impl core::error::Error for Error {}

/// Time of day with minute resolution.
///
/// Ranges from `00:00` up to and including `24:00`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Constructs a new time of day.
    pub const fn new(hour: u8, minute: u8) -> Result<Self, Error> {
        if hour > 24 || minute > 59 || (hour == 24 && minute != 0) {
            return Err(Error::InvalidTime(hour, minute));
        }

        Ok(Self { hour, minute })
    }

    /// Returns the hour.
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    /// Returns the minute.
    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s.split_once(':').ok_or(Error::InvalidFormat)?;
        let parse = |s: &str| {
            if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::InvalidFormat);
            }

            s.parse::<u8>().map_err(|_| Error::InvalidFormat)
        };

        Self::new(parse(hour)?, parse(minute)?)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A period of the day, e.g. `06:30-22:00`.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct TimeProgPeriod {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeProgPeriod {
    /// Constructs a new period.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, Error> {
        if start > end {
            return Err(Error::StartAfterEnd);
        }

        Ok(Self { start, end })
    }

    /// Constructs a new period from `HH:MM` strings.
    pub fn from_strs(start: &str, end: &str) -> Result<Self, Error> {
        Self::new(start.parse()?, end.parse()?)
    }

    /// Returns the start of the period.
    #[must_use]
    pub const fn start(&self) -> TimeOfDay {
        self.start
    }

    /// Returns the end of the period.
    #[must_use]
    pub const fn end(&self) -> TimeOfDay {
        self.end
    }
}

impl Display for TimeProgPeriod {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A time program entry, assigning a state to a period.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct TimeProgEntry {
    /// State during the period, e.g. `0` for off and `1` for on.
    pub state: u8,
    /// Period of the day.
    pub period: TimeProgPeriod,
}

impl Display for TimeProgEntry {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "{} {}", self.period, self.state)
    }
}

/// A weekly time program.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TimeProgram {
    index: u8,
    name: String,
    entries_a_day: u8,
    number_of_states: u8,
    step_size: u8,
    number_of_days: u8,
    grid: Vec<Option<TimeProgEntry>>,
}

impl TimeProgram {
    /// Constructs a new time program with all slots empty.
    #[must_use]
    pub fn new(
        index: u8,
        name: String,
        entries_a_day: u8,
        number_of_states: u8,
        step_size: u8,
        number_of_days: u8,
    ) -> Self {
        Self {
            index,
            name,
            entries_a_day,
            number_of_states,
            step_size,
            number_of_days,
            grid: vec![None; usize::from(number_of_days) * usize::from(entries_a_day)],
        }
    }

    /// Returns the index of the time program.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Returns the name of the time program.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of entries per day.
    #[must_use]
    pub const fn entries_a_day(&self) -> u8 {
        self.entries_a_day
    }

    /// Returns the number of supported states.
    #[must_use]
    pub const fn number_of_states(&self) -> u8 {
        self.number_of_states
    }

    /// Returns the step size in minutes.
    #[must_use]
    pub const fn step_size(&self) -> u8 {
        self.step_size
    }

    /// Returns the number of days.
    #[must_use]
    pub const fn number_of_days(&self) -> u8 {
        self.number_of_days
    }

    /// Returns the entry of the given slot.
    pub fn entry(&self, day: usize, num: usize) -> Result<Option<TimeProgEntry>, Error> {
        Ok(self.grid[self.slot(day, num)?])
    }

    /// Returns the entries of the given day.
    pub fn entries_for_day(&self, day: usize) -> Result<Vec<Option<TimeProgEntry>>, Error> {
        let start = self.slot(day, 0)?;
        let len = usize::from(self.entries_a_day);

        Ok(self.grid[start..start + len].to_vec())
    }

    /// Returns all slots in day-major order.
    #[must_use]
    pub fn entries(&self) -> Vec<Option<TimeProgEntry>> {
        self.grid.clone()
    }

    /// Returns whether every slot holds an entry.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.grid.iter().all(Option::is_some)
    }

    /// Sets or clears the entry of the given slot.
    ///
    /// The entry's state must be supported by the time program and its
    /// start and end minutes must be multiples of the step size.
    pub fn set_entry(
        &mut self,
        day: usize,
        num: usize,
        entry: Option<TimeProgEntry>,
    ) -> Result<(), Error> {
        let slot = self.slot(day, num)?;

        if let Some(entry) = &entry {
            self.check_entry(entry)?;
        }

        self.grid[slot] = entry;

        Ok(())
    }

    fn check_entry(&self, entry: &TimeProgEntry) -> Result<(), Error> {
        if entry.state >= self.number_of_states {
            return Err(Error::InvalidState {
                state: entry.state,
                number_of_states: self.number_of_states,
            });
        }

        for time in [entry.period.start, entry.period.end] {
            // A step size of zero imposes no alignment
            if time.minute.checked_rem(self.step_size).is_some_and(|rem| rem != 0) {
                return Err(Error::MisalignedTime {
                    minute: time.minute,
                    step_size: self.step_size,
                });
            }
        }

        Ok(())
    }

    fn slot(&self, day: usize, num: usize) -> Result<usize, Error> {
        if day >= usize::from(self.number_of_days) || num >= usize::from(self.entries_a_day) {
            return Err(Error::OutOfBounds { day, num });
        }

        Ok(day * usize::from(self.entries_a_day) + num)
    }
}

impl Display for TimeProgram {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(
            f,
            "idx={}, name={:?}, ead={}, nos={}, ste={}, nod={}",
            self.index,
            self.name,
            self.entries_a_day,
            self.number_of_states,
            self.step_size,
            self.number_of_days
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn entry(state: u8, start: &str, end: &str) -> TimeProgEntry {
        TimeProgEntry {
            state,
            period: TimeProgPeriod::from_strs(start, end).unwrap(),
        }
    }

    #[test]
    fn time_of_day_bounds() {
        assert!(TimeOfDay::new(0, 0).is_ok());
        assert!(TimeOfDay::new(23, 59).is_ok());
        assert!(TimeOfDay::new(24, 0).is_ok(), "end of day should be valid");
        assert_eq!(TimeOfDay::new(24, 1), Err(Error::InvalidTime(24, 1)));
        assert_eq!(TimeOfDay::new(25, 0), Err(Error::InvalidTime(25, 0)));
        assert_eq!(TimeOfDay::new(12, 60), Err(Error::InvalidTime(12, 60)));
    }

    #[test]
    fn time_of_day_parse() {
        assert_eq!("6:05".parse::<TimeOfDay>(), TimeOfDay::new(6, 5));
        assert_eq!("24:00".parse::<TimeOfDay>().unwrap().to_string(), "24:00");
        assert_eq!("1200".parse::<TimeOfDay>(), Err(Error::InvalidFormat));
        assert_eq!("12:345".parse::<TimeOfDay>(), Err(Error::InvalidFormat));
        assert_eq!("+1:00".parse::<TimeOfDay>(), Err(Error::InvalidFormat));
        assert_eq!("24:30".parse::<TimeOfDay>(), Err(Error::InvalidTime(24, 30)));
    }

    #[test]
    fn period_ordering() {
        let period = TimeProgPeriod::from_strs("06:30", "22:00").unwrap();

        assert_eq!(period.to_string(), "06:30-22:00");
        assert!(TimeProgPeriod::from_strs("10:00", "10:00").is_ok(), "empty period should be valid");
        assert_eq!(
            TimeProgPeriod::from_strs("22:00", "06:30"),
            Err(Error::StartAfterEnd)
        );
        assert_eq!(
            period,
            TimeProgPeriod::new(TimeOfDay::new(6, 30).unwrap(), TimeOfDay::new(22, 0).unwrap()).unwrap(),
            "periods should be compared structurally"
        );
    }

    #[test]
    fn set_and_get_entries() {
        let mut prog = TimeProgram::new(0, "Warmwasser".into(), 5, 3, 15, 7);

        assert_eq!(prog.entries().len(), 35, "grid should have days * slots entries");
        assert!(!prog.is_complete());

        prog.set_entry(6, 4, Some(entry(1, "06:15", "22:45"))).unwrap();

        assert_eq!(prog.entry(6, 4), Ok(Some(entry(1, "06:15", "22:45"))));
        assert_eq!(prog.entries_for_day(6).unwrap()[4], Some(entry(1, "06:15", "22:45")));
        assert_eq!(prog.entry(0, 0), Ok(None));

        prog.set_entry(6, 4, None).unwrap();

        assert_eq!(prog.entry(6, 4), Ok(None), "entry should be cleared");
    }

    #[test]
    fn reject_invalid_entries() {
        let mut prog = TimeProgram::new(0, "Warmwasser".into(), 5, 3, 15, 7);

        assert_eq!(
            prog.set_entry(0, 0, Some(entry(3, "06:00", "22:00"))),
            Err(Error::InvalidState {
                state: 3,
                number_of_states: 3
            })
        );
        assert_eq!(
            prog.set_entry(0, 0, Some(entry(1, "06:10", "22:00"))),
            Err(Error::MisalignedTime {
                minute: 10,
                step_size: 15
            })
        );
        assert_eq!(
            prog.set_entry(0, 0, Some(entry(1, "06:00", "22:50"))),
            Err(Error::MisalignedTime {
                minute: 50,
                step_size: 15
            })
        );
        assert_eq!(
            prog.set_entry(7, 0, Some(entry(1, "06:00", "22:00"))),
            Err(Error::OutOfBounds { day: 7, num: 0 })
        );
        assert_eq!(prog.entry(0, 5), Err(Error::OutOfBounds { day: 0, num: 5 }));
        assert!(prog.entries().iter().all(Option::is_none), "grid should be unchanged");
    }

    #[test]
    fn zero_step_size() {
        let mut prog = TimeProgram::new(1, "Heizung".into(), 1, 2, 0, 1);

        assert!(prog.set_entry(0, 0, Some(entry(1, "06:07", "22:13"))).is_ok());
    }
}
