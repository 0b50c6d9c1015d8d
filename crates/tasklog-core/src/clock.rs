//! Conversion between a date plus a
//! 12-hour clock reading and a single
//! instant.

use std::fmt;
use std::str::FromStr;

use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  Timelike,
  Utc
};

use crate::datetime::Zone;

#[derive(
  Debug, Clone, PartialEq, Eq, thiserror::Error,
)]
pub enum ClockError {
  #[error(
    "hour must be between 01 and 12, \
     got `{0}`"
  )]
  InvalidHour(String),
  #[error(
    "minute must be one of 00, 15, 30 \
     or 45, got `{0}`"
  )]
  InvalidMinute(String),
  #[error(
    "meridiem must be AM or PM, got \
     `{0}`"
  )]
  InvalidMeridiem(String),
  #[error(
    "date must be YYYY-MM-DD, got `{0}`"
  )]
  InvalidDate(String),
  #[error(
    "{local} does not exist in \
     timezone {zone}"
  )]
  NonexistentLocalTime {
    local: NaiveDateTime,
    zone:  String
  },
  #[error("unknown timezone `{0}`")]
  UnknownTimezone(String),
  #[error(
    "Task due time cannot be in the past"
  )]
  InPast
}

/// Hour on a 12-hour dial, `1..=12`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
)]
pub struct Hour12(u8);

impl Hour12 {
  pub const ALL: [Hour12; 12] = [
    Hour12(1),
    Hour12(2),
    Hour12(3),
    Hour12(4),
    Hour12(5),
    Hour12(6),
    Hour12(7),
    Hour12(8),
    Hour12(9),
    Hour12(10),
    Hour12(11),
    Hour12(12)
  ];
  pub const TWELVE: Hour12 = Hour12(12);

  pub fn new(
    hour: u8
  ) -> Result<Self, ClockError> {
    if (1..=12).contains(&hour) {
      Ok(Self(hour))
    } else {
      Err(ClockError::InvalidHour(
        hour.to_string()
      ))
    }
  }

  pub fn get(self) -> u8 {
    self.0
  }
}

impl fmt::Display for Hour12 {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(f, "{:02}", self.0)
  }
}

impl FromStr for Hour12 {
  type Err = ClockError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let hour = s
      .trim()
      .parse::<u8>()
      .map_err(|_| {
        ClockError::InvalidHour(
          s.to_string()
        )
      })?;
    Self::new(hour).map_err(|_| {
      ClockError::InvalidHour(
        s.to_string()
      )
    })
  }
}

/// Minute of the hour, restricted to
/// the quarter-hour picker values.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
)]
pub struct Minute(u8);

impl Minute {
  pub const ALL: [Minute; 4] = [
    Minute(0),
    Minute(15),
    Minute(30),
    Minute(45)
  ];
  pub const ZERO: Minute = Minute(0);

  pub fn new(
    minute: u8
  ) -> Result<Self, ClockError> {
    if minute % 15 == 0 && minute < 60 {
      Ok(Self(minute))
    } else {
      Err(ClockError::InvalidMinute(
        minute.to_string()
      ))
    }
  }

  pub fn get(self) -> u8 {
    self.0
  }
}

impl fmt::Display for Minute {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(f, "{:02}", self.0)
  }
}

impl FromStr for Minute {
  type Err = ClockError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let minute = s
      .trim()
      .parse::<u8>()
      .map_err(|_| {
        ClockError::InvalidMinute(
          s.to_string()
        )
      })?;
    Self::new(minute).map_err(|_| {
      ClockError::InvalidMinute(
        s.to_string()
      )
    })
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Meridiem {
  Am,
  Pm
}

impl Meridiem {
  pub const ALL: [Meridiem; 2] =
    [Meridiem::Am, Meridiem::Pm];

  pub fn as_str(&self) -> &'static str {
    match self {
      | Meridiem::Am => "AM",
      | Meridiem::Pm => "PM"
    }
  }
}

impl fmt::Display for Meridiem {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Meridiem {
  type Err = ClockError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_uppercase()
      .as_str()
    {
      | "AM" => Ok(Meridiem::Am),
      | "PM" => Ok(Meridiem::Pm),
      | _ => {
        Err(ClockError::InvalidMeridiem(
          s.to_string()
        ))
      }
    }
  }
}

/// A wall-clock reading as entered in
/// the task form.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct ClockParts {
  pub date:     NaiveDate,
  pub hour:     Hour12,
  pub minute:   Minute,
  pub meridiem: Meridiem
}

impl ClockParts {
  /// 24-hour value of the reading.
  pub fn hour24(&self) -> u32 {
    let hour = u32::from(self.hour.get());
    match (self.meridiem, hour) {
      | (Meridiem::Pm, 12) => 12,
      | (Meridiem::Pm, h) => h + 12,
      | (Meridiem::Am, 12) => 0,
      | (Meridiem::Am, h) => h
    }
  }
}

pub fn parse_date(
  raw: &str
) -> Result<NaiveDate, ClockError> {
  NaiveDate::parse_from_str(
    raw.trim(),
    "%Y-%m-%d"
  )
  .map_err(|_| {
    ClockError::InvalidDate(
      raw.to_string()
    )
  })
}

/// Turns a date and 12-hour clock
/// reading into an instant, resolving
/// the wall-clock time in `zone`.
#[tracing::instrument(
  skip(zone),
  fields(zone = %zone)
)]
pub fn compose(
  zone: &Zone,
  parts: ClockParts
) -> Result<DateTime<Utc>, ClockError> {
  let time = NaiveTime::from_hms_opt(
    parts.hour24(),
    u32::from(parts.minute.get()),
    0
  )
  .ok_or_else(|| {
    ClockError::InvalidHour(
      parts.hour.to_string()
    )
  })?;

  zone.resolve(parts.date.and_time(time))
}

/// Inverse of [`compose`]: reads the
/// local date and 12-hour clock of
/// `instant` in `zone`.
///
/// Minutes outside the picker set (only
/// possible for records created
/// elsewhere) are rounded down to the
/// quarter hour.
pub fn decompose(
  zone: &Zone,
  instant: DateTime<Utc>
) -> ClockParts {
  let local = zone.localize(instant);
  let hour24 = local.hour();
  let hour12 = match hour24 % 12 {
    | 0 => 12,
    | h => h
  };
  let meridiem = if hour24 >= 12 {
    Meridiem::Pm
  } else {
    Meridiem::Am
  };
  let quarter = local.minute() / 15 * 15;

  ClockParts {
    date: local.date(),
    hour: Hour12(hour12 as u8),
    minute: Minute(quarter as u8),
    meridiem
  }
}

/// Rejects instants strictly earlier
/// than `now`.
pub fn ensure_not_past(
  instant: DateTime<Utc>,
  now: DateTime<Utc>
) -> Result<(), ClockError> {
  if instant < now {
    tracing::debug!(
      %instant,
      %now,
      "task time is in the past"
    );
    return Err(ClockError::InPast);
  }
  Ok(())
}
