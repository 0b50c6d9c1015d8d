use std::fmt;
use std::str::FromStr;

use chrono::{
  DateTime,
  Local,
  LocalResult,
  NaiveDateTime,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

use crate::clock::ClockError;

/// The zone human-entered dates and
/// clock times are interpreted in.
///
/// Instants are always stored and sent
/// as UTC; the zone only matters when
/// turning a wall-clock reading into an
/// instant and back.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq,
)]
pub enum Zone {
  /// Whatever the host reports as its
  /// local zone.
  #[default]
  Local,
  Named(Tz)
}

impl Zone {
  /// Resolves a wall-clock reading to
  /// an instant. A reading inside a DST
  /// fold maps to the earlier instant;
  /// one inside a DST gap is an error.
  pub fn resolve(
    &self,
    local_naive: NaiveDateTime
  ) -> Result<DateTime<Utc>, ClockError>
  {
    let mapped = match self {
      | Zone::Local => Local
        .from_local_datetime(
          &local_naive
        )
        .map(|dt| dt.with_timezone(&Utc)),
      | Zone::Named(tz) => tz
        .from_local_datetime(
          &local_naive
        )
        .map(|dt| dt.with_timezone(&Utc))
    };

    match mapped {
      | LocalResult::Single(instant) => {
        Ok(instant)
      }
      | LocalResult::Ambiguous(
        first,
        second
      ) => {
        tracing::warn!(
          zone = %self,
          local = %local_naive,
          first = %first,
          second = %second,
          "ambiguous local datetime; using earliest"
        );
        Ok(first.min(second))
      }
      | LocalResult::None => {
        Err(
          ClockError::NonexistentLocalTime {
            local: local_naive,
            zone:  self.to_string()
          }
        )
      }
    }
  }

  /// Wall-clock reading of `instant` in
  /// this zone.
  #[must_use]
  pub fn localize(
    &self,
    instant: DateTime<Utc>
  ) -> NaiveDateTime {
    match self {
      | Zone::Local => instant
        .with_timezone(&Local)
        .naive_local(),
      | Zone::Named(tz) => instant
        .with_timezone(tz)
        .naive_local()
    }
  }
}

impl fmt::Display for Zone {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | Zone::Local => f.write_str("local"),
      | Zone::Named(tz) => {
        f.write_str(tz.name())
      }
    }
  }
}

impl FromStr for Zone {
  type Err = ClockError;

  fn from_str(
    raw: &str
  ) -> Result<Self, Self::Err> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
      || trimmed
        .eq_ignore_ascii_case("local")
    {
      return Ok(Zone::Local);
    }

    trimmed
      .parse::<Tz>()
      .map(Zone::Named)
      .map_err(|_| {
        ClockError::UnknownTimezone(
          trimmed.to_string()
        )
      })
  }
}

/// Serde adapter for timestamps on the
/// wire: written as RFC 3339 UTC, read
/// from RFC 3339 with any offset or from
/// a naive ISO-8601 date-time taken as
/// UTC.
pub mod wire_time {
  use chrono::{
    DateTime,
    NaiveDateTime,
    SecondsFormat,
    Utc
  };
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  pub fn serialize<S>(
    dt: &DateTime<Utc>,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &dt.to_rfc3339_opts(
        SecondsFormat::Secs,
        true
      )
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<DateTime<Utc>, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = String::deserialize(
      deserializer
    )?;
    parse(&raw)
      .map_err(serde::de::Error::custom)
  }

  pub fn parse(
    raw: &str
  ) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(dt) =
      DateTime::parse_from_rfc3339(
        trimmed
      )
    {
      return Ok(dt.with_timezone(&Utc));
    }

    trimmed
      .parse::<NaiveDateTime>()
      .map(|ndt| ndt.and_utc())
      .map_err(|err| {
        format!(
          "invalid timestamp `{trimmed}`: \
           {err}"
        )
      })
  }
}
