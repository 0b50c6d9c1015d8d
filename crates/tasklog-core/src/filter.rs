use std::fmt;
use std::str::FromStr;

use tracing::trace;

#[derive(
  Debug, Clone, PartialEq, Eq, thiserror::Error,
)]
pub enum FilterError {
  #[error("unknown filter field `{0}`")]
  UnknownField(String),
  #[error("unknown sort key `{0}`")]
  UnknownSortKey(String),
  #[error(
    "unknown sort order `{0}` (expected \
     asc or desc)"
  )]
  UnknownSortOrder(String)
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub enum SortKey {
  #[default]
  DateCreated,
  EntityName,
  TaskType,
  TaskTime,
  ContactPerson,
  Status
}

impl SortKey {
  pub const ALL: [SortKey; 6] = [
    SortKey::DateCreated,
    SortKey::EntityName,
    SortKey::TaskType,
    SortKey::TaskTime,
    SortKey::ContactPerson,
    SortKey::Status
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      | SortKey::DateCreated => {
        "date_created"
      }
      | SortKey::EntityName => {
        "entity_name"
      }
      | SortKey::TaskType => "task_type",
      | SortKey::TaskTime => "task_time",
      | SortKey::ContactPerson => {
        "contact_person"
      }
      | SortKey::Status => "status"
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      | SortKey::DateCreated => {
        "Date Created"
      }
      | SortKey::EntityName => {
        "Entity Name"
      }
      | SortKey::TaskType => "Task Type",
      | SortKey::TaskTime => "Task Time",
      | SortKey::ContactPerson => {
        "Contact Person"
      }
      | SortKey::Status => "Status"
    }
  }
}

impl fmt::Display for SortKey {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SortKey {
  type Err = FilterError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    SortKey::ALL
      .into_iter()
      .find(|key| key.as_str() == wanted)
      .ok_or_else(|| {
        FilterError::UnknownSortKey(
          s.to_string()
        )
      })
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SortOrder {
  Asc,
  Desc
}

impl SortOrder {
  pub fn as_str(&self) -> &'static str {
    match self {
      | SortOrder::Asc => "asc",
      | SortOrder::Desc => "desc"
    }
  }
}

impl fmt::Display for SortOrder {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SortOrder {
  type Err = FilterError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "asc" => Ok(SortOrder::Asc),
      | "desc" => Ok(SortOrder::Desc),
      | _ => {
        Err(
          FilterError::UnknownSortOrder(
            s.to_string()
          )
        )
      }
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FilterField {
  EntityName,
  TaskType,
  Status,
  ContactPerson,
  TaskDate,
  SearchTerm,
  SortBy,
  SortOrder
}

impl FilterField {
  pub const ALL: [FilterField; 8] = [
    FilterField::EntityName,
    FilterField::TaskType,
    FilterField::Status,
    FilterField::ContactPerson,
    FilterField::TaskDate,
    FilterField::SearchTerm,
    FilterField::SortBy,
    FilterField::SortOrder
  ];

  /// Query parameter name.
  pub fn as_str(&self) -> &'static str {
    match self {
      | FilterField::EntityName => {
        "entity_name"
      }
      | FilterField::TaskType => {
        "task_type"
      }
      | FilterField::Status => "status",
      | FilterField::ContactPerson => {
        "contact_person"
      }
      | FilterField::TaskDate => {
        "task_date"
      }
      | FilterField::SearchTerm => {
        "search_term"
      }
      | FilterField::SortBy => "sort_by",
      | FilterField::SortOrder => {
        "sort_order"
      }
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      | FilterField::EntityName => {
        "Entity Name"
      }
      | FilterField::TaskType => {
        "Task Type"
      }
      | FilterField::Status => "Status",
      | FilterField::ContactPerson => {
        "Contact Person"
      }
      | FilterField::TaskDate => {
        "Task Date"
      }
      | FilterField::SearchTerm => {
        "Search"
      }
      | FilterField::SortBy => "Sort By",
      | FilterField::SortOrder => {
        "Sort Order"
      }
    }
  }

  fn is_matcher(&self) -> bool {
    !matches!(
      self,
      FilterField::SortBy
        | FilterField::SortOrder
    )
  }
}

impl fmt::Display for FilterField {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FilterField {
  type Err = FilterError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    FilterField::ALL
      .into_iter()
      .find(|field| {
        field.as_str() == wanted
      })
      .ok_or_else(|| {
        FilterError::UnknownField(
          s.to_string()
        )
      })
  }
}

/// Sparse list-request criteria.
///
/// Matchers are free text and are not
/// validated here; the remote API
/// decides what they match. An empty
/// matcher means "no constraint".
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct TaskFilters {
  pub entity_name:    String,
  pub task_type:      String,
  pub status:         String,
  pub contact_person: String,
  pub task_date:      String,
  pub search_term:    String,
  pub sort_by:        SortKey,
  pub sort_order:     Option<SortOrder>
}

/// Removable chip describing one
/// active matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
  pub field: FilterField,
  pub label: &'static str,
  pub value: String
}

impl TaskFilters {
  /// Current value of `field` as it
  /// would be sent, before trimming.
  pub fn value(
    &self,
    field: FilterField
  ) -> String {
    match field {
      | FilterField::EntityName => {
        self.entity_name.clone()
      }
      | FilterField::TaskType => {
        self.task_type.clone()
      }
      | FilterField::Status => {
        self.status.clone()
      }
      | FilterField::ContactPerson => {
        self.contact_person.clone()
      }
      | FilterField::TaskDate => {
        self.task_date.clone()
      }
      | FilterField::SearchTerm => {
        self.search_term.clone()
      }
      | FilterField::SortBy => {
        self.sort_by.as_str().to_string()
      }
      | FilterField::SortOrder => self
        .sort_order
        .map(|order| {
          order.as_str().to_string()
        })
        .unwrap_or_default()
    }
  }

  /// Sets one field. Sort fields must
  /// name a known key/order; a blank
  /// value resets them to their default.
  pub fn set(
    &mut self,
    field: FilterField,
    value: &str
  ) -> Result<(), FilterError> {
    match field {
      | FilterField::EntityName => {
        self.entity_name =
          value.to_string()
      }
      | FilterField::TaskType => {
        self.task_type = value.to_string()
      }
      | FilterField::Status => {
        self.status = value.to_string()
      }
      | FilterField::ContactPerson => {
        self.contact_person =
          value.to_string()
      }
      | FilterField::TaskDate => {
        self.task_date = value.to_string()
      }
      | FilterField::SearchTerm => {
        self.search_term =
          value.to_string()
      }
      | FilterField::SortBy => {
        self.sort_by =
          if value.trim().is_empty() {
            SortKey::default()
          } else {
            value.parse()?
          }
      }
      | FilterField::SortOrder => {
        self.sort_order =
          if value.trim().is_empty() {
            None
          } else {
            Some(value.parse()?)
          }
      }
    }
    Ok(())
  }

  /// Resets exactly one field to its
  /// default.
  pub fn clear(
    &mut self,
    field: FilterField
  ) {
    let defaults = TaskFilters::default();
    match field {
      | FilterField::SortBy => {
        self.sort_by = defaults.sort_by
      }
      | FilterField::SortOrder => {
        self.sort_order =
          defaults.sort_order
      }
      | FilterField::EntityName => {
        self.entity_name.clear()
      }
      | FilterField::TaskType => {
        self.task_type.clear()
      }
      | FilterField::Status => {
        self.status.clear()
      }
      | FilterField::ContactPerson => {
        self.contact_person.clear()
      }
      | FilterField::TaskDate => {
        self.task_date.clear()
      }
      | FilterField::SearchTerm => {
        self.search_term.clear()
      }
    }
  }

  pub fn reset(&mut self) {
    *self = TaskFilters::default();
  }

  /// Query pairs for a list request.
  /// Values are trimmed and blank values
  /// are dropped.
  pub fn to_query(
    &self
  ) -> Vec<(String, String)> {
    let pairs: Vec<(String, String)> =
      FilterField::ALL
        .into_iter()
        .filter_map(|field| {
          let value = self.value(field);
          let trimmed = value.trim();
          if trimmed.is_empty() {
            None
          } else {
            Some((
              field.as_str().to_string(),
              trimmed.to_string()
            ))
          }
        })
        .collect();
    trace!(
      pair_count = pairs.len(),
      "encoded filter query"
    );
    pairs
  }

  /// Non-blank matchers, in display
  /// order.
  pub fn active_badges(
    &self
  ) -> Vec<ActiveFilter> {
    FilterField::ALL
      .into_iter()
      .filter(FilterField::is_matcher)
      .filter_map(|field| {
        let value = self.value(field);
        if value.trim().is_empty() {
          return None;
        }
        Some(ActiveFilter {
          field,
          label: field.label(),
          value
        })
      })
      .collect()
  }
}
