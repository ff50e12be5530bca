//! Marker filter selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MapMarker;

/// Dropdown value that shows every marker.
pub const FILTER_ALL: &str = "all";

/// Current filter dropdown selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterSelection {
    #[default]
    All,
    Code(String),
}

impl FilterSelection {
    /// Interpret a dropdown change value.
    ///
    /// Exactly `"all"` selects everything. Any other value is taken as a
    /// code, even if no marker carries it.
    pub fn parse(value: &str) -> Self {
        if value == FILTER_ALL {
            FilterSelection::All
        } else {
            FilterSelection::Code(value.to_string())
        }
    }

    /// Whether `marker` survives this selection.
    pub fn matches(&self, marker: &MapMarker) -> bool {
        match self {
            FilterSelection::All => true,
            FilterSelection::Code(code) => marker.city == *code,
        }
    }

    /// Value to show as selected in the dropdown.
    pub fn as_str(&self) -> &str {
        match self {
            FilterSelection::All => FILTER_ALL,
            FilterSelection::Code(code) => code,
        }
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markers that survive `selection`, in their original order.
pub fn filter_markers<'a>(markers: &'a [MapMarker], selection: &FilterSelection) -> Vec<&'a MapMarker> {
    markers.iter().filter(|m| selection.matches(m)).collect()
}
