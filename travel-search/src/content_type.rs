use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// The search domain selector. Picks the backend endpoint and the column
/// schema of the returned records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Destinations,
    Flights,
    Hotels,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [
        ContentType::Destinations,
        ContentType::Flights,
        ContentType::Hotels,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Destinations => "destinations",
            ContentType::Flights => "flights",
            ContentType::Hotels => "hotels",
        }
    }

    /// Path of the search resource, relative to the API base.
    pub fn endpoint(self) -> &'static str {
        match self {
            ContentType::Destinations => "Search/destinations",
            ContentType::Flights => "Search/flights",
            ContentType::Hotels => "Search/hotels",
        }
    }

    /// Sort keys the server understands for this content type.
    pub fn sort_keys(self) -> &'static [&'static str] {
        match self {
            ContentType::Destinations => &["name", "country"],
            ContentType::Flights => &["name", "price", "departureTime"],
            ContentType::Hotels => &["name", "rating", "pricePerNight"],
        }
    }

    pub fn is_valid_sort_key(self, key: &str) -> bool {
        self.sort_keys().contains(&key)
    }

    /// Fallback message used when a failed search carries no server message.
    pub(crate) fn failure_message(self) -> &'static str {
        match self {
            ContentType::Destinations => "Failed to search destinations",
            ContentType::Flights => "Failed to search flights",
            ContentType::Hotels => "Failed to search hotels",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "destinations" => Ok(ContentType::Destinations),
            "flights" => Ok(ContentType::Flights),
            "hotels" => Ok(ContentType::Hotels),
            _ => Err(SearchError::InvalidSearchType(s.to_string())),
        }
    }
}
