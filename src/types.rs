use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};

/// Configuration stored in ~/.adminpanel/config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the REST API, e.g. `https://api.example.com/v1/`
    #[serde(alias = "api_base_url")]
    pub api_base_url: String,
    /// Bearer token attached to every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Hours ahead of now that a milestone due today counts as urgent
    #[serde(default = "default_urgent_window_hours")]
    pub urgent_window_hours: u32,
    /// IANA zone used for time-of-day comparisons. System local zone when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn default_page_size() -> u32 {
    10
}

fn default_urgent_window_hours() -> u32 {
    2
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            token: None,
            page_size: default_page_size(),
            urgent_window_hours: default_urgent_window_hours(),
            timezone: None,
        }
    }

    /// Parsed timezone, or None for system local time.
    ///
    /// Unknown zone names are logged and ignored.
    pub fn tz(&self) -> Option<chrono_tz::Tz> {
        let name = self.timezone.as_deref()?;
        match name.parse::<chrono_tz::Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                log::warn!("Unknown timezone '{}', using system local time", name);
                None
            }
        }
    }
}

/// Sort direction accepted by list endpoints and the milestone table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("Invalid sort direction: {}", other)),
        }
    }
}

/// Standard query parameters for list endpoints.
///
/// Unset values are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = Some(field.into());
        self.sort_direction = Some(direction);
        self
    }

    /// Query-string pairs in a stable order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(field) = self.sort_field.as_deref().filter(|f| !f.is_empty()) {
            query.push(("sort_field", field.to_string()));
            query.push((
                "sort_direction",
                self.sort_direction.unwrap_or_default().to_string(),
            ));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }
        query
    }
}

/// One page of a list endpoint.
///
/// The backend answers either with an envelope
/// (`{"data": [...], "total": 42, "page": 1, "limit": 10}`) or a bare
/// array; both deserialize into this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page: None,
            limit: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Page<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Envelope<T> {
            data: Vec<T>,
            #[serde(default)]
            total: Option<u64>,
            #[serde(default)]
            page: Option<u32>,
            #[serde(default)]
            limit: Option<u32>,
        }

        // Decoding through a Value keeps the row-level serde error in the message.
        match serde_json::Value::deserialize(deserializer)? {
            value @ serde_json::Value::Array(_) => {
                let data: Vec<T> = serde_json::from_value(value)
                    .map_err(|e| D::Error::custom(format!("invalid list row: {}", e)))?;
                Ok(Page {
                    total: data.len() as u64,
                    data,
                    page: None,
                    limit: None,
                })
            }
            value @ serde_json::Value::Object(_) => {
                let envelope: Envelope<T> = serde_json::from_value(value)
                    .map_err(|e| D::Error::custom(format!("invalid list envelope: {}", e)))?;
                Ok(Page {
                    total: envelope.total.unwrap_or(envelope.data.len() as u64),
                    data: envelope.data,
                    page: envelope.page,
                    limit: envelope.limit,
                })
            }
            other => Err(D::Error::custom(format!(
                "expected a list or a {{\"data\": [...]}} envelope, got {}",
                other
            ))),
        }
    }
}

/// Deserialize a JSON `null` as the field type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
