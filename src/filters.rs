//! Search form state and the sparse filter set sent to `POST /events/search/`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    SrcAddr,
    DstAddr,
    AccountId,
    Action,
    SrcPort,
    DstPort,
    Protocol,
    LogStatus,
    StartTime,
    EndTime,
}

impl FilterField {
    pub const ALL: [FilterField; 10] = [
        FilterField::SrcAddr,
        FilterField::DstAddr,
        FilterField::AccountId,
        FilterField::Action,
        FilterField::SrcPort,
        FilterField::DstPort,
        FilterField::Protocol,
        FilterField::LogStatus,
        FilterField::StartTime,
        FilterField::EndTime,
    ];

    /// Wire name, also accepted by [`SearchForm::edit`].
    pub fn name(self) -> &'static str {
        match self {
            FilterField::SrcAddr => "src_addr",
            FilterField::DstAddr => "dst_addr",
            FilterField::AccountId => "account_id",
            FilterField::Action => "action",
            FilterField::SrcPort => "src_port",
            FilterField::DstPort => "dst_port",
            FilterField::Protocol => "protocol",
            FilterField::LogStatus => "log_status",
            FilterField::StartTime => "start_time",
            FilterField::EndTime => "end_time",
        }
    }
}

impl FromStr for FilterField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum PageSize {
    Small,
    Medium,
    #[default]
    Large,
    Huge,
}

impl PageSize {
    pub fn get(self) -> u32 {
        match self {
            PageSize::Small => 25,
            PageSize::Medium => 50,
            PageSize::Large => 100,
            PageSize::Huge => 200,
        }
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> u32 {
        size.get()
    }
}

impl TryFrom<u32> for PageSize {
    type Error = FormError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            25 => Ok(PageSize::Small),
            50 => Ok(PageSize::Medium),
            100 => Ok(PageSize::Large),
            200 => Ok(PageSize::Huge),
            other => Err(FormError::InvalidPageSize(other.to_string())),
        }
    }
}

impl FromStr for PageSize {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| FormError::InvalidPageSize(s.to_string()))
            .and_then(PageSize::try_from)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// The filter set actually transmitted. Unset and blank fields are never
/// serialized; `page` and `page_size` always are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "is_blank")]
    pub src_addr: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub dst_addr: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<i64>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub log_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    pub page: u32,
    pub page_size: PageSize,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            src_addr: None,
            dst_addr: None,
            account_id: None,
            action: None,
            src_port: None,
            dst_port: None,
            protocol: None,
            log_status: None,
            start_time: None,
            end_time: None,
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl SearchFilters {
    /// Same filters, different page. Used for page changes.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    fn set(&mut self, field: FilterField, raw: &str) -> Result<(), FormError> {
        let number = || {
            raw.parse::<i64>().map_err(|_| FormError::InvalidNumber {
                field: field.name(),
                value: raw.to_string(),
            })
        };

        match field {
            FilterField::SrcAddr => self.src_addr = Some(raw.to_string()),
            FilterField::DstAddr => self.dst_addr = Some(raw.to_string()),
            FilterField::AccountId => self.account_id = Some(raw.to_string()),
            FilterField::Action => self.action = Some(raw.to_string()),
            FilterField::LogStatus => self.log_status = Some(raw.to_string()),
            FilterField::SrcPort => self.src_port = Some(number()?),
            FilterField::DstPort => self.dst_port = Some(number()?),
            FilterField::Protocol => self.protocol = Some(number()?),
            FilterField::StartTime => self.start_time = Some(number()?),
            FilterField::EndTime => self.end_time = Some(number()?),
        }
        Ok(())
    }
}

/// Editable form values, kept as the raw text the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    values: BTreeMap<FilterField, String>,
    page: u32,
    page_size: PageSize,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: FilterField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Changing filter criteria invalidates the page cursor.
    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        self.values.insert(field, value.into());
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), FormError> {
        if page == 0 {
            return Err(FormError::InvalidPage(page.to_string()));
        }
        self.page = page;
        Ok(())
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
    }

    /// Edit one field by its wire name.
    pub fn edit(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        match name {
            "page" => {
                let page = value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| FormError::InvalidPage(value.to_string()))?;
                self.set_page(page)
            }
            "page_size" => {
                self.set_page_size(value.parse()?);
                Ok(())
            }
            _ => {
                let field: FilterField = name.parse()?;
                self.set_filter(field, value);
                Ok(())
            }
        }
    }

    /// Build the outbound filter set, dropping every empty field.
    pub fn submit(&self) -> Result<SearchFilters, FormError> {
        let mut filters = SearchFilters {
            page: self.page,
            page_size: self.page_size,
            ..SearchFilters::default()
        };

        for (field, raw) in &self.values {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            filters.set(*field, raw)?;
        }

        Ok(filters)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn has_active_filters(&self) -> bool {
        self.values.values().any(|v| !v.trim().is_empty())
            || self.page != 1
            || self.page_size != PageSize::default()
    }
}
