//! The fixed set of feed content rules.
//!
//! Each rule is a pure function of a [`FeedDocument`]. Rules never stop each
//! other; see [`crate::validator::validate_document`] for how they are combined.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::date::{DateError, parse_date, validate_date};
use crate::feed::FeedDocument;

/// One rule violation found in a feed document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("channel pub date: {0}")]
    ChannelDate(DateError),

    #[error("item '{title}' pub date: {error}")]
    ItemDate { title: String, error: DateError },

    #[error("duplicate GUID found: {guid}")]
    DuplicateGuid { guid: String },

    #[error("invalid date format in channel '{value}'")]
    ChannelDateUnparseable { value: String },

    #[error("invalid date format in item '{value}'")]
    ItemDateUnparseable { value: String },

    #[error("publication dates of channel and item do not match")]
    DateMismatch { channel: String, item: String },
}

/// Coarse classification of a [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    DateFormat,
    DayOfWeekMismatch,
    DuplicateIdentifier,
    DateInconsistency,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::DateFormat => "date-format",
            ViolationKind::DayOfWeekMismatch => "day-of-week-mismatch",
            ViolationKind::DuplicateIdentifier => "duplicate-identifier",
            ViolationKind::DateInconsistency => "date-inconsistency",
        }
    }
}

impl ValidationError {
    pub fn kind(&self) -> ViolationKind {
        match self {
            ValidationError::ChannelDate(error) | ValidationError::ItemDate { error, .. } => {
                match error {
                    DateError::Format { .. } => ViolationKind::DateFormat,
                    DateError::DayOfWeekMismatch { .. } => ViolationKind::DayOfWeekMismatch,
                }
            }
            ValidationError::DuplicateGuid { .. } => ViolationKind::DuplicateIdentifier,
            ValidationError::ChannelDateUnparseable { .. }
            | ValidationError::ItemDateUnparseable { .. } => ViolationKind::DateFormat,
            ValidationError::DateMismatch { .. } => ViolationKind::DateInconsistency,
        }
    }
}

/// The rules applied to every feed, in the order their errors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    ChannelDate,
    ItemDates,
    UniqueGuids,
    LatestItemDate,
}

impl Rule {
    pub const ALL: [Rule; 4] = [
        Rule::ChannelDate,
        Rule::ItemDates,
        Rule::UniqueGuids,
        Rule::LatestItemDate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::ChannelDate => "channel-date",
            Rule::ItemDates => "item-dates",
            Rule::UniqueGuids => "unique-guids",
            Rule::LatestItemDate => "latest-item-date",
        }
    }

    /// Run this rule against one document.
    pub fn check(self, doc: &FeedDocument) -> Vec<ValidationError> {
        let violation = match self {
            Rule::ChannelDate => check_channel_date(doc),
            Rule::ItemDates => check_item_dates(doc),
            Rule::UniqueGuids => check_unique_guids(doc),
            Rule::LatestItemDate => check_latest_item_date(doc),
        };
        violation.into_iter().collect()
    }
}

pub fn check_channel_date(doc: &FeedDocument) -> Option<ValidationError> {
    validate_date(&doc.pub_date)
        .err()
        .map(ValidationError::ChannelDate)
}

/// Stops at the first item with a bad date.
pub fn check_item_dates(doc: &FeedDocument) -> Option<ValidationError> {
    doc.items.iter().find_map(|item| {
        validate_date(&item.pub_date)
            .err()
            .map(|error| ValidationError::ItemDate {
                title: item.title.clone(),
                error,
            })
    })
}

/// Reports only the first repeated GUID.
pub fn check_unique_guids(doc: &FeedDocument) -> Option<ValidationError> {
    let mut seen = HashSet::new();
    doc.items
        .iter()
        .find(|item| !seen.insert(item.guid.as_str()))
        .map(|item| ValidationError::DuplicateGuid {
            guid: item.guid.clone(),
        })
}

/// The channel must carry the same instant as its first item.
pub fn check_latest_item_date(doc: &FeedDocument) -> Option<ValidationError> {
    let latest = doc.latest_item()?;

    let Ok(channel_date) = parse_date(&doc.pub_date) else {
        return Some(ValidationError::ChannelDateUnparseable {
            value: doc.pub_date.clone(),
        });
    };
    let Ok(item_date) = parse_date(&latest.pub_date) else {
        return Some(ValidationError::ItemDateUnparseable {
            value: latest.pub_date.clone(),
        });
    };

    // DateTime equality compares instants, not offsets.
    (channel_date != item_date).then(|| ValidationError::DateMismatch {
        channel: doc.pub_date.clone(),
        item: latest.pub_date.clone(),
    })
}
