//! # Format Registry
//!
//! Named string formats recognized by the `format` keyword. Each validated
//! format is a predicate over the string value; `path` and
//! `uri-reference` are not validated but select the path-string scalar
//! kind so the configuration layer can treat the value as a filesystem or
//! URI path.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// A format with a validation predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `local@domain.tld`, no whitespace.
    Email,
    /// `YYYY-MM-DD`, a real calendar date.
    Date,
    /// RFC 3339 date-time with offset.
    DateTime,
    /// Absolute URI with a scheme and a non-empty host.
    Uri,
    /// Hyphenated 36-character UUID.
    Uuid,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// IPv6 address.
    Ipv6,
}

/// How a `format` value affects compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSupport {
    /// Attach a format constraint.
    Validated(Format),
    /// Select the path-string scalar kind; no constraint.
    PathKind,
    /// Not in the registry.
    Unknown,
}

const VALIDATED: [Format; 7] = [
    Format::Email,
    Format::Date,
    Format::DateTime,
    Format::Uri,
    Format::Uuid,
    Format::Ipv4,
    Format::Ipv6,
];

const PATH_FORMATS: [&str; 2] = ["path", "uri-reference"];

impl Format {
    /// The keyword spelling of this format.
    pub fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Uri => "uri",
            Self::Uuid => "uuid",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }

    /// Look up a validated format by keyword spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        VALIDATED.into_iter().find(|format| format.name() == name)
    }

    /// Whether `value` conforms to this format.
    pub fn is_valid(self, value: &str) -> bool {
        match self {
            Self::Email => EMAIL.as_ref().is_some_and(|re| re.is_match(value)),
            Self::Date => is_date(value),
            Self::DateTime => chrono::DateTime::parse_from_rfc3339(value).is_ok(),
            Self::Uri => url::Url::parse(value)
                .is_ok_and(|url| url.host_str().is_some_and(|host| !host.is_empty())),
            Self::Uuid => value.len() == 36 && uuid::Uuid::parse_str(value).is_ok(),
            Self::Ipv4 => value.parse::<Ipv4Addr>().is_ok(),
            Self::Ipv6 => value.parse::<Ipv6Addr>().is_ok(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_date(value: &str) -> bool {
    let shaped = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    shaped && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Classify a `format` keyword value.
pub fn lookup(name: &str) -> FormatSupport {
    if let Some(format) = Format::from_name(name) {
        FormatSupport::Validated(format)
    } else if PATH_FORMATS.contains(&name) {
        FormatSupport::PathKind
    } else {
        FormatSupport::Unknown
    }
}

/// True for every format name the registry knows, validated or path-kind.
pub fn is_supported(name: &str) -> bool {
    lookup(name) != FormatSupport::Unknown
}

/// Every supported format name.
pub fn supported_names() -> impl Iterator<Item = &'static str> {
    VALIDATED
        .into_iter()
        .map(Format::name)
        .chain(PATH_FORMATS)
}
