use serde::Serialize;

use crate::xmlrpc::{Member, Param, Scalar};

/// TTL used when a record is added without one.
pub const DEFAULT_TTL: i64 = 3600;

/// A zone record as the API describes it.
///
/// `id` is 0 for a record that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "type")]
    pub record_type: String,
    pub ttl: i64,
    pub priority: i64,
    pub rdata: String,
    pub id: i64,
}

impl Record {
    pub fn new(record_type: impl Into<String>, rdata: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            rdata: rdata.into(),
            ..Default::default()
        }
    }

    pub fn txt(rdata: impl Into<String>) -> Self {
        Self {
            ttl: DEFAULT_TTL,
            ..Self::new("TXT", rdata)
        }
    }

    /// The TTL to send, substituting the default for an unset one.
    pub fn effective_ttl(&self) -> i64 {
        if self.ttl == 0 {
            DEFAULT_TTL
        } else {
            self.ttl
        }
    }

    /// The record struct parameter of `addZoneRecord`.
    pub(crate) fn to_param(&self) -> Param {
        Param::Struct(vec![
            Member::string("type", self.record_type.as_str()),
            Member::int("ttl", self.effective_ttl()),
            Member::int("priority", self.priority),
            Member::string("rdata", self.rdata.as_str()),
            Member::int("record_id", self.id),
        ])
    }

    /// Assigns one decoded struct member. Unknown names, and known names
    /// carrying the other scalar type, are ignored.
    pub(crate) fn set_member(&mut self, name: &str, value: Scalar) {
        match (name, value) {
            ("type", Scalar::String(s)) => self.record_type = s,
            ("rdata", Scalar::String(s)) => self.rdata = s,
            ("record_id", Scalar::Int(i)) => self.id = i,
            ("ttl", Scalar::Int(i)) => self.ttl = i,
            ("priority", Scalar::Int(i)) => self.priority = i,
            _ => {}
        }
    }
}
