//! Streaming decoder for `methodResponse` documents.
//!
//! The body is read once with a pull parser. Every element end is handed to
//! the requested [`Shape`] and to the fault collector together with the path
//! of local element names from the document root, so one pass can pick up
//! both a result and a `<fault>`.

use thiserror::Error;
use xml::reader::{EventReader, XmlEvent};

use super::Scalar;
use crate::error::RpcError;
use crate::record::Record;

const ROOT: &str = "methodResponse";
const STRING_RESULT: &[&str] = &[ROOT, "params", "param", "value", "string"];
const RECORD_STRUCT: &[&str] = &[
    ROOT, "params", "param", "value", "array", "data", "value", "struct",
];
const FAULT_STRUCT: &[&str] = &[ROOT, "fault", "value", "struct"];

const FAULT_CODE: &str = "faultCode";
const FAULT_STRING: &str = "faultString";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("xml: {0}")]
    Xml(#[from] xml::reader::Error),

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    #[error("invalid int value {0:?}")]
    InvalidInt(String),
}

fn path_is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path_starts_with(path, expected)
}

fn path_starts_with(path: &[String], prefix: &[&str]) -> bool {
    path.len() >= prefix.len() && path.iter().zip(prefix).all(|(a, b)| a == b)
}

/// Where the member reader is between a `<name>` and its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum MemberState {
    #[default]
    AwaitingName,
    AwaitingValue(String),
}

/// Pairs each struct member's `<name>` with the scalar value that follows.
///
/// Values seen while no name is pending are dropped, and so are elements
/// other than `name`, `string`, `int` and `i4`.
#[derive(Debug, Default)]
pub(crate) struct MemberReader {
    state: MemberState,
}

impl MemberReader {
    /// Feeds the end of an element `element` whose text content was `text`.
    pub(crate) fn element(
        &mut self,
        element: &str,
        text: &str,
    ) -> Result<Option<(String, Scalar)>, DecodeError> {
        let value = match element {
            "name" => {
                self.state = MemberState::AwaitingValue(text.trim().to_string());
                return Ok(None);
            }
            "string" => Scalar::String(text.trim().to_string()),
            "int" | "i4" => Scalar::Int(parse_int(text)?),
            _ => return Ok(None),
        };

        match std::mem::take(&mut self.state) {
            MemberState::AwaitingValue(name) => Ok(Some((name, value))),
            MemberState::AwaitingName => Ok(None),
        }
    }
}

fn parse_int(text: &str) -> Result<i64, DecodeError> {
    let text = text.trim();
    text.parse()
        .map_err(|_| DecodeError::InvalidInt(text.to_string()))
}

/// A result shape that can be collected from a response stream.
pub trait Shape: Default {
    /// Called after an element named by the last entry of `path` opens.
    fn start(&mut self, _path: &[String]) {}

    /// Called when the element named by the last entry of `path` closes,
    /// with the text it directly contained.
    fn end(&mut self, path: &[String], text: &str) -> Result<(), DecodeError>;
}

/// A single string result, as returned by the status-bearing calls.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StringValue(pub String);

impl Shape for StringValue {
    fn end(&mut self, path: &[String], text: &str) -> Result<(), DecodeError> {
        if path_is(path, STRING_RESULT) {
            self.0 = text.to_string();
        }
        Ok(())
    }
}

/// An array of record structs.
#[derive(Debug, Default)]
pub struct RecordList {
    pub records: Vec<Record>,
    current: Option<(Record, MemberReader)>,
}

impl Shape for RecordList {
    fn start(&mut self, path: &[String]) {
        if path_is(path, RECORD_STRUCT) {
            self.current = Some((Record::default(), MemberReader::default()));
        }
    }

    fn end(&mut self, path: &[String], text: &str) -> Result<(), DecodeError> {
        if path_is(path, RECORD_STRUCT) {
            if let Some((record, _)) = self.current.take() {
                self.records.push(record);
            }
        } else if path_starts_with(path, RECORD_STRUCT) {
            if let (Some((record, reader)), Some(element)) = (self.current.as_mut(), path.last()) {
                if let Some((name, value)) = reader.element(element, text)? {
                    record.set_member(&name, value);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FaultCollector {
    reader: MemberReader,
    code: i64,
    message: String,
}

impl FaultCollector {
    fn end(&mut self, path: &[String], text: &str) -> Result<(), DecodeError> {
        if path.len() <= FAULT_STRUCT.len() || !path_starts_with(path, FAULT_STRUCT) {
            return Ok(());
        }
        let Some(element) = path.last() else {
            return Ok(());
        };

        match self.reader.element(element, text)? {
            Some((name, Scalar::Int(code))) if name == FAULT_CODE => self.code = code,
            Some((name, Scalar::String(message))) if name == FAULT_STRING => {
                self.message = message
            }
            _ => {}
        }
        Ok(())
    }

    fn into_fault(self) -> Option<RpcError> {
        (self.code != 0).then(|| RpcError {
            code: self.code,
            message: self.message.trim().to_string(),
        })
    }
}

/// A decoded response: the requested shape plus any XML-RPC fault.
#[derive(Debug)]
pub struct Decoded<S> {
    pub value: S,
    pub fault: Option<RpcError>,
}

/// Decodes a `methodResponse` body into shape `S`.
///
/// Unknown elements anywhere below the root are skipped. Only a document
/// that is not well-formed, has another root, or carries a non-numeric int
/// where one is read is an error.
pub fn decode<S: Shape>(body: &[u8]) -> Result<Decoded<S>, DecodeError> {
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut value = S::default();
    let mut fault = FaultCollector::default();

    for event in EventReader::new(body) {
        match event? {
            XmlEvent::StartElement { name, .. } => {
                if path.is_empty() && name.local_name != ROOT {
                    return Err(DecodeError::UnexpectedRoot(name.local_name));
                }
                path.push(name.local_name);
                text.clear();
                value.start(&path);
            }
            XmlEvent::Characters(s) | XmlEvent::CData(s) | XmlEvent::Whitespace(s) => {
                text.push_str(&s);
            }
            XmlEvent::EndElement { .. } => {
                value.end(&path, &text)?;
                fault.end(&path, &text)?;
                path.pop();
                text.clear();
            }
            _ => {}
        }
    }

    Ok(Decoded {
        value,
        fault: fault.into_fault(),
    })
}
