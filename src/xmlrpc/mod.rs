//! The small subset of XML-RPC the zone API speaks: string and int
//! scalars, and flat structs of them.

pub mod decode;
pub mod encode;

pub use decode::{decode, Decoded, DecodeError, RecordList, Shape, StringValue};
pub use encode::encode;

/// A scalar XML-RPC value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    String(String),
    Int(i64),
}

/// A named struct member. Members are written in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: &'static str,
    pub value: Scalar,
}

impl Member {
    pub fn string(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Scalar::String(value.into()),
        }
    }

    pub fn int(name: &'static str, value: i64) -> Self {
        Self {
            name,
            value: Scalar::Int(value),
        }
    }
}

/// One positional parameter of a method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    String(String),
    Int(i64),
    Struct(Vec<Member>),
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::String(value.to_string())
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method_name: &'static str,
    pub params: Vec<Param>,
}

impl MethodCall {
    pub fn new(method_name: &'static str) -> Self {
        Self {
            method_name,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }
}
