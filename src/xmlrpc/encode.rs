use std::io::Write;

use xml::common::XmlVersion;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use super::{Member, MethodCall, Param, Scalar};

type Result<T> = std::result::Result<T, xml::writer::Error>;

/// Something that renders itself as the content of a `<value>` element.
trait WriteValue {
    fn write_value<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<()>;
}

fn text_element<W: Write>(writer: &mut EventWriter<W>, name: &str, text: &str) -> Result<()> {
    writer.write(XmlEvent::start_element(name))?;
    writer.write(XmlEvent::characters(text))?;
    writer.write(XmlEvent::end_element())
}

impl WriteValue for Scalar {
    fn write_value<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<()> {
        match self {
            Scalar::String(s) => text_element(writer, "string", s),
            Scalar::Int(i) => text_element(writer, "int", &i.to_string()),
        }
    }
}

impl WriteValue for Member {
    fn write_value<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<()> {
        writer.write(XmlEvent::start_element("member"))?;
        text_element(writer, "name", self.name)?;
        writer.write(XmlEvent::start_element("value"))?;
        self.value.write_value(writer)?;
        writer.write(XmlEvent::end_element())?;
        writer.write(XmlEvent::end_element())
    }
}

impl WriteValue for Param {
    fn write_value<W: Write>(&self, writer: &mut EventWriter<W>) -> Result<()> {
        match self {
            Param::String(s) => text_element(writer, "string", s),
            Param::Int(i) => text_element(writer, "int", &i.to_string()),
            Param::Struct(members) => {
                writer.write(XmlEvent::start_element("struct"))?;
                for member in members {
                    member.write_value(writer)?;
                }
                writer.write(XmlEvent::end_element())
            }
        }
    }
}

/// Serializes a method call into a complete XML-RPC request document.
pub fn encode(call: &MethodCall) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .create_writer(&mut body);

    writer.write(XmlEvent::StartDocument {
        version: XmlVersion::Version10,
        encoding: Some("UTF-8"),
        standalone: None,
    })?;
    writer.write(XmlEvent::start_element("methodCall"))?;
    text_element(&mut writer, "methodName", call.method_name)?;

    writer.write(XmlEvent::start_element("params"))?;
    for param in &call.params {
        writer.write(XmlEvent::start_element("param"))?;
        writer.write(XmlEvent::start_element("value"))?;
        param.write_value(&mut writer)?;
        writer.write(XmlEvent::end_element())?;
        writer.write(XmlEvent::end_element())?;
    }
    writer.write(XmlEvent::end_element())?;
    writer.write(XmlEvent::end_element())?;

    drop(writer);
    Ok(body)
}
