use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use quick_xml::{
    events::{BytesDecl, BytesText, Event},
    Writer,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ExportError, supply_chain::tables::format_number, utils::xml_utils::XMLWriterWrapper,
};

use super::petri_net_struct::{Location, PetriNet, Position};

/// Settings of the `<net>` element and the output formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PnmlOptions {
    /// `id` attribute of `<net>`
    pub net_id: String,
    /// `type` attribute of `<net>`
    pub net_type: String,
    /// Spaces per nesting level (`0` writes everything on one line)
    pub indent: usize,
}

impl Default for PnmlOptions {
    fn default() -> Self {
        Self {
            net_id: "net1".into(),
            net_type: "http://www.pnml.org/version-2009/grammar/ptnet".into(),
            indent: 2,
        }
    }
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> std::io::Result<()> {
    writer
        .create_element(name)
        .write_inner_content(|writer| {
            writer
                .create_element("text")
                .write_text_content(BytesText::new(text))?;
            Ok(())
        })?;
    Ok(())
}

fn write_position<W: Write>(writer: &mut Writer<W>, position: Position) -> std::io::Result<()> {
    writer
        .create_element("position")
        .with_attribute(("x", position.x.to_string().as_str()))
        .with_attribute(("y", position.y.to_string().as_str()))
        .write_empty()?;
    Ok(())
}

fn write_graphics<W: Write>(writer: &mut Writer<W>, positions: &[Position]) -> std::io::Result<()> {
    writer
        .create_element("graphics")
        .write_inner_content(|writer| {
            for position in positions {
                write_position(writer, *position)?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_location<W: Write>(writer: &mut Writer<W>, location: &Location) -> std::io::Result<()> {
    writer
        .create_element("attribute")
        .with_attribute(("name", "location"))
        .write_inner_content(|writer| {
            for (name, value) in [
                ("longitude", location.longitude),
                ("latitude", location.latitude),
            ] {
                if let Some(value) = value {
                    writer
                        .create_element(name)
                        .write_text_content(BytesText::new(&format_number(value)))?;
                }
            }
            Ok(())
        })?;
    Ok(())
}

///
/// Export a [`PetriNet`] to the PNML format and write the result to the provided writer which implements into [`quick_xml::Writer`] / [`std::io::Write`]
///
/// Writes places, transitions and arcs in insertion order, each with its `graphics`.
/// Plain writers are not indented; see [`XMLWriterWrapper::for_pnml`].
pub fn export_petri_net_to_pnml<'a, W>(
    pn: &PetriNet,
    options: &PnmlOptions,
    into_writer: impl Into<XMLWriterWrapper<'a, W>>,
) -> Result<(), ExportError>
where
    W: Write + 'a,
{
    let mut xml_writer: XMLWriterWrapper<'_, W> = into_writer.into();
    let writer = xml_writer.as_mut();
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer
        .create_element("pnml")
        .write_inner_content(|writer| {
            writer
                .create_element("net")
                .with_attribute(("id", options.net_id.as_str()))
                .with_attribute(("type", options.net_type.as_str()))
                .write_inner_content(|writer| {
                    for (id, place) in &pn.places {
                        writer
                            .create_element("place")
                            .with_attribute(("id", id.as_str()))
                            .write_inner_content(|writer| {
                                write_text_element(writer, "name", &place.label)?;
                                if let Some(marking) = place.marking_text() {
                                    write_text_element(writer, "initialMarking", &marking)?;
                                }
                                write_graphics(writer, &[place.position])?;
                                if let Some(location) = &place.location {
                                    write_location(writer, location)?;
                                }
                                Ok(())
                            })?;
                    }
                    for (id, transition) in &pn.transitions {
                        writer
                            .create_element("transition")
                            .with_attribute(("id", id.as_str()))
                            .write_inner_content(|writer| {
                                write_text_element(writer, "name", &transition.label)?;
                                write_graphics(writer, &[transition.position])?;
                                Ok(())
                            })?;
                    }
                    for (id, arc) in &pn.arcs {
                        writer
                            .create_element("arc")
                            .with_attribute(("id", id.as_str()))
                            .with_attribute(("source", arc.from_to.source()))
                            .with_attribute(("target", arc.from_to.target()))
                            .write_inner_content(|writer| {
                                write_graphics(writer, &arc.graphics)?;
                                if let Some(inscription) = arc.inscription_text() {
                                    write_text_element(writer, "inscription", &inscription)?;
                                }
                                Ok(())
                            })?;
                    }
                    // </net>
                    Ok(())
                })?;
            Ok(())
        })?;
    writer.get_mut().flush()?;
    Ok(())
}

/// Export a [`PetriNet`] to a `.pnml` file (specified through path)
///
/// An existing file is overwritten.
pub fn export_petri_net_to_pnml_path<P: AsRef<Path>>(
    pn: &PetriNet,
    options: &PnmlOptions,
    path: P,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    export_petri_net_to_pnml(
        pn,
        options,
        XMLWriterWrapper::for_pnml(BufWriter::new(file), options),
    )
}

/// Export a [`PetriNet`] to an in-memory PNML document
pub fn export_petri_net_to_pnml_string(
    pn: &PetriNet,
    options: &PnmlOptions,
) -> Result<String, ExportError> {
    let mut bytes = Vec::new();
    export_petri_net_to_pnml(
        pn,
        options,
        XMLWriterWrapper::for_pnml(&mut bytes, options),
    )?;
    // quick-xml only writes the UTF-8 it was given
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
