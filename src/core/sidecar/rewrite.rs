//! Rewrites the picture reference inside an XMP sidecar.
//!
//! The document is streamed event by event through quick-xml. Only the
//! `crs:RawFileName` attribute of the first `rdf:Description` element
//! changes; every other event is written back untouched.

use crate::error::SidecarError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::path::Path;

const DESCRIPTION_ELEMENT: &[u8] = b"rdf:Description";
const RAW_FILE_NAME_ATTRIBUTE: &[u8] = b"crs:RawFileName";

/// Read `source`, point it at `image_name` and write it to `destination`
pub fn rewrite_sidecar(
    source: &Path,
    destination: &Path,
    image_name: &str,
) -> Result<(), SidecarError> {
    let xml = fs::read_to_string(source).map_err(|e| SidecarError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;

    let patched = patch_raw_file_name(&xml, image_name, source)?;

    fs::write(destination, patched).map_err(|e| SidecarError::Io {
        path: destination.to_path_buf(),
        source: e,
    })
}

/// Replace the `crs:RawFileName` of the first `rdf:Description`.
///
/// `origin` is only used for error messages.
pub fn patch_raw_file_name(
    xml: &str,
    image_name: &str,
    origin: &Path,
) -> Result<String, SidecarError> {
    let parse_error = |reason: String| SidecarError::Parse {
        path: origin.to_path_buf(),
        reason,
    };

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut patched = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| parse_error(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        let event = match event {
            Event::Eof => break,
            Event::Start(e) if !patched && e.name().as_ref() == DESCRIPTION_ELEMENT => {
                patched = true;
                Event::Start(with_raw_file_name(&e, image_name, origin)?)
            }
            Event::Empty(e) if !patched && e.name().as_ref() == DESCRIPTION_ELEMENT => {
                patched = true;
                Event::Empty(with_raw_file_name(&e, image_name, origin)?)
            }
            other => other,
        };

        writer
            .write_event(event)
            .map_err(|e| parse_error(e.to_string()))?;
    }

    if !patched {
        return Err(SidecarError::MissingDescription {
            path: origin.to_path_buf(),
        });
    }

    String::from_utf8(writer.into_inner()).map_err(|e| parse_error(e.to_string()))
}

/// Copy of `element` with its raw file name replaced
fn with_raw_file_name(
    element: &BytesStart<'_>,
    image_name: &str,
    origin: &Path,
) -> Result<BytesStart<'static>, SidecarError> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut patched = BytesStart::new(name);
    let mut found = false;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| SidecarError::Parse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;

        if attr.key.as_ref() == RAW_FILE_NAME_ATTRIBUTE {
            found = true;
            patched.push_attribute(("crs:RawFileName", image_name));
        } else {
            patched.push_attribute(attr);
        }
    }

    if !found {
        return Err(SidecarError::MissingRawFileName {
            path: origin.to_path_buf(),
        });
    }

    Ok(patched)
}
