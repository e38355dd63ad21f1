//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use picsort::core::digest::{digest_reader, DigestKind};
use std::io::Cursor;

pub const XMP_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:crs="http://ns.adobe.com/camera-raw-settings/1.0/"
    crs:RawFileName="photo.cr2"
    crs:Exposure2012="EXPOSURE"/>
 </rdf:RDF>
</x:xmpmeta>
"#;

fn ascii(tag: Tag, value: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![value.as_bytes().to_vec()]),
    }
}

/// A TIFF-container picture with camera model and capture date.
///
/// `salt` is appended after the EXIF block so otherwise identical pictures
/// can get different digests.
pub fn picture_with_exif(model: &str, taken: &str, salt: &[u8]) -> Vec<u8> {
    let model = ascii(Tag::Model, model);
    let date = ascii(Tag::DateTimeOriginal, taken);

    let mut writer = Writer::new();
    writer.push_field(&model);
    writer.push_field(&date);

    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();

    let mut bytes = buf.into_inner();
    bytes.extend_from_slice(salt);
    bytes
}

/// A sidecar whose exposure value identifies which copy it came from
pub fn sidecar(exposure: &str) -> String {
    XMP_TEMPLATE.replace("EXPOSURE", exposure)
}

pub fn hex_digest(bytes: &[u8], kind: DigestKind) -> String {
    digest_reader(bytes, kind).unwrap().to_string()
}
