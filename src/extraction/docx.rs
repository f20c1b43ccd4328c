//! Raw text from Office Open XML word-processing packages.
//!
//! A `.docx` file is a ZIP archive; the body lives in `word/document.xml`. Only run text
//! (`w:t`) is kept, with tabs, explicit breaks, and paragraph ends mapped to whitespace.
//! Formatting, headers, footers, and comments are ignored.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use thiserror::Error;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub(super) enum PackageError {
    #[error("invalid package archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("could not read word/document.xml: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub(super) fn raw_text(bytes: &[u8]) -> Result<String, PackageError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    Ok(document_text(&xml)?.trim().to_string())
}

fn document_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(element) if element.local_name().as_ref() == b"t" => in_run_text = true,
            Event::End(element) => match element.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(element) => match element.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" | b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(content) if in_run_text => text.push_str(&content.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Hücre</w:t></w:r><w:r><w:t xml:space="preserve"> Bölünmesi</w:t></w:r></w:p>
    <w:p><w:r><w:t>Mitoz</w:t><w:tab/><w:t>&amp; mayoz</w:t><w:br/><w:t>iki türdür.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn package(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in entries {
            writer.start_file(*name, options).expect("start entry");
            writer.write_all(contents.as_bytes()).expect("write entry");
        }
        writer.finish().expect("finish archive").into_inner()
    }

    #[test]
    fn extracts_run_text_with_structure_whitespace() {
        let bytes = package(&[(DOCUMENT_PART, DOCUMENT_XML)]);
        let text = raw_text(&bytes).expect("text");
        assert_eq!(text, "Hücre Bölünmesi\nMitoz\t& mayoz\niki türdür.");
    }

    #[test]
    fn missing_document_part_is_an_error() {
        let bytes = package(&[("word/styles.xml", "<w:styles/>")]);
        assert!(matches!(raw_text(&bytes), Err(PackageError::Archive(_))));
    }

    #[test]
    fn non_zip_input_is_an_error() {
        assert!(raw_text(b"plain bytes, not a package").is_err());
    }
}
