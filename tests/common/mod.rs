//! Synthetic .docx packages for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const WORDML: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const HYPERLINK_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Builder for an in-memory .docx archive.
pub struct DocxFixture {
    body: String,
    relationships: Vec<(String, String, bool)>,
    main_part: String,
    package_relationship: bool,
}

impl DocxFixture {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            relationships: Vec::new(),
            main_part: "word/document.xml".to_string(),
            package_relationship: true,
        }
    }

    /// Declare a hyperlink relationship on the main part.
    pub fn hyperlink(mut self, id: &str, target: &str, external: bool) -> Self {
        self.relationships
            .push((id.to_string(), target.to_string(), external));
        self
    }

    /// Store the main part under a different name.
    pub fn main_part(mut self, path: &str) -> Self {
        self.main_part = path.to_string();
        self
    }

    /// Leave `_rels/.rels` out of the package.
    pub fn without_package_relationship(mut self) -> Self {
        self.package_relationship = false;
        self
    }

    pub fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{WORDML}" xmlns:r="{RELATIONSHIPS}"><w:body>{}</w:body></w:document>"#,
            self.body
        )
    }

    fn relationships_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (id, target, external) in &self.relationships {
            let mode = if *external { r#" TargetMode="External""# } else { "" };
            xml.push_str(&format!(
                r#"<Relationship Id="{id}" Type="{HYPERLINK_TYPE}" Target="{target}"{mode}/>"#
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
</Types>"#,
        )
        .unwrap();

        if self.package_relationship {
            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="{}"/>
</Relationships>"#,
                    self.main_part
                )
                .as_bytes(),
            )
            .unwrap();
        }

        let (dir, file) = self
            .main_part
            .rsplit_once('/')
            .unwrap_or(("", self.main_part.as_str()));
        let rels_path = if dir.is_empty() {
            format!("_rels/{}.rels", file)
        } else {
            format!("{}/_rels/{}.rels", dir, file)
        };
        zip.start_file(rels_path, options).unwrap();
        zip.write_all(self.relationships_xml().as_bytes()).unwrap();

        zip.start_file(self.main_part.as_str(), options).unwrap();
        zip.write_all(self.document_xml().as_bytes()).unwrap();

        zip.finish().unwrap();
        buffer
    }
}

/// Paragraph with a single plain run.
pub fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
}

/// Table cell with optional merge properties.
pub fn cell(props: &str, text: &str) -> String {
    let props = if props.is_empty() {
        String::new()
    } else {
        format!("<w:tcPr>{}</w:tcPr>", props)
    };
    format!("<w:tc>{}{}</w:tc>", props, para(text))
}

pub fn row(cells: &[String]) -> String {
    format!("<w:tr>{}</w:tr>", cells.concat())
}

pub fn table(rows: &[String]) -> String {
    format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows.concat())
}

/// Block-level content control.
pub fn block_control(tag: &str, alias: Option<&str>, content: &str) -> String {
    let alias = alias
        .map(|a| format!(r#"<w:alias w:val="{}"/>"#, a))
        .unwrap_or_default();
    format!(
        r#"<w:sdt><w:sdtPr>{alias}<w:tag w:val="{tag}"/><w:id w:val="1"/></w:sdtPr><w:sdtContent>{content}</w:sdtContent></w:sdt>"#
    )
}

/// Install a test logger once; repeated calls are harmless.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
