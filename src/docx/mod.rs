//! WordprocessingML (.docx) to flow document conversion.
//!
//! [`DocxConverter`] owns a [`Package`], streams its main document part
//! through the walker once, and returns the flow tree together with the
//! label registry.

mod builder;
mod options;
mod properties;
mod row_span;

pub use builder::{ContentMode, DocumentBuilder};
pub use options::{ConvertOptions, DEFAULT_FONT_SIZE};
pub use properties::{
    half_points_to_size, parse_alignment, parse_baseline, parse_color, parse_highlight,
    parse_on_off, twips_to_pixels, CellMerge, ControlProperties, PropertyReader,
    BASELINE_SHIFT_SCALE, DOUBLE_STRIKE_OFFSET, DOUBLE_UNDERLINE_OFFSET,
};
pub use row_span::{RowSpanGrid, MAX_GRID_COLUMNS};

use std::path::Path;

use crate::container::{OoxmlContainer, Package};
use crate::error::Result;
use crate::model::ConvertedDocument;
use crate::reader::{self, NameTable, Vocabulary};

/// Converter for Word documents.
pub struct DocxConverter<P = OoxmlContainer> {
    package: P,
    options: ConvertOptions,
}

impl DocxConverter<OoxmlContainer> {
    /// Open a .docx file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docxflow::docx::DocxConverter;
    ///
    /// let doc = DocxConverter::open("report.docx")?.convert()?;
    /// println!("{} blocks", doc.blocks().len());
    /// # Ok::<(), docxflow::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_package(OoxmlContainer::open(path)?))
    }

    /// Create a converter from the bytes of a .docx file.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Ok(Self::from_package(OoxmlContainer::from_bytes(data)?))
    }
}

impl<P: Package> DocxConverter<P> {
    /// Create a converter over any package implementation.
    pub fn from_package(package: P) -> Self {
        Self {
            package,
            options: ConvertOptions::default(),
        }
    }

    /// Replace the conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn package(&self) -> &P {
        &self.package
    }

    /// Convert the main document part in a single forward pass.
    ///
    /// Malformed XML aborts the conversion; no partial tree is returned.
    pub fn convert(&self) -> Result<ConvertedDocument> {
        let mut names = NameTable::new();
        let mut builder = DocumentBuilder::new(&self.package, self.options.clone(), &mut names);
        let vocab = Vocabulary::new(names);

        let source = self.package.main_part()?;
        reader::read(source, vocab, &mut builder)?;
        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Relationship;
    use crate::error::Error;
    use crate::model::{LabelKind, Node, NodeKind, TextAlignment};
    use crate::reader::WORDML_NAMESPACE;
    use std::collections::HashMap;
    use std::io::{BufRead, Cursor};

    /// Package over an in-memory main part.
    struct MemoryPackage {
        xml: String,
        relationships: HashMap<String, Relationship>,
    }

    impl MemoryPackage {
        fn new(body: &str) -> Self {
            Self {
                xml: format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="{WORDML_NAMESPACE}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{body}</w:body></w:document>"#
                ),
                relationships: HashMap::new(),
            }
        }

        fn with_relationship(mut self, id: &str, target: &str, external: bool) -> Self {
            self.relationships.insert(
                id.to_string(),
                Relationship {
                    id: id.to_string(),
                    rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink"
                        .to_string(),
                    target: target.to_string(),
                    external,
                },
            );
            self
        }
    }

    impl Package for MemoryPackage {
        fn main_part(&self) -> Result<Box<dyn BufRead + '_>> {
            Ok(Box::new(Cursor::new(self.xml.as_bytes())))
        }

        fn relationship(&self, id: &str) -> Option<&Relationship> {
            self.relationships.get(id)
        }
    }

    fn convert(package: MemoryPackage) -> ConvertedDocument {
        DocxConverter::from_package(package).convert().unwrap()
    }

    fn convert_body(body: &str) -> ConvertedDocument {
        convert(MemoryPackage::new(body))
    }

    fn kinds(node: &Node) -> Vec<&'static str> {
        node.children
            .iter()
            .map(|child| match child.kind {
                NodeKind::Paragraph(_) => "p",
                NodeKind::Span(_) => "span",
                NodeKind::Hyperlink { .. } => "link",
                NodeKind::LineBreak => "br",
                NodeKind::Tab => "tab",
                NodeKind::Text { .. } => "text",
                NodeKind::Table => "table",
                NodeKind::TableRow => "row",
                NodeKind::TableCell(_) => "cell",
                NodeKind::BlockPlaceholder { .. } => "block",
                NodeKind::InlinePlaceholder { .. } => "inline",
                NodeKind::Document => "doc",
            })
            .collect()
    }

    #[test]
    fn test_paragraph_runs_and_leaves() {
        let doc = convert_body(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>
                 <w:r><w:rPr><w:b/></w:rPr><w:t>Hello</w:t><w:tab/><w:t xml:space="preserve"> world</w:t><w:br/></w:r>
               </w:p>"#,
        );
        assert_eq!(kinds(&doc.document), vec!["p"]);
        let paragraph = &doc.document.children[0];
        assert_eq!(
            paragraph.paragraph_style().unwrap().alignment,
            Some(TextAlignment::Center)
        );
        assert_eq!(kinds(paragraph), vec!["span"]);
        let span = &paragraph.children[0];
        assert_eq!(span.run_style().unwrap().bold, Some(true));
        assert_eq!(kinds(span), vec!["text", "tab", "text", "br"]);
        assert_eq!(doc.document.plain_text(), "Hello\t world\n");
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let doc = convert_body(
            r#"<w:bookmarkStart w:id="0"/><w:p><w:proofErr/><w:r><w:t>a</w:t></w:r></w:p>
               <w:sectPr><w:pgSz/></w:sectPr>"#,
        );
        assert_eq!(kinds(&doc.document), vec!["p"]);
        assert_eq!(doc.document.plain_text(), "a");
    }

    #[test]
    fn test_external_hyperlink() {
        let package = MemoryPackage::new(
            r#"<w:p><w:hyperlink r:id="rId5"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>"#,
        )
        .with_relationship("rId5", "https://example.com/", true);
        let doc = convert(package);

        assert!(doc.has_hyperlinks);
        let paragraph = &doc.document.children[0];
        assert_eq!(kinds(paragraph), vec!["link"]);
        assert_eq!(
            paragraph.children[0].kind,
            NodeKind::Hyperlink {
                target: "https://example.com/".to_string()
            }
        );
        assert_eq!(paragraph.plain_text(), "site");
    }

    #[test]
    fn test_internal_hyperlink_is_inline_content() {
        let package = MemoryPackage::new(
            r#"<w:p><w:hyperlink r:id="rId5"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>"#,
        )
        .with_relationship("rId5", "media/other.xml", false);
        let doc = convert(package);

        assert!(!doc.has_hyperlinks);
        assert_eq!(kinds(&doc.document.children[0]), vec!["span"]);
    }

    #[test]
    fn test_unresolved_and_anchor_hyperlinks() {
        let doc = convert_body(
            r#"<w:p><w:hyperlink r:id="rId404"><w:r><w:t>a</w:t></w:r></w:hyperlink>
               <w:hyperlink w:anchor="top"><w:r><w:t>b</w:t></w:r></w:hyperlink></w:p>"#,
        );
        assert!(!doc.has_hyperlinks);
        assert_eq!(kinds(&doc.document.children[0]), vec!["span", "span"]);
        assert_eq!(doc.document.plain_text(), "ab");
    }

    #[test]
    fn test_block_control_is_opaque() {
        let doc = convert_body(
            r#"<w:sdt><w:sdtPr><w:alias w:val="Name"/><w:tag w:val="text_name"/></w:sdtPr>
                 <w:sdtContent><w:p><w:r><w:t>hidden</w:t></w:r></w:p></w:sdtContent></w:sdt>
               <w:p><w:r><w:t>shown</w:t></w:r></w:p>"#,
        );
        assert_eq!(kinds(&doc.document), vec!["block", "p"]);
        let placeholder = &doc.document.children[0];
        assert_eq!(placeholder.placeholder_name(), Some("text_name"));
        assert!(placeholder.children.is_empty());
        assert_eq!(doc.document.plain_text(), "shown");

        let label = doc.labels.get("text_name").unwrap();
        assert_eq!(label.kind, LabelKind::Text);
        assert_eq!(label.alias.as_deref(), Some("Name"));
    }

    #[test]
    fn test_hyperlink_inside_control_is_seen_but_not_built() {
        let package = MemoryPackage::new(
            r#"<w:sdt><w:sdtPr><w:tag w:val="text_link"/></w:sdtPr><w:sdtContent>
                 <w:p><w:hyperlink r:id="rId3"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>
               </w:sdtContent></w:sdt>"#,
        )
        .with_relationship("rId3", "https://example.com", true);
        let doc = convert(package);

        assert!(doc.has_hyperlinks);
        assert!(doc.hyperlink_targets().is_empty());
    }

    #[test]
    fn test_inline_control_inside_paragraph() {
        let doc = convert_body(
            r#"<w:p><w:r><w:t>before </w:t></w:r>
                 <w:sdt><w:sdtPr><w:tag w:val="text_inline"/></w:sdtPr>
                   <w:sdtContent><w:r><w:t>hidden</w:t></w:r></w:sdtContent></w:sdt>
                 <w:r><w:t> after</w:t></w:r></w:p>"#,
        );
        let paragraph = &doc.document.children[0];
        assert_eq!(kinds(paragraph), vec!["span", "inline", "span"]);
        assert_eq!(paragraph.children[1].placeholder_name(), Some("text_inline"));
        assert_eq!(paragraph.plain_text(), "before  after");
    }

    #[test]
    fn test_nested_labels_from_control_content() {
        let doc = convert_body(
            r#"<w:sdt><w:sdtPr><w:tag w:val="table_orders"/></w:sdtPr><w:sdtContent>
                 <w:tbl><w:tr><w:tc>
                   <w:sdt><w:sdtPr><w:tag w:val="col_orders"/></w:sdtPr><w:sdtContent><w:p/></w:sdtContent></w:sdt>
                 </w:tc></w:tr></w:tbl>
               </w:sdtContent></w:sdt>
               <w:sdt><w:sdtPr><w:tag w:val="item_missing"/></w:sdtPr><w:sdtContent><w:p/></w:sdtContent></w:sdt>"#,
        );
        assert_eq!(kinds(&doc.document), vec!["block", "block"]);
        assert_eq!(doc.labels.len(), 1);
        let table = doc.labels.get("table_orders").unwrap();
        assert_eq!(table.children.len(), 1);
        assert_eq!(table.children[0].kind, LabelKind::Col);
        assert_eq!(doc.document.children[1].placeholder_name(), Some("item_missing"));
    }

    #[test]
    fn test_table_cells_and_borders() {
        let doc = convert_body(
            r#"<w:tbl><w:tblPr/><w:tblGrid/>
                 <w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>wide</w:t></w:r></w:p></w:tc></w:tr>
                 <w:tr><w:tc><w:p/></w:tc><w:tc><w:p/></w:tc></w:tr>
               </w:tbl>"#,
        );
        let table = &doc.document.children[0];
        assert_eq!(kinds(table), vec!["row", "row"]);
        let wide = &table.children[0].children[0];
        let props = wide.cell_props().unwrap();
        assert_eq!(props.column_span, 2);
        assert_eq!(props.row_span, 1);
        assert!(props.border.is_some());
        assert_eq!(table.children[1].children.len(), 2);
    }

    #[test]
    fn test_cell_borders_can_be_disabled() {
        let doc = DocxConverter::from_package(MemoryPackage::new(
            "<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>",
        ))
        .with_options(ConvertOptions::new().with_cell_borders(false))
        .convert()
        .unwrap();
        let cell = &doc.document.children[0].children[0].children[0];
        assert_eq!(cell.cell_props().unwrap().border, None);
    }

    #[test]
    fn test_vertical_merge_is_normalized() {
        let doc = convert_body(
            r#"<w:tbl>
                 <w:tr><w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc>
                       <w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr>
                 <w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p><w:r><w:t>A2</w:t></w:r></w:p></w:tc>
                       <w:tc><w:p><w:r><w:t>C</w:t></w:r></w:p></w:tc></w:tr>
               </w:tbl>"#,
        );
        let table = &doc.document.children[0];
        let owner = &table.children[0].children[0];
        assert_eq!(owner.cell_props().unwrap().row_span, 2);
        assert_eq!(owner.children.len(), 2);
        assert_eq!(owner.plain_text(), "AA2");
        assert_eq!(table.children[1].children.len(), 1);
        assert_eq!(table.children[1].plain_text(), "C");
    }

    #[test]
    fn test_nested_tables_have_their_own_grid() {
        let doc = convert_body(
            r#"<w:tbl>
                 <w:tr><w:tc><w:tbl>
                   <w:tr><w:tc><w:p/></w:tc></w:tr>
                   <w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc></w:tr>
                 </w:tbl><w:p/></w:tc></w:tr>
                 <w:tr><w:tc><w:p/></w:tc></w:tr>
               </w:tbl>"#,
        );
        let outer = &doc.document.children[0];
        assert_eq!(outer.children.len(), 2);
        let inner = &outer.children[0].children[0].children[0];
        assert_eq!(inner.kind, NodeKind::Table);
        assert_eq!(inner.children[0].children[0].cell_props().unwrap().row_span, 2);
        assert!(inner.children[1].children.is_empty());
        assert_eq!(outer.children[1].children.len(), 1);
    }

    #[test]
    fn test_first_row_continuation_is_fatal() {
        let package = MemoryPackage::new(
            r#"<w:tbl><w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc></w:tr></w:tbl>"#,
        );
        let result = DocxConverter::from_package(package).convert();
        assert!(matches!(result, Err(Error::InvalidTable(_))));
    }

    #[test]
    fn test_huge_grid_span_is_rejected() {
        let package = MemoryPackage::new(
            r#"<w:tbl><w:tr><w:tc><w:tcPr><w:gridSpan w:val="4294967295"/></w:tcPr><w:p/></w:tc></w:tr></w:tbl>"#,
        );
        let result = DocxConverter::from_package(package).convert();
        assert!(matches!(result, Err(Error::InvalidTable(_))));
    }

    #[test]
    fn test_first_row_continuation_inside_control_is_fatal() {
        let package = MemoryPackage::new(
            r#"<w:sdt><w:sdtPr><w:tag w:val="table_rows"/></w:sdtPr><w:sdtContent>
                 <w:tbl><w:tr><w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc></w:tr></w:tbl>
               </w:sdtContent></w:sdt>"#,
        );
        let result = DocxConverter::from_package(package).convert();
        assert!(matches!(result, Err(Error::InvalidTable(_))));
    }

    #[test]
    fn test_malformed_xml_is_fatal() {
        let package = MemoryPackage::new("<w:p><w:r></w:p>");
        assert!(DocxConverter::from_package(package).convert().is_err());
    }

    #[test]
    fn test_missing_body_gives_empty_document() {
        let package = MemoryPackage {
            xml: format!(r#"<w:document xmlns:w="{WORDML_NAMESPACE}"/>"#),
            relationships: HashMap::new(),
        };
        let doc = convert(package);
        assert!(doc.is_empty());
        assert!(doc.labels.is_empty());
    }

    #[test]
    fn test_run_font_size_order() {
        let doc = convert_body(
            r#"<w:p><w:r><w:rPr><w:vertAlign w:val="subscript"/><w:sz w:val="30"/></w:rPr><w:t>a</w:t></w:r>
                    <w:r><w:rPr><w:sz w:val="30"/><w:vertAlign w:val="subscript"/></w:rPr><w:t>b</w:t></w:r></w:p>"#,
        );
        let paragraph = &doc.document.children[0];
        let first = paragraph.children[0].run_style().unwrap().font_size.unwrap();
        let second = paragraph.children[1].run_style().unwrap().font_size.unwrap();
        assert!((first - 20.0).abs() < 1e-9);
        assert!((second - 13.0).abs() < 1e-9);
    }
}
