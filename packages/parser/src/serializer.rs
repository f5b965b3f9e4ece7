use crate::ast::*;

/// Serializer converts the document tree back to markup text.
///
/// Structure and attribute order are canonical; whitespace between
/// structural tags is reformatted, text content is emitted verbatim
/// (entity-escaped). Parsing the output reproduces the same tree.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

/// Serialize a document with default indentation
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(), // 2 spaces
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Serialize a Document to markup text
    pub fn serialize(&mut self, doc: &Document) -> String {
        let mut output = String::new();

        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        output.push_str("<w:document>\n");
        self.indent_level = 1;

        if doc.track_revisions {
            self.push_line(&mut output, "<w:settings>");
            self.indent_level += 1;
            self.push_line(&mut output, "<w:trackRevisions/>");
            self.indent_level -= 1;
            self.push_line(&mut output, "</w:settings>");
        }

        self.push_line(&mut output, "<w:body>");
        self.indent_level += 1;
        for paragraph in &doc.paragraphs {
            self.serialize_paragraph(paragraph, &mut output);
        }
        self.indent_level -= 1;
        self.push_line(&mut output, "</w:body>");

        output.push_str("</w:document>\n");
        output
    }

    fn serialize_paragraph(&mut self, paragraph: &Paragraph, output: &mut String) {
        if paragraph.children.is_empty() && paragraph.style.is_none() {
            self.push_line(output, "<w:p/>");
            return;
        }

        self.push_line(output, "<w:p>");
        self.indent_level += 1;

        if let Some(style) = &paragraph.style {
            self.push_line(output, "<w:pPr>");
            self.indent_level += 1;
            self.push_line(
                output,
                &format!("<w:pStyle w:val=\"{}\"/>", escape_attr(style)),
            );
            self.indent_level -= 1;
            self.push_line(output, "</w:pPr>");
        }

        for node in &paragraph.children {
            self.serialize_node(node, output);
        }

        self.indent_level -= 1;
        self.push_line(output, "</w:p>");
    }

    fn serialize_node(&mut self, node: &Node, output: &mut String) {
        match node {
            Node::Run(run) => self.serialize_run(run, output),

            Node::Insertion(ins) => {
                self.push_line(
                    output,
                    &format!(
                        "<w:ins w:id=\"{}\" w:author=\"{}\" w:date=\"{}\">",
                        escape_attr(&ins.id),
                        escape_attr(&ins.author),
                        escape_attr(&ins.date),
                    ),
                );
                self.indent_level += 1;
                for run in &ins.runs {
                    self.serialize_run(run, output);
                }
                self.indent_level -= 1;
                self.push_line(output, "</w:ins>");
            }

            Node::Deletion(del) => {
                self.push_line(
                    output,
                    &format!(
                        "<w:del w:id=\"{}\" w:author=\"{}\" w:date=\"{}\">",
                        escape_attr(&del.id),
                        escape_attr(&del.author),
                        escape_attr(&del.date),
                    ),
                );
                self.indent_level += 1;
                for run in &del.runs {
                    self.push_line(
                        output,
                        &format!("<w:delText>{}</w:delText>", escape_text(&run.text)),
                    );
                }
                self.indent_level -= 1;
                self.push_line(output, "</w:del>");
            }
        }
    }

    fn serialize_run(&mut self, run: &Run, output: &mut String) {
        self.push_line(
            output,
            &format!("<w:r><w:t>{}</w:t></w:r>", escape_text(&run.text)),
        );
    }

    fn push_line(&self, output: &mut String, line: &str) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
        output.push_str(line);
        output.push('\n');
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn revision_paragraph() -> Document {
        let mut doc = Document::new();
        doc.track_revisions = true;

        let mut paragraph = Paragraph::with_style("Heading1");
        paragraph.children.push(Node::Deletion(DeletionNode {
            id: "1".to_string(),
            author: "AI_Reviewer".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![DeletedRun {
                text: "Intro".to_string(),
            }],
        }));
        paragraph.children.push(Node::Insertion(InsertionNode {
            id: "2".to_string(),
            author: "AI_Reviewer".to_string(),
            date: "2024-01-01T00:00:00Z".to_string(),
            runs: vec![Run {
                text: "Intro (Refined)".to_string(),
            }],
        }));
        doc.paragraphs.push(paragraph);
        doc
    }

    #[test]
    fn test_serialize_then_parse_restores_tree() {
        let doc = revision_paragraph();
        let markup = serialize(&doc);
        let reparsed = parse(&markup).unwrap();

        assert_eq!(doc, reparsed);
    }

    #[test]
    fn test_revision_attributes_present() {
        let markup = serialize(&revision_paragraph());

        assert!(markup.contains("<w:del w:id=\"1\" w:author=\"AI_Reviewer\""));
        assert!(markup.contains("<w:ins w:id=\"2\""));
        assert!(markup.contains("<w:delText>Intro</w:delText>"));
        assert!(markup.contains("<w:trackRevisions/>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = Document::new();
        let mut paragraph = Paragraph::new();
        paragraph.children.push(Node::Run(Run {
            text: "a < b & c".to_string(),
        }));
        doc.paragraphs.push(paragraph);

        let markup = serialize(&doc);
        assert!(markup.contains("<w:t>a &lt; b &amp; c</w:t>"));

        let reparsed = parse(&markup).unwrap();
        assert_eq!(reparsed.paragraphs[0].text(), "a < b & c");
    }

    #[test]
    fn test_empty_paragraph_collapses() {
        let mut doc = Document::new();
        doc.paragraphs.push(Paragraph::new());

        let markup = serialize(&doc);
        assert!(markup.contains("<w:p/>"));
        assert_eq!(parse(&markup).unwrap(), doc);
    }
}
