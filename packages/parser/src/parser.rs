use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};

/// Parser for the WordprocessingML markup subset
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, std::ops::Range<usize>)>,
    pos: usize,
}

/// One structural piece of markup: a tag with its attributes split out,
/// or a chunk of character data.
#[derive(Debug)]
enum Piece {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Empty {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Close {
        name: String,
    },
    Text(String),
}

impl Piece {
    fn describe(&self) -> String {
        match self {
            Piece::Open { name, .. } => format!("<{}>", name),
            Piece::Empty { name, .. } => format!("<{}/>", name),
            Piece::Close { name } => format!("</{}>", name),
            Piece::Text(text) => format!("text {:?}", text),
        }
    }
}

/// Parse a complete document from markup text
pub fn parse(source: &str) -> ParseResult<Document> {
    Parser::new(source).parse_document()
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let tokens = tokenize(source);
        Self { tokens, pos: 0 }
    }

    /// Parse the full `<w:document>` tree
    pub fn parse_document(&mut self) -> ParseResult<Document> {
        let mut doc = Document::new();

        match self.next_piece()? {
            (Piece::Open { name, .. }, _) if name == "w:document" => {}
            (piece, pos) => {
                return Err(ParseError::unexpected_token(
                    pos,
                    "<w:document>",
                    piece.describe(),
                ));
            }
        }

        loop {
            match self.next_piece()? {
                (Piece::Open { name, .. }, _) if name == "w:settings" => {
                    doc.track_revisions = self.parse_settings()?;
                }
                (Piece::Empty { name, .. }, _) if name == "w:settings" => {}
                (Piece::Open { name, .. }, _) if name == "w:body" => {
                    self.parse_body(&mut doc)?;
                }
                (Piece::Empty { name, .. }, _) if name == "w:body" => {}
                (Piece::Close { name }, _) if name == "w:document" => break,
                (piece, pos) => {
                    return Err(ParseError::malformed(
                        pos,
                        format!("unexpected {} in <w:document>", piece.describe()),
                    ));
                }
            }
        }

        if let Some((piece, pos)) = self.try_next_piece()? {
            return Err(ParseError::malformed(
                pos,
                format!("content after </w:document>: {}", piece.describe()),
            ));
        }

        Ok(doc)
    }

    /// Parse `<w:settings>` children; returns the track-revisions flag
    fn parse_settings(&mut self) -> ParseResult<bool> {
        let mut track_revisions = false;

        loop {
            match self.next_piece()? {
                (Piece::Empty { name, .. }, _) if name == "w:trackRevisions" => {
                    track_revisions = true;
                }
                (Piece::Close { name }, _) if name == "w:settings" => break,
                (piece, pos) => {
                    return Err(ParseError::malformed(
                        pos,
                        format!("unexpected {} in <w:settings>", piece.describe()),
                    ));
                }
            }
        }

        Ok(track_revisions)
    }

    /// Parse `<w:body>` paragraphs
    fn parse_body(&mut self, doc: &mut Document) -> ParseResult<()> {
        loop {
            match self.next_piece()? {
                (Piece::Open { name, .. }, _) if name == "w:p" => {
                    doc.paragraphs.push(self.parse_paragraph()?);
                }
                (Piece::Empty { name, .. }, _) if name == "w:p" => {
                    doc.paragraphs.push(Paragraph::new());
                }
                (Piece::Close { name }, _) if name == "w:body" => break,
                (piece, pos) => {
                    return Err(ParseError::malformed(
                        pos,
                        format!("unexpected {} in <w:body>", piece.describe()),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Parse paragraph content after its opening tag
    fn parse_paragraph(&mut self) -> ParseResult<Paragraph> {
        let mut paragraph = Paragraph::new();

        loop {
            match self.next_piece()? {
                (Piece::Open { name, .. }, _) if name == "w:pPr" => {
                    paragraph.style = self.parse_paragraph_properties()?;
                }
                (Piece::Empty { name, .. }, _) if name == "w:pPr" => {}
                (Piece::Open { name, .. }, pos) if name == "w:r" => {
                    paragraph.children.push(Node::Run(self.parse_run(pos)?));
                }
                (Piece::Open { name, attrs }, pos) if name == "w:ins" => {
                    paragraph
                        .children
                        .push(Node::Insertion(self.parse_insertion(attrs, pos)?));
                }
                (Piece::Open { name, attrs }, pos) if name == "w:del" => {
                    paragraph
                        .children
                        .push(Node::Deletion(self.parse_deletion(attrs, pos)?));
                }
                (Piece::Close { name }, _) if name == "w:p" => break,
                (piece, pos) => {
                    return Err(ParseError::malformed(
                        pos,
                        format!("unexpected {} in <w:p>", piece.describe()),
                    ));
                }
            }
        }

        Ok(paragraph)
    }

    /// Parse `<w:pPr>` children; returns the paragraph style, if declared
    fn parse_paragraph_properties(&mut self) -> ParseResult<Option<String>> {
        let mut style = None;

        loop {
            match self.next_piece()? {
                (Piece::Empty { name, attrs }, pos) if name == "w:pStyle" => {
                    style = Some(required_attr(&attrs, "w:val", "w:pStyle", pos)?);
                }
                (Piece::Close { name }, _) if name == "w:pPr" => break,
                (piece, pos) => {
                    return Err(ParseError::malformed(
                        pos,
                        format!("unexpected {} in <w:pPr>", piece.describe()),
                    ));
                }
            }
        }

        Ok(style)
    }

    /// Parse `<w:r>` content after its opening tag: exactly one `<w:t>`
    fn parse_run(&mut self, open_pos: usize) -> ParseResult<Run> {
        let mut text = None;

        loop {
            match self.next_piece()? {
                (Piece::Open { name, .. }, pos) if name == "w:t" => {
                    if text.is_some() {
                        return Err(ParseError::malformed(pos, "multiple <w:t> in one run"));
                    }
                    text = Some(self.parse_text_content("w:t")?);
                }
                (Piece::Empty { name, .. }, pos) if name == "w:t" => {
                    if text.is_some() {
                        return Err(ParseError::malformed(pos, "multiple <w:t> in one run"));
                    }
                    text = Some(String::new());
                }
                (Piece::Close { name }, _) if name == "w:r" => break,
                (piece, pos) => {
                    return Err(ParseError::malformed(
                        pos,
                        format!("unexpected {} in <w:r>", piece.describe()),
                    ));
                }
            }
        }

        match text {
            Some(text) => Ok(Run { text }),
            None => Err(ParseError::malformed(open_pos, "run with no <w:t> child")),
        }
    }

    /// Parse `<w:ins>` content after its opening tag
    fn parse_insertion(
        &mut self,
        attrs: Vec<(String, String)>,
        open_pos: usize,
    ) -> ParseResult<InsertionNode> {
        let id = required_attr(&attrs, "w:id", "w:ins", open_pos)?;
        let author = required_attr(&attrs, "w:author", "w:ins", open_pos)?;
        let date = required_attr(&attrs, "w:date", "w:ins", open_pos)?;

        let mut runs = Vec::new();
        loop {
            match self.next_piece()? {
                (Piece::Open { name, .. }, pos) if name == "w:r" => {
                    runs.push(self.parse_run(pos)?);
                }
                (Piece::Close { name }, _) if name == "w:ins" => break,
                (piece, pos) => {
                    return Err(ParseError::malformed(
                        pos,
                        format!("unexpected {} in <w:ins>", piece.describe()),
                    ));
                }
            }
        }

        if runs.is_empty() {
            return Err(ParseError::malformed(
                open_pos,
                "insertion wrapper with no text-run children",
            ));
        }

        Ok(InsertionNode {
            id,
            author,
            date,
            runs,
        })
    }

    /// Parse `<w:del>` content after its opening tag
    fn parse_deletion(
        &mut self,
        attrs: Vec<(String, String)>,
        open_pos: usize,
    ) -> ParseResult<DeletionNode> {
        let id = required_attr(&attrs, "w:id", "w:del", open_pos)?;
        let author = required_attr(&attrs, "w:author", "w:del", open_pos)?;
        let date = required_attr(&attrs, "w:date", "w:del", open_pos)?;

        let mut runs = Vec::new();
        loop {
            match self.next_piece()? {
                (Piece::Open { name, .. }, _) if name == "w:delText" => {
                    runs.push(DeletedRun {
                        text: self.parse_text_content("w:delText")?,
                    });
                }
                (Piece::Empty { name, .. }, _) if name == "w:delText" => {
                    runs.push(DeletedRun {
                        text: String::new(),
                    });
                }
                (Piece::Close { name }, _) if name == "w:del" => break,
                (piece, pos) => {
                    return Err(ParseError::malformed(
                        pos,
                        format!("unexpected {} in <w:del>", piece.describe()),
                    ));
                }
            }
        }

        if runs.is_empty() {
            return Err(ParseError::malformed(
                open_pos,
                "deletion wrapper with no text-run children",
            ));
        }

        Ok(DeletionNode {
            id,
            author,
            date,
            runs,
        })
    }

    /// Collect character data verbatim until the matching closing tag
    fn parse_text_content(&mut self, closing: &str) -> ParseResult<String> {
        let mut text = String::new();

        loop {
            match self.tokens.get(self.pos) {
                Some((Token::Text(slice), _)) => {
                    text.push_str(&unescape(slice));
                    self.pos += 1;
                }
                Some((Token::CloseTag(slice), span)) => {
                    let span_start = span.start;
                    let name = tag_name(slice);
                    if name == closing {
                        self.pos += 1;
                        return Ok(text);
                    }
                    return Err(ParseError::unexpected_token(
                        span_start,
                        format!("</{}>", closing),
                        format!("</{}>", name),
                    ));
                }
                Some((token, span)) => {
                    return Err(ParseError::malformed(
                        span.start,
                        format!("markup inside <{}>: {}", closing, token),
                    ));
                }
                None => return Err(ParseError::unexpected_eof(self.source_end())),
            }
        }
    }

    /// Next structural piece, skipping declarations and inter-tag whitespace
    fn next_piece(&mut self) -> ParseResult<(Piece, usize)> {
        match self.try_next_piece()? {
            Some(piece) => Ok(piece),
            None => Err(ParseError::unexpected_eof(self.source_end())),
        }
    }

    fn try_next_piece(&mut self) -> ParseResult<Option<(Piece, usize)>> {
        loop {
            let Some((token, span)) = self.tokens.get(self.pos) else {
                return Ok(None);
            };
            let pos = span.start;

            match token {
                Token::Declaration(_) => {
                    self.pos += 1;
                }
                Token::Text(slice) => {
                    if !slice.trim().is_empty() {
                        let piece = Piece::Text(unescape(slice));
                        self.pos += 1;
                        return Ok(Some((piece, pos)));
                    }
                    self.pos += 1;
                }
                Token::OpenTag(slice) => {
                    let (name, attrs) = split_tag(strip_tag(slice), pos)?;
                    self.pos += 1;
                    return Ok(Some((Piece::Open { name, attrs }, pos)));
                }
                Token::EmptyTag(slice) => {
                    let (name, attrs) = split_tag(strip_tag(slice), pos)?;
                    self.pos += 1;
                    return Ok(Some((Piece::Empty { name, attrs }, pos)));
                }
                Token::CloseTag(slice) => {
                    let name = tag_name(slice);
                    self.pos += 1;
                    return Ok(Some((Piece::Close { name }, pos)));
                }
            }
        }
    }

    fn source_end(&self) -> usize {
        self.tokens.last().map_or(0, |(_, span)| span.end)
    }
}

/// Strip the angle brackets and any `/` markers from a tag slice
fn strip_tag(slice: &str) -> &str {
    slice
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end_matches('/')
        .trim_start_matches('/')
}

/// Tag name of a closing-tag slice
fn tag_name(slice: &str) -> String {
    strip_tag(slice).trim().to_string()
}

/// Split a tag body into name and `key="value"` attribute pairs
fn split_tag(body: &str, pos: usize) -> ParseResult<(String, Vec<(String, String)>)> {
    let body = body.trim();
    let (name, mut rest) = match body.find(char::is_whitespace) {
        Some(split) => (&body[..split], body[split..].trim_start()),
        None => (body, ""),
    };

    let mut attrs = Vec::new();
    while !rest.is_empty() {
        let eq = rest.find('=').ok_or_else(|| {
            ParseError::malformed(pos, format!("malformed attribute in <{}>", name))
        })?;
        let key = rest[..eq].trim().to_string();
        let after = rest[eq + 1..].trim_start();

        if !after.starts_with('"') {
            return Err(ParseError::malformed(
                pos,
                format!("unquoted attribute value in <{}>", name),
            ));
        }
        let close = after[1..].find('"').ok_or_else(|| {
            ParseError::malformed(pos, format!("unterminated attribute value in <{}>", name))
        })?;

        attrs.push((key, unescape(&after[1..1 + close])));
        rest = after[1 + close + 1..].trim_start();
    }

    Ok((name.to_string(), attrs))
}

/// Required attribute lookup for a revision wrapper
fn required_attr(
    attrs: &[(String, String)],
    key: &str,
    tag: &str,
    pos: usize,
) -> ParseResult<String> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .ok_or_else(|| ParseError::malformed(pos, format!("<{}> missing {} attribute", tag, key)))
}

/// Decode the entity escapes the serializer emits. Unknown entities are
/// kept literally.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';') {
            Some(semi) => {
                match &tail[1..semi] {
                    "amp" => out.push('&'),
                    "lt" => out.push('<'),
                    "gt" => out.push('>'),
                    "quot" => out.push('"'),
                    "apos" => out.push('\''),
                    entity => {
                        out.push('&');
                        out.push_str(entity);
                        out.push(';');
                    }
                }
                rest = &tail[semi + 1..];
            }
            None => {
                out.push_str(tail);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}
