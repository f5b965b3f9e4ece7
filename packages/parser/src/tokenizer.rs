use logos::Logos;
use std::fmt;

/// Token types for the WordprocessingML markup subset.
///
/// Tags are lexed whole; attribute splitting happens in the parser.
/// Text is everything between tags, still entity-escaped.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // XML declaration, e.g. <?xml version="1.0"?>
    #[regex(r"<\?[^<>]*\?>", |lex| lex.slice(), priority = 5)]
    Declaration(&'src str),

    // Closing tag, e.g. </w:p>
    #[regex(r"</[^<>]+>", |lex| lex.slice(), priority = 4)]
    CloseTag(&'src str),

    // Self-closing tag, e.g. <w:trackRevisions/>
    #[regex(r"<[^<>]+/>", |lex| lex.slice(), priority = 3)]
    EmptyTag(&'src str),

    // Opening tag, e.g. <w:ins w:id="1" w:author="Agent" w:date="...">
    #[regex(r"<[^<>]+>", |lex| lex.slice(), priority = 2)]
    OpenTag(&'src str),

    // Character data between tags
    #[regex(r"[^<]+", |lex| lex.slice(), priority = 1)]
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Declaration(s) => write!(f, "declaration {}", s),
            Token::CloseTag(s) => write!(f, "closing tag {}", s),
            Token::EmptyTag(s) => write!(f, "empty tag {}", s),
            Token::OpenTag(s) => write!(f, "opening tag {}", s),
            Token::Text(s) => write!(f, "text {:?}", s),
        }
    }
}

/// Tokenize a markup string
pub fn tokenize(source: &str) -> Vec<(Token, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}
