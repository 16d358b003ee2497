//! Colored rendering of an [`SDoc`] stream.
//!
//! Token annotations are mapped to display styles through a [`Theme`] and
//! emitted as ANSI escape sequences. Annotations that are not syntax tokens
//! (comment payloads) were already consumed by printers and are skipped.

use std::io;

use crate::doc::Annotation;
use crate::render::{as_lines, strip_trailing_whitespace};
use crate::sdoc::SDoc;
use crate::syntax::Token;

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Rgb {
        Rgb { red, green, blue }
    }
}

/// The style a renderer applies to one syntax token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenStyle {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl TokenStyle {
    pub const fn plain() -> TokenStyle {
        TokenStyle {
            fg: None,
            bg: None,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub const fn fg(color: Rgb) -> TokenStyle {
        TokenStyle {
            fg: Some(color),
            bg: None,
            bold: false,
            italic: false,
            underline: false,
        }
    }

    pub fn bold(mut self) -> TokenStyle {
        self.bold = true;
        self
    }

    /// The escape sequence that switches the terminal to this style,
    /// starting from a clean slate.
    fn ansi(&self) -> String {
        let mut seq = String::from("\x1b[0");
        if let Some(fg) = self.fg {
            seq.push_str(&format!(";38;2;{};{};{}", fg.red, fg.green, fg.blue));
        }
        if let Some(bg) = self.bg {
            seq.push_str(&format!(";48;2;{};{};{}", bg.red, bg.green, bg.blue));
        }
        if self.bold {
            seq.push_str(";1");
        }
        if self.italic {
            seq.push_str(";3");
        }
        if self.underline {
            seq.push_str(";4");
        }
        seq.push('m');
        seq
    }
}

const ANSI_RESET: &str = "\x1b[0m";

/// Maps each syntax token class to a [`TokenStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub keyword_constant: TokenStyle,
    pub name_builtin: TokenStyle,
    pub name_entity: TokenStyle,
    pub name_function: TokenStyle,
    pub name_variable: TokenStyle,
    pub literal_string: TokenStyle,
    pub string_affix: TokenStyle,
    pub string_escape: TokenStyle,
    pub number: TokenStyle,
    pub operator: TokenStyle,
    pub punctuation: TokenStyle,
    pub comment: TokenStyle,
}

impl Theme {
    pub fn style_for(&self, token: Token) -> TokenStyle {
        match token {
            Token::KeywordConstant => self.keyword_constant,
            Token::NameBuiltin => self.name_builtin,
            Token::NameEntity => self.name_entity,
            Token::NameFunction => self.name_function,
            Token::NameVariable => self.name_variable,
            Token::LiteralString => self.literal_string,
            Token::StringAffix => self.string_affix,
            Token::StringEscape => self.string_escape,
            Token::NumberBinary | Token::NumberInt | Token::NumberFloat => self.number,
            Token::Operator => self.operator,
            Token::Punctuation => self.punctuation,
            Token::CommentSingle => self.comment,
        }
    }

    /// A palette for light terminal backgrounds.
    pub fn light() -> Theme {
        Theme {
            keyword_constant: TokenStyle::fg(Rgb::new(0x00, 0x5c, 0xc5)),
            name_builtin: TokenStyle::fg(Rgb::new(0x00, 0x5c, 0xc5)),
            name_entity: TokenStyle::fg(Rgb::new(0x6f, 0x42, 0xc1)),
            name_function: TokenStyle::fg(Rgb::new(0x6f, 0x42, 0xc1)),
            name_variable: TokenStyle::fg(Rgb::new(0xe3, 0x62, 0x09)),
            literal_string: TokenStyle::fg(Rgb::new(0x03, 0x2f, 0x62)),
            string_affix: TokenStyle::fg(Rgb::new(0x03, 0x2f, 0x62)),
            string_escape: TokenStyle::fg(Rgb::new(0x22, 0x86, 0x3a)),
            number: TokenStyle::fg(Rgb::new(0x00, 0x5c, 0xc5)),
            operator: TokenStyle::fg(Rgb::new(0xd7, 0x3a, 0x49)),
            punctuation: TokenStyle::plain(),
            comment: TokenStyle::fg(Rgb::new(0x6a, 0x73, 0x7d)),
        }
    }

    /// A palette for dark terminal backgrounds.
    pub fn dark() -> Theme {
        Theme {
            keyword_constant: TokenStyle::fg(Rgb::new(0x66, 0xd9, 0xef)),
            name_builtin: TokenStyle::fg(Rgb::new(0x66, 0xd9, 0xef)),
            name_entity: TokenStyle::fg(Rgb::new(0xa6, 0xe2, 0x2e)),
            name_function: TokenStyle::fg(Rgb::new(0xa6, 0xe2, 0x2e)),
            name_variable: TokenStyle::fg(Rgb::new(0xfd, 0x97, 0x1f)),
            literal_string: TokenStyle::fg(Rgb::new(0xe6, 0xdb, 0x74)),
            string_affix: TokenStyle::fg(Rgb::new(0xe6, 0xdb, 0x74)),
            string_escape: TokenStyle::fg(Rgb::new(0xae, 0x81, 0xff)),
            number: TokenStyle::fg(Rgb::new(0xae, 0x81, 0xff)),
            operator: TokenStyle::fg(Rgb::new(0xf9, 0x26, 0x72)),
            punctuation: TokenStyle::plain(),
            comment: TokenStyle::fg(Rgb::new(0x75, 0x71, 0x5e)),
        }
    }

    /// Picks the default palette for the current environment: light when
    /// `PRETTY_ANY_LIGHT_BACKGROUND` is set to a non-empty value, dark
    /// otherwise.
    pub fn from_env() -> Theme {
        match std::env::var("PRETTY_ANY_LIGHT_BACKGROUND") {
            Ok(value) if !value.is_empty() => Theme::light(),
            _ => Theme::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Theme {
        Theme::from_env()
    }
}

/// Renders an SDoc stream to `out` with ANSI coloring.
///
/// A stack of open styles tracks nested annotations: a push switches to the
/// new style, a pop restores the enclosing one (or resets when none is
/// open). An unbalanced pop is ignored.
pub fn colored_render_to_stream<W: io::Write>(
    out: &mut W,
    sdocs: impl IntoIterator<Item = SDoc>,
    theme: &Theme,
) -> io::Result<()> {
    let mut style_stack: Vec<TokenStyle> = Vec::new();

    for mut line in as_lines(sdocs) {
        strip_trailing_whitespace(&mut line);
        for sdoc in line {
            match sdoc {
                SDoc::Str(content) => out.write_all(content.as_bytes())?,
                SDoc::Line(indent) => {
                    out.write_all(b"\n")?;
                    for _ in 0..indent {
                        out.write_all(b" ")?;
                    }
                }
                SDoc::PushAnn(Annotation::Token(token)) => {
                    let style = theme.style_for(token);
                    style_stack.push(style);
                    out.write_all(style.ansi().as_bytes())?;
                }
                SDoc::PopAnn(Annotation::Token(_)) => {
                    if style_stack.pop().is_none() {
                        continue;
                    }
                    match style_stack.last() {
                        Some(style) => out.write_all(style.ansi().as_bytes())?,
                        None => out.write_all(ANSI_RESET.as_bytes())?,
                    }
                }
                SDoc::PushAnn(_) | SDoc::PopAnn(_) => {}
            }
        }
    }

    if !style_stack.is_empty() {
        out.write_all(ANSI_RESET.as_bytes())?;
    }
    Ok(())
}

/// Renders an SDoc stream to a `String` with ANSI coloring.
pub fn colored_render_to_string(
    sdocs: impl IntoIterator<Item = SDoc>,
    theme: &Theme,
) -> String {
    let mut out = Vec::new();
    colored_render_to_stream(&mut out, sdocs, theme).expect("writing to a Vec cannot fail");
    String::from_utf8(out).expect("rendered output is valid UTF-8")
}
