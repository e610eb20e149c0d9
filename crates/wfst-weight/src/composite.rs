// Composite weight text codec.
//
// Grammar: `element (separator element)*`, optionally wrapped in the
// configured parenthesis pair. Elements may themselves be composite; the
// reader tracks parenthesis depth so that separators belonging to a nested
// element are kept inside that element's text.

use std::fmt;

use crate::WeightError;
use crate::config::CompositeConfig;
use crate::weight::TextElement;

/// Writes one composite weight: `write_begin`, N x `write_element`, `write_end`.
///
/// The output is borrowed for a single pass and the writer is discarded
/// afterwards.
pub struct CompositeWeightWriter<'a> {
    out: &'a mut dyn fmt::Write,
    config: &'a CompositeConfig,
    /// Zero-based position of the next element.
    position: usize,
}

impl<'a> CompositeWeightWriter<'a> {
    pub fn new(out: &'a mut dyn fmt::Write, config: &'a CompositeConfig) -> Self {
        Self {
            out,
            config,
            position: 0,
        }
    }

    /// Writes the open parenthesis if parenthesization is enabled.
    pub fn write_begin(&mut self) -> fmt::Result {
        match self.config.open_paren() {
            Some(open) => self.out.write_char(open),
            None => Ok(()),
        }
    }

    /// Writes a separator (except before the first element), then the element.
    pub fn write_element<T: TextElement>(&mut self, element: &T) -> fmt::Result {
        if self.position > 0 {
            self.out.write_char(self.config.separator)?;
        }
        self.position += 1;
        element.write_text(&mut *self.out, self.config)
    }

    /// Writes the close parenthesis if parenthesization is enabled.
    pub fn write_end(&mut self) -> fmt::Result {
        match self.config.close_paren() {
            Some(close) => self.out.write_char(close),
            None => Ok(()),
        }
    }
}

/// Reads one composite weight: `read_begin`, N x `read_element`, `read_end`.
///
/// The first error marks the reader invalid; every later call fails with
/// [`WeightError::InvalidStream`] without consuming more input. Running out
/// of input right after an element is not an error by itself. A config that
/// fails [`CompositeConfig::validate`] makes every call fail with that error.
pub struct CompositeWeightReader<'a, I: Iterator<Item = char>> {
    input: &'a mut I,
    config: &'a CompositeConfig,
    /// Last character read, `None` at end of input.
    current: Option<char>,
    /// Parenthesis nesting depth.
    depth: usize,
    valid: bool,
    config_error: Option<WeightError>,
}

impl<'a, I: Iterator<Item = char>> CompositeWeightReader<'a, I> {
    /// Create a reader positioned at the first character of `input`.
    pub fn new(input: &'a mut I, config: &'a CompositeConfig) -> Self {
        let current = input.next();
        let config_error = config.validate().err();
        if let Some(err) = &config_error {
            tracing::debug!(target: "wfst::composite", error = %err, "composite reader has an invalid config");
        }
        Self {
            input,
            config,
            current,
            depth: 0,
            valid: config_error.is_none(),
            config_error,
        }
    }

    /// Whether no parse error has been seen.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Current parenthesis nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Skips leading whitespace, then consumes the open parenthesis if
    /// parenthesization is enabled.
    ///
    /// The opening character is validated: anything other than the
    /// configured open parenthesis is an error.
    pub fn read_begin(&mut self) -> Result<(), WeightError> {
        self.check_valid()?;
        while self.current.is_some_and(char::is_whitespace) {
            self.advance();
        }
        if let Some(open) = self.config.open_paren() {
            if self.current != Some(open) {
                return self.fail(WeightError::MissingOpenParen {
                    expected: open,
                    found: self.current,
                });
            }
            self.depth += 1;
            self.advance();
        }
        Ok(())
    }

    /// Reads one element and returns it along with whether more elements follow.
    ///
    /// `last` marks the final element: separators no longer terminate it, so a
    /// trailing composite element may reuse the separator without parentheses.
    ///
    /// The element ends at end of input, at whitespace, at a separator seen at
    /// depth <= 1 (unless `last`), or at the close parenthesis at depth 1. A
    /// terminating separator or close parenthesis is consumed; consuming the
    /// outermost close parenthesis ends the composite value.
    pub fn read_element<T: TextElement>(&mut self, last: bool) -> Result<(T, bool), WeightError> {
        self.check_valid()?;
        let separator = self.config.separator;
        let parens = self.config.parentheses;

        let mut text = String::new();
        while let Some(c) = self.current {
            if c.is_whitespace()
                || (c == separator && self.depth <= 1 && !last)
                || (parens.is_some_and(|(_, close)| c == close) && self.depth == 1)
            {
                break;
            }
            text.push(c);
            // Parentheses seen inside an element must be matched.
            if let Some((open, close)) = parens {
                if c == open {
                    self.depth += 1;
                } else if c == close {
                    if self.depth == 0 {
                        return self.fail(WeightError::UnmatchedCloseParen(c));
                    }
                    self.depth -= 1;
                }
            }
            self.advance();
        }

        if text.is_empty() {
            return self.fail(WeightError::EmptyElement);
        }

        let element = match T::parse_text(&text, self.config) {
            Ok(element) => element,
            Err(err) => return self.fail(err),
        };

        // Skip the separator or close parenthesis that ended the element.
        let mut closed = false;
        if let Some(c) = self.current {
            if !c.is_whitespace() {
                if parens.is_some_and(|(_, close)| c == close) && self.depth == 1 {
                    self.depth = 0;
                    closed = true;
                }
                self.advance();
            }
        }

        let more = !closed && self.current.is_some_and(|c| !c.is_whitespace());
        Ok((element, more))
    }

    /// Finishes reading: consumes a pending close parenthesis and checks that
    /// nesting is balanced and nothing but whitespace follows.
    pub fn read_end(&mut self) -> Result<(), WeightError> {
        self.check_valid()?;
        if let Some(close) = self.config.close_paren() {
            if self.depth == 1 {
                while self.current.is_some_and(char::is_whitespace) {
                    self.advance();
                }
                if self.current == Some(close) {
                    self.depth = 0;
                    self.advance();
                }
            }
            if self.depth != 0 {
                return self.fail(WeightError::MissingCloseParen { expected: close });
            }
        }
        match self.current {
            Some(c) if !c.is_whitespace() => self.fail(WeightError::ExcessCharacter(c)),
            _ => Ok(()),
        }
    }

    #[inline]
    fn advance(&mut self) {
        self.current = self.input.next();
    }

    fn check_valid(&self) -> Result<(), WeightError> {
        match (&self.config_error, self.valid) {
            (Some(err), _) => Err(err.clone()),
            (None, true) => Ok(()),
            (None, false) => Err(WeightError::InvalidStream),
        }
    }

    fn fail<T>(&mut self, err: WeightError) -> Result<T, WeightError> {
        tracing::debug!(target: "wfst::composite", error = %err, depth = self.depth, "composite weight read failed");
        self.valid = false;
        Err(err)
    }
}

/// Write a homogeneous sequence as one composite value.
pub fn write_sequence<T: TextElement>(
    out: &mut dyn fmt::Write,
    elements: &[T],
    config: &CompositeConfig,
) -> fmt::Result {
    let mut writer = CompositeWeightWriter::new(out, config);
    writer.write_begin()?;
    for element in elements {
        writer.write_element(element)?;
    }
    writer.write_end()
}

/// Parse a homogeneous sequence written by [`write_sequence`].
///
/// There must be at least one element.
pub fn parse_sequence<T: TextElement>(
    text: &str,
    config: &CompositeConfig,
) -> Result<Vec<T>, WeightError> {
    let mut chars = text.chars();
    let mut reader = CompositeWeightReader::new(&mut chars, config);
    reader.read_begin()?;
    let mut elements = Vec::new();
    loop {
        let (element, more) = reader.read_element(false)?;
        elements.push(element);
        if !more {
            break;
        }
    }
    reader.read_end()?;
    Ok(elements)
}

/// Sequences nest: each inner sequence is one element of the outer one.
impl<T: TextElement> TextElement for Vec<T> {
    fn write_text(&self, out: &mut dyn fmt::Write, config: &CompositeConfig) -> fmt::Result {
        write_sequence(out, self, config)
    }

    fn parse_text(text: &str, config: &CompositeConfig) -> Result<Self, WeightError> {
        parse_sequence(text, config)
    }
}
