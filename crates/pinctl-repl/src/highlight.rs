//! Line editor helper for the Steel REPL
//!
//! Completes and colours the pin vocabulary and keeps reading lines while
//! parentheses are still open.

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};
use std::borrow::Cow;
use std::collections::BTreeSet;
use steel_parser::lexer::TokenStream;
use steel_parser::parser::SourceId;
use steel_parser::tokens::TokenType;

/// Helper struct for rustyline providing completion, colouring and
/// multi-line input
#[derive(Helper)]
pub struct ReplHelper {
    vocabulary: BTreeSet<String>,
}

impl ReplHelper {
    /// Create a helper that knows the given identifiers
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Known identifiers matching `prefix`
    ///
    /// Prefix matches come first, then identifiers merely containing it.
    pub fn candidates(&self, prefix: &str) -> Vec<String> {
        let (mut starting, containing): (Vec<_>, Vec<_>) = self
            .vocabulary
            .iter()
            .filter(|word| word.contains(prefix))
            .cloned()
            .partition(|word| word.starts_with(prefix));
        starting.extend(containing);
        starting
    }

    fn is_known(&self, ident: &str) -> bool {
        self.vocabulary.contains(ident)
    }
}

/// Net count of open parentheses, and whether the lexer hit an error
fn paren_balance(input: &str) -> (i32, bool) {
    let mut balance = 0;
    let mut has_error = false;

    for token in TokenStream::new(input, true, SourceId::none()) {
        match token.ty {
            TokenType::OpenParen(..) => balance += 1,
            TokenType::CloseParen(_) => balance -= 1,
            // Usually an unterminated string
            TokenType::Error => has_error = true,
            _ => {}
        }
    }

    (balance, has_error)
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let current = TokenStream::new(line, true, SourceId::none()).find_map(|token| {
            let span = token.span();
            match token.ty {
                TokenType::Identifier(ident) if (span.start()..=span.end()).contains(&pos) => {
                    Some((span.start(), ident.to_string()))
                }
                _ => None,
            }
        });

        let Some((start, ident)) = current else {
            return Ok((pos, Vec::new()));
        };

        let pairs = self
            .candidates(&ident)
            .into_iter()
            .map(|word| Pair {
                display: word.white().to_string(),
                replacement: word,
            })
            .collect();

        Ok((start, pairs))
    }
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let (balance, has_error) = paren_balance(ctx.input());
        if balance > 0 || (has_error && balance >= 0) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _context: &Context) -> Option<String> {
        None
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let mut spans: Vec<(std::ops::Range<usize>, String)> = Vec::new();

        for token in TokenStream::new(line, true, SourceId::none()) {
            let source = token.source();
            let colored = match &token.ty {
                TokenType::Define | TokenType::Lambda | TokenType::If | TokenType::Let => {
                    source.bright_purple()
                }
                TokenType::BooleanLiteral(_) => source.bright_magenta(),
                TokenType::Number(_) => source.bright_yellow(),
                TokenType::StringLiteral(_) => source.bright_green(),
                TokenType::Identifier(ident) if self.is_known(ident) => source.bright_blue(),
                _ => continue,
            };
            spans.push((token.span().range(), colored.to_string()));
        }

        if spans.is_empty() {
            return Cow::Borrowed(line);
        }

        let mut highlighted = line.to_owned();
        for (range, replacement) in spans.into_iter().rev() {
            highlighted.replace_range(range, &replacement);
        }
        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        !line.is_empty()
    }
}
