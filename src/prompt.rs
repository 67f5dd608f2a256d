//! The terminal implementation of the [`Decide`] port used by `fintrack upload`.

use crate::resolve::Decide;
use crate::Result;
use anyhow::{bail, Context};
use std::io::{self, BufRead, BufReader, Stderr, Stdin, Write};

/// Asks the person at the terminal to pick a category for an unrecognized merchant.
///
/// The choices are printed as a numbered list; the answer may be the number or the category
/// name in any case. Invalid answers are reported and the question is asked again.
pub struct PromptDecider<R, W> {
    input: R,
    output: W,
}

impl PromptDecider<BufReader<Stdin>, Stderr> {
    /// Reads answers from stdin and writes the questions to stderr, leaving stdout for command
    /// output.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R, W> PromptDecider<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, label: &str, options: &[String]) -> Result<()> {
        writeln!(self.output, "\nWhich category does '{label}' belong to?")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {option}", i + 1)?;
        }
        write!(self.output, "> ")?;
        self.output.flush().context("Unable to write the prompt")
    }
}

impl<R, W> Decide for PromptDecider<R, W>
where
    R: BufRead,
    W: Write,
{
    fn decide(&mut self, label: &str, options: &[String]) -> Result<String> {
        if options.is_empty() {
            bail!("There are no categories to choose from");
        }
        loop {
            self.ask(label, options)?;
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("Unable to read the answer")?;
            if read == 0 {
                bail!("Input ended before a category was chosen for '{label}'");
            }
            match pick(line.trim(), options) {
                Some(choice) => return Ok(choice.to_string()),
                None => writeln!(
                    self.output,
                    "'{}' is not one of the choices, enter a number from 1 to {}",
                    line.trim(),
                    options.len()
                )?,
            }
        }
    }
}

fn pick<'a>(answer: &str, options: &'a [String]) -> Option<&'a str> {
    if let Ok(n) = answer.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|ix| options.get(ix))
            .map(String::as_str);
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(answer))
        .map(String::as_str)
}
