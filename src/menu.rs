// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The interactive shell: a numbered list of patterns, 0 to quit, one
//! past the last to render everything.  Bad input is answered with a
//! complaint and the question again; it never leaves this module.

use std::io::{self, BufRead, Write};

use crate::catalog::PatternSpec;
use crate::errors::{Result, WallpaperError};
use crate::pipeline::RunReport;

/// A valid menu answer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Selection {
    /// Leave the menu.
    Exit,
    /// Render the pattern at this zero-based catalog index.
    Pattern(usize),
    /// Render every pattern.
    All,
}

/// Interprets a menu answer for a catalog of `count` patterns.
pub fn parse_selection(input: &str, count: usize) -> Result<Selection> {
    let trimmed = input.trim();
    let choice: usize = trimmed
        .parse()
        .map_err(|_| WallpaperError::InvalidSelection(format!("{:?} is not a number", trimmed)))?;
    match choice {
        0 => Ok(Selection::Exit),
        n if n <= count => Ok(Selection::Pattern(n - 1)),
        n if n == count + 1 => Ok(Selection::All),
        n => Err(WallpaperError::InvalidSelection(format!(
            "{} is not between 0 and {}",
            n,
            count + 1
        ))),
    }
}

/// `y`/`yes` or `n`/`no`, any case.
pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// A menu reading from `input` and talking to `output`.
pub struct Menu<'a, R, W> {
    patterns: &'a [PatternSpec],
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    /// Constructor.
    pub fn new(patterns: &'a [PatternSpec], input: R, output: W) -> Self {
        Menu {
            patterns,
            input,
            output,
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.input.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    /// Prints the numbered list.
    pub fn show(&mut self) -> io::Result<()> {
        writeln!(self.output, "Choose a wallpaper to generate:")?;
        for (i, p) in self.patterns.iter().enumerate() {
            writeln!(self.output, "  {:>2}. {}", i + 1, p.title)?;
        }
        writeln!(self.output, "  {:>2}. Generate ALL wallpapers", self.patterns.len() + 1)?;
        writeln!(self.output, "  {:>2}. Exit", 0)
    }

    /// Asks until a valid selection arrives.  End of input counts as
    /// `Exit`.
    pub fn ask_selection(&mut self) -> io::Result<Selection> {
        loop {
            write!(self.output, "Enter your choice (0-{}): ", self.patterns.len() + 1)?;
            self.output.flush()?;
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(Selection::Exit),
            };
            match parse_selection(&line, self.patterns.len()) {
                Ok(selection) => return Ok(selection),
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }

    /// Asks a yes/no question until answered.  End of input counts as
    /// no.
    pub fn ask_yes_no(&mut self, question: &str) -> io::Result<bool> {
        loop {
            write!(self.output, "{} (y/n): ", question)?;
            self.output.flush()?;
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(false),
            };
            match parse_yes_no(&line) {
                Some(answer) => return Ok(answer),
                None => writeln!(self.output, "Please enter 'y' for yes or 'n' for no.")?,
            }
        }
    }

    fn report(&mut self, reports: &[RunReport]) -> io::Result<()> {
        for r in reports {
            match &r.outcome {
                Ok(path) => writeln!(
                    self.output,
                    "  ok     {} -> {} ({:.1}s)",
                    r.name,
                    path.display(),
                    r.elapsed.as_secs_f64()
                )?,
                Err(e) => writeln!(self.output, "  FAILED {}: {}", r.name, e)?,
            }
        }
        Ok(())
    }

    /// Runs the menu until the user exits.  `dispatch` receives the
    /// chosen patterns and whether to sign them.
    pub fn run<F>(&mut self, signature_text: &str, mut dispatch: F) -> io::Result<()>
    where
        F: FnMut(&[PatternSpec], bool) -> Vec<RunReport>,
    {
        let patterns = self.patterns;
        loop {
            self.show()?;
            let chosen = match self.ask_selection()? {
                Selection::Exit => break,
                Selection::Pattern(i) => &patterns[i..=i],
                Selection::All => patterns,
            };
            let sign = self.ask_yes_no(&format!("Add '{}' signature to wallpaper?", signature_text))?;
            let reports = dispatch(chosen, sign);
            self.report(&reports)?;
        }
        writeln!(self.output, "Goodbye.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn selections() {
        assert_eq!(parse_selection("0", 14).unwrap(), Selection::Exit);
        assert_eq!(parse_selection(" 1\n", 14).unwrap(), Selection::Pattern(0));
        assert_eq!(parse_selection("14", 14).unwrap(), Selection::Pattern(13));
        assert_eq!(parse_selection("15", 14).unwrap(), Selection::All);
        match parse_selection("16", 14) {
            Err(WallpaperError::InvalidSelection(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_selection("two", 14).is_err());
        assert!(parse_selection("-1", 14).is_err());
    }

    #[test]
    fn yes_and_no() {
        assert_eq!(parse_yes_no("Y\n"), Some(true));
        assert_eq!(parse_yes_no("no"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[test]
    fn invalid_input_is_asked_again() {
        let patterns = catalog();
        let input = Cursor::new("abc\n99\n3\n");
        let mut output = vec![];
        let selection = Menu::new(&patterns, input, &mut output).ask_selection().unwrap();
        assert_eq!(selection, Selection::Pattern(2));
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Enter your choice").count(), 3);
        assert!(text.contains("invalid selection"));
    }

    #[test]
    fn a_session_dispatches_and_exits() {
        let patterns = catalog();
        let all = (patterns.len() + 1).to_string();
        let input = Cursor::new(format!("2\nmaybe\ny\n{}\nn\n0\n", all));
        let mut output = vec![];
        let mut calls: Vec<(usize, bool)> = vec![];
        Menu::new(&patterns, input, &mut output)
            .run("@me", |chosen, sign| {
                calls.push((chosen.len(), sign));
                chosen
                    .iter()
                    .map(|p| RunReport {
                        name: p.name,
                        outcome: Ok(PathBuf::from(p.file_name())),
                        elapsed: Duration::from_millis(1),
                    })
                    .collect()
            })
            .unwrap();
        let mut picked = vec![];
        Menu::new(&patterns, Cursor::new("2\nn\n0\n"), &mut Vec::<u8>::new())
            .run("@me", |chosen, _| {
                picked.extend(chosen.iter().map(|p| p.name));
                vec![]
            })
            .unwrap();
        assert_eq!(calls, vec![(1, true), (patterns.len(), false)]);
        assert_eq!(picked, vec!["dejong_attractor"]);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("   1. Random Mathematical Art\n"));
        assert!(text.contains("random_math_art.png"));
        assert!(text.ends_with("Goodbye.\n"));
    }

    #[test]
    fn end_of_input_exits() {
        let patterns = catalog();
        let mut output = vec![];
        Menu::new(&patterns, Cursor::new(""), &mut output)
            .run("@me", |_, _| panic!("nothing should run"))
            .unwrap();
    }
}
