use std::io::{
  self,
  BufRead,
  Write
};

use tasklog_core::driver::Confirm;
use tracing::warn;

/// Asks on the terminal; `--yes` skips
/// the question.
#[derive(Debug, Clone, Copy)]
pub struct StdinConfirm {
  assume_yes: bool
}

impl StdinConfirm {
  pub fn new(assume_yes: bool) -> Self {
    Self { assume_yes }
  }
}

impl Confirm for StdinConfirm {
  fn confirm(
    &mut self,
    prompt: &str
  ) -> bool {
    if self.assume_yes {
      return true;
    }
    let stdin = io::stdin();
    ask(
      &mut stdin.lock(),
      &mut io::stderr(),
      prompt
    )
  }
}

fn ask<R, W>(
  input: &mut R,
  output: &mut W,
  prompt: &str
) -> bool
where
  R: BufRead,
  W: Write
{
  if let Err(err) =
    write!(output, "{prompt} [y/N] ")
      .and_then(|()| output.flush())
  {
    warn!(error = %err, "could not show confirmation prompt");
    return false;
  }

  let mut line = String::new();
  match input.read_line(&mut line) {
    | Ok(_) => is_yes(&line),
    | Err(err) => {
      warn!(error = %err, "could not read confirmation");
      false
    }
  }
}

fn is_yes(answer: &str) -> bool {
  matches!(
    answer
      .trim()
      .to_ascii_lowercase()
      .as_str(),
    "y" | "yes"
  )
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  #[test]
  fn only_explicit_yes_confirms() {
    for (typed, expected) in [
      ("y\n", true),
      ("YES\n", true),
      ("\n", false),
      ("no\n", false),
      ("", false),
    ] {
      let mut out = Vec::new();
      let answer = ask(
        &mut Cursor::new(typed),
        &mut out,
        "Delete?"
      );
      assert_eq!(answer, expected, "{typed:?}");
      assert_eq!(out, b"Delete? [y/N] ");
    }
  }

  #[test]
  fn assume_yes_never_reads() {
    assert!(
      StdinConfirm::new(true)
        .confirm("Delete?")
    );
  }
}
