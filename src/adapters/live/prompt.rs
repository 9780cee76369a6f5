//! Terminal prompter reading answers line by line.

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

use crate::ports::prompt::Prompter;

type PromptResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prompter that writes questions to `W` and reads answers from `R`.
pub struct TerminalPrompter<R, W> {
    reader: Mutex<R>,
    writer: Mutex<W>,
}

impl TerminalPrompter<BufReader<Stdin>, Stdout> {
    /// Prompter bound to the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead + Send, W: Write + Send> TerminalPrompter<R, W> {
    /// Creates a prompter over the given reader and writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader: Mutex::new(reader), writer: Mutex::new(writer) }
    }

    fn ask(&self, question: &str) -> PromptResult<String> {
        {
            let mut writer = self.writer.lock().expect("prompt writer lock poisoned");
            write!(writer, "{question}")?;
            writer.flush()?;
        }
        let mut line = String::new();
        let read = self.reader.lock().expect("prompt reader lock poisoned").read_line(&mut line)?;
        if read == 0 {
            return Err("no answer: input closed".into());
        }
        Ok(line.trim().to_string())
    }

    fn say(&self, text: &str) -> PromptResult<()> {
        let mut writer = self.writer.lock().expect("prompt writer lock poisoned");
        writeln!(writer, "{text}")?;
        Ok(())
    }

    /// Consumes the prompter, returning the writer (for inspecting output).
    ///
    /// # Panics
    ///
    /// Panics if the writer lock was poisoned.
    pub fn into_writer(self) -> W {
        self.writer.into_inner().expect("prompt writer lock poisoned")
    }
}

impl<R: BufRead + Send, W: Write + Send> Prompter for TerminalPrompter<R, W> {
    fn confirm(&self, message: &str, default: bool) -> PromptResult<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let answer = self.ask(&format!("{message} {hint} "))?;
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }

    fn input(&self, message: &str, default: &str) -> PromptResult<String> {
        let answer = self.ask(&format!("{message} [{default}]: "))?;
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    fn select(&self, message: &str, options: &[String]) -> PromptResult<usize> {
        if options.is_empty() {
            return Err(format!("{message}: nothing to choose from").into());
        }
        self.say(message)?;
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {}) {option}", i + 1))?;
        }
        loop {
            let answer = self.ask(&format!("Choose 1-{}: ", options.len()))?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => self.say("Not a valid choice.")?,
            }
        }
    }

    fn pause(&self, message: &str) -> PromptResult<()> {
        self.ask(&format!("{message} "))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn confirm_uses_default_on_empty_answer() {
        assert!(prompter("\n").confirm("Update week1?", true).unwrap());
        assert!(!prompter("\n").confirm("Remove week1?", false).unwrap());
    }

    #[test]
    fn confirm_repeats_until_answer_is_valid() {
        let p = prompter("maybe\nn\n");
        assert!(!p.confirm("Update week1?", true).unwrap());
        let out = String::from_utf8(p.into_writer()).unwrap();
        assert!(out.contains("Please answer y or n."));
    }

    #[test]
    fn input_falls_back_to_default() {
        assert_eq!(prompter("\n").input("Commit message", "an update").unwrap(), "an update");
        assert_eq!(
            prompter("solved task 3\n").input("Commit message", "an update").unwrap(),
            "solved task 3"
        );
    }

    #[test]
    fn select_is_one_based_on_screen() {
        let options = vec!["mbg".to_string(), "popgen".to_string()];
        let p = prompter("7\n2\n");
        assert_eq!(p.select("Course:", &options).unwrap(), 1);
        let out = String::from_utf8(p.into_writer()).unwrap();
        assert!(out.contains("  1) mbg"));
        assert!(out.contains("Not a valid choice."));
    }

    #[test]
    fn closed_input_is_an_error() {
        assert!(prompter("").pause("Press Enter").is_err());
        assert!(prompter("").select("Course:", &[]).is_err());
    }
}
