// File: src/repl.rs
use crate::core::engine::Speller;
use crate::error::Result;
use crate::network::Predictor;
use std::io::{BufRead, Write};

pub const PROMPT: &str = "> ";
pub const QUIT: &str = "q";

/// Reads letter sets line by line and prints the predicted word with its
/// confidence. Blank lines are skipped; `q` or end of input stops the loop.
pub fn run<P, R, W>(speller: &Speller<P>, input: R, output: &mut W) -> Result<()>
where
    P: Predictor,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line?;
        let query = line.trim_end_matches('\r');
        if query == QUIT {
            break;
        }
        if query.is_empty() {
            continue;
        }

        match speller.predict(query)? {
            Some(prediction) => {
                writeln!(output, "{}", prediction.word)?;
                writeln!(output, "Confidence: {:.2}", prediction.confidence)?;
            }
            None => writeln!(output, "No known letters in '{}'", query)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocabulary::Vocabulary;
    use crate::network::TrainingBatch;
    use std::io::Cursor;
    use std::path::Path;

    struct Favourite(usize);

    impl Predictor for Favourite {
        fn train(&mut self, _batch: &TrainingBatch, _max_passes: usize) -> Result<usize> {
            Ok(0)
        }

        fn bit_fail(&self) -> usize {
            0
        }

        fn run(&self, _input: &[f32]) -> Result<Vec<f32>> {
            let mut out = vec![0.1; 4];
            out[self.0] = 0.876;
            Ok(out)
        }

        fn save(&self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn load(_path: &Path) -> Result<Self> {
            Ok(Self(0))
        }
    }

    fn session(script: &str) -> String {
        let vocab = Vocabulary::from_corpus("cat act tac dog").unwrap();
        let speller = Speller::new(vocab, Favourite(2));
        let mut out = Vec::new();
        run(&speller, Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_prints_word_and_confidence() {
        assert_eq!(session("gdo\nq\n"), "> dog\nConfidence: 0.88\n> ");
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(session("\n\nq\n"), "> > > ");
    }

    #[test]
    fn test_stops_at_end_of_input() {
        assert_eq!(session("god"), "> dog\nConfidence: 0.88\n> \n");
    }

    #[test]
    fn test_unknown_letters_reported() {
        assert_eq!(session("zz\nq\n"), "> No known letters in 'zz'\n> ");
    }
}
