//! HappyHex training samples and their line format.
//!
//! Each line holds three `|`-separated fields:
//!
//! ```text
//! <board as 0/1 cells> | <queue pieces as bytes, comma-separated> | <options as index:i:k, comma-separated>
//! ```
//!
//! Empty queues and option lists are written as empty fields.

use std::io::BufRead;
use std::path::Path;

use crate::algorithm::Placement;
use crate::dataset::{read_records, Dataset, DatasetError, FormatErrorKind};
use crate::engine::HexEngine;
use crate::piece::Piece;
use crate::record::{Field, Format, Record};

/// A board, the pieces on offer and the ranked placements chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSample {
    pub engine: HexEngine,
    pub queue: Vec<Piece>,
    pub options: Vec<Placement>,
}

impl TrainingSample {
    pub fn new(engine: HexEngine, queue: Vec<Piece>, options: Vec<Placement>) -> Self {
        TrainingSample { engine, queue, options }
    }

    /// True when every option names a queued piece that fits on the board.
    pub fn is_consistent(&self) -> bool {
        self.options.iter().all(|o| match self.queue.get(o.piece_index) {
            Some(&piece) => self.engine.check_add(o.coord, piece),
            None => false,
        })
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

fn split_list<T, E: std::fmt::Display>(text: &str, parse: impl Fn(&str) -> Result<T, E>) -> Result<Vec<T>, FormatErrorKind> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|part| parse(part.trim()).map_err(|e| FormatErrorKind::Invalid(e.to_string())))
        .collect()
}

impl From<&TrainingSample> for Record {
    fn from(s: &TrainingSample) -> Self {
        Record::new(vec![
            Field::parse(&s.engine.to_string()),
            Field::parse(&join(&s.queue)),
            Field::parse(&join(&s.options)),
        ])
    }
}

impl From<TrainingSample> for Record {
    fn from(s: TrainingSample) -> Self { Record::from(&s) }
}

impl TryFrom<Record> for TrainingSample {
    type Error = FormatErrorKind;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let [engine, queue, options] = <[Field; 3]>::try_from(record.fields)
            .map_err(|fields| FormatErrorKind::Arity { expected: 3, found: fields.len() })?;
        let engine: HexEngine = engine
            .to_string()
            .parse()
            .map_err(|e: crate::engine::EngineError| FormatErrorKind::Invalid(format!("board: {e}")))?;
        let queue = split_list(&queue.to_string(), str::parse::<Piece>)?;
        let options = split_list(&options.to_string(), str::parse::<Placement>)?;
        if let Some(bad) = options.iter().find(|o| o.piece_index >= queue.len()) {
            return Err(FormatErrorKind::Invalid(format!(
                "option {bad} refers to piece {} of a queue of {}",
                bad.piece_index,
                queue.len()
            )));
        }
        Ok(TrainingSample { engine, queue, options })
    }
}

/// Parse samples from any buffered reader.
pub fn read_training_data<R: BufRead>(reader: R) -> Result<Vec<TrainingSample>, DatasetError> {
    read_records(reader, &Format::happyhex(), TrainingSample::try_from)
}

/// Load samples from `path`. Any malformed line fails the whole load.
pub fn load_training_data<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingSample>, DatasetError> {
    let file = std::fs::File::open(path)?;
    read_training_data(std::io::BufReader::new(file))
}

/// Samples as a dataset in the HappyHex format.
pub fn to_dataset(samples: &[TrainingSample]) -> Result<Dataset, DatasetError> {
    let mut ds = Dataset::new(Format::happyhex());
    ds.append(samples.iter().map(Record::from))?;
    Ok(ds)
}

/// Write samples to `path`, one per line, replacing any existing file.
pub fn save_training_dataset<P: AsRef<Path>>(samples: &[TrainingSample], path: P) -> Result<(), DatasetError> {
    to_dataset(samples)?.store(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FormatError;
    use crate::hex::Hex;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn sample() -> TrainingSample {
        let mut engine = HexEngine::new(3).unwrap();
        engine.set(Hex::new(0, 0), true).unwrap();
        let queue = vec![Piece::from_byte(0b0001011).unwrap(), Piece::from_byte(0b1010000).unwrap()];
        let options = vec![Placement::new(0, Hex::new(2, 2)), Placement::new(1, Hex::new(3, 3))];
        TrainingSample::new(engine, queue, options)
    }

    #[test]
    fn line_layout() {
        let ds = to_dataset(&[sample()]).unwrap();
        let line = ds.format().format_line(&ds.records()[0]);
        assert_eq!(line, "1000000000000000000 | 11,80 | 0:2:2,1:3:3");
    }

    #[test]
    fn file_round_trip() {
        let tmp = NamedTempFile::new().unwrap();
        let samples = vec![sample(), TrainingSample::new(HexEngine::new(5).unwrap(), vec![Piece::FULL], vec![])];
        save_training_dataset(&samples, tmp.path()).unwrap();
        let loaded = load_training_data(tmp.path()).unwrap();
        assert_eq!(loaded, samples);
    }

    #[test]
    fn tiny_board_reads_as_integer_field() {
        let one = TrainingSample::new("1".parse().unwrap(), vec![Piece::FULL], vec![]);
        let loaded = read_training_data(Cursor::new("1 | 127 | \n")).unwrap();
        assert_eq!(loaded, vec![one]);
    }

    #[test]
    fn malformed_line_yields_no_samples() {
        let good = "0000000 | 11 | 0:1:1\n";
        let text = format!("{good}{good}0000000 | 200 | 0:1:1\n");
        let err = read_training_data(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, DatasetError::Format(FormatError { line: 3, kind: FormatErrorKind::Invalid(_) })));

        let err = read_training_data(Cursor::new("0000000 | 11\n")).unwrap_err();
        assert!(matches!(err, DatasetError::Format(FormatError { line: 1, kind: FormatErrorKind::Arity { .. } })));

        let err = read_training_data(Cursor::new("00000 | 11 | 0:1:1\n")).unwrap_err();
        assert!(matches!(err, DatasetError::Format(FormatError { line: 1, .. })));

        let err = read_training_data(Cursor::new("0000000 | 11 | 1:1:1\n")).unwrap_err();
        assert!(matches!(err, DatasetError::Format(FormatError { line: 1, .. })));
    }

    #[test]
    fn consistency_check() {
        assert!(sample().is_consistent());
        let mut s = sample();
        s.options.push(Placement::new(0, Hex::new(0, 0)));
        assert!(!s.is_consistent());
    }
}
