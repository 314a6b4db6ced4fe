//! Load, generate and store datasets of delimited records.
//!
//! Every operation works on whole files and either succeeds completely or
//! returns an error without producing partial output: a malformed line makes
//! [`Dataset::load`] fail with no records, and [`Dataset::store`] checks every
//! field before it touches the destination.
//!
//! ```
//! use happyhex_data::dataset::{self, Dataset};
//! use happyhex_data::record::Field;
//! use std::io::Write;
//!
//! let mut src = tempfile::NamedTempFile::new().unwrap();
//! writeln!(src, "1,0,1,WIN").unwrap();
//! writeln!(src, "0,1,0,LOSS").unwrap();
//!
//! let ds = dataset::load(src.path()).unwrap();
//! assert_eq!(ds.len(), 2);
//! assert_eq!(ds.records()[1].fields[3], Field::Symbol("LOSS".into()));
//!
//! let dst = tempfile::NamedTempFile::new().unwrap();
//! dataset::store(&ds, dst.path()).unwrap();
//! assert_eq!(dataset::load(dst.path()).unwrap(), ds);
//! ```

use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rand::Rng;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::record::{FieldKind, Format, Record};

/// Consecutive empty batches after which [`generate`] gives up.
pub const MAX_IDLE_BATCHES: usize = 1000;

/// Why a line could not be turned into a record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatErrorKind {
    #[error("expected {expected} fields, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("field {column}: expected {expected}, found {found:?}")]
    Kind { column: usize, expected: FieldKind, found: String },
    #[error("{0}")]
    Invalid(String),
}

/// A line of a dataset file that does not match the expected layout.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct FormatError {
    /// 1-based line number in the source file.
    pub line: usize,
    pub kind: FormatErrorKind,
}

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("record {index}: {kind}")]
    Mismatch { index: usize, kind: FormatErrorKind },
    #[error("record {index} cannot be written: {reason}")]
    Unencodable { index: usize, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error("generation stalled: {produced}/{wanted} records after {idle} empty batches")]
    Stalled { produced: usize, wanted: usize, idle: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Check `record` against a fixed arity and optional schema.
fn check_layout(record: &Record, arity: usize, schema: Option<&[FieldKind]>) -> Result<(), FormatErrorKind> {
    if record.arity() != arity {
        return Err(FormatErrorKind::Arity { expected: arity, found: record.arity() });
    }
    if let Some(schema) = schema {
        for (column, (kind, field)) in schema.iter().zip(&record.fields).enumerate() {
            if !kind.accepts(field) {
                return Err(FormatErrorKind::Kind { column, expected: *kind, found: field.to_string() });
            }
        }
    }
    Ok(())
}

/// Read every non-blank line of `reader` as a record and convert it.
///
/// Records must share one arity: the schema's length when `format` has a
/// schema, otherwise that of the first record. The first failing line aborts
/// the read.
pub fn read_records<R, T, F>(reader: R, format: &Format, mut convert: F) -> Result<Vec<T>, DatasetError>
where
    R: BufRead,
    F: FnMut(Record) -> Result<T, FormatErrorKind>,
{
    let schema = format.schema.as_deref();
    let mut arity = schema.map(<[FieldKind]>::len);
    let mut out = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = format.parse_line(&line);
        let expected = *arity.get_or_insert(record.arity());
        let item = check_layout(&record, expected, schema)
            .and_then(|()| convert(record))
            .map_err(|kind| FormatError { line: n + 1, kind })?;
        out.push(item);
    }
    Ok(out)
}

/// Write one line per record. Fields are validated before anything is written.
pub fn write_records<W: Write>(writer: &mut W, format: &Format, records: &[Record]) -> Result<(), DatasetError> {
    for (index, record) in records.iter().enumerate() {
        if let Some(reason) = record.fields.iter().find_map(|f| format.unencodable_reason(f)) {
            return Err(DatasetError::Unencodable { index, reason });
        }
    }
    for record in records {
        writer.write_all(format.format_line(record).as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// An ordered collection of records sharing one layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    format: Format,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(format: Format) -> Self { Dataset { format, records: Vec::new() } }

    pub fn load<P: AsRef<Path>>(path: P, format: Format) -> Result<Self, DatasetError> {
        let file = fs::File::open(path)?;
        Self::from_reader(BufReader::new(file), format)
    }

    pub fn from_reader<R: BufRead>(reader: R, format: Format) -> Result<Self, DatasetError> {
        let records = read_records(reader, &format, Ok)?;
        Ok(Dataset { format, records })
    }

    /// Write all records to `path`, replacing any existing file.
    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<(), DatasetError> {
        let mut buf = Vec::new();
        write_records(&mut buf, &self.format, &self.records)?;
        let mut out = BufWriter::new(fs::File::create(path)?);
        out.write_all(&buf)?;
        out.flush()?;
        Ok(())
    }

    #[inline]
    pub fn format(&self) -> &Format { &self.format }

    #[inline]
    pub fn records(&self) -> &[Record] { &self.records }

    pub fn into_records(self) -> Vec<Record> { self.records }

    #[inline]
    pub fn len(&self) -> usize { self.records.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> { self.records.iter() }

    /// Arity every record of this dataset has, if it is fixed yet.
    pub fn arity(&self) -> Option<usize> {
        match &self.format.schema {
            Some(schema) => Some(schema.len()),
            None => self.records.first().map(Record::arity),
        }
    }

    /// Append records; all of them are checked before any is added.
    pub fn append<I: IntoIterator<Item = Record>>(&mut self, records: I) -> Result<(), DatasetError> {
        let incoming: Vec<Record> = records.into_iter().collect();
        let Some(arity) = self.arity().or_else(|| incoming.first().map(Record::arity)) else {
            return Ok(());
        };
        let schema = self.format.schema.as_deref();
        for (offset, record) in incoming.iter().enumerate() {
            check_layout(record, arity, schema)
                .map_err(|kind| DatasetError::Mismatch { index: self.records.len() + offset, kind })?;
        }
        self.records.extend(incoming);
        Ok(())
    }

    /// Generate `count` records with `rule` and append them.
    pub fn generate<G, R>(&mut self, count: usize, rule: &mut G, rng: &mut R) -> Result<(), GenerateError>
    where
        G: GenerationRule,
        G::Item: Into<Record>,
        R: Rng + ?Sized,
    {
        let items = generate(count, rule, rng)?;
        self.append(items.into_iter().map(Into::into))?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;
    fn into_iter(self) -> Self::IntoIter { self.records.iter() }
}

/// Load a comma-delimited dataset.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Dataset, DatasetError> { Dataset::load(path, Format::default()) }

/// Store `dataset` at `path` in its own format, overwriting the file.
pub fn store<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<(), DatasetError> { dataset.store(path) }

/// A source of synthetic records.
///
/// Each call yields one batch (for self-play, one game). Batches may be
/// empty; [`generate`] keeps asking until it has enough.
pub trait GenerationRule {
    type Item;

    fn next_batch<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<Self::Item>, GenerateError>;
}

/// Snapshot passed to progress callbacks after every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub batches: usize,
    pub produced: usize,
    pub wanted: usize,
}

/// Produce exactly `count` items from `rule`.
pub fn generate<G, R>(count: usize, rule: &mut G, rng: &mut R) -> Result<Vec<G::Item>, GenerateError>
where
    G: GenerationRule,
    R: Rng + ?Sized,
{
    generate_with_progress(count, rule, rng, |_| {})
}

/// Like [`generate`], reporting progress after every batch.
pub fn generate_with_progress<G, R, F>(count: usize, rule: &mut G, rng: &mut R, mut on_batch: F) -> Result<Vec<G::Item>, GenerateError>
where
    G: GenerationRule,
    R: Rng + ?Sized,
    F: FnMut(Progress),
{
    let mut out = Vec::with_capacity(count);
    let mut batches = 0usize;
    let mut idle = 0usize;
    while out.len() < count {
        let batch = rule.next_batch(rng)?;
        batches += 1;
        if batch.is_empty() {
            idle += 1;
            if idle >= MAX_IDLE_BATCHES {
                return Err(GenerateError::Stalled { produced: out.len(), wanted: count, idle });
            }
        } else {
            idle = 0;
            out.extend(batch);
        }
        on_batch(Progress { batches, produced: out.len().min(count), wanted: count });
    }
    out.truncate(count);
    tracing::debug!(batches, produced = out.len(), "generation finished");
    Ok(out)
}
