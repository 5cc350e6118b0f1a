// src/vectors.rs

//! Line-oriented hex vector files exchanged with the RTL simulator.
//!
//! Every record is one bf16 value as 4 lowercase hex digits followed by `\n`.
//! Test-case files pair an input record with the expected output record on
//! the same line, separated by whitespace.
//!
//! The `write_*`/`read_*` functions work on any stream; the path-based
//! wrappers open the file for the duration of the call and attach the path
//! to any error.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info, trace};

use crate::bf16::{Bf16, FormatError};
use crate::error::VectorError;
use crate::range::SampleRange;

/// One input/expected pair from a test-case file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestCase {
    pub input: Bf16,
    pub expected: Bf16,
}

/// Result of checking simulator outputs against a reference function.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub count: usize,
    pub mismatches: usize,
    /// Largest absolute error and the index where it occurred.
    pub worst: Option<(usize, f32)>,
}

impl Comparison {
    pub fn passed(&self) -> bool {
        self.mismatches == 0
    }
}

/// Logistic sigmoid, the function computed by the hardware design under test.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// --- Stimulus vectors ---

/// Write one hex record per sample.
pub fn write_input<W: Write>(range: &SampleRange, mut writer: W) -> io::Result<usize> {
    let mut written = 0;
    for sample in range.samples() {
        let encoded = Bf16::from_f32_truncate(sample);
        trace!("sample {} -> {}", sample, encoded);
        writeln!(writer, "{}", encoded)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Generate a stimulus file for `range`, replacing `destination` if it exists.
///
/// Parent directories are not created. Returns the number of records written.
pub fn generate_input(range: &SampleRange, destination: &Path) -> Result<usize, VectorError> {
    debug!(
        "Generating {} samples over [{}, {}]",
        range.count(),
        range.start(),
        range.stop()
    );
    let file = File::create(destination).map_err(|e| VectorError::io(destination, e))?;
    let written =
        write_input(range, BufWriter::new(file)).map_err(|e| VectorError::io(destination, e))?;
    info!("Wrote {} records to {}", written, destination.display());
    Ok(written)
}

// --- Simulator output ---

/// Decode every non-blank line of `reader`. `origin` names the source in errors.
pub fn read_output<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<f32>, VectorError> {
    let mut values = Vec::new();
    for_each_record(reader, origin, |record| {
        let value = Bf16::from_hex(record)?.to_f32();
        trace!("{} -> {}", record, value);
        values.push(value);
        Ok(())
    })?;
    Ok(values)
}

/// Decode a simulator output file into f32 values in file order.
///
/// Blank lines are skipped. The first malformed record aborts the parse.
pub fn parse_output(source: &Path) -> Result<Vec<f32>, VectorError> {
    let file = File::open(source).map_err(|e| VectorError::io(source, e))?;
    let values = read_output(BufReader::new(file), source)?;
    info!("Read {} records from {}", values.len(), source.display());
    Ok(values)
}

// --- Test-case files ---

/// Write `<input> <expected>` records, with `expected` computed by `reference`
/// on the bf16-truncated input (the value the hardware actually sees).
pub fn write_cases<W, F>(range: &SampleRange, reference: F, mut writer: W) -> io::Result<usize>
where
    W: Write,
    F: Fn(f32) -> f32,
{
    let mut written = 0;
    for sample in range.samples() {
        let input = Bf16::from_f32_truncate(sample);
        let expected = Bf16::from_f32_truncate(reference(input.to_f32()));
        writeln!(writer, "{} {}", input, expected)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Generate a test-case file for the simulator's headless mode.
pub fn generate_cases<F>(
    range: &SampleRange,
    reference: F,
    destination: &Path,
) -> Result<usize, VectorError>
where
    F: Fn(f32) -> f32,
{
    let file = File::create(destination).map_err(|e| VectorError::io(destination, e))?;
    let written = write_cases(range, reference, BufWriter::new(file))
        .map_err(|e| VectorError::io(destination, e))?;
    info!("Wrote {} test cases to {}", written, destination.display());
    Ok(written)
}

pub fn read_cases<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<TestCase>, VectorError> {
    let mut cases = Vec::new();
    for_each_record(reader, origin, |record| {
        let fields: Vec<&str> = record.split_whitespace().collect();
        let [input, expected] = fields.as_slice() else {
            return Err(FormatError::FieldCount {
                expected: 2,
                found: fields.len(),
            });
        };
        cases.push(TestCase {
            input: Bf16::from_hex(input)?,
            expected: Bf16::from_hex(expected)?,
        });
        Ok(())
    })?;
    Ok(cases)
}

pub fn parse_cases(source: &Path) -> Result<Vec<TestCase>, VectorError> {
    let file = File::open(source).map_err(|e| VectorError::io(source, e))?;
    let cases = read_cases(BufReader::new(file), source)?;
    info!("Read {} test cases from {}", cases.len(), source.display());
    Ok(cases)
}

// --- Comparison ---

/// Check each output against `reference(input)` truncated to bf16.
///
/// An output is a mismatch when it differs from the expected value by more
/// than `tolerance`, or when exactly one of the two is NaN. `tolerance` must
/// be finite and non-negative.
pub fn compare<F>(
    inputs: &[f32],
    outputs: &[f32],
    reference: F,
    tolerance: f32,
) -> Result<Comparison, VectorError>
where
    F: Fn(f32) -> f32,
{
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(VectorError::InvalidTolerance(tolerance));
    }
    if inputs.len() != outputs.len() {
        return Err(VectorError::LengthMismatch {
            inputs: inputs.len(),
            outputs: outputs.len(),
        });
    }

    let mut mismatches = 0;
    let mut worst: Option<(usize, f32)> = None;
    for (index, (&input, &output)) in inputs.iter().zip(outputs).enumerate() {
        let expected = Bf16::from_f32_truncate(reference(input)).to_f32();
        let error = match (expected.is_nan(), output.is_nan()) {
            (true, true) => 0.0,
            // Equal infinities would otherwise give inf - inf = NaN.
            (false, false) if output == expected => 0.0,
            (false, false) => (output - expected).abs(),
            _ => f32::INFINITY,
        };
        if error > tolerance {
            mismatches += 1;
            debug!(
                "Mismatch at {}: input {} output {} expected {}",
                index, input, output, expected
            );
        }
        if worst.map_or(true, |(_, e)| error > e) {
            worst = Some((index, error));
        }
    }

    Ok(Comparison {
        count: inputs.len(),
        mismatches,
        worst,
    })
}

/// Run `handle` on every non-blank record, trimming trailing whitespace
/// (including `\r`). Line numbers in errors are 1-based.
///
/// Lines are split as bytes so that non-UTF-8 text is a format error on its
/// line rather than a read failure.
fn for_each_record<R, F>(reader: R, origin: &Path, mut handle: F) -> Result<(), VectorError>
where
    R: BufRead,
    F: FnMut(&str) -> Result<(), FormatError>,
{
    for (index, line) in reader.split(b'\n').enumerate() {
        let bytes = line.map_err(|e| VectorError::io(origin, e))?;
        let text = std::str::from_utf8(&bytes).map_err(|_| VectorError::Format {
            path: origin.to_path_buf(),
            line: index + 1,
            source: FormatError::InvalidHex(String::from_utf8_lossy(&bytes).into_owned()),
        })?;
        let record = text.trim_end();
        if record.is_empty() {
            trace!("{}:{}: skipping blank line", origin.display(), index + 1);
            continue;
        }
        handle(record).map_err(|source| VectorError::Format {
            path: origin.to_path_buf(),
            line: index + 1,
            source,
        })?;
    }
    Ok(())
}
