//! MATLAB level-4 matrix files
//!
//! Each matrix is a 20-byte header of five 32-bit integers
//! (`type, mrows, ncols, imagf, namlen`), the NUL-terminated name, then the
//! real part in column-major order (and the imaginary part when `imagf` is
//! set, which is skipped). The thousands digit of `type` gives the byte order
//! and the tens digit the element precision.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, OutputError, Result};

/// A real matrix stored column-major
#[derive(Debug, Clone, PartialEq)]
pub struct MatMatrix {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl MatMatrix {
    /// Builds a matrix from column-major data
    pub fn new(name: impl Into<String>, rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == rows * cols).then(|| Self {
            name: name.into(),
            rows,
            cols,
            data,
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.data[col * self.rows + row])
    }

    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        (row < self.rows).then(|| {
            (0..self.cols)
                .map(|col| self.data[col * self.rows + row])
                .collect()
        })
    }

    pub fn column(&self, col: usize) -> Option<&[f64]> {
        (col < self.cols).then(|| &self.data[col * self.rows..(col + 1) * self.rows])
    }
}

#[derive(Clone, Copy)]
enum ByteOrder {
    Little,
    Big,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    path: &'a Path,
}

impl<'a> Cursor<'a> {
    fn malformed(&self, reason: impl Into<String>) -> OutputError {
        OutputError::MalformedMat {
            path: self.path.to_path_buf(),
            reason: reason.into(),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], OutputError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| self.malformed(format!("truncated at byte {}", self.pos)))?;
        let bytes = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], OutputError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

/// Element precision from the tens digit of the type code
#[derive(Clone, Copy)]
enum Precision {
    F64,
    F32,
    I32,
    I16,
    U16,
    U8,
}

impl Precision {
    fn from_digit(digit: i32) -> Option<Self> {
        Some(match digit {
            0 => Precision::F64,
            1 => Precision::F32,
            2 => Precision::I32,
            3 => Precision::I16,
            4 => Precision::U16,
            5 => Precision::U8,
            _ => return None,
        })
    }

    fn width(self) -> usize {
        match self {
            Precision::F64 => 8,
            Precision::F32 | Precision::I32 => 4,
            Precision::I16 | Precision::U16 => 2,
            Precision::U8 => 1,
        }
    }

    fn decode(self, bytes: &[u8], order: ByteOrder) -> f64 {
        macro_rules! read {
            ($ty:ty) => {{
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                match order {
                    ByteOrder::Little => <$ty>::from_le_bytes(buf) as f64,
                    ByteOrder::Big => <$ty>::from_be_bytes(buf) as f64,
                }
            }};
        }
        match self {
            Precision::F64 => read!(f64),
            Precision::F32 => read!(f32),
            Precision::I32 => read!(i32),
            Precision::I16 => read!(i16),
            Precision::U16 => read!(u16),
            Precision::U8 => bytes[0] as f64,
        }
    }
}

fn header_field(raw: [u8; 4], order: ByteOrder) -> i32 {
    match order {
        ByteOrder::Little => i32::from_le_bytes(raw),
        ByteOrder::Big => i32::from_be_bytes(raw),
    }
}

/// The type code is at most 4052, so whichever byte order yields a small
/// non-negative value is the file's order
fn detect_order(raw: [u8; 4]) -> Option<(ByteOrder, i32)> {
    [ByteOrder::Little, ByteOrder::Big]
        .into_iter()
        .map(|order| (order, header_field(raw, order)))
        .find(|(_, code)| (0..10_000).contains(code))
}

/// Decodes every matrix in a level-4 file image
pub fn parse_mat4(bytes: &[u8], path: &Path) -> Result<Vec<MatMatrix>, OutputError> {
    let mut cursor = Cursor {
        bytes,
        pos: 0,
        path,
    };
    let mut matrices = Vec::new();

    while cursor.pos < bytes.len() {
        let (order, code) = detect_order(cursor.array::<4>()?)
            .ok_or_else(|| cursor.malformed("unrecognised type code"))?;
        let rows = header_field(cursor.array::<4>()?, order);
        let cols = header_field(cursor.array::<4>()?, order);
        let imaginary = header_field(cursor.array::<4>()?, order);
        let name_len = header_field(cursor.array::<4>()?, order);

        let machine = code / 1000;
        let precision = Precision::from_digit((code / 10) % 10)
            .ok_or_else(|| cursor.malformed(format!("unsupported precision in type {code}")))?;
        if machine > 1 || (code / 100) % 10 != 0 {
            return Err(cursor.malformed(format!("unsupported type code {code}")));
        }
        if code % 10 != 0 {
            return Err(cursor.malformed(format!("matrix type {code} is not a full numeric matrix")));
        }
        if rows < 0 || cols < 0 || name_len < 1 {
            return Err(cursor.malformed("negative dimensions"));
        }

        let name_bytes = cursor.take(name_len as usize)?;
        let name = String::from_utf8_lossy(name_bytes)
            .trim_end_matches('\0')
            .to_string();

        let (rows, cols) = (rows as usize, cols as usize);
        let count = rows
            .checked_mul(cols)
            .ok_or_else(|| cursor.malformed("matrix too large"))?;
        let width = precision.width();
        let len = count
            .checked_mul(width)
            .ok_or_else(|| cursor.malformed("matrix too large"))?;
        let real = cursor.take(len)?;
        let data = real
            .chunks_exact(width)
            .map(|chunk| precision.decode(chunk, order))
            .collect();
        if imaginary != 0 {
            cursor.take(len)?;
        }

        matrices.push(MatMatrix {
            name,
            rows,
            cols,
            data,
        });
    }
    Ok(matrices)
}

pub fn read_mat4(path: &Path) -> Result<Vec<MatMatrix>> {
    let bytes = fs::read(path).map_err(Error::io(path))?;
    Ok(parse_mat4(&bytes, path)?)
}

/// Reads the matrix called `name` from a level-4 file
pub fn read_matrix(path: &Path, name: &str) -> Result<MatMatrix> {
    read_mat4(path)?
        .into_iter()
        .find(|m| m.name == name)
        .ok_or_else(|| {
            OutputError::MissingMatrix {
                path: PathBuf::from(path),
                name: name.to_string(),
            }
            .into()
        })
}

/// Encodes matrices as little-endian double precision level-4 data
pub fn encode_mat4(matrices: &[MatMatrix]) -> Vec<u8> {
    let mut out = Vec::new();
    for matrix in matrices {
        let name_len = matrix.name.len() + 1;
        for field in [0, matrix.rows as i32, matrix.cols as i32, 0, name_len as i32] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(matrix.name.as_bytes());
        out.push(0);
        for value in &matrix.data {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MatMatrix {
        // 2 x 3, column-major
        MatMatrix::new("cells", 2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn column_major_access() {
        let m = sample();
        assert_eq!(m.get(0, 1), Some(3.0));
        assert_eq!(m.row(1), Some(vec![2.0, 4.0, 6.0]));
        assert_eq!(m.column(2), Some(&[5.0, 6.0][..]));
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn decodes_encoded_file() {
        let other = MatMatrix::new("t", 1, 1, vec![42.0]).unwrap();
        let bytes = encode_mat4(&[other.clone(), sample()]);
        let parsed = parse_mat4(&bytes, Path::new("x.mat")).unwrap();
        assert_eq!(parsed, vec![other, sample()]);
    }

    #[test]
    fn decodes_big_endian_single_precision() {
        let mut bytes = Vec::new();
        for field in [1010i32, 1, 2, 0, 2] {
            bytes.extend_from_slice(&field.to_be_bytes());
        }
        bytes.extend_from_slice(b"v\0");
        bytes.extend_from_slice(&1.5f32.to_be_bytes());
        bytes.extend_from_slice(&(-2.0f32).to_be_bytes());

        let parsed = parse_mat4(&bytes, Path::new("be.mat")).unwrap();
        assert_eq!(parsed[0].name, "v");
        assert_eq!(parsed[0].row(0), Some(vec![1.5, -2.0]));
    }

    #[test]
    fn truncated_data_is_malformed() {
        let mut bytes = encode_mat4(&[sample()]);
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(
            parse_mat4(&bytes, Path::new("x.mat")),
            Err(OutputError::MalformedMat { .. })
        ));
    }

    #[test]
    fn oversized_dimensions_are_malformed() {
        let mut bytes = Vec::new();
        for field in [0i32, i32::MAX, i32::MAX, 0, 2] {
            bytes.extend_from_slice(&field.to_le_bytes());
        }
        bytes.extend_from_slice(b"a\0");
        assert!(matches!(
            parse_mat4(&bytes, Path::new("huge.mat")),
            Err(OutputError::MalformedMat { .. })
        ));
    }
}
