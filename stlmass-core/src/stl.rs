/// Binary STL decoder
///
/// Layout: an 80-byte free-form header, a little-endian `u32` triangle
/// count, then fixed 50-byte records (normal, three vertices, attribute
/// bytes). The number of records is inferred from the buffer length and
/// the buffer must hold a whole number of them.
use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::take,
    number::complete::{le_f32, le_u16, le_u32},
    sequence::tuple,
    IResult,
};
use serde::Deserialize;

use crate::error::MalformedInputError;
use crate::geometry::Triangle;

pub const HEADER_LEN: usize = 80;
/// Header plus the triangle count field
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;
pub const RECORD_LEN: usize = 50;

/// What to do when the header's triangle count disagrees with the buffer length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderCheck {
    /// Reject the buffer
    #[default]
    Strict,
    /// Trust the buffer length and log a warning
    Ignore,
}

/// A binary STL buffer whose length has been validated
#[derive(Debug, Clone, Copy)]
pub struct StlBuffer<'a> {
    declared_count: u32,
    records: &'a [u8],
}

impl<'a> StlBuffer<'a> {
    /// Validate `data` and split it into header and record area
    pub fn new(data: &'a [u8], header_check: HeaderCheck) -> Result<Self, MalformedInputError> {
        if data.len() < PREAMBLE_LEN {
            return Err(MalformedInputError::TooShort { actual: data.len() });
        }

        let body = data.len() - PREAMBLE_LEN;
        if body % RECORD_LEN != 0 {
            return Err(MalformedInputError::LengthMismatch {
                expected: PREAMBLE_LEN + body / RECORD_LEN * RECORD_LEN,
                actual: data.len(),
            });
        }

        let (records, (_header, declared_count)) =
            preamble(data).map_err(|_| MalformedInputError::TooShort { actual: data.len() })?;

        let buffer = Self {
            declared_count,
            records,
        };

        let inferred = buffer.len();
        if declared_count as usize != inferred {
            match header_check {
                HeaderCheck::Strict => {
                    return Err(MalformedInputError::HeaderCountMismatch {
                        declared: declared_count,
                        inferred,
                    });
                }
                HeaderCheck::Ignore => {
                    tracing::warn!(
                        declared = declared_count,
                        inferred,
                        "STL header triangle count disagrees with buffer length, using buffer length"
                    );
                }
            }
        }

        tracing::debug!(triangles = inferred, bytes = data.len(), "validated binary STL");
        Ok(buffer)
    }

    /// Triangle count written in the header, which may not match `len()`
    pub fn declared_count(&self) -> u32 {
        self.declared_count
    }

    /// Number of triangle records in the buffer
    pub fn len(&self) -> usize {
        self.records.len() / RECORD_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw record area, a whole multiple of `RECORD_LEN` bytes
    pub fn records(&self) -> &'a [u8] {
        self.records
    }

    /// Fresh lazy iterator over the records
    pub fn triangles(&self) -> Triangles<'a> {
        Triangles {
            records: self.records.chunks_exact(RECORD_LEN),
            index: 0,
        }
    }
}

/// Lazy decoder over the triangle records of a validated buffer
///
/// Cloning yields an independent iterator from the same position, so a
/// sequence can be walked more than once.
#[derive(Debug, Clone)]
pub struct Triangles<'a> {
    records: std::slice::ChunksExact<'a, u8>,
    index: usize,
}

impl Iterator for Triangles<'_> {
    type Item = Result<Triangle, MalformedInputError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let index = self.index;
        self.index += 1;
        Some(decode_record(record, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for Triangles<'_> {}

/// Validate a binary STL buffer and return a lazy triangle iterator
///
/// Rejects buffers whose header triangle count disagrees with the length;
/// use [`parse_triangles_with`] to relax that.
pub fn parse_triangles(data: &[u8]) -> Result<Triangles<'_>, MalformedInputError> {
    parse_triangles_with(data, HeaderCheck::Strict)
}

pub fn parse_triangles_with(
    data: &[u8],
    header_check: HeaderCheck,
) -> Result<Triangles<'_>, MalformedInputError> {
    Ok(StlBuffer::new(data, header_check)?.triangles())
}

/// Decode one 50-byte record; `index` is only used for error reporting
pub fn decode_record(record: &[u8], index: usize) -> Result<Triangle, MalformedInputError> {
    let (_, triangle) = facet(record).map_err(|_| MalformedInputError::Record { triangle: index })?;
    if !triangle.is_finite() {
        return Err(MalformedInputError::NonFiniteCoordinate { triangle: index });
    }
    Ok(triangle)
}

fn preamble(input: &[u8]) -> IResult<&[u8], (&[u8], u32)> {
    tuple((take(HEADER_LEN), le_u32))(input)
}

fn facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, normal) = vector3(input)?;
    let (input, a) = vector3(input)?;
    let (input, b) = vector3(input)?;
    let (input, c) = vector3(input)?;
    let (input, attribute) = le_u16(input)?;

    Ok((
        input,
        Triangle {
            normal,
            vertices: [Point3::from(a), Point3::from(b), Point3::from(c)],
            attribute,
        },
    ))
}

fn vector3(input: &[u8]) -> IResult<&[u8], Vector3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// Encode triangles as a binary STL buffer with a matching header count
#[cfg(test)]
pub(crate) fn encode(triangles: &[Triangle]) -> Vec<u8> {
    let mut data = vec![0u8; HEADER_LEN];
    data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for triangle in triangles {
        for value in triangle.normal.iter() {
            data.extend_from_slice(&value.to_le_bytes());
        }
        for vertex in &triangle.vertices {
            for value in vertex.coords.iter() {
                data.extend_from_slice(&value.to_le_bytes());
            }
        }
        data.extend_from_slice(&triangle.attribute.to_le_bytes());
    }
    data
}
