//! STARK Proof Transcript Codec
//!
//! Fixed binary layout, all integers little-endian:
//!
//! ```text
//! trace_commitment        32
//! composition_commitment  32
//! trace_oods              16   (QM31)
//! composition_oods        16   (QM31)
//! fri_layer_count          1   N
//! fri_layer_commitment    32 × N
//! final_poly_len           2   L (u16)
//! final_poly              16 × L
//! query_count              1   Q
//! query × Q:
//!   index                  4   (u32)
//!   trace_value           32
//!   trace_path_len         1   D, then 32 × D siblings
//!   composition_value     32
//!   comp_path_len          1   D', then 32 × D' siblings
//!   per FRI layer (N):
//!     siblings            64   (4 × QM31)
//!     layer_path_len       1   then 32 × len siblings
//! ```
//!
//! The codec is purely structural. Soundness checks live in `verifier`.

use thiserror::Error;

use crate::crypto::m31::{QM31, QM31_LEN};

/// Merkle sibling hashes, leaf-to-root order.
pub type MerklePath = Vec<[u8; 32]>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("truncated proof: need {needed} bytes at offset {offset}")]
    TruncatedProof { offset: usize, needed: usize },

    #[error("{remaining} trailing bytes after last query")]
    TrailingBytes { remaining: usize },

    #[error("{field} count does not fit its wire width")]
    CountOverflow { field: &'static str },
}

/// Opening of one FRI layer for one query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FriLayerOpening {
    /// The four coset values folded together at this layer.
    pub siblings: [QM31; 4],
    pub path: MerklePath,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryProof {
    /// Position in the evaluation domain.
    pub index: u32,
    pub trace_value: [u8; 32],
    pub trace_path: MerklePath,
    pub composition_value: [u8; 32],
    pub composition_path: MerklePath,
    /// One opening per FRI layer, innermost first.
    pub fri_layers: Vec<FriLayerOpening>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StarkProof {
    pub trace_commitment: [u8; 32],
    pub composition_commitment: [u8; 32],
    pub trace_oods: QM31,
    pub composition_oods: QM31,
    pub fri_layer_commitments: Vec<[u8; 32]>,
    pub final_poly: Vec<QM31>,
    pub queries: Vec<QueryProof>,
}

// ============================================================================
// DECODING
// ============================================================================

struct ProofReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ProofReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TranscriptError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| TranscriptError::TruncatedProof {
                offset: self.pos,
                needed: n,
            })?;
        let data: &'a [u8] = self.data;
        let out = &data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, TranscriptError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, TranscriptError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, TranscriptError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn hash(&mut self) -> Result<[u8; 32], TranscriptError> {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.take(32)?);
        Ok(out)
    }

    fn qm31(&mut self) -> Result<QM31, TranscriptError> {
        let mut raw = [0u8; QM31_LEN];
        raw.copy_from_slice(self.take(QM31_LEN)?);
        Ok(QM31::from_le_bytes(&raw))
    }

    fn path(&mut self) -> Result<MerklePath, TranscriptError> {
        let len = self.u8()? as usize;
        (0..len).map(|_| self.hash()).collect()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl StarkProof {
    /// Decode a transcript, consuming every byte.
    pub fn decode(data: &[u8]) -> Result<Self, TranscriptError> {
        let mut r = ProofReader::new(data);

        let trace_commitment = r.hash()?;
        let composition_commitment = r.hash()?;
        let trace_oods = r.qm31()?;
        let composition_oods = r.qm31()?;

        let n_layers = r.u8()? as usize;
        let fri_layer_commitments = (0..n_layers)
            .map(|_| r.hash())
            .collect::<Result<Vec<_>, _>>()?;

        let poly_len = r.u16()? as usize;
        let final_poly = (0..poly_len)
            .map(|_| r.qm31())
            .collect::<Result<Vec<_>, _>>()?;

        let n_queries = r.u8()? as usize;
        let mut queries = Vec::with_capacity(n_queries);
        for _ in 0..n_queries {
            let index = r.u32()?;
            let trace_value = r.hash()?;
            let trace_path = r.path()?;
            let composition_value = r.hash()?;
            let composition_path = r.path()?;

            let mut fri_layers = Vec::with_capacity(n_layers);
            for _ in 0..n_layers {
                let siblings = [r.qm31()?, r.qm31()?, r.qm31()?, r.qm31()?];
                let path = r.path()?;
                fri_layers.push(FriLayerOpening { siblings, path });
            }

            queries.push(QueryProof {
                index,
                trace_value,
                trace_path,
                composition_value,
                composition_path,
                fri_layers,
            });
        }

        if r.remaining() != 0 {
            return Err(TranscriptError::TrailingBytes {
                remaining: r.remaining(),
            });
        }

        Ok(Self {
            trace_commitment,
            composition_commitment,
            trace_oods,
            composition_oods,
            fri_layer_commitments,
            final_poly,
            queries,
        })
    }

    // ========================================================================
    // ENCODING
    // ========================================================================

    /// Exact size of `encode()` output.
    pub fn encoded_len(&self) -> usize {
        let header = 32 + 32 + QM31_LEN * 2
            + 1
            + 32 * self.fri_layer_commitments.len()
            + 2
            + QM31_LEN * self.final_poly.len()
            + 1;
        let queries: usize = self
            .queries
            .iter()
            .map(|q| {
                4 + 32
                    + 1
                    + 32 * q.trace_path.len()
                    + 32
                    + 1
                    + 32 * q.composition_path.len()
                    + q.fri_layers
                        .iter()
                        .map(|l| QM31_LEN * 4 + 1 + 32 * l.path.len())
                        .sum::<usize>()
            })
            .sum();
        header + queries
    }

    pub fn encode(&self) -> Result<Vec<u8>, TranscriptError> {
        let n_layers = count_u8(self.fri_layer_commitments.len(), "fri_layer")?;
        let poly_len = u16::try_from(self.final_poly.len())
            .map_err(|_| TranscriptError::CountOverflow { field: "final_poly" })?;
        let n_queries = count_u8(self.queries.len(), "query")?;

        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.trace_commitment);
        out.extend_from_slice(&self.composition_commitment);
        out.extend_from_slice(&self.trace_oods.to_le_bytes());
        out.extend_from_slice(&self.composition_oods.to_le_bytes());

        out.push(n_layers);
        for commitment in &self.fri_layer_commitments {
            out.extend_from_slice(commitment);
        }

        out.extend_from_slice(&poly_len.to_le_bytes());
        for coeff in &self.final_poly {
            out.extend_from_slice(&coeff.to_le_bytes());
        }

        out.push(n_queries);
        for q in &self.queries {
            // Every query must open every layer or decode would misalign.
            if q.fri_layers.len() != self.fri_layer_commitments.len() {
                return Err(TranscriptError::CountOverflow { field: "query_fri_layer" });
            }
            out.extend_from_slice(&q.index.to_le_bytes());
            out.extend_from_slice(&q.trace_value);
            write_path(&mut out, &q.trace_path, "trace_path")?;
            out.extend_from_slice(&q.composition_value);
            write_path(&mut out, &q.composition_path, "composition_path")?;
            for layer in &q.fri_layers {
                for sibling in &layer.siblings {
                    out.extend_from_slice(&sibling.to_le_bytes());
                }
                write_path(&mut out, &layer.path, "fri_layer_path")?;
            }
        }

        Ok(out)
    }
}

fn count_u8(len: usize, field: &'static str) -> Result<u8, TranscriptError> {
    u8::try_from(len).map_err(|_| TranscriptError::CountOverflow { field })
}

fn write_path(out: &mut Vec<u8>, path: &MerklePath, field: &'static str) -> Result<(), TranscriptError> {
    out.push(count_u8(path.len(), field)?);
    for sibling in path {
        out.extend_from_slice(sibling);
    }
    Ok(())
}
