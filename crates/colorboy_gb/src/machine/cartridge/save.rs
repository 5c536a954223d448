//! Battery RAM save documents.
//!
//! Each bank is CRC32-hashed over its raw bytes, zlib-compressed and stored
//! as standard base64 inside a small JSON document:
//!
//! ```json
//! {"NoOfBanks":4,"Banks":["eJzt..."],"BankHashes":[1234],"LastSaved":"1700000000"}
//! ```

use std::io::{self, Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RAM_BANK_SIZE;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("malformed save document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("save declares {declared} banks but holds {actual}")]
    BankCountMismatch { declared: usize, actual: usize },
    #[error("save holds {actual} banks, cartridge expects {expected}")]
    UnexpectedBankCount { expected: usize, actual: usize },
    #[error("save holds {banks} banks but {hashes} hashes")]
    HashCountMismatch { banks: usize, hashes: usize },
    #[error("bank {bank} is not valid base64: {source}")]
    Base64 {
        bank: usize,
        #[source]
        source: base64::DecodeError,
    },
    #[error("bank {bank} failed to inflate: {source}")]
    Inflate {
        bank: usize,
        #[source]
        source: io::Error,
    },
    #[error("bank {bank} is {len} bytes, expected {RAM_BANK_SIZE}")]
    BankSize { bank: usize, len: usize },
    #[error("bank {bank} hash mismatch (stored {stored:08X}, computed {computed:08X})")]
    HashMismatch {
        bank: usize,
        stored: u32,
        computed: u32,
    },
    #[error("cartridge has no battery-backed RAM")]
    NoBatteryRam,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Save {
    pub no_of_banks: usize,
    pub banks: Vec<String>,
    pub bank_hashes: Vec<u32>,
    /// Unix seconds at the time of writing.
    pub last_saved: String,
}

impl Save {
    pub fn from_banks(banks: &[Vec<u8>]) -> Result<Self, SaveError> {
        let mut encoded = Vec::with_capacity(banks.len());
        let mut hashes = Vec::with_capacity(banks.len());
        for bank in banks {
            hashes.push(crc32fast::hash(bank));
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(bank)?;
            encoded.push(STANDARD.encode(encoder.finish()?));
        }

        let last_saved = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();

        Ok(Self {
            no_of_banks: banks.len(),
            banks: encoded,
            bank_hashes: hashes,
            last_saved: last_saved.to_string(),
        })
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn read<R: Read>(reader: R) -> Result<Self, SaveError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Decode and verify every bank. `expected` is the bank count the
    /// cartridge was built with.
    pub fn into_banks(self, expected: usize) -> Result<Vec<Vec<u8>>, SaveError> {
        if self.no_of_banks != self.banks.len() {
            return Err(SaveError::BankCountMismatch {
                declared: self.no_of_banks,
                actual: self.banks.len(),
            });
        }
        if self.banks.len() != expected {
            return Err(SaveError::UnexpectedBankCount {
                expected,
                actual: self.banks.len(),
            });
        }
        if self.bank_hashes.len() != self.banks.len() {
            return Err(SaveError::HashCountMismatch {
                banks: self.banks.len(),
                hashes: self.bank_hashes.len(),
            });
        }

        self.banks
            .iter()
            .zip(&self.bank_hashes)
            .enumerate()
            .map(|(bank, (encoded, &stored))| {
                let compressed = STANDARD
                    .decode(encoded)
                    .map_err(|source| SaveError::Base64 { bank, source })?;

                let mut data = Vec::with_capacity(RAM_BANK_SIZE);
                ZlibDecoder::new(compressed.as_slice())
                    .read_to_end(&mut data)
                    .map_err(|source| SaveError::Inflate { bank, source })?;

                if data.len() != RAM_BANK_SIZE {
                    return Err(SaveError::BankSize {
                        bank,
                        len: data.len(),
                    });
                }

                let computed = crc32fast::hash(&data);
                if computed != stored {
                    return Err(SaveError::HashMismatch {
                        bank,
                        stored,
                        computed,
                    });
                }
                Ok(data)
            })
            .collect()
    }
}
