//! Functional memory store.
//!
//! A sparse map of 64-byte lines keyed by physical line base. The store is
//! authoritative for page-table contents: timed line reads only model
//! latency and bandwidth, while entry values are always decoded from here.
//! Unmapped lines read as zero, which decodes to a not-present entry.
//!
//! Page-table images produced offline can be loaded from the text format
//! the table generator emits (`_META_` / `uint8` / `_DATA_` followed by one
//! `0x<addr> b0 .. b63` row per line).

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::common::addr::{line_base, line_offset};
use crate::common::constants::{LINE_BYTES, PTE_BYTES};

/// Sparse functional store of 64-byte memory lines.
#[derive(Default)]
pub struct MemoryMap {
    lines: HashMap<u64, [u8; LINE_BYTES as usize]>,
}

impl MemoryMap {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the 64-byte line at `line_addr` (zero-filled if unmapped).
    ///
    /// # Panics
    ///
    /// Panics if `line_addr` is not 64-byte aligned.
    pub fn load(&self, line_addr: u64) -> [u8; LINE_BYTES as usize] {
        assert_eq!(
            line_offset(line_addr),
            0,
            "memory map load of unaligned line address {:#x}",
            line_addr
        );
        self.lines
            .get(&line_addr)
            .copied()
            .unwrap_or([0; LINE_BYTES as usize])
    }

    /// Reads a little-endian quadword at `addr`.
    ///
    /// # Panics
    ///
    /// Panics if the quadword would straddle a line boundary.
    pub fn read_qword(&self, addr: u64) -> u64 {
        let base = line_base(addr);
        let off = line_offset(addr);
        assert!(
            off as u64 <= LINE_BYTES - PTE_BYTES,
            "quadword at {:#x} crosses a {}-byte line",
            addr,
            LINE_BYTES
        );
        let line = self.load(base);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&line[off..off + 8]);
        u64::from_le_bytes(bytes)
    }

    /// Writes a little-endian quadword at `addr`, mapping the line if needed.
    ///
    /// # Panics
    ///
    /// Panics if the quadword would straddle a line boundary.
    pub fn write_qword(&mut self, addr: u64, value: u64) {
        let base = line_base(addr);
        let off = line_offset(addr);
        assert!(
            off as u64 <= LINE_BYTES - PTE_BYTES,
            "quadword at {:#x} crosses a {}-byte line",
            addr,
            LINE_BYTES
        );
        let line = self.lines.entry(base).or_insert([0; LINE_BYTES as usize]);
        line[off..off + 8].copy_from_slice(&value.to_le_bytes());
    }

    /// Installs a full line at `line_addr`.
    ///
    /// # Panics
    ///
    /// Panics if `line_addr` is not 64-byte aligned.
    pub fn write_line(&mut self, line_addr: u64, data: [u8; LINE_BYTES as usize]) {
        assert_eq!(
            line_offset(line_addr),
            0,
            "memory map store of unaligned line address {:#x}",
            line_addr
        );
        self.lines.insert(line_addr, data);
    }

    /// Returns true if a line is explicitly mapped.
    pub fn is_mapped(&self, line_addr: u64) -> bool {
        self.lines.contains_key(&line_base(line_addr))
    }

    /// Number of mapped lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if no lines are mapped.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Loads a memory-map image file into the store.
    ///
    /// The expected format is the one the offline table generator writes:
    /// a `_META_` header declaring `uint8` data, a `_DATA_` marker, then one
    /// row per line of `0x<16-digit addr>` followed by 64 decimal bytes.
    ///
    /// Returns the number of lines loaded.
    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> io::Result<usize> {
        let reader = BufReader::new(File::open(path)?);
        let mut in_data = false;
        let mut loaded = 0;

        for line in reader.lines() {
            let line = line?;
            let text = line.trim();
            if text.is_empty() || text == "_META_" || text == "uint8" {
                continue;
            }
            if text == "_DATA_" {
                in_data = true;
                continue;
            }
            if !in_data {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unexpected header token: {}", text),
                ));
            }

            let mut fields = text.split_whitespace();
            let addr_field = fields.next().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "missing line address")
            })?;
            let addr = parse_hex(addr_field)?;

            let mut data = [0u8; LINE_BYTES as usize];
            for byte in data.iter_mut() {
                let field = fields.next().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("short line at {:#x}", addr),
                    )
                })?;
                *byte = field.parse::<u8>().map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("bad byte: {}", e))
                })?;
            }

            self.write_line(addr, data);
            loaded += 1;
        }

        Ok(loaded)
    }
}

fn parse_hex(field: &str) -> io::Result<u64> {
    let digits = field.strip_prefix("0x").unwrap_or(field);
    u64::from_str_radix(digits, 16)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("bad address: {}", e)))
}
