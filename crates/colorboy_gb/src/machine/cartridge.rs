//! Cartridge header parsing and memory bank controllers.
//!
//! A [`Cartridge`] owns the raw ROM image and one mapper. The MMU forwards
//! every access in 0000–7FFF and A000–BFFF here; writes into the ROM window
//! land on the mapper's control registers.

mod mbc0;
mod mbc1;
mod mbc3;
mod mbc5;
mod ram;
mod save;

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;

use mbc0::Mbc0;
use mbc1::Mbc1;
use mbc3::Mbc3;
use mbc5::Mbc5;
pub use ram::RAM_BANK_SIZE;
use ram::RamBanks;
pub use save::{Save, SaveError};

/// Size of one switchable ROM bank.
pub const ROM_BANK_SIZE: usize = 0x4000;
/// Smallest valid image: two 16 KiB banks.
pub const MIN_ROM_SIZE: usize = 0x8000;

const TITLE: std::ops::Range<usize> = 0x134..0x142;
const CGB_FLAG: usize = 0x143;
const CART_TYPE: usize = 0x147;
const ROM_SIZE: usize = 0x148;
const RAM_SIZE: usize = 0x149;
const DESTINATION: usize = 0x14A;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("ROM image is {len} bytes, at least {MIN_ROM_SIZE} required")]
    TooSmall { len: usize },
    #[error("unknown cartridge type 0x{0:02X}")]
    UnknownType(u8),
    #[error("unsupported ROM size code 0x{0:02X}")]
    UnsupportedRomSize(u8),
}

/// The controller family a cartridge type byte selects.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CartridgeType {
    Mbc0,
    Mbc1,
    Mbc3,
    Mbc5,
}

impl CartridgeType {
    /// Decode header byte 0x147 into a controller and battery flag.
    pub fn from_header(id: u8) -> Result<(Self, bool), CartridgeError> {
        let decoded = match id {
            0x00 => (Self::Mbc0, false),
            0x01 | 0x02 => (Self::Mbc1, false),
            0x03 => (Self::Mbc1, true),
            0x11 | 0x12 => (Self::Mbc3, false),
            0x13 => (Self::Mbc3, true),
            0x19 | 0x1A | 0x1C | 0x1D => (Self::Mbc5, false),
            0x1B | 0x1E => (Self::Mbc5, true),
            other => return Err(CartridgeError::UnknownType(other)),
        };
        Ok(decoded)
    }

    /// RAM banks a controller of this type allocates when the header
    /// declares any RAM at all.
    pub fn ram_banks(self) -> usize {
        match self {
            Self::Mbc0 => 0,
            Self::Mbc1 | Self::Mbc3 => 4,
            Self::Mbc5 => 16,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Mbc0 => "ROM ONLY",
            Self::Mbc1 => "MBC1",
            Self::Mbc3 => "MBC3",
            Self::Mbc5 => "MBC5",
        }
    }
}

/// Header fields decoded from 0x134..0x14F.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub title: String,
    pub is_color: bool,
    pub type_id: u8,
    pub rom_size: usize,
    pub ram_size: usize,
    pub is_japanese: bool,
}

impl Header {
    pub fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < MIN_ROM_SIZE {
            return Err(CartridgeError::TooSmall { len: rom.len() });
        }

        let title = String::from_utf8_lossy(&rom[TITLE])
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string();

        let rom_code = rom[ROM_SIZE];
        if rom_code > 6 {
            return Err(CartridgeError::UnsupportedRomSize(rom_code));
        }

        let ram_size = match rom[RAM_SIZE] {
            0x01 => 0x800,
            0x02 => 0x2000,
            0x03 => 0x8000,
            0x04 => 0x20000,
            _ => 0,
        };

        Ok(Self {
            title,
            is_color: matches!(rom[CGB_FLAG], 0x80 | 0xC0),
            type_id: rom[CART_TYPE],
            rom_size: MIN_ROM_SIZE << rom_code,
            ram_size,
            is_japanese: rom[DESTINATION] == 0x00,
        })
    }
}

enum Mapper {
    Mbc0(Mbc0),
    Mbc1(Mbc1),
    Mbc3(Mbc3),
    Mbc5(Mbc5),
}

pub struct Cartridge {
    filename: String,
    header: Header,
    kind: CartridgeType,
    has_battery: bool,
    mapper: Mapper,
}

impl Cartridge {
    /// Parse the header of `rom` and build the matching controller.
    ///
    /// `filename` only feeds the save id, so any path-like string works.
    pub fn new(filename: &str, rom: &[u8]) -> Result<Self, CartridgeError> {
        let header = Header::parse(rom)?;
        let (kind, has_battery) = CartridgeType::from_header(header.type_id)?;

        let ram = if header.ram_size > 0 {
            RamBanks::new(kind.ram_banks())
        } else {
            RamBanks::new(0)
        };

        let mapper = match kind {
            CartridgeType::Mbc0 => Mapper::Mbc0(Mbc0::new(rom)),
            CartridgeType::Mbc1 => Mapper::Mbc1(Mbc1::new(rom, ram)),
            CartridgeType::Mbc3 => Mapper::Mbc3(Mbc3::new(rom, ram)),
            CartridgeType::Mbc5 => Mapper::Mbc5(Mbc5::new(rom, ram)),
        };

        Ok(Self {
            filename: filename.to_string(),
            header,
            kind,
            has_battery,
            mapper,
        })
    }

    pub fn title(&self) -> &str {
        &self.header.title
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn kind(&self) -> CartridgeType {
        self.kind
    }

    pub fn is_color(&self) -> bool {
        self.header.is_color
    }

    pub fn has_battery(&self) -> bool {
        self.has_battery
    }

    pub fn has_ram(&self) -> bool {
        self.ram().is_some_and(|ram| !ram.is_empty())
    }

    /// Identifier used by save stores: the ROM file name plus `.sav`.
    pub fn save_id(&self) -> String {
        let base = Path::new(&self.filename)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.clone());
        format!("{base}.sav")
    }

    pub fn read(&self, addr: u16) -> u8 {
        match &self.mapper {
            Mapper::Mbc0(m) => m.read(addr),
            Mapper::Mbc1(m) => m.read(addr),
            Mapper::Mbc3(m) => m.read(addr),
            Mapper::Mbc5(m) => m.read(addr),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match &mut self.mapper {
            Mapper::Mbc0(_) => {}
            Mapper::Mbc1(m) => m.write(addr, value),
            Mapper::Mbc3(m) => m.write(addr, value),
            Mapper::Mbc5(m) => m.write(addr, value),
        }
    }

    /// Persist external RAM as the JSON save document.
    pub fn save_ram<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        let ram = self.battery_ram()?;
        Save::from_banks(ram.banks())?.write(writer)
    }

    /// Restore external RAM from a save document.
    ///
    /// On error the RAM is left untouched.
    pub fn load_ram<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let expected = self.battery_ram()?.len();
        let banks = Save::read(reader)?.into_banks(expected)?;
        if let Some(ram) = self.ram_mut() {
            ram.replace(banks);
        }
        Ok(())
    }

    fn battery_ram(&self) -> Result<&RamBanks, SaveError> {
        match self.ram() {
            Some(ram) if self.has_battery && !ram.is_empty() => Ok(ram),
            _ => Err(SaveError::NoBatteryRam),
        }
    }

    fn ram(&self) -> Option<&RamBanks> {
        match &self.mapper {
            Mapper::Mbc0(_) => None,
            Mapper::Mbc1(m) => Some(m.ram()),
            Mapper::Mbc3(m) => Some(m.ram()),
            Mapper::Mbc5(m) => Some(m.ram()),
        }
    }

    fn ram_mut(&mut self) -> Option<&mut RamBanks> {
        match &mut self.mapper {
            Mapper::Mbc0(_) => None,
            Mapper::Mbc1(m) => Some(m.ram_mut()),
            Mapper::Mbc3(m) => Some(m.ram_mut()),
            Mapper::Mbc5(m) => Some(m.ram_mut()),
        }
    }
}

impl fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cartridge")
            .field("filename", &self.filename)
            .field("header", &self.header)
            .field("kind", &self.kind)
            .field("has_battery", &self.has_battery)
            .finish()
    }
}

impl fmt::Display for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} ({}{}, type 0x{:02X}, ROM {} KiB, RAM {} KiB, {}{})",
            self.header.title,
            self.kind.name(),
            if self.has_battery { "+BATTERY" } else { "" },
            self.header.type_id,
            self.header.rom_size / 1024,
            self.header.ram_size / 1024,
            if self.header.is_color { "CGB" } else { "DMG" },
            if self.header.is_japanese { ", JP" } else { "" },
        )
    }
}

/// Split a ROM image into 16 KiB banks, padding the last one with 0xFF.
fn rom_banks(rom: &[u8]) -> Vec<Vec<u8>> {
    let mut banks: Vec<Vec<u8>> = rom
        .chunks(ROM_BANK_SIZE)
        .map(|chunk| {
            let mut bank = chunk.to_vec();
            bank.resize(ROM_BANK_SIZE, 0xFF);
            bank
        })
        .collect();
    while banks.len() < 2 {
        banks.push(vec![0xFF; ROM_BANK_SIZE]);
    }
    banks
}
