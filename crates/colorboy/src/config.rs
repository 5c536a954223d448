use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;
use typed_builder::TypedBuilder;

use colorboy_gb::MachineOptions;

pub const MIN_SCREEN_SIZE: u32 = 1;
pub const MAX_SCREEN_SIZE: u32 = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config validation error: title cannot be blank")]
    BlankTitle,
    #[error("config validation error: screen size must be between 1 and 6, got {0}")]
    ScreenSize(u32),
    #[error("could not parse memory address {input:?}: {source}")]
    Address {
        input: String,
        #[source]
        source: ParseIntError,
    },
}

/// Runtime settings for one emulator session.
#[derive(Clone, Debug, TypedBuilder)]
pub struct Config {
    #[builder(setter(into))]
    pub rom_path: PathBuf,
    #[builder(default = String::from("colorboy"), setter(into))]
    pub title: String,
    #[builder(default = 1)]
    pub screen_size: u32,
    #[builder(default = false)]
    pub skip_boot: bool,
    #[builder(default = false)]
    pub show_fps: bool,
    #[builder(default = true)]
    pub color_mode: bool,
    #[builder(default = false)]
    pub headless: bool,
    /// Stop after this many presented frames.
    #[builder(default)]
    pub frames: Option<u64>,
    #[builder(default = false)]
    pub debug: bool,
    #[builder(default = 0x0000)]
    pub break_on: u16,
    /// Print the CPU frame after every instruction.
    #[builder(default = false)]
    pub dump_state: bool,
    #[builder(default)]
    pub boot_rom: Option<PathBuf>,
    #[builder(default = PathBuf::from("."), setter(into))]
    pub save_dir: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::BlankTitle);
        }
        if !(MIN_SCREEN_SIZE..=MAX_SCREEN_SIZE).contains(&self.screen_size) {
            return Err(ConfigError::ScreenSize(self.screen_size));
        }
        Ok(())
    }

    /// Options handed to the core. `boot_rom` is the already loaded image,
    /// if any.
    pub fn machine_options(&self, boot_rom: Option<Vec<u8>>) -> MachineOptions {
        let options = MachineOptions::builder()
            .skip_boot(self.skip_boot)
            .color_mode(self.color_mode);
        match boot_rom {
            Some(image) => options.boot_rom(image).build(),
            None => options.build(),
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(50);
        writeln!(f, "Configuration settings")?;
        writeln!(f, "{rule}")?;
        let rows: [(&str, String); 12] = [
            ("Title:", self.title.clone()),
            ("ROM:", self.rom_path.display().to_string()),
            ("Skip Boot:", self.skip_boot.to_string()),
            ("GB Color Mode:", self.color_mode.to_string()),
            ("Display FPS:", self.show_fps.to_string()),
            ("Screen Size:", self.screen_size.to_string()),
            ("Debug mode?:", self.debug.to_string()),
            ("Breakpoint:", format!("0x{:04X}", self.break_on)),
            ("CPU Dump?:", self.dump_state.to_string()),
            ("Headless:", self.headless.to_string()),
            (
                "Boot ROM:",
                self.boot_rom
                    .as_ref()
                    .map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
            ),
            ("Save dir:", self.save_dir.display().to_string()),
        ];
        for (label, value) in rows {
            writeln!(f, "{label:<19} {value}")?;
        }
        write!(f, "{rule}")
    }
}

/// Parse a hexadecimal address, with or without a `0x` or `$` prefix.
pub fn parse_address(input: &str) -> Result<u16, ConfigError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix('$'))
        .unwrap_or(trimmed);
    u16::from_str_radix(digits, 16).map_err(|source| ConfigError::Address {
        input: input.to_string(),
        source,
    })
}
