use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{parse_address, Config};

/// Game Boy and Game Boy Color emulator.
#[derive(Debug, Parser)]
#[command(name = "colorboy", version, about)]
pub struct Cli {
    /// Path to the ROM image
    pub rom: PathBuf,

    /// Skip the boot sequence and start at 0x0100
    #[arg(long)]
    pub skip_boot: bool,

    /// Screen size multiplier
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=6))]
    pub size: u32,

    /// Log the average frames per second
    #[arg(long)]
    pub show_fps: bool,

    /// Present Game Boy Color hardware
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub color: bool,

    /// Run without opening a window
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many frames (headless only)
    #[arg(long, requires = "headless")]
    pub frames: Option<u64>,

    /// Start with the debugger attached
    #[arg(long)]
    pub debug: bool,

    /// Breakpoint address in hex, used with --debug
    #[arg(short = 'b', long, default_value = "0x0000", value_parser = parse_address)]
    pub break_on: u16,

    /// Print the CPU state after every instruction
    #[arg(long)]
    pub dump: bool,

    /// Boot ROM image to run instead of the built-in boot program
    #[arg(long)]
    pub boot_rom: Option<PathBuf>,

    /// Directory battery saves are kept in
    #[arg(long, default_value = ".")]
    pub save_dir: PathBuf,

    /// Window title
    #[arg(long, default_value = "colorboy")]
    pub title: String,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config::builder()
            .rom_path(cli.rom)
            .title(cli.title)
            .screen_size(cli.size)
            .skip_boot(cli.skip_boot)
            .show_fps(cli.show_fps)
            .color_mode(cli.color)
            .headless(cli.headless)
            .frames(cli.frames)
            .debug(cli.debug)
            .break_on(cli.break_on)
            .dump_state(cli.dump)
            .boot_rom(cli.boot_rom)
            .save_dir(cli.save_dir)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("colorboy").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let cli = match parse(&["tetris.gb"]) {
            Ok(cli) => cli,
            Err(err) => panic!("{err}"),
        };
        let config = Config::from(cli);
        assert_eq!(config.rom_path, PathBuf::from("tetris.gb"));
        assert_eq!(config.screen_size, 1);
        assert!(config.color_mode);
        assert!(!config.skip_boot);
        assert_eq!(config.break_on, 0x0000);
        assert_eq!(config.save_dir, PathBuf::from("."));
        assert_eq!(config.title, "colorboy");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn all_flags() {
        let cli = match parse(&[
            "zelda.gbc",
            "--skip-boot",
            "--size",
            "4",
            "--show-fps",
            "--color",
            "false",
            "--headless",
            "--frames",
            "120",
            "--debug",
            "-b",
            "0x0150",
            "--dump",
            "--boot-rom",
            "boot.bin",
            "--save-dir",
            "saves",
            "--title",
            "Zelda",
        ]) {
            Ok(cli) => cli,
            Err(err) => panic!("{err}"),
        };
        let config = Config::from(cli);
        assert!(config.skip_boot);
        assert_eq!(config.screen_size, 4);
        assert!(config.show_fps);
        assert!(!config.color_mode);
        assert!(config.headless);
        assert_eq!(config.frames, Some(120));
        assert!(config.debug);
        assert_eq!(config.break_on, 0x0150);
        assert!(config.dump_state);
        assert_eq!(config.boot_rom, Some(PathBuf::from("boot.bin")));
        assert_eq!(config.save_dir, PathBuf::from("saves"));
        assert_eq!(config.title, "Zelda");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["game.gb", "--size", "0"]).is_err());
        assert!(parse(&["game.gb", "--size", "7"]).is_err());
        assert!(parse(&["game.gb", "-b", "nothex"]).is_err());
        assert!(parse(&["game.gb", "--frames", "10"]).is_err());
    }
}
