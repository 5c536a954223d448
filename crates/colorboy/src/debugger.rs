//! Breakpoint debugger driven from a line-based REPL.

use std::io::{BufRead, Write};
use std::num::ParseIntError;
use std::ops::ControlFlow;
use std::str::FromStr;

use anyhow::{Context, Result};
use thiserror::Error;

use colorboy_gb::GameBoy;

use crate::config::{parse_address, ConfigError};

const HELP: [(&str, &str); 9] = [
    ("p", "Print CPU state"),
    ("s [n]", "Step n instructions (default 1)"),
    ("b <addr>", "Set breakpoint"),
    ("m <addr>", "Read a byte from memory"),
    ("r", "Reset"),
    ("c", "Continue"),
    ("d", "Disconnect from debugger"),
    ("q", "Quit"),
    ("? | help", "Print this help message"),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Print,
    Step(u32),
    Break(u16),
    Memory(u16),
    Reset,
    Continue,
    Disconnect,
    Quit,
    Help,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}, try ? for help")]
    Unknown(String),
    #[error("{0} needs an address")]
    MissingAddress(&'static str),
    #[error("cannot parse step count {input:?}: {source}")]
    StepCount {
        input: String,
        #[source]
        source: ParseIntError,
    },
    #[error(transparent)]
    Address(#[from] ConfigError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let arg = words.next();
        let command = match name.to_ascii_lowercase().as_str() {
            "p" => Command::Print,
            "s" => match arg {
                Some(count) => Command::Step(count.parse().map_err(|source| {
                    CommandError::StepCount {
                        input: count.to_string(),
                        source,
                    }
                })?),
                None => Command::Step(1),
            },
            "b" => Command::Break(parse_address(arg.ok_or(CommandError::MissingAddress("b"))?)?),
            "m" => Command::Memory(parse_address(arg.ok_or(CommandError::MissingAddress("m"))?)?),
            "r" => Command::Reset,
            "c" => Command::Continue,
            "d" => Command::Disconnect,
            "q" => Command::Quit,
            "?" | "help" => Command::Help,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(command)
    }
}

/// What the emulation loop does after a debugger session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resume {
    Continue,
    Quit,
}

#[derive(Clone, Debug)]
pub struct Debugger {
    breakpoint: u16,
    attached: bool,
    dump: bool,
    /// Let the instruction at the breakpoint run once after resuming. Held
    /// while the CPU sits halted on the breakpoint.
    resumed: bool,
}

impl Debugger {
    pub fn new(breakpoint: u16, attached: bool, dump: bool) -> Self {
        Self {
            breakpoint,
            attached,
            dump,
            resumed: false,
        }
    }

    pub fn breakpoint(&self) -> u16 {
        self.breakpoint
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the per-instruction hook needs to run at all.
    pub fn is_active(&self) -> bool {
        self.attached || self.dump
    }

    /// Per-instruction hook: dumps state and breaks on the breakpoint.
    pub fn check(&mut self, gb: &GameBoy) -> ControlFlow<()> {
        if self.dump {
            println!("{}", gb.cpu_frame());
        }
        let at_breakpoint = gb.cpu.regs.pc == self.breakpoint;
        let skip = if at_breakpoint && gb.cpu.halted {
            self.resumed
        } else {
            std::mem::take(&mut self.resumed)
        };
        if self.attached && !skip && at_breakpoint {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    /// Run the REPL until the user continues, disconnects or quits. End of
    /// input detaches the debugger.
    pub fn session<R, W>(&mut self, gb: &mut GameBoy, mut input: R, mut out: W) -> Result<Resume>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(out, "Breakpoint hit at 0x{:04X}", gb.cpu.regs.pc)?;
        writeln!(out, "{}", gb.cpu_frame())?;

        let mut line = String::new();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                self.attached = false;
                return Ok(Resume::Continue);
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(CommandError::Empty) => continue,
                Err(err) => {
                    writeln!(out, "{err}")?;
                    continue;
                }
            };

            match command {
                Command::Print => writeln!(out, "{}", gb.cpu_frame())?,
                Command::Step(count) => {
                    writeln!(out, "Stepping forward by {count} instruction(s)")?;
                    for i in 0..count {
                        gb.step().context("step failed in debugger")?;
                        if self.dump {
                            writeln!(out, "{i}: {}", gb.cpu_frame())?;
                        }
                    }
                    writeln!(out, "{}", gb.cpu_frame())?;
                }
                Command::Break(addr) => {
                    self.breakpoint = addr;
                    writeln!(out, "Breakpoint set to 0x{addr:04X}")?;
                }
                Command::Memory(addr) => {
                    writeln!(out, "0x{addr:04X}: 0x{:02X}", gb.peek(addr))?;
                }
                Command::Reset => {
                    gb.reset();
                    writeln!(out, "Reset")?;
                }
                Command::Continue => {
                    self.resumed = true;
                    return Ok(Resume::Continue);
                }
                Command::Disconnect => {
                    self.attached = false;
                    writeln!(out, "Debugger disconnected")?;
                    return Ok(Resume::Continue);
                }
                Command::Quit => return Ok(Resume::Quit),
                Command::Help => {
                    writeln!(out, "Commands are:")?;
                    for (usage, description) in HELP {
                        writeln!(out, "    {usage:<10} {description}")?;
                    }
                }
            }
        }
    }
}
