//! Ties the emulation thread to a presenter.
//!
//! The emulation thread owns the `GameBoy` and pushes every finished frame
//! through a bounded channel. The I/O side (an [`IoApp`] driven by a
//! presenter) shows the frames and feeds key edges back through the shared
//! keypad state. When the presenter exits the machine comes back through the
//! thread's join handle so cartridge RAM can be saved.

use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use colorboy_common::app::App;
use colorboy_common::key::Key;
use colorboy_gb::{Button, Cartridge, GameBoy, KeypadHandle, Screen, SCREEN_HEIGHT, SCREEN_WIDTH};

use crate::config::Config;
use crate::debugger::{Debugger, Resume};
use crate::fps::FpsCounter;
use crate::saves::{FileSystemStore, SaveStore};

/// How long the presenter waits for a frame before redrawing the last one.
const FRAME_WAIT: Duration = Duration::from_millis(50);

/// Load the cartridge named by `config` and run it until the presenter or
/// the debugger stops it.
pub fn run(config: Config) -> Result<()> {
    config.validate()?;
    log::info!("\n{config}");

    let rom = fs::read(&config.rom_path)
        .with_context(|| format!("failed to read ROM {}", config.rom_path.display()))?;
    let cartridge = Cartridge::new(&config.rom_path.to_string_lossy(), &rom)
        .with_context(|| format!("failed to load cartridge {}", config.rom_path.display()))?;
    log::info!("Loaded cartridge: {cartridge}");

    let boot_rom = match &config.boot_rom {
        Some(path) => Some(
            fs::read(path)
                .with_context(|| format!("failed to read boot ROM {}", path.display()))?,
        ),
        None => None,
    };
    let gb = GameBoy::new(cartridge, config.machine_options(boot_rom))?;

    let store = FileSystemStore::new(&config.save_dir);
    let headless = config.headless;
    let runner = Runner::new(config, Box::new(store));
    if headless {
        runner.run_with(gb, |app| crate::headless::run(app))?;
    } else {
        runner.run_with(gb, present_windowed)?;
    }
    Ok(())
}

#[cfg(feature = "sdl")]
fn present_windowed(app: IoApp) -> Result<()> {
    let info = crate::sdl::SdlInitInfo::builder()
        .width(app.width())
        .height(app.height())
        .scale(app.scale())
        .title(app.title())
        .build();
    crate::sdl::SdlContext::run(info, app)
}

#[cfg(not(feature = "sdl"))]
fn present_windowed(app: IoApp) -> Result<()> {
    log::warn!("Built without the `sdl` feature, running headless");
    crate::headless::run(app)
}

pub struct Runner {
    config: Config,
    store: Box<dyn SaveStore>,
}

impl Runner {
    pub fn new(config: Config, store: Box<dyn SaveStore>) -> Self {
        Self { config, store }
    }

    /// Start the emulation thread, hand the I/O side to `present`, and save
    /// cartridge RAM once both have stopped. Returns the machine.
    pub fn run_with<P>(&self, mut gb: GameBoy, present: P) -> Result<GameBoy>
    where
        P: FnOnce(IoApp) -> Result<()>,
    {
        load_save(&mut gb, self.store.as_ref());

        let (frames_tx, frames_rx) = bounded(1);
        let stop = Arc::new(AtomicBool::new(false));
        let app = IoApp::new(frames_rx, gb.keypad_handle(), Arc::clone(&stop), &self.config);
        let debugger = Debugger::new(
            self.config.break_on,
            self.config.debug,
            self.config.dump_state,
        );

        let emu_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("emulation".to_string())
            .spawn(move || emulate(gb, frames_tx, emu_stop, debugger))
            .context("failed to start the emulation thread")?;

        let presented = present(app);
        stop.store(true, Ordering::Relaxed);
        let (gb, emulated) = handle
            .join()
            .map_err(|_| anyhow!("emulation thread panicked"))?;

        store_save(&gb, self.store.as_ref())?;
        presented?;
        emulated?;
        Ok(gb)
    }
}

fn emulate(
    mut gb: GameBoy,
    frames: Sender<Screen>,
    stop: Arc<AtomicBool>,
    mut debugger: Debugger,
) -> (GameBoy, Result<()>) {
    let result = emulation_loop(&mut gb, &frames, &stop, &mut debugger);
    if let Err(err) = &result {
        log::error!("Emulation stopped: {err:#}");
    }
    (gb, result)
}

fn emulation_loop(
    gb: &mut GameBoy,
    frames: &Sender<Screen>,
    stop: &AtomicBool,
    debugger: &mut Debugger,
) -> Result<()> {
    while !stop.load(Ordering::Relaxed) {
        let stepped = if debugger.is_active() {
            gb.step_frame_with(|gb| debugger.check(gb))
        } else {
            gb.step_frame().map(|()| ControlFlow::Continue(()))
        };
        let flow = stepped.context("emulation failed")?;

        if flow.is_break() {
            let stdin = io::stdin();
            match debugger.session(gb, stdin.lock(), io::stdout().lock())? {
                Resume::Continue => continue,
                Resume::Quit => {
                    log::info!("Quit from debugger");
                    stop.store(true, Ordering::Relaxed);
                    break;
                }
            }
        }

        if frames.send(gb.screen()).is_err() {
            log::debug!("Presenter gone, stopping emulation");
            break;
        }
    }
    Ok(())
}

/// Restore battery RAM. A missing or unreadable save leaves RAM zeroed.
fn load_save(gb: &mut GameBoy, store: &dyn SaveStore) {
    let Some(game) = battery_save_id(gb) else {
        return;
    };
    let reader = match store.open(&game) {
        Ok(reader) => reader,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("No save found for {game}");
            return;
        }
        Err(err) => {
            log::warn!("Could not open save {game}: {err}");
            return;
        }
    };
    match gb.load_ram(BufReader::new(reader)) {
        Ok(()) => log::info!("Loaded save {game}"),
        Err(err) => log::warn!("Could not load save {game}, starting with empty RAM: {err}"),
    }
}

fn store_save(gb: &GameBoy, store: &dyn SaveStore) -> Result<()> {
    let Some(game) = battery_save_id(gb) else {
        return Ok(());
    };
    let mut writer = BufWriter::new(
        store
            .create(&game)
            .with_context(|| format!("failed to create save {game}"))?,
    );
    gb.save_ram(&mut writer)
        .with_context(|| format!("failed to write save {game}"))?;
    writer.flush()?;
    log::info!("Saved {game}");
    Ok(())
}

fn battery_save_id(gb: &GameBoy) -> Option<String> {
    gb.cartridge()
        .filter(|cart| cart.has_battery() && cart.has_ram())
        .map(Cartridge::save_id)
}

/// I/O side of a session, presented through [`App`].
pub struct IoApp {
    frames: Receiver<Screen>,
    keypad: KeypadHandle,
    stop: Arc<AtomicBool>,
    title: String,
    scale: u32,
    frame_limit: Option<u64>,
    presented: u64,
    fps: Option<FpsCounter>,
    exit: bool,
}

impl IoApp {
    pub fn new(
        frames: Receiver<Screen>,
        keypad: KeypadHandle,
        stop: Arc<AtomicBool>,
        config: &Config,
    ) -> Self {
        Self {
            frames,
            keypad,
            stop,
            title: config.title.clone(),
            scale: config.screen_size,
            frame_limit: config.frames,
            presented: 0,
            fps: config.show_fps.then(|| FpsCounter::new(Instant::now())),
            exit: false,
        }
    }

    /// Frames received from the emulation thread so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    fn present(&mut self, frame: &Screen, screen: &mut [u8]) {
        let pixels = frame.pixels();
        let len = screen.len().min(pixels.len());
        screen[..len].copy_from_slice(&pixels[..len]);

        self.presented += 1;
        if let Some(average) = self.fps.as_mut().and_then(|fps| fps.frame(Instant::now())) {
            log::info!("Average frames per second: {average:.1}");
        }
        if self.frame_limit.is_some_and(|limit| self.presented >= limit) {
            log::info!("Frame limit of {} reached", self.presented);
            self.exit();
        }
    }
}

impl App for IoApp {
    fn init(&mut self) {
        log::info!("Starting I/O: {}", self.title);
    }

    fn update(&mut self, screen: &mut [u8]) {
        match self.frames.recv_timeout(FRAME_WAIT) {
            Ok(frame) => self.present(&frame, screen),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("Emulation thread finished");
                self.exit();
            }
        }
    }

    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        if key == Key::Escape {
            if is_down {
                self.exit();
            }
            return;
        }
        if let Some(button) = Button::from_key(key) {
            self.keypad.set(button, is_down);
        }
    }

    fn should_exit(&self) -> bool {
        self.exit
    }

    fn exit(&mut self) {
        self.exit = true;
        self.stop.store(true, Ordering::Relaxed);
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        self.scale
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}
