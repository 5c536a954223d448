use anyhow::{Error, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use typed_builder::TypedBuilder;

use colorboy_common::app::App;
use colorboy_common::key::Key;

const BYTES_PER_PIXEL: u32 = 3;

#[derive(TypedBuilder)]
pub struct SdlInitInfo {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub title: String,
}

pub struct SdlContext;

impl SdlContext {
    pub fn run(info: SdlInitInfo, mut app: impl App) -> Result<()> {
        let SdlInitInfo {
            width,
            height,
            scale,
            title,
        } = info;
        let sdl_context = sdl2::init().map_err(Error::msg)?;
        let video_subsystem = sdl_context.video().map_err(Error::msg)?;
        let window = video_subsystem
            .window(&title, width * scale, height * scale)
            .position_centered()
            .build()?;
        let mut canvas = window.into_canvas().present_vsync().build()?;
        canvas
            .set_scale(scale as f32, scale as f32)
            .map_err(Error::msg)?;
        let creator = canvas.texture_creator();
        let mut texture =
            creator.create_texture_streaming(PixelFormatEnum::RGB24, width, height)?;
        let mut event_pump = sdl_context.event_pump().map_err(Error::msg)?;

        let mut screen = vec![0u8; (width * height * BYTES_PER_PIXEL) as usize];
        app.init();
        while !app.should_exit() {
            for event in event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => app.exit(),
                    Event::KeyDown {
                        keycode: Some(keycode),
                        repeat: false,
                        ..
                    } => app.handle_key_event(map_keycode(keycode), true),
                    Event::KeyUp {
                        keycode: Some(keycode),
                        ..
                    } => app.handle_key_event(map_keycode(keycode), false),
                    _ => {}
                }
            }

            app.update(&mut screen);

            texture.update(None, &screen, (width * BYTES_PER_PIXEL) as usize)?;
            canvas.copy(&texture, None, None).map_err(Error::msg)?;
            canvas.present();
        }
        app.exit();
        Ok(())
    }
}

pub fn map_keycode(keycode: Keycode) -> Key {
    match keycode {
        Keycode::Up => Key::Up,
        Keycode::Down => Key::Down,
        Keycode::Left => Key::Left,
        Keycode::Right => Key::Right,
        Keycode::A => Key::A,
        Keycode::S => Key::S,
        Keycode::Z => Key::Z,
        Keycode::X => Key::X,
        Keycode::Return => Key::Return,
        Keycode::Backspace => Key::Backspace,
        Keycode::Escape => Key::Escape,
        _ => Key::None,
    }
}
