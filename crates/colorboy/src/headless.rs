use anyhow::Result;

use colorboy_common::app::App;

/// Drive `app` without a window until it asks to exit.
pub fn run<A: App>(mut app: A) -> Result<()> {
    let mut screen = vec![0u8; (app.width() * app.height() * 3) as usize];
    app.init();
    while !app.should_exit() {
        app.update(&mut screen);
    }
    app.exit();
    Ok(())
}
