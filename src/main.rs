// What you SEE:
// • The guide for a random letter fills the window.
// • Hold Left Mouse to trace it with a thick round pen.
// • Enter checks the drawing and shows 1-3 stars in the HUD.
// • C clears, R picks another letter, D toggles the difference overlay. ESC quits.

use letter_trace::config::Config;
use letter_trace::draw::{composite_over_white, draw_text_5x7, Drawer};
use letter_trace::input::SurfaceRect;
use letter_trace::types::FrameBuffer;
use letter_trace::{Error, PracticeSession};

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    /* --- Config + session ---
       Atlas sheets start loading in the background; the guide appears once they land. */
    let config = Config::load()?;
    let (w, h) = config.surface_size();
    let mut session = PracticeSession::from_config(&config);

    /* --- Window + surface ---
       The window is exactly the drawing surface, so window coords are surface coords. */
    let mut drawer = Drawer::new("Letter Trace", (w, h))?;
    session.attach_surface(SurfaceRect::default());
    session.pick_random_character(&mut rand::thread_rng());

    // What actually goes to the window each frame (0x00RRGGBB)
    let mut screen = FrameBuffer::new(w, h);
    let mut show_diff = false;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Inputs */
        if let Some((phase, x, y)) = drawer.poll_pointer() {
            session.pointer_mouse(phase, x, y);
        }
        if drawer.c_pressed_once() {
            session.clear();
        }
        if drawer.r_pressed_once() {
            session.pick_random_character(&mut rand::thread_rng());
        }
        if drawer.d_pressed_once() {
            show_diff = !show_diff;
        }
        if drawer.enter_pressed_once() && session.evaluate().is_none() {
            log::warn!("Nothing to score yet");
        }

        /* 2) Paint the pen segment for this frame */
        session.frame();

        /* 3) Compose: drawing (or its diff against the reference) on white paper */
        let overlay = if show_diff { session.difference_overlay().ok() } else { None };
        if let Some(surface) = overlay.as_ref().or(session.surface_snapshot()) {
            composite_over_white(surface, &mut screen)?;
        }

        /* 4) HUD */
        let strokes = session.stroke_state().strokes;
        let budget = session.max_strokes().map_or_else(|| "-".to_string(), |m| m.to_string());
        let stars = session.stars().map_or_else(|| "-".to_string(), |s| s.get().to_string());
        let hud = format!("STROKES {strokes}/{budget} | STARS {stars}");
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x0000_0000);
        draw_text_5x7(
            &mut screen,
            8,
            h as i32 - 16,
            "ENTER: CHECK  C: CLEAR  R: RANDOM  D: DIFF",
            0x0040_4040,
        );

        /* 5) Present */
        drawer.present(&screen)?;
    }

    session.detach_surface();
    Ok(())
}
