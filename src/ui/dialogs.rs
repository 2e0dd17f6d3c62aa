use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;

/// Asks for camera consent before the journey starts. Two responses:
/// "record" and "skip"; closing counts as skip.
pub fn show_consent_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some("One small thing first"),
        Some(
            "May I record your reaction with the camera?\n\
The video never leaves this computer - it is saved \n\
to your Videos folder at the end.",
        ),
    );
    dialog.add_response("skip", "No camera");
    dialog.add_response("record", "Record me");
    dialog.set_response_appearance("record", adw::ResponseAppearance::Suggested);
    dialog.set_default_response(Some("record"));
    dialog.set_close_response("skip");
    dialog.present(app.active_window().as_ref());
    dialog
}

/// The single informational notice the experience is allowed to show when
/// recording cannot start. Everything else keeps working.
pub fn show_recording_unavailable(app: &adw::Application) {
    let dialog = adw::AlertDialog::new(
        Some("No recording"),
        Some("The camera could not be started. Everything else works without it."),
    );
    dialog.add_response("ok", "Got it");
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(app.active_window().as_ref());
}

/// Tells the player where their reaction video ended up, once the answer
/// is in and the recorder has been released.
pub fn show_recording_saved(parent: &impl IsA<gtk::Widget>, path: &std::path::Path) {
    let dialog = adw::AlertDialog::new(
        Some("Recording saved"),
        Some(&format!("Your reaction video was saved to {}.", path.display())),
    );
    dialog.add_response("ok", "Lovely");
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(Some(parent));
}

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Evermore")
        .application_icon("io.github.evermore")
        .version("1.0.0")
        .comments("A little interactive proposal experience.")
        .build();
    dialog.add_legal_section("Evermore", Some("© 2026"), gtk::License::MitX11, None);
    dialog.present(app.active_window().as_ref());
    dialog
}
