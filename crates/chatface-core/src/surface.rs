//! Display surface boundary.
//!
//! The surface owns every scene object (logo image, face image, status bar,
//! containers). The display core never holds those objects; it asks the
//! surface to create, bind and release them while holding the scene lock.

use crate::{ImageHandle, Result};

/// Scene operations the display core needs from a GUI toolkit.
///
/// Bind calls return `false` when the target object does not exist; that is
/// a no-op, not an error.
pub trait DisplaySurface: Send {
    /// Creates the full-screen logo object showing `frame`.
    fn show_logo(&mut self, frame: &ImageHandle) -> Result<()>;

    /// Binds a frame into the logo object.
    fn set_logo_image(&mut self, frame: &ImageHandle) -> bool;

    /// Deletes the logo object, if present.
    fn delete_logo(&mut self);

    /// Builds the main UI: containers, status bar and the face image,
    /// showing `initial_face` when given.
    fn setup_ui(&mut self, initial_face: Option<&ImageHandle>) -> Result<()>;

    /// Binds a frame into the face object.
    fn set_face_image(&mut self, frame: &ImageHandle) -> bool;

    /// Returns true while the status area is hidden.
    fn status_hidden(&self) -> bool;

    /// Shows or hides the status area.
    fn set_status_hidden(&mut self, hidden: bool);

    /// Releases animated content objects (face, logo, labels).
    fn release_content(&mut self);

    /// Releases container objects.
    fn release_containers(&mut self);

    /// Releases the display and panel handles.
    fn release_display(&mut self);
}
