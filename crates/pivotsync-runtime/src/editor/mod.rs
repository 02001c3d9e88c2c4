mod session;
mod store;
mod zones;

pub use session::{DragHost, DragOutCallback, EditorSession, WeakEditorSession};
pub use store::FieldConfigStore;
pub use zones::Zones;
