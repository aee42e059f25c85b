pub mod airecognition;
pub mod autosubscribe;
pub mod embylibraryinfo;
pub mod mediainfo;

pub use airecognition::AiRecognition;
pub use autosubscribe::AutoSubscribe;
pub use embylibraryinfo::EmbyLibraryInfo;
pub use mediainfo::MediaInfo;

use crate::plugin::Plugin;

/// Every plugin shipped with the host, in no particular order.
pub fn builtin_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(AiRecognition::new()),
        Box::new(AutoSubscribe::new()),
        Box::new(EmbyLibraryInfo::new()),
        Box::new(MediaInfo::new()),
    ]
}
