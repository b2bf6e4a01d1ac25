use std::sync::Arc;

use crate::moderation::Moderation;

pub type AppState = Arc<Moderation>;
