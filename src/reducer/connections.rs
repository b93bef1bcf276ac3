use crate::model::{AUTH_INPUT_KEY, Step};
use serde_json::Value;
use std::sync::Arc;

/// Blanks `settings.input.auth` on every step below the trigger.
pub(super) fn remove_connections(root: &mut Step) {
    for slot in root.slots_mut() {
        scrub_slot(slot);
    }
}

fn scrub_slot(slot: &mut Option<Arc<Step>>) {
    let Some(child) = slot else {
        return;
    };
    let step = Arc::make_mut(child);
    if let Some(auth) = step.input_mut().and_then(|input| input.get_mut(AUTH_INPUT_KEY)) {
        *auth = Value::String(String::new());
    }
    for slot in step.slots_mut() {
        scrub_slot(slot);
    }
}
