//! Navigation handler for `ShowNote` and `ShowFront`

use super::{BoxFuture, Handler};
use crate::dispatcher::Chain;
use crate::events::Event;
use crate::state::View;
use crate::store::Store;

pub struct NavigationHandler;

impl Handler for NavigationHandler {
    fn handle<'a>(
        &'a self,
        event: &'a Event,
        store: &'a Store,
        _chain: &'a Chain,
    ) -> BoxFuture<'a, Option<Event>> {
        Box::pin(async move {
            match event {
                Event::ShowNote { path } => {
                    store.current_path.set(path.clone());
                    store.view.set(View::Note);
                }
                Event::ShowFront => {
                    store.current_path.set("/".to_string());
                    store.view.set(View::Front);
                }
                _ => {}
            }
            None
        })
    }
}
