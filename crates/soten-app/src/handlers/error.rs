//! Sink for failures of every other handler

use super::{BoxFuture, Handler};
use crate::dispatcher::Chain;
use crate::events::Event;
use crate::store::Store;

pub struct ErrorHandler;

impl Handler for ErrorHandler {
    fn handle<'a>(
        &'a self,
        event: &'a Event,
        store: &'a Store,
        _chain: &'a Chain,
    ) -> BoxFuture<'a, Option<Event>> {
        Box::pin(async move {
            if let Event::Error { event, message } = event {
                match event {
                    Some(origin) => log::error!("{}: {}", origin, message),
                    None => log::error!("{}", message),
                }
                store.error_message.set(Some(message.clone()));
            }
            None
        })
    }
}
