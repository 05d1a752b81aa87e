use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::persona::Persona;

pub mod handlers;
pub mod models;
pub mod routes;

// App state structure
pub struct AppState {
    pub persona: Persona,
    pub completion: Arc<dyn CompletionClient>,
}
