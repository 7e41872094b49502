// Interview flow: intake form, scripted three-question assessment, feedback.
// All completion calls go through llm_client::CompletionClient.

pub mod handlers;
pub mod intake;
pub mod models;
pub mod prompts;
pub mod session;
pub mod state_machine;
pub mod transcript;

#[cfg(test)]
pub mod testing;
