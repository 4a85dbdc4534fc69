//! Runs controller commands against a selection backend.

use std::collections::VecDeque;

use crate::app::AtlasApp;
use crate::message::{Command, Message};
use crate::model::StoredSelection;
use crate::naming::{Prompt, run_prompt};
use crate::overlay::MarkerSink;
use crate::persistence::{SelectionClient, Transport};
use crate::viewport::{Place, Viewport};

/// Execute one command and produce the message that answers it.
///
/// Network commands go through `client`; confirmations and the prompt naming
/// front-end go through `prompt`.
pub async fn run_command<T, P>(client: &SelectionClient<T>, prompt: &mut P, command: Command) -> Message
where
    T: Transport,
    P: Prompt + ?Sized,
{
    match command {
        Command::Create(record) => Message::Created(client.create(&record).await),
        Command::List { seq } => Message::Listed {
            seq,
            selections: client.try_list().await,
        },
        Command::Get(id) => Message::Fetched(client.get(&id).await),
        Command::Delete(id) => Message::Deleted(client.delete(&id).await),
        Command::Clear => Message::Cleared(client.clear().await),
        Command::Confirm(question) => Message::Confirmed(prompt.confirm(&question)),
        Command::PromptName(pending) => Message::PromptFinished(run_prompt(prompt, pending)),
    }
}

/// An [`AtlasApp`] wired to a backend client and a prompt.
///
/// Commands run one at a time in the order they were emitted; every command is
/// awaited to completion before the next starts.
pub struct AtlasDriver<V, S: MarkerSink, T, P> {
    app: AtlasApp<V, S>,
    client: SelectionClient<T>,
    prompt: P,
}

impl<V, S, T, P> AtlasDriver<V, S, T, P>
where
    V: Viewport + Place,
    S: MarkerSink,
    T: Transport,
    P: Prompt,
{
    pub fn new(app: AtlasApp<V, S>, client: SelectionClient<T>, prompt: P) -> Self {
        Self {
            app,
            client,
            prompt,
        }
    }

    pub fn app(&self) -> &AtlasApp<V, S> {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut AtlasApp<V, S> {
        &mut self.app
    }

    pub fn client(&self) -> &SelectionClient<T> {
        &self.client
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut P {
        &mut self.prompt
    }

    /// Feed a message to the app and run every command it leads to.
    pub async fn dispatch(&mut self, message: Message) {
        let mut queue: VecDeque<Command> = self.app.update(message).into();
        while let Some(command) = queue.pop_front() {
            if command.is_request() {
                log::debug!("Sending {:?}", command);
            } else {
                log::trace!("Asking the user: {:?}", command);
            }
            let reply = run_command(&self.client, &mut self.prompt, command).await;
            queue.extend(self.app.update(reply));
        }
    }

    /// Fetch every stored selection straight from the backend.
    pub async fn list_all(&self) -> Vec<StoredSelection> {
        self.client.list().await
    }

    /// Cancel the selection in progress, as if the user pressed Escape.
    pub fn cancel_current_selection(&mut self) -> bool {
        self.app.cancel_selection()
    }
}
