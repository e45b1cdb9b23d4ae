//! Post-mount loading: the works page is delivered empty and filled in place
//!
//! Each page instance walks `Empty -> Loading -> {Populated | EmptyConfirmed}`
//! exactly once. Terminal states ignore further events.

use serde::Serialize;

use super::{SiteComposer, WorksView};
use crate::error::Result;

/// Loading state of one mounted works page
#[derive(Debug, Clone, PartialEq)]
pub enum MountState {
    Empty,
    Loading,
    Populated(WorksView),
    EmptyConfirmed,
}

/// Inputs driving a mounted page
#[derive(Debug, Clone, PartialEq)]
pub enum MountEvent {
    /// The page has been delivered and its fetch started
    Mounted,
    /// The works fetch finished
    Resolved(WorksView),
}

impl MountState {
    /// Next state after `event`; illegal events leave the state unchanged
    pub fn apply(self, event: MountEvent) -> Self {
        match (self, event) {
            (MountState::Empty, MountEvent::Mounted) => MountState::Loading,
            (MountState::Loading, MountEvent::Resolved(view)) => {
                if view.is_empty() {
                    MountState::EmptyConfirmed
                } else {
                    MountState::Populated(view)
                }
            }
            (state, event) => {
                tracing::debug!("Ignoring {:?} in state {}", event, state.name());
                state
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MountState::Empty => "empty",
            MountState::Loading => "loading",
            MountState::Populated(_) => "populated",
            MountState::EmptyConfirmed => "empty_confirmed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MountState::Populated(_) | MountState::EmptyConfirmed)
    }

    fn view(&self) -> WorksView {
        match self {
            MountState::Populated(view) => view.clone(),
            _ => WorksView::Empty,
        }
    }
}

/// Body of `/api/works`: final state plus the grid fragment to swap in
#[derive(Debug, Clone, Serialize)]
pub struct MountPayload {
    pub state: &'static str,
    pub html: String,
}

/// Run one page instance from mount to its terminal state
pub async fn load(composer: &SiteComposer) -> Result<MountState> {
    let state = MountState::Empty.apply(MountEvent::Mounted);
    let view = composer.works_view().await?;
    Ok(state.apply(MountEvent::Resolved(view)))
}

/// Render the payload for a terminal state
pub fn payload(composer: &SiteComposer, state: &MountState) -> Result<MountPayload> {
    Ok(MountPayload {
        state: state.name(),
        html: composer.render_works_grid(&state.view())?,
    })
}
